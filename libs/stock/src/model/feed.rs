use chrono::{DateTime, Utc};
use serde::Deserialize;

use super::{Sentiment, de, optional_sentiment};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FeedKind {
    Tweets,
    News,
    Reddit,
}

impl FeedKind {
    /// Path segment under `/api/stock/{ticker}/`.
    pub fn as_str(&self) -> &'static str {
        match self {
            FeedKind::Tweets => "tweets",
            FeedKind::News => "news",
            FeedKind::Reddit => "reddit",
        }
    }
}

impl std::str::FromStr for FeedKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "tweet" | "tweets" => Ok(FeedKind::Tweets),
            "news" => Ok(FeedKind::News),
            "reddit" => Ok(FeedKind::Reddit),
            other => anyhow::bail!("unknown feed: {other}"),
        }
    }
}

/// Fields shared by every feed item regardless of where it came from.
pub trait FeedEntry {
    const KIND: FeedKind;

    fn author(&self) -> &str;
    fn content(&self) -> &str;
    fn timestamp(&self) -> DateTime<Utc>;
    fn url(&self) -> &str;
    fn sentiment(&self) -> Option<Sentiment>;
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct Tweet {
    pub content: String,

    #[serde(deserialize_with = "de::timestamp")]
    pub timestamp: DateTime<Utc>,

    #[serde(deserialize_with = "de::string_or_number")]
    pub author: String,

    pub url: String,

    #[serde(default, deserialize_with = "optional_sentiment")]
    pub sentiment: Option<Sentiment>,

    #[serde(default)]
    pub retweets: u64,
    #[serde(default)]
    pub replies: u64,
    #[serde(default)]
    pub likes: u64,
    #[serde(default)]
    pub quotes: u64,
    #[serde(default)]
    pub pub_score: f64,

    #[serde(default, deserialize_with = "de::tags")]
    pub hashtags: Vec<String>,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct News {
    pub headline: String,

    #[serde(default)]
    pub content: Option<String>,

    pub url: String,

    #[serde(deserialize_with = "de::timestamp")]
    pub timestamp: DateTime<Utc>,

    #[serde(default, deserialize_with = "optional_sentiment")]
    pub sentiment: Option<Sentiment>,

    #[serde(default)]
    pub source: String,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct Reddit {
    pub title: String,
    pub content: String,

    #[serde(deserialize_with = "de::timestamp")]
    pub timestamp: DateTime<Utc>,

    pub author: String,

    #[serde(default, deserialize_with = "optional_sentiment")]
    pub sentiment: Option<Sentiment>,

    #[serde(default)]
    pub score: i64,
    #[serde(default)]
    pub num_comments: i64,

    pub url: String,
}

impl FeedEntry for Tweet {
    const KIND: FeedKind = FeedKind::Tweets;

    fn author(&self) -> &str {
        &self.author
    }
    fn content(&self) -> &str {
        &self.content
    }
    fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }
    fn url(&self) -> &str {
        &self.url
    }
    fn sentiment(&self) -> Option<Sentiment> {
        self.sentiment
    }
}

impl FeedEntry for News {
    const KIND: FeedKind = FeedKind::News;

    // News has no author; the publisher stands in for it.
    fn author(&self) -> &str {
        &self.source
    }
    fn content(&self) -> &str {
        self.content.as_deref().unwrap_or(self.headline.as_str())
    }
    fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }
    fn url(&self) -> &str {
        &self.url
    }
    fn sentiment(&self) -> Option<Sentiment> {
        self.sentiment
    }
}

impl FeedEntry for Reddit {
    const KIND: FeedKind = FeedKind::Reddit;

    fn author(&self) -> &str {
        &self.author
    }
    fn content(&self) -> &str {
        &self.content
    }
    fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }
    fn url(&self) -> &str {
        &self.url
    }
    fn sentiment(&self) -> Option<Sentiment> {
        self.sentiment
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum FeedItem {
    Tweet(Tweet),
    News(News),
    Reddit(Reddit),
}

impl FeedItem {
    pub fn kind(&self) -> FeedKind {
        match self {
            FeedItem::Tweet(_) => FeedKind::Tweets,
            FeedItem::News(_) => FeedKind::News,
            FeedItem::Reddit(_) => FeedKind::Reddit,
        }
    }

    fn entry(&self) -> &dyn Common {
        match self {
            FeedItem::Tweet(t) => t,
            FeedItem::News(n) => n,
            FeedItem::Reddit(r) => r,
        }
    }

    pub fn author(&self) -> &str {
        self.entry().author()
    }

    pub fn content(&self) -> &str {
        self.entry().content()
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.entry().timestamp()
    }

    pub fn url(&self) -> &str {
        self.entry().url()
    }

    pub fn sentiment(&self) -> Option<Sentiment> {
        self.entry().sentiment()
    }

    /// Title line shown above the content.
    pub fn headline(&self) -> &str {
        match self {
            FeedItem::Tweet(t) => &t.author,
            FeedItem::News(n) => &n.headline,
            FeedItem::Reddit(r) => &r.title,
        }
    }
}

// `FeedEntry` has an associated const and is not object safe.
trait Common {
    fn author(&self) -> &str;
    fn content(&self) -> &str;
    fn timestamp(&self) -> DateTime<Utc>;
    fn url(&self) -> &str;
    fn sentiment(&self) -> Option<Sentiment>;
}

impl<E: FeedEntry> Common for E {
    fn author(&self) -> &str {
        FeedEntry::author(self)
    }
    fn content(&self) -> &str {
        FeedEntry::content(self)
    }
    fn timestamp(&self) -> DateTime<Utc> {
        FeedEntry::timestamp(self)
    }
    fn url(&self) -> &str {
        FeedEntry::url(self)
    }
    fn sentiment(&self) -> Option<Sentiment> {
        FeedEntry::sentiment(self)
    }
}

impl From<Tweet> for FeedItem {
    fn from(t: Tweet) -> Self {
        FeedItem::Tweet(t)
    }
}

impl From<News> for FeedItem {
    fn from(n: News) -> Self {
        FeedItem::News(n)
    }
}

impl From<Reddit> for FeedItem {
    fn from(r: Reddit) -> Self {
        FeedItem::Reddit(r)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn tweet_author_may_be_numeric() {
        let tweet: Tweet = serde_json::from_value(json!({
            "content": "$AAPL to the moon",
            "timestamp": "2022-05-01T10:00:00Z",
            "author": 12345,
            "url": "https://twitter.com/i/web/status/1",
            "sentiment": "positive",
            "retweets": 3,
            "replies": 1,
            "likes": 10,
            "quotes": 0,
            "pub_score": 0.7,
            "hashtags": "aapl, stocks"
        }))
        .unwrap();

        assert_eq!(tweet.author, "12345");
        assert_eq!(tweet.hashtags, vec!["aapl", "stocks"]);
        assert_eq!(FeedEntry::sentiment(&tweet), Some(Sentiment::Positive));
    }

    #[test]
    fn feed_item_exposes_common_fields_by_kind() {
        let post: Reddit = serde_json::from_value(json!({
            "title": "DD on AAPL",
            "content": "long post",
            "timestamp": "2022-05-01T10:00:00",
            "author": "u/someone",
            "sentiment": null,
            "score": 42,
            "num_comments": 7,
            "url": "https://reddit.com/r/wallstreetbets/1"
        }))
        .unwrap();

        let item = FeedItem::from(post);
        assert_eq!(item.kind(), FeedKind::Reddit);
        assert_eq!(item.author(), "u/someone");
        assert_eq!(item.headline(), "DD on AAPL");
        assert_eq!(item.sentiment(), None);

        let news: News = serde_json::from_value(json!({
            "headline": "Apple beats estimates",
            "url": "https://example.com/a",
            "timestamp": "2022-05-01T10:00:00Z",
            "sentiment": "mixed",
            "source": "Reuters"
        }))
        .unwrap();

        let item = FeedItem::from(news);
        assert_eq!(item.kind(), FeedKind::News);
        assert_eq!(item.author(), "Reuters");
        assert_eq!(item.content(), "Apple beats estimates");
        assert_eq!(item.sentiment(), None);
    }
}
