//! Cache keys for every endpoint. A key is the full API path, so two
//! requests share a cache entry exactly when they would hit the same URL.

use crate::model::{FeedKind, PaginatedList, SentimentSource};

pub const API_PREFIX: &str = "/api/stock";

/// Trimmed, upper-cased ticker, or `None` when nothing is selected.
pub fn normalize(ticker: &str) -> Option<String> {
    let ticker = ticker.trim().to_uppercase();
    if ticker.is_empty() { None } else { Some(ticker) }
}

fn ticker_path(ticker: &str) -> Option<String> {
    normalize(ticker).map(|t| format!("{API_PREFIX}/{}", urlencoding::encode(&t)))
}

pub fn search(text: &str) -> String {
    format!("{API_PREFIX}/search?q={}", urlencoding::encode(text))
}

pub fn stock(ticker: &str) -> Option<String> {
    ticker_path(ticker)
}

pub fn price(ticker: &str) -> Option<String> {
    ticker_path(ticker).map(|p| format!("{p}/price"))
}

pub fn indicators(ticker: &str) -> Option<String> {
    ticker_path(ticker).map(|p| format!("{p}/indicators"))
}

pub fn sentiment(ticker: &str, source: SentimentSource) -> Option<String> {
    ticker_path(ticker).map(|p| format!("{p}/sentiment?q={}", source.as_str()))
}

/// `page` is 1-indexed.
pub fn feed_page(kind: FeedKind, ticker: &str, page: usize) -> Option<String> {
    ticker_path(ticker).map(|p| format!("{p}/{}?page={page}", kind.as_str()))
}

/// Key generator for [`crate::Feed`]: stops only once the previous page
/// came back empty, page metadata is not consulted.
pub fn feed_key_fn<T>(
    kind: FeedKind,
    ticker: &str,
) -> impl Fn(usize, Option<&PaginatedList<T>>) -> Option<String> + Send + Sync + use<T> {
    let ticker = normalize(ticker);

    move |page_index: usize, previous: Option<&PaginatedList<T>>| {
        if previous.is_some_and(PaginatedList::is_empty) {
            return None;
        }
        feed_page(kind, ticker.as_deref()?, page_index + 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_follow_endpoint_templates() {
        assert_eq!(stock(" aapl ").as_deref(), Some("/api/stock/AAPL"));
        assert_eq!(price("AAPL").as_deref(), Some("/api/stock/AAPL/price"));
        assert_eq!(
            indicators("AAPL").as_deref(),
            Some("/api/stock/AAPL/indicators")
        );
        assert_eq!(
            sentiment("AAPL", SentimentSource::Reddit).as_deref(),
            Some("/api/stock/AAPL/sentiment?q=reddit")
        );
        assert_eq!(
            feed_page(FeedKind::News, "AAPL", 2).as_deref(),
            Some("/api/stock/AAPL/news?page=2")
        );
    }

    #[test]
    fn empty_ticker_has_no_key() {
        assert_eq!(stock(""), None);
        assert_eq!(price("   "), None);
        assert_eq!(feed_page(FeedKind::Tweets, "", 1), None);
    }

    #[test]
    fn search_text_is_encoded() {
        assert_eq!(search(""), "/api/stock/search?q=");
        assert_eq!(search("AAPL"), "/api/stock/search?q=AAPL");
        assert_eq!(search("s&p 500"), "/api/stock/search?q=s%26p%20500");
    }

    #[test]
    fn feed_keys_stop_after_an_empty_page() {
        let key = feed_key_fn::<u32>(FeedKind::Reddit, "aapl");
        let full = PaginatedList {
            items: vec![1, 2],
            limit: 2,
            total: 4,
            page: 2,
            pages: 2,
        };
        let empty = PaginatedList {
            items: vec![],
            limit: 2,
            total: 4,
            page: 3,
            pages: 2,
        };

        assert_eq!(key(0, None).as_deref(), Some("/api/stock/AAPL/reddit?page=1"));
        // last page by metadata still probes the next one
        assert_eq!(
            key(2, Some(&full)).as_deref(),
            Some("/api/stock/AAPL/reddit?page=3")
        );
        assert_eq!(key(3, Some(&empty)), None);
    }
}
