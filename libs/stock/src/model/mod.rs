pub(crate) mod de;
mod feed;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

pub use feed::{FeedEntry, FeedItem, FeedKind, News, Reddit, Tweet};

//
// Match the dashboard API JSON
// GET /api/stock/{ticker}
//
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct Stock {
    pub ticker: String,
    pub name: String,

    #[serde(default)]
    pub summary: Option<String>,

    #[serde(default)]
    pub image_url: Option<String>,
}

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct StockStub {
    pub ticker: String,
    pub name: String,
}

impl StockStub {
    /// Autocomplete label, e.g. `Apple Inc. (AAPL)`.
    pub fn label(&self) -> String {
        format!("{} ({})", self.name, self.ticker)
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct PricePoint {
    #[serde(deserialize_with = "de::number")]
    pub open: f64,

    #[serde(deserialize_with = "de::number")]
    pub high: f64,

    #[serde(deserialize_with = "de::number")]
    pub low: f64,

    #[serde(deserialize_with = "de::number")]
    pub close: f64,

    #[serde(deserialize_with = "de::timestamp")]
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Sentiment {
    Positive,
    Negative,
    Neutral,
}

impl Sentiment {
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim().to_ascii_lowercase().as_str() {
            "positive" => Some(Sentiment::Positive),
            "negative" => Some(Sentiment::Negative),
            "neutral" => Some(Sentiment::Neutral),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Sentiment::Positive => "positive",
            Sentiment::Negative => "negative",
            Sentiment::Neutral => "neutral",
        }
    }
}

/// Unknown or missing labels deserialize to `None` (unset).
pub(crate) fn optional_sentiment<'de, D>(deserializer: D) -> Result<Option<Sentiment>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.as_deref().and_then(Sentiment::from_label))
}

/// Known indicators sort before unknown ones, in declaration order.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum IndicatorKind {
    Sma,
    Ema,
    Macd,
    Rsi,
    Atr,
    Other(String),
}

impl IndicatorKind {
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "sma" => IndicatorKind::Sma,
            "ema" => IndicatorKind::Ema,
            "macd" => IndicatorKind::Macd,
            "rsi" => IndicatorKind::Rsi,
            "atr" => IndicatorKind::Atr,
            other => IndicatorKind::Other(other.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum IndicatorValue {
    Numeric(f64),
    Category(Sentiment),
    Label(String),
}

impl<'de> Deserialize<'de> for IndicatorValue {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Number(f64),
            Text(String),
        }

        Ok(match Raw::deserialize(deserializer)? {
            Raw::Number(n) => IndicatorValue::Numeric(n),
            Raw::Text(text) => match Sentiment::from_label(&text) {
                Some(sentiment) => IndicatorValue::Category(sentiment),
                None => IndicatorValue::Label(text),
            },
        })
    }
}

impl Serialize for IndicatorValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            IndicatorValue::Numeric(n) => serializer.serialize_f64(*n),
            IndicatorValue::Category(s) => serializer.serialize_str(s.as_str()),
            IndicatorValue::Label(l) => serializer.serialize_str(l),
        }
    }
}

impl std::fmt::Display for IndicatorValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IndicatorValue::Numeric(n) => write!(f, "{n:.2}"),
            IndicatorValue::Category(s) => f.write_str(s.as_str()),
            IndicatorValue::Label(l) => f.write_str(l),
        }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct Indicator {
    pub name: String,
    pub value: IndicatorValue,
}

impl Indicator {
    pub fn kind(&self) -> IndicatorKind {
        IndicatorKind::from_name(&self.name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SentimentSource {
    #[default]
    Tweet,
    News,
    Reddit,
}

impl SentimentSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            SentimentSource::Tweet => "tweet",
            SentimentSource::News => "news",
            SentimentSource::Reddit => "reddit",
        }
    }
}

impl std::str::FromStr for SentimentSource {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "tweet" | "tweets" => Ok(SentimentSource::Tweet),
            "news" => Ok(SentimentSource::News),
            "reddit" => Ok(SentimentSource::Reddit),
            other => anyhow::bail!("unknown sentiment source: {other}"),
        }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct SentimentPoint {
    pub key: String,
    pub value: u64,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct PaginatedList<T> {
    pub items: Vec<T>,
    pub limit: usize,
    pub total: usize,
    pub page: usize,
    pub pages: usize,
}

impl<T> PaginatedList<T> {
    pub fn expected_pages(total: usize, limit: usize) -> usize {
        if limit == 0 { 0 } else { total.div_ceil(limit) }
    }

    pub fn is_consistent(&self) -> bool {
        self.items.len() <= self.limit
            && self.page >= 1
            && self.pages == Self::expected_pages(self.total, self.limit)
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn price_point_accepts_decimal_strings() {
        let point: PricePoint = serde_json::from_value(json!({
            "open": "150.12000",
            "high": 152.5,
            "low": "149.00000",
            "close": 151,
            "timestamp": "2022-05-02T00:00:00"
        }))
        .unwrap();

        assert_eq!(point.open, 150.12);
        assert_eq!(point.close, 151.0);
        assert_eq!(point.timestamp.timestamp(), 1_651_449_600);
    }

    #[test]
    fn indicator_values_are_numeric_or_categorical() {
        let indicators: Vec<Indicator> = serde_json::from_value(json!([
            { "name": "rsi", "value": 71.3 },
            { "name": "macd", "value": "negative" },
            { "name": "obv", "value": "flat" }
        ]))
        .unwrap();

        assert_eq!(indicators[0].value, IndicatorValue::Numeric(71.3));
        assert_eq!(indicators[0].kind(), IndicatorKind::Rsi);
        assert_eq!(
            indicators[1].value,
            IndicatorValue::Category(Sentiment::Negative)
        );
        assert_eq!(indicators[2].value, IndicatorValue::Label("flat".into()));
        assert_eq!(indicators[2].kind(), IndicatorKind::Other("obv".into()));
    }

    #[test]
    fn known_indicators_sort_first() {
        let mut kinds = vec![
            IndicatorKind::from_name("obv"),
            IndicatorKind::from_name("RSI"),
            IndicatorKind::from_name("sma"),
        ];
        kinds.sort();
        assert_eq!(
            kinds,
            vec![
                IndicatorKind::Sma,
                IndicatorKind::Rsi,
                IndicatorKind::Other("obv".into())
            ]
        );
    }

    #[test]
    fn page_metadata_invariants() {
        assert_eq!(PaginatedList::<()>::expected_pages(45, 20), 3);
        assert_eq!(PaginatedList::<()>::expected_pages(40, 20), 2);
        assert_eq!(PaginatedList::<()>::expected_pages(0, 20), 0);

        let page: PaginatedList<StockStub> = serde_json::from_value(json!({
            "items": [{ "ticker": "AAPL", "name": "Apple Inc." }],
            "limit": 10,
            "total": 1,
            "page": 1,
            "pages": 1
        }))
        .unwrap();
        assert!(page.is_consistent());
        assert_eq!(page.items[0].label(), "Apple Inc. (AAPL)");
    }

    #[test]
    fn sentiment_source_parses_query_values() {
        assert_eq!("news".parse::<SentimentSource>().unwrap(), SentimentSource::News);
        assert_eq!("Tweets".parse::<SentimentSource>().unwrap(), SentimentSource::Tweet);
        assert!("facebook".parse::<SentimentSource>().is_err());
    }
}
