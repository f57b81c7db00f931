//! Chart-ready datasets assembled from API responses. Pure functions; the
//! output mirrors the dataset shapes of the browser charting library so it
//! can also be serialized as-is.

use serde::Serialize;

use crate::model::{Indicator, IndicatorValue, PricePoint, Sentiment, SentimentPoint};

pub const CANDLE_UP: &str = "#01ff01";
pub const CANDLE_DOWN: &str = "#fe0000";
pub const CANDLE_UNCHANGED: &str = "#999";

pub const CELL_POSITIVE: &str = "rgba(0, 255, 0, 0.5)";
pub const CELL_NEGATIVE: &str = "rgba(255, 0, 0, 0.5)";
pub const CELL_NEUTRAL: &str = "rgba(255, 255, 0, 0.5)";

pub const INDICATOR_ROW: &str = "indicator";

/// Green, yellow, red.
pub const PIE_PALETTE: [&str; 3] = ["#00d084", "#f5c518", "#ff4d4f"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CandleColors {
    pub up: &'static str,
    pub down: &'static str,
    pub unchanged: &'static str,
}

impl Default for CandleColors {
    fn default() -> Self {
        Self {
            up: CANDLE_UP,
            down: CANDLE_DOWN,
            unchanged: CANDLE_UNCHANGED,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FinancialPoint {
    /// Epoch milliseconds.
    pub x: i64,
    pub o: f64,
    pub h: f64,
    pub l: f64,
    pub c: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CandlestickDataset {
    pub label: String,
    pub color: CandleColors,
    pub data: Vec<FinancialPoint>,
}

pub fn candlestick(label: &str, prices: &[PricePoint]) -> CandlestickDataset {
    CandlestickDataset {
        label: label.to_string(),
        color: CandleColors::default(),
        data: prices
            .iter()
            .map(|p| FinancialPoint {
                x: p.timestamp.timestamp_millis(),
                o: p.open,
                h: p.high,
                l: p.low,
                c: p.close,
            })
            .collect(),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatrixCell {
    pub x: String,
    pub y: &'static str,
    pub v: IndicatorValue,
}

impl MatrixCell {
    pub fn color(&self) -> &'static str {
        cell_color(&self.v)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatrixDataset {
    pub label: String,
    pub data: Vec<MatrixCell>,
}

pub fn cell_color(value: &IndicatorValue) -> &'static str {
    match value {
        IndicatorValue::Numeric(n) if *n > 0.0 => CELL_POSITIVE,
        IndicatorValue::Numeric(n) if *n < 0.0 => CELL_NEGATIVE,
        IndicatorValue::Category(Sentiment::Positive) => CELL_POSITIVE,
        IndicatorValue::Category(Sentiment::Negative) => CELL_NEGATIVE,
        _ => CELL_NEUTRAL,
    }
}

pub fn indicator_matrix(label: &str, indicators: &[Indicator]) -> MatrixDataset {
    MatrixDataset {
        label: label.to_string(),
        data: indicators
            .iter()
            .map(|i| MatrixCell {
                x: i.name.clone(),
                y: INDICATOR_ROW,
                v: i.value.clone(),
            })
            .collect(),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PieDataset {
    pub label: String,
    pub labels: Vec<String>,
    pub data: Vec<u64>,
    pub background_color: [&'static str; 3],
}

pub fn sentiment_pie(label: &str, sentiments: &[SentimentPoint]) -> PieDataset {
    PieDataset {
        label: label.to_string(),
        labels: sentiments.iter().map(|s| s.key.clone()).collect(),
        data: sentiments.iter().map(|s| s.value).collect(),
        background_color: PIE_PALETTE,
    }
}
