use anyhow::{Error, ensure};
use charming::{
    Chart, ImageFormat, ImageRenderer,
    component::{Axis, Title},
    element::{AxisLabel, AxisType, Color, LineStyle, SplitLine, TextStyle},
    series::{Candlestick, Pie},
};
use chrono::DateTime;

use crate::charts::{CandlestickDataset, PieDataset};

const LOOKBACK: usize = 90;
const WIDTH: u32 = 1200;
const HEIGHT: u32 = 600;
const BACKGROUND: &str = "#0b0c17";

fn title(text: String) -> Title {
    Title::new()
        .text(text)
        .left("center")
        .top("2%")
        .text_style(TextStyle::new().color("#ffffff").font_size(14))
}

fn render(chart: &Chart) -> Result<Vec<u8>, Error> {
    let mut renderer = ImageRenderer::new(WIDTH, HEIGHT);
    let png_bytes = renderer.render_format(ImageFormat::Png, chart)?;
    Ok(png_bytes)
}

/// PNG of the most recent candles in `dataset`.
pub fn candlestick_png(dataset: &CandlestickDataset) -> Result<Vec<u8>, Error> {
    ensure!(!dataset.data.is_empty(), "no price data for {}", dataset.label);

    let start_idx = dataset.data.len().saturating_sub(LOOKBACK);
    let candles = &dataset.data[start_idx..];

    let dates: Vec<String> = candles
        .iter()
        .map(|p| {
            DateTime::from_timestamp_millis(p.x)
                .map(|d| d.format("%Y-%m-%d").to_string())
                .unwrap_or_default()
        })
        .collect();

    // ECharts candle order: open, close, low, high
    let values: Vec<Vec<f64>> = candles.iter().map(|p| vec![p.o, p.c, p.l, p.h]).collect();

    let last_close = candles.last().map(|p| p.c).unwrap_or_default();

    let chart = Chart::new()
        .background_color(BACKGROUND)
        .title(title(format!("{} | ${:.2}", dataset.label, last_close)))
        .x_axis(
            Axis::new()
                .type_(AxisType::Category)
                .data(dates)
                .axis_label(AxisLabel::new().rotate(45).interval(9).color("#a0a0a0"))
                .split_line(SplitLine::new().line_style(LineStyle::new().color("#2d2f45"))),
        )
        .y_axis(
            Axis::new()
                .type_(AxisType::Value)
                .scale(true)
                .axis_label(AxisLabel::new().color("#a0a0a0"))
                .split_line(SplitLine::new().line_style(LineStyle::new().color("#2d2f45"))),
        )
        .series(Candlestick::new().name(dataset.label.as_str()).data(values));

    render(&chart)
}

/// PNG pie of sentiment counts, coloured with the dataset's palette.
pub fn sentiment_png(dataset: &PieDataset) -> Result<Vec<u8>, Error> {
    ensure!(
        dataset.labels.len() == dataset.data.len(),
        "length mismatch: labels={}, data={}",
        dataset.labels.len(),
        dataset.data.len()
    );
    ensure!(
        dataset.data.iter().any(|v| *v > 0),
        "no sentiment counts for {}",
        dataset.label
    );

    let slices: Vec<(f64, &str)> = dataset
        .data
        .iter()
        .zip(&dataset.labels)
        .map(|(value, label)| (*value as f64, label.as_str()))
        .collect();

    let chart = Chart::new()
        .background_color(BACKGROUND)
        .color(dataset.background_color.iter().map(|c| Color::from(*c)).collect())
        .title(title(format!("{} sentiment", dataset.label)))
        .series(Pie::new().name(dataset.label.as_str()).radius("60%").data(slices));

    render(&chart)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::charts::{CandleColors, PIE_PALETTE};

    #[test]
    fn refuses_empty_inputs() {
        let candles = CandlestickDataset {
            label: "AAPL".into(),
            color: CandleColors::default(),
            data: vec![],
        };
        assert!(candlestick_png(&candles).is_err());

        let pie = PieDataset {
            label: "tweet".into(),
            labels: vec!["positive".into()],
            data: vec![0],
            background_color: PIE_PALETTE,
        };
        assert!(sentiment_png(&pie).is_err());
    }
}
