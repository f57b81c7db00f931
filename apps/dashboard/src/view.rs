//! Plain-text rendering of the dashboard for a terminal.

use chrono_tz::Tz;
use stock::{
    FeedState, FetchError, ResourceState,
    charts::{CELL_NEGATIVE, CELL_POSITIVE, CandlestickDataset, MatrixDataset, PieDataset},
    model::{FeedItem, FeedKind, Stock, StockStub},
};

pub const PLACEHOLDER: &str = "Please select a stock";

const CONTENT_WIDTH: usize = 160;

pub fn unavailable(section: &str, error: &FetchError) -> String {
    format!("{section}: unavailable ({})", error.message)
}

/// `Some(text)` for the loading and error placeholders of a resource.
pub fn placeholder<T>(section: &str, state: &ResourceState<T>) -> Option<String> {
    if state.is_idle() {
        return Some(format!("{section}: {PLACEHOLDER}"));
    }
    if let Some(error) = &state.error
        && state.data.is_none()
    {
        return Some(unavailable(section, error));
    }
    state.loading().then(|| format!("{section}: loading…"))
}

pub fn matches(text: &str, stubs: &[StockStub]) -> String {
    if stubs.is_empty() {
        return format!("No matches for {text:?}");
    }
    stubs
        .iter()
        .map(|s| format!("  {}", s.label()))
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn profile(stock: &Stock) -> String {
    let mut out = format!("== {} ({}) ==", stock.name, stock.ticker);
    if let Some(summary) = stock.summary.as_deref().filter(|s| !s.is_empty()) {
        out.push('\n');
        out.push_str(&truncate(summary, CONTENT_WIDTH * 2));
    }
    out
}

pub fn price_summary(dataset: &CandlestickDataset) -> String {
    let (Some(first), Some(last)) = (dataset.data.first(), dataset.data.last()) else {
        return "Prices: no data".to_string();
    };

    let high = dataset.data.iter().map(|p| p.h).fold(f64::MIN, f64::max);
    let low = dataset.data.iter().map(|p| p.l).fold(f64::MAX, f64::min);
    let change = if first.o == 0.0 {
        0.0
    } else {
        (last.c - first.o) / first.o * 100.0
    };

    format!(
        "Prices: {} candles | last ${:.2} | range ${:.2}-${:.2} | {:+.2}%",
        dataset.data.len(),
        last.c,
        low,
        high,
        change
    )
}

fn color_name(color: &str) -> &'static str {
    match color {
        CELL_POSITIVE => "green",
        CELL_NEGATIVE => "red",
        _ => "yellow",
    }
}

pub fn indicators(matrix: &MatrixDataset) -> String {
    if matrix.data.is_empty() {
        return "Indicators: no data".to_string();
    }
    let cells: Vec<String> = matrix
        .data
        .iter()
        .map(|cell| format!("{}={} [{}]", cell.x, cell.v, color_name(cell.color())))
        .collect();
    format!("Indicators: {}", cells.join("  "))
}

pub fn sentiment(pie: &PieDataset) -> String {
    let total: u64 = pie.data.iter().sum();
    if total == 0 {
        return format!("Sentiment ({}): no data", pie.label);
    }
    let slices: Vec<String> = pie
        .labels
        .iter()
        .zip(&pie.data)
        .map(|(label, count)| {
            format!("{label} {count} ({:.0}%)", *count as f64 / total as f64 * 100.0)
        })
        .collect();
    format!("Sentiment ({}): {}", pie.label, slices.join(", "))
}

fn truncate(text: &str, width: usize) -> String {
    let text = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if text.chars().count() <= width {
        return text;
    }
    let mut cut: String = text.chars().take(width).collect();
    cut.push('…');
    cut
}

pub fn feed_item(item: &FeedItem, tz: Tz) -> String {
    let when = item.timestamp().with_timezone(&tz).format("%Y-%m-%d %H:%M %Z");
    let sentiment = item.sentiment().map(|s| s.as_str()).unwrap_or("unset");

    let extra = match item {
        FeedItem::Tweet(t) => format!(
            "likes {} · retweets {} · replies {}",
            t.likes, t.retweets, t.replies
        ),
        FeedItem::News(n) => format!("source {}", n.source),
        FeedItem::Reddit(r) => format!("score {} · comments {}", r.score, r.num_comments),
    };

    format!(
        "[{} {when}] {}\n    {}\n    {extra} · sentiment {sentiment} · {}",
        item.kind().as_str(),
        truncate(item.headline(), CONTENT_WIDTH),
        truncate(item.content(), CONTENT_WIDTH),
        item.url()
    )
}

pub fn feed_footer<T>(kind: FeedKind, state: &FeedState<T>) -> String {
    let mut out = match state.total() {
        Some(total) => format!("{}: {} of {} loaded", kind.as_str(), state.len(), total),
        None => format!("{}: nothing loaded", kind.as_str()),
    };
    if let Some(error) = &state.error {
        out.push_str(&format!(" · {}", unavailable("last page", error)));
    }
    if state.has_more() {
        out.push_str(&format!(" · /more {} for more", kind.as_str()));
    } else {
        out.push_str(" · End");
    }
    out
}
