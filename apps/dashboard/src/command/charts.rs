use std::path::PathBuf;

use anyhow::{Context, Error, Result};
use stock::{charts::candlestick, render};
use tracing::{debug, info, instrument, warn};

use crate::{Session, command::sentiment, view};

#[instrument(name = "charts", skip(session))]
pub async fn run(session: &Session) -> Result<()> {
    let Some(ticker) = session.ticker().map(str::to_string) else {
        println!("{}", view::PLACEHOLDER);
        return Ok(());
    };

    let dir = session.config.chart_dir.clone();
    tokio::fs::create_dir_all(&dir)
        .await
        .with_context(|| format!("creating {}", dir.display()))?;

    let label = session
        .resources
        .stock
        .state()
        .data
        .map(|s| s.name.clone())
        .unwrap_or_else(|| ticker.clone());

    if let Some(prices) = session.resources.prices.state().data {
        let dataset = candlestick(&label, &prices);
        let path = dir.join(format!("{ticker}_price.png"));
        write_png(path, move || render::candlestick_png(&dataset)).await;
    }

    if let Some(pie) = sentiment::pie(session) {
        let path = dir.join(format!("{ticker}_{}_sentiment.png", pie.label));
        write_png(path, move || render::sentiment_png(&pie)).await;
    }

    Ok(())
}

async fn write_png<R>(path: PathBuf, render: R)
where
    R: FnOnce() -> Result<Vec<u8>, Error> + Send + 'static,
{
    debug!("generating chart (spawn_blocking)");
    let image_bytes = match tokio::task::spawn_blocking(render).await {
        Ok(Ok(bytes)) => bytes,
        Ok(Err(e)) => {
            warn!(error = ?e, "render failed");
            return;
        }
        Err(e) => {
            warn!(error = ?e, "spawn_blocking join failed");
            return;
        }
    };

    match tokio::fs::write(&path, &image_bytes).await {
        Ok(()) => {
            info!(path = %path.display(), bytes = image_bytes.len(), "chart written");
            println!("Chart written to {}", path.display());
        }
        Err(e) => warn!(path = %path.display(), error = ?e, "writing chart failed"),
    }
}
