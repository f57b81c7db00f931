use std::sync::Arc;

use anyhow::Result;
use dashboard::{
    Session,
    command::{self, Command, HELP},
    config::Config,
};
use stock::{ApiClient, Debouncer};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{error, info};
use tracing_futures::Instrument;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = Config::from_env()?;
    let client = ApiClient::new(&config.api_base_url, config.api_timeout)?;
    info!(
        base_api = client.base_api(),
        version = %config.version,
        "dashboard starting"
    );

    let mut session = Session::new(config.clone(), client);

    let fetcher = Arc::clone(session.cache.fetcher());
    let mut search = Debouncer::new(config.search_debounce, move |text: String| {
        let fetcher = Arc::clone(&fetcher);
        let span = tracing::info_span!("search", text = %text);
        async move { command::search::run(fetcher.as_ref(), &text).await }.instrument(span)
    });

    println!("{HELP}");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let shutdown = shutdown_signal();
    tokio::pin!(shutdown);

    loop {
        let line = tokio::select! {
            line = lines.next_line() => line?,
            _ = &mut shutdown => break,
        };
        let Some(line) = line else {
            break;
        };

        let command = match line.parse::<Command>() {
            Ok(c) => c,
            Err(e) => {
                println!("{e}");
                continue;
            }
        };

        match command {
            Command::Quit => break,
            Command::Search(text) => search.schedule(text),
            other => {
                if let Err(e) = command::run(&mut session, other).await {
                    error!(error = ?e, "command failed");
                    println!("Error: {e:#}");
                }
            }
        }
    }

    search.cancel();
    info!("Shutdown complete.");
    Ok(())
}

async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::{
            select,
            signal::unix::{SignalKind, signal},
        };
        let (Ok(mut sigterm), Ok(mut sigint)) = (
            signal(SignalKind::terminate()),
            signal(SignalKind::interrupt()),
        ) else {
            error!("failed to install signal handlers");
            return std::future::pending().await;
        };
        select! {
            _ = sigterm.recv() => {},
            _ = sigint.recv()  => {},
        }
    }

    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}
