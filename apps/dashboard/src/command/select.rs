use anyhow::Result;
use stock::{
    charts::{candlestick, indicator_matrix},
    model::Indicator,
    routes,
};
use tracing::{info, instrument};

use crate::{Feeds, Session, command, view};

#[instrument(name = "select", skip(session))]
pub async fn run(session: &mut Session, ticker: &str) -> Result<()> {
    let Some(ticker) = routes::normalize(ticker) else {
        println!("{}", view::PLACEHOLDER);
        return Ok(());
    };

    let feeds = Feeds::new(&session.cache, &ticker);
    let resources = session.resources.select(&ticker);
    tokio::join!(resources, feeds.load_initial());
    session.feeds = Some(feeds);

    info!("dashboard loaded");
    print_overview(session);

    command::charts::run(session).await
}

#[instrument(name = "refresh", skip(session))]
pub async fn refresh(session: &mut Session) -> Result<()> {
    if session.ticker().is_none() {
        println!("{}", view::PLACEHOLDER);
        return Ok(());
    }

    session.resources.revalidate().await;
    info!("dashboard refreshed");
    print_overview(session);
    Ok(())
}

pub fn print_overview(session: &Session) {
    let stock = session.resources.stock.state();
    let Some(profile) = &stock.data else {
        println!("{}", view::placeholder("Profile", &stock).unwrap_or_default());
        return;
    };
    println!("{}", view::profile(profile));

    let prices = session.resources.prices.state();
    match &prices.data {
        Some(data) => println!("{}", view::price_summary(&candlestick(&profile.name, data))),
        None => println!("{}", view::placeholder("Prices", &prices).unwrap_or_default()),
    }

    let indicators = session.resources.indicators.state();
    match &indicators.data {
        Some(data) => {
            let mut data = data.to_vec();
            data.sort_by_key(Indicator::kind);
            println!("{}", view::indicators(&indicator_matrix(&profile.name, &data)));
        }
        None => println!(
            "{}",
            view::placeholder("Indicators", &indicators).unwrap_or_default()
        ),
    }

    command::sentiment::print(session);

    if let Some(feeds) = &session.feeds {
        command::more::print_page(&feeds.tweets, 0, session.config.display_tz);
        command::more::print_page(&feeds.news, 0, session.config.display_tz);
        command::more::print_page(&feeds.reddit, 0, session.config.display_tz);
    }
}
