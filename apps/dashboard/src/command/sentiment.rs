use anyhow::Result;
use stock::{
    charts::{PieDataset, sentiment_pie},
    model::SentimentSource,
};
use tracing::instrument;

use crate::{Session, view};

#[instrument(name = "sentiment", skip(session, source), fields(source = source.as_str()))]
pub async fn run(session: &mut Session, source: SentimentSource) -> Result<()> {
    if session.ticker().is_none() {
        println!("{}", view::PLACEHOLDER);
        return Ok(());
    }

    session.resources.set_sentiment_source(source).await;
    print(session);
    Ok(())
}

pub fn pie(session: &Session) -> Option<PieDataset> {
    let label = session.resources.sentiment_source().as_str();
    let state = session.resources.sentiment.state();
    state.data.map(|points| sentiment_pie(label, &points))
}

pub fn print(session: &Session) {
    match pie(session) {
        Some(pie) => println!("{}", view::sentiment(&pie)),
        None => {
            let state = session.resources.sentiment.state();
            println!("{}", view::placeholder("Sentiment", &state).unwrap_or_default());
        }
    }
}
