use anyhow::Result;
use chrono_tz::Tz;
use serde::de::DeserializeOwned;
use stock::{
    ApiClient, Feed,
    model::{FeedEntry, FeedItem, FeedKind},
};
use tracing::{debug, instrument};

use crate::{Session, view};

#[instrument(name = "more", skip(session), fields(feed = kind.as_str()))]
pub async fn run(session: &mut Session, kind: FeedKind) -> Result<()> {
    let Some(feeds) = &session.feeds else {
        println!("{}", view::PLACEHOLDER);
        return Ok(());
    };
    let tz = session.config.display_tz;

    match kind {
        FeedKind::Tweets => more(&feeds.tweets, tz).await,
        FeedKind::News => more(&feeds.news, tz).await,
        FeedKind::Reddit => more(&feeds.reddit, tz).await,
    }
    Ok(())
}

async fn more<T>(feed: &Feed<T, ApiClient>, tz: Tz)
where
    T: FeedEntry + Clone + Into<FeedItem> + DeserializeOwned + Send + Sync + 'static,
{
    let before = feed.state().len();
    if !feed.load_more().await {
        debug!("nothing more to load");
    }
    print_page(feed, before, tz);
}

/// Print the items from index `from` onward, then the feed footer.
pub fn print_page<T>(feed: &Feed<T, ApiClient>, from: usize, tz: Tz)
where
    T: FeedEntry + Clone + Into<FeedItem>,
{
    let state = feed.state();
    for item in state.items().skip(from) {
        println!("{}", view::feed_item(&item.clone().into(), tz));
    }
    println!("{}", view::feed_footer(T::KIND, &state));
}
