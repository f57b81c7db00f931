use stock::{
    ApiClient, Feed, StockResources, SwrCache,
    model::{News, Reddit, Tweet},
};

pub mod command;
pub mod config;
pub mod view;

use config::Config;

pub type Error = anyhow::Error;

/// The three paginated feeds of the selected ticker.
pub struct Feeds {
    pub tweets: Feed<Tweet, ApiClient>,
    pub news: Feed<News, ApiClient>,
    pub reddit: Feed<Reddit, ApiClient>,
}

impl Feeds {
    pub fn new(cache: &SwrCache<ApiClient>, ticker: &str) -> Self {
        Self {
            tweets: Feed::for_ticker(cache.clone(), ticker),
            news: Feed::for_ticker(cache.clone(), ticker),
            reddit: Feed::for_ticker(cache.clone(), ticker),
        }
    }

    pub async fn load_initial(&self) {
        tokio::join!(
            self.tweets.load_initial(),
            self.news.load_initial(),
            self.reddit.load_initial()
        );
    }
}

pub struct Session {
    pub config: Config,
    pub cache: SwrCache<ApiClient>,
    pub resources: StockResources<ApiClient>,
    pub feeds: Option<Feeds>,
}

impl Session {
    pub fn new(config: Config, client: ApiClient) -> Self {
        let cache = SwrCache::new(client, config.cache);
        Self {
            resources: StockResources::new(cache.clone()),
            cache,
            config,
            feeds: None,
        }
    }

    pub fn ticker(&self) -> Option<&str> {
        self.resources.ticker()
    }
}
