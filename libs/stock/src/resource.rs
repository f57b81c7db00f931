use std::{future::Future, sync::Arc};

use serde::de::DeserializeOwned;
use tokio::sync::watch;
use tracing::debug;

use crate::{
    Fetch, FetchError, SwrCache,
    model::{Indicator, PricePoint, SentimentPoint, SentimentSource, Stock},
    routes,
};

#[derive(Debug)]
pub struct ResourceState<T> {
    pub key: Option<String>,
    pub data: Option<Arc<T>>,
    pub error: Option<FetchError>,
}

impl<T> Default for ResourceState<T> {
    fn default() -> Self {
        Self {
            key: None,
            data: None,
            error: None,
        }
    }
}

impl<T> Clone for ResourceState<T> {
    fn clone(&self) -> Self {
        Self {
            key: self.key.clone(),
            data: self.data.clone(),
            error: self.error.clone(),
        }
    }
}

impl<T> ResourceState<T> {
    /// Neither data nor an error has arrived yet.
    pub fn loading(&self) -> bool {
        self.data.is_none() && self.error.is_none()
    }

    /// Nothing selected; a placeholder rather than a load.
    pub fn is_idle(&self) -> bool {
        self.key.is_none()
    }
}

/// One cached value bound to a switchable key.
pub struct Resource<T, F> {
    cache: SwrCache<F>,
    state: Arc<watch::Sender<ResourceState<T>>>,
}

impl<T, F> Resource<T, F> {
    pub fn state(&self) -> ResourceState<T> {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<ResourceState<T>> {
        self.state.subscribe()
    }

    pub fn key(&self) -> Option<String> {
        self.state.borrow().key.clone()
    }
}

impl<T, F> Resource<T, F>
where
    T: DeserializeOwned + Send + Sync + 'static,
    F: Fetch,
{
    pub fn new(cache: SwrCache<F>) -> Self {
        let (state, _) = watch::channel(ResourceState::default());
        Self {
            cache,
            state: Arc::new(state),
        }
    }

    /// Switch to `key` immediately and return the fetch for it.
    ///
    /// The returned future only writes into the exposed state while `key` is
    /// still current, so an overtaken response can never replace data for a
    /// newer selection.
    pub fn load(&self, key: Option<String>) -> impl Future<Output = ()> + Send + use<T, F> {
        let switched = self.state.send_if_modified(|s| {
            if s.key == key {
                return false;
            }
            *s = ResourceState {
                key: key.clone(),
                data: None,
                error: None,
            };
            true
        });

        let cache = self.cache.clone();
        let state = Arc::clone(&self.state);

        async move {
            let Some(key) = key else {
                return;
            };

            if switched && let Some(stale) = cache.peek::<T>(&key).await {
                apply(&state, &key, Ok(stale));
            }

            let result = cache.get::<T>(&key).await;
            apply(&state, &key, result);
        }
    }

    pub fn revalidate(&self) -> impl Future<Output = ()> + Send + use<T, F> {
        let key = self.key();
        self.load(key)
    }
}

fn apply<T>(
    state: &watch::Sender<ResourceState<T>>,
    key: &str,
    result: Result<Arc<T>, FetchError>,
) {
    state.send_if_modified(|s| {
        if s.key.as_deref() != Some(key) {
            debug!(key, current = ?s.key, "discarding result for previous key");
            return false;
        }
        match result {
            Ok(data) => {
                s.data = Some(data);
                s.error = None;
            }
            Err(e) => s.error = Some(e),
        }
        true
    });
}

/// Per-ticker accessors of the dashboard, switched together.
pub struct StockResources<F> {
    pub stock: Resource<Stock, F>,
    pub prices: Resource<Vec<PricePoint>, F>,
    pub indicators: Resource<Vec<Indicator>, F>,
    pub sentiment: Resource<Vec<SentimentPoint>, F>,
    ticker: Option<String>,
    source: SentimentSource,
}

impl<F: Fetch> StockResources<F> {
    pub fn new(cache: SwrCache<F>) -> Self {
        Self {
            stock: Resource::new(cache.clone()),
            prices: Resource::new(cache.clone()),
            indicators: Resource::new(cache.clone()),
            sentiment: Resource::new(cache),
            ticker: None,
            source: SentimentSource::default(),
        }
    }

    pub fn ticker(&self) -> Option<&str> {
        self.ticker.as_deref()
    }

    pub fn sentiment_source(&self) -> SentimentSource {
        self.source
    }

    pub fn select(&mut self, ticker: &str) -> impl Future<Output = ()> + Send + use<F> {
        self.ticker = routes::normalize(ticker);

        let stock = self.stock.load(routes::stock(ticker));
        let prices = self.prices.load(routes::price(ticker));
        let indicators = self.indicators.load(routes::indicators(ticker));
        let sentiment = self.sentiment.load(routes::sentiment(ticker, self.source));

        async move {
            tokio::join!(stock, prices, indicators, sentiment);
        }
    }

    /// Refetch everything for the current ticker; data stays visible meanwhile.
    pub fn revalidate(&self) -> impl Future<Output = ()> + Send + use<F> {
        let stock = self.stock.revalidate();
        let prices = self.prices.revalidate();
        let indicators = self.indicators.revalidate();
        let sentiment = self.sentiment.revalidate();

        async move {
            tokio::join!(stock, prices, indicators, sentiment);
        }
    }

    pub fn set_sentiment_source(
        &mut self,
        source: SentimentSource,
    ) -> impl Future<Output = ()> + Send + use<F> {
        self.source = source;
        let key = self
            .ticker
            .as_deref()
            .and_then(|t| routes::sentiment(t, source));
        self.sentiment.load(key)
    }
}
