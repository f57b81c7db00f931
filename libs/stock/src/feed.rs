use std::sync::Arc;

use serde::de::DeserializeOwned;
use tokio::sync::watch;
use tracing::{debug, info};

use crate::{
    Fetch, FetchError, SwrCache,
    model::{FeedEntry, PaginatedList},
    routes,
};

/// `(page_index, previous_page) -> key`; `None` means no further pages.
pub type KeyFn<T> = Box<dyn Fn(usize, Option<&PaginatedList<T>>) -> Option<String> + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FeedPhase {
    #[default]
    Idle,
    LoadingInitial,
    LoadingMore,
}

#[derive(Debug)]
pub struct FeedState<T> {
    pub pages: Vec<Arc<PaginatedList<T>>>,
    /// Number of pages requested so far.
    pub size: usize,
    pub phase: FeedPhase,
    pub exhausted: bool,
    pub error: Option<FetchError>,
}

impl<T> Default for FeedState<T> {
    fn default() -> Self {
        Self {
            pages: Vec::new(),
            size: 0,
            phase: FeedPhase::Idle,
            exhausted: false,
            error: None,
        }
    }
}

impl<T> Clone for FeedState<T> {
    fn clone(&self) -> Self {
        Self {
            pages: self.pages.clone(),
            size: self.size,
            phase: self.phase,
            exhausted: self.exhausted,
            error: self.error.clone(),
        }
    }
}

impl<T> FeedState<T> {
    /// Every loaded item, in page order.
    pub fn items(&self) -> impl Iterator<Item = &T> {
        self.pages.iter().flat_map(|p| p.items.iter())
    }

    pub fn len(&self) -> usize {
        self.pages.iter().map(|p| p.items.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Total reported by the first page.
    pub fn total(&self) -> Option<usize> {
        self.pages.first().map(|p| p.total)
    }

    pub fn has_more(&self) -> bool {
        !self.exhausted
    }

    pub fn is_loading(&self) -> bool {
        self.phase != FeedPhase::Idle
    }
}

/// A paginated resource presented as one growing list.
pub struct Feed<T, F> {
    cache: SwrCache<F>,
    get_key: KeyFn<T>,
    state: watch::Sender<FeedState<T>>,
}

impl<T, F> Feed<T, F> {
    pub fn state(&self) -> FeedState<T> {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<FeedState<T>> {
        self.state.subscribe()
    }
}

impl<T, F> Feed<T, F>
where
    T: DeserializeOwned + Send + Sync + 'static,
    F: Fetch,
{
    pub fn new(
        cache: SwrCache<F>,
        get_key: impl Fn(usize, Option<&PaginatedList<T>>) -> Option<String>
        + Send
        + Sync
        + 'static,
    ) -> Self {
        let (state, _) = watch::channel(FeedState::default());
        Self {
            cache,
            get_key: Box::new(get_key),
            state,
        }
    }

    /// The tweets, news or Reddit feed of `ticker`, chosen by `T`.
    pub fn for_ticker(cache: SwrCache<F>, ticker: &str) -> Self
    where
        T: FeedEntry,
    {
        Self::new(cache, routes::feed_key_fn(T::KIND, ticker))
    }

    /// Fetch the first page. Returns false when a load is already running.
    pub async fn load_initial(&self) -> bool {
        let started = self.state.send_if_modified(|s| {
            if s.is_loading() {
                return false;
            }
            s.size = s.size.max(1);
            s.phase = FeedPhase::LoadingInitial;
            true
        });
        if !started {
            return false;
        }

        self.fill().await;
        true
    }

    /// Advance by one page if another key can be generated.
    ///
    /// After a failed page this retries that page instead of advancing.
    /// Returns whether a load was started.
    pub async fn load_more(&self) -> bool {
        if self.state.borrow().pages.is_empty() {
            return self.load_initial().await;
        }

        let started = self.state.send_if_modified(|s| {
            if s.is_loading() || s.exhausted {
                return false;
            }
            let retry = s.error.is_some() && s.pages.len() < s.size;
            if !retry {
                s.size += 1;
            }
            s.phase = FeedPhase::LoadingMore;
            true
        });
        if !started {
            return false;
        }

        self.fill().await;
        true
    }

    async fn fill(&self) {
        loop {
            let next = {
                let s = self.state.borrow();
                if s.pages.len() >= s.size {
                    break;
                }
                let index = s.pages.len();
                (self.get_key)(index, s.pages.last().map(|p| &**p))
            };

            let Some(key) = next else {
                debug!("no further page keys");
                self.state.send_modify(|s| {
                    s.size = s.pages.len();
                    s.exhausted = true;
                });
                break;
            };

            match self.cache.get::<PaginatedList<T>>(&key).await {
                Ok(page) => {
                    info!(key, page = page.page, items = page.items.len(), "page loaded");
                    if !page.is_consistent() {
                        debug!(
                            key,
                            total = page.total,
                            pages = page.pages,
                            "page metadata ignored"
                        );
                    }
                    self.state.send_modify(|s| {
                        s.pages.push(page);
                        s.error = None;
                    });
                }
                Err(e) => {
                    self.state.send_modify(|s| {
                        s.error = Some(e);
                        s.phase = FeedPhase::Idle;
                    });
                    return;
                }
            }
        }

        self.state.send_modify(|s| {
            if let Some(last) = s.pages.last()
                && (self.get_key)(s.pages.len(), Some(last)).is_none()
            {
                s.exhausted = true;
            }
            s.phase = FeedPhase::Idle;
        });
    }
}
