mod cache;
mod client;
mod debounce;
mod error;
mod feed;
mod resource;
mod search;
#[cfg(test)]
mod testing;

pub mod charts;
pub mod model;
pub mod render;
pub mod routes;

pub use cache::{CacheConfig, SwrCache};
pub use client::{ApiClient, Fetch, fetch_as};
pub use debounce::Debouncer;
pub use error::FetchError;
pub use feed::{Feed, FeedPhase, FeedState, KeyFn};
pub use resource::{Resource, ResourceState, StockResources};
pub use search::search_stock;
