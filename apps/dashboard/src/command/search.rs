use stock::{Fetch, search_stock};
use tracing::{info, warn};

use crate::view;

/// Print the matches for `text`. Invoked by the debouncer.
pub async fn run<F: Fetch>(fetcher: &F, text: &str) {
    info!("searching");

    match search_stock(fetcher, text).await {
        Ok(stubs) => {
            info!(matches = stubs.len(), "search completed");
            println!("{}", view::matches(text, &stubs));
        }
        Err(e) => {
            warn!(error = %e, "search failed");
            println!("Search failed: {}", e.message);
        }
    }
}
