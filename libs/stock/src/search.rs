use crate::{
    Fetch, FetchError,
    client::fetch_as,
    model::{PaginatedList, StockStub},
    routes,
};

/// First page of matches for `text`. One request, no cache, no retry.
pub async fn search_stock<F: Fetch>(
    fetcher: &F,
    text: &str,
) -> Result<Vec<StockStub>, FetchError> {
    let page: PaginatedList<StockStub> = fetch_as(fetcher, &routes::search(text)).await?;
    Ok(page.items)
}
