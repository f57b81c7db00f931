use std::{future::Future, time::Duration};

use anyhow::{Context, Result, ensure};
use reqwest::{
    Client,
    header::{ACCEPT, HeaderMap, HeaderValue},
};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

use crate::FetchError;

/// Uniform fetcher behind every cache key. Keys are API paths such as
/// `/api/stock/AAPL/price`.
pub trait Fetch: Send + Sync + 'static {
    fn get_json(&self, path: &str) -> impl Future<Output = Result<Value>> + Send;
}

/// Fetch `path` and decode it into `T`, collapsing every failure into a
/// [`FetchError`] for that key.
pub async fn fetch_as<T, F>(fetcher: &F, path: &str) -> Result<T, FetchError>
where
    T: DeserializeOwned,
    F: Fetch + ?Sized,
{
    let value = fetcher
        .get_json(path)
        .await
        .map_err(|e| FetchError::new(path, &e))?;

    serde_json::from_value(value)
        .context("unexpected response shape")
        .map_err(|e| FetchError::new(path, &e))
}

#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_api: String,
}

impl ApiClient {
    pub fn new(base_api: impl Into<String>, timeout: Duration) -> Result<Self> {
        let base_api = base_api.into().trim().trim_end_matches('/').to_string();
        ensure!(
            base_api.starts_with("http://") || base_api.starts_with("https://"),
            "base url must start with http:// or https://, got {base_api:?}"
        );

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()?;

        Ok(Self { client, base_api })
    }

    pub fn base_api(&self) -> &str {
        &self.base_api
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_api, path.trim_start_matches('/'))
    }

    /// GET `path` and unwrap the JSON body.
    pub async fn fetch<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = self.url(path);
        debug!(%url, "GET");

        let res = self
            .client
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        Ok(res)
    }
}

impl Fetch for ApiClient {
    async fn get_json(&self, path: &str) -> Result<Value> {
        self.fetch(path).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{CacheConfig, SwrCache};
    use tokio::{
        io::{AsyncReadExt, AsyncWriteExt},
        net::TcpListener,
    };

    /// Answers a single request on a local port with `status` and `body`.
    async fn serve_once(status: &str, body: &str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let response = format!(
            "HTTP/1.1 {status}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
            body.len()
        );

        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = [0u8; 4096];
            let _ = socket.read(&mut buf).await.unwrap();
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.ok();
        });

        format!("http://{addr}")
    }

    #[test]
    fn joins_base_and_path() {
        let client = ApiClient::new("http://localhost:8000/", Duration::from_secs(1)).unwrap();

        assert_eq!(client.base_api(), "http://localhost:8000");
        assert_eq!(
            client.url("/api/stock/AAPL"),
            "http://localhost:8000/api/stock/AAPL"
        );
    }

    #[test]
    fn rejects_base_without_scheme() {
        assert!(ApiClient::new("localhost:8000", Duration::from_secs(1)).is_err());
    }

    #[tokio::test]
    async fn decodes_a_successful_response() {
        let base = serve_once("200 OK", r#"{"ticker":"AAPL","name":"Apple Inc."}"#).await;
        let client = ApiClient::new(base, Duration::from_secs(5)).unwrap();

        let stub: crate::model::StockStub = client.fetch("/api/stock/AAPL").await.unwrap();

        assert_eq!(stub.label(), "Apple Inc. (AAPL)");
    }

    #[tokio::test]
    async fn non_success_status_becomes_fetch_error() {
        let base = serve_once("503 Service Unavailable", "{}").await;
        let client = ApiClient::new(base, Duration::from_secs(5)).unwrap();
        let cache = SwrCache::new(client, CacheConfig::default());

        let err = cache.get::<Value>("/api/stock/AAPL").await.unwrap_err();

        assert_eq!(err.key, "/api/stock/AAPL");
        assert!(err.message.contains("503"), "{}", err.message);
    }
}
