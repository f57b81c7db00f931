use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
    time::Duration,
};

use anyhow::{Result, bail};
use serde_json::Value;

use crate::Fetch;

#[derive(Clone)]
struct Route {
    body: Result<Value, String>,
    delay: Duration,
}

#[derive(Default)]
struct Inner {
    routes: HashMap<String, Route>,
    requests: Vec<String>,
}

/// Scripted fetcher: fixed JSON per path, optional delay, request log.
#[derive(Clone, Default)]
pub struct MockFetch {
    inner: Arc<Mutex<Inner>>,
}

impl MockFetch {
    pub fn new() -> Self {
        Self::default()
    }

    fn route(self, path: &str, body: Result<Value, String>, delay: Duration) -> Self {
        self.inner
            .lock()
            .unwrap()
            .routes
            .insert(path.to_string(), Route { body, delay });
        self
    }

    pub fn with(self, path: &str, body: Value) -> Self {
        self.route(path, Ok(body), Duration::ZERO)
    }

    pub fn with_delay(self, path: &str, body: Value, delay: Duration) -> Self {
        self.route(path, Ok(body), delay)
    }

    pub fn failing(self, path: &str, message: &str) -> Self {
        self.route(path, Err(message.to_string()), Duration::ZERO)
    }

    pub fn requests(&self) -> Vec<String> {
        self.inner.lock().unwrap().requests.clone()
    }

    pub fn count(&self, path: &str) -> usize {
        self.requests().iter().filter(|p| *p == path).count()
    }
}

impl Fetch for MockFetch {
    async fn get_json(&self, path: &str) -> Result<Value> {
        let route = {
            let mut inner = self.inner.lock().unwrap();
            inner.requests.push(path.to_string());
            inner.routes.get(path).cloned()
        };

        let Some(route) = route else {
            bail!("404 Not Found: {path}");
        };

        if !route.delay.is_zero() {
            tokio::time::sleep(route.delay).await;
        }
        route.body.map_err(anyhow::Error::msg)
    }
}
