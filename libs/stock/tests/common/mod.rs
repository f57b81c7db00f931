use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
    time::Duration,
};

use anyhow::{Result, anyhow};
use serde_json::Value;
use stock::Fetch;

/// Serves fixed JSON per path after an optional delay and logs requests.
#[derive(Clone, Default)]
pub struct StaticFetch {
    routes: Arc<Mutex<HashMap<String, (Value, Duration)>>>,
    log: Arc<Mutex<Vec<String>>>,
}

impl StaticFetch {
    pub fn route(self, path: &str, body: Value) -> Self {
        self.route_delayed(path, body, Duration::ZERO)
    }

    pub fn route_delayed(self, path: &str, body: Value, delay: Duration) -> Self {
        self.routes
            .lock()
            .unwrap()
            .insert(path.to_string(), (body, delay));
        self
    }

    pub fn log(&self) -> Vec<String> {
        self.log.lock().unwrap().clone()
    }
}

impl Fetch for StaticFetch {
    async fn get_json(&self, path: &str) -> Result<Value> {
        self.log.lock().unwrap().push(path.to_string());
        let route = self.routes.lock().unwrap().get(path).cloned();
        let (body, delay) = route.ok_or_else(|| anyhow!("404 Not Found: {path}"))?;
        tokio::time::sleep(delay).await;
        Ok(body)
    }
}
