use thiserror::Error;

/// Any failure behind a cache key: transport, non-2xx status or an
/// unexpected JSON shape. Cloned into every subscriber of the key.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("fetch {key} failed: {message}")]
pub struct FetchError {
    pub key: String,
    pub message: String,
}

impl FetchError {
    pub fn new(key: impl Into<String>, err: &anyhow::Error) -> Self {
        Self {
            key: key.into(),
            message: format!("{err:#}"),
        }
    }
}
