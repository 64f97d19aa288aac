use async_trait::async_trait;
use bytes::Bytes;

#[async_trait]
pub trait MediaFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<Bytes, FetchError>;
}

#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("invalid media url: {0}")]
    InvalidUrl(String),
    #[error("unsupported url scheme: {0}")]
    UnsupportedScheme(String),
    #[error("media request returned status {status} for {url}")]
    Status { status: u16, url: String },
    #[error("network failure: {0}")]
    Network(String),
    #[error("media not found: {0}")]
    NotFound(String),
    #[error("media exceeds {limit} bytes")]
    TooLarge { limit: u64 },
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
