use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;

use crate::application::ports::{FetchError, MediaFetcher};
use crate::presentation::config::MediaSettings;

use super::http_media_fetcher::HttpMediaFetcher;
use super::local_media_fetcher::LocalMediaFetcher;

/// Dispatches on the URL scheme: `http(s)://` goes over the network,
/// `file://` to the local root when one is configured.
pub struct SchemeRoutingFetcher {
    http: HttpMediaFetcher,
    local: Option<LocalMediaFetcher>,
}

#[async_trait]
impl MediaFetcher for SchemeRoutingFetcher {
    async fn fetch(&self, url: &str) -> Result<Bytes, FetchError> {
        let scheme = url
            .split_once("://")
            .map(|(scheme, _)| scheme.to_ascii_lowercase())
            .ok_or_else(|| FetchError::InvalidUrl(url.to_string()))?;

        match (scheme.as_str(), &self.local) {
            ("http" | "https", _) => self.http.fetch(url).await,
            ("file", Some(local)) => local.fetch(url).await,
            _ => Err(FetchError::UnsupportedScheme(scheme)),
        }
    }
}

pub struct MediaFetcherFactory;

impl MediaFetcherFactory {
    pub fn create(settings: &MediaSettings) -> Result<Arc<dyn MediaFetcher>, FetchError> {
        let local = settings
            .local_root
            .as_ref()
            .map(|root| LocalMediaFetcher::new(PathBuf::from(root), settings.max_bytes))
            .transpose()?;

        tracing::info!(
            local_root = ?settings.local_root,
            max_bytes = settings.max_bytes,
            "Media fetcher configured"
        );

        Ok(Arc::new(SchemeRoutingFetcher {
            http: HttpMediaFetcher::new(settings.max_bytes),
            local,
        }))
    }
}
