mod http_media_fetcher;
mod local_media_fetcher;
mod media_fetcher_factory;

pub use http_media_fetcher::HttpMediaFetcher;
pub use local_media_fetcher::LocalMediaFetcher;
pub use media_fetcher_factory::{MediaFetcherFactory, SchemeRoutingFetcher};
