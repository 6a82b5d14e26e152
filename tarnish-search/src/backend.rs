use crate::error::SearchError;
use async_trait::async_trait;
use tarnish_common::{SearchResult, Source};

/// A third-party search or scraping API that can be asked for mentions.
#[async_trait]
pub trait SearchBackend: Send + Sync {
    /// Short label used in logs and error strings, e.g. `search1api:reddit`.
    fn name(&self) -> &str;

    /// Platform every result from this backend is tagged with.
    fn source(&self) -> Source;

    async fn search(
        &self,
        query: &str,
        max_results: u32,
    ) -> Result<Vec<SearchResult>, SearchError>;
}
