//! Search1API proxy: one endpoint fronting Google, Reddit, YouTube, X, Bing
//! and Yahoo, selected per request with `search_service`.
use crate::backend::SearchBackend;
use crate::error::SearchError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tarnish_common::{SearchResult, Source};
use tarnish_http::{Auth, HttpClient, RequestOpts};

pub const SEARCH1API_BASE_URL: &str = "https://api.search1api.com";

#[derive(Debug, Serialize)]
struct SearchRequest<'a> {
    query: &'a str,
    search_service: &'a str,
    max_results: u32,
    crawl_results: u32,
    image: bool,
    language: &'a str,
}

#[derive(Debug, Default, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<SearchHit>,
}

#[derive(Debug, Deserialize)]
struct SearchHit {
    #[serde(default)]
    link: String,
    #[serde(default)]
    title: String,
    #[serde(default)]
    snippet: String,
}

/// One Search1API service (e.g. `reddit`) exposed as a backend.
#[derive(Clone)]
pub struct Search1ApiBackend {
    http: HttpClient,
    api_key: String,
    service: String,
    source: Source,
    name: String,
}

impl Search1ApiBackend {
    pub fn new(
        base_url: &str,
        api_key: impl Into<String>,
        service: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, SearchError> {
        let http = HttpClient::new(base_url)?.with_timeout(timeout);
        Ok(Self::with_client(http, api_key, service))
    }

    /// Share one HTTP client between several services.
    pub fn with_client(http: HttpClient, api_key: impl Into<String>, service: impl Into<String>) -> Self {
        let service = service.into().trim().to_lowercase();
        Self {
            http,
            api_key: api_key.into(),
            source: Source::from_label(&service),
            name: format!("search1api:{service}"),
            service,
        }
    }

}

#[async_trait]
impl SearchBackend for Search1ApiBackend {
    fn name(&self) -> &str {
        &self.name
    }

    fn source(&self) -> Source {
        self.source
    }

    async fn search(
        &self,
        query: &str,
        max_results: u32,
    ) -> Result<Vec<SearchResult>, SearchError> {
        let body = SearchRequest {
            query,
            search_service: &self.service,
            max_results,
            crawl_results: 0,
            image: false,
            language: "",
        };

        let resp: SearchResponse = self
            .http
            .post_json_opts(
                "search",
                &body,
                RequestOpts {
                    auth: Some(Auth::Bearer(&self.api_key)),
                    ..Default::default()
                },
            )
            .await?;

        let results: Vec<SearchResult> = resp
            .results
            .into_iter()
            .map(|hit| SearchResult {
                link: hit.link,
                title: hit.title,
                snippet: hit.snippet,
                source: self.source,
                transcript: None,
            })
            .collect();

        tracing::debug!(
            backend = %self.name,
            query,
            count = results.len(),
            "search1api.results"
        );
        Ok(results)
    }
}
