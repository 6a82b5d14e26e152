//! TikTok search through the Apify TikTok scraper actor.
//!
//! The actor runs synchronously (`run-sync-get-dataset-items`), so one call
//! returns the dataset directly. Subtitle files, when present and enabled,
//! are fetched one by one and attached as transcripts.
pub mod types;
pub mod vtt;

use crate::backend::SearchBackend;
use crate::error::SearchError;
use async_trait::async_trait;
use std::time::Duration;
use tarnish_common::{truncate_chars, SearchResult, Source};
use tarnish_http::{Auth, HttpClient, RequestOpts};
use types::{TikTokPost, TikTokSearchInput};

pub const APIFY_BASE_URL: &str = "https://api.apify.com/v2";
pub const TIKTOK_SCRAPER: &str = "clockworks~tiktok-scraper";

const SNIPPET_CHARS: usize = 200;
const TRANSCRIPT_TIMEOUT: Duration = Duration::from_secs(15);

#[derive(Clone)]
pub struct TikTokBackend {
    http: HttpClient,
    token: String,
    actor: String,
    transcripts: bool,
}

impl TikTokBackend {
    pub fn new(base_url: &str, token: impl Into<String>, timeout: Duration) -> Result<Self, SearchError> {
        let http = HttpClient::new(base_url)?.with_timeout(timeout);
        Ok(Self {
            http,
            token: token.into(),
            actor: TIKTOK_SCRAPER.to_string(),
            transcripts: true,
        })
    }

    pub fn with_actor(mut self, actor: impl Into<String>) -> Self {
        self.actor = actor.into();
        self
    }

    pub fn with_transcripts(mut self, enabled: bool) -> Self {
        self.transcripts = enabled;
        self
    }

    async fn run_search(&self, query: &str, max_results: u32) -> Result<Vec<TikTokPost>, SearchError> {
        let input = TikTokSearchInput::videos(query, max_results);
        let path = format!("acts/{}/run-sync-get-dataset-items", self.actor);

        tracing::info!(actor = %self.actor, query, max_results, "tiktok.run.start");
        let posts: Vec<TikTokPost> = self
            .http
            .post_json_opts(
                &path,
                &input,
                RequestOpts {
                    auth: Some(Auth::Bearer(&self.token)),
                    ..Default::default()
                },
            )
            .await?;
        tracing::info!(count = posts.len(), query, "tiktok.run.done");
        Ok(posts)
    }

    /// Best effort: a missing or broken subtitle file just means no transcript.
    async fn fetch_transcript(&self, url: &str) -> Option<String> {
        let opts = RequestOpts {
            timeout: Some(TRANSCRIPT_TIMEOUT),
            allow_absolute: true,
            ..Default::default()
        };
        match self.http.get_text(url, opts).await {
            Ok(body) => {
                let text = vtt::vtt_to_text(&body);
                (!text.is_empty()).then_some(text)
            }
            Err(e) => {
                tracing::debug!(url, error = %e, "tiktok.transcript.failed");
                None
            }
        }
    }
}

#[async_trait]
impl SearchBackend for TikTokBackend {
    fn name(&self) -> &str {
        "apify:tiktok"
    }

    fn source(&self) -> Source {
        Source::Tiktok
    }

    async fn search(
        &self,
        query: &str,
        max_results: u32,
    ) -> Result<Vec<SearchResult>, SearchError> {
        let posts = self.run_search(query, max_results).await?;

        let mut results = Vec::with_capacity(posts.len());
        for post in posts {
            let Some(link) = post.web_video_url.clone().filter(|u| !u.trim().is_empty()) else {
                continue;
            };
            let transcript = match post.subtitle_url() {
                Some(url) if self.transcripts => self.fetch_transcript(url).await,
                _ => None,
            };
            let text = post.text.unwrap_or_default();
            results.push(SearchResult {
                link,
                snippet: truncate_chars(&text, SNIPPET_CHARS),
                title: text,
                source: Source::Tiktok,
                transcript,
            });
        }
        Ok(results)
    }
}
