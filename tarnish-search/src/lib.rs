//! Mention search for Tarnish.
//!
//! Queries are built with [`expand_queries`], sent to every configured
//! [`SearchBackend`] by [`dispatch`], and collapsed to one item per URL by
//! [`dedup`]. Backends: the Search1API proxy (one instance per service) and
//! TikTok through Apify.
pub mod backend;
pub mod dedup;
pub mod dispatch;
pub mod error;
pub mod queries;
pub mod search1api;
pub mod tiktok;

pub use backend::SearchBackend;
pub use dedup::dedup;
pub use dispatch::{dispatch, DispatchOutcome};
pub use error::SearchError;
pub use queries::expand_queries;
pub use search1api::Search1ApiBackend;
pub use tiktok::TikTokBackend;

use std::sync::Arc;
use std::time::Duration;
use tarnish_config::{secret, SearchConfig};
use tarnish_http::HttpClient;

/// Build the backends the config enables.
///
/// A backend whose secret is missing is skipped with a warning rather than
/// failing start-up.
pub fn backends_from_config(cfg: &SearchConfig) -> Result<Vec<Arc<dyn SearchBackend>>, SearchError> {
    let mut backends: Vec<Arc<dyn SearchBackend>> = Vec::new();

    match secret(&cfg.search1api.api_key) {
        Some(key) => {
            let http = HttpClient::new(&cfg.search1api.base_url)?
                .with_timeout(Duration::from_secs(cfg.timeout_secs));
            for service in &cfg.search1api.services {
                backends.push(Arc::new(Search1ApiBackend::with_client(
                    http.clone(),
                    key,
                    service.as_str(),
                )));
            }
        }
        None => tracing::warn!("search1api.api_key missing; web searches disabled"),
    }

    if cfg.tiktok.enabled {
        match secret(&cfg.tiktok.api_token) {
            Some(token) => {
                let backend = TikTokBackend::new(
                    &cfg.tiktok.base_url,
                    token,
                    Duration::from_secs(cfg.tiktok.timeout_secs),
                )?
                .with_actor(cfg.tiktok.actor.as_str())
                .with_transcripts(cfg.tiktok.transcripts);
                backends.push(Arc::new(backend));
            }
            None => tracing::warn!("tiktok.api_token missing; TikTok search disabled"),
        }
    }

    tracing::info!(
        backends = ?backends.iter().map(|b| b.name()).collect::<Vec<_>>(),
        "search.backends.ready"
    );
    Ok(backends)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_backend_per_service_plus_tiktok() {
        let mut cfg = SearchConfig::default();
        cfg.search1api.api_key = Some("s1".into());
        cfg.tiktok.api_token = Some("apify".into());
        let names: Vec<String> = backends_from_config(&cfg)
            .unwrap()
            .iter()
            .map(|b| b.name().to_string())
            .collect();
        assert_eq!(
            names,
            vec![
                "search1api:google",
                "search1api:reddit",
                "search1api:youtube",
                "search1api:bing",
                "search1api:yahoo",
                "apify:tiktok"
            ]
        );
    }

    #[test]
    fn missing_secrets_disable_backends() {
        let mut cfg = SearchConfig::default();
        cfg.search1api.api_key = Some("${SEARCH1_API_KEY}".into());
        assert!(backends_from_config(&cfg).unwrap().is_empty());
    }

    #[test]
    fn tiktok_can_be_switched_off() {
        let mut cfg = SearchConfig::default();
        cfg.tiktok.enabled = false;
        cfg.tiktok.api_token = Some("apify".into());
        assert!(backends_from_config(&cfg).unwrap().is_empty());
    }
}
