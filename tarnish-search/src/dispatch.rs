use crate::backend::SearchBackend;
use std::sync::Arc;
use tarnish_common::SearchResult;

/// Everything the backends returned for a set of queries.
#[derive(Debug, Default)]
pub struct DispatchOutcome {
    pub results: Vec<SearchResult>,
    /// One entry per failed backend call.
    pub errors: Vec<String>,
}

/// Run every query against every backend, one call at a time.
///
/// A failing backend contributes nothing for that query and leaves an
/// error string behind; the remaining calls still run.
pub async fn dispatch(
    queries: &[String],
    backends: &[Arc<dyn SearchBackend>],
    max_results: u32,
) -> DispatchOutcome {
    let mut out = DispatchOutcome::default();

    for query in queries {
        for backend in backends {
            match backend.search(query, max_results).await {
                Ok(results) => {
                    tracing::debug!(
                        backend = backend.name(),
                        query = %query,
                        count = results.len(),
                        "search.backend.ok"
                    );
                    out.results.extend(results);
                }
                Err(e) => {
                    tracing::warn!(
                        backend = backend.name(),
                        query = %query,
                        error = %e,
                        "search.backend.failed"
                    );
                    out.errors
                        .push(format!("Search error ({}) for '{query}': {e}", backend.name()));
                }
            }
        }
    }

    tracing::info!(
        queries = queries.len(),
        backends = backends.len(),
        results = out.results.len(),
        errors = out.errors.len(),
        "search.dispatch.done"
    );
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SearchError;
    use async_trait::async_trait;
    use tarnish_common::Source;

    struct Fixed(Vec<&'static str>);
    struct Broken;

    #[async_trait]
    impl SearchBackend for Fixed {
        fn name(&self) -> &str {
            "fixed"
        }
        fn source(&self) -> Source {
            Source::Google
        }
        async fn search(&self, _q: &str, _n: u32) -> Result<Vec<SearchResult>, SearchError> {
            Ok(self
                .0
                .iter()
                .map(|l| SearchResult {
                    link: l.to_string(),
                    title: String::new(),
                    snippet: String::new(),
                    source: Source::Google,
                    transcript: None,
                })
                .collect())
        }
    }

    #[async_trait]
    impl SearchBackend for Broken {
        fn name(&self) -> &str {
            "broken"
        }
        fn source(&self) -> Source {
            Source::Reddit
        }
        async fn search(&self, _q: &str, _n: u32) -> Result<Vec<SearchResult>, SearchError> {
            Err(SearchError::Response("boom".into()))
        }
    }

    #[tokio::test]
    async fn failures_are_collected_per_call() {
        let backends: Vec<Arc<dyn SearchBackend>> =
            vec![Arc::new(Fixed(vec!["a"])), Arc::new(Broken)];
        let queries = vec!["Acme Scam".to_string(), "Acme Fraud".to_string()];
        let out = dispatch(&queries, &backends, 20).await;
        assert_eq!(out.results.len(), 2);
        assert_eq!(out.errors.len(), 2);
        assert!(out.errors[0].contains("broken"));
        assert!(out.errors[1].contains("Acme Fraud"));
    }

    #[tokio::test]
    async fn empty_backend_contributes_nothing() {
        let backends: Vec<Arc<dyn SearchBackend>> = vec![Arc::new(Fixed(vec![]))];
        let out = dispatch(&["Acme Scam".to_string()], &backends, 20).await;
        assert!(out.results.is_empty());
        assert!(out.errors.is_empty());
    }
}
