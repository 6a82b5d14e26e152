use tarnish_http::HttpError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SearchError {
    #[error("request failed: {0}")]
    Http(#[from] HttpError),

    #[error("unexpected response: {0}")]
    Response(String),
}

impl From<SearchError> for tarnish_common::TarnishError {
    fn from(err: SearchError) -> Self {
        tarnish_common::TarnishError::Search(err.to_string())
    }
}
