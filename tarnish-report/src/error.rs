use tarnish_http::HttpError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("request failed: {0}")]
    Http(#[from] HttpError),

    #[error("file error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid service-account credentials: {0}")]
    Credentials(String),

    #[error("token signing failed: {0}")]
    Jwt(#[from] jsonwebtoken::errors::Error),

    #[error("unexpected response: {0}")]
    Response(String),
}

impl From<ReportError> for tarnish_common::TarnishError {
    fn from(err: ReportError) -> Self {
        tarnish_common::TarnishError::Report(err.to_string())
    }
}
