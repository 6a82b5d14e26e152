use crate::error::ReportError;
use serde::Serialize;
use std::borrow::Cow;
use std::time::Duration;
use tarnish_http::{Auth, HttpClient, RequestOpts};

/// Client for a Browserless-compatible `/pdf` endpoint.
#[derive(Clone)]
pub struct PdfClient {
    http: HttpClient,
    token: Option<String>,
}

#[derive(Debug, Serialize)]
struct PdfRequest<'a> {
    html: &'a str,
    options: PdfOptions,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PdfOptions {
    format: &'static str,
    print_background: bool,
}

impl PdfClient {
    pub fn new(base_url: &str, token: Option<&str>, timeout: Duration) -> Result<Self, ReportError> {
        let http = HttpClient::new(base_url)?.with_timeout(timeout);
        Ok(Self {
            http,
            token: token.map(String::from),
        })
    }

    /// Render an HTML document to PDF bytes.
    pub async fn render(&self, html: &str) -> Result<Vec<u8>, ReportError> {
        let body = PdfRequest {
            html,
            options: PdfOptions {
                format: "A4",
                print_background: true,
            },
        };
        let opts = RequestOpts {
            auth: self.token.as_deref().map(|t| Auth::Query {
                name: "token",
                value: Cow::Borrowed(t),
            }),
            ..Default::default()
        };

        let bytes = self.http.post_json_bytes("pdf", &body, opts).await?;
        if !bytes.starts_with(b"%PDF") {
            return Err(ReportError::Response(format!(
                "PDF service returned {} bytes that are not a PDF",
                bytes.len()
            )));
        }
        tracing::info!(bytes = bytes.len(), "report.pdf.rendered");
        Ok(bytes)
    }
}
