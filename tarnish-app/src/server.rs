use crate::scanner::{ScanOutcome, ScanRequest, Scanner};
use axum::{
    extract::{Form, State},
    http::{header, HeaderValue, StatusCode},
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use std::sync::Arc;
use tarnish_report::{render_error, render_index, render_results};
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;

pub struct AppState {
    pub scanner: Scanner,
}

/// Fields posted by the scan form.
#[derive(Debug, Deserialize)]
pub struct ScanForm {
    pub brand: String,
    #[serde(default)]
    pub website: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub keyword: Option<String>,
}

impl From<ScanForm> for ScanRequest {
    fn from(form: ScanForm) -> Self {
        let clean = |v: Option<String>| v.map(|s| s.trim().to_string()).filter(|s| !s.is_empty());
        ScanRequest {
            brand: form.brand.trim().to_string(),
            website: clean(form.website),
            description: clean(form.description),
            keyword: clean(form.keyword),
        }
    }
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(index_page))
        .route("/search", post(search))
        .route("/healthz", get(healthz))
        .with_state(state)
        .layer(SetResponseHeaderLayer::overriding(
            header::CACHE_CONTROL,
            HeaderValue::from_static("no-store"),
        ))
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &axum::http::Request<_>| {
                tracing::info_span!(
                    "http_request",
                    method = %request.method(),
                    path = %request.uri().path(),
                )
            }),
        )
}

async fn index_page() -> impl IntoResponse {
    Html(render_index())
}

async fn healthz() -> &'static str {
    "ok"
}

async fn search(State(state): State<Arc<AppState>>, Form(form): Form<ScanForm>) -> Response {
    let req = ScanRequest::from(form);
    if req.brand.is_empty() {
        let page = render_error("", &["Brand name is required".to_string()]);
        return (StatusCode::BAD_REQUEST, Html(page)).into_response();
    }

    match state.scanner.scan(&req).await {
        ScanOutcome::Report(report) => Html(render_results(&report.view())).into_response(),
        ScanOutcome::Failed { brand, errors } => {
            (StatusCode::BAD_GATEWAY, Html(render_error(&brand, &errors))).into_response()
        }
    }
}
