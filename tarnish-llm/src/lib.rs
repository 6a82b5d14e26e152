//! LLM integration for Tarnish.
//!
//! This crate exposes a common [`traits::LlmClient`] interface, provider
//! implementations for Gemini and OpenAI, and the batch classifier in
//! [`classify`] that turns search hits into negative-mention summaries.
//!
//! # Examples
//! ```no_run
//! use tarnish_config::LlmConfig;
//! use tarnish_llm::client_from_config;
//!
//! let cfg = LlmConfig {
//!     api_key: Some("sk-demo".into()),
//!     ..LlmConfig::default()
//! };
//! let client = client_from_config(&cfg)?;
//! assert_eq!(client.model_name(), "gemini-1.5-flash-8b");
//! # Ok::<(), tarnish_common::TarnishError>(())
//! ```
pub mod classify;
pub mod gemini;
pub mod openai;
pub mod traits;

use gemini::GeminiClient;
use openai::OpenAiClient;
use std::sync::Arc;
use tarnish_common::TarnishError;
use tarnish_config::{LlmConfig, LlmProvider};
use traits::LlmClient;

pub use classify::{classify_items, BrandProfile, Classification, ClassifyOptions};

/// Build the configured provider client.
pub fn client_from_config(
    config: &LlmConfig,
) -> tarnish_common::Result<Arc<dyn LlmClient + Send + Sync + 'static>> {
    let api_key = config.api_key().ok_or_else(|| {
        TarnishError::Config(format!("No API key configured for LLM provider {:?}", config.provider))
    })?;

    let client: Arc<dyn LlmClient + Send + Sync> = match config.provider {
        LlmProvider::Gemini => Arc::new(GeminiClient::with_endpoint(
            api_key.to_string(),
            config.model().to_string(),
            config.endpoint(),
        )?),
        LlmProvider::Openai => Arc::new(OpenAiClient::with_endpoint(
            api_key.to_string(),
            config.model().to_string(),
            config.endpoint(),
        )?),
    };

    tracing::info!(
        provider = ?config.provider,
        model = client.model_name(),
        "llm.client.ready"
    );
    Ok(client)
}

/// Classification knobs taken from the LLM section of the config.
pub fn classify_options(config: &LlmConfig) -> ClassifyOptions {
    ClassifyOptions {
        batch_size: config.batch_size.max(1),
        temperature: Some(config.temperature),
        max_tokens: config.max_tokens,
    }
}
