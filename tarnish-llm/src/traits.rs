use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tarnish_common::Result;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmResponse {
    pub text: String,
    pub model: Option<String>,
    pub tokens_used: Option<u32>,
}

#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Generate a response to the given prompt with optional system prompt
    async fn generate(
        &self,
        prompt: &str,
        system_prompt: Option<&str>,
        max_tokens: Option<u32>,
        temperature: Option<f32>,
    ) -> Result<LlmResponse>;

    /// Get the model name being used
    fn model_name(&self) -> &str;

    /// System prompt used for brand-reputation classification
    fn default_system_prompt(&self) -> &str {
        r#"You are a brand-reputation analyst reviewing search results for an online reputation report.

Your role:
- Decide whether each piece of content is about the given brand
- Summarize only the negative claims it makes about that brand
- Name the platform the content was published on

Guidelines:
- Be factual and concise; one or two sentences per item
- Do not invent details that the content does not state
- Treat content about a different company with a similar name as unrelated
- Follow the requested output format exactly"#
    }
}
