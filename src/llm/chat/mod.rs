pub mod gemini;
pub mod ollama;

use async_trait::async_trait;
use reqwest::Client as HttpClient;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;

use super::{ LlmConfig, LlmError, LlmType };
use self::gemini::GeminiChatClient;
use self::ollama::OllamaClient;
use crate::models::chat::Message;

#[derive(Deserialize, Debug, Clone)]
pub struct CompletionResponse {
    pub response: String,
}

/// Everything a provider needs to answer one question.
#[derive(Debug, Clone)]
pub struct ChatPrompt {
    pub system: String,
    pub history: Vec<Message>,
    pub question: String,
}

#[async_trait]
pub trait ChatClient: Send + Sync {
    /// Sends the prompt upstream and returns the full reply text. Implementations
    /// never return an empty `response` on success.
    async fn complete(&self, prompt: &ChatPrompt) -> Result<CompletionResponse, LlmError>;

    fn get_model(&self) -> String;
    fn get_base_url(&self) -> Option<String>;
    fn llm_type(&self) -> LlmType;
}

pub fn new_client(config: &LlmConfig) -> Result<Arc<dyn ChatClient>, LlmError> {
    let client: Arc<dyn ChatClient> = match config.llm_type {
        LlmType::Ollama => {
            let specific_client = OllamaClient::from_config(config)?;
            Arc::new(specific_client)
        }
        LlmType::Gemini => {
            let specific_client = GeminiChatClient::from_config(config)?;
            Arc::new(specific_client)
        }
    };
    Ok(client)
}

pub(crate) fn build_http_client(timeout: Duration) -> Result<HttpClient, LlmError> {
    HttpClient::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| LlmError::InvalidConfig(format!("failed to build HTTP client: {}", e)))
}

/// Turns a non-2xx response into a classified error, keeping the body for logs.
pub(crate) async fn check_status(resp: reqwest::Response) -> Result<reqwest::Response, LlmError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let body = resp.text().await.unwrap_or_default();
    Err(LlmError::from_status(status, body))
}
