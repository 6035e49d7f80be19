use log::{ debug, info, warn };
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

use crate::cli::ServeArgs;
use crate::config::prompt::{ load_system_prompt, PromptError };
use crate::history::recent_history;
use crate::llm::chat::{ new_client as new_chat_client, ChatClient, ChatPrompt };
use crate::llm::{ LlmConfig, LlmError, LlmType };
use crate::models::relay::ChatRequest;

pub const DEFAULT_HISTORY_WINDOW: usize = 6;

#[derive(Debug, Error)]
pub enum RelayError {
    #[error("Prompt is required")]
    MissingPrompt,
    #[error(transparent)]
    Llm(#[from] LlmError),
}

#[derive(Debug, Error)]
pub enum SetupError {
    #[error("Invalid chat LLM type: {0}")]
    InvalidLlmType(#[from] crate::llm::ParseLlmTypeError),
    #[error(transparent)]
    Llm(#[from] LlmError),
    #[error(transparent)]
    Prompt(#[from] PromptError),
}

/// Forwards validated questions to the configured provider.
#[derive(Clone)]
pub struct Relay {
    chat_client: Arc<dyn ChatClient>,
    system_prompt: Arc<str>,
    history_window: usize,
}

impl Relay {
    pub fn new(chat_client: Arc<dyn ChatClient>, system_prompt: impl Into<Arc<str>>, history_window: usize) -> Self {
        Self {
            chat_client,
            system_prompt: system_prompt.into(),
            history_window,
        }
    }

    pub fn from_args(args: &ServeArgs) -> Result<Self, SetupError> {
        let llm_type: LlmType = args.chat_llm_type.parse()?;
        let api_key = match llm_type {
            LlmType::Gemini => Some(args.gemini_api_key.clone()).filter(|k| !k.trim().is_empty()),
            LlmType::Ollama => None,
        };
        let chat_config = LlmConfig {
            llm_type,
            api_key,
            completion_model: args.chat_model.clone(),
            base_url: args.chat_base_url.clone(),
            timeout: Duration::from_secs(args.upstream_timeout_secs),
        };
        let chat_client = new_chat_client(&chat_config)?;
        info!(
            "Chat client configured: Type={}, Model={}, BaseURL={}",
            llm_type,
            chat_client.get_model(),
            chat_client.get_base_url().as_deref().unwrap_or("adapter default")
        );

        let system_prompt = load_system_prompt(args.system_prompt_path.as_deref())?;
        Ok(Self::new(chat_client, system_prompt, args.history_window))
    }

    pub fn chat_client(&self) -> &Arc<dyn ChatClient> {
        &self.chat_client
    }

    /// Validates the request and returns the provider's reply text.
    pub async fn answer(&self, request: ChatRequest) -> Result<String, RelayError> {
        let question = request.prompt
            .as_deref()
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .ok_or(RelayError::MissingPrompt)?;

        let history = recent_history(&request.history, self.history_window).to_vec();
        debug!(
            "Relaying question ({} chars) with {} history message(s)",
            question.len(),
            history.len()
        );

        let prompt = ChatPrompt {
            system: self.system_prompt.to_string(),
            history,
            question: question.to_string(),
        };
        let completion = self.chat_client.complete(&prompt).await?;

        let reply = completion.response.trim();
        if reply.is_empty() {
            warn!("Provider returned an empty reply");
            return Err(RelayError::Llm(LlmError::Decode("empty reply from provider".into())));
        }
        Ok(reply.to_string())
    }
}
