use async_trait::async_trait;
use futures::StreamExt;
use log::{ debug, info, warn };
use reqwest::Client as HttpClient;
use serde::Serialize;

use super::{ build_http_client, check_status, ChatClient, ChatPrompt, CompletionResponse };
use crate::llm::stream::{ parse_ollama_line, LineBuffer };
use crate::llm::{ LlmConfig, LlmError, LlmType };

pub const DEFAULT_BASE_URL: &str = "http://localhost:11434";
pub const DEFAULT_MODEL: &str = "llama3";
pub const EMPTY_REPLY: &str = "No response.";

#[derive(Debug)]
pub struct OllamaClient {
    http: HttpClient,
    base_url: String,
    completion_model: String,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<OllamaMessage<'a>>,
    stream: bool,
}

#[derive(Serialize)]
struct OllamaMessage<'a> {
    role: &'a str,
    content: &'a str,
}

impl OllamaClient {
    pub fn new(http: HttpClient, base_url: Option<String>, completion_model: Option<String>) -> Self {
        let model = completion_model.unwrap_or_else(|| DEFAULT_MODEL.to_string());
        let url = base_url.unwrap_or_else(|| DEFAULT_BASE_URL.into());

        Self {
            http,
            base_url: url.trim_end_matches('/').to_string(),
            completion_model: model,
        }
    }

    pub fn from_config(config: &LlmConfig) -> Result<Self, LlmError> {
        if config.llm_type != LlmType::Ollama {
            return Err(LlmError::InvalidConfig("Invalid config type for OllamaClient".into()));
        }

        let http = build_http_client(config.timeout)?;
        Ok(Self::new(http, config.base_url.clone(), config.completion_model.clone()))
    }

    fn build_request<'a>(&'a self, prompt: &'a ChatPrompt) -> ChatRequest<'a> {
        let mut messages = Vec::with_capacity(prompt.history.len() + 2);
        messages.push(OllamaMessage { role: "system", content: &prompt.system });
        for msg in &prompt.history {
            messages.push(OllamaMessage { role: msg.role.as_str(), content: &msg.text });
        }
        messages.push(OllamaMessage { role: "user", content: &prompt.question });

        ChatRequest {
            model: &self.completion_model,
            messages,
            stream: true,
        }
    }

    /// Reads the NDJSON stream to the end, concatenating every content fragment.
    async fn read_stream(&self, resp: reqwest::Response) -> Result<String, LlmError> {
        let mut buffer = LineBuffer::new();
        let mut full_reply = String::new();
        let mut stream = resp.bytes_stream();

        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|e| {
                if e.is_timeout() { LlmError::Timeout } else { LlmError::Stream(e) }
            })?;
            for line in buffer.push(&chunk) {
                if let Some(token) = parse_ollama_line(&line) {
                    full_reply.push_str(&token);
                }
            }
        }
        if let Some(line) = buffer.finish() {
            if let Some(token) = parse_ollama_line(&line) {
                full_reply.push_str(&token);
            }
        }

        Ok(full_reply)
    }
}

#[async_trait]
impl ChatClient for OllamaClient {
    async fn complete(&self, prompt: &ChatPrompt) -> Result<CompletionResponse, LlmError> {
        let url = format!("{}/api/chat", self.base_url);
        debug!("OllamaClient::complete() → model={} url={}", self.completion_model, url);

        let resp = self.http.post(&url).json(&self.build_request(prompt)).send().await?;
        let resp = check_status(resp).await.map_err(|e| {
            warn!("Ollama returned an error status: {}", e);
            e
        })?;

        let reply = self.read_stream(resp).await?;
        let reply = reply.trim();
        if reply.is_empty() {
            warn!("Ollama stream ended without any content");
            return Ok(CompletionResponse { response: EMPTY_REPLY.to_string() });
        }
        info!("Ollama reply received ({} chars)", reply.len());
        Ok(CompletionResponse { response: reply.to_string() })
    }

    fn get_model(&self) -> String {
        self.completion_model.clone()
    }

    fn get_base_url(&self) -> Option<String> {
        Some(self.base_url.clone())
    }

    fn llm_type(&self) -> LlmType {
        LlmType::Ollama
    }
}
