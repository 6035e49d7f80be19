pub mod fallback;
pub mod memory;
pub mod repl;
pub mod session;
pub mod store;

use log::{ debug, warn };
use reqwest::{ Client as HttpClient, StatusCode };
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;

use crate::models::chat::Message;
use crate::models::relay::ChatRequest;

pub const NO_REPLY: &str = "Sorry, no response.";

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Request timeout")]
    Timeout,
    #[error("relay request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("relay returned {status}: {message}")]
    Status { status: StatusCode, message: String },
}

#[derive(Deserialize, Default)]
struct RelayBody {
    #[serde(default)]
    reply: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

/// Talks to the relay's `POST /chat` with a per-attempt timeout and a
/// bounded number of retries.
#[derive(Debug, Clone)]
pub struct RelayClient {
    http: HttpClient,
    chat_url: String,
    timeout: Duration,
    retries: u32,
}

impl RelayClient {
    pub fn new(relay_url: &str, timeout: Duration, retries: u32) -> Self {
        Self {
            http: HttpClient::new(),
            chat_url: format!("{}/chat", relay_url.trim_end_matches('/')),
            timeout,
            retries,
        }
    }

    /// Makes up to `retries + 1` attempts. A timed out attempt is cancelled and
    /// not retried; any other failure is retried until attempts run out.
    pub async fn send(&self, prompt: &str, history: &[Message]) -> Result<String, ClientError> {
        let request = ChatRequest {
            prompt: Some(prompt.to_string()),
            history: history.to_vec(),
        };

        let mut attempt = 0;
        loop {
            match tokio::time::timeout(self.timeout, self.attempt(&request)).await {
                Err(_) => {
                    warn!("Relay request timed out after {:?}", self.timeout);
                    return Err(ClientError::Timeout);
                }
                Ok(Ok(reply)) => {
                    return Ok(reply);
                }
                Ok(Err(e)) if attempt >= self.retries => {
                    return Err(e);
                }
                Ok(Err(e)) => {
                    attempt += 1;
                    debug!("Relay attempt {} failed, retrying: {}", attempt, e);
                }
            }
        }
    }

    async fn attempt(&self, request: &ChatRequest) -> Result<String, ClientError> {
        let resp = self.http.post(&self.chat_url).json(request).send().await?;
        let status = resp.status();
        let body = resp.json::<RelayBody>().await.unwrap_or_default();

        if !status.is_success() {
            return Err(ClientError::Status {
                status,
                message: body.error.unwrap_or_else(|| status.to_string()),
            });
        }

        Ok(
            body.reply
                .map(|r| r.trim().to_string())
                .filter(|r| !r.is_empty())
                .unwrap_or_else(|| NO_REPLY.to_string())
        )
    }
}
