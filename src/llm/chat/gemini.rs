use async_trait::async_trait;
use log::{ debug, info, warn };
use reqwest::Client as HttpClient;
use serde::{ Deserialize, Serialize };

use super::{ build_http_client, check_status, ChatClient, ChatPrompt, CompletionResponse };
use crate::config::prompt::compose_prompt;
use crate::llm::{ LlmConfig, LlmError, LlmType };

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_MODEL: &str = "gemini-1.5-flash-latest";
pub const EMPTY_REPLY: &str = "No response received from AI.";

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<GeminiContent>,
    generation_config: GenerationConfig,
    safety_settings: Vec<SafetySetting>,
}

#[derive(Serialize)]
struct GeminiContent {
    role: &'static str,
    parts: Vec<GeminiPart>,
}

#[derive(Serialize)]
struct GeminiPart {
    text: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    top_k: u32,
    top_p: f32,
    max_output_tokens: u32,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            temperature: 0.7,
            top_k: 40,
            top_p: 0.95,
            max_output_tokens: 2048,
        }
    }
}

#[derive(Serialize)]
struct SafetySetting {
    category: &'static str,
    threshold: &'static str,
}

const SAFETY_SETTINGS: [(&str, &str); 2] = [
    ("HARM_CATEGORY_HARASSMENT", "BLOCK_MEDIUM_AND_ABOVE"),
    ("HARM_CATEGORY_HATE_SPEECH", "BLOCK_MEDIUM_AND_ABOVE"),
];

#[derive(Deserialize, Debug, Default)]
struct GoogleResponse {
    #[serde(default)]
    candidates: Vec<GoogleCandidate>,
}

#[derive(Deserialize, Debug)]
struct GoogleCandidate {
    content: Option<GoogleContent>,
}

#[derive(Deserialize, Debug)]
struct GoogleContent {
    #[serde(default)]
    parts: Vec<GooglePart>,
}

#[derive(Deserialize, Debug)]
struct GooglePart {
    #[serde(default)]
    text: Option<String>,
}

impl GoogleResponse {
    fn first_text(&self) -> Option<&str> {
        self.candidates
            .first()
            .and_then(|c| c.content.as_ref())
            .and_then(|c| c.parts.first())
            .and_then(|p| p.text.as_deref())
            .map(str::trim)
            .filter(|t| !t.is_empty())
    }
}

pub struct GeminiChatClient {
    http: HttpClient,
    api_key: String,
    model: String,
    base_url: String,
}

impl GeminiChatClient {
    pub fn new(
        http: HttpClient,
        api_key: String,
        model: Option<String>,
        base_url: Option<String>
    ) -> Self {
        let chat_model = model.unwrap_or_else(|| DEFAULT_MODEL.to_string());
        let url = base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        Self {
            http,
            api_key,
            model: chat_model,
            base_url: url.trim_end_matches('/').to_string(),
        }
    }

    pub fn from_config(config: &LlmConfig) -> Result<Self, LlmError> {
        if config.llm_type != LlmType::Gemini {
            return Err(LlmError::InvalidConfig("Invalid config type for GeminiChatClient".into()));
        }
        let api_key = config.api_key
            .clone()
            .filter(|k| !k.trim().is_empty())
            .ok_or(LlmError::MissingApiKey("GeminiChatClient"))?;
        let http = build_http_client(config.timeout)?;

        Ok(Self::new(http, api_key, config.completion_model.clone(), config.base_url.clone()))
    }

    fn endpoint(&self) -> String {
        format!("{}/v1beta/models/{}:generateContent", self.base_url, self.model)
    }

    fn build_request(&self, prompt: &ChatPrompt) -> GenerateContentRequest {
        let full_prompt = compose_prompt(&prompt.system, &prompt.history, &prompt.question);

        GenerateContentRequest {
            contents: vec![GeminiContent {
                role: "user",
                parts: vec![GeminiPart { text: full_prompt }],
            }],
            generation_config: GenerationConfig::default(),
            safety_settings: SAFETY_SETTINGS.iter()
                .map(|&(category, threshold)| SafetySetting { category, threshold })
                .collect(),
        }
    }
}

#[async_trait]
impl ChatClient for GeminiChatClient {
    async fn complete(&self, prompt: &ChatPrompt) -> Result<CompletionResponse, LlmError> {
        debug!(
            "GeminiChatClient::complete() → model={} base_url={}",
            self.model,
            self.base_url
        );

        let resp = self.http
            .post(self.endpoint())
            .query(&[("key", self.api_key.as_str())])
            .json(&self.build_request(prompt))
            .send().await?;
        let resp = check_status(resp).await.map_err(|e| {
            warn!("Gemini returned an error status: {}", e);
            e
        })?;

        let data = resp.json::<GoogleResponse>().await?;
        match data.first_text() {
            Some(text) => {
                info!("Successfully received response from Gemini ({} chars)", text.len());
                Ok(CompletionResponse { response: text.to_string() })
            }
            None => {
                warn!("Unexpected response structure from Gemini: {:?}", data);
                Ok(CompletionResponse { response: EMPTY_REPLY.to_string() })
            }
        }
    }

    fn get_model(&self) -> String {
        self.model.clone()
    }

    fn get_base_url(&self) -> Option<String> {
        Some(self.base_url.clone())
    }

    fn llm_type(&self) -> LlmType {
        LlmType::Gemini
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> GeminiChatClient {
        GeminiChatClient::new(HttpClient::new(), "k".into(), None, None)
    }

    #[test]
    fn endpoint_uses_model() {
        assert_eq!(
            client().endpoint(),
            "https://generativelanguage.googleapis.com/v1beta/models/gemini-1.5-flash-latest:generateContent"
        );
    }

    #[test]
    fn payload_shape() {
        let prompt = ChatPrompt {
            system: "sys".into(),
            history: Vec::new(),
            question: "What is a heap?".into(),
        };
        let json = serde_json::to_value(client().build_request(&prompt)).unwrap();
        assert_eq!(json["contents"][0]["role"], "user");
        assert_eq!(json["contents"][0]["parts"][0]["text"], "sys\n\nStudent: What is a heap?");
        assert_eq!(json["generationConfig"]["topK"], 40);
        assert_eq!(json["generationConfig"]["maxOutputTokens"], 2048);
        assert_eq!(json["safetySettings"].as_array().unwrap().len(), 2);
    }

    #[test]
    fn missing_api_key_is_rejected() {
        let config = LlmConfig { llm_type: LlmType::Gemini, ..LlmConfig::default() };
        assert!(matches!(
            GeminiChatClient::from_config(&config),
            Err(LlmError::MissingApiKey(_))
        ));
    }

    #[test]
    fn first_text_skips_blank() {
        let data: GoogleResponse = serde_json::from_str(
            r#"{"candidates":[{"content":{"parts":[{"text":"   "}]}}]}"#
        ).unwrap();
        assert_eq!(data.first_text(), None);

        let data: GoogleResponse = serde_json::from_str(r#"{"promptFeedback":{}}"#).unwrap();
        assert_eq!(data.first_text(), None);
    }
}
