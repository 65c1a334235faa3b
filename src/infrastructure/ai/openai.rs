//! OpenAI-backed assistant implementation

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::AiAssistant;
use crate::config::AiConfig;
use crate::domain::shared::{Result, VoiceError};
use crate::domain::tenant::TenantAiConfig;

const DEFAULT_API_BASE: &str = "https://api.openai.com/v1";

/// Chat-completions client
pub struct OpenAiAssistant {
    http: reqwest::Client,
    api_base: String,
    api_key: String,
    default_model: String,
}

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
}

#[derive(Debug, Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

impl OpenAiAssistant {
    /// Build an assistant from configuration; fails when the key is missing
    pub fn from_config(config: &AiConfig) -> Result<Self> {
        if config.api_key.is_empty() {
            return Err(VoiceError::Configuration("AI api key missing".to_string()));
        }

        let api_base = if config.api_base.is_empty() {
            DEFAULT_API_BASE.to_string()
        } else {
            config.api_base.trim_end_matches('/').to_string()
        };

        Ok(Self {
            http: reqwest::Client::new(),
            api_base,
            api_key: config.api_key.clone(),
            default_model: config.model.clone(),
        })
    }

    async fn complete(&self, model: &str, messages: Vec<ChatMessage>) -> Result<String> {
        let request = ChatRequest {
            model: model.to_string(),
            messages,
        };

        let response = self
            .http
            .post(format!("{}/chat/completions", self.api_base))
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| VoiceError::Provider(format!("AI request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            return Err(VoiceError::Provider(format!(
                "AI request rejected ({})",
                status
            )));
        }

        let completion: ChatResponse = response
            .json()
            .await
            .map_err(|e| VoiceError::Provider(format!("malformed AI response: {}", e)))?;

        completion
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or_else(|| VoiceError::Provider("AI response contained no choices".to_string()))
    }
}

#[async_trait]
impl AiAssistant for OpenAiAssistant {
    async fn summarize_transcript(
        &self,
        ai_config: &TenantAiConfig,
        transcript: &str,
    ) -> Result<String> {
        let model = if ai_config.model.is_empty() {
            self.default_model.clone()
        } else {
            ai_config.model.clone()
        };

        debug!(model = %model, chars = transcript.len(), "summarizing transcript");

        let messages = vec![
            ChatMessage {
                role: "system".to_string(),
                content: format!(
                    "You are {}, an expert secretary. Convert the following call \
                     transcript into a professional meeting minute summary.",
                    ai_config.ai_name
                ),
            },
            ChatMessage {
                role: "user".to_string(),
                content: transcript.to_string(),
            },
        ];

        self.complete(&model, messages).await
    }

    async fn chat_reply(&self, tenant_id: &str, message: &str) -> Result<Option<String>> {
        debug!(tenant_id = %tenant_id, "producing chat reply");

        let messages = vec![
            ChatMessage {
                role: "system".to_string(),
                content: "You are a helpful assistant answering a customer text message \
                          on behalf of a business. Keep replies short."
                    .to_string(),
            },
            ChatMessage {
                role: "user".to_string(),
                content: message.to_string(),
            },
        ];

        let reply = self.complete(&self.default_model, messages).await?;
        if reply.trim().is_empty() {
            Ok(None)
        } else {
            Ok(Some(reply))
        }
    }
}
