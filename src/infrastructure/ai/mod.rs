//! AI collaborator capability
//!
//! Consumed by the post-call summarizer and the inbound SMS path. Failures
//! here never propagate past the documented fallbacks.

pub mod openai;

use async_trait::async_trait;

use crate::domain::shared::{Result, VoiceError};
use crate::domain::tenant::TenantAiConfig;

pub use openai::OpenAiAssistant;

/// Chat/summarization collaborator
#[async_trait]
pub trait AiAssistant: Send + Sync {
    /// Convert a call transcript into a professional minute summary
    async fn summarize_transcript(&self, ai_config: &TenantAiConfig, transcript: &str)
        -> Result<String>;

    /// Produce a reply to an inbound message, if the assistant has one
    async fn chat_reply(&self, tenant_id: &str, message: &str) -> Result<Option<String>>;
}

/// Assistant selected when no AI credentials are configured.
///
/// Summarization reports a configuration error so the pipeline degrades to
/// the raw transcript; chat produces no reply.
pub struct DisabledAssistant;

#[async_trait]
impl AiAssistant for DisabledAssistant {
    async fn summarize_transcript(
        &self,
        _ai_config: &TenantAiConfig,
        _transcript: &str,
    ) -> Result<String> {
        Err(VoiceError::Configuration(
            "AI assistant credentials are not configured".to_string(),
        ))
    }

    async fn chat_reply(&self, _tenant_id: &str, _message: &str) -> Result<Option<String>> {
        Ok(None)
    }
}
