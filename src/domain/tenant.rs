/// Multi-tenancy support for isolating call data and AI configuration
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::shared::{Result, VoiceError};

/// AI voice-agent configuration for a tenant.
///
/// Strongly typed with explicit defaults; free-form blobs from an upstream
/// store must pass `validate` at tenant-update time, not at read time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TenantAiConfig {
    /// Display name the agent introduces itself with
    pub ai_name: String,
    /// Greeting played to inbound callers
    pub welcome_message: String,
    /// Provider voice identifier used when rendering speech
    pub voice_id: String,
    /// Model used for post-call summarization and chat replies
    pub model: String,
}

impl Default for TenantAiConfig {
    fn default() -> Self {
        Self {
            ai_name: "Assistant".to_string(),
            welcome_message: "Thank you for calling. How can I help you today?".to_string(),
            voice_id: "alice".to_string(),
            model: "gpt-4o".to_string(),
        }
    }
}

impl TenantAiConfig {
    /// Validate the configuration before it is stored
    pub fn validate(&self) -> Result<()> {
        if self.ai_name.trim().is_empty() {
            return Err(VoiceError::Validation("ai_name must not be empty".to_string()));
        }
        if self.welcome_message.trim().is_empty() {
            return Err(VoiceError::Validation(
                "welcome_message must not be empty".to_string(),
            ));
        }
        if self.voice_id.trim().is_empty() {
            return Err(VoiceError::Validation("voice_id must not be empty".to_string()));
        }
        if self.model.trim().is_empty() {
            return Err(VoiceError::Validation("model must not be empty".to_string()));
        }
        Ok(())
    }
}

/// Tenant (customer/organization)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tenant {
    pub id: String,
    pub name: String,
    /// Registered inbound number, exact-match index for call routing
    pub phone_number: Option<String>,
    pub ai_config: TenantAiConfig,
    pub created_at: DateTime<Utc>,
}

impl Tenant {
    /// Create a new tenant with default AI configuration
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            phone_number: None,
            ai_config: TenantAiConfig::default(),
            created_at: Utc::now(),
        }
    }

    pub fn with_phone_number(mut self, number: impl Into<String>) -> Self {
        self.phone_number = Some(number.into());
        self
    }

    pub fn with_ai_config(mut self, config: TenantAiConfig) -> Self {
        self.ai_config = config;
        self
    }

    /// Default outbound greeting when no script is supplied
    pub fn default_script(&self) -> String {
        if self.ai_config.welcome_message.trim().is_empty() {
            format!("Hello, this is a call from {}.", self.name)
        } else {
            self.ai_config.welcome_message.clone()
        }
    }
}

/// Directory of tenants, indexed by id and by registered phone number
#[async_trait]
pub trait TenantDirectory: Send + Sync {
    /// Look up a tenant by id
    async fn get(&self, tenant_id: &str) -> Result<Option<Tenant>>;

    /// Exact-match lookup by registered inbound number
    async fn find_by_phone_number(&self, number: &str) -> Result<Option<Tenant>>;

    /// Insert or replace a tenant; AI configuration is validated here
    async fn upsert(&self, tenant: Tenant) -> Result<()>;
}
