//! Configuration management
//!
//! Layered configuration: built-in defaults, an optional `opsline.toml`
//! file, then `OPSLINE__*` environment variables (e.g.
//! `OPSLINE__TELEPHONY__ACCOUNT_SID`).

use serde::{Deserialize, Serialize};

use crate::domain::tenant::{Tenant, TenantAiConfig};

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub telephony: TelephonyConfig,
    pub ai: AiConfig,
    pub voice: VoiceConfig,
    /// Tenants seeded into the in-memory directory at startup
    pub tenants: Vec<TenantSeed>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Public base URL embedded in provider callback URLs
    pub public_url: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            public_url: "http://localhost:8080".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct TelephonyConfig {
    pub account_sid: String,
    pub auth_token: String,
    /// Number outbound calls and SMS originate from
    pub phone_number: String,
    /// Override of the provider API base, for testing
    pub api_base: String,
}

impl TelephonyConfig {
    pub fn is_configured(&self) -> bool {
        !self.account_sid.is_empty() && !self.auth_token.is_empty() && !self.phone_number.is_empty()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AiConfig {
    pub api_key: String,
    pub api_base: String,
    pub model: String,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            api_base: String::new(),
            model: "gpt-4o".to_string(),
        }
    }
}

impl AiConfig {
    pub fn is_configured(&self) -> bool {
        !self.api_key.is_empty()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VoiceConfig {
    /// Hard timeout for the AI summarization call
    pub summary_timeout_secs: u64,
    /// Joined transcripts at or below this length take the placeholder path
    pub min_transcript_chars: usize,
    /// Speech-gather timeout in the inbound IVR loop
    pub gather_timeout_secs: u32,
}

impl Default for VoiceConfig {
    fn default() -> Self {
        Self {
            summary_timeout_secs: 30,
            min_transcript_chars: 10,
            gather_timeout_secs: 3,
        }
    }
}

/// Tenant definition accepted from the configuration file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TenantSeed {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub phone_number: Option<String>,
    #[serde(default)]
    pub ai: TenantAiConfig,
}

impl TenantSeed {
    pub fn into_tenant(self) -> Tenant {
        let mut tenant = Tenant::new(self.id, self.name).with_ai_config(self.ai);
        tenant.phone_number = self.phone_number;
        tenant
    }
}

impl Config {
    /// Load configuration from defaults, optional file and environment
    pub fn load() -> anyhow::Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name("opsline").required(false))
            .add_source(
                config::Environment::with_prefix("OPSLINE")
                    .prefix_separator("__")
                    .separator("__"),
            )
            .build()?;

        Ok(settings.try_deserialize()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.voice.summary_timeout_secs, 30);
        assert_eq!(config.voice.min_transcript_chars, 10);
        assert!(!config.telephony.is_configured());
        assert!(!config.ai.is_configured());
    }

    #[test]
    fn test_environment_overrides() {
        std::env::set_var("OPSLINE__SERVER__PUBLIC_URL", "https://ops.example.com");
        let config = Config::load().unwrap();
        assert_eq!(config.server.public_url, "https://ops.example.com");
        std::env::remove_var("OPSLINE__SERVER__PUBLIC_URL");
    }

    #[test]
    fn test_tenant_seed_conversion() {
        let seed = TenantSeed {
            id: "t1".to_string(),
            name: "Acme".to_string(),
            phone_number: Some("+15550100".to_string()),
            ai: TenantAiConfig::default(),
        };

        let tenant = seed.into_tenant();
        assert_eq!(tenant.id, "t1");
        assert_eq!(tenant.phone_number.as_deref(), Some("+15550100"));
    }
}
