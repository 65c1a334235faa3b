//! Telephony provider capability
//!
//! One `TelephonyProvider` implementation is selected at startup; there is
//! no runtime provider-switch logic in the hot path.

pub mod twilio;

use async_trait::async_trait;

use crate::domain::shared::{Result, VoiceError};

pub use twilio::TwilioProvider;

/// Result of placing an outbound call
#[derive(Debug, Clone)]
pub struct PlacedCall {
    /// Provider-issued call identifier
    pub call_sid: String,
    /// Provider-reported initial status string
    pub status: String,
}

/// Status of a call as reported by the provider's status API
#[derive(Debug, Clone)]
pub struct ProviderCallStatus {
    pub call_sid: String,
    pub status: String,
    pub to: Option<String>,
    pub duration_secs: Option<u32>,
}

/// Outbound telephony capability: calls, SMS, status queries
#[async_trait]
pub trait TelephonyProvider: Send + Sync {
    /// Name used to tag call log entries
    fn name(&self) -> &'static str;

    /// Place an outbound call; the provider fetches call instructions from
    /// `instruction_url` once the call connects
    async fn place_call(&self, to: &str, instruction_url: &str) -> Result<PlacedCall>;

    /// Send an SMS message; returns the provider message id
    async fn send_sms(&self, to: &str, body: &str) -> Result<String>;

    /// Query the provider for a call's status; `None` when unknown
    async fn fetch_call_status(&self, call_sid: &str) -> Result<Option<ProviderCallStatus>>;
}

/// Provider selected when credentials are absent.
///
/// Keeps the service running; every operation surfaces a configuration
/// error instead of crashing the process.
pub struct UnconfiguredProvider;

#[async_trait]
impl TelephonyProvider for UnconfiguredProvider {
    fn name(&self) -> &'static str {
        "unconfigured"
    }

    async fn place_call(&self, _to: &str, _instruction_url: &str) -> Result<PlacedCall> {
        Err(VoiceError::Configuration(
            "telephony provider credentials are not configured".to_string(),
        ))
    }

    async fn send_sms(&self, _to: &str, _body: &str) -> Result<String> {
        Err(VoiceError::Configuration(
            "telephony provider credentials are not configured".to_string(),
        ))
    }

    async fn fetch_call_status(&self, _call_sid: &str) -> Result<Option<ProviderCallStatus>> {
        Err(VoiceError::Configuration(
            "telephony provider credentials are not configured".to_string(),
        ))
    }
}
