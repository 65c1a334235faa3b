//! Twilio REST implementation of the telephony provider

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, info};

use super::{PlacedCall, ProviderCallStatus, TelephonyProvider};
use crate::config::TelephonyConfig;
use crate::domain::shared::{Result, VoiceError};

const DEFAULT_API_BASE: &str = "https://api.twilio.com/2010-04-01";

/// Twilio REST API client
pub struct TwilioProvider {
    http: reqwest::Client,
    api_base: String,
    account_sid: String,
    auth_token: String,
    from_number: String,
}

#[derive(Debug, Deserialize)]
struct CallResource {
    sid: String,
    status: String,
    to: Option<String>,
    duration: Option<String>,
}

#[derive(Debug, Deserialize)]
struct MessageResource {
    sid: String,
}

impl TwilioProvider {
    /// Build a provider from configuration; fails when credentials are missing
    pub fn from_config(config: &TelephonyConfig) -> Result<Self> {
        if config.account_sid.is_empty() || config.auth_token.is_empty() {
            return Err(VoiceError::Configuration(
                "TWILIO account sid / auth token missing".to_string(),
            ));
        }
        if config.phone_number.is_empty() {
            return Err(VoiceError::Configuration(
                "no telephony phone number configured".to_string(),
            ));
        }

        let api_base = if config.api_base.is_empty() {
            DEFAULT_API_BASE.to_string()
        } else {
            config.api_base.trim_end_matches('/').to_string()
        };

        Ok(Self {
            http: reqwest::Client::new(),
            api_base,
            account_sid: config.account_sid.clone(),
            auth_token: config.auth_token.clone(),
            from_number: config.phone_number.clone(),
        })
    }

    fn account_url(&self, resource: &str) -> String {
        format!("{}/Accounts/{}/{}", self.api_base, self.account_sid, resource)
    }
}

#[async_trait]
impl TelephonyProvider for TwilioProvider {
    fn name(&self) -> &'static str {
        "twilio"
    }

    async fn place_call(&self, to: &str, instruction_url: &str) -> Result<PlacedCall> {
        let params = [
            ("To", to),
            ("From", self.from_number.as_str()),
            ("Url", instruction_url),
        ];

        let response = self
            .http
            .post(self.account_url("Calls.json"))
            .basic_auth(&self.account_sid, Some(&self.auth_token))
            .form(&params)
            .send()
            .await
            .map_err(|e| VoiceError::Provider(format!("call request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(VoiceError::Provider(format!(
                "call rejected by provider ({}): {}",
                status, body
            )));
        }

        let call: CallResource = response
            .json()
            .await
            .map_err(|e| VoiceError::Provider(format!("malformed call response: {}", e)))?;

        info!(call_sid = %call.sid, to = %to, "outbound call placed");
        Ok(PlacedCall {
            call_sid: call.sid,
            status: call.status,
        })
    }

    async fn send_sms(&self, to: &str, body: &str) -> Result<String> {
        let params = [
            ("To", to),
            ("From", self.from_number.as_str()),
            ("Body", body),
        ];

        let response = self
            .http
            .post(self.account_url("Messages.json"))
            .basic_auth(&self.account_sid, Some(&self.auth_token))
            .form(&params)
            .send()
            .await
            .map_err(|e| VoiceError::Provider(format!("sms request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            return Err(VoiceError::Provider(format!(
                "sms rejected by provider ({})",
                status
            )));
        }

        let message: MessageResource = response
            .json()
            .await
            .map_err(|e| VoiceError::Provider(format!("malformed sms response: {}", e)))?;

        info!(message_sid = %message.sid, to = %to, "sms sent");
        Ok(message.sid)
    }

    async fn fetch_call_status(&self, call_sid: &str) -> Result<Option<ProviderCallStatus>> {
        let response = self
            .http
            .get(self.account_url(&format!("Calls/{}.json", call_sid)))
            .basic_auth(&self.account_sid, Some(&self.auth_token))
            .send()
            .await
            .map_err(|e| VoiceError::Provider(format!("status request failed: {}", e)))?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            debug!(call_sid = %call_sid, "call unknown to provider");
            return Ok(None);
        }
        if !response.status().is_success() {
            let status = response.status();
            return Err(VoiceError::Provider(format!(
                "status query failed ({})",
                status
            )));
        }

        let call: CallResource = response
            .json()
            .await
            .map_err(|e| VoiceError::Provider(format!("malformed status response: {}", e)))?;

        Ok(Some(ProviderCallStatus {
            call_sid: call.sid,
            status: call.status,
            to: call.to,
            duration_secs: call.duration.and_then(|d| d.parse().ok()),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(sid: &str, token: &str, number: &str) -> TelephonyConfig {
        TelephonyConfig {
            account_sid: sid.to_string(),
            auth_token: token.to_string(),
            phone_number: number.to_string(),
            api_base: String::new(),
        }
    }

    #[test]
    fn test_from_config_requires_credentials() {
        assert!(matches!(
            TwilioProvider::from_config(&config("", "", "+15550001")),
            Err(VoiceError::Configuration(_))
        ));
        assert!(matches!(
            TwilioProvider::from_config(&config("AC123", "tok", "")),
            Err(VoiceError::Configuration(_))
        ));
        assert!(TwilioProvider::from_config(&config("AC123", "tok", "+15550001")).is_ok());
    }

    #[test]
    fn test_account_url_layout() {
        let provider = TwilioProvider::from_config(&config("AC123", "tok", "+15550001")).unwrap();
        assert_eq!(
            provider.account_url("Calls.json"),
            "https://api.twilio.com/2010-04-01/Accounts/AC123/Calls.json"
        );
    }
}
