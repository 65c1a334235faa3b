//! Inbound call and SMS routing
//!
//! Resolves the dialed number to a tenant and produces the voice-response
//! script for the provider. Unknown numbers get a decline script; nothing
//! in here throws past the webhook boundary.

use std::sync::Arc;

use tracing::{info, warn};

use crate::domain::call_log::{CallLogEntry, CallLogRegistry, CallStatus};
use crate::domain::shared::VoiceError;
use crate::domain::tenant::TenantDirectory;
use crate::infrastructure::ai::AiAssistant;
use crate::infrastructure::ivr::VoiceScript;
use crate::infrastructure::telephony::TelephonyProvider;

const DECLINE_MESSAGE: &str =
    "We are sorry, but this number is not currently assigned to a valid organization.";
const REPROMPT_MESSAGE: &str = "I did not hear anything. Please try again.";

pub struct InboundRouter {
    tenants: Arc<dyn TenantDirectory>,
    assistant: Arc<dyn AiAssistant>,
    provider: Arc<dyn TelephonyProvider>,
    logs: Arc<CallLogRegistry>,
    public_url: String,
    gather_timeout_secs: u32,
}

impl InboundRouter {
    pub fn new(
        tenants: Arc<dyn TenantDirectory>,
        assistant: Arc<dyn AiAssistant>,
        provider: Arc<dyn TelephonyProvider>,
        logs: Arc<CallLogRegistry>,
        public_url: impl Into<String>,
        gather_timeout_secs: u32,
    ) -> Self {
        Self {
            tenants,
            assistant,
            provider,
            logs,
            public_url: public_url.into().trim_end_matches('/').to_string(),
            gather_timeout_secs,
        }
    }

    /// Produce the voice-response script for an inbound call
    pub async fn handle_inbound_voice(&self, to: &str, from: &str, call_sid: &str) -> VoiceScript {
        info!(to = %to, from = %from, call_sid = %call_sid, "inbound call");

        let tenant = match self.tenants.find_by_phone_number(to).await {
            Ok(Some(tenant)) => tenant,
            Ok(None) => {
                warn!("declining: {}", VoiceError::UnknownTenant(to.to_string()));
                return VoiceScript::new().say(DECLINE_MESSAGE);
            }
            Err(e) => {
                warn!(to = %to, "tenant lookup failed, declining: {}", e);
                return VoiceScript::new().say(DECLINE_MESSAGE);
            }
        };

        self.logs.register(CallLogEntry::new(
            call_sid.to_string(),
            tenant.id.clone(),
            from.to_string(),
            CallStatus::Ringing,
            self.provider.name(),
        ));

        let gather_action = format!(
            "{}/webhooks/voice/gather?tenantId={}",
            self.public_url, tenant.id
        );

        VoiceScript::new()
            .say_with_voice(&tenant.ai_config.voice_id, &tenant.ai_config.welcome_message)
            .gather_speech(gather_action, self.gather_timeout_secs)
            .say(REPROMPT_MESSAGE)
    }

    /// Forward an inbound SMS to the AI collaborator; reply via the
    /// provider's messaging API if one is produced. Unknown numbers no-op.
    pub async fn handle_inbound_sms(&self, to: &str, from: &str, body: &str) {
        let tenant = match self.tenants.find_by_phone_number(to).await {
            Ok(Some(tenant)) => tenant,
            _ => {
                warn!(to = %to, "inbound SMS to unknown number, ignoring");
                return;
            }
        };

        info!(tenant_id = %tenant.id, from = %from, "inbound SMS");

        match self.assistant.chat_reply(&tenant.id, body).await {
            Ok(Some(reply)) => {
                if let Err(e) = self.provider.send_sms(from, &reply).await {
                    warn!(tenant_id = %tenant.id, "SMS reply failed: {}", e);
                }
            }
            Ok(None) => {}
            Err(e) => warn!(tenant_id = %tenant.id, "chat reply failed: {}", e),
        }
    }

    /// Acknowledge a gathered utterance
    pub fn handle_gather(&self, tenant_id: &str, speech_result: Option<&str>) -> VoiceScript {
        match speech_result.filter(|s| !s.trim().is_empty()) {
            Some(speech) => {
                info!(tenant_id = %tenant_id, "gather result: {}", speech);
                VoiceScript::new().say(format!(
                    "You said: {}. We will connect you to an agent shortly.",
                    speech
                ))
            }
            None => VoiceScript::new().say(REPROMPT_MESSAGE).hangup(),
        }
    }

    /// Script for an outbound call once the provider connects it
    pub fn outbound_script(&self, script: Option<String>) -> VoiceScript {
        let text = script.unwrap_or_else(|| "Hello, thank you for taking our call.".to_string());
        VoiceScript::new().say(text).pause(1)
    }
}
