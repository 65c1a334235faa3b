//! Post-call summarization pipeline
//!
//! Consumes a claimed session, turns the aggregated transcript into minute
//! content through a layered fallback chain (AI summary -> raw transcript ->
//! placeholder) and persists the result. Every failure in here is contained;
//! finalize always completes from the session manager's perspective.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::timeout;
use tracing::{error, info, warn};

use crate::domain::minute::{
    ClientRepository, MeetingMinute, MinuteRepository, AI_SUMMARY_PREFIX, NO_SPEECH_PLACEHOLDER,
    RAW_TRANSCRIPT_PREFIX,
};
use crate::domain::session::CallSession;
use crate::domain::tenant::{TenantAiConfig, TenantDirectory};
use crate::infrastructure::ai::AiAssistant;

pub struct PostCallSummarizer {
    assistant: Arc<dyn AiAssistant>,
    tenants: Arc<dyn TenantDirectory>,
    clients: Arc<dyn ClientRepository>,
    minutes: Arc<dyn MinuteRepository>,
    summary_timeout: Duration,
    min_transcript_chars: usize,
}

impl PostCallSummarizer {
    pub fn new(
        assistant: Arc<dyn AiAssistant>,
        tenants: Arc<dyn TenantDirectory>,
        clients: Arc<dyn ClientRepository>,
        minutes: Arc<dyn MinuteRepository>,
        summary_timeout: Duration,
        min_transcript_chars: usize,
    ) -> Self {
        Self {
            assistant,
            tenants,
            clients,
            minutes,
            summary_timeout,
            min_transcript_chars,
        }
    }

    /// Finalize a claimed session: summarize, match a client, persist.
    ///
    /// Returns the persisted minute, or `None` when the session was unbound
    /// or persistence failed. Never propagates an error.
    pub async fn finalize(&self, mut session: CallSession) -> Option<MeetingMinute> {
        let tenant_id = match session.tenant_id.clone() {
            Some(id) => id,
            None => {
                info!(
                    stream_sid = %session.stream_sid,
                    "session had no bound tenant, skipping minute"
                );
                session.complete_finalize();
                return None;
            }
        };

        info!(stream_sid = %session.stream_sid, tenant_id = %tenant_id, "finalizing call record");

        let transcript = session.joined_transcript();
        let content = self.build_content(&tenant_id, &transcript).await;

        let client_id = match &session.caller_phone {
            Some(phone) => match self.clients.find_by_phone(&tenant_id, phone).await {
                Ok(client) => client.map(|c| c.id),
                Err(e) => {
                    warn!(tenant_id = %tenant_id, "client lookup failed: {}", e);
                    None
                }
            },
            None => None,
        };

        let minute = MeetingMinute::new(tenant_id.clone(), client_id, content);
        session.complete_finalize();

        match self.minutes.create(&minute).await {
            Ok(()) => {
                info!(tenant_id = %tenant_id, minute_id = %minute.id, "meeting minute saved");
                Some(minute)
            }
            Err(e) => {
                error!(tenant_id = %tenant_id, "failed to save minute: {}", e);
                None
            }
        }
    }

    /// Build the minute content through the fallback chain
    async fn build_content(&self, tenant_id: &str, transcript: &str) -> String {
        if transcript.len() <= self.min_transcript_chars {
            return NO_SPEECH_PLACEHOLDER.to_string();
        }

        let ai_config = match self.tenants.get(tenant_id).await {
            Ok(Some(tenant)) => tenant.ai_config,
            _ => TenantAiConfig::default(),
        };

        match timeout(
            self.summary_timeout,
            self.assistant.summarize_transcript(&ai_config, transcript),
        )
        .await
        {
            Ok(Ok(summary)) => format!("{}\n\n{}", AI_SUMMARY_PREFIX, summary),
            Ok(Err(e)) => {
                warn!(tenant_id = %tenant_id, "AI summary failed, using raw transcript: {}", e);
                format!("{}\n\n{}", RAW_TRANSCRIPT_PREFIX, transcript)
            }
            Err(_) => {
                warn!(tenant_id = %tenant_id, "AI summary timed out, using raw transcript");
                format!("{}\n\n{}", RAW_TRANSCRIPT_PREFIX, transcript)
            }
        }
    }
}
