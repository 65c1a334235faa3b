//! Meeting minutes produced by the post-call pipeline

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::shared::Result;

/// Fixed content used when a call produced no usable speech
pub const NO_SPEECH_PLACEHOLDER: &str =
    "[Call Completed] Audio connection successful. No speech captured.";

/// Prefix applied to AI-generated summaries
pub const AI_SUMMARY_PREFIX: &str = "[AI Generated Summary]";

/// Prefix applied when the pipeline degrades to the raw transcript
pub const RAW_TRANSCRIPT_PREFIX: &str = "[Raw Transcript]";

/// A structured minute persisted once per finalized, tenant-bound session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MeetingMinute {
    pub id: Uuid,
    pub tenant_id: String,
    /// Matched by caller phone within the tenant, when a client exists
    pub client_id: Option<Uuid>,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

impl MeetingMinute {
    pub fn new(tenant_id: String, client_id: Option<Uuid>, content: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            tenant_id,
            client_id,
            content,
            created_at: Utc::now(),
        }
    }
}

/// Storage collaborator for meeting minutes
#[async_trait]
pub trait MinuteRepository: Send + Sync {
    async fn create(&self, minute: &MeetingMinute) -> Result<()>;
}

/// A client known to a tenant
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientRecord {
    pub id: Uuid,
    pub tenant_id: String,
    pub name: String,
    pub phone: String,
}

/// Storage collaborator for client lookup
#[async_trait]
pub trait ClientRepository: Send + Sync {
    /// Best-effort match by phone number within one tenant
    async fn find_by_phone(&self, tenant_id: &str, phone: &str) -> Result<Option<ClientRecord>>;
}
