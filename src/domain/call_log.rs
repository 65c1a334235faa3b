//! Call log registry
//!
//! Tenant-scoped store of call metadata and status, keyed by the
//! provider-issued call identifier. This is an in-memory cache; the durable
//! backing store is an external collaborator.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Mutex;
use uuid::Uuid;

/// Call status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CallStatus {
    /// Call request accepted by the provider
    Initiated,
    /// Remote party is being alerted
    Ringing,
    /// Call answered and in progress
    InProgress,
    /// Call completed normally
    Completed,
    /// Call failed, was rejected or never answered
    Failed,
}

impl CallStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CallStatus::Initiated => "initiated",
            CallStatus::Ringing => "ringing",
            CallStatus::InProgress => "in_progress",
            CallStatus::Completed => "completed",
            CallStatus::Failed => "failed",
        }
    }

    /// Map a provider status-callback string onto the local enum
    pub fn from_provider(s: &str) -> Option<Self> {
        match s {
            "queued" | "initiated" => Some(CallStatus::Initiated),
            "ringing" => Some(CallStatus::Ringing),
            "in-progress" | "answered" => Some(CallStatus::InProgress),
            "completed" => Some(CallStatus::Completed),
            "busy" | "failed" | "no-answer" | "canceled" => Some(CallStatus::Failed),
            _ => None,
        }
    }
}

/// A single call log entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CallLogEntry {
    pub id: Uuid,
    /// Provider-issued call identifier
    pub call_sid: String,
    pub tenant_id: String,
    pub phone_number: String,
    pub status: CallStatus,
    pub provider: String,
    pub duration_secs: Option<u32>,
    pub timestamp: DateTime<Utc>,
    /// Arbitrary caller-supplied data; also carries the outbound script
    pub custom_data: HashMap<String, String>,
}

impl CallLogEntry {
    pub fn new(
        call_sid: String,
        tenant_id: String,
        phone_number: String,
        status: CallStatus,
        provider: &str,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            call_sid,
            tenant_id,
            phone_number,
            status,
            provider: provider.to_string(),
            duration_secs: None,
            timestamp: Utc::now(),
            custom_data: HashMap::new(),
        }
    }
}

/// Where a status report was resolved from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusSource {
    LocalCache,
    ProviderQuery,
}

/// Resolved call status with provenance
#[derive(Debug, Clone, Serialize)]
pub struct CallStatusReport {
    pub call_sid: String,
    pub status: CallStatus,
    pub phone_number: Option<String>,
    pub duration_secs: Option<u32>,
    pub timestamp: DateTime<Utc>,
    pub tenant_id: Option<String>,
    pub source: StatusSource,
}

/// Concurrency-safe call log registry, keyed by provider call id.
///
/// Constructed once at server start and shared via `Arc`; entries are never
/// deleted (a production store would cap or age them out).
pub struct CallLogRegistry {
    entries: Mutex<HashMap<String, CallLogEntry>>,
}

impl CallLogRegistry {
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Register a new entry. An existing entry for the same call id is kept.
    pub fn register(&self, entry: CallLogEntry) {
        let mut entries = self.entries.lock().unwrap();
        entries.entry(entry.call_sid.clone()).or_insert(entry);
    }

    /// Update status (and optionally duration) from a provider callback
    pub fn update_status(&self, call_sid: &str, status: CallStatus, duration_secs: Option<u32>) -> bool {
        let mut entries = self.entries.lock().unwrap();
        if let Some(entry) = entries.get_mut(call_sid) {
            entry.status = status;
            if duration_secs.is_some() {
                entry.duration_secs = duration_secs;
            }
            true
        } else {
            false
        }
    }

    /// Look up an entry. When a tenant id is supplied the lookup is
    /// tenant-scoped: entries belonging to another tenant are never returned.
    pub fn get(&self, call_sid: &str, tenant_id: Option<&str>) -> Option<CallLogEntry> {
        let entries = self.entries.lock().unwrap();
        entries.get(call_sid).filter(|entry| match tenant_id {
            Some(tenant) => entry.tenant_id == tenant,
            None => true,
        }).cloned()
    }

    /// All entries for one tenant, most recent first
    pub fn list_for_tenant(&self, tenant_id: &str) -> Vec<CallLogEntry> {
        let entries = self.entries.lock().unwrap();
        let mut logs: Vec<CallLogEntry> = entries
            .values()
            .filter(|entry| entry.tenant_id == tenant_id)
            .cloned()
            .collect();
        logs.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        logs
    }

    pub fn count(&self) -> usize {
        self.entries.lock().unwrap().len()
    }
}

impl Default for CallLogRegistry {
    fn default() -> Self {
        Self::new()
    }
}
