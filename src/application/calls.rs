//! Outbound call initiation and call status resolution

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info, warn};

use crate::domain::call_log::{
    CallLogEntry, CallLogRegistry, CallStatus, CallStatusReport, StatusSource,
};
use crate::domain::shared::{Result, VoiceError};
use crate::domain::tenant::TenantDirectory;
use crate::infrastructure::telephony::TelephonyProvider;

/// Key under which the outbound script is stashed in a log entry
const SCRIPT_KEY: &str = "script";

/// Result of a successful outbound call initiation
#[derive(Debug, Clone)]
pub struct OutboundCallReceipt {
    pub call_sid: String,
    pub status: CallStatus,
    pub phone_number: String,
}

pub struct CallService {
    provider: Arc<dyn TelephonyProvider>,
    tenants: Arc<dyn TenantDirectory>,
    logs: Arc<CallLogRegistry>,
    public_url: String,
}

impl CallService {
    pub fn new(
        provider: Arc<dyn TelephonyProvider>,
        tenants: Arc<dyn TenantDirectory>,
        logs: Arc<CallLogRegistry>,
        public_url: impl Into<String>,
    ) -> Self {
        Self {
            provider,
            tenants,
            logs,
            public_url: into_trimmed(public_url.into()),
        }
    }

    /// Place an outbound call for a tenant.
    ///
    /// Validation happens before the provider is contacted; provider
    /// failures come back as structured errors, never panics.
    pub async fn initiate_outbound_call(
        &self,
        phone_number: &str,
        tenant_id: &str,
        custom_data: HashMap<String, String>,
    ) -> Result<OutboundCallReceipt> {
        let phone = normalize_phone(phone_number)?;

        // Tenant lookup is best-effort; an unknown tenant still gets the
        // generic script.
        let tenant = self.tenants.get(tenant_id).await.ok().flatten();
        let script = custom_data
            .get(SCRIPT_KEY)
            .cloned()
            .filter(|s| !s.trim().is_empty())
            .or_else(|| tenant.as_ref().map(|t| t.default_script()))
            .unwrap_or_else(|| "Hello, thank you for taking our call.".to_string());

        info!(tenant_id = %tenant_id, to = %phone, "initiating outbound call");

        let instruction_url = format!("{}/webhooks/voice/outbound", self.public_url);
        let placed = self.provider.place_call(&phone, &instruction_url).await?;

        let status = CallStatus::from_provider(&placed.status).unwrap_or(CallStatus::Initiated);

        let mut entry = CallLogEntry::new(
            placed.call_sid.clone(),
            tenant_id.to_string(),
            phone.clone(),
            status,
            self.provider.name(),
        );
        entry.custom_data = custom_data;
        entry.custom_data.insert(SCRIPT_KEY.to_string(), script);
        self.logs.register(entry);

        Ok(OutboundCallReceipt {
            call_sid: placed.call_sid,
            status,
            phone_number: phone,
        })
    }

    /// Resolve a call's status: local cache first, provider API as the
    /// fallback source. Tenant-scoped throughout; a call logged under a
    /// different tenant resolves to `None`, and provider-sourced reports
    /// carry no tenant id. Returns `None`, never an error, when nothing
    /// matches.
    pub async fn get_call_status(
        &self,
        call_sid: &str,
        tenant_id: Option<&str>,
    ) -> Option<CallStatusReport> {
        if let Some(entry) = self.logs.get(call_sid, tenant_id) {
            return Some(CallStatusReport {
                call_sid: entry.call_sid,
                status: entry.status,
                phone_number: Some(entry.phone_number),
                duration_secs: entry.duration_secs,
                timestamp: entry.timestamp,
                tenant_id: Some(entry.tenant_id),
                source: StatusSource::LocalCache,
            });
        }

        // The provider account is shared across tenants. A call that is
        // logged under another tenant stays invisible to this one; the
        // provider is only consulted for calls the registry has never seen.
        if tenant_id.is_some() && self.logs.get(call_sid, None).is_some() {
            return None;
        }

        match self.provider.fetch_call_status(call_sid).await {
            Ok(Some(status)) => Some(CallStatusReport {
                call_sid: status.call_sid,
                status: CallStatus::from_provider(&status.status)
                    .unwrap_or(CallStatus::Initiated),
                phone_number: status.to,
                duration_secs: status.duration_secs,
                timestamp: Utc::now(),
                // Provider data carries no verified tenant binding
                tenant_id: None,
                source: StatusSource::ProviderQuery,
            }),
            Ok(None) => None,
            Err(e) => {
                debug!(call_sid = %call_sid, "provider status query failed: {}", e);
                None
            }
        }
    }

    /// Tenant's call log entries, most recent first
    pub fn logs_for_tenant(&self, tenant_id: &str) -> Vec<CallLogEntry> {
        self.logs.list_for_tenant(tenant_id)
    }

    /// Script stashed for an outbound call, fetched by the instruction
    /// webhook when the provider connects the call
    pub fn outbound_script(&self, call_sid: &str) -> Option<String> {
        self.logs
            .get(call_sid, None)
            .and_then(|entry| entry.custom_data.get(SCRIPT_KEY).cloned())
    }

    /// Apply a provider status callback to the cached entry
    pub fn record_status_callback(
        &self,
        call_sid: &str,
        provider_status: &str,
        duration_secs: Option<u32>,
    ) {
        match CallStatus::from_provider(provider_status) {
            Some(status) => {
                if !self.logs.update_status(call_sid, status, duration_secs) {
                    debug!(call_sid = %call_sid, "status callback for unknown call");
                }
            }
            None => warn!(
                call_sid = %call_sid,
                status = %provider_status,
                "unrecognized provider status"
            ),
        }
    }
}

fn into_trimmed(url: String) -> String {
    url.trim_end_matches('/').to_string()
}

/// Loose E.164 validation: separators stripped, optional leading `+`,
/// first digit 1-9, at most 15 digits.
pub fn normalize_phone(raw: &str) -> Result<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(VoiceError::Validation("phone number is required".to_string()));
    }

    let cleaned: String = trimmed
        .chars()
        .filter(|c| !matches!(c, ' ' | '(' | ')' | '-'))
        .collect();

    let digits = cleaned.strip_prefix('+').unwrap_or(&cleaned);
    let valid = digits.len() >= 2
        && digits.len() <= 15
        && digits.chars().all(|c| c.is_ascii_digit())
        && !digits.starts_with('0');

    if !valid {
        return Err(VoiceError::Validation(
            "invalid phone number format, use international format (e.g. +1234567890)"
                .to_string(),
        ));
    }

    Ok(cleaned)
}
