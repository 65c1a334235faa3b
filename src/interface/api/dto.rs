//! Voice API DTOs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::domain::call_log::{CallLogEntry, CallStatusReport};

/// Generic API response wrapper
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn error(message: String) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message),
        }
    }
}

/// Outbound call request body
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutboundCallRequest {
    #[serde(default)]
    pub phone_number: String,
    #[serde(default)]
    pub tenant_id: Option<String>,
    #[serde(default)]
    pub custom_data: HashMap<String, String>,
}

/// Outbound call response
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutboundCallResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub call_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl OutboundCallResponse {
    pub fn placed(call_id: String, status: &str, phone_number: String) -> Self {
        Self {
            success: true,
            call_id: Some(call_id),
            status: Some(status.to_string()),
            phone_number: Some(phone_number),
            error: None,
        }
    }

    pub fn failed(error: String) -> Self {
        Self {
            success: false,
            call_id: None,
            status: None,
            phone_number: None,
            error: Some(error),
        }
    }
}

/// Call status response
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CallStatusResponse {
    pub call_id: String,
    pub status: String,
    pub phone_number: Option<String>,
    pub duration: Option<u32>,
    pub timestamp: DateTime<Utc>,
    pub tenant_id: Option<String>,
    pub source: String,
}

impl From<CallStatusReport> for CallStatusResponse {
    fn from(report: CallStatusReport) -> Self {
        Self {
            call_id: report.call_sid,
            status: report.status.as_str().to_string(),
            phone_number: report.phone_number,
            duration: report.duration_secs,
            timestamp: report.timestamp,
            tenant_id: report.tenant_id,
            source: match report.source {
                crate::domain::call_log::StatusSource::LocalCache => "local_cache".to_string(),
                crate::domain::call_log::StatusSource::ProviderQuery => {
                    "provider_query".to_string()
                }
            },
        }
    }
}

/// One call log entry in the list response
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CallLogResponse {
    pub call_id: String,
    pub tenant_id: String,
    pub phone_number: String,
    pub status: String,
    pub provider: String,
    pub duration: Option<u32>,
    pub timestamp: DateTime<Utc>,
}

impl From<CallLogEntry> for CallLogResponse {
    fn from(entry: CallLogEntry) -> Self {
        Self {
            call_id: entry.call_sid,
            tenant_id: entry.tenant_id,
            phone_number: entry.phone_number,
            status: entry.status.as_str().to_string(),
            provider: entry.provider,
            duration: entry.duration_secs,
            timestamp: entry.timestamp,
        }
    }
}

/// Call log list response
#[derive(Debug, Serialize)]
pub struct CallLogListResponse {
    pub logs: Vec<CallLogResponse>,
    pub total: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outbound_request_accepts_minimal_body() {
        let request: OutboundCallRequest =
            serde_json::from_str(r#"{"phoneNumber":"+15550001"}"#).unwrap();
        assert_eq!(request.phone_number, "+15550001");
        assert!(request.tenant_id.is_none());
        assert!(request.custom_data.is_empty());
    }

    #[test]
    fn test_outbound_response_shapes() {
        let ok = OutboundCallResponse::placed("CA1".to_string(), "initiated", "+1555".to_string());
        let json = serde_json::to_string(&ok).unwrap();
        assert!(json.contains("\"callId\":\"CA1\""));
        assert!(!json.contains("error"));

        let err = OutboundCallResponse::failed("bad number".to_string());
        let json = serde_json::to_string(&err).unwrap();
        assert!(json.contains("\"success\":false"));
        assert!(!json.contains("callId"));
    }
}
