//! Call management API handlers

use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use tracing::{error, info};

use super::dto::{
    ApiResponse, CallLogListResponse, CallLogResponse, CallStatusResponse, OutboundCallRequest,
    OutboundCallResponse,
};
use super::metrics_handler::{record_call_failed, record_call_initiated};
use crate::application::{CallService, InboundRouter, MediaStreamSessionManager};
use crate::domain::shared::VoiceError;

/// Shared API state
#[derive(Clone)]
pub struct AppState {
    pub calls: Arc<CallService>,
    pub inbound: Arc<InboundRouter>,
    pub sessions: Arc<MediaStreamSessionManager>,
}

#[derive(Debug, Deserialize)]
pub struct TenantQuery {
    #[serde(rename = "tenantId")]
    pub tenant_id: Option<String>,
}

/// Health check
pub async fn health_check() -> Json<ApiResponse<&'static str>> {
    Json(ApiResponse::success("operational"))
}

/// Initiate an outbound call
pub async fn initiate_outbound_call(
    State(state): State<AppState>,
    Json(request): Json<OutboundCallRequest>,
) -> (StatusCode, Json<OutboundCallResponse>) {
    let tenant_id = request
        .tenant_id
        .unwrap_or_else(|| "default_tenant".to_string());

    info!(tenant_id = %tenant_id, "API: outbound call requested");

    match state
        .calls
        .initiate_outbound_call(&request.phone_number, &tenant_id, request.custom_data)
        .await
    {
        Ok(receipt) => {
            record_call_initiated();
            (
                StatusCode::OK,
                Json(OutboundCallResponse::placed(
                    receipt.call_sid,
                    receipt.status.as_str(),
                    receipt.phone_number,
                )),
            )
        }
        Err(e) => {
            let status = match &e {
                VoiceError::Validation(_) => StatusCode::BAD_REQUEST,
                VoiceError::Configuration(_) => StatusCode::SERVICE_UNAVAILABLE,
                _ => StatusCode::BAD_GATEWAY,
            };
            record_call_failed(status.as_u16());
            error!("API: outbound call failed: {}", e);
            (status, Json(OutboundCallResponse::failed(e.to_string())))
        }
    }
}

/// Get call status by provider call id
pub async fn get_call_status(
    State(state): State<AppState>,
    Path(call_sid): Path<String>,
    Query(query): Query<TenantQuery>,
) -> Result<Json<ApiResponse<CallStatusResponse>>, (StatusCode, Json<ApiResponse<()>>)> {
    info!(call_sid = %call_sid, "API: call status lookup");

    match state
        .calls
        .get_call_status(&call_sid, query.tenant_id.as_deref())
        .await
    {
        Some(report) => Ok(Json(ApiResponse::success(report.into()))),
        None => Err((
            StatusCode::NOT_FOUND,
            Json(ApiResponse::error(format!("Call {} not found", call_sid))),
        )),
    }
}

/// List call log entries for a tenant
pub async fn list_call_logs(
    State(state): State<AppState>,
    Query(query): Query<HashMap<String, String>>,
) -> Result<Json<ApiResponse<CallLogListResponse>>, (StatusCode, Json<ApiResponse<()>>)> {
    let tenant_id = match query.get("tenantId") {
        Some(tenant_id) if !tenant_id.is_empty() => tenant_id.clone(),
        _ => {
            return Err((
                StatusCode::BAD_REQUEST,
                Json(ApiResponse::error("tenantId is required".to_string())),
            ))
        }
    };

    let logs: Vec<CallLogResponse> = state
        .calls
        .logs_for_tenant(&tenant_id)
        .into_iter()
        .map(CallLogResponse::from)
        .collect();
    let total = logs.len();

    Ok(Json(ApiResponse::success(CallLogListResponse {
        logs,
        total,
    })))
}
