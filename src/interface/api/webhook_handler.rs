//! Telephony provider webhook handlers
//!
//! The provider posts form-encoded callbacks for inbound calls, SMS,
//! gather results and status updates. Responses carrying voice-response
//! markup are served as `text/xml`.

use axum::{
    extract::{Form, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use tracing::info;

use super::metrics_handler::{record_inbound_call, record_inbound_sms};
use super::voice_handler::AppState;
use crate::infrastructure::ivr::empty_response;

#[derive(Debug, Deserialize)]
pub struct VoiceWebhookForm {
    #[serde(rename = "To", default)]
    pub to: String,
    #[serde(rename = "From", default)]
    pub from: String,
    #[serde(rename = "CallSid", default)]
    pub call_sid: String,
}

#[derive(Debug, Deserialize)]
pub struct SmsWebhookForm {
    #[serde(rename = "To", default)]
    pub to: String,
    #[serde(rename = "From", default)]
    pub from: String,
    #[serde(rename = "Body", default)]
    pub body: String,
}

#[derive(Debug, Deserialize)]
pub struct GatherQuery {
    #[serde(rename = "tenantId", default)]
    pub tenant_id: String,
}

#[derive(Debug, Deserialize)]
pub struct GatherForm {
    #[serde(rename = "SpeechResult", default)]
    pub speech_result: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct OutboundScriptForm {
    #[serde(rename = "CallSid", default)]
    pub call_sid: String,
}

#[derive(Debug, Deserialize)]
pub struct StatusCallbackForm {
    #[serde(rename = "CallSid", default)]
    pub call_sid: String,
    #[serde(rename = "CallStatus", default)]
    pub call_status: String,
    #[serde(rename = "CallDuration", default)]
    pub call_duration: Option<String>,
}

fn xml(body: String) -> Response {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/xml")],
        body,
    )
        .into_response()
}

/// Inbound voice webhook: greeting + speech gather, or a decline script
pub async fn inbound_voice(
    State(state): State<AppState>,
    Form(form): Form<VoiceWebhookForm>,
) -> Response {
    record_inbound_call();
    let script = state
        .inbound
        .handle_inbound_voice(&form.to, &form.from, &form.call_sid)
        .await;
    xml(script.render())
}

/// Inbound SMS webhook; replies go out asynchronously via the provider API
pub async fn inbound_sms(
    State(state): State<AppState>,
    Form(form): Form<SmsWebhookForm>,
) -> Response {
    record_inbound_sms();
    state
        .inbound
        .handle_inbound_sms(&form.to, &form.from, &form.body)
        .await;
    xml(empty_response())
}

/// Gather result webhook: the caller spoke
pub async fn gather_result(
    State(state): State<AppState>,
    Query(query): Query<GatherQuery>,
    Form(form): Form<GatherForm>,
) -> Response {
    let script = state
        .inbound
        .handle_gather(&query.tenant_id, form.speech_result.as_deref());
    xml(script.render())
}

/// Outbound call instruction webhook: the provider connected the call and
/// asks what to play
pub async fn outbound_script(
    State(state): State<AppState>,
    Form(form): Form<OutboundScriptForm>,
) -> Response {
    let stored = state.calls.outbound_script(&form.call_sid);
    let script = state.inbound.outbound_script(stored);
    xml(script.render())
}

/// Call status callback
pub async fn status_callback(
    State(state): State<AppState>,
    Form(form): Form<StatusCallbackForm>,
) -> StatusCode {
    info!(
        call_sid = %form.call_sid,
        status = %form.call_status,
        "provider status callback"
    );
    let duration = form.call_duration.as_deref().and_then(|d| d.parse().ok());
    state
        .calls
        .record_status_callback(&form.call_sid, &form.call_status, duration);
    StatusCode::OK
}
