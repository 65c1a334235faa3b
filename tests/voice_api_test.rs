//! Voice API Integration Tests
//!
//! Exercises the HTTP surface end to end with in-memory stores and a fake
//! telephony provider.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use metrics_exporter_prometheus::PrometheusBuilder;
use serde_json::{json, Value};
use tower::ServiceExt; // For `oneshot`

use opsline::application::{
    CallService, InboundRouter, MediaStreamSessionManager, PostCallSummarizer,
};
use opsline::domain::call_log::CallLogRegistry;
use opsline::domain::session::SessionRegistry;
use opsline::domain::tenant::{Tenant, TenantAiConfig, TenantDirectory};
use opsline::domain::transcription::NullRecognizer;
use opsline::infrastructure::ai::AiAssistant;
use opsline::infrastructure::persistence::{
    InMemoryClientRepository, InMemoryMinuteRepository, InMemoryTenantDirectory,
};
use opsline::infrastructure::telephony::{
    PlacedCall, ProviderCallStatus, TelephonyProvider, UnconfiguredProvider,
};
use opsline::interface::api::{build_router, AppState};
use opsline::{Result, VoiceError};

/// Provider fake that records outgoing SMS and places calls successfully
#[derive(Default)]
struct FakeProvider {
    sent_sms: Mutex<Vec<(String, String)>>,
    fail_calls: bool,
}

impl FakeProvider {
    fn failing() -> Self {
        Self {
            sent_sms: Mutex::new(Vec::new()),
            fail_calls: true,
        }
    }

    fn sms_log(&self) -> Vec<(String, String)> {
        self.sent_sms.lock().unwrap().clone()
    }
}

#[async_trait]
impl TelephonyProvider for FakeProvider {
    fn name(&self) -> &'static str {
        "fake"
    }

    async fn place_call(&self, to: &str, _instruction_url: &str) -> Result<PlacedCall> {
        if self.fail_calls {
            return Err(VoiceError::Provider("carrier rejected".to_string()));
        }
        Ok(PlacedCall {
            call_sid: format!("CA{}", to.trim_start_matches('+')),
            status: "queued".to_string(),
        })
    }

    async fn send_sms(&self, to: &str, body: &str) -> Result<String> {
        self.sent_sms
            .lock()
            .unwrap()
            .push((to.to_string(), body.to_string()));
        Ok("SM1".to_string())
    }

    async fn fetch_call_status(&self, _call_sid: &str) -> Result<Option<ProviderCallStatus>> {
        Ok(None)
    }
}

struct ReplyAssistant;

#[async_trait]
impl AiAssistant for ReplyAssistant {
    async fn summarize_transcript(
        &self,
        _ai_config: &TenantAiConfig,
        transcript: &str,
    ) -> Result<String> {
        Ok(transcript.to_string())
    }

    async fn chat_reply(&self, _tenant_id: &str, message: &str) -> Result<Option<String>> {
        Ok(Some(format!("You asked: {}", message)))
    }
}

async fn app(provider: Arc<dyn TelephonyProvider>) -> Router {
    let tenants: Arc<dyn TenantDirectory> = Arc::new(InMemoryTenantDirectory::new());
    tenants
        .upsert(Tenant::new("t1", "Acme Clinic").with_phone_number("+15550100"))
        .await
        .unwrap();

    let assistant: Arc<dyn AiAssistant> = Arc::new(ReplyAssistant);
    let logs = Arc::new(CallLogRegistry::new());
    let minutes = Arc::new(InMemoryMinuteRepository::new());

    let summarizer = Arc::new(PostCallSummarizer::new(
        assistant.clone(),
        tenants.clone(),
        Arc::new(InMemoryClientRepository::new()),
        minutes,
        Duration::from_secs(5),
        10,
    ));

    let state = AppState {
        calls: Arc::new(CallService::new(
            provider.clone(),
            tenants.clone(),
            logs.clone(),
            "https://ops.example.com",
        )),
        inbound: Arc::new(InboundRouter::new(
            tenants,
            assistant,
            provider,
            logs,
            "https://ops.example.com",
            3,
        )),
        sessions: Arc::new(MediaStreamSessionManager::new(
            Arc::new(SessionRegistry::new()),
            summarizer,
            Arc::new(NullRecognizer),
        )),
    };

    // Per-test recorder, not the process-global one
    let prometheus_handle = PrometheusBuilder::new().build_recorder().handle();
    build_router(state, prometheus_handle)
}

fn json_request(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn form_request(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn body_json(response: axum::response::Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}

async fn body_text(response: axum::response::Response) -> String {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(body.to_vec()).unwrap()
}

#[tokio::test]
async fn test_health_check() {
    let app = app(Arc::new(FakeProvider::default())).await;

    let response = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["success"], true);
}

#[tokio::test]
async fn test_outbound_call_lifecycle_over_http() {
    let app = app(Arc::new(FakeProvider::default())).await;

    let response = app
        .clone()
        .oneshot(json_request(
            "/calls/outbound",
            json!({"phoneNumber": "+15550123456", "tenantId": "t1"}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["success"], true);
    let call_id = json["callId"].as_str().unwrap().to_string();

    // Status comes back from the local cache
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri(format!("/calls/{}?tenantId=t1", call_id))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["source"], "local_cache");

    // And the call shows up in the tenant's log
    let response = app
        .oneshot(
            Request::builder()
                .uri("/calls?tenantId=t1")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let json = body_json(response).await;
    assert_eq!(json["data"]["total"], 1);
}

#[tokio::test]
async fn test_invalid_phone_number_is_rejected() {
    let app = app(Arc::new(FakeProvider::default())).await;

    let response = app
        .oneshot(json_request(
            "/calls/outbound",
            json!({"phoneNumber": "not-a-number"}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["success"], false);
}

#[tokio::test]
async fn test_missing_credentials_yield_service_unavailable() {
    let app = app(Arc::new(UnconfiguredProvider)).await;

    let response = app
        .oneshot(json_request(
            "/calls/outbound",
            json!({"phoneNumber": "+15550123456", "tenantId": "t1"}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn test_provider_failure_maps_to_bad_gateway() {
    let app = app(Arc::new(FakeProvider::failing())).await;

    let response = app
        .oneshot(json_request(
            "/calls/outbound",
            json!({"phoneNumber": "+15550123456", "tenantId": "t1"}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
}

#[tokio::test]
async fn test_call_log_listing_requires_tenant() {
    let app = app(Arc::new(FakeProvider::default())).await;

    let response = app
        .oneshot(Request::builder().uri("/calls").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_unknown_call_status_is_not_found() {
    let app = app(Arc::new(FakeProvider::default())).await;

    let response = app
        .oneshot(
            Request::builder()
                .uri("/calls/CA-missing")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_inbound_call_to_registered_number_gets_greeting() {
    let app = app(Arc::new(FakeProvider::default())).await;

    let response = app
        .oneshot(form_request(
            "/webhooks/voice",
            "To=%2B15550100&From=%2B15550111&CallSid=CA900",
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let xml = body_text(response).await;
    assert!(xml.contains("<Response>"));
    assert!(xml.contains("Thank you for calling"));
    assert!(xml.contains("/webhooks/voice/gather?tenantId=t1"));
}

#[tokio::test]
async fn test_inbound_call_to_unknown_number_is_declined() {
    let app = app(Arc::new(FakeProvider::default())).await;

    let response = app
        .oneshot(form_request(
            "/webhooks/voice",
            "To=%2B15559999&From=%2B15550111&CallSid=CA901",
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let xml = body_text(response).await;
    assert!(xml.contains("not currently assigned"));
    assert!(!xml.contains("<Gather"));
}

#[tokio::test]
async fn test_inbound_sms_gets_ai_reply() {
    let provider = Arc::new(FakeProvider::default());
    let app = app(provider.clone()).await;

    let response = app
        .oneshot(form_request(
            "/webhooks/sms",
            "To=%2B15550100&From=%2B15550111&Body=What+are+your+hours",
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let sms = provider.sms_log();
    assert_eq!(sms.len(), 1);
    assert_eq!(sms[0].0, "+15550111");
    assert!(sms[0].1.contains("What are your hours"));
}

#[tokio::test]
async fn test_status_callback_updates_cached_entry() {
    let app = app(Arc::new(FakeProvider::default())).await;

    let response = app
        .clone()
        .oneshot(json_request(
            "/calls/outbound",
            json!({"phoneNumber": "+15550123456", "tenantId": "t1"}),
        ))
        .await
        .unwrap();
    let call_id = body_json(response).await["callId"]
        .as_str()
        .unwrap()
        .to_string();

    let response = app
        .clone()
        .oneshot(form_request(
            "/webhooks/status",
            &format!("CallSid={}&CallStatus=completed&CallDuration=42", call_id),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .oneshot(
            Request::builder()
                .uri(format!("/calls/{}?tenantId=t1", call_id))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let json = body_json(response).await;
    assert_eq!(json["data"]["status"], "completed");
    assert_eq!(json["data"]["duration"], 42);
}

#[tokio::test]
async fn test_outbound_instruction_webhook_plays_stashed_script() {
    let app = app(Arc::new(FakeProvider::default())).await;

    let response = app
        .clone()
        .oneshot(json_request(
            "/calls/outbound",
            json!({
                "phoneNumber": "+15550123456",
                "tenantId": "t1",
                "customData": {"script": "Your appointment is confirmed for Friday."}
            }),
        ))
        .await
        .unwrap();
    let call_id = body_json(response).await["callId"]
        .as_str()
        .unwrap()
        .to_string();

    let response = app
        .oneshot(form_request(
            "/webhooks/voice/outbound",
            &format!("CallSid={}", call_id),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let xml = body_text(response).await;
    assert!(xml.contains("Your appointment is confirmed for Friday."));
}

#[tokio::test]
async fn test_gather_result_is_acknowledged() {
    let app = app(Arc::new(FakeProvider::default())).await;

    let response = app
        .oneshot(form_request(
            "/webhooks/voice/gather?tenantId=t1",
            "SpeechResult=I+need+to+reschedule",
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let xml = body_text(response).await;
    assert!(xml.contains("You said: I need to reschedule"));
}
