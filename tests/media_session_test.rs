//! Media Stream Session Integration Tests
//!
//! Drives the session manager with the JSON event frames the telephony
//! provider sends over the media WebSocket and asserts on the persisted
//! meeting minutes.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use base64::Engine;

use opsline::application::session_manager::StreamEvent;
use opsline::application::{MediaStreamSessionManager, PostCallSummarizer};
use opsline::domain::minute::{AI_SUMMARY_PREFIX, NO_SPEECH_PLACEHOLDER};
use opsline::domain::session::SessionRegistry;
use opsline::domain::tenant::{Tenant, TenantAiConfig, TenantDirectory};
use opsline::domain::transcription::{NullRecognizer, SpeechRecognizer};
use opsline::infrastructure::ai::AiAssistant;
use opsline::infrastructure::persistence::{
    InMemoryClientRepository, InMemoryMinuteRepository, InMemoryTenantDirectory,
};
use opsline::Result;

/// Recognizer that transcribes each media chunk as its UTF-8 text
struct EchoRecognizer;

impl SpeechRecognizer for EchoRecognizer {
    fn fragment_for_chunk(&self, audio: &[u8]) -> Option<String> {
        String::from_utf8(audio.to_vec()).ok()
    }
}

struct StubAssistant;

#[async_trait]
impl AiAssistant for StubAssistant {
    async fn summarize_transcript(
        &self,
        _ai_config: &TenantAiConfig,
        transcript: &str,
    ) -> Result<String> {
        Ok(format!("Summary of: {}", transcript))
    }

    async fn chat_reply(&self, _tenant_id: &str, _message: &str) -> Result<Option<String>> {
        Ok(None)
    }
}

struct Harness {
    manager: MediaStreamSessionManager,
    minutes: Arc<InMemoryMinuteRepository>,
}

async fn harness(recognizer: Arc<dyn SpeechRecognizer>) -> Harness {
    let tenants = Arc::new(InMemoryTenantDirectory::new());
    tenants.upsert(Tenant::new("t1", "Acme")).await.unwrap();
    let minutes = Arc::new(InMemoryMinuteRepository::new());

    let summarizer = Arc::new(PostCallSummarizer::new(
        Arc::new(StubAssistant),
        tenants,
        Arc::new(InMemoryClientRepository::new()),
        minutes.clone(),
        Duration::from_secs(5),
        10,
    ));

    let manager =
        MediaStreamSessionManager::new(Arc::new(SessionRegistry::new()), summarizer, recognizer);

    Harness { manager, minutes }
}

fn start_event(stream_sid: &str, tenant_id: Option<&str>) -> StreamEvent {
    let frame = match tenant_id {
        Some(tenant_id) => format!(
            r#"{{"event":"start","start":{{"streamSid":"{}","customParameters":{{"tenantId":"{}","phoneNumber":"+15550111"}}}}}}"#,
            stream_sid, tenant_id
        ),
        None => format!(
            r#"{{"event":"start","start":{{"streamSid":"{}"}}}}"#,
            stream_sid
        ),
    };
    serde_json::from_str(&frame).unwrap()
}

fn media_event(text: &str) -> StreamEvent {
    let payload = base64::engine::general_purpose::STANDARD.encode(text.as_bytes());
    serde_json::from_str(&format!(
        r#"{{"event":"media","media":{{"payload":"{}"}}}}"#,
        payload
    ))
    .unwrap()
}

#[tokio::test]
async fn test_full_stream_produces_summarized_minute() {
    let hx = harness(Arc::new(EchoRecognizer)).await;
    let mut bound = None;

    hx.manager.handle_event(
        &mut bound,
        serde_json::from_str(r#"{"event":"connected","protocol":"Call"}"#).unwrap(),
    );
    hx.manager.handle_event(&mut bound, start_event("MZ1", Some("t1")));
    hx.manager
        .handle_event(&mut bound, media_event("I would like to reschedule"));
    hx.manager
        .handle_event(&mut bound, media_event("my appointment to Friday"));

    assert_eq!(hx.manager.active_sessions(), 1);

    let handle = hx.manager.finalize_stream("MZ1").unwrap();
    handle.await.unwrap();

    assert_eq!(hx.manager.active_sessions(), 0);
    let minutes = hx.minutes.all();
    assert_eq!(minutes.len(), 1);
    assert!(minutes[0].content.starts_with(AI_SUMMARY_PREFIX));
    assert!(minutes[0]
        .content
        .contains("I would like to reschedule my appointment to Friday"));
    assert_eq!(minutes[0].tenant_id, "t1");
}

#[tokio::test]
async fn test_transport_close_without_stop_still_finalizes() {
    let hx = harness(Arc::new(EchoRecognizer)).await;
    let mut bound = None;

    hx.manager.handle_event(&mut bound, start_event("MZ7", Some("t1")));
    hx.manager
        .handle_event(&mut bound, media_event("caller hung up before the stop frame"));

    let handle = hx.manager.handle_disconnect(bound).unwrap();
    handle.await.unwrap();

    assert_eq!(hx.manager.active_sessions(), 0);
    assert_eq!(hx.minutes.count(), 1);
}

#[tokio::test]
async fn test_stop_and_disconnect_race_finalizes_once() {
    let hx = harness(Arc::new(EchoRecognizer)).await;
    let mut bound = None;

    hx.manager.handle_event(&mut bound, start_event("MZ2", Some("t1")));
    hx.manager
        .handle_event(&mut bound, media_event("a transcript long enough to persist"));

    // First claim wins, the second finds nothing
    let first = hx.manager.finalize_stream("MZ2");
    let second = hx.manager.finalize_stream("MZ2");
    assert!(first.is_some());
    assert!(second.is_none());

    first.unwrap().await.unwrap();
    assert!(hx.manager.handle_disconnect(bound).is_none());

    assert_eq!(hx.minutes.count(), 1);
}

#[tokio::test]
async fn test_unbound_stream_persists_no_minute() {
    let hx = harness(Arc::new(EchoRecognizer)).await;
    let mut bound = None;

    hx.manager.handle_event(&mut bound, start_event("MZ3", None));
    hx.manager
        .handle_event(&mut bound, media_event("spoken words without a tenant"));

    let handle = hx.manager.finalize_stream("MZ3").unwrap();
    handle.await.unwrap();

    assert_eq!(hx.minutes.count(), 0);
}

#[tokio::test]
async fn test_silent_call_gets_placeholder_minute() {
    let hx = harness(Arc::new(NullRecognizer)).await;
    let mut bound = None;

    hx.manager.handle_event(&mut bound, start_event("MZ4", Some("t1")));
    for _ in 0..5 {
        hx.manager.handle_event(&mut bound, media_event("audio"));
    }

    let handle = hx.manager.finalize_stream("MZ4").unwrap();
    handle.await.unwrap();

    let minutes = hx.minutes.all();
    assert_eq!(minutes.len(), 1);
    assert_eq!(minutes[0].content, NO_SPEECH_PLACEHOLDER);
}

#[tokio::test]
async fn test_media_before_start_is_ignored() {
    let hx = harness(Arc::new(EchoRecognizer)).await;
    let mut bound = None;

    hx.manager
        .handle_event(&mut bound, media_event("early frame"));
    assert_eq!(hx.manager.active_sessions(), 0);
    assert!(bound.is_none());
}

#[tokio::test]
async fn test_shutdown_drains_live_sessions() {
    let hx = harness(Arc::new(EchoRecognizer)).await;

    let mut first = None;
    hx.manager.handle_event(&mut first, start_event("MZ5", Some("t1")));
    hx.manager
        .handle_event(&mut first, media_event("still mid-call when the server stops"));

    let mut second = None;
    hx.manager.handle_event(&mut second, start_event("MZ6", Some("t1")));
    hx.manager
        .handle_event(&mut second, media_event("another live conversation here"));

    hx.manager.shutdown().await;

    assert_eq!(hx.manager.active_sessions(), 0);
    assert_eq!(hx.minutes.count(), 2);
}
