//! Media-stream session manager
//!
//! Owns the duplex-connection protocol state machine: creates sessions on
//! stream start, routes media frames into the transcript aggregator and
//! triggers finalization exactly once per session, whichever of stop or
//! transport close arrives first.

use std::sync::Arc;

use base64::Engine;
use serde::Deserialize;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::application::summarizer::PostCallSummarizer;
use crate::domain::session::{CallSession, SessionRegistry};
use crate::domain::transcription::SpeechRecognizer;

/// Media-stream event frames (JSON over the duplex connection)
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "event", rename_all = "lowercase")]
pub enum StreamEvent {
    Connected {
        #[serde(default)]
        protocol: Option<String>,
    },
    Start {
        start: StreamStart,
    },
    Media {
        media: MediaFrame,
    },
    Stop {
        stop: StreamStop,
    },
}

#[derive(Debug, Clone, Deserialize)]
pub struct StreamStart {
    #[serde(rename = "streamSid")]
    pub stream_sid: String,
    #[serde(rename = "customParameters", default)]
    pub custom_parameters: Option<StartParameters>,
}

/// Trusted session-start parameters injected by the voice webhook
#[derive(Debug, Clone, Deserialize)]
pub struct StartParameters {
    #[serde(rename = "tenantId", default)]
    pub tenant_id: Option<String>,
    #[serde(rename = "phoneNumber", default)]
    pub phone_number: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MediaFrame {
    /// Base64-encoded audio
    pub payload: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StreamStop {
    #[serde(rename = "streamSid")]
    pub stream_sid: String,
}

pub struct MediaStreamSessionManager {
    registry: Arc<SessionRegistry>,
    summarizer: Arc<PostCallSummarizer>,
    recognizer: Arc<dyn SpeechRecognizer>,
}

impl MediaStreamSessionManager {
    pub fn new(
        registry: Arc<SessionRegistry>,
        summarizer: Arc<PostCallSummarizer>,
        recognizer: Arc<dyn SpeechRecognizer>,
    ) -> Self {
        Self {
            registry,
            summarizer,
            recognizer,
        }
    }

    pub fn active_sessions(&self) -> usize {
        self.registry.count()
    }

    /// Dispatch one protocol event for a connection.
    ///
    /// `bound` is the connection's stream binding: `None` until a start
    /// event names the stream. Events for one connection arrive in order;
    /// nothing here suspends.
    pub fn handle_event(&self, bound: &mut Option<String>, event: StreamEvent) {
        match event {
            StreamEvent::Connected { protocol } => {
                info!(protocol = ?protocol, "media stream connected");
            }
            StreamEvent::Start { start } => self.handle_start(bound, start),
            StreamEvent::Media { media } => self.handle_media(bound.as_deref(), media),
            StreamEvent::Stop { stop } => {
                self.finalize_stream(&stop.stream_sid);
            }
        }
    }

    fn handle_start(&self, bound: &mut Option<String>, start: StreamStart) {
        let mut session = CallSession::new(start.stream_sid.clone());
        let (tenant_id, phone_number) = match start.custom_parameters {
            Some(params) => (params.tenant_id, params.phone_number),
            None => (None, None),
        };

        // Absence of a tenant is valid; finalize will skip persistence.
        if let Err(e) = session.start_streaming(tenant_id, phone_number) {
            warn!(stream_sid = %start.stream_sid, "start rejected: {}", e);
            return;
        }

        info!(
            stream_sid = %start.stream_sid,
            tenant_bound = session.tenant_id.is_some(),
            "media stream started"
        );

        if !self.registry.insert(session) {
            warn!(stream_sid = %start.stream_sid, "duplicate start for live stream ignored");
            return;
        }
        *bound = Some(start.stream_sid);
    }

    fn handle_media(&self, bound: Option<&str>, media: MediaFrame) {
        // Out-of-order media before a start is not an error.
        let stream_sid = match bound {
            Some(sid) => sid,
            None => {
                debug!("media frame before stream start, ignoring");
                return;
            }
        };

        let audio = match base64::engine::general_purpose::STANDARD.decode(&media.payload) {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!(stream_sid = %stream_sid, "undecodable media payload: {}", e);
                return;
            }
        };

        self.registry.record_media(stream_sid, audio.len());

        if let Some(fragment) = self.recognizer.fragment_for_chunk(&audio) {
            if !self.registry.append_fragment(stream_sid, &fragment) {
                debug!(stream_sid = %stream_sid, "fragment for unknown session dropped");
            }
        }
    }

    /// Transport-level close; the fallback finalize path when no stop
    /// message was seen.
    pub fn handle_disconnect(&self, bound: Option<String>) -> Option<JoinHandle<()>> {
        bound.and_then(|stream_sid| self.finalize_stream(&stream_sid))
    }

    /// Claim the session and run finalization as an independent task.
    ///
    /// The registry removal is the atomic claim: when stop and close race,
    /// the second caller finds nothing and returns `None`.
    pub fn finalize_stream(&self, stream_sid: &str) -> Option<JoinHandle<()>> {
        let session = match self.registry.claim(stream_sid) {
            Some(session) => session,
            None => {
                debug!(stream_sid = %stream_sid, "stream already claimed for finalize");
                return None;
            }
        };

        info!(stream_sid = %stream_sid, "stream stopped, finalizing");

        let summarizer = self.summarizer.clone();
        Some(tokio::spawn(async move {
            summarizer.finalize(session).await;
        }))
    }

    /// Drain every live session and finalize it, for server shutdown
    pub async fn shutdown(&self) {
        let sessions = self.registry.drain();
        if sessions.is_empty() {
            return;
        }
        info!(count = sessions.len(), "draining live media sessions");
        for session in sessions {
            self.summarizer.finalize(session).await;
        }
    }
}
