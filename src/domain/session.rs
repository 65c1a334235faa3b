//! Media-stream call sessions
//!
//! A `CallSession` tracks one live media-stream connection for the duration
//! of a call: lifecycle state, tenant binding and the ordered transcript
//! buffer. The `SessionRegistry` is the shared map of live sessions; its
//! `claim` operation is the single atomic claim-for-finalize transition that
//! resolves the race between a protocol-level stop and a transport-level
//! close to exactly one finalize run.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Mutex;

use crate::domain::shared::{Result, VoiceError};

/// Call session lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionState {
    /// Socket open, no stream bound yet
    Connected,
    /// Stream started, events flowing
    Streaming,
    /// Stop or close observed, finalize in flight
    Finalizing,
    /// Terminal; re-entry is a no-op
    Finalized,
}

/// One live media-stream session, keyed by the provider stream id
#[derive(Debug, Clone)]
pub struct CallSession {
    pub stream_sid: String,
    /// Bound once, at stream start, from trusted session-start parameters
    pub tenant_id: Option<String>,
    pub caller_phone: Option<String>,
    transcript: Vec<String>,
    state: SessionState,
    pub created_at: DateTime<Utc>,
    pub media_packets: u64,
    pub media_bytes: u64,
}

impl CallSession {
    pub fn new(stream_sid: impl Into<String>) -> Self {
        Self {
            stream_sid: stream_sid.into(),
            tenant_id: None,
            caller_phone: None,
            transcript: Vec::new(),
            state: SessionState::Connected,
            created_at: Utc::now(),
            media_packets: 0,
            media_bytes: 0,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Bind the stream and the optional tenant/caller identity.
    ///
    /// Identity comes from session-start custom parameters and is only
    /// settable here; absence is valid (the session stays unbound and
    /// finalize later skips persistence).
    pub fn start_streaming(
        &mut self,
        tenant_id: Option<String>,
        caller_phone: Option<String>,
    ) -> Result<()> {
        if self.state != SessionState::Connected {
            return Err(VoiceError::InvalidStateTransition(format!(
                "stream {} cannot start from {:?}",
                self.stream_sid, self.state
            )));
        }
        self.tenant_id = tenant_id;
        self.caller_phone = caller_phone;
        self.state = SessionState::Streaming;
        Ok(())
    }

    /// Append a transcript fragment in arrival order
    pub fn append_fragment(&mut self, fragment: impl Into<String>) {
        self.transcript.push(fragment.into());
    }

    /// Account for a received media frame
    pub fn record_media(&mut self, bytes: usize) {
        self.media_packets += 1;
        self.media_bytes += bytes as u64;
    }

    /// Enter the finalizing state. Idempotent on `Finalized`.
    pub fn begin_finalize(&mut self) -> Result<()> {
        match self.state {
            SessionState::Finalized => Ok(()),
            SessionState::Finalizing => Ok(()),
            _ => {
                self.state = SessionState::Finalizing;
                Ok(())
            }
        }
    }

    /// Mark the session terminal
    pub fn complete_finalize(&mut self) {
        self.state = SessionState::Finalized;
    }

    pub fn transcript_fragments(&self) -> &[String] {
        &self.transcript
    }

    /// Join fragments in arrival order into the full transcript text
    pub fn joined_transcript(&self) -> String {
        self.transcript.join(" ").trim().to_string()
    }
}

/// Shared registry of live sessions (stream sid -> session).
///
/// Created at server start and drained at shutdown; not a process-wide
/// singleton. Locks are never held across await points.
pub struct SessionRegistry {
    sessions: Mutex<HashMap<String, CallSession>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self {
            sessions: Mutex::new(HashMap::new()),
        }
    }

    /// Insert a new session. At most one session per stream sid; a second
    /// insert for the same sid keeps the existing session and reports false.
    pub fn insert(&self, session: CallSession) -> bool {
        let mut sessions = self.sessions.lock().unwrap();
        match sessions.entry(session.stream_sid.clone()) {
            std::collections::hash_map::Entry::Occupied(_) => false,
            std::collections::hash_map::Entry::Vacant(slot) => {
                slot.insert(session);
                true
            }
        }
    }

    /// Append a transcript fragment to a live session.
    ///
    /// Returns false when the session is unknown; out-of-order delivery is
    /// not an error.
    pub fn append_fragment(&self, stream_sid: &str, fragment: &str) -> bool {
        let mut sessions = self.sessions.lock().unwrap();
        if let Some(session) = sessions.get_mut(stream_sid) {
            session.append_fragment(fragment);
            true
        } else {
            false
        }
    }

    /// Account a media frame against a live session
    pub fn record_media(&self, stream_sid: &str, bytes: usize) -> bool {
        let mut sessions = self.sessions.lock().unwrap();
        if let Some(session) = sessions.get_mut(stream_sid) {
            session.record_media(bytes);
            true
        } else {
            false
        }
    }

    /// Atomically claim a session for finalization (compare-and-delete).
    ///
    /// The session is removed under the lock before any async work happens,
    /// so when both a stop event and a transport close race for the same
    /// stream, exactly one caller receives the session.
    pub fn claim(&self, stream_sid: &str) -> Option<CallSession> {
        let mut sessions = self.sessions.lock().unwrap();
        sessions.remove(stream_sid).map(|mut session| {
            // State transition happens under the same lock as the removal.
            let _ = session.begin_finalize();
            session
        })
    }

    /// Remove and return every live session, for shutdown draining
    pub fn drain(&self) -> Vec<CallSession> {
        let mut sessions = self.sessions.lock().unwrap();
        sessions
            .drain()
            .map(|(_, mut session)| {
                let _ = session.begin_finalize();
                session
            })
            .collect()
    }

    pub fn get(&self, stream_sid: &str) -> Option<CallSession> {
        self.sessions.lock().unwrap().get(stream_sid).cloned()
    }

    pub fn count(&self) -> usize {
        self.sessions.lock().unwrap().len()
    }
}

impl Default for SessionRegistry {
    fn default() -> Self {
        Self::new()
    }
}
