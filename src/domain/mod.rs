//! Domain layer - Core business logic and rules
//!
//! This layer contains:
//! - Entities: sessions, call log entries, tenants, minutes
//! - Domain Services: registries with defined lifecycles
//! - Repository Interfaces: ports for persistence and external capabilities

pub mod call_log;
pub mod minute;
pub mod session;
pub mod shared;
pub mod tenant;
pub mod transcription;

// Re-export commonly used types
pub use shared::{Result, VoiceError};
