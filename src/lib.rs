//! Opsline - multi-tenant call-session engine built with Rust
//!
//! This is a Domain-Driven Design (DDD) implementation of the voice
//! subsystem of a business-operations platform: outbound call initiation,
//! inbound call/SMS routing, live media-stream session tracking and the
//! post-call summarization pipeline.

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod interface;

// Re-export commonly used types
pub use domain::shared::error::VoiceError;
pub use domain::shared::result::Result;
