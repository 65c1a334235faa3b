//! API interface implementations

pub mod dto;
pub mod media_ws;
pub mod metrics_handler;
pub mod router;
pub mod voice_handler;
pub mod webhook_handler;

pub use metrics_handler::{init_metrics, update_active_streams};
pub use router::build_router;
pub use voice_handler::AppState;
