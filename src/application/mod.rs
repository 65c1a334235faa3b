//! Application layer - Use-case orchestration over the domain

pub mod calls;
pub mod inbound;
pub mod session_manager;
pub mod summarizer;

pub use calls::CallService;
pub use inbound::InboundRouter;
pub use session_manager::MediaStreamSessionManager;
pub use summarizer::PostCallSummarizer;
