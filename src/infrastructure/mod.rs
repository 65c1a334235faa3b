//! Infrastructure layer - External capabilities and technical concerns

pub mod ai;
pub mod ivr;
pub mod persistence;
pub mod telephony;
