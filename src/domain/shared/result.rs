//! Domain result type alias

pub use super::error::Result;
