//! Persistence implementations

pub mod memory;

pub use memory::{InMemoryClientRepository, InMemoryMinuteRepository, InMemoryTenantDirectory};
