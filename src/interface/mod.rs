//! Interface layer - HTTP API and media stream transport

pub mod api;
