//! Backend API layer — HTTP client, wire types, and the SSE consumer.
//!
//! Everything the UI knows about the backend lives here. The TUI only
//! ever sees decoded types and the [`ApiError`] taxonomy.

pub mod client;
pub mod stream;
pub mod types;

pub use client::{ApiError, ArogyaClient};
pub use types::StreamEvent;
