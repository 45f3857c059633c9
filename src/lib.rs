//! Arogya — terminal client for the Arogya wellness assistant.
//!
//! Talks to the Arogya HTTP backend (auth, health profile, guidance,
//! history, video recommendations) and renders everything as a ratatui
//! TUI. Guidance can be streamed live over SSE; the consumer in
//! `api::stream` is the heart of the crate.

pub mod api;
pub mod config;
pub mod session;
pub mod tui;
