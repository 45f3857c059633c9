//! Terminal UI — ratatui presentation layer.
//!
//! ## Architecture (TEA)
//!
//! Model (`ArogyaApp`) + Update (message handler) + View (render).
//! Immediate mode, no retained widget state. Backend calls never block
//! the loop: update queues requests, the runner spawns tasks, and
//! results return as messages on the shared channel.

pub mod app;
pub mod event;
pub mod input;
pub mod layout;
pub mod markdown;
pub mod runner;

pub use runner::run_tui;
