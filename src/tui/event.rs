//! TUI event types — merges input and backend responses.
//!
//! All events flow through a single mpsc channel as AppMessages. Backend
//! tasks spawned by the runner report back as ApiEvents; stream tasks tag
//! every event with the generation they were started under so the model
//! can drop output from abandoned sessions.

use crossterm::event::KeyEvent;

use crate::api::types::{GuidanceResponse, HistoryEntry, Profile, Video};
use crate::api::StreamEvent;

/// Messages that drive the TUI update loop.
#[derive(Debug)]
pub enum AppMessage {
    /// Keyboard input.
    Input(KeyEvent),
    /// A backend task finished (or produced a stream event).
    Api(ApiEvent),
    /// Quit the TUI.
    Quit,
}

/// Which backend operation an error belongs to, for routing the message
/// to the right screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiAction {
    Login,
    Register,
    ProfileLoad,
    ProfileSave,
    Guidance,
    FollowUp,
    History,
    Videos,
}

/// Results flowing back from spawned backend tasks.
#[derive(Debug)]
pub enum ApiEvent {
    LoginOk {
        user_id: String,
        full_name: String,
    },
    RegisterOk,
    ProfileLoaded(Option<Profile>),
    ProfileSaved,
    GuidanceReady(Box<GuidanceResponse>),
    FollowUpAnswer(String),
    HistoryLoaded(Vec<HistoryEntry>),
    VideosLoaded(Vec<Video>),
    RequestFailed {
        action: ApiAction,
        message: String,
    },
    /// One parsed SSE event from the guidance stream.
    StreamEvent {
        generation: u64,
        event: StreamEvent,
    },
    /// The guidance stream closed cleanly.
    StreamClosed {
        generation: u64,
    },
    /// The guidance stream died mid-flight.
    StreamFailed {
        generation: u64,
        message: String,
    },
}
