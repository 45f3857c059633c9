//! Guidance session state — the accumulator behind the streaming view.
//!
//! One session per stream attempt: `Idle → Streaming → (Completed | Failed)`.
//! There is no resumption; a new request starts a fresh session with cleared
//! accumulators. Each start bumps a generation counter, and events tagged
//! with a stale generation are dropped — a task still draining an abandoned
//! stream can never write into the session that replaced it.

use crate::api::StreamEvent;

/// Lifecycle of one streamed guidance request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionPhase {
    #[default]
    Idle,
    Streaming,
    Completed,
    /// Terminal failure. Partial answer text accumulated before the
    /// failure is retained.
    Failed,
}

/// Accumulated output of the current (or last) streamed guidance request.
#[derive(Debug, Default)]
pub struct GuidanceSession {
    phase: SessionPhase,
    thoughts: Vec<String>,
    answer: String,
    error: Option<String>,
    generation: u64,
}

impl GuidanceSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    /// Intermediate agent notes, in arrival order.
    pub fn thoughts(&self) -> &[String] {
        &self.thoughts
    }

    /// The guidance markdown accumulated so far.
    pub fn answer(&self) -> &str {
        &self.answer
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_streaming(&self) -> bool {
        self.phase == SessionPhase::Streaming
    }

    /// Begin a new streaming session: clears all accumulators, enters
    /// `Streaming`, and returns the new generation. The caller tags every
    /// event from the stream task with this value.
    pub fn start(&mut self) -> u64 {
        self.generation += 1;
        self.thoughts.clear();
        self.answer.clear();
        self.error = None;
        self.phase = SessionPhase::Streaming;
        self.generation
    }

    /// Whether events for `generation` still belong to this session.
    pub fn is_current(&self, generation: u64) -> bool {
        generation == self.generation
    }

    /// Apply one stream event. Ignored unless `generation` is current and
    /// the session is still streaming.
    pub fn apply(&mut self, generation: u64, event: StreamEvent) {
        if !self.is_current(generation) || self.phase != SessionPhase::Streaming {
            return;
        }
        match event {
            StreamEvent::Thought { content } => self.thoughts.push(content),
            StreamEvent::Answer { content } => self.answer.push_str(&content),
        }
    }

    /// Mark the stream cleanly closed. Stale or already-terminal sessions
    /// are left alone.
    pub fn complete(&mut self, generation: u64) {
        if self.is_current(generation) && self.phase == SessionPhase::Streaming {
            self.phase = SessionPhase::Completed;
        }
    }

    /// Mark the stream failed, keeping whatever answer text arrived.
    pub fn fail(&mut self, generation: u64, message: String) {
        if self.is_current(generation) && self.phase == SessionPhase::Streaming {
            self.phase = SessionPhase::Failed;
            self.error = Some(message);
        }
    }

    /// Drop back to `Idle` with everything cleared (logout, screen reset).
    pub fn reset(&mut self) {
        self.phase = SessionPhase::Idle;
        self.thoughts.clear();
        self.answer.clear();
        self.error = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn thought(content: &str) -> StreamEvent {
        StreamEvent::Thought {
            content: content.into(),
        }
    }

    fn answer(content: &str) -> StreamEvent {
        StreamEvent::Answer {
            content: content.into(),
        }
    }

    #[test]
    fn fresh_session_is_idle() {
        let session = GuidanceSession::new();
        assert_eq!(session.phase(), SessionPhase::Idle);
        assert!(session.thoughts().is_empty());
        assert!(session.answer().is_empty());
    }

    #[test]
    fn events_accumulate_in_order() {
        let mut session = GuidanceSession::new();
        let gen = session.start();

        session.apply(gen, thought("checking vitals"));
        session.apply(gen, answer("Rest "));
        session.apply(gen, answer("well."));

        assert_eq!(session.thoughts(), ["checking vitals"]);
        assert_eq!(session.answer(), "Rest well.");
        assert!(session.is_streaming());
    }

    #[test]
    fn complete_is_terminal() {
        let mut session = GuidanceSession::new();
        let gen = session.start();
        session.apply(gen, answer("Done."));
        session.complete(gen);

        assert_eq!(session.phase(), SessionPhase::Completed);
        // Late events after close are dropped.
        session.apply(gen, answer(" more"));
        assert_eq!(session.answer(), "Done.");
    }

    #[test]
    fn fail_preserves_partial_answer() {
        let mut session = GuidanceSession::new();
        let gen = session.start();
        session.apply(gen, answer("Drink wat"));
        session.fail(gen, "connection reset".into());

        assert_eq!(session.phase(), SessionPhase::Failed);
        assert_eq!(session.answer(), "Drink wat");
        assert_eq!(session.error(), Some("connection reset"));
    }

    #[test]
    fn stale_generation_events_dropped() {
        let mut session = GuidanceSession::new();
        let old = session.start();
        session.apply(old, answer("old "));

        let new = session.start();
        assert!(session.answer().is_empty());

        // The abandoned task keeps draining; nothing lands.
        session.apply(old, answer("ghost"));
        session.complete(old);
        assert!(session.answer().is_empty());
        assert!(session.is_streaming());

        session.apply(new, answer("fresh"));
        assert_eq!(session.answer(), "fresh");
    }

    #[test]
    fn stale_failure_cannot_mark_new_session_failed() {
        let mut session = GuidanceSession::new();
        let old = session.start();
        let new = session.start();

        session.fail(old, "late transport error".into());
        assert!(session.is_streaming());
        assert!(session.error().is_none());

        session.complete(new);
        assert_eq!(session.phase(), SessionPhase::Completed);
    }

    #[test]
    fn restart_clears_accumulators() {
        let mut session = GuidanceSession::new();
        let gen = session.start();
        session.apply(gen, thought("a"));
        session.apply(gen, answer("b"));
        session.fail(gen, "oops".into());

        session.start();
        assert!(session.thoughts().is_empty());
        assert!(session.answer().is_empty());
        assert!(session.error().is_none());
        assert!(session.is_streaming());
    }

    #[test]
    fn reset_returns_to_idle() {
        let mut session = GuidanceSession::new();
        let gen = session.start();
        session.apply(gen, answer("x"));
        session.reset();

        assert_eq!(session.phase(), SessionPhase::Idle);
        assert!(session.answer().is_empty());
        // Events from the reset-away stream are ignored.
        session.apply(gen, answer("y"));
        assert!(session.answer().is_empty());
    }
}
