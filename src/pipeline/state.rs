use std::fmt;
use std::time::{Duration, Instant};

use tracing::{debug, warn};

/// Lifecycle of one run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RunState {
    Init,
    AudioAndOverlaysInFlight,
    ClipsReady,
    Finalized,
    Failed,
}

impl RunState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, RunState::Finalized | RunState::Failed)
    }

    pub fn can_advance_to(&self, next: RunState) -> bool {
        use RunState::*;
        match (self, next) {
            (Init, AudioAndOverlaysInFlight) => true,
            (AudioAndOverlaysInFlight, ClipsReady) => true,
            (ClipsReady, Finalized) => true,
            (from, Failed) => !from.is_terminal(),
            _ => false,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RunState::Init => "init",
            RunState::AudioAndOverlaysInFlight => "audio_and_overlays_in_flight",
            RunState::ClipsReady => "clips_ready",
            RunState::Finalized => "finalized",
            RunState::Failed => "failed",
        }
    }
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Records the state transitions of a run
#[derive(Debug)]
pub struct RunTracker {
    run_id: String,
    state: RunState,
    history: Vec<RunState>,
    started: Instant,
}

impl RunTracker {
    pub fn new<S: Into<String>>(run_id: S) -> Self {
        Self {
            run_id: run_id.into(),
            state: RunState::Init,
            history: vec![RunState::Init],
            started: Instant::now(),
        }
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    pub fn history(&self) -> &[RunState] {
        &self.history
    }

    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    /// Move to `next`; illegal transitions are ignored and return false
    pub fn advance(&mut self, next: RunState) -> bool {
        if !self.state.can_advance_to(next) {
            warn!(run_id = %self.run_id, from = %self.state, to = %next, "Ignoring illegal run transition");
            return false;
        }

        debug!(run_id = %self.run_id, from = %self.state, to = %next, "Run state");
        self.state = next;
        self.history.push(next);
        true
    }

    pub fn fail(&mut self) -> bool {
        self.advance(RunState::Failed)
    }
}
