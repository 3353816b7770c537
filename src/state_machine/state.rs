use std::fmt;
use std::time::Instant;

use serde::{Deserialize, Serialize};

use super::report::PollPolicy;
use crate::remote::Envelope;

/// The states of a client run.
///
/// A run flows IDLE → SUBMITTING → SUBMITTED → POLLING and ends in one of
/// the terminal states DONE, REMOTE_REJECTED, or TIMED_OUT. Polling loops on
/// itself until the service reports completion or a policy bound trips.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RunState {
    Idle,
    Submitting,
    Submitted,
    Polling,
    Done,
    RemoteRejected,
    TimedOut,
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunState::Idle => write!(f, "IDLE"),
            RunState::Submitting => write!(f, "SUBMITTING"),
            RunState::Submitted => write!(f, "SUBMITTED"),
            RunState::Polling => write!(f, "POLLING"),
            RunState::Done => write!(f, "DONE"),
            RunState::RemoteRejected => write!(f, "REMOTE_REJECTED"),
            RunState::TimedOut => write!(f, "TIMED_OUT"),
        }
    }
}

/// Interpretation of one status poll.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollOutcome {
    /// Envelope code `0`: compilation finished, artifact text attached.
    Ready(String),
    /// Envelope code `1`: still compiling.
    InProgress,
    /// Envelope code `-1`: the service reported an error for this poll.
    /// Carries the envelope body for the log. Not terminal.
    RemoteError(String),
    /// The request itself failed (non-success status, network error,
    /// malformed body). Not terminal.
    Transport(String),
    /// An envelope code outside the documented set.
    Unrecognized(i64),
}

impl PollOutcome {
    /// Classify a status envelope.
    pub fn from_envelope(envelope: &Envelope) -> Self {
        match envelope.code {
            0 => match envelope.data.as_str() {
                Some(text) => PollOutcome::Ready(text.to_string()),
                None => PollOutcome::Transport("artifact payload was not text".into()),
            },
            1 => PollOutcome::InProgress,
            -1 => PollOutcome::RemoteError(envelope.to_log_string()),
            other => PollOutcome::Unrecognized(other),
        }
    }
}

/// What the poll loop should do next.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollStep {
    /// Terminal success: persist the artifact and stop.
    Finish(String),
    /// Sleep for the poll interval, then poll again.
    Delay,
    /// Poll again immediately.
    Continue,
    /// A policy bound tripped before completion. Terminal.
    TimedOut,
}

/// Tracks a run through its states and applies the poll policy.
#[derive(Debug)]
pub struct RunMachine {
    state: RunState,
    history: Vec<RunState>,
    polls: u64,
    policy: PollPolicy,
    polling_since: Option<Instant>,
}

impl RunMachine {
    pub fn new(policy: PollPolicy) -> Self {
        Self {
            state: RunState::Idle,
            history: Vec::new(),
            polls: 0,
            policy,
            polling_since: None,
        }
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    /// States visited before the current one. Self-loops while polling are
    /// counted in [`polls`](Self::polls), not recorded here.
    pub fn history(&self) -> &[RunState] {
        &self.history
    }

    pub fn polls(&self) -> u64 {
        self.polls
    }

    fn transition(&mut self, next: RunState) {
        self.history.push(self.state);
        self.state = next;
    }

    /// IDLE → SUBMITTING, on invocation with a readable input path.
    pub fn begin_submit(&mut self) {
        self.transition(RunState::Submitting);
    }

    /// SUBMITTING → SUBMITTED, on a job identifier from the service.
    pub fn submitted(&mut self) {
        self.transition(RunState::Submitted);
    }

    /// SUBMITTING → REMOTE_REJECTED, on a definitive submission failure.
    pub fn rejected(&mut self) {
        self.transition(RunState::RemoteRejected);
    }

    /// SUBMITTED → POLLING; starts the poll-duration clock.
    pub fn begin_polling(&mut self) {
        self.transition(RunState::Polling);
        self.polling_since = Some(Instant::now());
    }

    /// Record one poll and decide the next step.
    ///
    /// A ready artifact always wins, even on the poll that would have
    /// exhausted the policy. Every other outcome keeps the loop going
    /// unless a bound has tripped.
    pub fn on_poll(&mut self, outcome: PollOutcome) -> PollStep {
        self.polls += 1;

        if let PollOutcome::Ready(artifact) = outcome {
            self.transition(RunState::Done);
            return PollStep::Finish(artifact);
        }

        let elapsed = self.polling_since.map(|t| t.elapsed()).unwrap_or_default();
        if self.policy.exceeded(self.polls, elapsed) {
            self.transition(RunState::TimedOut);
            return PollStep::TimedOut;
        }

        match outcome {
            PollOutcome::InProgress => PollStep::Delay,
            _ => PollStep::Continue,
        }
    }
}
