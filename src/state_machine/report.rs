use std::path::PathBuf;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::state::{RunMachine, RunState};

/// Bounds on the poll loop. Both default to `None`, which keeps the
/// historical behavior of polling until the service reports completion.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PollPolicy {
    /// Give up after this many status polls.
    pub max_polls: Option<u64>,
    /// Give up after polling for this long.
    pub max_duration: Option<Duration>,
}

impl PollPolicy {
    /// Whether the given progress has exhausted either bound.
    pub fn exceeded(&self, polls: u64, elapsed: Duration) -> bool {
        if let Some(max) = self.max_polls
            && polls >= max
        {
            return true;
        }
        if let Some(max) = self.max_duration
            && elapsed >= max
        {
            return true;
        }
        false
    }
}

/// Structured record of one client run, printed on request as JSON.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub job_id: Option<String>,
    pub final_state: RunState,
    pub state_transitions: Vec<RunState>,
    pub polls: u64,
    pub output_path: Option<PathBuf>,
    pub started_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
    pub duration_ms: i64,
}

impl RunReport {
    /// Snapshot a finished run.
    pub fn from_machine(
        machine: &RunMachine,
        job_id: Option<String>,
        output_path: Option<PathBuf>,
        started_at: DateTime<Utc>,
    ) -> Self {
        let now = Utc::now();
        let mut transitions = machine.history().to_vec();
        transitions.push(machine.state());

        Self {
            job_id,
            final_state: machine.state(),
            state_transitions: transitions,
            polls: machine.polls(),
            output_path,
            started_at,
            completed_at: now,
            duration_ms: (now - started_at).num_milliseconds(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_policy_is_unbounded() {
        let policy = PollPolicy::default();
        assert!(!policy.exceeded(1_000_000, Duration::from_secs(86_400)));
    }

    #[test]
    fn max_polls_bound() {
        let policy = PollPolicy {
            max_polls: Some(3),
            max_duration: None,
        };
        assert!(!policy.exceeded(2, Duration::ZERO));
        assert!(policy.exceeded(3, Duration::ZERO));
        assert!(policy.exceeded(4, Duration::ZERO));
    }

    #[test]
    fn max_duration_bound() {
        let policy = PollPolicy {
            max_polls: None,
            max_duration: Some(Duration::from_secs(10)),
        };
        assert!(!policy.exceeded(0, Duration::from_secs(9)));
        assert!(policy.exceeded(0, Duration::from_secs(10)));
    }

    #[test]
    fn either_bound_trips() {
        let policy = PollPolicy {
            max_polls: Some(100),
            max_duration: Some(Duration::from_secs(1)),
        };
        assert!(policy.exceeded(5, Duration::from_secs(2)));
        assert!(policy.exceeded(100, Duration::ZERO));
        assert!(!policy.exceeded(5, Duration::ZERO));
    }

    #[test]
    fn report_snapshots_machine_state() {
        let mut machine = RunMachine::new(PollPolicy::default());
        machine.begin_submit();
        machine.submitted();
        let started_at = Utc::now();

        let report = RunReport::from_machine(&machine, Some("job42".into()), None, started_at);
        assert_eq!(report.job_id.as_deref(), Some("job42"));
        assert_eq!(report.final_state, RunState::Submitted);
        assert_eq!(
            report.state_transitions,
            vec![RunState::Idle, RunState::Submitting, RunState::Submitted]
        );
        assert_eq!(report.polls, 0);
        assert!(report.output_path.is_none());
        assert!(report.duration_ms >= 0);
    }

    #[test]
    fn report_serializes_to_json() {
        let machine = RunMachine::new(PollPolicy::default());
        let report = RunReport::from_machine(&machine, None, None, Utc::now());
        let json = serde_json::to_string(&report).unwrap();
        assert!(json.contains(r#""final_state":"IDLE""#));
    }
}
