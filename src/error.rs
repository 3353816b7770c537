use std::path::PathBuf;

use thiserror::Error;

use crate::remote::RemoteError;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("not find filepath {path}: {source}")]
    Input {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Config error: {0}")]
    Config(String),

    #[error("compiler service error: {0}")]
    Remote(#[from] RemoteError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// How a run ended, exposed to the binary so that only `main` decides the
/// process exit code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// Artifact written to `output`.
    Completed { job_id: String, output: PathBuf },
    /// The service refused the submission (non-success status or nonzero
    /// envelope code). Historically a soft failure: the process still
    /// exits 0, with the rejection detail printed.
    RemoteRejected { detail: String },
    /// A poll policy bound tripped before the job completed.
    TimedOut { polls: u64 },
}

impl RunOutcome {
    /// Exit-code mapping. Remote rejection deliberately maps to 0 to keep
    /// the documented behavior of the original client; timeouts get their
    /// own code so scripts can tell them apart from input errors.
    pub fn exit_code(&self) -> i32 {
        match self {
            RunOutcome::Completed { .. } => 0,
            RunOutcome::RemoteRejected { .. } => 0,
            RunOutcome::TimedOut { .. } => 2,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn input_error_display_names_the_path() {
        let err = ClientError::Input {
            path: "/does/not/exist".into(),
            source: std::io::Error::from(std::io::ErrorKind::NotFound),
        };
        assert!(err.to_string().contains("/does/not/exist"));
    }

    #[test]
    fn exit_codes() {
        let done = RunOutcome::Completed {
            job_id: "job42".into(),
            output: PathBuf::from("./job42.js"),
        };
        assert_eq!(done.exit_code(), 0);

        let rejected = RunOutcome::RemoteRejected {
            detail: "request status error: 500".into(),
        };
        assert_eq!(rejected.exit_code(), 0);

        let timed_out = RunOutcome::TimedOut { polls: 10 };
        assert_eq!(timed_out.exit_code(), 2);
    }

    #[test]
    fn error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<ClientError>();
    }
}
