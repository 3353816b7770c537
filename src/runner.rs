use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::Utc;
use tokio::time::sleep;

use crate::artifact;
use crate::config::ClientConfig;
use crate::error::{ClientError, RunOutcome};
use crate::remote::CompilerApi;
use crate::state_machine::{PollOutcome, PollPolicy, PollStep, RunMachine, RunReport};
use crate::ui::Progress;

/// Drives one run through submit and poll-to-completion.
pub struct CompileRunner<'p, A> {
    api: A,
    poll_interval: Duration,
    policy: PollPolicy,
    output_dir: PathBuf,
    verbose: bool,
    progress: Option<&'p Progress>,
}

impl<'p, A: CompilerApi> CompileRunner<'p, A> {
    pub fn new(api: A, config: &ClientConfig) -> Self {
        Self {
            api,
            poll_interval: config.poll_interval(),
            policy: config.poll_policy(),
            output_dir: PathBuf::from("."),
            verbose: false,
            progress: None,
        }
    }

    pub fn with_progress(mut self, progress: &'p Progress) -> Self {
        self.progress = Some(progress);
        self
    }

    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    #[cfg(test)]
    fn with_output_dir(mut self, dir: PathBuf) -> Self {
        self.output_dir = dir;
        self
    }

    /// Read the source file, submit it, and poll until a terminal state.
    ///
    /// Submission failures come back as [`RunOutcome::RemoteRejected`], not
    /// as errors: the caller decides what that means for the exit code.
    /// Poll failures never abort the loop; only a completed job or a
    /// tripped policy bound does.
    pub async fn run(&self, path: &Path) -> Result<(RunOutcome, RunReport), ClientError> {
        let started_at = Utc::now();
        let source = std::fs::read_to_string(path).map_err(|e| ClientError::Input {
            path: path.display().to_string(),
            source: e,
        })?;

        let mut machine = RunMachine::new(self.policy.clone());
        machine.begin_submit();
        self.phase("uploading source to the compiler service...");

        let job_id = match self.api.submit(&source).await {
            Ok(id) => id,
            Err(e) => {
                machine.rejected();
                let outcome = RunOutcome::RemoteRejected {
                    detail: e.to_string(),
                };
                let report = RunReport::from_machine(&machine, None, None, started_at);
                return Ok((outcome, report));
            }
        };

        machine.submitted();
        self.phase("upload accepted, compiling...");
        machine.begin_polling();

        loop {
            let poll = match self.api.poll_status(&job_id).await {
                Ok(envelope) => PollOutcome::from_envelope(&envelope),
                Err(e) => PollOutcome::Transport(e.to_string()),
            };
            self.log_poll(&poll);

            match machine.on_poll(poll) {
                PollStep::Finish(text) => {
                    let output = artifact::write(&self.output_dir, &job_id, &text)?;
                    let outcome = RunOutcome::Completed {
                        job_id: job_id.clone(),
                        output: output.clone(),
                    };
                    let report =
                        RunReport::from_machine(&machine, Some(job_id), Some(output), started_at);
                    return Ok((outcome, report));
                }
                PollStep::Delay => sleep(self.poll_interval).await,
                PollStep::Continue => {}
                PollStep::TimedOut => {
                    let outcome = RunOutcome::TimedOut {
                        polls: machine.polls(),
                    };
                    let report = RunReport::from_machine(&machine, Some(job_id), None, started_at);
                    return Ok((outcome, report));
                }
            }
        }
    }

    fn phase(&self, message: &str) {
        if let Some(progress) = self.progress {
            progress.phase(message);
        } else if self.verbose {
            eprintln!("{message}");
        }
    }

    fn log_poll(&self, poll: &PollOutcome) {
        match poll {
            PollOutcome::RemoteError(body) => self.note(&format!("request data error: {body}")),
            PollOutcome::Transport(detail) => self.note(detail),
            PollOutcome::Unrecognized(code) if self.verbose => {
                self.note(&format!("unrecognized status code: {code}"));
            }
            PollOutcome::InProgress if self.verbose => self.note("still compiling"),
            _ => {}
        }
    }

    fn note(&self, message: &str) {
        if let Some(progress) = self.progress {
            progress.poll_error(message);
        } else if self.verbose {
            eprintln!("  {message}");
        }
    }
}
