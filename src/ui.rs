//! Terminal output — spinner and colored status lines.
//!
//! Uses `indicatif` for the progress spinner and `console` for styling.
//! Poll-loop errors go through [`Progress::poll_error`] (`pb.println`) so
//! they do not tear the spinner animation.

use console::Style;
use indicatif::{ProgressBar, ProgressStyle};

use crate::error::RunOutcome;
use crate::state_machine::RunReport;

/// Visual progress for one client run.
pub struct Progress {
    pb: ProgressBar,
    green: Style,
    red: Style,
    yellow: Style,
}

impl Progress {
    /// Start the spinner with an initial phase message.
    pub fn start(message: &str) -> Self {
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.cyan} {msg}")
                .expect("invalid template"),
        );
        pb.set_message(message.to_string());
        pb.enable_steady_tick(std::time::Duration::from_millis(100));

        Self {
            pb,
            green: Style::new().green().bold(),
            red: Style::new().red().bold(),
            yellow: Style::new().yellow(),
        }
    }

    /// Update the spinner to the current phase (uploading, compiling, ...).
    pub fn phase(&self, message: &str) {
        self.pb.set_message(message.to_string());
    }

    /// Log a non-terminal poll failure without disturbing the spinner.
    pub fn poll_error(&self, detail: &str) {
        self.pb
            .println(format!("  {} {detail}", self.yellow.apply_to("↻")));
    }

    /// Stop the spinner and print the final outcome.
    pub fn finish(&self, outcome: &RunOutcome) {
        self.pb.finish_and_clear();
        match outcome {
            RunOutcome::Completed { output, .. } => {
                println!(
                    "  {} code written to {}",
                    self.green.apply_to("✓"),
                    output.display()
                );
            }
            RunOutcome::RemoteRejected { detail } => {
                println!("  {} {detail}", self.red.apply_to("✗"));
            }
            RunOutcome::TimedOut { polls } => {
                println!(
                    "  {} gave up after {polls} polls",
                    self.yellow.apply_to("⏱")
                );
            }
        }
    }

    /// Print the run report as pretty JSON.
    pub fn print_report(&self, report: &RunReport) {
        let status_style = match report.final_state {
            crate::state_machine::RunState::Done => &self.green,
            crate::state_machine::RunState::TimedOut => &self.yellow,
            _ => &self.red,
        };
        println!();
        println!("{}", status_style.apply_to("─── Run Report ───"));
        println!(
            "{}",
            serde_json::to_string_pretty(report).unwrap_or_default()
        );
    }
}
