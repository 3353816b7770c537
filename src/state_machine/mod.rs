mod report;
mod state;

pub use report::{PollPolicy, RunReport};
pub use state::{PollOutcome, PollStep, RunMachine, RunState};
