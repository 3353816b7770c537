//! Client configuration loaded from `swcc.toml`.
//!
//! Every knob that used to be an embedded literal in the original client is
//! a documented field here. Values absent from the file use the historical
//! defaults, so a run with no file and no flags behaves exactly like the
//! original. CLI flags take precedence over the file.

use anyhow::Result;
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

use crate::cli::Cli;
use crate::remote::Transport;
use crate::state_machine::PollPolicy;

/// Base URL the original client shipped with.
pub const DEFAULT_BASE_URL: &str = "http://34.92.175.137";

/// Top-level configuration, loaded from `swcc.toml` in the working directory.
#[derive(Debug, Clone, Deserialize)]
pub struct ClientConfig {
    /// Base URL of the compiler service.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Transport attempts per logical request on transient failure.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Per-attempt response timeout in seconds.
    #[serde(default = "default_response_timeout_secs")]
    pub response_timeout_secs: u64,

    /// Overall deadline in seconds for one request's attempt sequence.
    #[serde(default = "default_deadline_secs")]
    pub deadline_secs: u64,

    /// Delay between "still compiling" polls, in milliseconds.
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    /// Stop with a timeout after this many polls. Unset means poll forever.
    #[serde(default)]
    pub max_polls: Option<u64>,

    /// Stop with a timeout after this many seconds of polling.
    /// Unset means poll forever.
    #[serde(default)]
    pub max_duration_secs: Option<u64>,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_max_attempts() -> u32 {
    5
}

fn default_response_timeout_secs() -> u64 {
    15
}

fn default_deadline_secs() -> u64 {
    30
}

fn default_poll_interval_ms() -> u64 {
    2000
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            max_attempts: default_max_attempts(),
            response_timeout_secs: default_response_timeout_secs(),
            deadline_secs: default_deadline_secs(),
            poll_interval_ms: default_poll_interval_ms(),
            max_polls: None,
            max_duration_secs: None,
        }
    }
}

impl ClientConfig {
    /// Load the configuration from `swcc.toml` in the current directory.
    /// Falls back to defaults if the file does not exist.
    pub fn load() -> Result<Self> {
        Self::load_from(Path::new("swcc.toml"))
    }

    fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let contents = std::fs::read_to_string(path)?;
            Ok(toml::from_str::<ClientConfig>(&contents)?)
        } else {
            Ok(Self::default())
        }
    }

    /// Apply CLI flag overrides on top of the file values.
    pub fn with_overrides(mut self, cli: &Cli) -> Self {
        if let Some(url) = &cli.base_url {
            self.base_url = url.clone();
        }
        if let Some(n) = cli.max_attempts {
            self.max_attempts = n;
        }
        if let Some(secs) = cli.response_timeout_secs {
            self.response_timeout_secs = secs;
        }
        if let Some(secs) = cli.deadline_secs {
            self.deadline_secs = secs;
        }
        if let Some(ms) = cli.poll_interval_ms {
            self.poll_interval_ms = ms;
        }
        if cli.max_polls.is_some() {
            self.max_polls = cli.max_polls;
        }
        if cli.max_duration_secs.is_some() {
            self.max_duration_secs = cli.max_duration_secs;
        }
        self
    }

    /// Transport settings for the HTTP client.
    pub fn transport(&self) -> Transport {
        Transport {
            max_attempts: self.max_attempts,
            response_timeout: Duration::from_secs(self.response_timeout_secs),
            deadline: Duration::from_secs(self.deadline_secs),
        }
    }

    /// Bounds for the poll loop.
    pub fn poll_policy(&self) -> PollPolicy {
        PollPolicy {
            max_polls: self.max_polls,
            max_duration: self.max_duration_secs.map(Duration::from_secs),
        }
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}
