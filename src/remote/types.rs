//! Wire types for the compiler service endpoints.
//!
//! The service speaks informal JSON over HTTP: both `/code` and `/status`
//! answer with the same envelope shape, `{code, data}`, where the meaning
//! of `data` depends on the endpoint and on `code`.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Body of `POST /code` — the full source text to compile.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitRequest {
    pub code: String,
}

/// Body of `POST /status` — the job identifier returned by submission.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusRequest {
    pub filename: String,
}

/// Response envelope shared by both endpoints.
///
/// For `/code`, `data` is an object holding the job identifier (see
/// [`SubmitData`]). For `/status`, `data` is the artifact text and is only
/// present when `code == 0`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope {
    /// Application-level status: `0` ok/done, `1` still compiling,
    /// `-1` remote-side error. Anything else is unrecognized.
    pub code: i64,
    #[serde(default)]
    pub data: Value,
}

/// The `data` object of a successful submission response.
#[derive(Debug, Clone, Deserialize)]
pub struct SubmitData {
    pub filename: String,
}

impl Envelope {
    /// Render the whole envelope for log output.
    pub fn to_log_string(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| format!("code {}", self.code))
    }
}
