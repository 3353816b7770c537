pub mod client;
pub mod error;
pub mod types;

pub use client::{CompilerClient, Transport};
pub use error::RemoteError;
pub use types::{Envelope, StatusRequest, SubmitRequest};

/// Seam over the compiler service, implemented by [`CompilerClient`] and by
/// scripted mocks in tests.
#[allow(async_fn_in_trait)]
pub trait CompilerApi {
    /// Upload source text; returns the job identifier on acceptance.
    async fn submit(&self, source: &str) -> Result<String, RemoteError>;

    /// Fetch the current status envelope for a job.
    async fn poll_status(&self, job_id: &str) -> Result<Envelope, RemoteError>;
}
