use std::time::{Duration, Instant};

use reqwest::Client;
use serde::Serialize;

use super::error::RemoteError;
use super::types::{Envelope, StatusRequest, SubmitData, SubmitRequest};
use super::CompilerApi;

/// Transport-level retry and timeout settings for a single logical request.
///
/// Each logical request (one submission, one status poll) is attempted up to
/// `max_attempts` times on transient failure, each attempt bounded by
/// `response_timeout`, the whole sequence bounded by `deadline`.
#[derive(Debug, Clone)]
pub struct Transport {
    pub max_attempts: u32,
    pub response_timeout: Duration,
    pub deadline: Duration,
}

impl Default for Transport {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            response_timeout: Duration::from_secs(15),
            deadline: Duration::from_secs(30),
        }
    }
}

/// HTTP client for the compiler service.
pub struct CompilerClient {
    client: Client,
    base_url: String,
    transport: Transport,
}

impl CompilerClient {
    /// Create a client pointing at the given base URL.
    pub fn new(base_url: String, transport: Transport) -> Self {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .timeout(transport.response_timeout)
            .build()
            .expect("failed to build HTTP client");
        Self {
            client,
            base_url,
            transport,
        }
    }

    /// POST `body` to `path`, retrying transient failures until the attempt
    /// budget or the deadline runs out. A definitive error aborts the
    /// sequence immediately.
    async fn post_with_retry<B: Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<Envelope, RemoteError> {
        let url = format!("{}{}", self.base_url, path);
        let started = Instant::now();
        let mut last_err = None;

        for attempt in 1..=self.transport.max_attempts {
            if attempt > 1 && started.elapsed() >= self.transport.deadline {
                break;
            }
            match self.post_once(&url, body).await {
                Ok(envelope) => return Ok(envelope),
                Err(e) if e.is_transient() => last_err = Some(e),
                Err(e) => return Err(e),
            }
        }

        // At least one attempt always runs, so last_err is set on failure.
        Err(last_err.unwrap_or_else(|| RemoteError::Malformed("no attempt made".into())))
    }

    async fn post_once<B: Serialize>(&self, url: &str, body: &B) -> Result<Envelope, RemoteError> {
        let response = self.client.post(url).json(body).send().await?;
        let status = response.status();

        if !status.is_success() {
            return Err(RemoteError::Status {
                status: status.as_u16(),
            });
        }

        let envelope = response.json::<Envelope>().await?;
        Ok(envelope)
    }
}

impl CompilerApi for CompilerClient {
    /// Upload source text to `/code` and return the job identifier.
    ///
    /// A nonzero envelope code is a definitive rejection and is reported
    /// with the full response body for the log.
    async fn submit(&self, source: &str) -> Result<String, RemoteError> {
        let req = SubmitRequest {
            code: source.to_string(),
        };
        let envelope = self.post_with_retry("/code", &req).await?;

        if envelope.code != 0 {
            return Err(RemoteError::Rejected {
                code: envelope.code,
                body: envelope.to_log_string(),
            });
        }

        let data: SubmitData = serde_json::from_value(envelope.data)
            .map_err(|e| RemoteError::Malformed(e.to_string()))?;
        Ok(data.filename)
    }

    /// Ask `/status` about a job. Interpretation of the envelope code is
    /// left to the caller; only transport-level failures are errors here.
    async fn poll_status(&self, job_id: &str) -> Result<Envelope, RemoteError> {
        let req = StatusRequest {
            filename: job_id.to_string(),
        };
        self.post_with_retry("/status", &req).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_client(base_url: String) -> CompilerClient {
        CompilerClient::new(
            base_url,
            Transport {
                max_attempts: 5,
                response_timeout: Duration::from_secs(5),
                deadline: Duration::from_secs(30),
            },
        )
    }

    #[tokio::test]
    async fn submit_returns_job_id() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/code"))
            .and(body_json(json!({"code": "var x = 1;"})))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"code": 0, "data": {"filename": "job42"}})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let client = test_client(server.uri());
        let job_id = client.submit("var x = 1;").await.unwrap();
        assert_eq!(job_id, "job42");
    }

    #[tokio::test]
    async fn submit_retries_transient_status_then_succeeds() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/code"))
            .respond_with(ResponseTemplate::new(502))
            .up_to_n_times(2)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/code"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"code": 0, "data": {"filename": "job7"}})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let client = test_client(server.uri());
        let job_id = client.submit("f()").await.unwrap();
        assert_eq!(job_id, "job7");
    }

    #[tokio::test]
    async fn submit_reports_last_status_after_attempts_exhausted() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/code"))
            .respond_with(ResponseTemplate::new(500))
            .expect(5)
            .mount(&server)
            .await;

        let client = test_client(server.uri());
        let err = client.submit("f()").await.unwrap_err();
        assert!(matches!(err, RemoteError::Status { status: 500 }));
    }

    #[tokio::test]
    async fn submit_never_retries_a_definitive_rejection() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/code"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"code": 2})))
            .expect(1)
            .mount(&server)
            .await;

        let client = test_client(server.uri());
        let err = client.submit("f()").await.unwrap_err();
        match err {
            RemoteError::Rejected { code, body } => {
                assert_eq!(code, 2);
                assert!(body.contains(r#""code":2"#));
            }
            other => panic!("expected Rejected, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn submit_rejects_missing_filename_as_malformed() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/code"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"code": 0, "data": {}})))
            .expect(1)
            .mount(&server)
            .await;

        let client = test_client(server.uri());
        let err = client.submit("f()").await.unwrap_err();
        assert!(matches!(err, RemoteError::Malformed(_)));
    }

    #[tokio::test]
    async fn poll_status_returns_raw_envelope() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/status"))
            .and(body_json(json!({"filename": "job42"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"code": 1})))
            .expect(1)
            .mount(&server)
            .await;

        let client = test_client(server.uri());
        let envelope = client.poll_status("job42").await.unwrap();
        assert_eq!(envelope.code, 1);
    }

    #[tokio::test]
    async fn poll_status_surfaces_transport_failure_after_retries() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/status"))
            .respond_with(ResponseTemplate::new(503))
            .expect(5)
            .mount(&server)
            .await;

        let client = test_client(server.uri());
        let err = client.poll_status("job42").await.unwrap_err();
        assert!(matches!(err, RemoteError::Status { status: 503 }));
    }
}
