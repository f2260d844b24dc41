//! Generic generation-job lifecycle: submit, poll until terminal, download.
//!
//! Every vendor API repeats the same shape with different field names and
//! status vocabularies, so the loop lives here once and providers supply the
//! vendor-specific hooks through [`JobDriver`].

use crate::error::{Result, VidGenError};
use crate::video::types::{VideoGenerationRequest, VideoProviderKind};
use async_trait::async_trait;
use std::time::Duration;

/// Payloads below this size are never treated as real video output.
pub const MIN_VIDEO_BYTES: usize = 1000;

/// Outcome of a single poll attempt, after the provider has mapped the
/// vendor's status vocabulary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobPoll {
    /// Job is still queued or processing; keep polling.
    Pending,
    /// Job finished; the artifact can be fetched from this URL.
    Completed { artifact_url: String },
    /// Vendor reported the job as failed.
    Failed { reason: String },
}

/// Fixed-interval polling budget. No backoff, no jitter; the loop always
/// terminates within `max_attempts x interval` wall-clock time.
#[derive(Debug, Clone, Copy)]
pub struct PollPolicy {
    /// Sleep between poll attempts.
    pub interval: Duration,
    /// Attempts before the job is declared timed out.
    pub max_attempts: u32,
}

impl PollPolicy {
    /// Total wall-clock budget of this policy.
    pub fn budget(&self) -> Duration {
        self.interval * self.max_attempts
    }
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(5),
            max_attempts: 60,
        }
    }
}

/// Vendor-specific hooks for the shared lifecycle loop.
#[async_trait]
pub trait JobDriver: Send + Sync {
    /// The provider these hooks talk to.
    fn provider(&self) -> VideoProviderKind;

    /// Sends the generation request and returns the vendor's job id.
    async fn submit(&self, request: &VideoGenerationRequest) -> Result<String>;

    /// Queries the job once and maps the vendor status. An unrecognized
    /// status string must map to [`VidGenError::Protocol`].
    async fn poll(&self, job_id: &str) -> Result<JobPoll>;

    /// Fetches the finished artifact.
    async fn download(&self, artifact_url: &str) -> Result<Vec<u8>>;
}

/// Drives one request through the full lifecycle and returns the media
/// bytes. At most one vendor job exists per request; its id never escapes
/// this function.
///
/// Transport errors during a poll attempt consume an attempt and are retried
/// within the budget; every other error is terminal. A vendor `failed`
/// status, an unrecognized status and an undersized payload all terminate
/// without retry.
pub async fn run<D: JobDriver + ?Sized>(
    driver: &D,
    request: &VideoGenerationRequest,
    policy: &PollPolicy,
) -> Result<Vec<u8>> {
    let job_id = driver.submit(request).await?;
    tracing::debug!(provider = %driver.provider(), job_id = %job_id, "submitted generation job");

    let mut attempt = 0u32;
    while attempt < policy.max_attempts {
        match driver.poll(&job_id).await {
            Ok(JobPoll::Pending) => {
                tracing::debug!(
                    provider = %driver.provider(),
                    job_id = %job_id,
                    attempt = attempt + 1,
                    max_attempts = policy.max_attempts,
                    "job still processing"
                );
                attempt += 1;
                tokio::time::sleep(policy.interval).await;
            }
            Ok(JobPoll::Completed { artifact_url }) => {
                tracing::debug!(provider = %driver.provider(), job_id = %job_id, "job complete, downloading");
                let data = driver.download(&artifact_url).await?;
                if data.len() < MIN_VIDEO_BYTES {
                    return Err(VidGenError::UndersizedPayload {
                        got: data.len(),
                        min: MIN_VIDEO_BYTES,
                    });
                }
                return Ok(data);
            }
            Ok(JobPoll::Failed { reason }) => {
                return Err(VidGenError::GenerationFailed(reason));
            }
            // A dropped connection mid-poll does not doom the job; retry
            // within the same budget.
            Err(VidGenError::Network(e)) => {
                tracing::debug!(
                    provider = %driver.provider(),
                    job_id = %job_id,
                    attempt = attempt + 1,
                    "transport error while polling: {e}"
                );
                attempt += 1;
                tokio::time::sleep(policy.interval).await;
            }
            Err(e) => return Err(e),
        }
    }

    Err(VidGenError::Timeout(policy.budget()))
}
