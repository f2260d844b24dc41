//! Runway ML video generation provider.

use crate::error::{parse_retry_after, sanitize_error_message, Result, VidGenError};
use crate::video::lifecycle::{self, JobDriver, JobPoll, PollPolicy};
use crate::video::provider::VideoProvider;
use crate::video::types::{
    GeneratedVideo, VideoGenerationRequest, VideoMetadata, VideoProviderKind, VideoSource,
};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

const DEFAULT_BASE_URL: &str = "https://api.runwayml.com/v1";
const MAX_DURATION_SECS: u32 = 10;
const MODEL_ID: &str = "runway-gen2";

/// Builder for RunwayProvider.
#[derive(Debug, Clone)]
pub struct RunwayProviderBuilder {
    api_key: Option<String>,
    base_url: String,
    poll_interval: Duration,
    max_poll_attempts: u32,
    request_timeout: Duration,
    download_timeout: Duration,
}

impl Default for RunwayProviderBuilder {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            poll_interval: Duration::from_secs(5),
            max_poll_attempts: 60,
            request_timeout: Duration::from_secs(30),
            download_timeout: Duration::from_secs(60),
        }
    }
}

impl RunwayProviderBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the API key. Falls back to `RUNWAY_API_KEY` env var.
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Overrides the API base URL (used by tests against a mock server).
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Sets the polling interval.
    pub fn poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Sets the maximum number of poll attempts.
    pub fn max_poll_attempts(mut self, attempts: u32) -> Self {
        self.max_poll_attempts = attempts;
        self
    }

    /// Sets the timeout for submit and poll calls.
    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Sets the timeout for the artifact download.
    pub fn download_timeout(mut self, timeout: Duration) -> Self {
        self.download_timeout = timeout;
        self
    }

    /// Builds the provider, resolving the API key.
    pub fn build(self) -> Result<RunwayProvider> {
        let api_key = self
            .api_key
            .or_else(|| std::env::var("RUNWAY_API_KEY").ok())
            .filter(|k| !k.is_empty())
            .ok_or_else(|| {
                VidGenError::Auth("RUNWAY_API_KEY not set and no API key provided".into())
            })?;

        Ok(RunwayProvider {
            client: reqwest::Client::new(),
            api_key,
            base_url: self.base_url,
            policy: PollPolicy {
                interval: self.poll_interval,
                max_attempts: self.max_poll_attempts,
            },
            request_timeout: self.request_timeout,
            download_timeout: self.download_timeout,
        })
    }
}

/// Runway ML video generation provider.
pub struct RunwayProvider {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    policy: PollPolicy,
    request_timeout: Duration,
    download_timeout: Duration,
}

impl RunwayProvider {
    /// Creates a new `RunwayProviderBuilder`.
    pub fn builder() -> RunwayProviderBuilder {
        RunwayProviderBuilder::new()
    }

    fn parse_error(
        &self,
        status: u16,
        text: &str,
        headers: &reqwest::header::HeaderMap,
    ) -> VidGenError {
        let text = sanitize_error_message(text);
        if status == 429 {
            let retry_after = parse_retry_after(headers).map(Duration::from_secs);
            return VidGenError::RateLimited { retry_after };
        }
        if status == 401 || status == 403 {
            return VidGenError::Auth(text);
        }
        if status == 400 || status == 422 {
            return VidGenError::InvalidRequest(text);
        }
        VidGenError::Api {
            status,
            message: text,
        }
    }
}

#[async_trait]
impl JobDriver for RunwayProvider {
    fn provider(&self) -> VideoProviderKind {
        VideoProviderKind::Runway
    }

    async fn submit(&self, request: &VideoGenerationRequest) -> Result<String> {
        let body = RunwayRequest::from_request(request);

        let response = self
            .client
            .post(format!("{}/generate", self.base_url))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .timeout(self.request_timeout)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let headers = response.headers().clone();
            let text = response.text().await.unwrap_or_default();
            return Err(self.parse_error(status.as_u16(), &text, &headers));
        }

        let submit_response: RunwaySubmitResponse = response.json().await?;
        if submit_response.id.is_empty() {
            return Err(VidGenError::Protocol("empty generation id".into()));
        }
        Ok(submit_response.id)
    }

    async fn poll(&self, job_id: &str) -> Result<JobPoll> {
        let response = self
            .client
            .get(format!("{}/generate/{}", self.base_url, job_id))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .timeout(self.request_timeout)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let headers = response.headers().clone();
            let text = response.text().await.unwrap_or_default();
            return Err(self.parse_error(status.as_u16(), &text, &headers));
        }

        let poll_response: RunwayPollResponse = response.json().await?;
        map_status(poll_response)
    }

    async fn download(&self, artifact_url: &str) -> Result<Vec<u8>> {
        let response = self
            .client
            .get(artifact_url)
            .timeout(self.download_timeout)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(VidGenError::Api {
                status: response.status().as_u16(),
                message: "failed to download video".into(),
            });
        }

        Ok(response.bytes().await?.to_vec())
    }
}

#[async_trait]
impl VideoProvider for RunwayProvider {
    async fn generate(&self, request: &VideoGenerationRequest) -> Result<GeneratedVideo> {
        let start = Instant::now();
        let data = lifecycle::run(self, request, &self.policy).await?;

        Ok(GeneratedVideo::new(
            data,
            "video/mp4",
            VideoSource::Provider(VideoProviderKind::Runway),
            VideoMetadata {
                model: Some(MODEL_ID.to_string()),
                prompt: Some(request.prompt.clone()),
                style: Some(request.style.to_string()),
                duration_secs: Some(request.duration_secs.min(MAX_DURATION_SECS)),
                resolution: request.resolution.map(|r| r.to_string()),
                generation_ms: Some(start.elapsed().as_millis() as u64),
                demo_mode: false,
            },
        ))
    }

    fn kind(&self) -> VideoProviderKind {
        VideoProviderKind::Runway
    }

    fn max_duration_secs(&self) -> u32 {
        MAX_DURATION_SECS
    }

    async fn test_connection(&self) -> bool {
        let result = self
            .client
            .get(format!("{}/models", self.base_url))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .timeout(Duration::from_secs(10))
            .send()
            .await;

        match result {
            Ok(response) => response.status().is_success(),
            Err(_) => false,
        }
    }
}

/// Maps Runway's status vocabulary onto the generic lifecycle.
fn map_status(response: RunwayPollResponse) -> Result<JobPoll> {
    match response.status.as_str() {
        "completed" => match response.video_url {
            Some(url) if !url.is_empty() => Ok(JobPoll::Completed { artifact_url: url }),
            _ => Err(VidGenError::Protocol(
                "completed without a video URL".into(),
            )),
        },
        "failed" => Ok(JobPoll::Failed {
            reason: response.error.unwrap_or_else(|| "Unknown error".into()),
        }),
        "pending" | "processing" => Ok(JobPoll::Pending),
        other => Err(VidGenError::Protocol(format!(
            "unrecognized Runway status: {other}"
        ))),
    }
}

// Request/Response types

#[derive(Debug, Serialize)]
struct RunwayRequest {
    prompt: String,
    duration: u32,
    style: String,
    quality: &'static str,
    aspect_ratio: &'static str,
}

impl RunwayRequest {
    fn from_request(req: &VideoGenerationRequest) -> Self {
        Self {
            prompt: req.prompt.clone(),
            duration: req.duration_secs.min(MAX_DURATION_SECS),
            style: req.style.to_string(),
            quality: "high",
            aspect_ratio: "16:9",
        }
    }
}

#[derive(Debug, Deserialize)]
struct RunwaySubmitResponse {
    #[serde(default)]
    id: String,
}

#[derive(Debug, Deserialize)]
struct RunwayPollResponse {
    status: String,
    #[serde(default)]
    video_url: Option<String>,
    #[serde(default)]
    error: Option<String>,
}
