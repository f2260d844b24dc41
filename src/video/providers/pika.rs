//! Pika Labs video generation provider.

use crate::error::{parse_retry_after, sanitize_error_message, Result, VidGenError};
use crate::video::lifecycle::{self, JobDriver, JobPoll, PollPolicy};
use crate::video::provider::VideoProvider;
use crate::video::types::{
    GeneratedVideo, VideoGenerationRequest, VideoMetadata, VideoProviderKind, VideoSource,
    VideoStyle,
};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

const DEFAULT_BASE_URL: &str = "https://api.pika.art/v1";
// Pika renders at most 6 seconds; longer requests are clamped.
const MAX_DURATION_SECS: u32 = 6;
const MODEL_ID: &str = "pika-1.0";

/// Builder for PikaProvider.
#[derive(Debug, Clone)]
pub struct PikaProviderBuilder {
    api_key: Option<String>,
    base_url: String,
    poll_interval: Duration,
    max_poll_attempts: u32,
    request_timeout: Duration,
    download_timeout: Duration,
}

impl Default for PikaProviderBuilder {
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

impl PikaProviderBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the API key. Falls back to `PIKA_API_KEY` env var.
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
    pub fn build(self) -> Result<PikaProvider> {
        let api_key = self
            .api_key
            .or_else(|| std::env::var("PIKA_API_KEY").ok())
            .filter(|k| !k.is_empty())
            .ok_or_else(|| {
                VidGenError::Auth("PIKA_API_KEY not set and no API key provided".into())
            })?;

        Ok(PikaProvider {
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

/// Pika Labs video generation provider.
pub struct PikaProvider {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    policy: PollPolicy,
    request_timeout: Duration,
    download_timeout: Duration,
}

impl PikaProvider {
    /// Creates a new `PikaProviderBuilder`.
    pub fn builder() -> PikaProviderBuilder {
        PikaProviderBuilder::new()
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
impl JobDriver for PikaProvider {
    fn provider(&self) -> VideoProviderKind {
        VideoProviderKind::Pika
    }

    async fn submit(&self, request: &VideoGenerationRequest) -> Result<String> {
        let body = PikaRequest::from_request(request);

        let response = self
            .client
            .post(format!("{}/videos/generate", self.base_url))
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

        let submit_response: PikaSubmitResponse = response.json().await?;
        if submit_response.id.is_empty() {
            return Err(VidGenError::Protocol("empty generation id".into()));
        }
        Ok(submit_response.id)
    }

    async fn poll(&self, job_id: &str) -> Result<JobPoll> {
        let response = self
            .client
            .get(format!("{}/videos/{}", self.base_url, job_id))
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

        let poll_response: PikaPollResponse = response.json().await?;
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
impl VideoProvider for PikaProvider {
    async fn generate(&self, request: &VideoGenerationRequest) -> Result<GeneratedVideo> {
        let start = Instant::now();
        let data = lifecycle::run(self, request, &self.policy).await?;

        Ok(GeneratedVideo::new(
            data,
            "video/mp4",
            VideoSource::Provider(VideoProviderKind::Pika),
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
        VideoProviderKind::Pika
    }

    fn max_duration_secs(&self) -> u32 {
        MAX_DURATION_SECS
    }

    async fn test_connection(&self) -> bool {
        let result = self
            .client
            .get(format!("{}/user/profile", self.base_url))
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

/// Maps Pika's status vocabulary onto the generic lifecycle.
fn map_status(response: PikaPollResponse) -> Result<JobPoll> {
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
        "pending" | "processing" | "queued" => Ok(JobPoll::Pending),
        other => Err(VidGenError::Protocol(format!(
            "unrecognized Pika status: {other}"
        ))),
    }
}

/// Translates a generic style into Pika's vocabulary.
fn map_style(style: VideoStyle) -> &'static str {
    match style {
        VideoStyle::Cinematic => "cinematic",
        VideoStyle::Realistic => "realistic",
        VideoStyle::Abstract => "abstract",
        VideoStyle::Fantasy => "fantasy",
        VideoStyle::SciFi => "futuristic",
        VideoStyle::Animated => "cartoon",
        VideoStyle::Documentary => "realistic",
    }
}

// Request/Response types

#[derive(Debug, Serialize)]
struct PikaRequest {
    prompt: String,
    duration: u32,
    aspect_ratio: &'static str,
    frame_rate: u32,
    style: &'static str,
    motion: &'static str,
    guidance_scale: f32,
}

impl PikaRequest {
    fn from_request(req: &VideoGenerationRequest) -> Self {
        Self {
            prompt: req.prompt.clone(),
            duration: req.duration_secs.min(MAX_DURATION_SECS),
            aspect_ratio: "16:9",
            frame_rate: 24,
            style: map_style(req.style),
            motion: "medium",
            guidance_scale: 7.5,
        }
    }
}

#[derive(Debug, Deserialize)]
struct PikaSubmitResponse {
    #[serde(default)]
    id: String,
}

#[derive(Debug, Deserialize)]
struct PikaPollResponse {
    status: String,
    #[serde(default)]
    video_url: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_with_explicit_key() {
        let provider = PikaProviderBuilder::new().api_key("pika-test").build();
        assert!(provider.is_ok());
    }

    #[test]
    fn test_request_clamps_duration_to_six_seconds() {
        let req = VideoGenerationRequest::new("A dancing robot").with_duration(10);
        let body = PikaRequest::from_request(&req);
        assert_eq!(body.duration, 6);

        let req = VideoGenerationRequest::new("A dancing robot").with_duration(5);
        let body = PikaRequest::from_request(&req);
        assert_eq!(body.duration, 5);
    }

    #[test]
    fn test_request_fixed_fields() {
        let req = VideoGenerationRequest::new("A dancing robot");
        let body = PikaRequest::from_request(&req);
        assert_eq!(body.aspect_ratio, "16:9");
        assert_eq!(body.frame_rate, 24);
        assert_eq!(body.motion, "medium");
        assert_eq!(body.guidance_scale, 7.5);
    }

    #[test]
    fn test_style_mapping() {
        assert_eq!(map_style(VideoStyle::Cinematic), "cinematic");
        assert_eq!(map_style(VideoStyle::Animated), "cartoon");
        assert_eq!(map_style(VideoStyle::SciFi), "futuristic");
        assert_eq!(map_style(VideoStyle::Documentary), "realistic");
    }

    #[test]
    fn test_map_status_queued_is_pending() {
        let poll = map_status(PikaPollResponse {
            status: "queued".into(),
            video_url: None,
            error: None,
        })
        .unwrap();
        assert_eq!(poll, JobPoll::Pending);
    }

    #[test]
    fn test_map_status_completed_requires_url() {
        let err = map_status(PikaPollResponse {
            status: "completed".into(),
            video_url: Some(String::new()),
            error: None,
        })
        .unwrap_err();
        assert!(matches!(err, VidGenError::Protocol(_)));
    }

    #[test]
    fn test_map_status_unrecognized_is_protocol_error() {
        let err = map_status(PikaPollResponse {
            status: "rendering".into(),
            video_url: None,
            error: None,
        })
        .unwrap_err();
        assert!(matches!(err, VidGenError::Protocol(_)));
    }

    #[test]
    fn test_request_serialization() {
        let req = VideoGenerationRequest::new("A dancing robot")
            .with_duration(9)
            .with_style(VideoStyle::Animated);
        let body = PikaRequest::from_request(&req);
        let json = serde_json::to_value(&body).unwrap();

        assert_eq!(json["duration"], 6);
        assert_eq!(json["style"], "cartoon");
        assert_eq!(json["frame_rate"], 24);
    }

    #[test]
    fn test_poll_response_deserialization() {
        let json = r#"{"status": "failed", "error": "prompt rejected"}"#;
        let resp: PikaPollResponse = serde_json::from_str(json).unwrap();
        assert_eq!(resp.status, "failed");
        assert_eq!(resp.error.as_deref(), Some("prompt rejected"));
    }
}
