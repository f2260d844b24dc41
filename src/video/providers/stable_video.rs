//! Stable Video Diffusion (Stability AI) video generation provider.

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

const DEFAULT_BASE_URL: &str = "https://api.stability.ai/v2alpha";
const MAX_DURATION_SECS: u32 = 8;
const MODEL_ID: &str = "svd-xt-1-1";

/// Builder for StableVideoProvider.
#[derive(Debug, Clone)]
pub struct StableVideoProviderBuilder {
    api_key: Option<String>,
    base_url: String,
    poll_interval: Duration,
    max_poll_attempts: u32,
    request_timeout: Duration,
    download_timeout: Duration,
}

impl Default for StableVideoProviderBuilder {
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

impl StableVideoProviderBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the API key. Falls back to `STABILITY_API_KEY` env var.
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
    pub fn build(self) -> Result<StableVideoProvider> {
        let api_key = self
            .api_key
            .or_else(|| std::env::var("STABILITY_API_KEY").ok())
            .filter(|k| !k.is_empty())
            .ok_or_else(|| {
                VidGenError::Auth("STABILITY_API_KEY not set and no API key provided".into())
            })?;

        Ok(StableVideoProvider {
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

/// Stable Video Diffusion provider.
pub struct StableVideoProvider {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    policy: PollPolicy,
    request_timeout: Duration,
    download_timeout: Duration,
}

impl StableVideoProvider {
    /// Creates a new `StableVideoProviderBuilder`.
    pub fn builder() -> StableVideoProviderBuilder {
        StableVideoProviderBuilder::new()
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
impl JobDriver for StableVideoProvider {
    fn provider(&self) -> VideoProviderKind {
        VideoProviderKind::StableVideo
    }

    async fn submit(&self, request: &VideoGenerationRequest) -> Result<String> {
        let body = StableVideoRequest::from_request(request);

        let response = self
            .client
            .post(format!("{}/generation/video", self.base_url))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .header("Accept", "application/json")
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

        let submit_response: StableVideoSubmitResponse = response.json().await?;
        if submit_response.id.is_empty() {
            return Err(VidGenError::Protocol("empty generation id".into()));
        }
        Ok(submit_response.id)
    }

    async fn poll(&self, job_id: &str) -> Result<JobPoll> {
        let response = self
            .client
            .get(format!("{}/generation/video/{}", self.base_url, job_id))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Accept", "application/json")
            .timeout(self.request_timeout)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let headers = response.headers().clone();
            let text = response.text().await.unwrap_or_default();
            return Err(self.parse_error(status.as_u16(), &text, &headers));
        }

        let poll_response: StableVideoPollResponse = response.json().await?;
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
impl VideoProvider for StableVideoProvider {
    async fn generate(&self, request: &VideoGenerationRequest) -> Result<GeneratedVideo> {
        let start = Instant::now();
        let data = lifecycle::run(self, request, &self.policy).await?;

        Ok(GeneratedVideo::new(
            data,
            "video/mp4",
            VideoSource::Provider(VideoProviderKind::StableVideo),
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
        VideoProviderKind::StableVideo
    }

    fn max_duration_secs(&self) -> u32 {
        MAX_DURATION_SECS
    }

    async fn test_connection(&self) -> bool {
        let result = self
            .client
            .get(format!("{}/user/account", self.base_url))
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

/// Maps Stability's status vocabulary onto the generic lifecycle. Note the
/// vendor says `complete`, not `completed`, and reports failures under
/// `failure_reason`.
fn map_status(response: StableVideoPollResponse) -> Result<JobPoll> {
    match response.status.as_str() {
        "complete" => {
            let url = response
                .artifacts
                .into_iter()
                .next()
                .and_then(|a| a.url)
                .filter(|u| !u.is_empty());
            match url {
                Some(artifact_url) => Ok(JobPoll::Completed { artifact_url }),
                None => Err(VidGenError::Protocol(
                    "complete without an artifact URL".into(),
                )),
            }
        }
        "failed" => Ok(JobPoll::Failed {
            reason: response
                .failure_reason
                .unwrap_or_else(|| "Unknown error".into()),
        }),
        "in-progress" | "queued" => Ok(JobPoll::Pending),
        other => Err(VidGenError::Protocol(format!(
            "unrecognized Stable Video status: {other}"
        ))),
    }
}

/// Appends style-specific guidance to the prompt. Stability responds better
/// to descriptive keywords than to the bare style preset alone.
fn enhance_prompt(prompt: &str, style: VideoStyle) -> String {
    match style_guidance(style) {
        Some(guidance) => format!("{prompt}, {guidance}"),
        None => prompt.to_string(),
    }
}

fn style_guidance(style: VideoStyle) -> Option<&'static str> {
    match style {
        VideoStyle::Realistic => {
            Some("photorealistic, high detail, natural lighting, real world, 4k quality")
        }
        VideoStyle::Cinematic => Some(
            "cinematic composition, dramatic lighting, film quality, professional camera work, movie scene",
        ),
        VideoStyle::Animated => {
            Some("animation style, stylized, smooth motion, vibrant colors, cartoon-like")
        }
        VideoStyle::Documentary => {
            Some("documentary style, natural, authentic, observational, real life")
        }
        VideoStyle::Fantasy => {
            Some("fantasy elements, magical, ethereal, dreamlike quality, mystical")
        }
        VideoStyle::SciFi => {
            Some("futuristic, technological, sci-fi elements, advanced visuals, cyberpunk")
        }
        VideoStyle::Abstract => None,
    }
}

/// Translates a generic style into a Stability style preset.
fn map_style_preset(style: VideoStyle) -> &'static str {
    match style {
        VideoStyle::Cinematic => "cinematic",
        VideoStyle::Realistic => "photographic",
        VideoStyle::Abstract => "artistic",
        VideoStyle::Fantasy => "fantasy-art",
        VideoStyle::SciFi => "digital-art",
        VideoStyle::Animated => "anime",
        VideoStyle::Documentary => "photographic",
    }
}

// Request/Response types

#[derive(Debug, Serialize)]
struct StableVideoRequest {
    prompt: String,
    aspect_ratio: &'static str,
    duration: u32,
    cfg_scale: f32,
    motion_bucket_id: u32,
    style_preset: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    resolution: Option<String>,
}

impl StableVideoRequest {
    fn from_request(req: &VideoGenerationRequest) -> Self {
        Self {
            prompt: enhance_prompt(&req.prompt, req.style),
            aspect_ratio: "16:9",
            duration: req.duration_secs.min(MAX_DURATION_SECS),
            cfg_scale: 7.5,
            motion_bucket_id: 127,
            style_preset: map_style_preset(req.style),
            resolution: req.resolution.map(|r| r.to_string()),
        }
    }
}

#[derive(Debug, Deserialize)]
struct StableVideoSubmitResponse {
    #[serde(default)]
    id: String,
}

#[derive(Debug, Deserialize)]
struct StableVideoPollResponse {
    status: String,
    #[serde(default)]
    artifacts: Vec<StableVideoArtifact>,
    #[serde(default)]
    failure_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct StableVideoArtifact {
    #[serde(default)]
    url: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_with_explicit_key() {
        let provider = StableVideoProviderBuilder::new().api_key("sk-test").build();
        assert!(provider.is_ok());
    }

    #[test]
    fn test_request_clamps_duration_to_eight_seconds() {
        let req = VideoGenerationRequest::new("A mountain sunrise").with_duration(10);
        let body = StableVideoRequest::from_request(&req);
        assert_eq!(body.duration, 8);
    }

    #[test]
    fn test_request_fixed_fields() {
        let req = VideoGenerationRequest::new("A mountain sunrise");
        let body = StableVideoRequest::from_request(&req);
        assert_eq!(body.cfg_scale, 7.5);
        assert_eq!(body.motion_bucket_id, 127);
        assert_eq!(body.aspect_ratio, "16:9");
    }

    #[test]
    fn test_submit_prompt_carries_style_guidance() {
        let req = VideoGenerationRequest::new("A mountain sunrise")
            .with_style(VideoStyle::Cinematic);
        let body = StableVideoRequest::from_request(&req);
        assert_eq!(
            body.prompt,
            "A mountain sunrise, cinematic composition, dramatic lighting, \
             film quality, professional camera work, movie scene"
        );
    }

    #[test]
    fn test_abstract_prompt_is_not_enhanced() {
        let req =
            VideoGenerationRequest::new("A mountain sunrise").with_style(VideoStyle::Abstract);
        let body = StableVideoRequest::from_request(&req);
        assert_eq!(body.prompt, "A mountain sunrise");
    }

    #[test]
    fn test_style_preset_mapping() {
        assert_eq!(map_style_preset(VideoStyle::Realistic), "photographic");
        assert_eq!(map_style_preset(VideoStyle::Animated), "anime");
        assert_eq!(map_style_preset(VideoStyle::Fantasy), "fantasy-art");
        assert_eq!(map_style_preset(VideoStyle::Documentary), "photographic");
    }

    #[test]
    fn test_map_status_complete_takes_first_artifact() {
        let poll = map_status(StableVideoPollResponse {
            status: "complete".into(),
            artifacts: vec![
                StableVideoArtifact {
                    url: Some("https://cdn.stability.example/a.mp4".into()),
                },
                StableVideoArtifact {
                    url: Some("https://cdn.stability.example/b.mp4".into()),
                },
            ],
            failure_reason: None,
        })
        .unwrap();
        assert_eq!(
            poll,
            JobPoll::Completed {
                artifact_url: "https://cdn.stability.example/a.mp4".into()
            }
        );
    }

    #[test]
    fn test_map_status_complete_without_artifacts_is_protocol_error() {
        let err = map_status(StableVideoPollResponse {
            status: "complete".into(),
            artifacts: vec![],
            failure_reason: None,
        })
        .unwrap_err();
        assert!(matches!(err, VidGenError::Protocol(_)));
    }

    #[test]
    fn test_map_status_failed_uses_failure_reason() {
        let poll = map_status(StableVideoPollResponse {
            status: "failed".into(),
            artifacts: vec![],
            failure_reason: Some("seed rejected".into()),
        })
        .unwrap();
        assert_eq!(
            poll,
            JobPoll::Failed {
                reason: "seed rejected".into()
            }
        );
    }

    #[test]
    fn test_map_status_pending_vocabulary() {
        for status in ["in-progress", "queued"] {
            let poll = map_status(StableVideoPollResponse {
                status: status.into(),
                artifacts: vec![],
                failure_reason: None,
            })
            .unwrap();
            assert_eq!(poll, JobPoll::Pending);
        }
    }

    #[test]
    fn test_map_status_unrecognized_is_protocol_error() {
        let err = map_status(StableVideoPollResponse {
            // The other vendors' spelling is not accepted here.
            status: "completed".into(),
            artifacts: vec![],
            failure_reason: None,
        })
        .unwrap_err();
        assert!(matches!(err, VidGenError::Protocol(_)));
    }

    #[test]
    fn test_poll_response_deserialization() {
        let json = r#"{"status": "complete", "artifacts": [{"url": "https://x/v.mp4"}]}"#;
        let resp: StableVideoPollResponse = serde_json::from_str(json).unwrap();
        assert_eq!(resp.status, "complete");
        assert_eq!(resp.artifacts.len(), 1);
    }

    #[test]
    fn test_request_serialization_skips_missing_resolution() {
        let req = VideoGenerationRequest::new("A mountain sunrise");
        let body = StableVideoRequest::from_request(&req);
        let json = serde_json::to_value(&body).unwrap();
        assert!(json.get("resolution").is_none());
        assert_eq!(json["style_preset"], "photographic");
    }
}
