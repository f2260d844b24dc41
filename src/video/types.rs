//! Core types for video generation.

use crate::error::{Result, VidGenError};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Video provider kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VideoProviderKind {
    /// Runway ML.
    Runway,
    /// Pika Labs.
    Pika,
    /// Stable Video Diffusion (Stability AI).
    StableVideo,
}

impl VideoProviderKind {
    /// All known provider kinds.
    pub const ALL: [VideoProviderKind; 3] = [Self::Runway, Self::Pika, Self::StableVideo];

    /// Parses a provider kind from its wire/CLI name.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "runway" => Some(Self::Runway),
            "pika" => Some(Self::Pika),
            "stable_video" | "stable-video" | "stability" => Some(Self::StableVideo),
            _ => None,
        }
    }
}

impl std::fmt::Display for VideoProviderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Runway => write!(f, "runway"),
            Self::Pika => write!(f, "pika"),
            Self::StableVideo => write!(f, "stable_video"),
        }
    }
}

/// Visual style for a generated video.
///
/// The orchestrator restricts requests to the styles configured as allowed;
/// provider mappers translate each style into the vendor's own vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VideoStyle {
    /// Photorealistic footage.
    Realistic,
    /// Animation / cartoon look.
    Animated,
    /// Film-like framing and grading.
    Cinematic,
    /// Non-representational visuals.
    Abstract,
    /// Fantasy art.
    Fantasy,
    /// Science fiction.
    SciFi,
    /// Documentary footage.
    Documentary,
}

impl VideoStyle {
    /// Parses a style from its display name (case-insensitive).
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "realistic" => Some(Self::Realistic),
            "animated" | "animation" => Some(Self::Animated),
            "cinematic" => Some(Self::Cinematic),
            "abstract" => Some(Self::Abstract),
            "fantasy" => Some(Self::Fantasy),
            "sci-fi" | "scifi" => Some(Self::SciFi),
            "documentary" => Some(Self::Documentary),
            _ => None,
        }
    }

    /// Human-readable name, as shown in UIs.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Realistic => "Realistic",
            Self::Animated => "Animated",
            Self::Cinematic => "Cinematic",
            Self::Abstract => "Abstract",
            Self::Fantasy => "Fantasy",
            Self::SciFi => "Sci-Fi",
            Self::Documentary => "Documentary",
        }
    }
}

impl std::fmt::Display for VideoStyle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Output resolution, limited to the set the vendors accept.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Resolution {
    /// 1024x576 landscape (default).
    Landscape,
    /// 576x1024 portrait.
    Portrait,
    /// 768x768 square.
    Square768,
    /// 1024x1024 square.
    Square1024,
}

impl Resolution {
    /// Parses a `WIDTHxHEIGHT` string.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "1024x576" => Some(Self::Landscape),
            "576x1024" => Some(Self::Portrait),
            "768x768" => Some(Self::Square768),
            "1024x1024" => Some(Self::Square1024),
            _ => None,
        }
    }

    /// The `WIDTHxHEIGHT` wire form.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Landscape => "1024x576",
            Self::Portrait => "576x1024",
            Self::Square768 => "768x768",
            Self::Square1024 => "1024x1024",
        }
    }

    /// Pixel dimensions.
    pub fn dimensions(&self) -> (u32, u32) {
        match self {
            Self::Landscape => (1024, 576),
            Self::Portrait => (576, 1024),
            Self::Square768 => (768, 768),
            Self::Square1024 => (1024, 1024),
        }
    }
}

impl std::fmt::Display for Resolution {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A request to generate a video. Immutable once submitted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VideoGenerationRequest {
    /// The text prompt describing the desired video.
    pub prompt: String,
    /// Desired video duration in seconds.
    pub duration_secs: u32,
    /// Visual style.
    pub style: VideoStyle,
    /// Output resolution, if the caller cares.
    pub resolution: Option<Resolution>,
}

impl VideoGenerationRequest {
    /// Creates a new request with the given prompt and library defaults
    /// (7 seconds, realistic).
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            duration_secs: 7,
            style: VideoStyle::Realistic,
            resolution: None,
        }
    }

    /// Sets the desired video duration in seconds.
    pub fn with_duration(mut self, secs: u32) -> Self {
        self.duration_secs = secs;
        self
    }

    /// Sets the visual style.
    pub fn with_style(mut self, style: VideoStyle) -> Self {
        self.style = style;
        self
    }

    /// Sets the output resolution.
    pub fn with_resolution(mut self, resolution: Resolution) -> Self {
        self.resolution = Some(resolution);
        self
    }
}

/// Where a result actually came from. Carried on every [`GeneratedVideo`]
/// so callers can always tell real provider output from fallback content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "provider")]
pub enum VideoSource {
    /// Genuine output from the named provider.
    Provider(VideoProviderKind),
    /// Placeholder content (canned sample or synthesized frames).
    Demo,
}

impl VideoSource {
    /// Returns true for fallback/placeholder content.
    pub fn is_demo(&self) -> bool {
        matches!(self, Self::Demo)
    }
}

/// Metadata about the video generation process.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VideoMetadata {
    /// Model or mode used for generation.
    pub model: Option<String>,
    /// The prompt the video was generated from.
    pub prompt: Option<String>,
    /// Requested style.
    pub style: Option<String>,
    /// Requested video duration in seconds.
    pub duration_secs: Option<u32>,
    /// Requested resolution.
    pub resolution: Option<String>,
    /// Wall-clock generation time in milliseconds.
    pub generation_ms: Option<u64>,
    /// Mirrors `source.is_demo()` for callers that only see the metadata map.
    pub demo_mode: bool,
}

/// A generated video with its data, provenance and metadata.
#[derive(Debug, Clone)]
pub struct GeneratedVideo {
    /// Raw video bytes.
    pub data: Vec<u8>,
    /// MIME type (e.g., "video/mp4").
    pub mime_type: String,
    /// Whether this is real provider output or a demo placeholder.
    pub source: VideoSource,
    /// Generation metadata.
    pub metadata: VideoMetadata,
}

impl GeneratedVideo {
    /// Creates a new generated video. `metadata.demo_mode` is forced to
    /// agree with the source.
    pub fn new(
        data: Vec<u8>,
        mime_type: impl Into<String>,
        source: VideoSource,
        mut metadata: VideoMetadata,
    ) -> Self {
        metadata.demo_mode = source.is_demo();
        Self {
            data,
            mime_type: mime_type.into(),
            source,
            metadata,
        }
    }

    /// Returns the size of the video data in bytes.
    pub fn size(&self) -> usize {
        self.data.len()
    }

    /// File extension matching the MIME type.
    pub fn extension(&self) -> &'static str {
        match self.mime_type.as_str() {
            "image/gif" => "gif",
            _ => "mp4",
        }
    }

    /// Saves the video to the specified path.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        std::fs::write(path, &self.data)?;
        Ok(())
    }

    /// Encodes the video data as base64.
    pub fn to_base64(&self) -> String {
        use base64::Engine;
        base64::engine::general_purpose::STANDARD.encode(&self.data)
    }

    /// Returns the video as a data URL.
    pub fn to_data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, self.to_base64())
    }
}

/// Validates a request against provider-independent bounds. Runs before any
/// network I/O; failures here are never retried and never fall back.
pub fn validate_request(
    request: &VideoGenerationRequest,
    config: &crate::config::Config,
) -> Result<()> {
    if request.prompt.trim().len() < 10 {
        return Err(VidGenError::InvalidRequest(
            "prompt must be at least 10 characters".into(),
        ));
    }

    if request.duration_secs < config.min_duration_secs
        || request.duration_secs > config.max_duration_secs
    {
        return Err(VidGenError::InvalidRequest(format!(
            "duration must be between {} and {} seconds",
            config.min_duration_secs, config.max_duration_secs
        )));
    }

    if !config.allowed_styles.contains(&request.style) {
        return Err(VidGenError::InvalidRequest(format!(
            "style {} is not in the allowed set",
            request.style
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    #[test]
    fn test_provider_kind_display_and_parse() {
        for kind in VideoProviderKind::ALL {
            assert_eq!(VideoProviderKind::parse(&kind.to_string()), Some(kind));
        }
        assert_eq!(
            VideoProviderKind::parse("stability"),
            Some(VideoProviderKind::StableVideo)
        );
        assert_eq!(VideoProviderKind::parse("sora"), None);
    }

    #[test]
    fn test_style_parse_roundtrip() {
        for style in [
            VideoStyle::Realistic,
            VideoStyle::Animated,
            VideoStyle::Cinematic,
            VideoStyle::Abstract,
            VideoStyle::Fantasy,
            VideoStyle::SciFi,
            VideoStyle::Documentary,
        ] {
            assert_eq!(VideoStyle::parse(style.as_str()), Some(style));
        }
        assert_eq!(VideoStyle::parse("noir"), None);
    }

    #[test]
    fn test_resolution_parse_and_dimensions() {
        let res = Resolution::parse("1024x576").unwrap();
        assert_eq!(res, Resolution::Landscape);
        assert_eq!(res.dimensions(), (1024, 576));
        assert!(Resolution::parse("640x480").is_none());
    }

    #[test]
    fn test_request_builder() {
        let req = VideoGenerationRequest::new("A storm over the ocean")
            .with_duration(8)
            .with_style(VideoStyle::Cinematic)
            .with_resolution(Resolution::Landscape);
        assert_eq!(req.duration_secs, 8);
        assert_eq!(req.style, VideoStyle::Cinematic);
        assert_eq!(req.resolution, Some(Resolution::Landscape));
    }

    #[test]
    fn test_generated_video_demo_mode_agrees_with_source() {
        let video = GeneratedVideo::new(
            vec![0; 4],
            "video/mp4",
            VideoSource::Demo,
            VideoMetadata::default(),
        );
        assert!(video.source.is_demo());
        assert!(video.metadata.demo_mode);

        let video = GeneratedVideo::new(
            vec![0; 4],
            "video/mp4",
            VideoSource::Provider(VideoProviderKind::Runway),
            VideoMetadata {
                demo_mode: true, // lies are corrected
                ..Default::default()
            },
        );
        assert!(!video.metadata.demo_mode);
    }

    #[test]
    fn test_extension_follows_mime() {
        let gif = GeneratedVideo::new(
            vec![1],
            "image/gif",
            VideoSource::Demo,
            VideoMetadata::default(),
        );
        assert_eq!(gif.extension(), "gif");

        let mp4 = GeneratedVideo::new(
            vec![1],
            "video/mp4",
            VideoSource::Demo,
            VideoMetadata::default(),
        );
        assert_eq!(mp4.extension(), "mp4");
    }

    #[test]
    fn test_data_url() {
        let video = GeneratedVideo::new(
            b"abc".to_vec(),
            "video/mp4",
            VideoSource::Demo,
            VideoMetadata::default(),
        );
        assert_eq!(video.to_data_url(), "data:video/mp4;base64,YWJj");
    }

    #[test]
    fn test_validate_rejects_short_prompt() {
        let config = Config::default();
        let req = VideoGenerationRequest::new("short");
        let err = validate_request(&req, &config).unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn test_validate_rejects_whitespace_padded_prompt() {
        let config = Config::default();
        let req = VideoGenerationRequest::new("  cat    \t\n ");
        assert!(validate_request(&req, &config).is_err());
    }

    #[test]
    fn test_validate_rejects_out_of_range_duration() {
        let config = Config::default();
        let req = VideoGenerationRequest::new("A very detailed prompt").with_duration(3);
        assert!(validate_request(&req, &config).is_err());

        let req = VideoGenerationRequest::new("A very detailed prompt").with_duration(11);
        assert!(validate_request(&req, &config).is_err());
    }

    #[test]
    fn test_validate_rejects_disallowed_style() {
        let config = Config::default();
        // Fantasy is understood by provider mappers but not in the default
        // allowed set.
        let req = VideoGenerationRequest::new("A very detailed prompt")
            .with_style(VideoStyle::Fantasy);
        assert!(validate_request(&req, &config).is_err());
    }

    #[test]
    fn test_validate_accepts_good_request() {
        let config = Config::default();
        let req = VideoGenerationRequest::new("A cute cat playing with yarn")
            .with_duration(7)
            .with_style(VideoStyle::Cinematic);
        assert!(validate_request(&req, &config).is_ok());
    }
}
