//! Process-wide configuration.
//!
//! API keys, generation bounds and directories are read from the environment
//! once via [`Config::from_env`] and then passed by reference into the
//! orchestrator and provider clients. Nothing re-reads the environment after
//! construction.

use crate::video::types::{VideoProviderKind, VideoStyle};
use std::path::PathBuf;
use std::time::Duration;

/// Static configuration for the generation pipeline.
#[derive(Debug, Clone)]
pub struct Config {
    /// Runway ML API key (`RUNWAY_API_KEY`).
    pub runway_api_key: Option<String>,
    /// Pika Labs API key (`PIKA_API_KEY`).
    pub pika_api_key: Option<String>,
    /// Stability AI API key (`STABILITY_API_KEY`, falling back to
    /// `STABLE_VIDEO_API_KEY`).
    pub stability_api_key: Option<String>,

    /// Minimum accepted video duration in seconds.
    pub min_duration_secs: u32,
    /// Maximum accepted video duration in seconds.
    pub max_duration_secs: u32,
    /// Default duration when the caller does not specify one.
    pub default_duration_secs: u32,

    /// Styles the orchestrator accepts. Provider mappers may understand more.
    pub allowed_styles: Vec<VideoStyle>,

    /// Directory for generated and demo videos (`VIDGEN_OUTPUT_DIR`).
    pub output_dir: PathBuf,
    /// Directory for scratch files (`VIDGEN_TEMP_DIR`).
    pub temp_dir: PathBuf,

    /// Substitute a demo artifact when a provider call fails. Validation
    /// errors never fall back regardless of this switch.
    pub demo_fallback: bool,

    /// Timeout applied to submit and poll HTTP calls.
    pub request_timeout: Duration,
    /// Timeout applied to artifact downloads.
    pub download_timeout: Duration,
    /// Fixed sleep between poll attempts.
    pub poll_interval: Duration,
    /// Maximum number of poll attempts before giving up.
    pub max_poll_attempts: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            runway_api_key: None,
            pika_api_key: None,
            stability_api_key: None,
            min_duration_secs: 5,
            max_duration_secs: 10,
            default_duration_secs: 7,
            allowed_styles: vec![
                VideoStyle::Realistic,
                VideoStyle::Animated,
                VideoStyle::Cinematic,
                VideoStyle::Abstract,
            ],
            output_dir: PathBuf::from("generated_videos"),
            temp_dir: std::env::temp_dir(),
            demo_fallback: true,
            request_timeout: Duration::from_secs(30),
            download_timeout: Duration::from_secs(60),
            poll_interval: Duration::from_secs(5),
            max_poll_attempts: 60,
        }
    }
}

fn env_key(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl Config {
    /// Builds a configuration from the process environment.
    pub fn from_env() -> Self {
        let mut config = Self {
            runway_api_key: env_key("RUNWAY_API_KEY"),
            pika_api_key: env_key("PIKA_API_KEY"),
            stability_api_key: env_key("STABILITY_API_KEY")
                .or_else(|| env_key("STABLE_VIDEO_API_KEY")),
            ..Self::default()
        };

        if let Some(dir) = env_key("VIDGEN_OUTPUT_DIR") {
            config.output_dir = PathBuf::from(dir);
        }
        if let Some(dir) = env_key("VIDGEN_TEMP_DIR") {
            config.temp_dir = PathBuf::from(dir);
        }

        config
    }

    /// Returns the configured key for a provider, if any.
    pub fn api_key(&self, kind: VideoProviderKind) -> Option<&str> {
        match kind {
            VideoProviderKind::Runway => self.runway_api_key.as_deref(),
            VideoProviderKind::Pika => self.pika_api_key.as_deref(),
            VideoProviderKind::StableVideo => self.stability_api_key.as_deref(),
        }
    }

    /// Returns true if the provider has a non-empty, format-valid key.
    pub fn has_valid_key(&self, kind: VideoProviderKind) -> bool {
        match self.api_key(kind) {
            Some(key) if !key.is_empty() && !key.contains(char::is_whitespace) => match kind {
                // Stability keys are issued with an sk- prefix.
                VideoProviderKind::StableVideo => key.starts_with("sk-"),
                _ => true,
            },
            _ => false,
        }
    }

    /// Demo mode is active iff no provider has a usable key. Pure function
    /// of the configuration, re-evaluated on every request.
    pub fn is_demo_mode(&self) -> bool {
        VideoProviderKind::ALL
            .iter()
            .all(|kind| !self.has_valid_key(*kind))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.min_duration_secs, 5);
        assert_eq!(config.max_duration_secs, 10);
        assert_eq!(config.default_duration_secs, 7);
        assert_eq!(config.max_poll_attempts, 60);
        assert_eq!(config.poll_interval, Duration::from_secs(5));
        assert!(config.demo_fallback);
        assert!(config.is_demo_mode());
    }

    #[test]
    fn test_demo_mode_off_with_any_valid_key() {
        let config = Config {
            runway_api_key: Some("rw-key".into()),
            ..Config::default()
        };
        assert!(!config.is_demo_mode());
        assert!(config.has_valid_key(VideoProviderKind::Runway));
        assert!(!config.has_valid_key(VideoProviderKind::Pika));
    }

    #[test]
    fn test_stability_key_format_check() {
        let config = Config {
            stability_api_key: Some("not-a-stability-key".into()),
            ..Config::default()
        };
        assert!(!config.has_valid_key(VideoProviderKind::StableVideo));
        assert!(config.is_demo_mode());

        let config = Config {
            stability_api_key: Some("sk-abc123".into()),
            ..Config::default()
        };
        assert!(config.has_valid_key(VideoProviderKind::StableVideo));
        assert!(!config.is_demo_mode());
    }

    #[test]
    fn test_whitespace_key_is_invalid() {
        let config = Config {
            pika_api_key: Some("pika key".into()),
            ..Config::default()
        };
        assert!(!config.has_valid_key(VideoProviderKind::Pika));
    }

    #[test]
    fn test_api_key_lookup() {
        let config = Config {
            runway_api_key: Some("a".into()),
            pika_api_key: Some("b".into()),
            stability_api_key: Some("c".into()),
            ..Config::default()
        };
        assert_eq!(config.api_key(VideoProviderKind::Runway), Some("a"));
        assert_eq!(config.api_key(VideoProviderKind::Pika), Some("b"));
        assert_eq!(config.api_key(VideoProviderKind::StableVideo), Some("c"));
    }
}
