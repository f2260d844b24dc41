//! Video generation orchestrator.
//!
//! Owns one client per configured provider, validates requests against
//! provider-independent bounds, and decides between real generation and the
//! demo path.

use crate::config::Config;
use crate::error::{Result, VidGenError};
use crate::storage::{DemoVideoSource, FileHandler};
use crate::video::provider::VideoProvider;
use crate::video::providers::{PikaProvider, RunwayProvider, StableVideoProvider};
use crate::video::types::{
    GeneratedVideo, VideoGenerationRequest, VideoMetadata, VideoProviderKind,
};
use std::collections::HashMap;
use std::path::PathBuf;

/// Static descriptor for a provider, for UIs and the CLI.
#[derive(Debug, Clone, Copy, serde::Serialize)]
pub struct ProviderInfo {
    /// Human-readable provider name.
    pub name: &'static str,
    /// One-line description of what the provider is good at.
    pub description: &'static str,
    /// Longest clip the provider will produce.
    pub max_duration_secs: u32,
    /// Marketing-style strengths, for provider pickers.
    pub specialties: &'static [&'static str],
}

/// Main controller that manages the provider clients.
pub struct VideoGenerator {
    config: Config,
    clients: HashMap<VideoProviderKind, Box<dyn VideoProvider>>,
    demo: DemoVideoSource,
}

impl VideoGenerator {
    /// Builds one client per provider that has a format-valid API key.
    pub fn new(config: &Config) -> Self {
        let mut clients: HashMap<VideoProviderKind, Box<dyn VideoProvider>> = HashMap::new();

        for kind in VideoProviderKind::ALL {
            if !config.has_valid_key(kind) {
                continue;
            }
            match build_client(kind, config) {
                Ok(client) => {
                    clients.insert(kind, client);
                }
                Err(e) => {
                    tracing::warn!(provider = %kind, "failed to initialize client: {e}");
                }
            }
        }

        Self {
            config: config.clone(),
            clients,
            demo: DemoVideoSource::new(config.download_timeout),
        }
    }

    /// Replaces the demo source (tests, or local-only placeholder setups).
    pub fn with_demo_source(mut self, demo: DemoVideoSource) -> Self {
        self.demo = demo;
        self
    }

    /// Replaces the client for one provider. Intended for tests that point
    /// a client at a mock server.
    pub fn with_client(mut self, kind: VideoProviderKind, client: Box<dyn VideoProvider>) -> Self {
        self.clients.insert(kind, client);
        self
    }

    /// Providers usable right now. In demo mode every kind is listed since
    /// the selection only affects labeling.
    pub fn available_providers(&self) -> Vec<VideoProviderKind> {
        if self.config.is_demo_mode() && self.clients.is_empty() {
            return VideoProviderKind::ALL.to_vec();
        }
        VideoProviderKind::ALL
            .into_iter()
            .filter(|kind| self.clients.contains_key(kind))
            .collect()
    }

    /// Static information about a provider.
    pub fn provider_info(kind: VideoProviderKind) -> ProviderInfo {
        match kind {
            VideoProviderKind::Runway => ProviderInfo {
                name: "Runway ML",
                description: "High-quality cinematic video generation",
                max_duration_secs: 10,
                specialties: &["Cinematic", "Realistic", "Motion"],
            },
            VideoProviderKind::StableVideo => ProviderInfo {
                name: "Stable Video Diffusion",
                description: "Stable and consistent video generation",
                max_duration_secs: 8,
                specialties: &["Consistent", "Stable", "Detailed"],
            },
            VideoProviderKind::Pika => ProviderInfo {
                name: "Pika Labs",
                description: "Creative and artistic video generation",
                max_duration_secs: 6,
                specialties: &["Creative", "Artistic", "Stylized"],
            },
        }
    }

    /// Probes the provider's API. False when the provider has no client or
    /// the probe fails for any reason.
    pub async fn test_connection(&self, kind: VideoProviderKind) -> bool {
        match self.clients.get(&kind) {
            Some(client) => client.test_connection().await,
            None => false,
        }
    }

    /// Generates a video with the chosen provider.
    ///
    /// Validation failures surface immediately and never reach the network.
    /// In demo mode the demo artifact is produced directly. A provider
    /// error is substituted with a demo artifact when `demo_fallback` is
    /// enabled; the substitution is always visible through
    /// [`crate::video::VideoSource`] and `metadata.demo_mode`.
    pub async fn generate(
        &self,
        request: &VideoGenerationRequest,
        kind: VideoProviderKind,
    ) -> Result<GeneratedVideo> {
        crate::video::types::validate_request(request, &self.config)?;

        if self.config.is_demo_mode() {
            tracing::info!("no provider configured, producing demo artifact");
            return self.demo.produce(request).await;
        }

        let client = self
            .clients
            .get(&kind)
            .ok_or_else(|| VidGenError::ProviderNotAvailable(kind.to_string()))?;

        match client.generate(request).await {
            Ok(video) => Ok(video),
            Err(e) if e.is_validation() => Err(e),
            Err(e) if self.config.demo_fallback => {
                tracing::warn!(provider = %kind, "generation failed, substituting demo artifact: {e}");
                self.demo.produce(request).await
            }
            Err(e) => Err(e),
        }
    }

    /// Generates a video and persists it, returning the stored path and the
    /// generation metadata. This is the call UIs sit on.
    pub async fn generate_to_file(
        &self,
        request: &VideoGenerationRequest,
        kind: VideoProviderKind,
        files: &FileHandler,
    ) -> Result<(PathBuf, VideoMetadata)> {
        let video = self.generate(request, kind).await?;
        let path = files.save_video(&video, &request.prompt)?;
        Ok((path, video.metadata))
    }
}

fn build_client(kind: VideoProviderKind, config: &Config) -> Result<Box<dyn VideoProvider>> {
    let key = config
        .api_key(kind)
        .ok_or_else(|| VidGenError::ProviderNotAvailable(kind.to_string()))?;

    let client: Box<dyn VideoProvider> = match kind {
        VideoProviderKind::Runway => Box::new(
            RunwayProvider::builder()
                .api_key(key)
                .poll_interval(config.poll_interval)
                .max_poll_attempts(config.max_poll_attempts)
                .request_timeout(config.request_timeout)
                .download_timeout(config.download_timeout)
                .build()?,
        ),
        VideoProviderKind::Pika => Box::new(
            PikaProvider::builder()
                .api_key(key)
                .poll_interval(config.poll_interval)
                .max_poll_attempts(config.max_poll_attempts)
                .request_timeout(config.request_timeout)
                .download_timeout(config.download_timeout)
                .build()?,
        ),
        VideoProviderKind::StableVideo => Box::new(
            StableVideoProvider::builder()
                .api_key(key)
                .poll_interval(config.poll_interval)
                .max_poll_attempts(config.max_poll_attempts)
                .request_timeout(config.request_timeout)
                .download_timeout(config.download_timeout)
                .build()?,
        ),
    };

    Ok(client)
}
