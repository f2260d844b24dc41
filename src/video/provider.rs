//! Video provider trait.

use crate::error::Result;
use crate::video::types::{GeneratedVideo, VideoGenerationRequest, VideoProviderKind};
use async_trait::async_trait;

/// Trait for video generation providers.
#[async_trait]
pub trait VideoProvider: Send + Sync {
    /// Generates a video from the given request, blocking until the job
    /// reaches a terminal state. No partial results, no cancellation.
    async fn generate(&self, request: &VideoGenerationRequest) -> Result<GeneratedVideo>;

    /// Returns the kind of this provider.
    fn kind(&self) -> VideoProviderKind;

    /// Returns the name of this provider for display.
    fn name(&self) -> &str {
        match self.kind() {
            VideoProviderKind::Runway => "Runway ML",
            VideoProviderKind::Pika => "Pika Labs",
            VideoProviderKind::StableVideo => "Stable Video Diffusion",
        }
    }

    /// Longest video this provider will produce; longer requests are
    /// silently clamped in the wire request.
    fn max_duration_secs(&self) -> u32;

    /// Lightweight authenticated connectivity probe. Returns false on any
    /// error; never panics, never propagates.
    async fn test_connection(&self) -> bool;
}
