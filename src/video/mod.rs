//! Video generation: shared types, the job lifecycle and provider clients.

pub mod lifecycle;
pub mod provider;
pub mod providers;
pub mod types;

pub use lifecycle::{JobDriver, JobPoll, PollPolicy, MIN_VIDEO_BYTES};
pub use provider::VideoProvider;
pub use types::{
    GeneratedVideo, Resolution, VideoGenerationRequest, VideoMetadata, VideoProviderKind,
    VideoSource, VideoStyle,
};
