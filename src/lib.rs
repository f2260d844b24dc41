#![warn(missing_docs)]
//! VidGen - unified text-to-video generation over third-party AI APIs.
//!
//! This crate provides a single interface for generating short videos from
//! text prompts using different hosted providers (Runway ML, Pika Labs,
//! Stable Video Diffusion). Every provider follows the same lifecycle:
//! submit a job, poll until it reaches a terminal state, download the
//! result. When no provider is configured the pipeline produces clearly
//! marked demo placeholders instead.
//!
//! # Quick Start
//!
//! ```no_run
//! use vidgen::{Config, FileHandler, VideoGenerationRequest, VideoGenerator};
//! use vidgen::video::{VideoProviderKind, VideoStyle};
//!
//! #[tokio::main]
//! async fn main() -> vidgen::Result<()> {
//!     let config = Config::from_env();
//!     let generator = VideoGenerator::new(&config);
//!     let files = FileHandler::new(&config)?;
//!
//!     let request = VideoGenerationRequest::new("A cute cat playing with yarn")
//!         .with_duration(7)
//!         .with_style(VideoStyle::Cinematic);
//!
//!     let (path, metadata) = generator
//!         .generate_to_file(&request, VideoProviderKind::Runway, &files)
//!         .await?;
//!     println!("saved {} (demo: {})", path.display(), metadata.demo_mode);
//!     Ok(())
//! }
//! ```
//!
//! # Telling real output from demo output
//!
//! Every [`video::GeneratedVideo`] carries a [`video::VideoSource`]: either
//! `Provider(kind)` for genuine vendor output or `Demo` for placeholder
//! content. The `metadata.demo_mode` flag mirrors it; the source field is
//! the authoritative one.

mod config;
mod error;
mod generator;

pub mod storage;
pub mod video;

pub use config::Config;
pub use error::{Result, VidGenError};
pub use generator::{ProviderInfo, VideoGenerator};
pub use storage::{DemoVideoSource, FileHandler, StoredVideo};
pub use video::{
    GeneratedVideo, Resolution, VideoGenerationRequest, VideoMetadata, VideoProviderKind,
    VideoSource, VideoStyle,
};
pub use video::providers::{
    PikaProvider, PikaProviderBuilder, RunwayProvider, RunwayProviderBuilder, StableVideoProvider,
    StableVideoProviderBuilder,
};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::config::Config;
    pub use crate::error::{Result, VidGenError};
    pub use crate::generator::VideoGenerator;
    pub use crate::storage::FileHandler;
    pub use crate::video::{
        GeneratedVideo, VideoGenerationRequest, VideoProvider, VideoProviderKind, VideoSource,
        VideoStyle,
    };
}
