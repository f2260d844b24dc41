//! File persistence for generated videos.

pub mod demo;

pub use demo::{DemoVideoSource, SAMPLE_VIDEO_URLS};

use crate::config::Config;
use crate::error::{Result, VidGenError};
use crate::video::types::{GeneratedVideo, VideoSource};
use std::path::{Path, PathBuf};
use std::time::SystemTime;

/// A generated file on disk, as reported by [`FileHandler::list_videos`].
#[derive(Debug, Clone)]
pub struct StoredVideo {
    /// File name within the output directory.
    pub filename: String,
    /// Full path to the file.
    pub path: PathBuf,
    /// File size in bytes.
    pub size_bytes: u64,
    /// Last-modified time, used for newest-first ordering.
    pub modified: SystemTime,
}

/// Persists generated videos under the configured output directory.
///
/// There is no manifest; the directory listing is the only catalog.
pub struct FileHandler {
    output_dir: PathBuf,
    temp_dir: PathBuf,
}

impl FileHandler {
    /// Creates a handler, ensuring the output directory exists.
    pub fn new(config: &Config) -> Result<Self> {
        std::fs::create_dir_all(&config.output_dir)?;
        Ok(Self {
            output_dir: config.output_dir.clone(),
            temp_dir: config.temp_dir.clone(),
        })
    }

    /// The directory generated files land in.
    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Writes the video to `<timestamp>_<provider>_<prompt-slug>.<ext>` and
    /// verifies the file exists with a non-zero size.
    pub fn save_video(&self, video: &GeneratedVideo, prompt: &str) -> Result<PathBuf> {
        let timestamp = chrono::Local::now().format("%Y%m%d_%H%M%S");
        let provider = match video.source {
            VideoSource::Provider(kind) => kind.to_string(),
            VideoSource::Demo => "demo".to_string(),
        };
        let filename = format!(
            "{}_{}_{}.{}",
            timestamp,
            provider,
            slugify(prompt),
            video.extension()
        );
        let path = self.output_dir.join(filename);

        video.save(&path)?;

        let meta = std::fs::metadata(&path)?;
        if meta.len() == 0 {
            return Err(VidGenError::Io(std::io::Error::new(
                std::io::ErrorKind::WriteZero,
                format!("saved file is empty: {}", path.display()),
            )));
        }

        tracing::debug!(path = %path.display(), bytes = meta.len(), "saved video");
        Ok(path)
    }

    /// Returns a fresh scratch file path under the temp directory.
    pub fn temp_path(&self, extension: &str) -> PathBuf {
        let nonce: u32 = rand::random();
        self.temp_dir
            .join(format!("vidgen-{:08x}.{}", nonce, extension))
    }

    /// Lists generated videos, newest first.
    pub fn list_videos(&self) -> Result<Vec<StoredVideo>> {
        let mut videos = Vec::new();

        for entry in std::fs::read_dir(&self.output_dir)? {
            let entry = entry?;
            let path = entry.path();
            let is_media = path
                .extension()
                .and_then(|e| e.to_str())
                .map(|e| e == "mp4" || e == "gif")
                .unwrap_or(false);
            if !is_media {
                continue;
            }

            let meta = entry.metadata()?;
            videos.push(StoredVideo {
                filename: entry.file_name().to_string_lossy().into_owned(),
                path,
                size_bytes: meta.len(),
                modified: meta.modified()?,
            });
        }

        videos.sort_by(|a, b| b.modified.cmp(&a.modified));
        Ok(videos)
    }

    /// Best-effort removal of stale scratch files. Errors on individual
    /// files are ignored.
    pub fn cleanup_temp(&self) {
        let Ok(entries) = std::fs::read_dir(&self.temp_dir) else {
            return;
        };
        for entry in entries.flatten() {
            let name = entry.file_name();
            let name = name.to_string_lossy();
            if name.starts_with("vidgen-") && (name.ends_with(".mp4") || name.ends_with(".gif")) {
                let _ = std::fs::remove_file(entry.path());
            }
        }
    }
}

/// Derives a filesystem-safe slug from the first 30 characters of a prompt:
/// alphanumerics, spaces, `-` and `_` survive, spaces become underscores.
fn slugify(prompt: &str) -> String {
    let kept: String = prompt
        .chars()
        .take(30)
        .filter(|c| c.is_alphanumeric() || *c == ' ' || *c == '-' || *c == '_')
        .collect();
    let slug = kept.trim().replace(' ', "_");
    if slug.is_empty() {
        "video".to_string()
    } else {
        slug
    }
}
