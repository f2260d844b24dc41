//! Demo/placeholder video production.
//!
//! When no provider is usable (or a provider call failed and fallback is
//! enabled) the pipeline still returns something watchable: either a canned
//! public sample video, or a locally synthesized animated placeholder with a
//! per-style gradient and the prompt rendered on top.

use crate::error::{Result, VidGenError};
use crate::video::lifecycle::MIN_VIDEO_BYTES;
use crate::video::types::{
    GeneratedVideo, VideoGenerationRequest, VideoMetadata, VideoSource, VideoStyle,
};
use image::codecs::gif::{GifEncoder, Repeat};
use image::{Delay, Frame, Rgba, RgbaImage};
use rand::seq::SliceRandom;
use std::time::{Duration, Instant};

/// Publicly hosted sample videos used as canned demo content.
pub const SAMPLE_VIDEO_URLS: [&str; 5] = [
    "https://commondatastorage.googleapis.com/gtv-videos-bucket/sample/BigBuckBunny.mp4",
    "https://commondatastorage.googleapis.com/gtv-videos-bucket/sample/ElephantsDream.mp4",
    "https://commondatastorage.googleapis.com/gtv-videos-bucket/sample/ForBiggerBlazes.mp4",
    "https://commondatastorage.googleapis.com/gtv-videos-bucket/sample/ForBiggerEscapes.mp4",
    "https://commondatastorage.googleapis.com/gtv-videos-bucket/sample/Sintel.mp4",
];

const FRAME_WIDTH: u32 = 320;
const FRAME_HEIGHT: u32 = 180;
const FPS: u32 = 8;
const MAX_FRAMES: u32 = 24;

/// Produces demo artifacts: canned sample first, synthesized placeholder as
/// the last resort.
pub struct DemoVideoSource {
    client: reqwest::Client,
    sample_urls: Vec<String>,
    download_timeout: Duration,
}

impl DemoVideoSource {
    /// Creates a source with the default canned sample set.
    pub fn new(download_timeout: Duration) -> Self {
        Self {
            client: reqwest::Client::new(),
            sample_urls: SAMPLE_VIDEO_URLS.iter().map(|s| s.to_string()).collect(),
            download_timeout,
        }
    }

    /// Replaces the sample URL set. An empty set skips the download and
    /// always synthesizes locally.
    pub fn with_sample_urls(mut self, urls: Vec<String>) -> Self {
        self.sample_urls = urls;
        self
    }

    /// Produces a demo artifact for the request. The sample download is
    /// best-effort; any error or undersized payload falls through to local
    /// synthesis.
    pub async fn produce(&self, request: &VideoGenerationRequest) -> Result<GeneratedVideo> {
        let start = Instant::now();

        if let Some(url) = self.sample_urls.choose(&mut rand::thread_rng()) {
            match self.fetch_sample(url).await {
                Ok(data) => {
                    tracing::debug!(url = %url, bytes = data.len(), "using canned demo sample");
                    return Ok(GeneratedVideo::new(
                        data,
                        "video/mp4",
                        VideoSource::Demo,
                        demo_metadata(request, "demo-sample", start.elapsed().as_millis() as u64),
                    ));
                }
                Err(e) => {
                    tracing::debug!("demo sample download failed, synthesizing locally: {e}");
                }
            }
        }

        let mut video = synthesize(request)?;
        video.metadata.generation_ms = Some(start.elapsed().as_millis() as u64);
        Ok(video)
    }

    async fn fetch_sample(&self, url: &str) -> Result<Vec<u8>> {
        let response = self
            .client
            .get(url)
            .timeout(self.download_timeout)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(VidGenError::Api {
                status: response.status().as_u16(),
                message: "failed to download demo sample".into(),
            });
        }

        let data = response.bytes().await?.to_vec();
        if data.len() < MIN_VIDEO_BYTES {
            return Err(VidGenError::UndersizedPayload {
                got: data.len(),
                min: MIN_VIDEO_BYTES,
            });
        }
        Ok(data)
    }
}

fn demo_metadata(
    request: &VideoGenerationRequest,
    model: &str,
    generation_ms: u64,
) -> VideoMetadata {
    VideoMetadata {
        model: Some(model.to_string()),
        prompt: Some(request.prompt.clone()),
        style: Some(request.style.to_string()),
        duration_secs: Some(request.duration_secs),
        resolution: request.resolution.map(|r| r.to_string()),
        generation_ms: Some(generation_ms),
        demo_mode: true,
    }
}

/// Renders an animated placeholder: a scrolling two-color gradient keyed by
/// style, the prompt along the top and a DEMO watermark in the middle,
/// encoded as a looping GIF.
pub fn synthesize(request: &VideoGenerationRequest) -> Result<GeneratedVideo> {
    let total_frames = (request.duration_secs * FPS).clamp(FPS, MAX_FRAMES);
    let (from, to) = style_colors(request.style);

    let mut buf = Vec::new();
    {
        let mut encoder = GifEncoder::new(&mut buf);
        encoder
            .set_repeat(Repeat::Infinite)
            .map_err(|e| VidGenError::Encode(e.to_string()))?;

        for frame_num in 0..total_frames {
            let progress = frame_num as f32 / total_frames as f32;
            let mut frame = gradient_frame(FRAME_WIDTH, FRAME_HEIGHT, from, to, progress);
            overlay(&mut frame, &request.prompt);

            let delay = Delay::from_numer_denom_ms(1000, FPS);
            encoder
                .encode_frame(Frame::from_parts(frame, 0, 0, delay))
                .map_err(|e| VidGenError::Encode(e.to_string()))?;
        }
    }

    Ok(GeneratedVideo::new(
        buf,
        "image/gif",
        VideoSource::Demo,
        demo_metadata(request, "demo-placeholder", 0),
    ))
}

/// Two-color gradient scheme per style, dark to light.
fn style_colors(style: VideoStyle) -> ([u8; 3], [u8; 3]) {
    match style {
        VideoStyle::Cinematic => ([20, 30, 60], [80, 120, 200]),
        VideoStyle::Realistic => ([40, 60, 40], [120, 150, 120]),
        VideoStyle::Fantasy => ([40, 20, 60], [160, 100, 200]),
        VideoStyle::SciFi => ([10, 30, 50], [50, 150, 255]),
        VideoStyle::Animated => ([80, 40, 20], [255, 200, 100]),
        VideoStyle::Abstract => ([30, 50, 30], [150, 200, 150]),
        VideoStyle::Documentary => ([50, 50, 50], [150, 150, 150]),
    }
}

fn gradient_frame(width: u32, height: u32, from: [u8; 3], to: [u8; 3], progress: f32) -> RgbaImage {
    RgbaImage::from_fn(width, height, |_, y| {
        let blend = (y as f32 / height as f32 + progress * 0.5) % 1.0;
        let mix = |a: u8, b: u8| (a as f32 * (1.0 - blend) + b as f32 * blend) as u8;
        Rgba([mix(from[0], to[0]), mix(from[1], to[1]), mix(from[2], to[2]), 255])
    })
}

fn overlay(frame: &mut RgbaImage, prompt: &str) {
    let truncated: String = prompt.chars().take(24).collect();
    draw_text(frame, &truncated, 8, 8, 2);

    let demo = "DEMO";
    let demo_width = demo.len() as u32 * 6 * 4;
    let x = (frame.width().saturating_sub(demo_width)) / 2;
    let y = frame.height() / 2 - 14;
    draw_text(frame, demo, x as i32, y as i32, 4);
}

/// Renders ASCII text with the embedded 5x7 font at the given pixel scale.
fn draw_text(frame: &mut RgbaImage, text: &str, x: i32, y: i32, scale: u32) {
    let mut cursor = x;
    for ch in text.chars() {
        let glyph = glyph_for(ch);
        for (row, bits) in glyph.iter().enumerate() {
            for col in 0..5u32 {
                if bits & (0x10 >> col) == 0 {
                    continue;
                }
                for dy in 0..scale {
                    for dx in 0..scale {
                        let px = cursor + (col * scale + dx) as i32;
                        let py = y + (row as u32 * scale + dy) as i32;
                        if px >= 0
                            && py >= 0
                            && (px as u32) < frame.width()
                            && (py as u32) < frame.height()
                        {
                            frame.put_pixel(px as u32, py as u32, Rgba([255, 255, 255, 255]));
                        }
                    }
                }
            }
        }
        cursor += (6 * scale) as i32;
    }
}

/// 5x7 bitmap glyphs; rows are 5-bit masks, MSB on the left. Lowercase maps
/// to uppercase, anything else renders as a hollow box.
fn glyph_for(ch: char) -> [u8; 7] {
    let ch = ch.to_ascii_uppercase();
    match ch {
        ' ' => [0; 7],
        'A' => [0x0E, 0x11, 0x11, 0x1F, 0x11, 0x11, 0x11],
        'B' => [0x1E, 0x11, 0x11, 0x1E, 0x11, 0x11, 0x1E],
        'C' => [0x0E, 0x11, 0x10, 0x10, 0x10, 0x11, 0x0E],
        'D' => [0x1E, 0x11, 0x11, 0x11, 0x11, 0x11, 0x1E],
        'E' => [0x1F, 0x10, 0x10, 0x1E, 0x10, 0x10, 0x1F],
        'F' => [0x1F, 0x10, 0x10, 0x1E, 0x10, 0x10, 0x10],
        'G' => [0x0E, 0x11, 0x10, 0x17, 0x11, 0x11, 0x0F],
        'H' => [0x11, 0x11, 0x11, 0x1F, 0x11, 0x11, 0x11],
        'I' => [0x0E, 0x04, 0x04, 0x04, 0x04, 0x04, 0x0E],
        'J' => [0x07, 0x02, 0x02, 0x02, 0x02, 0x12, 0x0C],
        'K' => [0x11, 0x12, 0x14, 0x18, 0x14, 0x12, 0x11],
        'L' => [0x10, 0x10, 0x10, 0x10, 0x10, 0x10, 0x1F],
        'M' => [0x11, 0x1B, 0x15, 0x15, 0x11, 0x11, 0x11],
        'N' => [0x11, 0x19, 0x15, 0x13, 0x11, 0x11, 0x11],
        'O' => [0x0E, 0x11, 0x11, 0x11, 0x11, 0x11, 0x0E],
        'P' => [0x1E, 0x11, 0x11, 0x1E, 0x10, 0x10, 0x10],
        'Q' => [0x0E, 0x11, 0x11, 0x11, 0x15, 0x12, 0x0D],
        'R' => [0x1E, 0x11, 0x11, 0x1E, 0x14, 0x12, 0x11],
        'S' => [0x0F, 0x10, 0x10, 0x0E, 0x01, 0x01, 0x1E],
        'T' => [0x1F, 0x04, 0x04, 0x04, 0x04, 0x04, 0x04],
        'U' => [0x11, 0x11, 0x11, 0x11, 0x11, 0x11, 0x0E],
        'V' => [0x11, 0x11, 0x11, 0x11, 0x11, 0x0A, 0x04],
        'W' => [0x11, 0x11, 0x11, 0x15, 0x15, 0x15, 0x0A],
        'X' => [0x11, 0x11, 0x0A, 0x04, 0x0A, 0x11, 0x11],
        'Y' => [0x11, 0x11, 0x0A, 0x04, 0x04, 0x04, 0x04],
        'Z' => [0x1F, 0x01, 0x02, 0x04, 0x08, 0x10, 0x1F],
        '0' => [0x0E, 0x11, 0x13, 0x15, 0x19, 0x11, 0x0E],
        '1' => [0x04, 0x0C, 0x04, 0x04, 0x04, 0x04, 0x0E],
        '2' => [0x0E, 0x11, 0x01, 0x02, 0x04, 0x08, 0x1F],
        '3' => [0x1F, 0x02, 0x04, 0x02, 0x01, 0x11, 0x0E],
        '4' => [0x02, 0x06, 0x0A, 0x12, 0x1F, 0x02, 0x02],
        '5' => [0x1F, 0x10, 0x1E, 0x01, 0x01, 0x11, 0x0E],
        '6' => [0x06, 0x08, 0x10, 0x1E, 0x11, 0x11, 0x0E],
        '7' => [0x1F, 0x01, 0x02, 0x04, 0x08, 0x08, 0x08],
        '8' => [0x0E, 0x11, 0x11, 0x0E, 0x11, 0x11, 0x0E],
        '9' => [0x0E, 0x11, 0x11, 0x0F, 0x01, 0x02, 0x0C],
        '.' => [0x00, 0x00, 0x00, 0x00, 0x00, 0x0C, 0x0C],
        ',' => [0x00, 0x00, 0x00, 0x00, 0x0C, 0x04, 0x08],
        '-' => [0x00, 0x00, 0x00, 0x1F, 0x00, 0x00, 0x00],
        '!' => [0x04, 0x04, 0x04, 0x04, 0x04, 0x00, 0x04],
        '?' => [0x0E, 0x11, 0x01, 0x02, 0x04, 0x00, 0x04],
        _ => [0x1F, 0x11, 0x11, 0x11, 0x11, 0x11, 0x1F],
    }
}
