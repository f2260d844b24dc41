//! End-to-end orchestrator tests: demo mode, fallback and persistence.

use std::time::Duration;
use vidgen::video::{VideoGenerationRequest, VideoProviderKind, VideoSource, VideoStyle};
use vidgen::{Config, DemoVideoSource, FileHandler, RunwayProvider, VidGenError, VideoGenerator};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn request() -> VideoGenerationRequest {
    VideoGenerationRequest::new("A cute cat playing with yarn")
        .with_duration(7)
        .with_style(VideoStyle::Cinematic)
}

fn local_demo() -> DemoVideoSource {
    DemoVideoSource::new(Duration::from_secs(1)).with_sample_urls(vec![])
}

async fn failing_runway(server: &MockServer) -> RunwayProvider {
    Mock::given(method("POST"))
        .and(path("/generate"))
        .respond_with(ResponseTemplate::new(500).set_body_json(serde_json::json!({
            "message": "internal error"
        })))
        .mount(server)
        .await;

    RunwayProvider::builder()
        .api_key("rw-test-key")
        .base_url(server.uri())
        .poll_interval(Duration::from_millis(0))
        .build()
        .unwrap()
}

#[tokio::test]
async fn provider_error_falls_back_to_demo_artifact() {
    let server = MockServer::start().await;
    let config = Config {
        runway_api_key: Some("rw-test-key".into()),
        demo_fallback: true,
        ..Config::default()
    };

    let generator = VideoGenerator::new(&config)
        .with_client(
            VideoProviderKind::Runway,
            Box::new(failing_runway(&server).await),
        )
        .with_demo_source(local_demo());

    let video = generator
        .generate(&request(), VideoProviderKind::Runway)
        .await
        .unwrap();

    assert_eq!(video.source, VideoSource::Demo);
    assert!(video.metadata.demo_mode);
}

#[tokio::test]
async fn provider_error_surfaces_when_fallback_disabled() {
    let server = MockServer::start().await;
    let config = Config {
        runway_api_key: Some("rw-test-key".into()),
        demo_fallback: false,
        ..Config::default()
    };

    let generator = VideoGenerator::new(&config)
        .with_client(
            VideoProviderKind::Runway,
            Box::new(failing_runway(&server).await),
        )
        .with_demo_source(local_demo());

    let err = generator
        .generate(&request(), VideoProviderKind::Runway)
        .await
        .unwrap_err();

    assert!(matches!(err, VidGenError::Api { status: 500, .. }));
}

#[tokio::test]
async fn validation_error_does_not_fall_back() {
    let config = Config {
        runway_api_key: Some("rw-test-key".into()),
        demo_fallback: true,
        ..Config::default()
    };

    let generator = VideoGenerator::new(&config).with_demo_source(local_demo());

    // Too short to be a usable prompt.
    let err = generator
        .generate(
            &VideoGenerationRequest::new("cat"),
            VideoProviderKind::Runway,
        )
        .await
        .unwrap_err();

    assert!(err.is_validation());
}

#[tokio::test]
async fn demo_source_prefers_sample_download() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/samples/clip.mp4"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![0x11; 4096]))
        .expect(1)
        .mount(&server)
        .await;

    let demo = DemoVideoSource::new(Duration::from_secs(5))
        .with_sample_urls(vec![format!("{}/samples/clip.mp4", server.uri())]);

    let generator = VideoGenerator::new(&Config::default()).with_demo_source(demo);

    let video = generator
        .generate(&request(), VideoProviderKind::Pika)
        .await
        .unwrap();

    assert_eq!(video.source, VideoSource::Demo);
    assert_eq!(video.mime_type, "video/mp4");
    assert_eq!(video.size(), 4096);
}

#[tokio::test]
async fn demo_source_synthesizes_when_sample_download_fails() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/samples/clip.mp4"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let demo = DemoVideoSource::new(Duration::from_secs(5))
        .with_sample_urls(vec![format!("{}/samples/clip.mp4", server.uri())]);

    let generator = VideoGenerator::new(&Config::default()).with_demo_source(demo);

    let video = generator
        .generate(&request(), VideoProviderKind::Pika)
        .await
        .unwrap();

    assert_eq!(video.source, VideoSource::Demo);
    assert_eq!(video.mime_type, "image/gif");
    assert!(video.data.starts_with(b"GIF89a"));
}

#[tokio::test]
async fn generate_to_file_persists_demo_artifact() {
    let dir = tempfile::tempdir().unwrap();
    let config = Config {
        output_dir: dir.path().join("out"),
        ..Config::default()
    };

    let generator = VideoGenerator::new(&config).with_demo_source(local_demo());
    let files = FileHandler::new(&config).unwrap();

    let (path, metadata) = generator
        .generate_to_file(&request(), VideoProviderKind::Runway, &files)
        .await
        .unwrap();

    assert!(path.exists());
    assert!(metadata.demo_mode);
    let name = path.file_name().unwrap().to_string_lossy().into_owned();
    assert!(name.contains("_demo_"), "unexpected name: {name}");
    assert!(
        name.ends_with("_A_cute_cat_playing_with_yarn.gif"),
        "unexpected name: {name}"
    );
}
