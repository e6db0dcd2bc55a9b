use std::time::Duration;
use vtxproxy::{InvidiousPool, PipedPool, PoolSettings};
use vtxsource::{InstancePool, SourceError, SourceKind};

const INVIDIOUS_VIDEO: &str = r#"{
    "title": "Shape of You",
    "author": "Ed Sheeran",
    "lengthSeconds": 264,
    "videoThumbnails": [
        {"quality": "maxres", "url": "/vi/JGwWNGJdvx8/maxres.jpg"},
        {"quality": "high", "url": "/vi/JGwWNGJdvx8/hqdefault.jpg"}
    ],
    "adaptiveFormats": [
        {"url": "https://rr1.example/video", "type": "video/mp4; codecs=\"avc1\"", "bitrate": "1500000"},
        {"url": "https://rr1.example/low", "type": "audio/mp4; codecs=\"mp4a.40.5\"", "bitrate": "48000"},
        {"url": "https://rr1.example/opus", "type": "audio/webm; codecs=\"opus\"", "bitrate": "135000"}
    ]
}"#;

fn settings(instance: String) -> PoolSettings {
    PoolSettings::new([instance]).instance_timeout(Duration::from_secs(2))
}

#[tokio::test]
async fn invidious_picks_highest_bitrate_audio() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/api/v1/videos/JGwWNGJdvx8")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(INVIDIOUS_VIDEO)
        .create_async()
        .await;

    let pool = InvidiousPool::new(settings(server.url())).unwrap();
    let descriptor = pool.query(&server.url(), "JGwWNGJdvx8").await.unwrap();

    mock.assert_async().await;
    assert_eq!(descriptor.source_kind, SourceKind::ProxyPoolA);
    assert_eq!(descriptor.upstream_url(), "https://rr1.example/opus");
    assert_eq!(descriptor.bitrate_kbps, 135);
    assert_eq!(descriptor.duration_seconds, Some(264));
    assert_eq!(descriptor.artist.as_deref(), Some("Ed Sheeran"));
    assert_eq!(
        descriptor.thumbnail_url,
        Some(format!("{}/vi/JGwWNGJdvx8/hqdefault.jpg", server.url()))
    );
}

#[tokio::test]
async fn invidious_huge_bitrate_is_clamped() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/api/v1/videos/abcdefghijk")
        .with_status(200)
        .with_body(
            r#"{"title": "x", "adaptiveFormats": [
                {"url": "https://a", "type": "audio/webm", "bitrate": 18446744073709551615}
            ]}"#,
        )
        .create_async()
        .await;

    let pool = InvidiousPool::new(settings(server.url())).unwrap();
    let descriptor = pool.fetch(&server.url(), "abcdefghijk").await.unwrap();
    assert_eq!(descriptor.bitrate_kbps, u32::MAX);
}

#[tokio::test]
async fn invidious_without_audio_is_a_failure() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/api/v1/videos/abcdefghijk")
        .with_status(200)
        .with_body(r#"{"title": "x", "adaptiveFormats": [{"url": "https://v", "type": "video/mp4", "bitrate": "1"}]}"#)
        .create_async()
        .await;

    let pool = InvidiousPool::new(settings(server.url())).unwrap();
    let err = pool.query(&server.url(), "abcdefghijk").await.unwrap_err();
    assert!(matches!(err, SourceError::NoStream(_)));
}

#[tokio::test]
async fn invidious_error_document_is_a_failure() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/api/v1/videos/abcdefghijk")
        .with_status(200)
        .with_body(r#"{"error": "This video is not available"}"#)
        .create_async()
        .await;

    let pool = InvidiousPool::new(settings(server.url())).unwrap();
    let err = pool.query(&server.url(), "abcdefghijk").await.unwrap_err();
    assert!(matches!(err, SourceError::Unavailable(_)));
}

#[tokio::test]
async fn rate_limited_instance_is_skipped_by_resolve_any() {
    let mut bad = mockito::Server::new_async().await;
    bad.mock("GET", "/api/v1/videos/JGwWNGJdvx8")
        .with_status(429)
        .create_async()
        .await;

    let mut good = mockito::Server::new_async().await;
    good.mock("GET", "/api/v1/videos/JGwWNGJdvx8")
        .with_status(200)
        .with_body(INVIDIOUS_VIDEO)
        .create_async()
        .await;

    let pool = InvidiousPool::new(
        PoolSettings::new([bad.url(), good.url()]).instance_timeout(Duration::from_secs(2)),
    )
    .unwrap();
    let descriptor = pool.resolve_any("JGwWNGJdvx8").await.unwrap();
    assert_eq!(descriptor.upstream_url(), "https://rr1.example/opus");
}

#[tokio::test]
async fn piped_picks_highest_bitrate_audio() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/streams/JGwWNGJdvx8")
        .with_status(200)
        .with_body(
            r#"{
                "title": "Shape of You",
                "uploader": "Ed Sheeran",
                "duration": 264,
                "thumbnailUrl": "https://img/hq.jpg",
                "audioStreams": [
                    {"url": "https://cdn/m4a", "mimeType": "audio/mp4", "bitrate": 129000},
                    {"url": "https://cdn/opus", "mimeType": "audio/webm", "bitrate": 141000}
                ]
            }"#,
        )
        .create_async()
        .await;

    let pool = PipedPool::new(settings(server.url())).unwrap();
    let descriptor = pool.query(&server.url(), "JGwWNGJdvx8").await.unwrap();
    assert_eq!(descriptor.source_kind, SourceKind::ProxyPoolB);
    assert_eq!(descriptor.upstream_url(), "https://cdn/opus");
    assert_eq!(descriptor.bitrate_kbps, 141);
    assert_eq!(descriptor.thumbnail_url.as_deref(), Some("https://img/hq.jpg"));
}

#[tokio::test]
async fn piped_error_document_is_a_failure() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/streams/JGwWNGJdvx8")
        .with_status(500)
        .with_body(r#"{"error": "ExtractionException", "message": "Video unavailable"}"#)
        .create_async()
        .await;

    let pool = PipedPool::new(settings(server.url())).unwrap();
    let err = pool.query(&server.url(), "JGwWNGJdvx8").await.unwrap_err();
    match err {
        SourceError::Unavailable(message) => assert!(message.contains("Video unavailable")),
        other => panic!("unexpected error: {other:?}"),
    }
}
