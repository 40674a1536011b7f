//! Relay HTTP contract tests
//!
//! Exercises the full request path against a wiremock upstream: envelope
//! decoding, credential enforcement, error normalization and the outbound
//! call-count guarantees.

use picforge::{
    relay::{router, RelayClient, RelayConfig},
    EncodeSettings, ImageCodec, OutputFormat,
};
use serde_json::Value;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Encode an opaque PNG fixture of the given dimensions
fn png_fixture(width: u32, height: u32) -> Vec<u8> {
    let image = image::DynamicImage::ImageRgba8(image::RgbaImage::from_pixel(
        width,
        height,
        image::Rgba([200, 100, 50, 255]),
    ));
    ImageCodec::encode(&image, &EncodeSettings::for_format(OutputFormat::Png)).unwrap()
}

/// Spawn the relay server on an ephemeral port and return its base URL
async fn spawn_relay(config: RelayConfig) -> String {
    let client = RelayClient::new(config).unwrap();
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(listener, router(client).into_make_service())
            .await
            .unwrap();
    });

    format!("http://{addr}")
}

fn relay_config(upstream: &MockServer, api_key: Option<&str>) -> RelayConfig {
    let mut builder = RelayConfig::builder().upstream_url(format!("{}/removebg", upstream.uri()));
    if let Some(key) = api_key {
        builder = builder.api_key(key);
    }
    builder.build().unwrap()
}

#[tokio::test]
async fn json_envelope_round_trips_a_png() {
    let upstream = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/removebg"))
        .and(header("X-Api-Key", "test-key"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(png_fixture(1, 1)))
        .expect(1)
        .mount(&upstream)
        .await;

    let base = spawn_relay(relay_config(&upstream, Some("test-key"))).await;

    let body = serde_json::json!({
        "image": ImageCodec::encode_data_uri(OutputFormat::Png, &png_fixture(1, 1)),
    });
    let response = reqwest::Client::new()
        .post(format!("{base}/relay/remove-background"))
        .json(&body)
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 200);
    let json: Value = response.json().await.unwrap();
    let result = json["result"].as_str().unwrap();
    assert!(result.starts_with("data:image/png;base64,"));

    let (mime, bytes) = ImageCodec::parse_data_uri(result).unwrap();
    assert_eq!(mime, "image/png");
    let (decoded, _) = ImageCodec::decode(&bytes).unwrap();
    assert_eq!((decoded.width(), decoded.height()), (1, 1));
}

#[tokio::test]
async fn multipart_envelope_returns_raw_png_bytes() {
    let upstream = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/removebg"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(png_fixture(2, 2)))
        .expect(1)
        .mount(&upstream)
        .await;

    let base = spawn_relay(relay_config(&upstream, Some("test-key"))).await;

    let form = reqwest::multipart::Form::new().part(
        "image_file",
        reqwest::multipart::Part::bytes(png_fixture(2, 2)).file_name("photo.png"),
    );
    let response = reqwest::Client::new()
        .post(format!("{base}/relay/remove-background"))
        .multipart(form)
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 200);
    assert_eq!(
        response.headers()["content-type"].to_str().unwrap(),
        "image/png"
    );

    let bytes = response.bytes().await.unwrap();
    let (decoded, format) = ImageCodec::decode(&bytes).unwrap();
    assert_eq!(format, OutputFormat::Png);
    assert_eq!((decoded.width(), decoded.height()), (2, 2));
}

#[tokio::test]
async fn missing_image_field_is_rejected_without_upstream_call() {
    let upstream = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&upstream)
        .await;

    let base = spawn_relay(relay_config(&upstream, Some("test-key"))).await;

    let form = reqwest::multipart::Form::new().text("size", "auto");
    let response = reqwest::Client::new()
        .post(format!("{base}/relay/remove-background"))
        .multipart(form)
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 400);
    let json: Value = response.json().await.unwrap();
    assert!(!json["error"].as_str().unwrap().is_empty());
}

#[tokio::test]
async fn multiple_image_fields_are_rejected() {
    let upstream = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&upstream)
        .await;

    let base = spawn_relay(relay_config(&upstream, Some("test-key"))).await;

    let form = reqwest::multipart::Form::new()
        .part(
            "image_file",
            reqwest::multipart::Part::bytes(png_fixture(1, 1)).file_name("a.png"),
        )
        .part(
            "image",
            reqwest::multipart::Part::bytes(png_fixture(1, 1)).file_name("b.png"),
        );
    let response = reqwest::Client::new()
        .post(format!("{base}/relay/remove-background"))
        .multipart(form)
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 400);
    let json: Value = response.json().await.unwrap();
    assert!(json["error"].as_str().unwrap().contains("multiple"));
}

#[tokio::test]
async fn missing_credential_is_500_without_upstream_call() {
    let upstream = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&upstream)
        .await;

    let base = spawn_relay(relay_config(&upstream, None)).await;

    let body = serde_json::json!({
        "image": ImageCodec::encode_data_uri(OutputFormat::Png, &png_fixture(1, 1)),
    });
    let response = reqwest::Client::new()
        .post(format!("{base}/relay/remove-background"))
        .json(&body)
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 500);
    let json: Value = response.json().await.unwrap();
    let message = json["error"].as_str().unwrap();
    assert!(!message.is_empty());
    assert!(message.contains("REMOVE_BG_API_KEY"));
}

#[tokio::test]
async fn upstream_rejection_surfaces_structured_json_error() {
    let upstream = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/removebg"))
        .respond_with(ResponseTemplate::new(402).set_body_string("quota exceeded"))
        .expect(1)
        .mount(&upstream)
        .await;

    let base = spawn_relay(relay_config(&upstream, Some("test-key"))).await;

    let body = serde_json::json!({
        "image": ImageCodec::encode_data_uri(OutputFormat::Png, &png_fixture(1, 1)),
    });
    let response = reqwest::Client::new()
        .post(format!("{base}/relay/remove-background"))
        .json(&body)
        .send()
        .await
        .unwrap();

    // Upstream status is normalized, not preserved
    assert_eq!(response.status(), 500);
    let json: Value = response.json().await.unwrap();
    assert!(json["error"].as_str().unwrap().contains("quota exceeded"));
}

#[tokio::test]
async fn malformed_data_uri_is_rejected() {
    let upstream = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&upstream)
        .await;

    let base = spawn_relay(relay_config(&upstream, Some("test-key"))).await;

    let body = serde_json::json!({"image": "https://example.com/photo.png"});
    let response = reqwest::Client::new()
        .post(format!("{base}/relay/remove-background"))
        .json(&body)
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 400);
    let json: Value = response.json().await.unwrap();
    assert!(!json["error"].as_str().unwrap().is_empty());
}

#[tokio::test]
async fn unsupported_content_type_is_rejected() {
    let upstream = MockServer::start().await;
    let base = spawn_relay(relay_config(&upstream, Some("test-key"))).await;

    let response = reqwest::Client::new()
        .post(format!("{base}/relay/remove-background"))
        .header("content-type", "text/plain")
        .body("hello")
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 400);
    let json: Value = response.json().await.unwrap();
    assert!(json["error"].as_str().unwrap().contains("content type"));
}

#[tokio::test]
async fn health_endpoint_responds() {
    let upstream = MockServer::start().await;
    let base = spawn_relay(relay_config(&upstream, None)).await;

    let response = reqwest::get(format!("{base}/health")).await.unwrap();
    assert_eq!(response.status(), 204);
}
