use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use tempfile::TempDir;
use tower::ServiceExt;

use timebooth_api::config::ServerConfig;
use timebooth_api::router::build_app_router;
use timebooth_api::state::AppState;
use timebooth_core::storage::BoothDirs;
use timebooth_fal::client::{EditResult, FalError};
use timebooth_fal::ImageEditor;

/// In-process editor stub: deterministic references, tiny JPEG
/// downloads, never touches the network.
pub struct StubEditor;

#[async_trait]
impl ImageEditor for StubEditor {
    async fn upload(&self, _bytes: Vec<u8>, filename: &str) -> Result<String, FalError> {
        Ok(format!("http://stub/uploads/{filename}"))
    }

    async fn edit(&self, prompt: &str, _image_url: &str) -> Result<EditResult, FalError> {
        Ok(EditResult {
            image_url: format!("http://stub/edits/{prompt}.jpg"),
        })
    }

    async fn fetch(&self, _url: &str) -> Result<Vec<u8>, FalError> {
        Ok(tiny_jpeg(24, 24))
    }
}

/// Build a test `ServerConfig` rooted in a throwaway directory.
pub fn test_config(root: &TempDir) -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["*".to_string()],
        request_timeout_secs: 30,
        edit_timeout_secs: 1,
        upload_dir: root.path().join("uploads"),
        photo_dir: root.path().join("photos"),
        template_path: root.path().join("background.jpg"),
        fal_api_url: "http://127.0.0.1:9".to_string(),
        fal_key: "test-key".to_string(),
        removal_passes: 3,
        print_server_url: None,
    }
}

/// Build the full application router with all middleware layers,
/// backed by the stub editor.
///
/// This uses the same `build_app_router` as `main.rs` so integration
/// tests exercise the production middleware stack (CORS, request ID,
/// timeout, tracing, panic recovery). The returned `TempDir` keeps the
/// storage directories and background template alive for the duration
/// of the test.
pub fn build_test_app() -> (Router, TempDir) {
    let root = tempfile::tempdir().expect("create temp dir");
    let config = test_config(&root);

    let dirs = BoothDirs::new(&config.upload_dir, &config.photo_dir);
    std::fs::create_dir_all(&dirs.uploads).expect("create uploads dir");
    std::fs::create_dir_all(&dirs.photos).expect("create photos dir");

    image::RgbImage::from_pixel(40, 120, image::Rgb([230, 230, 230]))
        .save(&config.template_path)
        .expect("write background template");

    let state = AppState {
        config: Arc::new(config.clone()),
        dirs,
        fal: Arc::new(StubEditor),
    };

    (build_app_router(state, &config), root)
}

/// Perform a GET request against the app.
pub async fn get(app: Router, uri: &str) -> Response<Body> {
    app.oneshot(
        Request::builder()
            .uri(uri)
            .body(Body::empty())
            .expect("build request"),
    )
    .await
    .expect("request failed")
}

/// Collect a response body as JSON.
pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("collect body")
        .to_bytes();
    serde_json::from_slice(&bytes).expect("body is not valid JSON")
}

/// Assemble a `multipart/form-data` body from `(name, filename, value)`
/// parts, returning the body and the matching `Content-Type` value.
pub fn multipart_body(parts: &[(&str, Option<&str>, &[u8])]) -> (Vec<u8>, String) {
    const BOUNDARY: &str = "booth-test-boundary";

    let mut body = Vec::new();
    for (name, filename, value) in parts {
        body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
        match filename {
            Some(f) => body.extend_from_slice(
                format!(
                    "Content-Disposition: form-data; name=\"{name}\"; filename=\"{f}\"\r\n\
                     Content-Type: application/octet-stream\r\n\r\n"
                )
                .as_bytes(),
            ),
            None => body.extend_from_slice(
                format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n").as_bytes(),
            ),
        }
        body.extend_from_slice(value);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

    (body, format!("multipart/form-data; boundary={BOUNDARY}"))
}

/// Encode a solid-color JPEG in memory.
pub fn tiny_jpeg(w: u32, h: u32) -> Vec<u8> {
    let img = image::RgbImage::from_pixel(w, h, image::Rgb([120, 80, 40]));
    let mut buf = std::io::Cursor::new(Vec::new());
    img.write_to(&mut buf, image::ImageFormat::Jpeg)
        .expect("encode jpeg");
    buf.into_inner()
}
