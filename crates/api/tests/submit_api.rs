//! Integration tests for `POST /submit`: the full happy path against
//! the stub editor, plus the request-validation failures.

mod common;

use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use common::{body_json, multipart_body, tiny_jpeg};
use tower::ServiceExt;

async fn post_submit_to(
    app: axum::Router,
    parts: &[(&str, Option<&str>, &[u8])],
) -> axum::response::Response {
    let (body, content_type) = multipart_body(parts);

    app.oneshot(
        Request::builder()
            .method(Method::POST)
            .uri("/submit")
            .header("content-type", content_type)
            .body(Body::from(body))
            .unwrap(),
    )
    .await
    .unwrap()
}

async fn post_submit(parts: &[(&str, Option<&str>, &[u8])]) -> axum::response::Response {
    let (app, _root) = common::build_test_app();
    post_submit_to(app, parts).await
}

// ---------------------------------------------------------------------------
// Test: successful submit returns both styles, a numeric photo id, and
// the composite strip on disk
// ---------------------------------------------------------------------------

#[tokio::test]
async fn successful_submit_returns_styles_and_writes_composite() {
    let (app, root) = common::build_test_app();
    let photo = tiny_jpeg(48, 64);

    let response = post_submit_to(
        app,
        &[
            ("photo", Some("selfie.jpg"), photo.as_slice()),
            ("past_prompt", None, b"sepia portrait"),
            ("future_prompt", None, b"chrome cityscape"),
        ],
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    let data = &json["data"];
    assert!(data["input"].as_str().unwrap().starts_with("http://stub/uploads/"));
    assert!(data["output"]["past"].as_str().unwrap().contains("sepia portrait"));
    assert!(data["output"]["future"].as_str().unwrap().contains("chrome cityscape"));

    let photo_id = data["output"]["photo_id"]
        .as_i64()
        .expect("photo_id is a numeric identifier");

    // The composite strip was written before the response, at its
    // timestamp-derived path, on the fixed canvas.
    let composite = root.path().join("photos").join(format!("{photo_id}.jpg"));
    let strip = image::open(&composite).expect("composite readable");
    assert_eq!((strip.width(), strip.height()), (600, 1800));
}

// ---------------------------------------------------------------------------
// Test: missing photo field returns 400 UPLOAD_FAILED
// ---------------------------------------------------------------------------

#[tokio::test]
async fn missing_photo_returns_upload_failed() {
    let response = post_submit(&[
        ("past_prompt", None, b"sepia portrait"),
        ("future_prompt", None, b"chrome cityscape"),
    ])
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let json = body_json(response).await;
    assert_eq!(json["code"], "UPLOAD_FAILED");
}

// ---------------------------------------------------------------------------
// Test: empty photo payload is treated as missing
// ---------------------------------------------------------------------------

#[tokio::test]
async fn empty_photo_returns_upload_failed() {
    let response = post_submit(&[
        ("photo", Some("selfie.jpg"), b""),
        ("past_prompt", None, b"sepia portrait"),
        ("future_prompt", None, b"chrome cityscape"),
    ])
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let json = body_json(response).await;
    assert_eq!(json["code"], "UPLOAD_FAILED");
}

// ---------------------------------------------------------------------------
// Test: missing style prompt returns 400 BAD_REQUEST naming the field
// ---------------------------------------------------------------------------

#[tokio::test]
async fn missing_prompt_returns_bad_request() {
    let response = post_submit(&[
        ("photo", Some("selfie.jpg"), b"not-really-a-jpeg"),
        ("past_prompt", None, b"sepia portrait"),
    ])
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let json = body_json(response).await;
    assert_eq!(json["code"], "BAD_REQUEST");
    assert!(
        json["error"].as_str().unwrap().contains("future_prompt"),
        "error should name the missing field: {json}"
    );
}

// ---------------------------------------------------------------------------
// Test: blank prompts are rejected the same as missing ones
// ---------------------------------------------------------------------------

#[tokio::test]
async fn blank_prompt_returns_bad_request() {
    let response = post_submit(&[
        ("photo", Some("selfie.jpg"), b"not-really-a-jpeg"),
        ("past_prompt", None, b"   "),
        ("future_prompt", None, b"chrome cityscape"),
    ])
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let json = body_json(response).await;
    assert_eq!(json["code"], "BAD_REQUEST");
    assert!(
        json["error"].as_str().unwrap().contains("past_prompt"),
        "error should name the blank field: {json}"
    );
}

// ---------------------------------------------------------------------------
// Test: non-multipart body returns 400
// ---------------------------------------------------------------------------

#[tokio::test]
async fn non_multipart_body_is_rejected() {
    let (app, _root) = common::build_test_app();

    let response = app
        .oneshot(
            Request::builder()
                .method(Method::POST)
                .uri("/submit")
                .header("content-type", "application/json")
                .body(Body::from("{}"))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
