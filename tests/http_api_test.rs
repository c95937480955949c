//! End-to-end tests driving the full router in-process.

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use image_uploader::api::{ApiState, router};
use image_uploader::images::ImageLibrary;
use std::sync::Arc;
use tempfile::TempDir;
use tower::ServiceExt;

const BOUNDARY: &str = "image-uploader-test-boundary";
const JPEG_BYTES: &[u8] = b"\xff\xd8\xff\xe0\x00\x10JFIF\x00fake-jpeg";

async fn test_app(max_upload_bytes: usize) -> (TempDir, Router) {
    let temp = tempfile::tempdir().expect("tempdir");
    let library = ImageLibrary::open(temp.path()).await.expect("open library");
    let state = Arc::new(ApiState::new(library).expect("state"));
    (temp, router(state, max_upload_bytes))
}

fn multipart_body(title: Option<&str>, file: Option<(&str, &[u8])>) -> Vec<u8> {
    let mut body = Vec::new();
    if let Some(title) = title {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"imgtitle\"\r\n\r\n{title}\r\n"
            )
            .as_bytes(),
        );
    }
    if let Some((file_name, data)) = file {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"imgToUpload\"; filename=\"{file_name}\"\r\nContent-Type: application/octet-stream\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(data);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    body
}

fn upload_request(body: Vec<u8>) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/upload")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

async fn body_bytes(response: axum::response::Response) -> Vec<u8> {
    axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap()
        .to_vec()
}

/// Upload and return the generated id taken from the redirect location.
async fn upload(app: &Router, title: &str, file_name: &str, data: &[u8]) -> String {
    let response = app
        .clone()
        .oneshot(upload_request(multipart_body(Some(title), Some((file_name, data)))))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);

    let location = response
        .headers()
        .get(header::LOCATION)
        .expect("location header")
        .to_str()
        .unwrap();
    location
        .strip_prefix("/picture/")
        .expect("redirect to details page")
        .to_string()
}

async fn image_count(app: &Router) -> u64 {
    let response = app.clone().oneshot(get("/api/status")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let status: serde_json::Value = serde_json::from_slice(&body_bytes(response).await).unwrap();
    status["images"].as_u64().unwrap()
}

#[tokio::test]
async fn landing_page_serves_upload_form() {
    let (_temp, app) = test_app(1024 * 1024).await;

    let response = app.clone().oneshot(get("/")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(
        response.headers()[header::CONTENT_TYPE]
            .to_str()
            .unwrap()
            .starts_with("text/html")
    );
    let html = String::from_utf8(body_bytes(response).await).unwrap();
    assert!(html.contains(r#"action="/upload""#));
    assert!(html.contains(r#"name="imgtitle""#));
    assert!(html.contains(r#"name="imgToUpload""#));

    let css = app.clone().oneshot(get("/site.css")).await.unwrap();
    assert_eq!(css.status(), StatusCode::OK);
    assert_eq!(css.headers()[header::CONTENT_TYPE], "text/css");

    let missing = app.oneshot(get("/nope.js")).await.unwrap();
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn uploaded_jpeg_is_retrievable() {
    let (temp, app) = test_app(1024 * 1024).await;

    let id = upload(&app, "Harbour at dusk", "harbour.jpg", JPEG_BYTES).await;
    assert!(temp.path().join("uploads").join(format!("{id}.jpg")).is_file());

    let image = app.clone().oneshot(get(&format!("/img/{id}"))).await.unwrap();
    assert_eq!(image.status(), StatusCode::OK);
    assert_eq!(image.headers()[header::CONTENT_TYPE], "image/jpeg");
    assert_eq!(body_bytes(image).await, JPEG_BYTES);

    let page = app.clone().oneshot(get(&format!("/picture/{id}"))).await.unwrap();
    assert_eq!(page.status(), StatusCode::OK);
    let html = String::from_utf8(body_bytes(page).await).unwrap();
    assert!(html.contains("Title: Harbour at dusk"));
    assert!(html.contains(&format!(r#"src="/img/{id}""#)));

    assert_eq!(image_count(&app).await, 1);
}

#[tokio::test]
async fn unsupported_extension_is_rejected() {
    let (temp, app) = test_app(1024 * 1024).await;

    let response = app
        .clone()
        .oneshot(upload_request(multipart_body(
            Some("Bitmap"),
            Some(("old.bmp", b"BM....".as_slice())),
        )))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    assert_eq!(image_count(&app).await, 0);
    assert!(!temp.path().join("images.json").exists());
    assert_eq!(
        std::fs::read_dir(temp.path().join("uploads")).unwrap().count(),
        0
    );
}

#[tokio::test]
async fn missing_or_blank_fields_are_rejected() {
    let (_temp, app) = test_app(1024 * 1024).await;

    let cases = [
        multipart_body(None, Some(("a.png", b"png".as_slice()))),
        multipart_body(Some("   "), Some(("a.png", b"png".as_slice()))),
        multipart_body(Some("No file"), None),
        multipart_body(Some("Empty name"), Some(("", b"".as_slice()))),
    ];
    for body in cases {
        let response = app.clone().oneshot(upload_request(body)).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    let not_multipart = Request::builder()
        .method("POST")
        .uri("/upload")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{}"))
        .unwrap();
    let response = app.clone().oneshot(not_multipart).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    assert_eq!(image_count(&app).await, 0);
}

#[tokio::test]
async fn unknown_id_is_not_found() {
    let (_temp, app) = test_app(1024 * 1024).await;

    // Before anything is uploaded the metadata file does not exist.
    for uri in ["/img/does-not-exist", "/picture/does-not-exist"] {
        let response = app.clone().oneshot(get(uri)).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND, "{uri}");
    }

    upload(&app, "Something", "thing.gif", b"GIF89a").await;

    for uri in ["/img/does-not-exist", "/picture/does-not-exist"] {
        let response = app.clone().oneshot(get(uri)).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND, "{uri}");
    }
}

#[tokio::test]
async fn sequential_uploads_get_distinct_ids() {
    let (_temp, app) = test_app(1024 * 1024).await;

    let first = upload(&app, "First", "one.png", b"png-one").await;
    let second = upload(&app, "Second", "two.GIF", b"gif-two").await;
    assert_ne!(first, second);

    let one = app.clone().oneshot(get(&format!("/img/{first}"))).await.unwrap();
    assert_eq!(one.headers()[header::CONTENT_TYPE], "image/png");
    assert_eq!(body_bytes(one).await, b"png-one");

    let two = app.clone().oneshot(get(&format!("/img/{second}"))).await.unwrap();
    assert_eq!(two.headers()[header::CONTENT_TYPE], "image/gif");
    assert_eq!(body_bytes(two).await, b"gif-two");

    assert_eq!(image_count(&app).await, 2);
}

#[tokio::test]
async fn deleted_file_is_not_found_but_details_remain() {
    let (temp, app) = test_app(1024 * 1024).await;

    let id = upload(&app, "Ephemeral", "e.jpeg", JPEG_BYTES).await;
    std::fs::remove_file(temp.path().join("uploads").join(format!("{id}.jpeg"))).unwrap();

    let image = app.clone().oneshot(get(&format!("/img/{id}"))).await.unwrap();
    assert_eq!(image.status(), StatusCode::NOT_FOUND);

    let page = app.oneshot(get(&format!("/picture/{id}"))).await.unwrap();
    assert_eq!(page.status(), StatusCode::OK);
}

#[tokio::test]
async fn details_page_escapes_title() {
    let (_temp, app) = test_app(1024 * 1024).await;

    let id = upload(&app, "<b>bold</b>", "x.png", b"png").await;
    let page = app.oneshot(get(&format!("/picture/{id}"))).await.unwrap();
    let html = String::from_utf8(body_bytes(page).await).unwrap();
    assert!(!html.contains("<b>bold"));
    assert!(html.contains("&lt;b&gt;bold"));
}

#[tokio::test]
async fn oversized_upload_is_rejected() {
    let (_temp, app) = test_app(1024).await;

    let big = vec![0u8; 8 * 1024];
    let response = app
        .clone()
        .oneshot(upload_request(multipart_body(
            Some("Too big"),
            Some(("big.png", big.as_slice())),
        )))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(image_count(&app).await, 0);
}

#[tokio::test]
async fn health_reports_ok() {
    let (_temp, app) = test_app(1024).await;

    let response = app.oneshot(get("/api/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body: serde_json::Value = serde_json::from_slice(&body_bytes(response).await).unwrap();
    assert_eq!(body["status"], "ok");
}
