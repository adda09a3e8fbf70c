mod common;

use std::io::{Cursor, Write};

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use common::{app, send};
use interview_backend::config::Config;

const BOUNDARY: &str = "----interview-test-boundary";

fn multipart(field: &str, file_name: &str, mime: &str, data: &[u8]) -> Request<Body> {
    let mut body = Vec::new();
    body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
    body.extend_from_slice(
        format!(
            "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n",
            field, file_name
        )
        .as_bytes(),
    );
    body.extend_from_slice(format!("Content-Type: {}\r\n\r\n", mime).as_bytes());
    body.extend_from_slice(data);
    body.extend_from_slice(format!("\r\n--{}--\r\n", BOUNDARY).as_bytes());

    Request::builder()
        .method("POST")
        .uri("/api/upload")
        .header(
            "content-type",
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from(body))
        .unwrap()
}

#[tokio::test]
async fn plain_text_resume_yields_contact_fields() {
    let app = app(&Config::default());
    let resume = b"John Smith\nBackend Developer\njohn.smith@example.com\nPhone: +44 20 7946 0958\n";

    let (status, body) = send(&app, multipart("resume", "cv.txt", "text/plain", resume)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["fields"]["name"], "John Smith");
    assert_eq!(body["fields"]["email"], "john.smith@example.com");
    assert_eq!(body["fields"]["phone"], "+44 20 7946 0958");
    assert_eq!(body["missing"], serde_json::json!([]));
}

#[tokio::test]
async fn missing_fields_are_reported() {
    let app = app(&Config::default());
    let (status, body) = send(
        &app,
        multipart("resume", "cv.txt", "text/plain", b"objective: build things\n"),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["fields"]["name"].is_null());
    assert_eq!(body["missing"], serde_json::json!(["name", "email", "phone"]));
}

#[tokio::test]
async fn docx_resume_is_read() {
    let mut buf = Cursor::new(Vec::new());
    {
        let mut zip = zip::ZipWriter::new(&mut buf);
        zip.start_file("word/document.xml", zip::write::FileOptions::default())
            .unwrap();
        zip.write_all(
            br#"<?xml version="1.0"?><w:document><w:body><w:p><w:r><w:t>Grace Hopper</w:t></w:r></w:p><w:p><w:r><w:t>grace@navy.mil</w:t></w:r></w:p></w:body></w:document>"#,
        )
        .unwrap();
        zip.finish().unwrap();
    }

    let app = app(&Config::default());
    let (status, body) = send(
        &app,
        multipart(
            "resume",
            "cv.docx",
            "application/octet-stream",
            buf.get_ref(),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["fields"]["name"], "Grace Hopper");
    assert_eq!(body["fields"]["email"], "grace@navy.mil");
    assert_eq!(body["missing"], serde_json::json!(["phone"]));
}

#[tokio::test]
async fn upload_without_resume_field_is_rejected() {
    let app = app(&Config::default());
    let (status, body) = send(&app, multipart("other", "cv.txt", "text/plain", b"x")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "No file uploaded");
}

#[tokio::test]
async fn broken_documents_are_rejected() {
    let app = app(&Config::default());

    let (status, _) = send(
        &app,
        multipart("resume", "cv.pdf", "application/pdf", b"definitely not a pdf"),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = send(&app, multipart("resume", "cv.docx", "application/octet-stream", b"not a zip")).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "Failed to parse file");
}
