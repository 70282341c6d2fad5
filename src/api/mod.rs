//! HTTP surface of the conversion service.

pub mod handlers;

use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub use handlers::{ApiError, AppState};

/// Build the service router.
pub fn router(state: Arc<AppState>) -> Router {
    let body_limit = state.config.max_upload_bytes;

    Router::new()
        .route("/", get(handlers::root))
        .route("/health", get(handlers::health_check))
        .route("/convert/url", post(handlers::convert_url))
        .route("/convert/file", post(handlers::convert_file))
        .route("/chunk", post(handlers::chunk))
        .with_state(state)
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Request, StatusCode};
    use pretty_assertions::assert_eq;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use crate::chunkers::TokenizerProvider;
    use crate::convert::BuiltinConverter;
    use crate::pipeline::ConversionPipeline;
    use crate::testing::{sample_pdf, words, StaticFetcher, WhitespaceCounter};
    use crate::types::ServiceConfig;

    const GUIDE_URL: &str = "https://example.com/guide.md";
    const PDF_URL: &str = "https://example.com/sample.pdf";
    const BOUNDARY: &str = "XBOUNDARYX";

    fn guide() -> String {
        let mut content = String::from("# Intro\n\n");
        for i in 0..5 {
            content.push_str(&words(&format!("p{}", i), 30));
            content.push_str("\n\n");
        }
        content
    }

    fn app() -> Router {
        let pdf = sample_pdf(&["Page number 1 text", "Page number 2 text", "Page number 3 text"]);
        let fetcher = StaticFetcher::new()
            .with(GUIDE_URL, guide(), Some("text/markdown"))
            .with(PDF_URL, pdf, Some("application/pdf"));
        let pipeline = ConversionPipeline::new(
            Arc::new(fetcher),
            Arc::new(BuiltinConverter::new()),
            TokenizerProvider::preloaded(Arc::new(WhitespaceCounter)),
        );
        router(Arc::new(AppState {
            pipeline,
            config: ServiceConfig::default(),
        }))
    }

    fn post_json(uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    /// Multipart body with an optional file part and an optional format part.
    fn post_multipart(file: Option<(&str, &[u8])>, format: Option<&str>) -> Request<Body> {
        let mut body: Vec<u8> = Vec::new();
        if let Some(format) = format {
            body.extend_from_slice(
                format!(
                    "--{}\r\nContent-Disposition: form-data; name=\"output_format\"\r\n\r\n{}\r\n",
                    BOUNDARY, format
                )
                .as_bytes(),
            );
        }
        if let Some((filename, bytes)) = file {
            body.extend_from_slice(
                format!(
                    "--{}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{}\"\r\nContent-Type: application/octet-stream\r\n\r\n",
                    BOUNDARY, filename
                )
                .as_bytes(),
            );
            body.extend_from_slice(bytes);
            body.extend_from_slice(b"\r\n");
        }
        body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());

        Request::builder()
            .method("POST")
            .uri("/convert/file")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={}", BOUNDARY),
            )
            .body(Body::from(body))
            .unwrap()
    }

    async fn send(request: Request<Body>) -> (StatusCode, Value) {
        let response = app().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_health() {
        let request = Request::builder().uri("/health").body(Body::empty()).unwrap();
        let (status, body) = send(request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "status": "healthy" }));
    }

    #[tokio::test]
    async fn test_root_descriptor() {
        let request = Request::builder().uri("/").body(Body::empty()).unwrap();
        let (status, body) = send(request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "running");
        assert_eq!(body["endpoints"]["chunk"], "/chunk");
    }

    #[tokio::test]
    async fn test_convert_url_success() {
        let request = post_json(
            "/convert/url",
            json!({ "url": GUIDE_URL, "output_format": "Markdown" }),
        );
        let (status, body) = send(request).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert_eq!(body["error"], Value::Null);
        assert_eq!(
            body["metadata"],
            json!({ "num_pages": null, "source": GUIDE_URL, "format": "markdown" })
        );
        assert!(body["content"].as_str().unwrap().starts_with("# Intro"));
    }

    #[tokio::test]
    async fn test_convert_url_pdf() {
        let request = post_json(
            "/convert/url",
            json!({ "url": PDF_URL, "output_format": "markdown" }),
        );
        let (status, body) = send(request).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert_eq!(
            body["metadata"],
            json!({ "num_pages": 3, "source": PDF_URL, "format": "markdown" })
        );
        assert_eq!(
            body["content"],
            "Page number 1 text\n\nPage number 2 text\n\nPage number 3 text"
        );
    }

    #[tokio::test]
    async fn test_convert_url_unsupported_format() {
        let request = post_json("/convert/url", json!({ "url": GUIDE_URL, "output_format": "xml" }));
        let (status, body) = send(request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({ "detail": "Unsupported output format: xml" }));
    }

    #[tokio::test]
    async fn test_convert_url_fetch_failure_is_logical() {
        let request = post_json(
            "/convert/url",
            json!({ "url": "https://example.com/missing.pdf" }),
        );
        let (status, body) = send(request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], false);
        assert_eq!(body["content"], Value::Null);
        assert_eq!(body["metadata"], Value::Null);
        assert!(body["error"].as_str().unwrap().contains("404"));
    }

    #[tokio::test]
    async fn test_invalid_url_rejected() {
        for url in ["not a url", "ftp://example.com/a.pdf"] {
            let request = post_json("/convert/url", json!({ "url": url }));
            let (status, body) = send(request).await;
            assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
            assert!(body["detail"].as_str().unwrap().starts_with("Invalid URL"));
        }
    }

    #[tokio::test]
    async fn test_convert_file_success() {
        let request = post_multipart(Some(("notes.md", b"# Notes\n\nHello.\n")), Some("html"));
        let (status, body) = send(request).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert_eq!(
            body["metadata"],
            json!({ "num_pages": null, "filename": "notes.md", "format": "html" })
        );
        assert!(body["content"].as_str().unwrap().contains("<h1>Notes</h1>"));
    }

    #[tokio::test]
    async fn test_convert_empty_file() {
        let request = post_multipart(Some(("empty.pdf", b"")), None);
        let (status, body) = send(request).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], false);
        assert_eq!(body["error"], "uploaded file 'empty.pdf' is empty");
    }

    #[tokio::test]
    async fn test_convert_file_requires_file_field() {
        let request = post_multipart(None, Some("markdown"));
        let (status, body) = send(request).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["detail"], "Missing multipart field 'file'");
    }

    #[tokio::test]
    async fn test_convert_file_rejects_non_multipart_body() {
        let request = post_json("/convert/file", json!({ "file": "notes.md" }));
        let (status, body) = send(request).await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(body["detail"].is_string());
    }

    #[tokio::test]
    async fn test_convert_file_unsupported_format() {
        let request = post_multipart(Some(("notes.md", b"# Notes\n")), Some("pdf"));
        let (status, _) = send(request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_chunk_merges_peers() {
        let request = post_json("/chunk", json!({ "url": GUIDE_URL, "max_tokens": 100 }));
        let (status, body) = send(request).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert_eq!(body["total_chunks"], 2);
        assert_eq!(body["total_tokens"], 150);

        let chunks = body["chunks"].as_array().unwrap();
        assert_eq!(chunks[0]["chunk"], 0);
        assert_eq!(chunks[1]["chunk"], 1);
        assert_eq!(chunks[0]["tokens"], 90);
        assert_eq!(chunks[0]["metadata"]["headings"], json!(["Intro"]));
        assert_eq!(
            chunks[0]["chunk_size"],
            chunks[0]["content"].as_str().unwrap().chars().count()
        );
    }

    #[tokio::test]
    async fn test_chunk_zero_max_tokens_rejected() {
        let request = post_json("/chunk", json!({ "url": GUIDE_URL, "max_tokens": 0 }));
        let (status, _) = send(request).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn test_chunk_failure_has_null_fields() {
        let request = post_json("/chunk", json!({ "url": "https://example.com/missing.md" }));
        let (status, body) = send(request).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], false);
        assert_eq!(body["chunks"], Value::Null);
        assert_eq!(body["total_chunks"], Value::Null);
        assert_eq!(body["total_tokens"], Value::Null);
    }
}
