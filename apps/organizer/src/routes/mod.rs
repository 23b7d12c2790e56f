pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::analysis::handlers;
use crate::state::AppState;

/// Headroom for multipart framing on top of the file size limit.
const MULTIPART_OVERHEAD_BYTES: usize = 64 * 1024;

pub fn build_router(state: AppState) -> Router {
    let body_limit = state
        .config
        .max_file_size_bytes()
        .saturating_add(MULTIPART_OVERHEAD_BYTES);

    Router::new()
        .route("/health", get(health::health_handler))
        // Prompt rendering
        .route(
            "/api/v1/prompts/analyze-file",
            post(handlers::handle_render_analyze_file),
        )
        .route(
            "/api/v1/prompts/embedding-summary",
            post(handlers::handle_render_embedding_summary),
        )
        // Document analysis
        .route("/api/v1/documents/analyze", post(handlers::handle_analyze))
        .route("/api/v1/documents/upload", post(handlers::handle_upload))
        .route(
            "/api/v1/documents/embedding-summary",
            post(handlers::handle_embedding_summary),
        )
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{
        body::{to_bytes, Body},
        http::{header, Request, StatusCode},
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use super::*;
    use crate::analysis::service::tests::StubAnalyzer;
    use crate::config::Config;
    use crate::extract::tests::{build_docx, DOCUMENT_XML};
    use crate::extract::DOCX_MIME;

    fn test_state(stub: Arc<StubAnalyzer>) -> AppState {
        let config = Config::from_lookup(|key| match key {
            "ANTHROPIC_API_KEY" => Some("sk-test".to_string()),
            "MAX_FILE_SIZE_MB" => Some("1".to_string()),
            _ => None,
        })
        .unwrap();
        AppState {
            config,
            analyzer: stub,
        }
    }

    fn app() -> (Router, Arc<StubAnalyzer>) {
        let stub = Arc::new(StubAnalyzer::new());
        (build_router(test_state(stub.clone())), stub)
    }

    fn json_request(uri: &str, body: Value) -> Request<Body> {
        Request::post(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn multipart_request(filename: &str, mime: &str, content: &[u8]) -> Request<Body> {
        let boundary = "organizer-test-boundary";
        let mut body = Vec::new();
        body.extend_from_slice(
            format!(
                "--{boundary}\r\nContent-Disposition: form-data; name=\"created_date\"\r\n\r\n2024-03-15\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(
            format!(
                "--{boundary}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{filename}\"\r\nContent-Type: {mime}\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(content);
        body.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());

        Request::post("/api/v1/documents/upload")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={boundary}"),
            )
            .body(Body::from(body))
            .unwrap()
    }

    async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, body)
    }

    fn invoice_body() -> Value {
        json!({
            "metadata": {
                "current_name": "invoice_2024.pdf",
                "mime_type": "application/pdf",
                "size": 48213,
                "created_date": "2024-03-15"
            },
            "content": "Invoice #1002 from Acme Corp, total $4,500.00 due 2024-04-01."
        })
    }

    #[tokio::test]
    async fn test_health() {
        let (app, _) = app();
        let request = Request::get("/health").body(Body::empty()).unwrap();
        let (status, body) = send(app, request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn test_render_analyze_file_prompt() {
        let (app, _) = app();
        let (status, body) =
            send(app, json_request("/api/v1/prompts/analyze-file", invoice_body())).await;
        assert_eq!(status, StatusCode::OK);
        let prompt = body["prompt"].as_str().unwrap();
        assert!(prompt.contains("Current name: invoice_2024.pdf"));
        assert!(prompt.contains("Size: 48213"));
    }

    #[tokio::test]
    async fn test_render_missing_mime_type_is_400() {
        let (app, _) = app();
        let mut payload = invoice_body();
        payload["metadata"]
            .as_object_mut()
            .unwrap()
            .remove("mime_type");
        let (status, body) = send(app, json_request("/api/v1/prompts/analyze-file", payload)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "MISSING_FIELD");
        assert!(body.get("prompt").is_none());
    }

    #[tokio::test]
    async fn test_render_embedding_summary_prompt() {
        let (app, _) = app();
        let (status, body) = send(
            app,
            json_request(
                "/api/v1/prompts/embedding-summary",
                json!({"content": "Quarterly report"}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["prompt"].as_str().unwrap().ends_with("Quarterly report\n"));
    }

    #[tokio::test]
    async fn test_analyze_returns_report() {
        let (app, stub) = app();
        let (status, body) =
            send(app, json_request("/api/v1/documents/analyze", invoice_body())).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["analysis"]["doc_type"], "invoice");
        assert_eq!(body["validation"]["passed"], true);
        assert_eq!(body["backend"], "stub");
        assert!(stub.last_prompt().contains("File type: application/pdf"));
    }

    #[tokio::test]
    async fn test_embedding_summary_rejects_blank_content() {
        let (app, _) = app();
        let (status, body) = send(
            app,
            json_request("/api/v1/documents/embedding-summary", json!({"content": " "})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_embedding_summary_returns_summary() {
        let (app, _) = app();
        let (status, body) = send(
            app,
            json_request(
                "/api/v1/documents/embedding-summary",
                json!({"content": "Acme invoice"}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["summary"], "Acme invoice for consulting services.");
    }

    #[tokio::test]
    async fn test_upload_text_file() {
        let (app, stub) = app();
        let request = multipart_request("notes.txt", "text/plain", b"Meeting notes with Acme");
        let (status, body) = send(app, request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["content_truncated"], false);
        let prompt = stub.last_prompt();
        assert!(prompt.contains("Current name: notes.txt"));
        assert!(prompt.contains("Size: 23"));
        assert!(prompt.contains("Created: 2024-03-15"));
        assert!(prompt.contains("Meeting notes with Acme"));
    }

    #[tokio::test]
    async fn test_upload_docx_file() {
        let (app, stub) = app();
        let docx = build_docx(DOCUMENT_XML);
        let request = multipart_request("msa.docx", DOCX_MIME, &docx);
        let (status, body) = send(app, request).await;
        assert_eq!(status, StatusCode::OK, "{body}");
        let prompt = stub.last_prompt();
        assert!(prompt.contains("Current name: msa.docx"));
        assert!(prompt.contains("Master Services Agreement\n\nBetween Acme Corp & Globex"));
    }

    #[tokio::test]
    async fn test_upload_invalid_utf8_is_encoding_error() {
        let (app, _) = app();
        let request = multipart_request("bad.txt", "text/plain", &[b'o', b'k', 0xff]);
        let (status, body) = send(app, request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "ENCODING_ERROR");
    }

    #[tokio::test]
    async fn test_upload_unsupported_type_is_415() {
        let (app, _) = app();
        let request = multipart_request("photo.png", "image/png", b"\x89PNG");
        let (status, _) = send(app, request).await;
        assert_eq!(status, StatusCode::UNSUPPORTED_MEDIA_TYPE);
    }

    #[tokio::test]
    async fn test_upload_over_limit_is_413() {
        let (app, _) = app();
        let content = vec![b'a'; 1024 * 1024 + 1];
        let request = multipart_request("big.txt", "text/plain", &content);
        let (status, _) = send(app, request).await;
        assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    }
}
