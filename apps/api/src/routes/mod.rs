pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::extract::handlers::handle_extract;
use crate::render::handlers::handle_render;
use crate::state::AppState;
use crate::tailoring::handlers::handle_tailor;

pub fn build_router(state: AppState) -> Router {
    let body_limit = state.config.max_upload_bytes;

    Router::new()
        .route("/health", get(health::health_handler))
        .route("/api/v1/extract", post(handle_extract))
        .route("/api/v1/resumes/tailor", post(handle_tailor))
        .route("/api/v1/render/:format", post(handle_render))
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    use async_trait::async_trait;
    use axum::{
        body::Body,
        http::{header, Request, StatusCode},
        response::Response,
    };
    use serde_json::Value;
    use tower::ServiceExt;

    use super::*;
    use crate::config::{Config, PdfRendererKind};
    use crate::extract::Extractor;
    use crate::llm_client::{ChatRequest, CompletionError, CompletionResult, CompletionService};
    use crate::render::{NativePdfBackend, Renderer};
    use crate::tailoring::generator::CompletionSettings;

    const BOUNDARY: &str = "tailor-test-boundary";

    struct FakeLlm {
        reply: CompletionResult,
        prompts: Mutex<Vec<ChatRequest>>,
    }

    impl FakeLlm {
        fn new(reply: CompletionResult) -> Arc<Self> {
            Arc::new(Self {
                reply,
                prompts: Mutex::new(Vec::new()),
            })
        }

        fn calls(&self) -> usize {
            self.prompts.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl CompletionService for FakeLlm {
        async fn complete(&self, request: &ChatRequest) -> CompletionResult {
            self.prompts.lock().unwrap().push(request.clone());
            self.reply.clone()
        }
    }

    fn test_config() -> Config {
        Config {
            openai_api_key: "sk-test".into(),
            openai_base_url: "http://127.0.0.1:9".into(),
            default_model: "gpt-3.5-turbo".into(),
            temperature: 0.2,
            max_tokens: 1500,
            max_retries: 0,
            backoff_base: Duration::from_millis(1),
            request_timeout: Duration::from_secs(5),
            pdf_renderer: PdfRendererKind::Native,
            soffice_path: "soffice".into(),
            conversion_timeout: Duration::from_secs(5),
            max_upload_bytes: 64 * 1024,
            port: 0,
            rust_log: "info".into(),
        }
    }

    fn app(llm: Arc<FakeLlm>) -> Router {
        let config = test_config();
        let state = AppState {
            completion: CompletionSettings::from(&config),
            config: Arc::new(config),
            extractor: Extractor::new(),
            llm,
            renderer: Renderer::new(Arc::new(NativePdfBackend)),
        };
        build_router(state)
    }

    /// (field name, optional filename, value)
    fn multipart(parts: &[(&str, Option<&str>, &str)]) -> Body {
        let mut body = String::new();
        for (name, filename, value) in parts {
            body.push_str(&format!("--{BOUNDARY}\r\n"));
            match filename {
                Some(f) => body.push_str(&format!(
                    "Content-Disposition: form-data; name=\"{name}\"; filename=\"{f}\"\r\nContent-Type: application/octet-stream\r\n\r\n"
                )),
                None => body.push_str(&format!(
                    "Content-Disposition: form-data; name=\"{name}\"\r\n\r\n"
                )),
            }
            body.push_str(value);
            body.push_str("\r\n");
        }
        body.push_str(&format!("--{BOUNDARY}--\r\n"));
        Body::from(body)
    }

    fn multipart_request(uri: &str, parts: &[(&str, Option<&str>, &str)]) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(multipart(parts))
            .unwrap()
    }

    fn json_request(uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn body_bytes(response: Response) -> Vec<u8> {
        axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap()
            .to_vec()
    }

    async fn body_json(response: Response) -> Value {
        serde_json::from_slice(&body_bytes(response).await).unwrap()
    }

    const RESUME: &str = "Jane Doe\nBackend engineer\nEXPERIENCE\n- Built payment APIs";
    const JOB: &str = "Senior Rust engineer for payments infrastructure";
    const REPLY: &str = "Jane Doe\nSUMMARY\nRust engineer\nSKILLS:\n- Rust\n- SQL";

    #[tokio::test]
    async fn test_health_reports_backend() {
        let response = app(FakeLlm::new(Ok(String::new())))
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["status"], "ok");
        assert_eq!(body["pdf_renderer"], "native");
    }

    #[tokio::test]
    async fn test_tailor_happy_path() {
        let llm = FakeLlm::new(Ok(REPLY.to_string()));
        let response = app(llm.clone())
            .oneshot(multipart_request(
                "/api/v1/resumes/tailor",
                &[
                    ("resume", Some("resume.txt"), RESUME),
                    ("job_description", None, JOB),
                    ("tone", None, "formal"),
                ],
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["candidate_name"], "Jane Doe");
        assert_eq!(body["tone"], "formal");
        assert_eq!(body["model"], "gpt-3.5-turbo");
        assert_eq!(body["tailored_text"], REPLY);

        assert_eq!(llm.calls(), 1);
        let prompt = llm.prompts.lock().unwrap()[0].messages.last().unwrap().content.clone();
        assert!(prompt.contains("Built payment APIs"));
        assert!(prompt.contains(JOB));
        assert!(prompt.contains("formal"));
    }

    #[tokio::test]
    async fn test_model_override_is_forwarded() {
        let llm = FakeLlm::new(Ok(REPLY.to_string()));
        let response = app(llm.clone())
            .oneshot(multipart_request(
                "/api/v1/resumes/tailor",
                &[
                    ("resume", Some("resume.txt"), RESUME),
                    ("job_description", Some("job.txt"), JOB),
                    ("model", None, "gpt-4o-mini"),
                ],
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(llm.prompts.lock().unwrap()[0].model, "gpt-4o-mini");
    }

    #[tokio::test]
    async fn test_blank_resume_is_rejected_before_any_completion_call() {
        let llm = FakeLlm::new(Ok(REPLY.to_string()));
        let response = app(llm.clone())
            .oneshot(multipart_request(
                "/api/v1/resumes/tailor",
                &[
                    ("resume", Some("resume.txt"), "   \n  "),
                    ("job_description", None, JOB),
                ],
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body_json(response).await["error"]["code"], "EMPTY_INPUT");
        assert_eq!(llm.calls(), 0);
    }

    #[tokio::test]
    async fn test_tailor_upload_validation() {
        let llm = FakeLlm::new(Ok(REPLY.to_string()));

        let missing_job = app(llm.clone())
            .oneshot(multipart_request(
                "/api/v1/resumes/tailor",
                &[("resume", Some("resume.txt"), RESUME)],
            ))
            .await
            .unwrap();
        assert_eq!(missing_job.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(missing_job).await["error"]["code"], "VALIDATION_ERROR");

        let bad_tone = app(llm.clone())
            .oneshot(multipart_request(
                "/api/v1/resumes/tailor",
                &[
                    ("resume", Some("resume.txt"), RESUME),
                    ("job_description", None, JOB),
                    ("tone", None, "sarcastic"),
                ],
            ))
            .await
            .unwrap();
        assert_eq!(bad_tone.status(), StatusCode::BAD_REQUEST);

        let bad_extension = app(llm.clone())
            .oneshot(multipart_request(
                "/api/v1/resumes/tailor",
                &[
                    ("resume", Some("resume.exe"), RESUME),
                    ("job_description", None, JOB),
                ],
            ))
            .await
            .unwrap();
        assert_eq!(bad_extension.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            body_json(bad_extension).await["error"]["code"],
            "UNSUPPORTED_DOCUMENT"
        );

        assert_eq!(llm.calls(), 0);
    }

    #[tokio::test]
    async fn test_rate_limit_surfaces_as_429() {
        let llm = FakeLlm::new(Err(CompletionError::RateLimited {
            message: "Rate limit reached".into(),
            retry_after: None,
        }));
        let response = app(llm)
            .oneshot(multipart_request(
                "/api/v1/resumes/tailor",
                &[
                    ("resume", Some("resume.txt"), RESUME),
                    ("job_description", None, JOB),
                ],
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(body_json(response).await["error"]["code"], "LLM_RATE_LIMITED");
    }

    #[tokio::test]
    async fn test_extract_endpoint_returns_text() {
        let response = app(FakeLlm::new(Ok(String::new())))
            .oneshot(multipart_request(
                "/api/v1/extract",
                &[("file", Some("resume.txt"), RESUME)],
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["format"], "text");
        assert_eq!(body["text"], RESUME);
        assert_eq!(body["usable"], true);
    }

    #[tokio::test]
    async fn test_oversized_upload_is_rejected() {
        let big = "x".repeat(128 * 1024);
        let llm = FakeLlm::new(Ok(REPLY.to_string()));

        let tailor = app(llm.clone())
            .oneshot(multipart_request(
                "/api/v1/resumes/tailor",
                &[
                    ("resume", Some("resume.txt"), &big),
                    ("job_description", None, JOB),
                ],
            ))
            .await
            .unwrap();
        assert_eq!(tailor.status(), StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(body_json(tailor).await["error"]["code"], "MALFORMED_UPLOAD");
        assert_eq!(llm.calls(), 0);

        let extract = app(llm.clone())
            .oneshot(multipart_request(
                "/api/v1/extract",
                &[("file", Some("resume.txt"), &big)],
            ))
            .await
            .unwrap();
        assert_eq!(extract.status(), StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(body_json(extract).await["error"]["code"], "MALFORMED_UPLOAD");
    }

    #[tokio::test]
    async fn test_render_text_download() {
        let response = app(FakeLlm::new(Ok(String::new())))
            .oneshot(json_request(
                "/api/v1/render/txt",
                serde_json::json!({ "text": REPLY, "candidate_name": "Jane Doe" }),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::CONTENT_DISPOSITION],
            "attachment; filename=\"tailored_resume.txt\""
        );
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "text/plain; charset=utf-8"
        );
        assert_eq!(body_bytes(response).await, REPLY.as_bytes());
    }

    #[tokio::test]
    async fn test_render_pdf_and_docx_downloads() {
        let pdf = app(FakeLlm::new(Ok(String::new())))
            .oneshot(json_request(
                "/api/v1/render/pdf",
                serde_json::json!({ "text": REPLY }),
            ))
            .await
            .unwrap();
        assert_eq!(pdf.status(), StatusCode::OK);
        assert_eq!(pdf.headers()[header::CONTENT_TYPE], "application/pdf");
        assert!(body_bytes(pdf).await.starts_with(b"%PDF"));

        let docx = app(FakeLlm::new(Ok(String::new())))
            .oneshot(json_request(
                "/api/v1/render/docx",
                serde_json::json!({ "text": REPLY, "candidate_name": "Jane Doe" }),
            ))
            .await
            .unwrap();
        assert_eq!(docx.status(), StatusCode::OK);
        assert_eq!(
            docx.headers()[header::CONTENT_DISPOSITION],
            "attachment; filename=\"tailored_resume.docx\""
        );
        assert!(body_bytes(docx).await.starts_with(b"PK"));
    }

    #[tokio::test]
    async fn test_render_rejects_bad_input() {
        let unknown = app(FakeLlm::new(Ok(String::new())))
            .oneshot(json_request(
                "/api/v1/render/odt",
                serde_json::json!({ "text": REPLY }),
            ))
            .await
            .unwrap();
        assert_eq!(unknown.status(), StatusCode::BAD_REQUEST);

        let empty = app(FakeLlm::new(Ok(String::new())))
            .oneshot(json_request(
                "/api/v1/render/pdf",
                serde_json::json!({ "text": "  \n " }),
            ))
            .await
            .unwrap();
        assert_eq!(empty.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(empty).await["error"]["code"], "VALIDATION_ERROR");

        let malformed = app(FakeLlm::new(Ok(String::new())))
            .oneshot(json_request(
                "/api/v1/render/txt",
                serde_json::json!({ "body": "wrong field" }),
            ))
            .await
            .unwrap();
        assert_eq!(malformed.status(), StatusCode::BAD_REQUEST);
    }
}
