mod config;
mod errors;
mod extract;
mod llm_client;
mod render;
mod routes;
mod state;
mod tailoring;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::{Config, PdfRendererKind};
use crate::extract::Extractor;
use crate::llm_client::{OpenAiClient, RetryPolicy, RetryingClient, TokioSleeper};
use crate::render::{LibreOfficeBackend, NativePdfBackend, PdfBackend, Renderer};
use crate::routes::build_router;
use crate::state::AppState;
use crate::tailoring::generator::CompletionSettings;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first; a missing API key stops startup here
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Tailor API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize completion client
    let openai = OpenAiClient::new(
        &config.openai_base_url,
        config.openai_api_key.clone(),
        config.request_timeout,
    )
    .context("Failed to build HTTP client")?;
    let policy = RetryPolicy {
        max_retries: config.max_retries,
        base_delay: config.backoff_base,
        ..RetryPolicy::default()
    };
    let llm = RetryingClient::new(openai, policy, Arc::new(TokioSleeper));
    let completion = CompletionSettings::from(&config);
    info!(
        "Completion client initialized (model: {}, retries: {})",
        completion.model, policy.max_retries
    );

    let renderer = Renderer::new(select_pdf_backend(&config).await);
    info!("PDF renderer: {}", renderer.pdf_backend_name());

    let port = config.port;
    let state = AppState {
        config: Arc::new(config),
        extractor: Extractor::new(),
        llm: Arc::new(llm),
        completion,
        renderer,
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{port}").parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// LibreOffice when requested and runnable, otherwise the native backend.
async fn select_pdf_backend(config: &Config) -> Arc<dyn PdfBackend> {
    match config.pdf_renderer {
        PdfRendererKind::Native => Arc::new(NativePdfBackend),
        PdfRendererKind::LibreOffice => {
            let backend = LibreOfficeBackend::new(&config.soffice_path, config.conversion_timeout);
            match backend.version().await {
                Ok(version) => {
                    info!("Using LibreOffice for PDF output ({version})");
                    Arc::new(backend)
                }
                Err(e) => {
                    warn!(
                        "LibreOffice at '{}' is not usable ({e}); falling back to native PDF",
                        config.soffice_path
                    );
                    Arc::new(NativePdfBackend)
                }
            }
        }
    }
}
