use std::sync::Arc;

use crate::config::Config;
use crate::extract::Extractor;
use crate::llm_client::CompletionService;
use crate::render::Renderer;
use crate::tailoring::generator::CompletionSettings;

/// Shared application state injected into all route handlers via Axum extractors.
/// Nothing in here is mutable; requests share no data beyond configuration.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub extractor: Extractor,
    /// Retrying completion client. Tests swap in a scripted service.
    pub llm: Arc<dyn CompletionService>,
    pub completion: CompletionSettings,
    /// PDF backend chosen at startup; DOCX and text writers are fixed.
    pub renderer: Renderer,
}
