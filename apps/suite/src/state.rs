use std::sync::Arc;

use crate::content::ResumeDocument;
use crate::download::DownloadControl;
use crate::i18n::Strings;
use crate::llm_client::TextGenerator;
use crate::suite::SharedSuite;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// The one suite controller. Every transition runs under this lock.
    pub suite: SharedSuite,
    /// Remote generation backend. `GeminiClient` in production.
    pub generator: Arc<dyn TextGenerator>,
    pub resume: Arc<ResumeDocument>,
    pub strings: Arc<Strings>,
    pub download: Arc<DownloadControl>,
}
