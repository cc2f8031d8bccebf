mod config;
mod content;
mod download;
mod errors;
mod i18n;
mod key_store;
mod llm_client;
mod routes;
mod state;
mod suite;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::sync::Mutex;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::content::ResumeDocument;
use crate::download::DownloadControl;
use crate::i18n::Strings;
use crate::key_store::{FileStorage, KeyStore, KeyValueStorage, MemoryStorage};
use crate::llm_client::prompts::PromptTemplates;
use crate::llm_client::GeminiClient;
use crate::routes::build_router;
use crate::state::AppState;
use crate::suite::SuiteController;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on malformed values)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "{}={}",
                env!("CARGO_PKG_NAME").replace('-', "_"),
                &config.rust_log
            ))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Career Suite v{}", env!("CARGO_PKG_VERSION"));

    // Page content and localized text
    let resume = Arc::new(ResumeDocument::load(&config.resume_path)?);
    let strings = Arc::new(Strings::load(config.locale, config.strings_path.as_deref())?);
    info!("Locale: {:?}", config.locale);

    // Credential: build-time key → stored key → none
    let storage: Box<dyn KeyValueStorage> = match &config.key_store_path {
        Some(path) => {
            info!("Key storage: {}", path.display());
            Box::new(FileStorage::new(path))
        }
        None => {
            info!("Key storage: in-memory (not persisted)");
            Box::new(MemoryStorage::new())
        }
    };
    let key_store = KeyStore::resolve(config.build_api_key.as_deref(), storage);

    // Initialize LLM client
    let generator =
        Arc::new(GeminiClient::new(&config.api_base).context("Failed to build HTTP client")?);
    info!("LLM client initialized (model: {})", llm_client::MODEL);

    let suite = SuiteController::new(
        key_store,
        strings.clone(),
        PromptTemplates::for_locale(config.locale),
        resume.clone(),
    );

    if !config.pdf_path.exists() {
        tracing::warn!(
            "PDF {} not found; downloads will fail until it is built",
            config.pdf_path.display()
        );
    }

    // Build app state
    let state = AppState {
        suite: Arc::new(Mutex::new(suite)),
        generator,
        resume,
        strings,
        download: Arc::new(DownloadControl::new(
            &config.pdf_path,
            config.pdf_filename.clone(),
        )),
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
