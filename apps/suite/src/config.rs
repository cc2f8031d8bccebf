use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::i18n::Locale;

const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com";

/// Application configuration loaded from environment variables.
/// Every variable has a default; only malformed values fail startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub rust_log: String,
    /// Key injected at build/deploy time. Takes priority over the stored key.
    pub build_api_key: Option<String>,
    pub api_base: String,
    /// `None` when persistence is disabled (`KEY_STORE_PATH` set but empty).
    pub key_store_path: Option<PathBuf>,
    pub locale: Locale,
    /// Optional JSON file overriding the built-in string table.
    pub strings_path: Option<PathBuf>,
    pub resume_path: PathBuf,
    pub pdf_path: PathBuf,
    pub pdf_filename: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let pdf_path = PathBuf::from(env_or("PDF_PATH", "CV_english.pdf"));
        let pdf_filename = match optional_env("PDF_FILENAME") {
            Some(name) => name,
            None => default_download_name(&pdf_path),
        };

        Ok(Config {
            port: env_or("PORT", "8080")
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: env_or("RUST_LOG", "info"),
            build_api_key: optional_env("GEMINI_API_KEY"),
            api_base: env_or("GEMINI_API_BASE", DEFAULT_API_BASE),
            key_store_path: key_store_path(),
            locale: env_or("LOCALE", "en")
                .parse::<Locale>()
                .context("LOCALE must be one of: en, es")?,
            strings_path: optional_env("STRINGS_PATH").map(PathBuf::from),
            resume_path: PathBuf::from(env_or("RESUME_PATH", "CV_english.html")),
            pdf_path,
            pdf_filename,
        })
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Returns the variable only when it is set to something other than whitespace.
/// Surrounding quotes are stripped, matching how `.env` values are often written.
fn optional_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().trim_matches('"').trim_matches('\'').to_string())
        .filter(|v| !v.is_empty())
}

fn key_store_path() -> Option<PathBuf> {
    match std::env::var("KEY_STORE_PATH") {
        Ok(path) if path.trim().is_empty() => None,
        Ok(path) => Some(PathBuf::from(path)),
        Err(_) => Some(PathBuf::from(".career-suite/credentials.json")),
    }
}

fn default_download_name(path: &Path) -> String {
    path.file_name()
        .and_then(|n| n.to_str())
        .map(str::to_string)
        .unwrap_or_else(|| "resume.pdf".to_string())
}
