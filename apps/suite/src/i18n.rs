//! Localized string table.
//!
//! The suite never hardcodes user-facing text: every label, title and error
//! message is looked up here. English and Spanish tables are built in; a
//! deployment can replace the active table with a JSON file of the same shape.

use std::path::Path;
use std::str::FromStr;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    En,
    Es,
}

impl FromStr for Locale {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "en" | "english" => Ok(Locale::En),
            "es" | "español" | "spanish" => Ok(Locale::Es),
            other => anyhow::bail!("unsupported locale '{other}'"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Strings {
    /// Busy label shown on the download control.
    pub generating: String,
    pub download: String,
    pub pdf_error: String,
    pub connection_error: String,
    pub no_key: String,
    pub key_from_build: String,
    pub key_from_browser: String,
    pub clear_key: String,
    pub configure_key: String,
    pub interview_question_label: String,
    pub cover_letter: CoverLetterStrings,
    pub gap_analysis: GapAnalysisStrings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoverLetterStrings {
    pub title: String,
    pub company_placeholder: String,
    pub role_placeholder: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GapAnalysisStrings {
    pub title: String,
    pub placeholder: String,
}

impl Strings {
    pub fn for_locale(locale: Locale) -> Self {
        match locale {
            Locale::En => Self::english(),
            Locale::Es => Self::spanish(),
        }
    }

    /// Loads the table for `locale`, replaced wholesale by `override_path` when given.
    pub fn load(locale: Locale, override_path: Option<&Path>) -> Result<Self> {
        let Some(path) = override_path else {
            return Ok(Self::for_locale(locale));
        };
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read string table {}", path.display()))?;
        serde_json::from_str(&raw)
            .with_context(|| format!("Invalid string table {}", path.display()))
    }

    fn english() -> Self {
        Strings {
            generating: "Generating...".to_string(),
            download: "Download PDF".to_string(),
            pdf_error: "Could not generate the PDF. Please try again.".to_string(),
            connection_error: "Connection error. Please check your API key and try again."
                .to_string(),
            no_key: "No API key configured".to_string(),
            key_from_build: "API key loaded from build".to_string(),
            key_from_browser: "API key saved in this browser".to_string(),
            clear_key: "Clear key".to_string(),
            configure_key: "Configure key".to_string(),
            interview_question_label: "Interview Question".to_string(),
            cover_letter: CoverLetterStrings {
                title: "Cover Letter".to_string(),
                company_placeholder: "Company name".to_string(),
                role_placeholder: "Role (optional)".to_string(),
            },
            gap_analysis: GapAnalysisStrings {
                title: "Skills Gap Analysis".to_string(),
                placeholder: "Your dream job title".to_string(),
            },
        }
    }

    fn spanish() -> Self {
        Strings {
            generating: "Generando...".to_string(),
            download: "Descargar PDF".to_string(),
            pdf_error: "No se pudo generar el PDF. Inténtalo de nuevo.".to_string(),
            connection_error: "Error de conexión. Revisa tu clave API e inténtalo de nuevo."
                .to_string(),
            no_key: "No hay clave API configurada".to_string(),
            key_from_build: "Clave API cargada en la compilación".to_string(),
            key_from_browser: "Clave API guardada en este navegador".to_string(),
            clear_key: "Borrar clave".to_string(),
            configure_key: "Configurar clave".to_string(),
            interview_question_label: "Pregunta de entrevista".to_string(),
            cover_letter: CoverLetterStrings {
                title: "Carta de presentación".to_string(),
                company_placeholder: "Nombre de la empresa".to_string(),
                role_placeholder: "Puesto (opcional)".to_string(),
            },
            gap_analysis: GapAnalysisStrings {
                title: "Análisis de brechas".to_string(),
                placeholder: "El puesto de tus sueños".to_string(),
            },
        }
    }
}
