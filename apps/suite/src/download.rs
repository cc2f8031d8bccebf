//! Résumé PDF download.
//!
//! The PDF is pre-rendered at build time and served as-is. The control tracks
//! whether a download is outstanding so the page can disable the button and
//! show the busy label; the busy flag is owned by a guard and is cleared on
//! every exit path, including errors and cancelled requests.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};

use tracing::{debug, warn};

pub struct DownloadControl {
    path: PathBuf,
    filename: String,
    busy: AtomicBool,
}

/// Clears the busy flag when dropped.
pub struct DownloadGuard<'a> {
    control: &'a DownloadControl,
}

impl Drop for DownloadGuard<'_> {
    fn drop(&mut self) {
        self.control.busy.store(false, Ordering::Release);
        debug!("Download control released");
    }
}

impl DownloadControl {
    pub fn new(path: impl Into<PathBuf>, filename: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            filename: filename.into(),
            busy: AtomicBool::new(false),
        }
    }

    pub fn filename(&self) -> &str {
        &self.filename
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    /// Marks the control busy. `None` if a download is already outstanding.
    pub fn try_begin(&self) -> Option<DownloadGuard<'_>> {
        self.busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| DownloadGuard { control: self })
    }

    /// Reads the PDF while holding `guard`.
    pub async fn read(&self, _guard: &DownloadGuard<'_>) -> std::io::Result<Vec<u8>> {
        tokio::fs::read(&self.path).await.map_err(|e| {
            warn!("Failed to read PDF {}: {e}", self.path.display());
            e
        })
    }

    /// `Content-Disposition` value with an ASCII fallback name and the exact
    /// UTF-8 name in `filename*`.
    pub fn content_disposition(&self) -> String {
        let fallback: String = self
            .filename
            .chars()
            .map(|c| {
                if c.is_ascii_graphic() && c != '"' && c != '\\' {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        format!(
            "attachment; filename=\"{fallback}\"; filename*=UTF-8''{}",
            urlencoding::encode(&self.filename)
        )
    }
}
