use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Result of fetching a single image reference
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DownloadOutcome {
    /// Saved to this path
    Success(PathBuf),
    /// The server answered with a status other than 200
    HttpFailure(u16),
    /// Connection, timeout or body transfer error
    TransportError(String),
}

impl DownloadOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, DownloadOutcome::Success(_))
    }
}

impl fmt::Display for DownloadOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DownloadOutcome::Success(path) => write!(f, "saved to {}", path.display()),
            DownloadOutcome::HttpFailure(status) => write!(f, "HTTP status {}", status),
            DownloadOutcome::TransportError(reason) => write!(f, "{}", reason),
        }
    }
}

/// One image reference and what happened to it
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Download {
    pub url: String,
    pub outcome: DownloadOutcome,
}

impl Download {
    pub fn new(url: String, outcome: DownloadOutcome) -> Self {
        Self { url, outcome }
    }
}

/// Summary of a complete scrape
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScrapeReport {
    /// Page URL after redirects
    pub page_url: String,

    /// Number of distinct image references found on the page
    pub discovered: usize,

    /// One entry per reference dispatched for download
    pub downloads: Vec<Download>,
}

impl ScrapeReport {
    pub fn saved(&self) -> impl Iterator<Item = &Download> {
        self.downloads.iter().filter(|d| d.outcome.is_success())
    }

    pub fn failures(&self) -> impl Iterator<Item = &Download> {
        self.downloads.iter().filter(|d| !d.outcome.is_success())
    }
}
