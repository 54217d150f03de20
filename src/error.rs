use fantoccini::error::CmdError;

/// Errors that abort a scrape run.
///
/// Per-image download failures are not represented here; they are reported as
/// [`DownloadOutcome`](crate::results::DownloadOutcome) values so one bad
/// image never stops the batch.
#[derive(Debug, thiserror::Error)]
pub enum ScrapeError {
    /// No WebDriver endpoint accepted a new session
    #[error("failed to start a WebDriver session at {url}: {reason}")]
    WebDriverConnect { url: String, reason: String },

    /// The browser could not load the target page
    #[error("failed to load {url}: {source}")]
    Navigation {
        url: String,
        #[source]
        source: CmdError,
    },

    /// Any other WebDriver command failure while scrolling or taking the snapshot
    #[error("browser command failed: {0}")]
    Browser(#[from] CmdError),

    /// A page script returned something other than what was asked for
    #[error("unexpected script result: {0}")]
    UnexpectedScript(String),

    #[error("invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("failed to build HTTP client: {0}")]
    HttpClient(#[from] reqwest::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid configuration: {0}")]
    Config(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ScrapeError>;
