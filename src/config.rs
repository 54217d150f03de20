use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Configuration for one scrape run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScraperConfig {
    /// Directory that receives the downloaded images
    #[serde(default = "default_destination_dir")]
    pub destination_dir: PathBuf,

    /// Seconds to wait after each scroll for lazy content to load
    #[serde(default = "default_scroll_pause_secs")]
    pub scroll_pause_secs: f64,

    /// Upper bound on scroll-to-bottom commands
    #[serde(default = "default_max_scrolls")]
    pub max_scrolls: u32,

    /// Per-request timeout in seconds for image downloads
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Extension used when a URL yields no usable filename
    #[serde(default = "default_extension")]
    pub default_extension: String,

    /// Number of downloads in flight at once (1 = strictly sequential)
    #[serde(default = "default_max_concurrency")]
    pub max_concurrency: usize,

    /// URL for the WebDriver instance
    #[serde(default = "default_webdriver_url")]
    pub webdriver_url: String,

    /// Run the browser without a visible window
    #[serde(default = "default_headless")]
    pub headless: bool,

    #[serde(default = "default_window_width")]
    pub window_width: u32,

    #[serde(default = "default_window_height")]
    pub window_height: u32,

    /// User agent sent with image requests
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
}

fn default_destination_dir() -> PathBuf {
    PathBuf::from("fullres_images")
}

fn default_scroll_pause_secs() -> f64 {
    2.0
}

fn default_max_scrolls() -> u32 {
    30
}

fn default_request_timeout_secs() -> u64 {
    10
}

fn default_extension() -> String {
    "jpg".to_string()
}

fn default_max_concurrency() -> usize {
    1
}

fn default_webdriver_url() -> String {
    "http://localhost:4444".to_string()
}

fn default_headless() -> bool {
    true
}

fn default_window_width() -> u32 {
    1920
}

// Tall window so more lazily loaded content is inside the viewport per scroll
fn default_window_height() -> u32 {
    3000
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            destination_dir: default_destination_dir(),
            scroll_pause_secs: default_scroll_pause_secs(),
            max_scrolls: default_max_scrolls(),
            request_timeout_secs: default_request_timeout_secs(),
            default_extension: default_extension(),
            max_concurrency: default_max_concurrency(),
            webdriver_url: default_webdriver_url(),
            headless: default_headless(),
            window_width: default_window_width(),
            window_height: default_window_height(),
            user_agent: None,
        }
    }
}

impl ScraperConfig {
    /// Create a configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration from a JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut file = File::open(path)?;
        let mut contents = String::new();
        file.read_to_string(&mut contents)?;
        Self::from_json(&contents)
    }

    /// Load configuration from a JSON string
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Override the WebDriver URL from `WEBDRIVER_URL` when it is set and non-empty
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(webdriver_url) = std::env::var("WEBDRIVER_URL") {
            if !webdriver_url.is_empty() {
                self.webdriver_url = webdriver_url;
            }
        }
        self
    }

    pub fn with_destination_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.destination_dir = dir.into();
        self
    }

    pub fn with_scroll_pause_secs(mut self, secs: f64) -> Self {
        self.scroll_pause_secs = secs;
        self
    }

    pub fn with_max_scrolls(mut self, max_scrolls: u32) -> Self {
        self.max_scrolls = max_scrolls;
        self
    }

    pub fn with_request_timeout_secs(mut self, secs: u64) -> Self {
        self.request_timeout_secs = secs;
        self
    }

    pub fn with_max_concurrency(mut self, max_concurrency: usize) -> Self {
        self.max_concurrency = max_concurrency;
        self
    }

    pub fn with_webdriver_url(mut self, url: impl Into<String>) -> Self {
        self.webdriver_url = url.into();
        self
    }

    /// Pause between scrolls; negative or non-finite values count as no pause
    pub fn scroll_pause(&self) -> Duration {
        Duration::try_from_secs_f64(self.scroll_pause_secs).unwrap_or(Duration::ZERO)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}
