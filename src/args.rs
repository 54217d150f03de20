use clap::Parser;
use lazy_image_harvester::{Result, ScraperConfig};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "lazy-image-harvester")]
#[command(about = "Downloads full-resolution images from lazily loaded web pages")]
#[command(version)]
pub struct Args {
    /// Page to scrape
    pub url: String,

    /// JSON configuration file; flags below override its values
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Directory to save images into
    #[arg(short, long)]
    pub dest: Option<PathBuf>,

    /// Seconds to wait after each scroll
    #[arg(long)]
    pub scroll_pause: Option<f64>,

    /// Maximum number of scrolls
    #[arg(long)]
    pub max_scrolls: Option<u32>,

    /// Per-image request timeout in seconds
    #[arg(short, long)]
    pub timeout: Option<u64>,

    /// Number of concurrent downloads
    #[arg(long)]
    pub concurrency: Option<usize>,

    /// WebDriver server URL (also read from WEBDRIVER_URL)
    #[arg(long)]
    pub webdriver_url: Option<String>,
}

impl Args {
    /// Builds the run configuration: file or defaults, then environment, then flags
    pub fn to_config(&self) -> Result<ScraperConfig> {
        let mut config = match &self.config {
            Some(path) => ScraperConfig::from_file(path)?,
            None => ScraperConfig::default(),
        }
        .with_env_overrides();

        if let Some(dest) = &self.dest {
            config = config.with_destination_dir(dest);
        }
        if let Some(pause) = self.scroll_pause {
            config = config.with_scroll_pause_secs(pause);
        }
        if let Some(max_scrolls) = self.max_scrolls {
            config = config.with_max_scrolls(max_scrolls);
        }
        if let Some(timeout) = self.timeout {
            config = config.with_request_timeout_secs(timeout);
        }
        if let Some(concurrency) = self.concurrency {
            config = config.with_max_concurrency(concurrency);
        }
        if let Some(url) = &self.webdriver_url {
            config = config.with_webdriver_url(url);
        }
        Ok(config)
    }
}
