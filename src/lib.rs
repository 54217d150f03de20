//! Downloads full-resolution images from pages that load them lazily.
//!
//! A page is rendered in a WebDriver-controlled browser and scrolled until it
//! stops growing, image references are pulled out of lazy-load attributes,
//! `srcset` lists, `<picture>` sources and inline background styles, and each
//! distinct reference is downloaded to a local directory.

pub mod browser;
pub mod config;
pub mod error;
pub mod extract;
pub mod orchestrator;
pub mod results;
pub mod retrieve;
pub mod scroll;
pub mod utils;

// Re-export commonly used types for convenience
pub use browser::{BrowserSession, RenderedPage, Renderer, WebDriverRenderer};
pub use config::ScraperConfig;
pub use error::{Result, ScrapeError};
pub use orchestrator::ScrapeOrchestrator;
pub use results::{Download, DownloadOutcome, ScrapeReport};
pub use retrieve::RetrievalPipeline;
pub use scroll::{PageControl, ScrollController, ScrollSummary};

/// Scrapes `url` with a WebDriver browser using `config`
pub async fn scrape_site(url: &str, config: ScraperConfig) -> Result<ScrapeReport> {
    ScrapeOrchestrator::with_webdriver(config).scrape(url).await
}
