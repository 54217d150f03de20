use crate::browser::{BrowserSession, RenderedPage, Renderer, WebDriverRenderer};
use crate::config::ScraperConfig;
use crate::error::Result;
use crate::extract;
use crate::results::ScrapeReport;
use crate::retrieve::RetrievalPipeline;
use crate::scroll::ScrollController;
use url::Url;

/// Runs one scrape: render, scroll, snapshot, extract, download.
pub struct ScrapeOrchestrator<R> {
    renderer: R,
    config: ScraperConfig,
}

impl ScrapeOrchestrator<WebDriverRenderer> {
    /// Orchestrator backed by a WebDriver browser
    pub fn with_webdriver(config: ScraperConfig) -> Self {
        Self::new(WebDriverRenderer::new(&config), config)
    }
}

impl<R: Renderer> ScrapeOrchestrator<R> {
    pub fn new(renderer: R, config: ScraperConfig) -> Self {
        Self { renderer, config }
    }

    /// Scrapes every image on `url` into the configured destination.
    ///
    /// Rendering and scrolling errors abort the run. Individual download
    /// failures are listed in the report.
    pub async fn scrape(&self, url: &str) -> Result<ScrapeReport> {
        Url::parse(url)?;
        ::log::info!("Starting scrape: {}", url);

        let pipeline = RetrievalPipeline::new(&self.config)?;

        let page = self.render(url).await?;
        let references = extract::extract_from_html(&page.html, &page.base_url)?;
        ::log::info!("Found {} images on {}", references.len(), page.base_url);

        let discovered = references.len();
        let downloads = pipeline.retrieve(references).await?;

        let report = ScrapeReport {
            page_url: page.base_url,
            discovered,
            downloads,
        };
        ::log::info!(
            "Saved {} of {} images to {}",
            report.saved().count(),
            discovered,
            pipeline.destination().display()
        );
        Ok(report)
    }

    /// Opens the page, scrolls it, and captures the HTML.
    ///
    /// The browser session is closed whether or not scrolling succeeded.
    async fn render(&self, url: &str) -> Result<RenderedPage> {
        let mut session = self.renderer.open(url).await?;
        let captured = self.materialize(&mut session).await;

        if let Err(e) = session.close().await {
            ::log::warn!("Failed to close browser session: {}", e);
        }
        captured
    }

    async fn materialize(&self, session: &mut R::Session) -> Result<RenderedPage> {
        let controller =
            ScrollController::new(self.config.scroll_pause(), self.config.max_scrolls);
        let summary = controller.materialize(session).await?;
        ::log::debug!("Scrolling finished: {:?}", summary);

        Ok(RenderedPage {
            html: session.current_html().await?,
            base_url: session.resolved_url().await?,
        })
    }
}
