//! End-to-end scrape tests with a scripted browser

mod common;

use common::{Route, start_test_server};
use lazy_image_harvester::{
    BrowserSession, DownloadOutcome, PageControl, Renderer, Result, ScrapeError,
    ScrapeOrchestrator, ScraperConfig,
};
use std::collections::BTreeSet;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

/// Serves fixed HTML and scroll heights instead of driving a browser
struct FakeRenderer {
    html: String,
    resolved_url: String,
    heights: Vec<u64>,
    fail_scrolling: bool,
    fail_navigation: bool,
    closed: Arc<AtomicBool>,
    scrolls: Arc<AtomicUsize>,
}

impl FakeRenderer {
    fn new(html: String, resolved_url: String, heights: Vec<u64>) -> Self {
        Self {
            html,
            resolved_url,
            heights,
            fail_scrolling: false,
            fail_navigation: false,
            closed: Arc::new(AtomicBool::new(false)),
            scrolls: Arc::new(AtomicUsize::new(0)),
        }
    }
}

struct FakeSession {
    html: String,
    resolved_url: String,
    heights: Vec<u64>,
    reads: usize,
    fail_scrolling: bool,
    closed: Arc<AtomicBool>,
    scrolls: Arc<AtomicUsize>,
}

impl Renderer for FakeRenderer {
    type Session = FakeSession;

    async fn open(&self, url: &str) -> Result<FakeSession> {
        if self.fail_navigation {
            return Err(ScrapeError::WebDriverConnect {
                url: url.to_string(),
                reason: "no browser".to_string(),
            });
        }
        Ok(FakeSession {
            html: self.html.clone(),
            resolved_url: self.resolved_url.clone(),
            heights: self.heights.clone(),
            reads: 0,
            fail_scrolling: self.fail_scrolling,
            closed: Arc::clone(&self.closed),
            scrolls: Arc::clone(&self.scrolls),
        })
    }
}

impl PageControl for FakeSession {
    async fn scroll_height(&mut self) -> Result<u64> {
        let index = self.reads.min(self.heights.len() - 1);
        self.reads += 1;
        Ok(self.heights[index])
    }

    async fn scroll_to_bottom(&mut self) -> Result<()> {
        if self.fail_scrolling {
            return Err(ScrapeError::UnexpectedScript("window is gone".to_string()));
        }
        self.scrolls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

impl BrowserSession for FakeSession {
    async fn current_html(&mut self) -> Result<String> {
        Ok(self.html.clone())
    }

    async fn resolved_url(&mut self) -> Result<String> {
        Ok(self.resolved_url.clone())
    }

    async fn close(self) -> Result<()> {
        self.closed.store(true, Ordering::SeqCst);
        Ok(())
    }
}

fn config(dest: &Path) -> ScraperConfig {
    ScraperConfig::new()
        .with_destination_dir(dest)
        .with_scroll_pause_secs(0.0)
        .with_max_scrolls(10)
        .with_request_timeout_secs(5)
}

#[tokio::test]
async fn test_lazy_gallery_end_to_end() {
    let base = start_test_server(vec![
        Route::ok("/y.png", b"png-bytes"),
        Route::ok("/z.jpg", b"jpg-bytes"),
        Route::ok("/w.gif", b"gif-bytes"),
    ]);
    let html = format!(
        r#"<html><body>
            <img data-src="{base}/y.png">
            <img srcset="{base}/z.jpg 1x">
            <div style="background-image:url('{base}/w.gif')"></div>
            <img src="data:image/gif;base64,R0lGODlhAQABAAAAACw=">
        </body></html>"#
    );
    let renderer = FakeRenderer::new(html, format!("{}/gallery", base), vec![1000, 2500, 2500]);
    let closed = Arc::clone(&renderer.closed);
    let scrolls = Arc::clone(&renderer.scrolls);
    let dir = tempfile::tempdir().unwrap();

    let report = ScrapeOrchestrator::new(renderer, config(dir.path()))
        .scrape(&format!("{}/gallery", base))
        .await
        .unwrap();

    assert_eq!(report.discovered, 3);
    assert_eq!(report.saved().count(), 3);
    assert_eq!(report.failures().count(), 0);
    assert!(closed.load(Ordering::SeqCst));
    assert_eq!(scrolls.load(Ordering::SeqCst), 2);

    let names: BTreeSet<String> = std::fs::read_dir(dir.path())
        .unwrap()
        .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    assert_eq!(
        names,
        ["w.gif", "y.png", "z.jpg"]
            .iter()
            .map(|s| s.to_string())
            .collect::<BTreeSet<String>>()
    );
    assert_eq!(std::fs::read(dir.path().join("y.png")).unwrap(), b"png-bytes");
}

#[tokio::test]
async fn test_relative_references_use_resolved_url() {
    let base = start_test_server(vec![
        Route::ok("/photos/a.jpg", b"a"),
        Route::status("/photos/b.jpg", 404),
    ]);
    let html = r#"<img data-original="a.jpg"><img data-hires="b.jpg">"#.to_string();
    // The browser followed a redirect to /photos/
    let renderer = FakeRenderer::new(html, format!("{}/photos/", base), vec![500]);
    let dir = tempfile::tempdir().unwrap();

    let report = ScrapeOrchestrator::new(renderer, config(dir.path()))
        .scrape(&format!("{}/old-gallery", base))
        .await
        .unwrap();

    assert_eq!(report.page_url, format!("{}/photos/", base));
    assert_eq!(report.discovered, 2);
    assert_eq!(report.saved().count(), 1);

    let failures: Vec<_> = report.failures().collect();
    assert_eq!(failures.len(), 1);
    assert_eq!(failures[0].url, format!("{}/photos/b.jpg", base));
    assert_eq!(failures[0].outcome, DownloadOutcome::HttpFailure(404));
}

#[tokio::test]
async fn test_browser_is_closed_when_scrolling_fails() {
    let mut renderer = FakeRenderer::new(
        "<img src=\"/a.jpg\">".to_string(),
        "http://127.0.0.1/".to_string(),
        vec![100],
    );
    renderer.fail_scrolling = true;
    let closed = Arc::clone(&renderer.closed);
    let dir = tempfile::tempdir().unwrap();

    let result = ScrapeOrchestrator::new(renderer, config(dir.path()))
        .scrape("http://127.0.0.1/")
        .await;

    assert!(matches!(result, Err(ScrapeError::UnexpectedScript(_))));
    assert!(closed.load(Ordering::SeqCst));
}

#[tokio::test]
async fn test_rendering_failure_is_fatal() {
    let mut renderer = FakeRenderer::new(String::new(), String::new(), vec![0]);
    renderer.fail_navigation = true;
    let dir = tempfile::tempdir().unwrap();

    let result = ScrapeOrchestrator::new(renderer, config(dir.path()))
        .scrape("http://127.0.0.1/")
        .await;

    assert!(matches!(result, Err(ScrapeError::WebDriverConnect { .. })));
}

#[tokio::test]
async fn test_invalid_target_url() {
    let renderer = FakeRenderer::new(String::new(), String::new(), vec![0]);
    let dir = tempfile::tempdir().unwrap();

    let result = ScrapeOrchestrator::new(renderer, config(dir.path()))
        .scrape("not a url")
        .await;

    assert!(matches!(result, Err(ScrapeError::InvalidUrl(_))));
}
