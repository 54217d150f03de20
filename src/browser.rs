use crate::config::ScraperConfig;
use crate::error::{Result, ScrapeError};
use crate::scroll::PageControl;
use fantoccini::error::NewSessionError;
use fantoccini::wd::Capabilities;
use fantoccini::{Client, ClientBuilder};
use serde_json::json;

const SCROLL_HEIGHT_SCRIPT: &str = "return document.body.scrollHeight";
const SCROLL_TO_BOTTOM_SCRIPT: &str = "window.scrollTo(0, document.body.scrollHeight);";

/// Endpoints tried when the configured WebDriver URL refuses a session
const FALLBACK_WEBDRIVER_URLS: &[&str] = &[
    "http://localhost:9515", // ChromeDriver default
    "http://127.0.0.1:4444", // Try with IP instead of localhost
];

/// HTML snapshot of a page after scrolling, with the URL it was served from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedPage {
    pub html: String,
    pub base_url: String,
}

/// Something that can load a URL in a browser and hand back the live page
#[allow(async_fn_in_trait)]
pub trait Renderer {
    type Session: BrowserSession;

    /// Navigate to `url`. Failure here aborts the scrape.
    async fn open(&self, url: &str) -> Result<Self::Session>;
}

/// A loaded page owned by the caller until [`close`](BrowserSession::close)
#[allow(async_fn_in_trait)]
pub trait BrowserSession: PageControl {
    /// Serialized DOM as it is now, including script-inserted content
    async fn current_html(&mut self) -> Result<String>;

    /// URL of the page after any redirects
    async fn resolved_url(&mut self) -> Result<String>;

    async fn close(self) -> Result<()>;
}

/// Renders pages in Chrome through a WebDriver server
#[derive(Debug, Clone)]
pub struct WebDriverRenderer {
    webdriver_url: String,
    capabilities: Capabilities,
}

impl WebDriverRenderer {
    pub fn new(config: &ScraperConfig) -> Self {
        Self {
            webdriver_url: config.webdriver_url.clone(),
            capabilities: chrome_capabilities(config),
        }
    }

    /// Connects to the configured WebDriver, then to the fallbacks
    async fn connect(&self) -> Result<Client> {
        let reason = match self.connect_to(&self.webdriver_url).await {
            Ok(client) => {
                ::log::debug!("Connected to WebDriver at {}", self.webdriver_url);
                return Ok(client);
            }
            Err(e) => {
                ::log::error!(
                    "Failed to connect to WebDriver at {}: {}",
                    self.webdriver_url,
                    e
                );
                e.to_string()
            }
        };

        for url in FALLBACK_WEBDRIVER_URLS {
            if *url == self.webdriver_url {
                continue;
            }

            ::log::info!("Trying fallback WebDriver URL: {}", url);
            if let Ok(client) = self.connect_to(url).await {
                ::log::debug!("Connected to fallback WebDriver at {}", url);
                return Ok(client);
            }
        }

        ::log::error!(
            "Make sure a WebDriver server is running or set the WEBDRIVER_URL environment variable"
        );
        Err(ScrapeError::WebDriverConnect {
            url: self.webdriver_url.clone(),
            reason,
        })
    }

    async fn connect_to(&self, url: &str) -> std::result::Result<Client, NewSessionError> {
        let mut builder = ClientBuilder::native();
        builder.capabilities(self.capabilities.clone());
        builder.connect(url).await
    }
}

fn chrome_capabilities(config: &ScraperConfig) -> Capabilities {
    let mut args = vec![
        "--disable-gpu".to_string(),
        "--no-sandbox".to_string(),
        format!("--window-size={},{}", config.window_width, config.window_height),
    ];
    if config.headless {
        args.insert(0, "--headless".to_string());
    }

    let mut capabilities = Capabilities::new();
    capabilities.insert("goog:chromeOptions".to_string(), json!({ "args": args }));
    capabilities
}

impl Renderer for WebDriverRenderer {
    type Session = WebDriverSession;

    async fn open(&self, url: &str) -> Result<WebDriverSession> {
        let client = self.connect().await?;

        if let Err(source) = client.goto(url).await {
            if let Err(e) = client.close().await {
                ::log::warn!("Failed to close WebDriver session: {}", e);
            }
            return Err(ScrapeError::Navigation {
                url: url.to_string(),
                source,
            });
        }

        ::log::info!("Loaded {}", url);
        Ok(WebDriverSession { client })
    }
}

/// A page open in a WebDriver-controlled browser
pub struct WebDriverSession {
    client: Client,
}

impl PageControl for WebDriverSession {
    async fn scroll_height(&mut self) -> Result<u64> {
        let value = self.client.execute(SCROLL_HEIGHT_SCRIPT, vec![]).await?;
        value
            .as_u64()
            .or_else(|| value.as_f64().filter(|h| *h >= 0.0).map(|h| h as u64))
            .ok_or_else(|| {
                ScrapeError::UnexpectedScript(format!("scroll height was {}", value))
            })
    }

    async fn scroll_to_bottom(&mut self) -> Result<()> {
        self.client.execute(SCROLL_TO_BOTTOM_SCRIPT, vec![]).await?;
        Ok(())
    }
}

impl BrowserSession for WebDriverSession {
    async fn current_html(&mut self) -> Result<String> {
        Ok(self.client.source().await?)
    }

    async fn resolved_url(&mut self) -> Result<String> {
        Ok(self.client.current_url().await?.to_string())
    }

    async fn close(self) -> Result<()> {
        Ok(self.client.close().await?)
    }
}
