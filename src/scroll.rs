use crate::error::Result;
use std::time::Duration;

/// Scroll primitives of a live page
#[allow(async_fn_in_trait)]
pub trait PageControl {
    /// Current `document.body.scrollHeight`
    async fn scroll_height(&mut self) -> Result<u64>;

    /// Scroll the window to the bottom of the document
    async fn scroll_to_bottom(&mut self) -> Result<()>;
}

/// What the scroll loop reached before it stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScrollSummary {
    /// Scrolls that made the page grow
    pub scrolls: u32,
    pub final_height: u64,
    /// False when the attempt budget ran out while the page was still growing
    pub stabilized: bool,
}

/// Scrolls a page until its height stops changing, forcing lazily loaded
/// content to materialize before the HTML snapshot is taken.
#[derive(Debug, Clone)]
pub struct ScrollController {
    pause: Duration,
    max_attempts: u32,
}

impl ScrollController {
    pub fn new(pause: Duration, max_attempts: u32) -> Self {
        Self {
            pause,
            max_attempts,
        }
    }

    /// Runs the scroll loop against `page`.
    ///
    /// Each attempt scrolls to the bottom, waits `pause`, then re-reads the
    /// height. An unchanged height ends the loop; otherwise the loop stops
    /// after `max_attempts` growing scrolls. Running out of attempts is not
    /// an error. Page command failures are.
    pub async fn materialize<P: PageControl>(&self, page: &mut P) -> Result<ScrollSummary> {
        let mut last_height = page.scroll_height().await?;
        let mut attempts = 0;

        while attempts < self.max_attempts {
            page.scroll_to_bottom().await?;
            tokio::time::sleep(self.pause).await;

            let new_height = page.scroll_height().await?;
            ::log::debug!(
                "Scroll {}: height {} -> {}",
                attempts + 1,
                last_height,
                new_height
            );

            if new_height == last_height {
                ::log::info!("Page stabilized at height {}", new_height);
                return Ok(ScrollSummary {
                    scrolls: attempts,
                    final_height: new_height,
                    stabilized: true,
                });
            }

            last_height = new_height;
            attempts += 1;
        }

        ::log::warn!(
            "Page still growing after {} scrolls, continuing with height {}",
            attempts,
            last_height
        );
        Ok(ScrollSummary {
            scrolls: attempts,
            final_height: last_height,
            stabilized: false,
        })
    }
}
