use std::time::Duration;

use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::cdp::browser_protocol::page::CaptureScreenshotFormat;
use chromiumoxide::handler::viewport::Viewport;
use chromiumoxide::page::ScreenshotParams;
use chromiumoxide::Page;
use futures::StreamExt;
use tokio::task::{self, JoinHandle};
use tokio::time::Instant;
use tracing::{debug, warn};
use url::Url;

use crate::config::CaptureConfig;
use crate::error::CaptureError;

const READY_POLL_INTERVAL: Duration = Duration::from_millis(100);
const QUIET_AFTER_LOAD: Duration = Duration::from_millis(250);

/// A single Chromium process with one open page, scoped to one capture.
pub struct BrowserSession {
    browser: Browser,
    page: Page,
    handler: JoinHandle<()>,
}

/// Device-metrics emulation applied to every page. Without this the
/// handler falls back to its own default viewport regardless of the
/// window size argument.
pub fn capture_viewport(config: &CaptureConfig) -> Viewport {
    Viewport {
        width: config.width,
        height: config.height,
        ..Viewport::default()
    }
}

/// Browser config for a capture: emulated viewport plus a matching
/// window size for headed runs.
pub fn browser_config(config: &CaptureConfig) -> Result<BrowserConfig, CaptureError> {
    let mut builder = BrowserConfig::builder()
        .window_size(config.width, config.height)
        .viewport(capture_viewport(config));
    if config.headed {
        builder = builder.with_head();
    }
    builder
        .build()
        .map_err(|e| CaptureError::Browser(format!("Failed to build browser config: {}", e)))
}

impl BrowserSession {
    /// Launch Chromium and open a blank page.
    pub async fn launch(config: &CaptureConfig) -> Result<Self, CaptureError> {
        let (browser, mut handler) = Browser::launch(browser_config(config)?)
            .await
            .map_err(|e| CaptureError::Browser(format!("Failed to launch chromium: {}", e)))?;

        // Spawn a background task to process CDP events.
        // Without this, the browser connection will stall.
        let handler = task::spawn(async move {
            while let Some(h) = handler.next().await {
                if h.is_err() {
                    break;
                }
            }
        });

        let page = browser
            .new_page("about:blank")
            .await
            .map_err(|e| CaptureError::Browser(format!("Failed to create page: {}", e)))?;

        Ok(Self {
            browser,
            page,
            handler,
        })
    }

    /// Navigate to a URL and block until the engine's load contract is met.
    pub async fn goto(&self, url: &Url) -> Result<(), CaptureError> {
        self.page
            .goto(url.as_str())
            .await
            .map_err(|e| CaptureError::Navigation(e.to_string()))?;
        self.page
            .wait_for_navigation()
            .await
            .map_err(|e| CaptureError::Navigation(e.to_string()))?;
        Ok(())
    }

    /// Wait until the document reports `readyState == "complete"`, bounded
    /// by `budget`, then give deferred scripts a short quiet period.
    pub async fn wait_until_ready(&self, budget: Duration) -> Result<(), CaptureError> {
        let deadline = Instant::now() + budget;
        loop {
            let result = self
                .page
                .evaluate("document.readyState")
                .await
                .map_err(|e| CaptureError::Navigation(e.to_string()))?;
            let complete = result
                .value()
                .and_then(|v| v.as_str())
                .map(|s| s == "complete")
                .unwrap_or(false);
            if complete {
                break;
            }
            if Instant::now() >= deadline {
                warn!("Page did not reach readyState=complete within {:?}", budget);
                return Ok(());
            }
            tokio::time::sleep(READY_POLL_INTERVAL).await;
        }

        let remaining = deadline.saturating_duration_since(Instant::now());
        tokio::time::sleep(remaining.min(QUIET_AFTER_LOAD)).await;
        Ok(())
    }

    /// Capture the page as PNG bytes.
    pub async fn screenshot_png(&self, full_page: bool) -> Result<Vec<u8>, CaptureError> {
        let params = ScreenshotParams::builder()
            .format(CaptureScreenshotFormat::Png)
            .full_page(full_page)
            .build();
        self.page
            .screenshot(params)
            .await
            .map_err(|e| CaptureError::Screenshot(e.to_string()))
    }

    /// Tear the session down. Closing the browser handle makes
    /// chromiumoxide kill the child process cleanly; waiting on it
    /// ensures no zombie is left behind.
    pub async fn close(mut self) {
        if let Err(e) = self.browser.close().await {
            warn!("Browser close failed: {}", e);
        }
        if let Err(e) = self.browser.wait().await {
            debug!("Browser wait failed: {}", e);
        }
        self.handler.abort();
    }
}
