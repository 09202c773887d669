// src/services/browser.rs
//! Headless browser capability used by the dividend extractor.
//!
//! The refresh batch only talks to these traits, so the Chrome implementation
//! below can be swapped for a fake that serves canned HTML.

use async_trait::async_trait;
use chromiumoxide::{Browser, BrowserConfig, Page};
use futures::StreamExt;
use log::{debug, info, warn};
use std::path::PathBuf;
use std::time::Duration;
use tokio::task::JoinHandle;

use crate::BoxError;

pub type Result<T> = std::result::Result<T, BoxError>;

/// Flags for running Chrome inside containers without an OS sandbox.
pub const CHROME_ARGS: [&str; 5] = [
    "--disable-setuid-sandbox",
    "--disable-gpu",
    "--disable-dev-shm-usage",
    "--single-process",
    "--no-zygote",
];

const SELECTOR_POLL_INTERVAL: Duration = Duration::from_millis(250);
const SHUTDOWN_GRACE: Duration = Duration::from_secs(5);

#[async_trait]
pub trait BrowserLauncher: Send + Sync {
    async fn launch(&self) -> Result<Box<dyn BrowserSession>>;
}

/// A running browser process. Owned by exactly one refresh batch.
#[async_trait]
pub trait BrowserSession: Send + Sync {
    async fn new_page(&self) -> Result<Box<dyn BrowserPage>>;

    /// Graceful shutdown. Errors if the process did not exit in time.
    async fn close(&mut self) -> Result<()>;

    /// Forced termination, used when `close` fails.
    async fn kill(&mut self) -> Result<()>;
}

#[async_trait]
pub trait BrowserPage: Send + Sync {
    /// Mask the automation fingerprint (`navigator.webdriver`, headless user
    /// agent) before any site script runs. Must be called before `goto`.
    async fn enable_stealth(&self) -> Result<()>;

    /// Start navigating to `url`. Does not wait for the `load` event; callers
    /// wait for the element they need instead.
    async fn goto(&self, url: &str) -> Result<()>;
    async fn wait_for_selector(&self, selector: &str, timeout: Duration) -> Result<()>;
    async fn content(&self) -> Result<String>;
    async fn close(self: Box<Self>) -> Result<()>;
}

#[derive(Debug, Clone, Default)]
pub struct ChromeConfig {
    pub executable: Option<PathBuf>,
    pub user_data_dir: Option<PathBuf>,
    pub request_timeout: Option<Duration>,
}

pub struct ChromeLauncher {
    config: ChromeConfig,
}

impl ChromeLauncher {
    pub fn new(config: ChromeConfig) -> Self {
        ChromeLauncher { config }
    }

    fn browser_config(&self) -> Result<BrowserConfig> {
        let mut builder = BrowserConfig::builder().no_sandbox().args(CHROME_ARGS);
        if let Some(path) = &self.config.executable {
            builder = builder.chrome_executable(path);
        }
        if let Some(dir) = &self.config.user_data_dir {
            builder = builder.user_data_dir(dir);
        }
        if let Some(timeout) = self.config.request_timeout {
            builder = builder.request_timeout(timeout);
        }
        Ok(builder.build()?)
    }
}

#[async_trait]
impl BrowserLauncher for ChromeLauncher {
    async fn launch(&self) -> Result<Box<dyn BrowserSession>> {
        let config = self.browser_config()?;
        let (browser, mut handler) = Browser::launch(config).await?;

        // The CDP handler must be polled for the browser to make progress.
        let handler_task = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    debug!("CDP handler stopped: {}", e);
                    break;
                }
            }
        });

        info!("Headless Chrome launched");
        Ok(Box::new(ChromeSession {
            browser,
            handler_task,
        }))
    }
}

pub struct ChromeSession {
    browser: Browser,
    handler_task: JoinHandle<()>,
}

#[async_trait]
impl BrowserSession for ChromeSession {
    async fn new_page(&self) -> Result<Box<dyn BrowserPage>> {
        let page = self.browser.new_page("about:blank").await?;
        Ok(Box::new(ChromePage { page }))
    }

    async fn close(&mut self) -> Result<()> {
        self.browser.close().await?;
        match tokio::time::timeout(SHUTDOWN_GRACE, self.browser.wait()).await {
            Ok(Ok(status)) => {
                debug!("Chrome exited with status {:?}", status);
                self.handler_task.abort();
                Ok(())
            }
            Ok(Err(e)) => Err(e.into()),
            Err(_) => Err(format!("Chrome did not exit within {:?}", SHUTDOWN_GRACE).into()),
        }
    }

    async fn kill(&mut self) -> Result<()> {
        warn!("Killing Chrome process");
        let result = self.browser.kill().await;
        self.handler_task.abort();
        match result {
            Some(Err(e)) => Err(e.into()),
            _ => Ok(()),
        }
    }
}

struct ChromePage {
    page: Page,
}

#[async_trait]
impl BrowserPage for ChromePage {
    async fn enable_stealth(&self) -> Result<()> {
        self.page.enable_stealth_mode().await?;
        Ok(())
    }

    async fn goto(&self, url: &str) -> Result<()> {
        // `Page::goto` resolves on `load`, which third-party resources can hold
        // open long after the DOM is ready.
        let target = serde_json::to_string(url)?;
        self.page
            .evaluate(format!("window.location.assign({})", target))
            .await?;
        Ok(())
    }

    async fn wait_for_selector(&self, selector: &str, timeout: Duration) -> Result<()> {
        let poll = async {
            loop {
                if self.page.find_element(selector).await.is_ok() {
                    return;
                }
                tokio::time::sleep(SELECTOR_POLL_INTERVAL).await;
            }
        };
        tokio::time::timeout(timeout, poll)
            .await
            .map_err(|_| format!("Timed out after {:?} waiting for '{}'", timeout, selector))?;
        Ok(())
    }

    async fn content(&self) -> Result<String> {
        Ok(self.page.content().await?)
    }

    async fn close(self: Box<Self>) -> Result<()> {
        self.page.close().await?;
        Ok(())
    }
}
