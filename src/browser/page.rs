//! Rendered page capability
//!
//! [`RenderedPage`] is the narrow interface the scraping core needs from a live
//! browser tab: navigate, wait, query the current DOM, click. DOM queries are
//! ordinary Rust functions over a parsed snapshot of the document, so the
//! extraction and pagination logic never embeds page-side JavaScript.

use crate::browser::controller::BrowserController;
use crate::browser::navigation::{NavigationOptions, PageNavigator};
use crate::error::{BrowserError, Error, ExtractionError, Result};
use async_trait::async_trait;
use chromiumoxide::Page;
use scraper::Html;
use std::fmt;
use std::time::Duration;
use tracing::{debug, info, instrument};

/// Structural CSS path to one element of the document
/// (`html > body:nth-of-type(1) > ...`), valid against the live DOM the
/// snapshot was taken from.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ElementPath(String);

impl ElementPath {
    /// Wrap an existing selector
    pub fn new<S: Into<String>>(selector: S) -> Self {
        Self(selector.into())
    }

    /// The selector text
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ElementPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A live, navigable rendering session
#[async_trait]
pub trait RenderedPage: Send {
    /// Load `url`, failing if it has not settled within `timeout`
    async fn navigate(&mut self, url: &str, timeout: Duration) -> Result<()>;

    /// Let dynamic content settle
    async fn wait(&mut self, duration: Duration);

    /// Serialized current DOM
    async fn content(&mut self) -> Result<String>;

    /// Click the element at `path`. `Ok(false)` when it is no longer there.
    async fn click(&mut self, path: &ElementPath) -> Result<bool>;

    /// Scroll the viewport to the bottom of the document
    async fn scroll_to_bottom(&mut self) -> Result<()>;

    /// Release the session. Further calls fail.
    async fn close(&mut self) -> Result<()>;

    /// Run a query against the current DOM
    async fn evaluate<T, F>(&mut self, query: F) -> Result<T>
    where
        Self: Sized,
        F: FnOnce(&Html) -> T + Send,
        T: Send,
    {
        let content = self.content().await?;
        Ok(query(&Html::parse_document(&content)))
    }
}

/// [`RenderedPage`] backed by a Chromium tab
pub struct ChromiumPage {
    controller: Option<BrowserController>,
    page: Page,
    navigation: NavigationOptions,
}

impl ChromiumPage {
    /// Open a fresh tab on `controller`
    pub async fn open(controller: BrowserController) -> Result<Self> {
        let page = controller.new_page().await?;
        let navigation = NavigationOptions {
            timeout_ms: controller.config().timeout_ms,
            wait_until: controller.config().wait_until,
            ..NavigationOptions::default()
        };
        Ok(Self {
            controller: Some(controller),
            page,
            navigation,
        })
    }

    fn ensure_open(&self) -> Result<()> {
        match &self.controller {
            None => Err(BrowserError::AlreadyClosed.into()),
            Some(controller) if !controller.is_connected() => {
                Err(BrowserError::ConnectionLost.into())
            }
            Some(_) => Ok(()),
        }
    }

    async fn run_script<T: serde::de::DeserializeOwned>(&self, script: String) -> Result<T> {
        self.ensure_open()?;
        self.page
            .evaluate(script)
            .await
            .map_err(|e| Error::cdp(e.to_string()))?
            .into_value()
            .map_err(|e| ExtractionError::JsExecutionFailed(e.to_string()).into())
    }
}

#[async_trait]
impl RenderedPage for ChromiumPage {
    #[instrument(skip(self))]
    async fn navigate(&mut self, url: &str, timeout: Duration) -> Result<()> {
        self.ensure_open()?;
        let options = NavigationOptions {
            timeout_ms: timeout.as_millis() as u64,
            ..self.navigation.clone()
        };
        let loaded = PageNavigator::goto(&self.page, url, &options).await?;
        if loaded.final_url != url {
            info!("Redirected to {}", loaded.final_url);
        }
        debug!("Page ready after {}ms", loaded.duration_ms);
        Ok(())
    }

    async fn wait(&mut self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }

    async fn content(&mut self) -> Result<String> {
        self.ensure_open()?;
        self.page
            .content()
            .await
            .map_err(|e| ExtractionError::ContentUnavailable(e.to_string()).into())
    }

    #[instrument(skip(self))]
    async fn click(&mut self, path: &ElementPath) -> Result<bool> {
        let selector = serde_json::to_string(path.as_str())?;
        let script = format!(
            r#"
            (() => {{
                const el = document.querySelector({selector});
                if (!el) return false;
                el.click();
                return true;
            }})()
            "#
        );
        let clicked: bool = self.run_script(script).await?;
        debug!("Click on {} -> {}", path, clicked);
        Ok(clicked)
    }

    async fn scroll_to_bottom(&mut self) -> Result<()> {
        let _: bool = self
            .run_script(
                "(() => { window.scrollTo(0, document.body.scrollHeight); return true; })()"
                    .to_string(),
            )
            .await?;
        Ok(())
    }

    async fn close(&mut self) -> Result<()> {
        match self.controller.take() {
            Some(controller) => controller.close().await,
            None => Ok(()),
        }
    }
}
