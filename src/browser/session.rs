//! Session control
//!
//! The [`SessionController`] owns the one live rendered page of a run. It
//! launches it on demand, hands out exclusive access, and tears it down and
//! relaunches it when a target fails because the connection was lost.

use crate::browser::controller::{BrowserConfig, BrowserController};
use crate::browser::page::{ChromiumPage, RenderedPage};
use crate::error::Result;
use async_trait::async_trait;
use tracing::{error, info, instrument, warn};

/// Creates live rendered pages
#[async_trait]
pub trait SessionFactory: Send + Sync {
    /// The page type produced
    type Page: RenderedPage;

    /// Launch a fresh session
    async fn launch(&self) -> Result<Self::Page>;
}

/// Launches headless Chromium tabs
#[derive(Debug, Clone, Default)]
pub struct ChromiumSessionFactory {
    config: BrowserConfig,
}

impl ChromiumSessionFactory {
    /// Factory with `config`
    pub fn new(config: BrowserConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl SessionFactory for ChromiumSessionFactory {
    type Page = ChromiumPage;

    async fn launch(&self) -> Result<ChromiumPage> {
        let controller = BrowserController::launch(self.config.clone()).await?;
        ChromiumPage::open(controller).await
    }
}

/// Owner of the run's rendered page
pub struct SessionController<F: SessionFactory> {
    factory: F,
    page: Option<F::Page>,
    launches: usize,
}

impl<F: SessionFactory> SessionController<F> {
    /// Controller with no live session yet
    pub fn new(factory: F) -> Self {
        Self {
            factory,
            page: None,
            launches: 0,
        }
    }

    /// Launch the first session. Failure here is fatal to the run.
    pub async fn start(factory: F) -> Result<Self> {
        let mut controller = Self::new(factory);
        controller.ensure().await?;
        Ok(controller)
    }

    /// Whether a session is currently held
    pub fn is_live(&self) -> bool {
        self.page.is_some()
    }

    /// How many sessions have been launched so far
    pub fn launches(&self) -> usize {
        self.launches
    }

    /// The live page, launching one if none is held
    pub async fn ensure(&mut self) -> Result<&mut F::Page> {
        let page = match self.page.take() {
            Some(page) => page,
            None => {
                if self.launches > 0 {
                    info!("Browser disconnected, reconnecting");
                }
                let page = self.factory.launch().await?;
                self.launches += 1;
                page
            }
        };
        Ok(self.page.insert(page))
    }

    /// Drop the current session, closing it if possible
    #[instrument(skip(self))]
    pub async fn close(&mut self) {
        if let Some(mut page) = self.page.take() {
            if let Err(e) = page.close().await {
                warn!("Error while closing session: {}", e);
            }
        }
    }

    /// Close and relaunch, returning whether a new session is live. A failed
    /// relaunch leaves no session; the next `ensure` tries again.
    #[instrument(skip(self))]
    pub async fn reconnect(&mut self) -> bool {
        info!("Attempting to reconnect browser");
        self.close().await;
        match self.ensure().await {
            Ok(_) => true,
            Err(e) => {
                error!("Failed to reconnect browser: {}", e);
                false
            }
        }
    }
}
