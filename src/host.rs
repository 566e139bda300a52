//! Headless screen host
//!
//! Stands in for the browser page: downloads every screenshot the poller
//! announces, optionally writes it to disk, then marks it loaded so the
//! poller starts its next cycle. A screenshot that fails to download is
//! never marked loaded, which lets the poller's load-wait budget expire.

use async_trait::async_trait;
use cellview_communication::PanelClient;
use cellview_core::{PanelEvent, Result};
use cellview_panel::LoadSignal;
use std::path::PathBuf;
use tokio::sync::broadcast::{self, error::RecvError};

/// Source of screenshot bytes
#[async_trait]
pub trait ScreenFetcher: Send + Sync {
    async fn fetch(&self, path: &str) -> Result<Vec<u8>>;
}

#[async_trait]
impl ScreenFetcher for PanelClient {
    async fn fetch(&self, path: &str) -> Result<Vec<u8>> {
        self.fetch_screen(path).await
    }
}

pub struct ScreenshotHost<F: ScreenFetcher> {
    fetcher: F,
    load: LoadSignal,
    save_to: Option<PathBuf>,
}

impl<F: ScreenFetcher> ScreenshotHost<F> {
    pub fn new(fetcher: F, load: LoadSignal) -> Self {
        Self {
            fetcher,
            load,
            save_to: None,
        }
    }

    /// Overwrite `path` with each downloaded screenshot
    pub fn save_to(mut self, path: impl Into<PathBuf>) -> Self {
        self.save_to = Some(path.into());
        self
    }

    /// Consume events until every publisher is gone
    ///
    /// Returns how many screenshots were loaded.
    pub async fn run(self, mut events: broadcast::Receiver<PanelEvent>) -> usize {
        let mut loaded = 0;
        loop {
            let event = match events.recv().await {
                Ok(event) => event,
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!("Host missed {} panel events", skipped);
                    continue;
                }
                Err(RecvError::Closed) => break,
            };

            match event {
                PanelEvent::ScreenUpdated { url } => {
                    if self.load_screen(&url).await {
                        loaded += 1;
                    }
                }
                PanelEvent::Info(message) if message.is_empty() => {}
                PanelEvent::Info(message) => tracing::info!("{}", message),
                PanelEvent::Alert(message) => tracing::error!("{}", message),
                PanelEvent::CommandFailed { command, reason } => {
                    tracing::warn!("Command '{}' failed: {}", command, reason)
                }
                other => tracing::debug!("{}", other),
            }
        }
        tracing::debug!("Screen host stopped after {} screenshots", loaded);
        loaded
    }

    async fn load_screen(&self, url: &str) -> bool {
        let bytes = match self.fetcher.fetch(url).await {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::warn!("Screenshot download failed: {}", e);
                return false;
            }
        };

        if let Some(path) = &self.save_to {
            if let Err(e) = tokio::fs::write(path, &bytes).await {
                tracing::warn!("Could not write screenshot to {}: {}", path.display(), e);
                return false;
            }
        }

        self.load.complete();
        true
    }
}
