//! Browser session abstraction for batch capture.
//!
//! Defines the `BrowserEngine`, `DeviceContext` and `PageHandle` traits that
//! abstract over the browser (currently Chromium via chromiumoxide).

pub mod chromium;

pub use chromium::{find_chromium, ChromiumSession};

use crate::devices::DeviceProfile;
use anyhow::{Context, Result};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tracing::warn;

/// A launched browser that can open isolated per-device contexts.
#[async_trait]
pub trait BrowserEngine: Send + Sync {
    /// Open an isolated browser context emulating the given device.
    async fn new_context(&self, profile: DeviceProfile) -> Result<Box<dyn DeviceContext>>;
    /// Shut down the browser process.
    async fn shutdown(&self) -> Result<()>;
}

/// An isolated browser context pinned to one device profile.
///
/// Contexts share nothing with each other: cookies, cache and storage set
/// while rendering one device never leak into another.
#[async_trait]
pub trait DeviceContext: Send + Sync {
    /// The device profile this context emulates.
    fn profile(&self) -> &DeviceProfile;
    /// Open a fresh page inside this context.
    async fn open_page(&self) -> Result<Box<dyn PageHandle>>;
    /// Close this context.
    async fn close(&self) -> Result<()>;
}

/// A single open page.
#[async_trait]
pub trait PageHandle: Send + Sync {
    /// Navigate to a URL, bounded by a timeout.
    async fn navigate(&self, url: &str, timeout: Duration) -> Result<()>;
    /// Execute JavaScript in the page context.
    async fn evaluate(&self, script: &str) -> Result<()>;
    /// Capture a full-page JPEG at the given quality.
    async fn screenshot_jpeg(&self, quality: u8) -> Result<Vec<u8>>;
    /// Close this page.
    async fn close(self: Box<Self>) -> Result<()>;
}

/// Open one isolated context per device profile, in table order.
///
/// If any context fails to open, the ones opened so far are closed before the
/// error is returned.
pub async fn open_device_contexts(
    engine: &dyn BrowserEngine,
    profiles: &[DeviceProfile],
) -> Result<Vec<Arc<dyn DeviceContext>>> {
    let mut contexts: Vec<Arc<dyn DeviceContext>> = Vec::with_capacity(profiles.len());
    for profile in profiles {
        match engine.new_context(*profile).await {
            Ok(ctx) => contexts.push(Arc::from(ctx)),
            Err(e) => {
                close_device_contexts(&contexts).await;
                return Err(e).with_context(|| format!("opening {} context", profile.name));
            }
        }
    }
    Ok(contexts)
}

/// Close contexts, logging failures instead of propagating them.
pub async fn close_device_contexts(contexts: &[Arc<dyn DeviceContext>]) {
    for ctx in contexts {
        if let Err(e) = ctx.close().await {
            warn!("failed to close {} context: {e:#}", ctx.profile().name);
        }
    }
}
