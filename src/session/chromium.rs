//! Chromium-backed browser session using chromiumoxide.

use super::{BrowserEngine, DeviceContext, PageHandle};
use crate::config::{AgentConfig, BROWSER_ARGS};
use crate::devices::DeviceProfile;
use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::cdp::browser_protocol::browser::BrowserContextId;
use chromiumoxide::cdp::browser_protocol::emulation::{
    SetDeviceMetricsOverrideParams, SetUserAgentOverrideParams,
};
use chromiumoxide::cdp::browser_protocol::page::CaptureScreenshotFormat;
use chromiumoxide::cdp::browser_protocol::security::SetIgnoreCertificateErrorsParams;
use chromiumoxide::cdp::browser_protocol::target::{
    CreateBrowserContextParams, CreateTargetParams, DisposeBrowserContextParams,
};
use chromiumoxide::page::{Page, ScreenshotParams};
use futures::StreamExt;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::info;

/// Find the Chromium binary path.
pub fn find_chromium() -> Option<PathBuf> {
    // 1. SHUTTER_CHROMIUM_PATH env
    if let Ok(p) = std::env::var("SHUTTER_CHROMIUM_PATH") {
        let path = PathBuf::from(&p);
        if path.exists() {
            return Some(path);
        }
    }

    // 2. ~/.shutter/chromium/
    if let Some(home) = dirs::home_dir() {
        let candidates = if cfg!(target_os = "macos") {
            vec![
                home.join(".shutter/chromium/chrome-mac-arm64/Google Chrome for Testing.app/Contents/MacOS/Google Chrome for Testing"),
                home.join(".shutter/chromium/chrome-mac-x64/Google Chrome for Testing.app/Contents/MacOS/Google Chrome for Testing"),
                home.join(".shutter/chromium/chrome"),
            ]
        } else {
            vec![
                home.join(".shutter/chromium/chrome-linux64/chrome"),
                home.join(".shutter/chromium/chrome"),
            ]
        };
        for c in candidates {
            if c.exists() {
                return Some(c);
            }
        }
    }

    // 3. System PATH
    if let Ok(path) = which::which("google-chrome") {
        return Some(path);
    }
    if let Ok(path) = which::which("chromium") {
        return Some(path);
    }
    if let Ok(path) = which::which("chromium-browser") {
        return Some(path);
    }

    // 4. Common macOS locations
    if cfg!(target_os = "macos") {
        let common =
            PathBuf::from("/Applications/Google Chrome.app/Contents/MacOS/Google Chrome");
        if common.exists() {
            return Some(common);
        }
    }

    None
}

/// One launched Chromium process shared by all device contexts.
pub struct ChromiumSession {
    browser: Arc<Mutex<Browser>>,
    handler_task: JoinHandle<()>,
}

impl ChromiumSession {
    /// Launch a headless Chromium instance and start draining its event loop.
    pub async fn launch(config: &AgentConfig) -> Result<Arc<dyn BrowserEngine>> {
        let chrome_path = config
            .chromium_path
            .clone()
            .filter(|p| p.exists())
            .or_else(find_chromium)
            .context("Chromium not found. Set SHUTTER_CHROMIUM_PATH or install google-chrome.")?;

        let mut builder = BrowserConfig::builder().chrome_executable(&chrome_path);
        for arg in BROWSER_ARGS {
            builder = builder.arg(*arg);
        }
        let browser_config = builder
            .build()
            .map_err(|e| anyhow::anyhow!("failed to build browser config: {e}"))?;

        let (browser, mut handler) = Browser::launch(browser_config)
            .await
            .context("failed to launch Chromium")?;

        // Spawn the handler task
        let handler_task = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                let _ = event;
            }
        });

        info!("Chromium launched from {}", chrome_path.display());

        Ok(Arc::new(Self {
            browser: Arc::new(Mutex::new(browser)),
            handler_task,
        }))
    }
}

#[async_trait]
impl BrowserEngine for ChromiumSession {
    async fn new_context(&self, profile: DeviceProfile) -> Result<Box<dyn DeviceContext>> {
        let resp = {
            let browser = self.browser.lock().await;
            browser
                .execute(CreateBrowserContextParams::default())
                .await
                .context("failed to create browser context")?
        };

        info!(
            "opened {} context ({}x{})",
            profile.name, profile.width, profile.height
        );

        Ok(Box::new(ChromiumDeviceContext {
            browser: Arc::clone(&self.browser),
            context_id: resp.result.browser_context_id,
            profile,
        }))
    }

    async fn shutdown(&self) -> Result<()> {
        {
            let mut browser = self.browser.lock().await;
            browser.close().await.context("closing browser")?;
            browser.wait().await.context("waiting for browser exit")?;
        }
        self.handler_task.abort();
        info!("browser closed");
        Ok(())
    }
}

/// An isolated Chromium browser context emulating one device.
pub struct ChromiumDeviceContext {
    browser: Arc<Mutex<Browser>>,
    context_id: BrowserContextId,
    profile: DeviceProfile,
}

#[async_trait]
impl DeviceContext for ChromiumDeviceContext {
    fn profile(&self) -> &DeviceProfile {
        &self.profile
    }

    async fn open_page(&self) -> Result<Box<dyn PageHandle>> {
        let params = CreateTargetParams::builder()
            .url("about:blank")
            .browser_context_id(self.context_id.clone())
            .build()
            .map_err(|e| anyhow::anyhow!("failed to build page params: {e}"))?;

        let page = {
            let browser = self.browser.lock().await;
            browser
                .new_page(params)
                .await
                .context("failed to create new page")?
        };

        page.execute(SetDeviceMetricsOverrideParams::new(
            i64::from(self.profile.width),
            i64::from(self.profile.height),
            self.profile.scale,
            self.profile.mobile,
        ))
        .await
        .context("applying device metrics")?;
        page.execute(SetUserAgentOverrideParams::new(self.profile.user_agent))
            .await
            .context("applying user agent")?;
        // Target sites routinely ship broken certificate chains; tolerate them.
        page.execute(SetIgnoreCertificateErrorsParams::new(true))
            .await
            .context("relaxing certificate checks")?;

        Ok(Box::new(ChromiumPage { page }))
    }

    async fn close(&self) -> Result<()> {
        let browser = self.browser.lock().await;
        browser
            .execute(DisposeBrowserContextParams::new(self.context_id.clone()))
            .await
            .context("disposing browser context")?;
        Ok(())
    }
}

/// A single Chromium page.
pub struct ChromiumPage {
    page: Page,
}

#[async_trait]
impl PageHandle for ChromiumPage {
    async fn navigate(&self, url: &str, timeout: Duration) -> Result<()> {
        let result = tokio::time::timeout(timeout, async {
            self.page.goto(url).await?;
            // Wait for the page to finish loading
            let _ = self.page.wait_for_navigation().await;
            Ok::<_, chromiumoxide::error::CdpError>(())
        })
        .await;

        match result {
            Ok(Ok(())) => Ok(()),
            Ok(Err(e)) => bail!("navigation failed: {e}"),
            Err(_) => bail!("navigation timed out after {}s", timeout.as_secs()),
        }
    }

    async fn evaluate(&self, script: &str) -> Result<()> {
        self.page
            .evaluate(script)
            .await
            .context("JS execution failed")?;
        Ok(())
    }

    async fn screenshot_jpeg(&self, quality: u8) -> Result<Vec<u8>> {
        let params = ScreenshotParams::builder()
            .format(CaptureScreenshotFormat::Jpeg)
            .quality(i64::from(quality))
            .full_page(true)
            .build();

        self.page
            .screenshot(params)
            .await
            .context("capturing screenshot")
    }

    async fn close(self: Box<Self>) -> Result<()> {
        self.page.close().await.context("closing page")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::devices::DEVICE_PROFILES;

    #[tokio::test]
    #[ignore] // Requires Chromium to be installed
    async fn test_capture_roundtrip() {
        let config = AgentConfig::new("http://localhost:9", None, None, 80);
        let session = ChromiumSession::launch(&config)
            .await
            .expect("failed to launch Chromium");

        let ctx = session
            .new_context(DEVICE_PROFILES[0])
            .await
            .expect("failed to create context");
        let page = ctx.open_page().await.expect("failed to open page");

        // Navigate to a data URL
        page.navigate(
            "data:text/html,<h1>Hello</h1><p>World</p>",
            Duration::from_secs(10),
        )
        .await
        .expect("navigation failed");

        page.evaluate("document.title = 'captured'")
            .await
            .expect("JS execution failed");

        let bytes = page.screenshot_jpeg(80).await.expect("screenshot failed");
        assert!(!bytes.is_empty());

        page.close().await.expect("close page failed");
        ctx.close().await.expect("close context failed");
        session.shutdown().await.expect("shutdown failed");
    }
}
