//! Single-page capture task: navigate, sanitize, shoot, upload.

use crate::keys::{object_key, url_slug};
use crate::sanitize::SANITIZE_SCRIPT;
use crate::session::DeviceContext;
use crate::targets::Target;
use crate::uploader::{CaptureResult, Uploader};
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use futures::future::join_all;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};

/// Upper bound on a single page navigation.
pub const NAVIGATION_TIMEOUT: Duration = Duration::from_secs(45);

/// Screenshot counts accumulated for one target.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CaptureTally {
    pub completed: u32,
    pub failed: u32,
}

impl CaptureTally {
    fn success() -> Self {
        Self {
            completed: 1,
            failed: 0,
        }
    }

    fn failure() -> Self {
        Self {
            completed: 0,
            failed: 1,
        }
    }

    /// Fold another tally into this one.
    pub fn absorb(&mut self, other: CaptureTally) {
        self.completed += other.completed;
        self.failed += other.failed;
    }
}

/// Everything a single device capture needs to know about its target.
#[derive(Debug, Clone)]
pub struct CaptureJob {
    pub target: Target,
    pub url_slug: String,
    pub captured_at: DateTime<Utc>,
    pub run_stamp: String,
}

impl CaptureJob {
    /// Stamp the job with its slug and capture time.
    ///
    /// The timestamp is taken once here so every device capture of the same
    /// target reports an identical `capturedAt`.
    pub fn new(target: Target, run_stamp: String) -> Self {
        let slug = url_slug(&target.url);
        Self {
            target,
            url_slug: slug,
            captured_at: Utc::now(),
            run_stamp,
        }
    }
}

/// Capture one target across every device context in parallel.
///
/// Each device capture runs on its own task. A capture that panics surfaces
/// here as an error; the caller then counts the whole target as failed.
pub async fn process_target(
    contexts: &[Arc<dyn DeviceContext>],
    uploader: &Uploader,
    target: Target,
    run_stamp: &str,
    jpeg_quality: u8,
) -> Result<CaptureTally> {
    let job = CaptureJob::new(target, run_stamp.to_string());

    let handles: Vec<_> = contexts
        .iter()
        .map(|ctx| {
            tokio::spawn(capture_one(
                Arc::clone(ctx),
                uploader.clone(),
                job.clone(),
                jpeg_quality,
            ))
        })
        .collect();

    let mut tally = CaptureTally::default();
    let mut aborted = None;
    for outcome in join_all(handles).await {
        match outcome {
            Ok(device_tally) => tally.absorb(device_tally),
            Err(e) => aborted = Some(e),
        }
    }
    if let Some(e) = aborted {
        anyhow::bail!("capture task aborted: {e}");
    }
    Ok(tally)
}

/// Run one device capture and hand its outcome to the uploader.
///
/// Never fails: a broken capture becomes a failure marker upload and a
/// failed tally entry.
pub async fn capture_one(
    ctx: Arc<dyn DeviceContext>,
    uploader: Uploader,
    job: CaptureJob,
    jpeg_quality: u8,
) -> CaptureTally {
    let device = ctx.profile().name;
    info!(
        "capturing {} [{}] [{}]",
        job.target.url, job.target.language, device
    );

    match run_capture(ctx.as_ref(), &job, jpeg_quality).await {
        Ok(bytes) => {
            let key = object_key(&job.url_slug, device, &job.run_stamp);
            uploader
                .upload(CaptureResult::ok(
                    &job.target.id,
                    device,
                    job.captured_at,
                    bytes,
                    key,
                ))
                .await;
            CaptureTally::success()
        }
        Err(e) => {
            error!("capture failed for {} [{}]: {e:#}", job.target.url, device);
            uploader
                .upload(CaptureResult::failed(&job.target.id, device, job.captured_at))
                .await;
            CaptureTally::failure()
        }
    }
}

/// The fallible part of a capture: open, navigate, sanitize, screenshot.
async fn run_capture(
    ctx: &dyn DeviceContext,
    job: &CaptureJob,
    jpeg_quality: u8,
) -> Result<Vec<u8>> {
    let page = ctx.open_page().await.context("opening page")?;

    let shot = async {
        page.navigate(&job.target.url, NAVIGATION_TIMEOUT).await?;
        page.evaluate(SANITIZE_SCRIPT)
            .await
            .context("sanitizing page")?;
        page.screenshot_jpeg(jpeg_quality).await
    }
    .await;

    // The page is closed no matter how the chain above ended.
    if let Err(e) = page.close().await {
        warn!("failed to close page for {}: {e:#}", job.target.url);
    }

    shot
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tally_absorbs_device_outcomes() {
        let mut tally = CaptureTally::default();
        tally.absorb(CaptureTally::success());
        tally.absorb(CaptureTally::failure());
        tally.absorb(CaptureTally::success());
        assert_eq!(
            tally,
            CaptureTally {
                completed: 2,
                failed: 1
            }
        );
    }

    #[test]
    fn job_derives_slug_from_target_url() {
        let target = Target {
            id: "42".into(),
            url: "https://www.example.com/pricing".into(),
            language: "en".into(),
        };
        let job = CaptureJob::new(target, "2026-08-23T06:00:00.000Z".into());
        assert_eq!(job.url_slug, "www-example-com-pricing");
        assert_eq!(job.run_stamp, "2026-08-23T06:00:00.000Z");
    }
}
