//! Batch orchestration: load targets, capture them all, report the run.

use crate::capture;
use crate::config::AgentConfig;
use crate::devices::DEVICE_PROFILES;
use crate::keys::run_stamp;
use crate::report::{RunCounters, RunReporter, RunSummary};
use crate::session::{
    close_device_contexts, open_device_contexts, BrowserEngine, ChromiumSession, DeviceContext,
};
use crate::targets::{Target, TargetLoader};
use crate::uploader::Uploader;
use anyhow::Result;
use chrono::Utc;
use futures::{stream, StreamExt};
use std::future::Future;
use std::sync::Arc;
use tracing::{error, info, warn};

/// Run one capture batch end to end against a real Chromium.
///
/// Returns `Ok(None)` when there was nothing to capture. `concurrency` is
/// the number of targets rendered at once; devices within a target always
/// run in parallel.
pub async fn run(config: &AgentConfig, concurrency: usize) -> Result<Option<RunSummary>> {
    run_with_launcher(config, concurrency, || ChromiumSession::launch(config)).await
}

/// Run one capture batch with a caller-supplied browser launcher.
///
/// The launcher is invoked only once targets are known to exist; an empty
/// target list ends the run before any browser starts. A launcher failure
/// is fatal and propagates without a run report.
pub async fn run_with_launcher<F, Fut>(
    config: &AgentConfig,
    concurrency: usize,
    launch: F,
) -> Result<Option<RunSummary>>
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<Arc<dyn BrowserEngine>>>,
{
    let started_at = Utc::now();
    let stamp = run_stamp(started_at);
    info!("starting capture run at {stamp}");

    let targets = TargetLoader::new(config).load().await;
    if targets.is_empty() {
        warn!("no targets to capture; skipping run");
        return Ok(None);
    }

    let total_urls = targets.len() as u32;
    let device_count = DEVICE_PROFILES.len() as u32;
    let uploader = Uploader::new(config);
    let reporter = RunReporter::new(config);

    let engine = launch().await?;

    let counters = match open_device_contexts(engine.as_ref(), DEVICE_PROFILES).await {
        Ok(contexts) => {
            let counters = process_targets(
                &contexts,
                &uploader,
                targets,
                &stamp,
                config.jpeg_quality,
                concurrency,
            )
            .await;
            close_device_contexts(&contexts).await;
            counters
        }
        Err(e) => {
            error!("failed to open device contexts: {e:#}");
            // Every planned screenshot slot is still accounted for.
            RunCounters {
                successful_urls: 0,
                failed_urls: total_urls,
                completed_screenshots: 0,
                failed_screenshots: total_urls * device_count,
            }
        }
    };

    if let Err(e) = engine.shutdown().await {
        warn!("failed to close browser: {e:#}");
    }

    let completed_at = Utc::now();
    let summary =
        RunSummary::finalize(counters, total_urls, device_count, started_at, completed_at);
    info!(
        "run finished in {:.1}s: {}/{} screenshots, {}/{} urls",
        summary.duration_seconds,
        summary.completed_screenshots,
        summary.total_screenshots,
        summary.successful_urls,
        summary.total_urls
    );

    reporter.report(&summary).await;

    Ok(Some(summary))
}

/// Drive every target through capture, at most `concurrency` targets in
/// flight at once.
async fn process_targets(
    contexts: &[Arc<dyn DeviceContext>],
    uploader: &Uploader,
    targets: Vec<Target>,
    stamp: &str,
    jpeg_quality: u8,
    concurrency: usize,
) -> RunCounters {
    let total = targets.len();
    let device_count = contexts.len() as u32;

    let mut outcomes = stream::iter(targets.into_iter().enumerate())
        .map(|(index, target)| {
            let url = target.url.clone();
            async move {
                info!("processing target {}/{}: {}", index + 1, total, url);
                let outcome =
                    capture::process_target(contexts, uploader, target, stamp, jpeg_quality).await;
                (url, outcome)
            }
        })
        .buffered(concurrency.max(1));

    let mut counters = RunCounters::default();
    while let Some((url, outcome)) = outcomes.next().await {
        match outcome {
            Ok(tally) => {
                counters.completed_screenshots += tally.completed;
                counters.failed_screenshots += tally.failed;
                counters.successful_urls += 1;
            }
            Err(e) => {
                error!("target {url} failed: {e:#}");
                counters.failed_urls += 1;
                counters.failed_screenshots += device_count;
            }
        }
    }
    counters
}
