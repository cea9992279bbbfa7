//! Run summary accumulation and end-of-run reporting.

use crate::config::AgentConfig;
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{error, info};

/// Counters accumulated while the batch runs.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RunCounters {
    pub successful_urls: u32,
    pub failed_urls: u32,
    pub completed_screenshots: u32,
    pub failed_screenshots: u32,
}

/// Aggregate outcome of one batch run, as posted to the metadata endpoint.
///
/// Field names are the report wire contract; status dashboards read these
/// counters to detect degraded runs.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub total_screenshots: u32,
    pub completed_screenshots: u32,
    pub failed_screenshots: u32,
    pub total_urls: u32,
    pub successful_urls: u32,
    pub failed_urls: u32,
    pub duration_seconds: f64,
    pub started_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
}

impl RunSummary {
    /// Finalize accumulated counters into the reportable summary.
    pub fn finalize(
        counters: RunCounters,
        total_urls: u32,
        device_count: u32,
        started_at: DateTime<Utc>,
        completed_at: DateTime<Utc>,
    ) -> Self {
        Self {
            total_screenshots: total_urls * device_count,
            completed_screenshots: counters.completed_screenshots,
            failed_screenshots: counters.failed_screenshots,
            total_urls,
            successful_urls: counters.successful_urls,
            failed_urls: counters.failed_urls,
            duration_seconds: (completed_at - started_at).num_milliseconds() as f64 / 1000.0,
            started_at,
            completed_at,
        }
    }
}

/// Posts the run summary after teardown; best-effort, never fails the run.
pub struct RunReporter {
    endpoint: String,
    api_key: Option<String>,
    client: reqwest::Client,
}

impl RunReporter {
    pub fn new(config: &AgentConfig) -> Self {
        Self {
            endpoint: config.runs_endpoint(),
            api_key: config.api_key.clone(),
            client: reqwest::Client::new(),
        }
    }

    /// Send the summary. Transport errors and rejections are logged only.
    pub async fn report(&self, summary: &RunSummary) {
        match self.try_report(summary).await {
            Ok(()) => info!(
                "run summary reported: {}/{} screenshots completed",
                summary.completed_screenshots, summary.total_screenshots
            ),
            Err(e) => error!("failed to report run summary: {e:#}"),
        }
    }

    async fn try_report(&self, summary: &RunSummary) -> Result<()> {
        let mut req = self.client.post(&self.endpoint).json(summary);
        if let Some(ref key) = self.api_key {
            req = req.header("Authorization", format!("Bearer {key}"));
        }

        let resp = req.send().await.context("posting run summary")?;
        if !resp.status().is_success() {
            anyhow::bail!(
                "run report rejected: {} {}",
                resp.status(),
                resp.text().await.unwrap_or_default()
            );
        }
        Ok(())
    }
}
