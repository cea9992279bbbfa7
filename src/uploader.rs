//! Screenshot transmission to the storage endpoint.

use crate::config::AgentConfig;
use anyhow::{Context, Result};
use chrono::{DateTime, SecondsFormat, Utc};
use reqwest::multipart::{Form, Part};
use tracing::{debug, error};

/// Outcome status carried in upload metadata.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobStatus {
    Ok,
    Failed,
}

impl JobStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            JobStatus::Ok => "ok",
            JobStatus::Failed => "failed",
        }
    }
}

/// One capture outcome, ready for transmission and then discarded.
///
/// Built only through [`CaptureResult::ok`] and [`CaptureResult::failed`],
/// which keep the status/payload pairing consistent: a failed result never
/// carries bytes or a storage key, a successful one always carries both.
#[derive(Debug, Clone)]
pub struct CaptureResult {
    pub target_id: String,
    pub device_name: String,
    pub captured_at: DateTime<Utc>,
    pub status: JobStatus,
    pub image_bytes: Option<Vec<u8>>,
    pub storage_key: Option<String>,
}

impl CaptureResult {
    /// A successful capture with its JPEG payload and storage key.
    pub fn ok(
        target_id: &str,
        device_name: &str,
        captured_at: DateTime<Utc>,
        image_bytes: Vec<u8>,
        storage_key: String,
    ) -> Self {
        Self {
            target_id: target_id.to_string(),
            device_name: device_name.to_string(),
            captured_at,
            status: JobStatus::Ok,
            image_bytes: Some(image_bytes),
            storage_key: Some(storage_key),
        }
    }

    /// A failure marker: no payload, no key, but still transmitted so
    /// consumers can tell "known failure" from "no data".
    pub fn failed(target_id: &str, device_name: &str, captured_at: DateTime<Utc>) -> Self {
        Self {
            target_id: target_id.to_string(),
            device_name: device_name.to_string(),
            captured_at,
            status: JobStatus::Failed,
            image_bytes: None,
            storage_key: None,
        }
    }
}

/// Transmits capture results to the storage endpoint.
///
/// The uploader is terminal: transport failures are logged here and never
/// surface to callers as control flow.
#[derive(Clone)]
pub struct Uploader {
    endpoint: String,
    api_key: Option<String>,
    client: reqwest::Client,
}

impl Uploader {
    pub fn new(config: &AgentConfig) -> Self {
        Self {
            endpoint: config.upload_endpoint(),
            api_key: config.api_key.clone(),
            client: reqwest::Client::new(),
        }
    }

    /// Transmit one capture result, awaiting completion before returning.
    pub async fn upload(&self, result: CaptureResult) {
        let target_id = result.target_id.clone();
        let device = result.device_name.clone();
        let status = result.status;

        match self.try_upload(result).await {
            Ok(()) => debug!("uploaded {} capture for target {target_id} [{device}]", status.as_str()),
            Err(e) => match status {
                JobStatus::Ok => {
                    error!("upload failed for target {target_id} [{device}]: {e:#}");
                }
                JobStatus::Failed => {
                    // Losing a failure marker means silent data loss downstream.
                    error!(
                        "failed to report capture failure for target {target_id} [{device}]: {e:#}"
                    );
                }
            },
        }
    }

    async fn try_upload(&self, result: CaptureResult) -> Result<()> {
        let captured_at = result
            .captured_at
            .to_rfc3339_opts(SecondsFormat::Millis, true);

        let mut req = match (result.image_bytes, result.storage_key) {
            (Some(bytes), Some(key)) => {
                let image = Part::bytes(bytes)
                    .file_name(format!("{}.jpg", result.device_name))
                    .mime_str("image/jpeg")
                    .context("building image part")?;
                let form = Form::new()
                    .text("url_id", result.target_id.clone())
                    .text("objectKey", key)
                    .text("deviceName", result.device_name.clone())
                    .text("jobStatus", result.status.as_str())
                    .text("capturedAt", captured_at)
                    .part("image", image);
                self.client.post(&self.endpoint).multipart(form)
            }
            // Failure markers omit the image and key entirely.
            _ => self.client.post(&self.endpoint).form(&[
                ("url_id", result.target_id.as_str()),
                ("deviceName", result.device_name.as_str()),
                ("jobStatus", result.status.as_str()),
                ("capturedAt", captured_at.as_str()),
            ]),
        };

        if let Some(ref key) = self.api_key {
            req = req.header("Authorization", format!("Bearer {key}"));
        }

        let resp = req.send().await.context("posting capture result")?;
        if !resp.status().is_success() {
            anyhow::bail!(
                "upload rejected: {} {}",
                resp.status(),
                resp.text().await.unwrap_or_default()
            );
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ok_results_carry_bytes_and_key() {
        let result = CaptureResult::ok("1", "desktop", Utc::now(), vec![0xFF, 0xD8], "a/b/c.jpg".into());
        assert_eq!(result.status, JobStatus::Ok);
        assert!(result.image_bytes.is_some());
        assert!(result.storage_key.is_some());
    }

    #[test]
    fn failed_results_carry_neither_bytes_nor_key() {
        let result = CaptureResult::failed("1", "mobile", Utc::now());
        assert_eq!(result.status, JobStatus::Failed);
        assert!(result.image_bytes.is_none());
        assert!(result.storage_key.is_none());
    }

    #[test]
    fn status_strings_match_the_wire_contract() {
        assert_eq!(JobStatus::Ok.as_str(), "ok");
        assert_eq!(JobStatus::Failed.as_str(), "failed");
    }
}
