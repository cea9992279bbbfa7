//! Runtime configuration resolved once at process start.
//!
//! Endpoint URLs and capture knobs live in an explicit `AgentConfig` that is
//! passed into the pipeline components; nothing reads the environment after
//! startup.

use anyhow::{bail, Result};
use std::path::PathBuf;

/// Hardened Chromium launch arguments for containerized headless capture.
pub const BROWSER_ARGS: &[&str] = &[
    "--headless=new",
    "--no-sandbox",
    "--disable-setuid-sandbox",
    "--disable-gpu",
    "--disable-dev-shm-usage",
    "--hide-scrollbars",
    "--disable-notifications",
    "--disable-extensions",
    "--mute-audio",
];

/// Default JPEG quality for captured screenshots.
pub const DEFAULT_JPEG_QUALITY: u8 = 80;

/// Agent configuration, sourced from the environment.
#[derive(Debug, Clone)]
pub struct AgentConfig {
    /// Base URL of the storage API, without trailing slash.
    pub api_base_url: String,
    /// Bearer token for authenticated endpoints; omitted when unset.
    pub api_key: Option<String>,
    /// Explicit Chromium executable override.
    pub chromium_path: Option<PathBuf>,
    /// JPEG quality for captures, 1-100.
    pub jpeg_quality: u8,
}

impl AgentConfig {
    /// Build a config from explicit values. Tests use this directly with a
    /// mock server's URL as the base.
    pub fn new(
        api_base_url: &str,
        api_key: Option<String>,
        chromium_path: Option<PathBuf>,
        jpeg_quality: u8,
    ) -> Self {
        Self {
            api_base_url: api_base_url.trim_end_matches('/').to_string(),
            api_key,
            chromium_path,
            jpeg_quality,
        }
    }

    /// Load configuration from the environment. `API_BASE_URL` is required;
    /// everything else has a default.
    pub fn from_env() -> Result<Self> {
        let base = match std::env::var("API_BASE_URL") {
            Ok(v) if !v.trim().is_empty() => v,
            _ => bail!("API_BASE_URL is not set"),
        };
        let api_key = std::env::var("API_KEY").ok().filter(|k| !k.is_empty());
        let chromium_path = std::env::var("SHUTTER_CHROMIUM_PATH")
            .ok()
            .filter(|p| !p.is_empty())
            .map(PathBuf::from);
        let jpeg_quality = parse_jpeg_quality(std::env::var("SHUTTER_JPEG_QUALITY").ok());

        Ok(Self::new(&base, api_key, chromium_path, jpeg_quality))
    }

    /// `GET` endpoint serving the target list.
    pub fn targets_endpoint(&self) -> String {
        format!("{}/urls", self.api_base_url)
    }

    /// `POST` endpoint receiving screenshot uploads.
    pub fn upload_endpoint(&self) -> String {
        format!("{}/upload-screenshot", self.api_base_url)
    }

    /// `POST` endpoint receiving run summaries.
    pub fn runs_endpoint(&self) -> String {
        format!("{}/runs", self.api_base_url)
    }
}

/// Parse a quality override, falling back to the default for anything
/// missing or out of the 1-100 range.
fn parse_jpeg_quality(raw: Option<String>) -> u8 {
    raw.and_then(|v| v.trim().parse::<u8>().ok())
        .filter(|q| (1..=100).contains(q))
        .unwrap_or(DEFAULT_JPEG_QUALITY)
}
