//! Target list acquisition.

use crate::config::AgentConfig;
use anyhow::{Context, Result};
use serde::{Deserialize, Deserializer, Serialize};
use tracing::{error, info};

/// One capture target as served by the URL registry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Target {
    /// Opaque registry identifier, echoed back in upload metadata. Some
    /// registry revisions serve it as a JSON number, so decode tolerantly.
    #[serde(deserialize_with = "opaque_id")]
    pub id: String,
    /// Fully qualified URL to capture.
    pub url: String,
    /// Content language tag; informational, carried into logs only.
    pub language: String,
}

/// Accept a string or integer id and normalize to a string.
fn opaque_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Number(i64),
    }

    Ok(match Raw::deserialize(deserializer)? {
        Raw::Text(s) => s,
        Raw::Number(n) => n.to_string(),
    })
}

/// Fetches the current target set from the registry endpoint.
pub struct TargetLoader {
    endpoint: String,
    client: reqwest::Client,
}

impl TargetLoader {
    pub fn new(config: &AgentConfig) -> Self {
        Self {
            endpoint: config.targets_endpoint(),
            client: reqwest::Client::new(),
        }
    }

    /// Fetch the target list. Any failure yields an empty list; the caller
    /// decides whether an empty run is worth launching a browser for.
    pub async fn load(&self) -> Vec<Target> {
        match self.try_load().await {
            Ok(targets) => {
                info!("loaded {} targets from {}", targets.len(), self.endpoint);
                targets
            }
            Err(e) => {
                error!("failed to load targets: {e:#}");
                Vec::new()
            }
        }
    }

    /// Fetch the target list, propagating failures to the caller.
    pub async fn try_load(&self) -> Result<Vec<Target>> {
        let resp = self
            .client
            .get(&self.endpoint)
            .send()
            .await
            .context("requesting target list")?;
        if !resp.status().is_success() {
            anyhow::bail!("target list fetch returned {}", resp.status());
        }
        resp.json().await.context("decoding target list")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_string_ids() {
        let targets: Vec<Target> = serde_json::from_str(
            r#"[{"id":"u-17","url":"https://a.test","language":"en"}]"#,
        )
        .unwrap();
        assert_eq!(targets[0].id, "u-17");
        assert_eq!(targets[0].url, "https://a.test");
        assert_eq!(targets[0].language, "en");
    }

    #[test]
    fn decodes_numeric_ids() {
        let targets: Vec<Target> =
            serde_json::from_str(r#"[{"id":1,"url":"https://a.test","language":"de"}]"#).unwrap();
        assert_eq!(targets[0].id, "1");
    }

    #[test]
    fn rejects_entries_missing_fields() {
        let parsed: Result<Vec<Target>, _> =
            serde_json::from_str(r#"[{"id":"1","url":"https://a.test"}]"#);
        assert!(parsed.is_err());
    }
}
