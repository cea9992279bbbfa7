//! List the tracked capture targets.

use crate::config::AgentConfig;
use crate::targets::TargetLoader;
use anyhow::{Context, Result};

/// Fetch and print the target list.
pub async fn run(as_json: bool) -> Result<()> {
    let config = AgentConfig::from_env()?;
    let targets = TargetLoader::new(&config)
        .try_load()
        .await
        .context("fetching targets")?;

    if as_json {
        println!("{}", serde_json::to_string_pretty(&targets)?);
        return Ok(());
    }

    if targets.is_empty() {
        println!("No targets available.");
        return Ok(());
    }

    println!("{} target(s):", targets.len());
    for target in &targets {
        println!("  {:>6}  {:<5}  {}", target.id, target.language, target.url);
    }
    Ok(())
}
