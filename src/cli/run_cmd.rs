//! Run one capture batch.

use crate::config::AgentConfig;
use crate::runner;
use anyhow::Result;
use tracing::info;

/// Execute a capture run: load targets, shoot every device, report.
pub async fn run(concurrency: usize, verbose: bool, quiet: bool) -> Result<()> {
    // Initialize tracing
    let directive = if quiet {
        "shutter=warn"
    } else if verbose {
        "shutter=debug"
    } else {
        "shutter=info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(directive.parse().unwrap()),
        )
        .init();

    info!("starting shutter v{}", env!("CARGO_PKG_VERSION"));

    let config = AgentConfig::from_env()?;
    runner::run(&config, concurrency).await?;
    Ok(())
}
