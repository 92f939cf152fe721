//! `sealer` — binary entry point.
//!
//! Startup sequence:
//! 1. Load and validate [`Config`] from environment variables / arguments.
//! 2. Initialise structured logging.
//! 3. Load the YAML document.
//! 4. Fill generated defaults and seal secret node fields.
//! 5. Write the refreshed document back (skipped on dry run).

mod config;
mod document;
mod secrets;
mod telemetry;

use anyhow::{Context, Result};
use tracing::info;

use config::Config;

#[tokio::main]
async fn main() -> Result<()> {
    // -----------------------------------------------------------------------
    // 1. Configuration
    // -----------------------------------------------------------------------
    let cfg = Config::from_env().map_err(|e| {
        // Telemetry is not yet up; write to stderr directly.
        eprintln!("ERROR: configuration invalid: {e:#}");
        e
    })?;

    // -----------------------------------------------------------------------
    // 2. Telemetry
    // -----------------------------------------------------------------------
    telemetry::init(&cfg.log_level)?;
    info!(
        version = env!("CARGO_PKG_VERSION"),
        path = %cfg.config_path,
        dry_run = cfg.dry_run,
        "sealer starting"
    );

    // -----------------------------------------------------------------------
    // 3. Document
    // -----------------------------------------------------------------------
    let mut doc = document::load(&cfg.config_path).await?;

    // -----------------------------------------------------------------------
    // 4. Refresh and seal (CPU-bound)
    // -----------------------------------------------------------------------
    let db_host = cfg.db_host.clone();
    let (doc, report) = tokio::task::spawn_blocking(move || {
        document::refresh(&mut doc, &db_host).map(|report| (doc, report))
    })
    .await
    .context("sealing task failed")?
    .context("parse config error")?;

    info!(
        sealed = report.sealed,
        already_sealed = report.already_sealed,
        generated_defaults = report.generated_defaults,
        "document refreshed"
    );

    // -----------------------------------------------------------------------
    // 5. Write back
    // -----------------------------------------------------------------------
    if cfg.dry_run {
        info!("dry run; document left unchanged on disk");
        return Ok(());
    }
    document::store(&cfg.config_path, &doc).await?;

    Ok(())
}
