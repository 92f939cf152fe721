//! Tracing subscriber initialisation.

use anyhow::{Context, Result};
use tracing_subscriber::EnvFilter;

/// Crates whose events follow `LOG_LEVEL`; everything else stays at `warn`.
const OWN_TARGETS: [&str; 2] = ["sealer", "fieldcrypt"];

/// Initialise the global tracing subscriber for one sealing run.
///
/// JSON lines go to stdout so a wrapping script can tell the refresh report
/// apart from the document itself. `log_level` applies to the sealer and the
/// field cipher only; `RUST_LOG` replaces the whole filter when present.
///
/// # Errors
///
/// Returns an error if `log_level` is not a level name or a global subscriber
/// has already been set.
pub fn init(log_level: &str) -> Result<()> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => filter(log_level)?,
    };

    tracing_subscriber::fmt()
        .json()
        .with_env_filter(filter)
        .with_target(false)
        .try_init()
        .map_err(|e| anyhow::anyhow!("failed to initialise tracing subscriber: {e}"))
}

/// `warn` globally, `log_level` (case-insensitive) for the sealer's own crates.
fn filter(log_level: &str) -> Result<EnvFilter> {
    let level = log_level.to_ascii_lowercase();
    let directives = OWN_TARGETS
        .iter()
        .fold(String::from("warn"), |acc, target| format!("{acc},{target}={level}"));
    EnvFilter::try_new(&directives).with_context(|| format!("invalid LOG_LEVEL: {log_level}"))
}
