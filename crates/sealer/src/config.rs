//! Runtime settings for the sealer binary.
//!
//! Values are read from environment variables; the document path may also be
//! passed as the first command-line argument, which takes precedence over
//! `CONFIG_PATH`.

use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

/// Validated sealer settings.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Path of the YAML document to refresh in place. **Required.**
    #[serde(default)]
    pub config_path: String,

    /// Tracing log level (e.g. `"info"`, `"debug"`).
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Refresh and seal in memory without writing the document back.
    #[serde(default)]
    pub dry_run: bool,

    /// Host recorded when a default database section has to be generated.
    #[serde(default = "default_db_host")]
    pub db_host: String,
}

fn default_log_level() -> String {
    "info".into()
}
fn default_db_host() -> String {
    "app-db".into()
}

impl Config {
    /// Load and validate settings from the environment and command line.
    ///
    /// # Errors
    ///
    /// Returns an error if a variable cannot be parsed or validation fails.
    pub fn from_env() -> Result<Self> {
        Self::load(std::env::args().nth(1))
    }

    fn load(path_arg: Option<String>) -> Result<Self> {
        let cfg = config::Config::builder()
            .add_source(config::Environment::default())
            .set_override_option("config_path", path_arg)
            .context("failed to apply command-line document path")?
            .build()
            .context("failed to build configuration from environment")?;

        let c: Config = cfg
            .try_deserialize()
            .context("failed to deserialise configuration")?;

        c.validate()?;
        Ok(c)
    }

    /// Validate all fields, returning a descriptive error on the first failure.
    fn validate(&self) -> Result<()> {
        if self.config_path.trim().is_empty() {
            anyhow::bail!("CONFIG_PATH (or a path argument) is required");
        }
        let ext = Path::new(&self.config_path)
            .extension()
            .and_then(|e| e.to_str());
        if !matches!(ext, Some("yml" | "yaml")) {
            anyhow::bail!("config extension is not supported: expected .yml or .yaml");
        }
        if self.log_level.trim().is_empty() {
            anyhow::bail!("LOG_LEVEL must not be empty");
        }
        if self.db_host.trim().is_empty() {
            anyhow::bail!("DB_HOST must not be empty");
        }
        Ok(())
    }
}
