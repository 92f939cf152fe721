//! Loading, refreshing and writing back the YAML configuration document.
//!
//! # Module invariants
//!
//! - Secret node fields leave this module sealed; plaintext values are never
//!   logged.
//! - The document is rewritten only after a refresh pass succeeds.

pub mod model;
pub mod refresh;

pub use model::Document;
pub use refresh::refresh;

use std::path::Path;

use anyhow::{Context, Result};
use tracing::info;

/// Read and parse the document at `path`.
///
/// # Errors
///
/// Returns an error if the file is missing or read-only, if its directory is
/// read-only (the document could not be written back), or if the file is not
/// a valid document.
pub async fn load(path: impl AsRef<Path>) -> Result<Document> {
    let path = path.as_ref();

    let metadata = tokio::fs::metadata(path)
        .await
        .with_context(|| format!("config does not exist: {}", path.display()))?;
    if !metadata.is_file() {
        anyhow::bail!("config is not a regular file: {}", path.display());
    }
    if metadata.permissions().readonly() {
        anyhow::bail!("config is not writable: {}", path.display());
    }

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let dir_metadata = tokio::fs::metadata(dir)
        .await
        .with_context(|| format!("check config directory: {}", dir.display()))?;
    if dir_metadata.permissions().readonly() {
        anyhow::bail!("directory is not writable: {}", dir.display());
    }

    let text = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("error reading file: {}", path.display()))?;

    let doc: Document = serde_yaml::from_str(&text)
        .with_context(|| format!("error unmarshaling yaml: {}", path.display()))?;

    info!(path = %path.display(), nodes = doc.nodes.list.len(), "document loaded");
    Ok(doc)
}

/// Serialise `doc` and overwrite the file at `path`.
///
/// # Errors
///
/// Returns an error if serialisation or the write fails.
pub async fn store(path: impl AsRef<Path>, doc: &Document) -> Result<()> {
    let path = path.as_ref();
    let text = serde_yaml::to_string(doc).context("failed to serialise document")?;
    tokio::fs::write(path, text)
        .await
        .with_context(|| format!("failed to write config: {}", path.display()))?;
    info!(path = %path.display(), "document written");
    Ok(())
}
