//! JSON output of the build context.

use super::BuildContext;
use crate::error::{AggregateError, Result};
use std::io::{self, Write};
use std::path::Path;
use tempfile::NamedTempFile;
use tracing::info;

/// Serialize the context as pretty JSON.
pub fn generate_json(context: &BuildContext) -> serde_json::Result<String> {
    serde_json::to_string_pretty(context)
}

/// Write the context to `path`, replacing any previous file atomically.
///
/// Readers never see a partially written document.
pub fn write_context(context: &BuildContext, path: &Path) -> Result<()> {
    let wrap = |source: io::Error| AggregateError::WriteContext {
        path: path.to_path_buf(),
        source,
    };

    let content = generate_json(context)
        .map_err(|e| wrap(io::Error::new(io::ErrorKind::InvalidData, e)))?;

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(dir).map_err(wrap)?;

    let mut file = NamedTempFile::new_in(dir).map_err(wrap)?;
    file.write_all(content.as_bytes()).map_err(wrap)?;
    file.write_all(b"\n").map_err(wrap)?;
    file.persist(path).map_err(|e| wrap(e.error))?;

    info!("Build context written to {}", path.display());
    Ok(())
}
