//! Navigation menu loading and merging.
//!
//! Menus are JSON objects mapping a menu key to its entry definition. The
//! base menu is mandatory; sub-application fragments are optional.

pub mod merger;

pub use merger::MenuMerger;

use crate::error::{AggregateError, Result};
use crate::models::NavigationDocument;
use serde_json::Value;
use std::io;
use std::path::Path;
use tracing::debug;

/// Load a menu document that must exist.
pub fn load_document(path: &Path) -> Result<NavigationDocument> {
    let content = std::fs::read_to_string(path).map_err(|source| AggregateError::MenuRead {
        path: path.to_path_buf(),
        source,
    })?;

    parse_document(&content, path)
}

/// Load a menu document that may be absent.
///
/// A missing file yields `Ok(None)`; a file that exists but does not parse
/// is still an error.
pub fn load_optional(path: &Path) -> Result<Option<NavigationDocument>> {
    match std::fs::read_to_string(path) {
        Ok(content) => parse_document(&content, path).map(Some),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            debug!("No menu fragment at {}", path.display());
            Ok(None)
        }
        Err(source) => Err(AggregateError::MenuRead {
            path: path.to_path_buf(),
            source,
        }),
    }
}

fn parse_document(content: &str, path: &Path) -> Result<NavigationDocument> {
    let value: Value = serde_json::from_str(content).map_err(|source| AggregateError::MenuParse {
        path: path.to_path_buf(),
        source,
    })?;

    match value {
        Value::Object(entries) => Ok(NavigationDocument::from_map(entries)),
        _ => Err(AggregateError::MenuNotObject {
            path: path.to_path_buf(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_load_document() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("menu.json");
        fs::write(&path, r#"{"dashboard": {"title": "Dashboard"}}"#).unwrap();

        let doc = load_document(&path).unwrap();
        assert_eq!(doc.len(), 1);
        assert!(doc.contains_key("dashboard"));
    }

    #[test]
    fn test_load_document_missing_is_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("menu.json");

        let err = load_document(&path).unwrap_err();
        assert!(matches!(err, AggregateError::MenuRead { .. }));
        assert!(err.to_string().contains("menu.json"));
    }

    #[test]
    fn test_load_optional_missing() {
        let dir = TempDir::new().unwrap();
        let result = load_optional(&dir.path().join("menu.json")).unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn test_load_optional_malformed_is_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("menu.json");
        fs::write(&path, "{\"alpha.home\": ").unwrap();

        let err = load_optional(&path).unwrap_err();
        assert!(matches!(err, AggregateError::MenuParse { .. }));
    }

    #[test]
    fn test_non_object_menu_is_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("menu.json");
        fs::write(&path, r#"["dashboard"]"#).unwrap();

        let err = load_document(&path).unwrap_err();
        assert!(matches!(err, AggregateError::MenuNotObject { .. }));
    }
}
