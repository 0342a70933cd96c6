//! Sub-application discovery.
//!
//! Every immediate subdirectory of the applications root is a
//! sub-application. Entries are returned in lexicographic order so that
//! menu collisions resolve the same way on every platform.

use crate::error::{AggregateError, Result};
use crate::menu;
use crate::models::ApplicationEntry;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

/// Where to look inside each sub-application.
#[derive(Debug, Clone)]
pub struct ProbeConfig {
    /// UI source directory, relative to the application directory.
    pub source_dir: PathBuf,
    /// Menu fragment file, relative to the application directory.
    pub menu_file: PathBuf,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            source_dir: PathBuf::from("htdoc"),
            menu_file: PathBuf::from("files/menu.json"),
        }
    }
}

impl From<&crate::config::LayoutConfig> for ProbeConfig {
    fn from(layout: &crate::config::LayoutConfig) -> Self {
        Self {
            source_dir: layout.app_source_dir.clone(),
            menu_file: layout.app_menu_file.clone(),
        }
    }
}

/// Discovers sub-applications under one root.
pub struct DirectoryProber {
    config: ProbeConfig,
    root: PathBuf,
}

impl DirectoryProber {
    /// Create a new prober for the given applications root.
    pub fn new(root: PathBuf, config: ProbeConfig) -> Self {
        Self { config, root }
    }

    /// List application directories, sorted by name.
    ///
    /// Symbolic links to directories count as directories. Plain files and
    /// dangling links are skipped.
    pub fn candidates(&self) -> Result<Vec<PathBuf>> {
        // Surface a missing or non-directory root before walking it.
        fs::read_dir(&self.root).map_err(|source| AggregateError::ApplicationsRootUnreadable {
            path: self.root.clone(),
            source,
        })?;

        let walker = WalkDir::new(&self.root)
            .min_depth(1)
            .max_depth(1)
            .follow_links(true)
            .sort_by_file_name();

        let mut dirs = Vec::new();

        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) if e.depth() == 0 => {
                    return Err(AggregateError::ApplicationsRootUnreadable {
                        path: self.root.clone(),
                        source: e.into(),
                    });
                }
                Err(e) => {
                    warn!("Skipping unreadable entry in {}: {}", self.root.display(), e);
                    continue;
                }
            };

            if entry.file_type().is_dir() {
                dirs.push(entry.into_path());
            } else {
                debug!("Skipping non-directory {}", entry.path().display());
            }
        }

        Ok(dirs)
    }

    /// Discover all sub-applications, loading their menu fragments.
    pub fn discover(&self) -> Result<Vec<ApplicationEntry>> {
        info!("Discovering applications in {}", self.root.display());

        let entries = self
            .candidates()?
            .into_iter()
            .map(|dir| self.probe_application(&dir))
            .collect::<Result<Vec<_>>>()?;

        info!("Found {} applications", entries.len());
        Ok(entries)
    }

    /// Build the entry for a single application directory.
    fn probe_application(&self, dir: &Path) -> Result<ApplicationEntry> {
        let name = dir
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| AggregateError::InvalidApplicationName {
                path: dir.to_path_buf(),
            })?
            .to_string();

        let source_path = dir.join(&self.config.source_dir);
        if !source_path.is_dir() {
            return Err(AggregateError::MissingSourceDir { name, path: source_path });
        }

        let menu_fragment = menu::load_optional(&dir.join(&self.config.menu_file))?;

        debug!(
            "Application '{}' at {} (menu: {})",
            name,
            source_path.display(),
            if menu_fragment.is_some() { "yes" } else { "no" }
        );

        Ok(ApplicationEntry {
            name,
            source_path,
            menu_fragment,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn make_app(root: &Path, name: &str, menu: Option<&str>) {
        fs::create_dir_all(root.join(name).join("htdoc")).unwrap();
        if let Some(menu) = menu {
            fs::create_dir_all(root.join(name).join("files")).unwrap();
            fs::write(root.join(name).join("files").join("menu.json"), menu).unwrap();
        }
    }

    fn prober(root: &Path) -> DirectoryProber {
        DirectoryProber::new(root.to_path_buf(), ProbeConfig::default())
    }

    #[test]
    fn test_discovers_one_entry_per_directory() {
        let dir = TempDir::new().unwrap();
        make_app(dir.path(), "gamma", None);
        make_app(dir.path(), "alpha", None);
        make_app(dir.path(), "beta", None);
        fs::write(dir.path().join("README.md"), "not an app").unwrap();

        let entries = prober(dir.path()).discover().unwrap();
        let names: Vec<&str> = entries.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["alpha", "beta", "gamma"]);
    }

    #[test]
    fn test_source_path_points_at_htdoc() {
        let dir = TempDir::new().unwrap();
        make_app(dir.path(), "alpha", None);

        let entries = prober(dir.path()).discover().unwrap();
        assert_eq!(entries[0].source_path, dir.path().join("alpha").join("htdoc"));
    }

    #[test]
    fn test_menu_fragment_is_optional() {
        let dir = TempDir::new().unwrap();
        make_app(dir.path(), "alpha", Some(r#"{"alpha.home": {"title": "Alpha"}}"#));
        make_app(dir.path(), "beta", None);

        let entries = prober(dir.path()).discover().unwrap();
        assert!(entries[0].has_menu());
        assert!(!entries[1].has_menu());
        let fragment = entries[0].menu_fragment.as_ref().unwrap();
        assert!(fragment.contains_key("alpha.home"));
    }

    #[test]
    fn test_malformed_fragment_is_fatal() {
        let dir = TempDir::new().unwrap();
        make_app(dir.path(), "alpha", Some("{not json"));

        let err = prober(dir.path()).discover().unwrap_err();
        assert!(matches!(err, AggregateError::MenuParse { .. }));
        assert!(err.to_string().contains("alpha"));
    }

    #[test]
    fn test_missing_root_is_fatal() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("applications");

        let err = prober(&missing).discover().unwrap_err();
        assert!(matches!(err, AggregateError::ApplicationsRootUnreadable { .. }));
        assert!(err.to_string().contains("applications"));
    }

    #[test]
    fn test_root_that_is_a_file_is_fatal() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("applications");
        fs::write(&file, "").unwrap();

        assert!(prober(&file).candidates().is_err());
    }

    #[test]
    fn test_missing_source_dir_is_fatal() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("alpha")).unwrap();

        let err = prober(dir.path()).discover().unwrap_err();
        match err {
            AggregateError::MissingSourceDir { name, .. } => assert_eq!(name, "alpha"),
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn test_does_not_recurse() {
        let dir = TempDir::new().unwrap();
        make_app(dir.path(), "alpha", None);
        fs::create_dir_all(dir.path().join("alpha").join("htdoc").join("nested")).unwrap();

        let candidates = prober(dir.path()).candidates().unwrap();
        assert_eq!(candidates.len(), 1);
    }

    #[cfg(unix)]
    #[test]
    fn test_directory_links_count_and_dangling_links_skip() {
        use std::os::unix::fs::symlink;

        let dir = TempDir::new().unwrap();
        let outside = TempDir::new().unwrap();
        let root = dir.path().join("applications");
        fs::create_dir_all(&root).unwrap();
        make_app(&root, "alpha", None);
        make_app(outside.path(), "shared", Some(r#"{"shared.home": {}}"#));

        symlink(outside.path().join("shared"), root.join("linked")).unwrap();
        symlink(outside.path().join("gone"), root.join("dangling")).unwrap();

        let entries = prober(&root).discover().unwrap();
        let names: Vec<&str> = entries.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["alpha", "linked"]);
        assert_eq!(entries[1].source_path, root.join("linked").join("htdoc"));
        assert!(entries[1].has_menu());
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn test_non_utf8_application_name_is_fatal() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let dir = TempDir::new().unwrap();
        let name = OsStr::from_bytes(b"app-\xff");
        fs::create_dir_all(dir.path().join(name).join("htdoc")).unwrap();

        let err = prober(dir.path()).discover().unwrap_err();
        assert!(matches!(err, AggregateError::InvalidApplicationName { .. }));
        assert!(err.is_configuration_error());
    }

    #[test]
    fn test_empty_root_yields_no_entries() {
        let dir = TempDir::new().unwrap();
        assert!(prober(dir.path()).discover().unwrap().is_empty());
    }
}
