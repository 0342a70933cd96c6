//! Data models for the aggregator.
//!
//! This module contains the core data structures shared by discovery,
//! menu merging, linking and build context generation.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::path::PathBuf;

/// Execution context of the surrounding build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BuildMode {
    /// Interactive dev server: discovery runs, dev routes stay live.
    Development,
    /// Static build: discovery is skipped, dev routes are stubbed out.
    Production,
}

impl BuildMode {
    /// Interpret the bundler's mode string.
    ///
    /// Only the exact value `development` selects interactive mode; custom
    /// modes such as `staging` are static builds.
    pub fn from_mode_str(mode: &str) -> Self {
        if mode == "development" {
            BuildMode::Development
        } else {
            BuildMode::Production
        }
    }

    pub fn is_development(self) -> bool {
        self == BuildMode::Development
    }
}

impl fmt::Display for BuildMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BuildMode::Development => write!(f, "development"),
            BuildMode::Production => write!(f, "production"),
        }
    }
}

/// What to do when two menu sources declare the same key.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum CollisionPolicy {
    /// Later source wins (shallow merge)
    #[default]
    Overwrite,
    /// Differing duplicates abort the build
    Error,
}

/// How sub-application sources are made addressable to the bundler.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum LinkStrategy {
    /// Symbolic links under the aggregator's source tree
    #[default]
    Symlink,
    /// Per-application path aliases, no filesystem changes
    Alias,
}

/// A navigation menu: menu key to entry definition.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NavigationDocument {
    entries: Map<String, Value>,
}

impl NavigationDocument {
    /// Creates an empty document.
    #[allow(dead_code)] // Used by tests and as a neutral base
    pub fn new() -> Self {
        Self::default()
    }

    /// Wraps an already-parsed JSON object.
    pub fn from_map(entries: Map<String, Value>) -> Self {
        Self { entries }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.get(key)
    }

    #[allow(dead_code)] // Lookup utility
    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.entries.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[allow(dead_code)] // Utility for callers inspecting a document
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Insert or replace one entry, returning the displaced value.
    ///
    /// Crate-private: only the merger mutates a document.
    pub(crate) fn insert(&mut self, key: String, value: Value) -> Option<Value> {
        self.entries.insert(key, value)
    }

    /// The document as a JSON value, for injection as a global constant.
    pub fn to_value(&self) -> Value {
        Value::Object(self.entries.clone())
    }
}

/// One discovered sub-application.
#[derive(Debug, Clone, PartialEq)]
pub struct ApplicationEntry {
    /// Directory name; unique within the applications root.
    pub name: String,
    /// Absolute path of the application's UI source directory.
    pub source_path: PathBuf,
    /// Menu fragment contributed by the application, if any.
    pub menu_fragment: Option<NavigationDocument>,
}

impl ApplicationEntry {
    pub fn has_menu(&self) -> bool {
        self.menu_fragment.is_some()
    }
}

/// A link from the aggregator's tree to an application's sources.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceLink {
    /// Application the link belongs to.
    pub name: String,
    /// Location of the link inside the aggregator's source tree.
    pub link_path: PathBuf,
    /// Directory the link points at.
    pub target: PathBuf,
}
