//! Build context handed to the bundler.
//!
//! The context carries the compile-time constants (the merged menu) and the
//! path aliases the bundler must register before resolving any module. It is
//! assembled once per invocation and is read-only afterwards.

pub mod writer;

pub use writer::{generate_json, write_context};

use crate::models::{ApplicationEntry, BuildMode, NavigationDocument, SourceLink};
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// A symbolic import prefix and the directory it resolves to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AliasEntry {
    pub find: String,
    pub replacement: PathBuf,
}

/// What the context records about each aggregated application.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ApplicationSummary {
    pub name: String,
    pub source_path: PathBuf,
    /// Present when the sources were linked into the aggregator tree.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link_path: Option<PathBuf>,
    pub has_menu: bool,
}

/// Immutable result of configuration resolution.
#[derive(Debug, Clone, Serialize)]
pub struct BuildContext {
    mode: BuildMode,
    define: BTreeMap<String, Value>,
    aliases: Vec<AliasEntry>,
    preserve_symlinks: bool,
    applications: Vec<ApplicationSummary>,
    generated_at: DateTime<Utc>,
}

impl BuildContext {
    /// Start a context whose `root_alias` resolves to `source_root`.
    pub fn builder(
        mode: BuildMode,
        root_alias: impl Into<String>,
        source_root: PathBuf,
    ) -> BuildContextBuilder {
        let mut aliases = BTreeMap::new();
        aliases.insert(root_alias.into(), source_root);

        BuildContextBuilder {
            mode,
            define: BTreeMap::new(),
            aliases,
            preserve_symlinks: false,
            applications: Vec::new(),
        }
    }

    pub fn mode(&self) -> BuildMode {
        self.mode
    }

    /// Value of a compile-time constant.
    #[allow(dead_code)] // Lookup utility for bundler integrations
    pub fn constant(&self, name: &str) -> Option<&Value> {
        self.define.get(name)
    }

    /// Aliases, most specific first.
    pub fn aliases(&self) -> &[AliasEntry] {
        &self.aliases
    }

    #[allow(dead_code)] // Lookup utility for bundler integrations
    pub fn preserve_symlinks(&self) -> bool {
        self.preserve_symlinks
    }

    pub fn applications(&self) -> &[ApplicationSummary] {
        &self.applications
    }

    /// Resolve an import specifier through the aliases.
    ///
    /// An alias matches the whole specifier or a `/`-separated prefix of it;
    /// the most specific alias wins.
    #[allow(dead_code)] // Lookup utility for bundler integrations
    pub fn resolve_alias(&self, specifier: &str) -> Option<PathBuf> {
        self.aliases.iter().find_map(|alias| {
            if specifier == alias.find {
                Some(alias.replacement.clone())
            } else {
                specifier
                    .strip_prefix(alias.find.as_str())
                    .and_then(|rest| rest.strip_prefix('/'))
                    .map(|rest| alias.replacement.join(rest))
            }
        })
    }
}

/// Collects the pieces of a [`BuildContext`].
pub struct BuildContextBuilder {
    mode: BuildMode,
    define: BTreeMap<String, Value>,
    aliases: BTreeMap<String, PathBuf>,
    preserve_symlinks: bool,
    applications: Vec<ApplicationSummary>,
}

impl BuildContextBuilder {
    /// Inject the finalized menu as the constant `name`.
    ///
    /// Takes the document by value: nothing can modify it afterwards.
    pub fn menus(mut self, name: impl Into<String>, menus: NavigationDocument) -> Self {
        self.define.insert(name.into(), menus.to_value());
        self
    }

    /// Register an additional alias.
    pub fn alias(mut self, find: impl Into<String>, replacement: PathBuf) -> Self {
        self.aliases.insert(find.into(), replacement);
        self
    }

    /// Record an application and, if it was linked, its link.
    pub fn application(mut self, entry: &ApplicationEntry, link: Option<&SourceLink>) -> Self {
        self.applications.push(ApplicationSummary {
            name: entry.name.clone(),
            source_path: entry.source_path.clone(),
            link_path: link.map(|l| l.link_path.clone()),
            has_menu: entry.has_menu(),
        });
        self
    }

    pub fn preserve_symlinks(mut self, preserve: bool) -> Self {
        self.preserve_symlinks = preserve;
        self
    }

    pub fn build(self) -> BuildContext {
        let mut aliases: Vec<AliasEntry> = self
            .aliases
            .into_iter()
            .map(|(find, replacement)| AliasEntry { find, replacement })
            .collect();
        // Bundlers take the first matching alias.
        aliases.sort_by(|a, b| b.find.len().cmp(&a.find.len()).then(a.find.cmp(&b.find)));

        BuildContext {
            mode: self.mode,
            define: self.define,
            aliases,
            preserve_symlinks: self.preserve_symlinks,
            applications: self.applications,
            generated_at: Utc::now(),
        }
    }
}

/// Alias for a path relative to the root alias, e.g. `@/applications/alpha/htdoc`.
pub fn nested_alias(root_alias: &str, relative: &Path) -> String {
    let mut find = root_alias.trim_end_matches('/').to_string();
    for component in relative.components() {
        find.push('/');
        find.push_str(&component.as_os_str().to_string_lossy());
    }
    find
}
