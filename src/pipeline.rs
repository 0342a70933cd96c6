//! Configuration-resolution pass.
//!
//! Runs discovery, menu merging and linking in that order (development mode
//! only) and assembles the build context. Every step needs the complete
//! output of the previous one, so the pass is strictly sequential and stops
//! at the first error.

use crate::config::Config;
use crate::context::{self, BuildContext};
use crate::discovery::{DirectoryProber, ProbeConfig};
use crate::error::Result;
use crate::link::{self, LinkOptions};
use crate::menu::{self, MenuMerger};
use crate::models::{ApplicationEntry, BuildMode, LinkStrategy, SourceLink};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Drives one configuration-resolution pass for an aggregator root.
pub struct Aggregator {
    root: PathBuf,
    mode: BuildMode,
    config: Config,
    show_progress: bool,
    dry_run: bool,
}

impl Aggregator {
    /// `root` should be absolute; layout paths in `config` resolve against it.
    pub fn new(root: PathBuf, mode: BuildMode, config: Config) -> Self {
        Self {
            root,
            mode,
            config,
            show_progress: false,
            dry_run: false,
        }
    }

    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    /// Report planned links instead of creating them.
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    fn resolve_path(&self, relative: &Path) -> PathBuf {
        self.root.join(relative)
    }

    /// Absolute source root the root alias points at.
    pub fn source_root(&self) -> PathBuf {
        self.resolve_path(&self.config.resolve.source_dir)
    }

    fn applications_root(&self) -> PathBuf {
        let joined = self.resolve_path(&self.config.layout.applications_root);
        // Canonical paths keep link targets free of `..`; a missing root is
        // reported by the prober.
        std::fs::canonicalize(&joined).unwrap_or(joined)
    }

    fn link_options(&self) -> LinkOptions {
        LinkOptions {
            link_dir: self.resolve_path(&self.config.layout.link_dir),
            link_name: self.config.layout.app_source_dir.clone(),
            show_progress: self.show_progress,
        }
    }

    /// Run the pass and return the finished build context.
    pub fn resolve(&self) -> Result<BuildContext> {
        let source_root = self.source_root();
        let builder = BuildContext::builder(
            self.mode,
            self.config.resolve.alias.clone(),
            source_root.clone(),
        )
        // Static builds still resolve through links left by the last dev pass.
        .preserve_symlinks(self.config.resolve.strategy == LinkStrategy::Symlink);

        if !self.mode.is_development() {
            info!("{} build: skipping application discovery", self.mode);
            return Ok(builder.build());
        }

        let base_menu = menu::load_document(&self.resolve_path(&self.config.layout.base_menu))?;
        debug!("Base menu has {} entries", base_menu.len());

        let prober = DirectoryProber::new(
            self.applications_root(),
            ProbeConfig::from(&self.config.layout),
        );
        let entries = prober.discover()?;

        let mut merger = MenuMerger::new(base_menu, self.config.menus.on_collision);
        merger.merge_entries(&entries)?;
        let menus = merger.finish();
        info!("Merged menu has {} entries", menus.len());

        let mut builder = builder.menus(self.config.menus.define_name.clone(), menus);

        match self.config.resolve.strategy {
            LinkStrategy::Symlink => {
                let links = self.link(&entries)?;
                for (entry, link) in entries.iter().zip(&links) {
                    builder = builder.application(entry, Some(link));
                }
            }
            LinkStrategy::Alias => {
                let options = self.link_options();
                for (entry, link) in entries.iter().zip(link::plan_links(&entries, &options)) {
                    let find = self.alias_for(&link, &source_root);
                    debug!("Alias {} -> {}", find, link.target.display());
                    builder = builder
                        .alias(find, link.target.clone())
                        .application(entry, None);
                }
            }
        }

        Ok(builder.build())
    }

    fn link(&self, entries: &[ApplicationEntry]) -> Result<Vec<SourceLink>> {
        let options = self.link_options();

        if self.dry_run {
            let links = link::plan_links(entries, &options);
            for link in &links {
                info!(
                    "Would link {} -> {}",
                    link.link_path.display(),
                    link.target.display()
                );
            }
            return Ok(links);
        }

        link::materialize(entries, &options)
    }

    /// Alias under which a planned link location is addressable.
    fn alias_for(&self, link: &SourceLink, source_root: &Path) -> String {
        let root_alias = &self.config.resolve.alias;

        match link.link_path.strip_prefix(source_root) {
            Ok(relative) => context::nested_alias(root_alias, relative),
            Err(_) => {
                warn!(
                    "Link directory for '{}' is outside {}; aliasing relative to the aggregator root",
                    link.name,
                    source_root.display()
                );
                let relative = link.link_path.strip_prefix(&self.root).unwrap_or(&link.link_path);
                context::nested_alias(root_alias, relative)
            }
        }
    }
}
