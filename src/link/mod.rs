//! Filesystem links from the aggregator's tree to sub-application sources.
//!
//! Each pass starts by removing the whole link directory, so links from a
//! previous run never survive and running twice gives the same result.

use crate::error::{AggregateError, Result};
use crate::models::{ApplicationEntry, SourceLink};
use indicatif::{ProgressBar, ProgressStyle};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Options for materializing links.
#[derive(Debug, Clone)]
pub struct LinkOptions {
    /// Directory receiving one subdirectory per application.
    pub link_dir: PathBuf,
    /// Name of the link inside each application's subdirectory.
    pub link_name: PathBuf,
    /// Whether to show progress.
    pub show_progress: bool,
}

impl Default for LinkOptions {
    fn default() -> Self {
        Self {
            link_dir: PathBuf::from("src/applications"),
            link_name: PathBuf::from("htdoc"),
            show_progress: true,
        }
    }
}

/// Compute the link set for the given entries without touching the disk.
pub fn plan_links(entries: &[ApplicationEntry], options: &LinkOptions) -> Vec<SourceLink> {
    entries
        .iter()
        .map(|entry| SourceLink {
            name: entry.name.clone(),
            link_path: options.link_dir.join(&entry.name).join(&options.link_name),
            target: entry.source_path.clone(),
        })
        .collect()
}

/// Remove the link directory and everything in it.
///
/// Removing a directory that does not exist is not an error. Links are
/// removed without following them, so application sources are untouched.
pub fn clear_links(link_dir: &Path) -> Result<()> {
    match fs::remove_dir_all(link_dir) {
        Ok(()) => {
            debug!("Cleared {}", link_dir.display());
            Ok(())
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(source) => Err(AggregateError::ClearLinks {
            path: link_dir.to_path_buf(),
            source,
        }),
    }
}

/// Clear the link directory, then link every entry.
pub fn materialize(entries: &[ApplicationEntry], options: &LinkOptions) -> Result<Vec<SourceLink>> {
    info!(
        "Linking {} applications into {}",
        entries.len(),
        options.link_dir.display()
    );

    clear_links(&options.link_dir)?;

    let links = plan_links(entries, options);

    let progress_bar = if options.show_progress && !links.is_empty() {
        let pb = ProgressBar::new(links.len() as u64);
        if let Ok(style) = ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
        {
            pb.set_style(style.progress_chars("#>-"));
        }
        Some(pb)
    } else {
        None
    };

    for link in &links {
        if let Some(ref pb) = progress_bar {
            pb.set_message(link.name.clone());
        }

        create_link(link)?;

        if let Some(ref pb) = progress_bar {
            pb.inc(1);
        }
    }

    if let Some(pb) = progress_bar {
        pb.finish_with_message("Links ready");
    }

    Ok(links)
}

/// Create one link and its parent directory.
fn create_link(link: &SourceLink) -> Result<()> {
    if let Some(parent) = link.link_path.parent() {
        fs::create_dir_all(parent).map_err(|source| AggregateError::CreateDir {
            path: parent.to_path_buf(),
            source,
        })?;
    }

    symlink_dir(&link.target, &link.link_path).map_err(|source| AggregateError::CreateLink {
        link: link.link_path.clone(),
        target: link.target.clone(),
        source,
    })?;

    debug!(
        "Linked {} -> {}",
        link.link_path.display(),
        link.target.display()
    );
    Ok(())
}

#[cfg(unix)]
fn symlink_dir(target: &Path, link: &Path) -> io::Result<()> {
    std::os::unix::fs::symlink(target, link)
}

#[cfg(windows)]
fn symlink_dir(target: &Path, link: &Path) -> io::Result<()> {
    std::os::windows::fs::symlink_dir(target, link)
}
