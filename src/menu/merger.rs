//! Shallow, key-wise merging of menu fragments.

use crate::error::{AggregateError, Result};
use crate::models::{ApplicationEntry, CollisionPolicy, NavigationDocument};
use std::collections::HashMap;
use tracing::{debug, warn};

/// Source label recorded for keys that come from the base menu.
pub const BASE_SOURCE: &str = "base menu";

/// Accumulates menu fragments on top of a base document.
///
/// The merged document can only be obtained by consuming the merger, so it
/// cannot change once handed to the build context.
pub struct MenuMerger {
    document: NavigationDocument,
    policy: CollisionPolicy,
    /// Which source last set each key, for collision reports.
    origins: HashMap<String, String>,
}

impl MenuMerger {
    /// Start from the base document.
    pub fn new(base: NavigationDocument, policy: CollisionPolicy) -> Self {
        let origins = base
            .keys()
            .map(|key| (key.clone(), BASE_SOURCE.to_string()))
            .collect();

        Self {
            document: base,
            policy,
            origins,
        }
    }

    /// Merge one fragment, attributing its keys to `source`.
    pub fn merge(&mut self, source: &str, fragment: &NavigationDocument) -> Result<()> {
        for (key, value) in fragment.iter() {
            if let Some(existing) = self.document.get(key) {
                let previous = self
                    .origins
                    .get(key)
                    .cloned()
                    .unwrap_or_else(|| BASE_SOURCE.to_string());

                if existing != value {
                    match self.policy {
                        CollisionPolicy::Error => {
                            return Err(AggregateError::MenuKeyCollision {
                                key: key.clone(),
                                previous,
                                incoming: source.to_string(),
                            });
                        }
                        CollisionPolicy::Overwrite => {
                            warn!(
                                "Menu key '{}' from '{}' overrides the entry from '{}'",
                                key, source, previous
                            );
                        }
                    }
                } else {
                    debug!("Menu key '{}' redeclared identically by '{}'", key, source);
                }
            }

            self.document.insert(key.clone(), value.clone());
            self.origins.insert(key.clone(), source.to_string());
        }

        Ok(())
    }

    /// Merge every entry that carries a fragment, in the given order.
    pub fn merge_entries(&mut self, entries: &[ApplicationEntry]) -> Result<()> {
        for entry in entries {
            match entry.menu_fragment {
                Some(ref fragment) => {
                    debug!(
                        "Merging {} menu entries from '{}'",
                        fragment.len(),
                        entry.name
                    );
                    self.merge(&entry.name, fragment)?;
                }
                None => debug!("'{}' contributes no menu entries", entry.name),
            }
        }

        Ok(())
    }

    /// Which source each key was finally taken from.
    #[allow(dead_code)] // Inspection utility
    pub fn origin_of(&self, key: &str) -> Option<&str> {
        self.origins.get(key).map(String::as_str)
    }

    /// Finalize the merged document.
    pub fn finish(self) -> NavigationDocument {
        self.document
    }
}
