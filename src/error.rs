//! Error types for the aggregation pass.
//!
//! Every variant names the offending path so a failed build can be traced
//! back to the sub-application or file that caused it.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while resolving the build configuration.
#[derive(Debug, Error)]
pub enum AggregateError {
    /// The applications root is missing or cannot be listed.
    #[error("Cannot read applications root {}: {source}", .path.display())]
    ApplicationsRootUnreadable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A sub-application directory name is not valid UTF-8.
    #[error("Application directory name is not valid UTF-8: {}", .path.display())]
    InvalidApplicationName { path: PathBuf },

    /// A sub-application has no UI source directory to link.
    #[error("Application '{name}' has no source directory at {}", .path.display())]
    MissingSourceDir { name: String, path: PathBuf },

    /// A menu document could not be read.
    #[error("Failed to read menu file {}: {source}", .path.display())]
    MenuRead {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A menu document is not valid JSON.
    #[error("Failed to parse menu file {}: {source}", .path.display())]
    MenuParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// A menu document parsed, but its top level is not an object.
    #[error("Menu file {} must contain a JSON object at the top level", .path.display())]
    MenuNotObject { path: PathBuf },

    /// Two sources declared the same menu key with different entries.
    #[error("Menu key '{key}' from '{incoming}' collides with the entry from '{previous}'")]
    MenuKeyCollision {
        key: String,
        previous: String,
        incoming: String,
    },

    /// The link directory could not be cleared.
    #[error("Failed to clear {}: {source}", .path.display())]
    ClearLinks {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A link's parent directory could not be created.
    #[error("Failed to create directory {}: {source}", .path.display())]
    CreateDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A symbolic link could not be created.
    #[error("Failed to link {} -> {}: {source}", .link.display(), .target.display())]
    CreateLink {
        link: PathBuf,
        target: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The build context could not be written.
    #[error("Failed to write build context to {}: {source}", .path.display())]
    WriteContext {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl AggregateError {
    /// Returns true for errors caused by bad inputs rather than by the
    /// filesystem refusing a write.
    pub fn is_configuration_error(&self) -> bool {
        !matches!(
            self,
            AggregateError::ClearLinks { .. }
                | AggregateError::CreateDir { .. }
                | AggregateError::CreateLink { .. }
                | AggregateError::WriteContext { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, AggregateError>;
