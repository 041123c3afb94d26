//! Error types for scrape operations

use blacksheep_types::{ApiError, Snowflake};
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that end the whole scrape.
///
/// Per-item failures (one page fetch, one download) never surface here;
/// they are logged where they happen.
#[derive(Debug, Error)]
pub enum ScrapeError {
    /// The output tree could not be created or written
    #[error("failed to {action} {}: {source}", .path.display())]
    Filesystem {
        /// What was being attempted
        action: &'static str,
        /// Path involved
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: io::Error,
    },

    /// The channel set for a server could not be determined
    #[error("could not list channels of server {server}: {source}")]
    Resolve {
        /// Server id
        server: Snowflake,
        /// Error reported by the platform
        #[source]
        source: ApiError,
    },

    /// A channel named by the operator does not exist or cannot be read
    #[error("could not read channel {channel}: {source}")]
    Channel {
        /// Channel id
        channel: Snowflake,
        /// Error reported by the platform
        #[source]
        source: ApiError,
    },

    /// A walker or download task panicked
    #[error("scrape task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl ScrapeError {
    /// Adapter for `map_err` on filesystem calls
    pub(crate) fn fs(action: &'static str, path: &Path) -> impl FnOnce(io::Error) -> Self {
        let path = path.to_path_buf();
        move |source| Self::Filesystem {
            action,
            path,
            source,
        }
    }
}

/// Convenient Result type alias
pub type Result<T> = std::result::Result<T, ScrapeError>;
