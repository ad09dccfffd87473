use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Structural failures. Per-entry noise (vanished processes, unreadable
/// files) never becomes one of these.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CollectError {
    #[error("scan root could not be determined (no home directory)")]
    ScanRootUnknown,

    #[error("scan root {} does not exist", .0.display())]
    ScanRootMissing(PathBuf),

    #[error("scan root {} is not a directory", .0.display())]
    ScanRootNotDirectory(PathBuf),

    #[error("scan root {} is unreadable: {reason}", path.display())]
    ScanRootUnreadable { path: PathBuf, reason: String },

    #[error("process table is unavailable")]
    ProcessTableUnavailable,

    #[error("{0} collector panicked")]
    CollectorPanicked(&'static str),

    #[error("failed to start collector thread: {0}")]
    Spawn(String),

    #[error("collection timed out after {}ms", .0.as_millis())]
    TimedOut(Duration),

    #[error("previous collection is still running")]
    StillRunning,
}
