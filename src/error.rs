use std::io;
use std::path::PathBuf;

/// Failure taxonomy for drivekeep operations.
///
/// Nothing here is retried: every error propagates to the command dispatcher,
/// which reports it and terminates. A failure mid-mirror leaves already-created
/// remote folders and files in place.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The local path does not exist or is not a directory. Detected before
    /// any remote call is made.
    #[error("invalid path: '{}' is not a directory", .0.display())]
    InvalidPath(PathBuf),

    /// A Drive API call failed (network, quota, bad parent id, auth expiry
    /// mid-operation).
    #[error("remote error: {0}")]
    Remote(String),

    /// Missing or unusable credentials.
    #[error("authentication error: {0}")]
    Auth(String),

    /// Local filesystem failure during traversal or upload.
    #[error("io error: {0}")]
    Io(#[from] io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

/// Truncates API response bodies before they end up in error messages.
pub(crate) fn sanitize(s: &str) -> String {
    if s.len() > 240 {
        format!("{}...", &s[..240])
    } else {
        s.to_string()
    }
}
