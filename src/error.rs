//! Error types for launching the `www` task.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

use crate::command::ExitCode;

/// Result type for launcher operations.
pub type Result<T> = std::result::Result<T, LaunchError>;

/// Errors that abort a launch before or during delegation.
#[derive(Error, Debug)]
pub enum LaunchError {
    #[error("cannot determine the launcher's install directory: {reason}")]
    SelfLocation {
        reason: String,
        #[source]
        source: Option<io::Error>,
    },

    #[error("target directory {} does not exist", .path.display())]
    MissingTarget { path: PathBuf },

    #[error("target path {} is not a directory", .path.display())]
    TargetNotDirectory { path: PathBuf },

    #[error("cannot inspect target directory {}", .path.display())]
    TargetUnreadable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("task runner `{program}` was not found on PATH")]
    TaskRunnerNotFound { program: String },

    #[error("failed to delegate to `{program}`")]
    Delegation {
        program: String,
        #[source]
        source: io::Error,
    },
}

impl LaunchError {
    pub(crate) fn self_location(reason: impl Into<String>, source: Option<io::Error>) -> Self {
        LaunchError::SelfLocation {
            reason: reason.into(),
            source,
        }
    }

    /// Process exit code the launcher reports for this error.
    ///
    /// Follows POSIX shell conventions: 127 for a command that cannot be found,
    /// 126 for one that was found but could not be started.
    pub fn exit_code(&self) -> ExitCode {
        match self {
            LaunchError::SelfLocation { .. }
            | LaunchError::MissingTarget { .. }
            | LaunchError::TargetNotDirectory { .. }
            | LaunchError::TargetUnreadable { .. } => 1,
            LaunchError::TaskRunnerNotFound { .. } => 127,
            LaunchError::Delegation { .. } => 126,
        }
    }
}
