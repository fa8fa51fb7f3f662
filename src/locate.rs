//! Finding the directory the launcher is installed in.

use crate::error::{LaunchError, Result};
use log::debug;
use std::fs;
use std::path::{Path, PathBuf};

/// Resolve the install directory from the running executable.
///
/// Never falls back to the caller's working directory: if the platform
/// cannot tell us where the executable lives, launching is refused.
pub fn current_base_dir() -> Result<PathBuf> {
    let exe = std::env::current_exe().map_err(|e| {
        LaunchError::self_location("the platform did not report an executable path", Some(e))
    })?;
    debug!("current executable reported as {}", exe.display());
    base_dir_of(&exe)
}

/// Canonical directory containing `exe`.
///
/// Symlinks, `.` and `..` are resolved first, so a symlink to the launcher
/// resolves to the directory of the real binary.
pub fn base_dir_of(exe: &Path) -> Result<PathBuf> {
    let resolved = fs::canonicalize(exe).map_err(|e| {
        LaunchError::self_location(format!("cannot resolve {}", exe.display()), Some(e))
    })?;
    match resolved.parent() {
        Some(dir) => Ok(dir.to_path_buf()),
        None => Err(LaunchError::self_location(
            format!("{} has no parent directory", resolved.display()),
            None,
        )),
    }
}
