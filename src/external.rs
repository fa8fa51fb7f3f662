use crate::command::{Delegate, ExitCode, TaskCommand};
use crate::error::{LaunchError, Result};
use log::debug;
use std::borrow::Cow;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::process::ExitStatus;

/// Spawn the task runner as a child and wait for it.
///
/// Standard streams are inherited. The child's exit code is returned as-is;
/// a child killed by a signal maps to `128 + signal`, like a shell would.
#[derive(Debug, Clone, Copy, Default)]
pub struct Spawn;

impl Delegate for Spawn {
    fn name(&self) -> &str {
        "spawn"
    }

    fn delegate(&self, task: &TaskCommand) -> Result<ExitCode> {
        let status = task
            .to_command()
            .status()
            .map_err(|source| LaunchError::Delegation {
                program: task.program.display().to_string(),
                source,
            })?;
        debug!("{} exited with {}", task.program.display(), status);
        Ok(exit_code(status))
    }
}

/// Replace the launcher's process image with the task runner.
///
/// On success this never returns: the task runner inherits the launcher's
/// pid, so whoever waits on the launcher sees the task runner's exit status.
#[cfg(unix)]
#[derive(Debug, Clone, Copy, Default)]
pub struct Exec;

#[cfg(unix)]
impl Delegate for Exec {
    fn name(&self) -> &str {
        "exec"
    }

    fn delegate(&self, task: &TaskCommand) -> Result<ExitCode> {
        use std::os::unix::process::CommandExt;
        let source = task.to_command().exec();
        Err(LaunchError::Delegation {
            program: task.program.display().to_string(),
            source,
        })
    }
}

/// Translate a child's status into the code the launcher exits with.
pub fn exit_code(status: ExitStatus) -> ExitCode {
    match status.code() {
        Some(x) => x,
        None => terminated_by_signal(status),
    }
}

#[cfg(unix)]
fn terminated_by_signal(exit_status: ExitStatus) -> i32 {
    use std::os::unix::process::ExitStatusExt;
    match ExitStatusExt::signal(&exit_status) {
        Some(signal) => 128 + signal,
        None => 1,
    }
}

#[cfg(not(unix))]
fn terminated_by_signal(_exit_status: ExitStatus) -> i32 {
    1
}

/// Resolve a command path the way a typical shell would.
///
/// Behavior:
/// - Absolute path: returns it if it names a file.
/// - Relative with multiple components (e.g., `bin/npm`) or `./`-prefixed:
///   resolved against `base`, the directory the command will run in.
/// - Single path component (no separators): search each directory in `search_paths` (PATH)
///   and return the first executable match. Empty and relative entries are taken
///   relative to `base`.
/// - Empty path: returns `None`.
pub fn find_command_path<'a>(
    search_paths: &OsStr,
    base: &Path,
    path: &'a Path,
) -> Option<Cow<'a, Path>> {
    if path.is_absolute() {
        return find_by_path(path).map(Cow::Borrowed);
    }

    if path.starts_with(".") {
        return find_by_path(&base.join(path)).map(|p| Cow::Owned(p.to_owned()));
    }

    let mut components = path.components();
    let first = components.next();
    let second = components.next();
    match (first, second) {
        (None, None) => None,
        (Some(x), None) => find_in_path(search_paths, base, x.as_os_str()).map(Cow::Owned),
        _ => find_by_path(&base.join(path)).map(|p| Cow::Owned(p.to_owned())),
    }
}

fn find_in_path(search_paths: &OsStr, base: &Path, cmd: &OsStr) -> Option<PathBuf> {
    for dir in std::env::split_paths(search_paths) {
        // an empty entry means the working directory, which for the child is `base`
        let path = base.join(dir).join(cmd);
        if find_by_path(&path).is_some() && is_executable(&path) {
            return Some(path);
        }
    }
    None
}

fn find_by_path(path: &Path) -> Option<&Path> {
    if path.is_file() { Some(path) } else { None }
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    path.metadata()
        .map(|meta| meta.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(_path: &Path) -> bool {
    true
}
