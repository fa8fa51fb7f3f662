use crate::env::Environment;
use crate::error::Result;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Command;

/// Conventional process exit code type used by this crate.
///
/// A value of 0 indicates success; any non-zero value indicates failure.
/// This mirrors the convention used by POSIX shells and many command-line tools.
pub type ExitCode = i32;

/// A fully resolved invocation of the task runner.
///
/// Built by [`crate::Launcher::prepare`]; carries everything a [`Delegate`]
/// needs, so no strategy reads ambient process state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskCommand {
    /// Executable to run, already resolved against the child's `PATH`.
    pub program: PathBuf,
    pub args: Vec<OsString>,
    /// Environment and working directory of the child.
    pub env: Environment,
}

impl TaskCommand {
    pub fn program(&self) -> &Path {
        &self.program
    }

    pub fn current_dir(&self) -> &Path {
        &self.env.current_dir
    }

    /// Build the [`Command`] both delegation strategies run.
    ///
    /// The child environment is cleared and rebuilt from the snapshot, so what
    /// the child sees is exactly [`Environment::merged`].
    pub fn to_command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args)
            .env_clear()
            .envs(self.env.merged())
            .current_dir(&self.env.current_dir);
        cmd
    }

    /// Human readable form for log lines.
    pub fn display(&self) -> String {
        let mut line = self.program.display().to_string();
        for arg in &self.args {
            line.push(' ');
            line.push_str(&arg.to_string_lossy());
        }
        line
    }
}

/// Object-safe strategy for handing control to the task runner.
///
/// Implemented by [`crate::Spawn`], which waits for a child, and on Unix by
/// [`crate::Exec`], which replaces the launcher's image. Either way the
/// returned code is the one the launcher must exit with.
pub trait Delegate {
    /// Short name used in log output.
    fn name(&self) -> &str;

    /// Run `task` and report its exit code.
    fn delegate(&self, task: &TaskCommand) -> Result<ExitCode>;
}
