//! Fixed settings of a launch.
//!
//! The launcher accepts no options, so everything it needs lives here with
//! its production value in [`LaunchConfig::default`].

use crate::command::Delegate;
use crate::env::{LEGACY_OPENSSL_VALUE, LEGACY_OPENSSL_VAR};
use crate::external::Spawn;
use std::ffi::OsString;
use std::path::PathBuf;

/// Directory next to the launcher that holds the npm project.
pub const TARGET_DIR: &str = "www";

#[cfg(not(windows))]
pub const TASK_RUNNER: &str = "npm";
#[cfg(windows)]
pub const TASK_RUNNER: &str = "npm.cmd";

pub const TASK_ARGS: [&str; 2] = ["run", "start"];

/// How control is handed to the task runner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// Spawn a child and wait for it.
    Spawn,
    /// Replace the launcher's process image.
    #[cfg(unix)]
    Exec,
}

impl Strategy {
    pub fn delegate(self) -> Box<dyn Delegate> {
        match self {
            Strategy::Spawn => Box::new(Spawn),
            #[cfg(unix)]
            Strategy::Exec => Box::new(crate::external::Exec),
        }
    }
}

impl Default for Strategy {
    fn default() -> Self {
        #[cfg(unix)]
        {
            Strategy::Exec
        }
        #[cfg(not(unix))]
        {
            Strategy::Spawn
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchConfig {
    /// Name of the target directory, relative to the install directory.
    pub target_dir: PathBuf,
    /// Program to run; a bare name is looked up on the child's `PATH`.
    pub program: PathBuf,
    pub args: Vec<OsString>,
    /// Variables set for the child on top of the inherited ones.
    pub overlay: Vec<(OsString, OsString)>,
    pub strategy: Strategy,
}

impl Default for LaunchConfig {
    fn default() -> Self {
        Self {
            target_dir: PathBuf::from(TARGET_DIR),
            program: PathBuf::from(TASK_RUNNER),
            args: TASK_ARGS.iter().map(OsString::from).collect(),
            overlay: vec![(LEGACY_OPENSSL_VAR.into(), LEGACY_OPENSSL_VALUE.into())],
            strategy: Strategy::default(),
        }
    }
}
