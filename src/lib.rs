//! Launcher for the npm project shipped next to it.
//!
//! The launcher finds the directory its executable is installed in, adds
//! `NODE_OPTIONS=--openssl-legacy-provider` to the child environment, and runs
//! `npm run start` inside the sibling `www` directory. The launcher's exit code
//! is the task's exit code.
//!
//! The main entry point is [`Launcher`]. The public modules [`command`] and
//! [`env`] expose the [`Delegate`] trait for custom hand-over strategies and
//! the [`Environment`](env::Environment) the child is started with.

pub mod command;
pub mod config;
pub mod env;
pub mod error;
mod external;
mod launcher;
pub mod locate;

pub use command::{Delegate, ExitCode, TaskCommand};
pub use config::{LaunchConfig, Strategy};
pub use error::LaunchError;
#[cfg(unix)]
pub use external::Exec;
pub use external::{Spawn, exit_code, find_command_path};
pub use launcher::Launcher;
