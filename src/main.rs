//! Runs `npm run start` in the `www` directory next to this binary.
//!
//! Takes no options; any arguments are ignored.

mod logging;

use anyhow::Context;
use console::style;
use log::warn;
use www_launcher::{LaunchError, Launcher};

fn main() {
    logging::init_logger();

    if std::env::args_os().len() > 1 {
        warn!("arguments are ignored");
    }

    let code = match run() {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{} {:#}", style("error:").red().bold(), e);
            e.downcast_ref::<LaunchError>()
                .map_or(1, LaunchError::exit_code)
        }
    };
    std::process::exit(code);
}

fn run() -> anyhow::Result<i32> {
    let launcher = Launcher::from_current_exe().context("startup failed")?;
    let code = launcher
        .launch()
        .with_context(|| format!("cannot start the task in {}", launcher.target_dir().display()))?;
    Ok(code)
}
