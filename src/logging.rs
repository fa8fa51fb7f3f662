use console::style;
use env_logger::{Builder, Env};
use log::Level;
use std::io::Write;

/// Filter used when `RUST_LOG` is unset: warnings from this crate only.
pub const DEFAULT_FILTER: &str = "www_launcher=warn";

/// Initialize logger; `RUST_LOG` overrides [`DEFAULT_FILTER`].
///
/// Records from other crates carry their target so they stand out from the
/// launcher's own lines.
pub fn init_logger() {
    let env = Env::default().filter_or("RUST_LOG", DEFAULT_FILTER);

    Builder::from_env(env)
        .format(|buf, record| {
            let level = match record.level() {
                Level::Error => format!("{}", style("ERROR").red().bold()),
                Level::Warn => format!("{}", style("WARN ").yellow().bold()),
                Level::Info => format!("{}", style("INFO ").green()),
                Level::Debug => format!("{}", style("DEBUG").cyan()),
                Level::Trace => format!("{}", style("TRACE").dim()),
            };
            if is_own_target(record.target()) {
                writeln!(buf, "{} {}", level, record.args())
            } else {
                writeln!(buf, "{} [{}] {}", level, style(record.target()).dim(), record.args())
            }
        })
        .init();
}

fn is_own_target(target: &str) -> bool {
    target == env!("CARGO_CRATE_NAME")
        || target
            .strip_prefix(env!("CARGO_CRATE_NAME"))
            .is_some_and(|rest| rest.starts_with("::"))
}
