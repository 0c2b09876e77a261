//! Logging setup for the `log` facade, backed by `env_logger`.
//!
//! `RUST_LOG` wins when set. Otherwise the level follows the `-v` count, starting at `warn` so
//! skipped directories and unreadable files are always visible. Logs go to stderr and never mix
//! with the report on stdout.

use env_logger::{Builder, Target};
use log::LevelFilter;
use std::{env, io::Write};

/// Initialize the global logger. Must be called at most once per process.
pub fn init_logging(verbose: u8) {
    let mut builder = Builder::new();
    builder.target(Target::Stderr);

    let from_env = env::var_os("RUST_LOG").is_some();
    if from_env {
        builder.parse_default_env();
    } else {
        builder.filter_level(determine_level(verbose));
    }

    builder.format(|buf, record| {
        let level = record.level();
        let style = buf.default_level_style(level);
        writeln!(buf, "{style}{:<5}{style:#} {}", level, record.args())
    });
    builder.init();

    if !from_env {
        log::debug!("logging initialized at {:?}", determine_level(verbose));
    }
}

/// Map the `-v` count to a level filter.
fn determine_level(verbose: u8) -> LevelFilter {
    match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level_follows_verbosity() {
        assert_eq!(LevelFilter::Warn, determine_level(0));
        assert_eq!(LevelFilter::Info, determine_level(1));
        assert_eq!(LevelFilter::Debug, determine_level(2));
        assert_eq!(LevelFilter::Trace, determine_level(3));
        assert_eq!(LevelFilter::Trace, determine_level(u8::MAX));
    }
}
