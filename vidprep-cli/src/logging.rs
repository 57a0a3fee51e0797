// ============================================================================
// vidprep-cli/src/logging.rs
// ============================================================================
//
// LOGGING SETUP: env_logger Initialization
//
// vidprep-core logs through the `log` facade only. The binary installs
// env_logger once at startup with a "timestamp LEVEL message" line format.
//
// USAGE:
// - default: info
// - --verbose: debug (ffmpeg command lines, chunk paths)
// - RUST_LOG: overrides both, e.g. RUST_LOG=vidprep_core=trace

use console::style;
use log::LevelFilter;
use std::io::Write;

/// Level used when RUST_LOG is unset.
#[must_use]
pub fn default_level(verbose: bool) -> LevelFilter {
    if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    }
}

/// Installs the global logger.
pub fn init(verbose: bool) {
    env_logger::Builder::new()
        .filter_level(default_level(verbose))
        .parse_default_env()
        .format(|buf, record| {
            let timestamp = buf.timestamp();
            let level = match record.level() {
                log::Level::Error => style("ERROR").red().bold(),
                log::Level::Warn => style("WARN ").yellow(),
                log::Level::Info => style("INFO ").green(),
                log::Level::Debug => style("DEBUG").blue(),
                log::Level::Trace => style("TRACE").magenta(),
            };
            writeln!(buf, "{} {} {}", style(timestamp).dim(), level, record.args())
        })
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_level() {
        assert_eq!(default_level(false), LevelFilter::Info);
        assert_eq!(default_level(true), LevelFilter::Debug);
    }
}
