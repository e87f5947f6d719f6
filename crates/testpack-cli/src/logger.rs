//! Logging for the testpack CLI.
//!
//! Logs go to stderr so a bundle written to stdout stays clean.
//!
//! The level is chosen in this order:
//! 1. `--verbose`: DEBUG for the testpack crates
//! 2. `--quiet`: ERROR only
//! 3. `RUST_LOG`
//! 4. INFO for the testpack crates

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

const VERBOSE_FILTER: &str = "testpack=debug,testpack_cli=debug";
const QUIET_FILTER: &str = "error";
const DEFAULT_FILTER: &str = "testpack=info,testpack_cli=info";

/// Build the filter for the given flags.
///
/// # Arguments
///
/// * `verbose` - Debug level for the testpack crates (wins over `quiet`)
/// * `quiet` - Errors only
///
/// With neither flag, `RUST_LOG` is used when set.
pub fn env_filter(verbose: bool, quiet: bool) -> EnvFilter {
    if verbose {
        EnvFilter::new(VERBOSE_FILTER)
    } else if quiet {
        EnvFilter::new(QUIET_FILTER)
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
    }
}

/// Initialize the tracing subscriber. Call once, before any logging.
///
/// # Arguments
///
/// * `verbose` - Enable debug-level logging
/// * `quiet` - Only show error-level logs
/// * `use_color` - Emit ANSI colors
///
/// # Examples
///
/// ```rust,no_run
/// use testpack_cli::logger::{init_logger, should_use_colors};
///
/// init_logger(false, false, should_use_colors(false));
/// tracing::info!("bundling");
/// ```
pub fn init_logger(verbose: bool, quiet: bool, use_color: bool) {
    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_level(true)
        .with_ansi(use_color)
        .compact();

    tracing_subscriber::registry()
        .with(env_filter(verbose, quiet))
        .with(fmt_layer)
        .init();
}

/// Check if colored output should be enabled on stderr.
///
/// # Arguments
///
/// * `no_color_flag` - The `--no-color` flag, which always disables colors
///
/// # Environment Variables
///
/// - `NO_COLOR`: If set, disables colors
/// - `FORCE_COLOR`: If set, forces colors even in non-TTY
pub fn should_use_colors(no_color_flag: bool) -> bool {
    if no_color_flag || std::env::var_os("NO_COLOR").is_some() {
        return false;
    }

    if std::env::var_os("FORCE_COLOR").is_some() {
        return true;
    }

    console::Term::stderr().features().colors_supported()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn test_should_use_colors() {
        unsafe {
            std::env::remove_var("NO_COLOR");
            std::env::set_var("FORCE_COLOR", "1");
        }
        assert!(should_use_colors(false));
        assert!(!should_use_colors(true));

        unsafe {
            std::env::set_var("NO_COLOR", "1");
        }
        assert!(!should_use_colors(false));

        unsafe {
            std::env::remove_var("NO_COLOR");
            std::env::remove_var("FORCE_COLOR");
        }
    }

    #[test]
    fn test_flags_override_rust_log() {
        use tracing_subscriber::filter::LevelFilter;

        assert_eq!(env_filter(true, false).max_level_hint(), Some(LevelFilter::DEBUG));
        assert_eq!(env_filter(false, true).max_level_hint(), Some(LevelFilter::ERROR));
    }
}
