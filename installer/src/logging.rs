//! Diagnostic logging for the binary.
//!
//! The library logs through the `log` facade. The binary installs a
//! `tracing-subscriber` formatter on stderr at start-up; its default
//! `tracing-log` bridge forwards the `log` records. The level follows the
//! `-v` count and is raised to debug when `TF_DEMUX_LOG` is set to a
//! non-empty value.

use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::LevelFilter;

/// Environment variable that enables debug logging.
pub const LOG_ENV: &str = "TF_DEMUX_LOG";

/// Map the `-v` count and the `TF_DEMUX_LOG` value to a level.
///
/// # Examples
///
/// ```
/// use terraform_demux_installer::logging::level_for;
/// use tracing_subscriber::filter::LevelFilter;
///
/// assert_eq!(level_for(0, false, None), LevelFilter::WARN);
/// assert_eq!(level_for(1, false, None), LevelFilter::INFO);
/// assert_eq!(level_for(0, false, Some("1")), LevelFilter::DEBUG);
/// assert_eq!(level_for(3, true, None), LevelFilter::ERROR);
/// ```
#[must_use]
pub fn level_for(verbosity: u8, quiet: bool, env_value: Option<&str>) -> LevelFilter {
    if quiet {
        return LevelFilter::ERROR;
    }
    let from_flags = match verbosity {
        0 => LevelFilter::WARN,
        1 => LevelFilter::INFO,
        2 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    };
    let from_env = env_value
        .filter(|value| !value.trim().is_empty())
        .map_or(LevelFilter::OFF, |_| LevelFilter::DEBUG);
    from_flags.max(from_env)
}

/// Build the subscriber filter for the given flags and environment value.
#[must_use]
pub fn filter_for(verbosity: u8, quiet: bool, env_value: Option<&str>) -> EnvFilter {
    EnvFilter::default().add_directive(level_for(verbosity, quiet, env_value).into())
}

/// Install the stderr subscriber for this process.
///
/// Later calls keep the first subscriber.
pub fn init(verbosity: u8, quiet: bool) {
    let env_value = std::env::var(LOG_ENV).ok();
    let filter = filter_for(verbosity, quiet, env_value.as_deref());
    if let Err(err) = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .without_time()
        .try_init()
    {
        log::debug!("keeping existing subscriber: {err}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::default(0, None, LevelFilter::WARN)]
    #[case::info(1, None, LevelFilter::INFO)]
    #[case::debug(2, None, LevelFilter::DEBUG)]
    #[case::trace(5, None, LevelFilter::TRACE)]
    #[case::env_raises(0, Some("1"), LevelFilter::DEBUG)]
    #[case::env_never_lowers(3, Some("1"), LevelFilter::TRACE)]
    #[case::blank_env_ignored(0, Some("  "), LevelFilter::WARN)]
    fn level_follows_flags_and_env(
        #[case] verbosity: u8,
        #[case] env: Option<&str>,
        #[case] expected: LevelFilter,
    ) {
        assert_eq!(level_for(verbosity, false, env), expected);
    }

    #[test]
    fn quiet_overrides_env() {
        assert_eq!(level_for(0, true, Some("1")), LevelFilter::ERROR);
    }

    #[rstest]
    #[case::warn_by_default(0, false, None, LevelFilter::WARN)]
    #[case::env_enables_debug(0, false, Some("yes"), LevelFilter::DEBUG)]
    #[case::quiet(2, true, Some("yes"), LevelFilter::ERROR)]
    fn filter_caps_at_resolved_level(
        #[case] verbosity: u8,
        #[case] quiet: bool,
        #[case] env: Option<&str>,
        #[case] expected: LevelFilter,
    ) {
        let filter = filter_for(verbosity, quiet, env);
        assert_eq!(filter.max_level_hint(), Some(expected));
    }
}
