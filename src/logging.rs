//! Log output for the `wiki` binary

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Environment variable holding the filter directives
pub const LOG_ENV: &str = "WIKI_LOG";

/// Builds the filter: `WIKI_LOG` if set, otherwise warnings only, or debug
/// output for this crate when `verbose`
pub fn filter(verbose: bool) -> EnvFilter {
    if let Ok(filter) = EnvFilter::try_from_env(LOG_ENV) {
        return filter;
    }
    if verbose {
        EnvFilter::new("warn,wiki_store=debug")
    } else {
        EnvFilter::new("warn")
    }
}

/// Installs the global subscriber, writing to stderr so command output on
/// stdout stays machine-readable
///
/// Calling it more than once is harmless.
pub fn init(verbose: bool) {
    let _ = tracing_subscriber::registry()
        .with(filter(verbose))
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verbose_enables_crate_debug() {
        if std::env::var(LOG_ENV).is_ok() {
            return;
        }
        assert!(filter(true).to_string().contains("wiki_store=debug"));
        assert_eq!(filter(false).to_string(), "warn");
    }

    #[test]
    fn init_twice_is_harmless() {
        init(false);
        init(true);
    }
}
