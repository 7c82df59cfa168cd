//! Logging for the demo binary.
//!
//! One JSON line per event on stdout. The encrypted-column crate logs object
//! ids and type names at `debug`, never plaintext, so `LOG_LEVEL=debug` is
//! safe to turn on while following a round trip.

use anyhow::Result;
use tracing_subscriber::EnvFilter;

/// sqlx reports every statement at `info`, which drowns out the round trip.
const QUIET_SQLX: &str = "sqlx=warn";

/// Filter directives used when `RUST_LOG` is unset.
fn default_directives(log_level: &str) -> String {
    format!("{log_level},{QUIET_SQLX}")
}

/// Install the JSON subscriber.
///
/// `RUST_LOG` replaces the directives built from `log_level`.
///
/// # Errors
///
/// Returns an error if a subscriber is already installed.
pub fn init(log_level: &str) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directives(log_level)));

    tracing_subscriber::fmt()
        .json()
        .with_target(true)
        .with_env_filter(filter)
        .try_init()
        .map_err(|e| anyhow::anyhow!("demo logging already initialised: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level_applies_to_everything_but_sqlx() {
        assert_eq!(default_directives("debug"), "debug,sqlx=warn");
    }

    #[test]
    fn directives_parse() {
        assert!(EnvFilter::try_new(default_directives("info")).is_ok());
    }
}
