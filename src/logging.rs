//! Logging setup
//!
//! Every tracedb crate logs through `tracing`. Library code never installs
//! a subscriber; binaries and tests call [`init`] once, or install their
//! own.

use tracing::Level;

/// Subscriber settings for [`init`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogConfig {
    /// Most verbose level emitted
    pub level: Level,
    /// Include the module target in each line
    pub with_target: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        LogConfig {
            level: Level::INFO,
            with_target: false,
        }
    }
}

impl LogConfig {
    /// Emit debug-level lifecycle events as well.
    pub fn debug() -> Self {
        LogConfig {
            level: Level::DEBUG,
            ..Default::default()
        }
    }
}

/// Install a formatting subscriber as the global default.
///
/// Returns `false` if a global subscriber was already set, in which case
/// the existing one is left in place.
pub fn init(config: &LogConfig) -> bool {
    tracing_subscriber::fmt()
        .with_max_level(config.level)
        .with_target(config.with_target)
        .try_init()
        .is_ok()
}
