#![forbid(unsafe_code)]

//! Logging support.
//!
//! With the `tracing` feature enabled this re-exports the `tracing` macros
//! so downstream crates can log through `ttydisc_core::logging`. Without
//! the feature, no-op macros with the same names are exported at the crate
//! root, so call sites need no conditional compilation of their own.

#[cfg(feature = "tracing")]
pub use tracing::{debug, debug_span, error, info, trace, warn};

/// Install a global subscriber that emits JSON lines, filtered by
/// `RUST_LOG`. Intended for binaries embedding this crate in production.
///
/// Fails when a global subscriber is already installed; embedders that
/// compose their own subscriber stack should skip this and add their own
/// layers instead.
#[cfg(feature = "tracing-json")]
pub fn init_json() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    tracing_subscriber::fmt()
        .json()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init()
        .map_err(Into::into)
}

#[cfg(not(feature = "tracing"))]
mod noop {
    /// No-op `debug!` when tracing is disabled.
    #[macro_export]
    macro_rules! debug {
        ($($arg:tt)*) => {};
    }

    /// No-op `debug_span!` when tracing is disabled.
    #[macro_export]
    macro_rules! debug_span {
        ($($arg:tt)*) => {
            $crate::logging::NoopSpan
        };
    }

    /// No-op `error!` when tracing is disabled.
    #[macro_export]
    macro_rules! error {
        ($($arg:tt)*) => {};
    }

    /// No-op `info!` when tracing is disabled.
    #[macro_export]
    macro_rules! info {
        ($($arg:tt)*) => {};
    }

    /// No-op `trace!` when tracing is disabled.
    #[macro_export]
    macro_rules! trace {
        ($($arg:tt)*) => {};
    }

    /// No-op `warn!` when tracing is disabled.
    #[macro_export]
    macro_rules! warn {
        ($($arg:tt)*) => {};
    }
}

/// Span handle returned by the no-op `debug_span!`.
#[cfg(not(feature = "tracing"))]
pub struct NoopSpan;

#[cfg(not(feature = "tracing"))]
impl NoopSpan {
    /// Enter the no-op span (does nothing).
    pub fn enter(&self) -> NoopGuard {
        NoopGuard
    }
}

/// Guard for the no-op span.
#[cfg(not(feature = "tracing"))]
pub struct NoopGuard;

#[cfg(all(test, feature = "tracing-json"))]
mod tests {
    #[test]
    fn init_json_installs_at_most_one_global_subscriber() {
        let first = super::init_json();
        // A second install must fail rather than stack subscribers.
        let second = super::init_json();
        if first.is_ok() {
            assert!(second.is_err());
        }
    }
}
