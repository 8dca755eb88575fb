#![forbid(unsafe_code)]

//! Core: portable line-discipline model — capability registry, platform
//! profiles, register codecs, terminal state, and attribute transactions.
//!
//! The one rule everything here follows: raw native integers exist only at
//! the device boundary. Inside the crate, terminal attributes are sets of
//! named capabilities, and a capability the active kernel family does not
//! implement is a visible error, never a silently dropped bit.

pub mod capability;
pub mod codec;
pub mod device;
pub mod error;
pub mod logging;
pub mod profile;
pub mod state;
pub mod transaction;

// Re-export tracing macros at crate root for ergonomic use. The `error!`
// macro stays under `logging` to avoid clashing with the error module.
#[cfg(feature = "tracing")]
pub use logging::{debug, debug_span, info, trace, warn};
