#![forbid(unsafe_code)]

//! Public facade crate.
//!
//! This crate provides the stable, ergonomic surface area for users. It
//! re-exports the portable line-discipline model from `ttydisc-core` and
//! offers a lightweight prelude for day-to-day usage.
//!
//! # Example
//!
//! Put a terminal into raw mode through a device collaborator and restore
//! it afterwards:
//!
//! ```
//! use ttydisc::prelude::*;
//! use ttydisc::device::SimulatedDevice;
//! use ttydisc::state::RawState;
//!
//! fn main() -> ttydisc::Result<()> {
//!     let mut device = SimulatedDevice::new(RawState::zeroed());
//!
//!     let mut tx = Transaction::query(&mut device, &ttydisc::profile::LINUX)?;
//!     let saved = tx.state().clone();
//!
//!     tx.state_mut().make_raw()?;
//!     tx.commit(SetTiming::Flush)?;
//!
//!     // ... byte-at-a-time input ...
//!
//!     *tx.state_mut() = saved;
//!     tx.commit(SetTiming::Drain)?;
//!     Ok(())
//! }
//! ```

// --- Capability re-exports -------------------------------------------------

pub use ttydisc_core::capability::{
    BaudRate, Capability, Category, CharSize, ControlChar, ControlFlags, FlowAction, FlushTarget,
    InputFlags, LocalFlags, OutputFlags, SetTiming, Speed,
};

// --- Profile and codec re-exports ------------------------------------------

pub use ttydisc_core::profile::{PlatformProfile, Support};

// --- State and transaction re-exports --------------------------------------

pub use ttydisc_core::device::{SimulatedDevice, TerminalDevice};
pub use ttydisc_core::state::{RawState, TermState};
pub use ttydisc_core::transaction::Transaction;

// --- Errors ----------------------------------------------------------------

pub use ttydisc_core::error::{DeviceError, DeviceOp, Result, TermError};

/// Alias kept for readability in `Result<T, Error>` signatures.
pub type Error = TermError;

// --- Prelude ---------------------------------------------------------------

/// Common imports for working with terminal attributes.
pub mod prelude {
    pub use crate::{
        BaudRate, Capability, CharSize, ControlChar, ControlFlags, FlowAction, FlushTarget,
        InputFlags, LocalFlags, OutputFlags, PlatformProfile, Result, SetTiming, Speed, TermError,
        TermState, TerminalDevice, Transaction,
    };
}

pub use ttydisc_core as core;
pub use ttydisc_core::capability;
pub use ttydisc_core::codec;
pub use ttydisc_core::device;
pub use ttydisc_core::profile;
pub use ttydisc_core::state;
pub use ttydisc_core::transaction;
