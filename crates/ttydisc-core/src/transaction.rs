#![forbid(unsafe_code)]

//! Attribute transactions: the read-modify-write protocol against a
//! terminal device.
//!
//! A transaction moves through these phases:
//!
//! 1. **Queried** — [`Transaction::query`] fetches the device's attributes
//!    and decodes them into a portable [`TermState`].
//! 2. **Modified** — zero or more setter calls on [`Transaction::state_mut`];
//!    purely in-memory, no device effect.
//! 3. **Committed** — [`Transaction::commit`] encodes the state and hands it
//!    to the device with one [`SetTiming`] mode.
//! 4. **Failed** — a rejected commit leaves the in-memory state exactly as
//!    the caller last modified it, but the *device's* state is unspecified
//!    relative to the request. Callers must re-query to resynchronize;
//!    the core never retries, since blindly replaying a commit can reapply
//!    a timing-sensitive flush at the wrong moment.
//! 5. **Verified** (optional) — [`Transaction::verify`] re-queries and
//!    compares, surfacing drivers that silently ignored part of a commit
//!    (known behavior for unsupported speed/flag combinations).
//!
//! One transaction has one owner; the ordering guarantee above holds only
//! within it. Concurrent transactions against the same device race at the
//! device level and are a caller responsibility — no locking is provided
//! here.

use crate::capability::{FlowAction, FlushTarget, SetTiming};
use crate::device::TerminalDevice;
use crate::error::{DeviceOp, Result, TermError};
use crate::profile::PlatformProfile;
use crate::state::TermState;

/// A single read-modify-write exchange with one terminal device.
#[derive(Debug)]
pub struct Transaction<'d, D: TerminalDevice + ?Sized> {
    device: &'d mut D,
    state: TermState,
}

impl<'d, D: TerminalDevice + ?Sized> Transaction<'d, D> {
    /// Query the device and decode its attributes under `profile`.
    pub fn query(device: &'d mut D, profile: &'static PlatformProfile) -> Result<Self> {
        let raw = device
            .read_attributes()
            .map_err(|source| TermError::Device { op: DeviceOp::Query, source })?;
        let state = TermState::from_raw(profile, &raw)?;
        #[cfg(feature = "tracing")]
        tracing::debug!(profile = profile.name(), "queried terminal attributes");
        Ok(Transaction { device, state })
    }

    /// Start from a caller-built state instead of a device query, for
    /// devices whose current attributes are irrelevant (fresh serial lines
    /// and the like).
    pub fn with_state(device: &'d mut D, state: TermState) -> Self {
        Transaction { device, state }
    }

    /// The in-memory state.
    pub fn state(&self) -> &TermState {
        &self.state
    }

    /// The in-memory state, for modification. Nothing reaches the device
    /// until [`commit`](Self::commit).
    pub fn state_mut(&mut self) -> &mut TermState {
        &mut self.state
    }

    /// Encode the state and apply it to the device with `timing`.
    ///
    /// `SetTiming::Drain` is the safe choice when output processing
    /// changes; `SetTiming::Flush` is required when input processing
    /// changes, so queued bytes are not interpreted under the old
    /// discipline. On error the in-memory state is left untouched and the
    /// device state is unspecified; re-query before relying on either.
    pub fn commit(&mut self, timing: SetTiming) -> Result<()> {
        let raw = self.state.to_raw()?;
        self.device
            .write_attributes(&raw, timing)
            .map_err(|source| TermError::Device { op: DeviceOp::Commit(timing), source })?;
        #[cfg(feature = "tracing")]
        tracing::info!(
            profile = self.state.profile().name(),
            ?timing,
            "committed terminal attributes"
        );
        Ok(())
    }

    /// Re-query the device and compare against the requested state.
    ///
    /// Returns [`TermError::VerificationMismatch`] when the driver's actual
    /// state diverges from the request — the partial-success condition a
    /// plain commit cannot see. Only modeled capabilities are compared;
    /// unknown bits are outside the verifiable surface.
    pub fn verify(&mut self) -> Result<()> {
        let raw = self.device
            .read_attributes()
            .map_err(|source| TermError::Device { op: DeviceOp::Query, source })?;
        let actual = TermState::from_raw(self.state.profile(), &raw)?;
        let diffs = self.state.diff(&actual);
        if diffs.is_empty() {
            Ok(())
        } else {
            #[cfg(feature = "tracing")]
            tracing::warn!(diffs = diffs.len(), "device ignored part of the commit");
            Err(TermError::VerificationMismatch { diffs })
        }
    }

    /// Commit, then verify. For callers needing strict guarantees that the
    /// driver accepted every requested change.
    pub fn commit_verified(&mut self, timing: SetTiming) -> Result<()> {
        self.commit(timing)?;
        self.verify()
    }

    /// Suspend or resume transmission, independent of any commit.
    pub fn flow_control(&mut self, action: FlowAction) -> Result<()> {
        self.device
            .flow_control(action)
            .map_err(|source| TermError::Device { op: DeviceOp::Flow(action), source })
    }

    /// Discard buffered data on the device.
    pub fn flush(&mut self, target: FlushTarget) -> Result<()> {
        self.device
            .flush(target)
            .map_err(|source| TermError::Device { op: DeviceOp::Flush(target), source })
    }
}
