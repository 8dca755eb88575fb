#![forbid(unsafe_code)]

//! Device collaborator interface.
//!
//! The core never performs terminal I/O itself. Everything that touches a
//! real device goes through [`TerminalDevice`], implemented outside this
//! crate by a thin OS-call layer (ioctl/tcgetattr-style). Calls may block
//! the calling thread for the duration of the device operation; no
//! cancellation is modeled at this layer.
//!
//! [`SimulatedDevice`] is the in-memory implementation the test suite runs
//! against. Besides faithful store/load behavior it can inject failures and
//! silently ignore selected bits, reproducing the real-driver quirk that
//! makes post-commit verification worthwhile.

use crate::capability::{FlowAction, FlushTarget, SetTiming};
use crate::error::DeviceError;
use crate::state::RawState;

/// The OS-side collaborator a transaction talks to.
///
/// Implementations receive the *native* attribute structure; all portable
/// translation has already happened by the time these are called. Timing is
/// passed portably and mapped to the native request code by the
/// implementation (see [`crate::codec::timing_code`]).
pub trait TerminalDevice {
    /// Fetch the device's current native attributes.
    fn read_attributes(&mut self) -> Result<RawState, DeviceError>;

    /// Apply native attributes with the given timing.
    fn write_attributes(&mut self, raw: &RawState, timing: SetTiming) -> Result<(), DeviceError>;

    /// Suspend or resume transmission, independent of attribute commits.
    fn flow_control(&mut self, action: FlowAction) -> Result<(), DeviceError>;

    /// Discard buffered data.
    fn flush(&mut self, target: FlushTarget) -> Result<(), DeviceError>;
}

/// In-memory terminal device for tests and host-side simulation.
#[derive(Debug, Clone, Default)]
pub struct SimulatedDevice {
    state: RawState,
    /// Error injected into the next read, consumed on use.
    fail_next_read: Option<DeviceError>,
    /// Error injected into the next write, consumed on use.
    fail_next_write: Option<DeviceError>,
    /// Register bits the fake driver silently refuses to change.
    ignore_iflag: u64,
    ignore_oflag: u64,
    ignore_cflag: u64,
    ignore_lflag: u64,
    /// Silently keep the current speeds, as some drivers do for
    /// unsupported rate/flag combinations.
    ignore_speeds: bool,
    commits: Vec<SetTiming>,
    flows: Vec<FlowAction>,
    flushes: Vec<FlushTarget>,
}

impl SimulatedDevice {
    /// A device holding `initial` as its current attributes.
    pub fn new(initial: RawState) -> Self {
        SimulatedDevice {
            state: initial,
            ..SimulatedDevice::default()
        }
    }

    /// The device's current native attributes.
    pub fn current(&self) -> &RawState {
        &self.state
    }

    /// Inject an error into the next `read_attributes` call.
    pub fn fail_next_read(&mut self, error: DeviceError) {
        self.fail_next_read = Some(error);
    }

    /// Inject an error into the next `write_attributes` call.
    pub fn fail_next_write(&mut self, error: DeviceError) {
        self.fail_next_write = Some(error);
    }

    /// Make the driver silently keep its current value for the given local
    /// register bits on every write.
    pub fn ignore_lflag_bits(&mut self, mask: u64) {
        self.ignore_lflag = mask;
    }

    /// Make the driver silently keep its current input register bits.
    pub fn ignore_iflag_bits(&mut self, mask: u64) {
        self.ignore_iflag = mask;
    }

    /// Make the driver silently keep its current speeds.
    pub fn ignore_speeds(&mut self) {
        self.ignore_speeds = true;
    }

    /// Timings of every accepted commit, in order.
    pub fn commits(&self) -> &[SetTiming] {
        &self.commits
    }

    /// Every flow-control request, in order.
    pub fn flows(&self) -> &[FlowAction] {
        &self.flows
    }

    /// Every flush request, in order.
    pub fn flushes(&self) -> &[FlushTarget] {
        &self.flushes
    }
}

impl TerminalDevice for SimulatedDevice {
    fn read_attributes(&mut self) -> Result<RawState, DeviceError> {
        if let Some(error) = self.fail_next_read.take() {
            return Err(error);
        }
        Ok(self.state)
    }

    fn write_attributes(&mut self, raw: &RawState, timing: SetTiming) -> Result<(), DeviceError> {
        if let Some(error) = self.fail_next_write.take() {
            return Err(error);
        }
        let old = self.state;
        self.state = *raw;
        self.state.iflag = (raw.iflag & !self.ignore_iflag) | (old.iflag & self.ignore_iflag);
        self.state.oflag = (raw.oflag & !self.ignore_oflag) | (old.oflag & self.ignore_oflag);
        self.state.cflag = (raw.cflag & !self.ignore_cflag) | (old.cflag & self.ignore_cflag);
        self.state.lflag = (raw.lflag & !self.ignore_lflag) | (old.lflag & self.ignore_lflag);
        if self.ignore_speeds {
            self.state.ispeed = old.ispeed;
            self.state.ospeed = old.ospeed;
        }
        self.commits.push(timing);
        Ok(())
    }

    fn flow_control(&mut self, action: FlowAction) -> Result<(), DeviceError> {
        self.flows.push(action);
        Ok(())
    }

    fn flush(&mut self, target: FlushTarget) -> Result<(), DeviceError> {
        self.flushes.push(target);
        Ok(())
    }
}
