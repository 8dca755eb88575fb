#![forbid(unsafe_code)]

//! Error taxonomy.
//!
//! Every failure is reported to the caller; nothing is recovered silently
//! and nothing is retried. After any error the device's state is not
//! guaranteed to match intent, and callers must re-query before assuming a
//! known state.

use std::fmt;

use crate::capability::{Capability, FlowAction, FlushTarget, SetTiming};

/// Standard result type for ttydisc APIs.
pub type Result<T> = std::result::Result<T, TermError>;

/// The device operation that a [`TermError::Device`] occurred in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceOp {
    /// Reading attributes from the driver.
    Query,
    /// Writing attributes to the driver.
    Commit(SetTiming),
    /// A flow-control request.
    Flow(FlowAction),
    /// A flush request.
    Flush(FlushTarget),
}

impl fmt::Display for DeviceOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeviceOp::Query => write!(f, "query"),
            DeviceOp::Commit(timing) => write!(f, "commit ({timing:?})"),
            DeviceOp::Flow(action) => write!(f, "flow control ({action:?})"),
            DeviceOp::Flush(target) => write!(f, "flush ({target:?})"),
        }
    }
}

/// Failure reported by a device collaborator.
///
/// The core does not interpret causes; it surfaces them together with the
/// operation (and timing mode) that failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeviceError {
    /// The handle does not refer to a terminal device.
    NotATerminal,
    /// The blocking device operation was interrupted.
    Interrupted,
    /// The driver rejected the request.
    Rejected(String),
}

impl fmt::Display for DeviceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeviceError::NotATerminal => write!(f, "not a terminal device"),
            DeviceError::Interrupted => write!(f, "device operation interrupted"),
            DeviceError::Rejected(msg) => write!(f, "driver rejected request: {msg}"),
        }
    }
}

impl std::error::Error for DeviceError {}

/// Top-level error type for the line-discipline core.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TermError {
    /// A requested capability has no native mapping on the active profile.
    /// Raised by encoding and by capability setters, never ignored.
    UnsupportedCapability {
        /// The capability that has no mapping.
        capability: Capability,
        /// Name of the profile that lacks it.
        profile: &'static str,
    },
    /// A multi-valued field was given a value outside its closed set, or a
    /// raw word carried one.
    InvalidFieldValue {
        /// The field or register involved.
        field: &'static str,
        /// The offending value.
        value: u64,
    },
    /// A collaborator failed; propagated verbatim with the operation that
    /// was in flight.
    Device {
        /// What the core was doing when the device failed.
        op: DeviceOp,
        /// The collaborator's error, uninterpreted.
        source: DeviceError,
    },
    /// A post-commit verification found the device's state diverging from
    /// the requested state. The driver silently ignored part of the commit.
    VerificationMismatch {
        /// Human-readable description of each diverging attribute.
        diffs: Vec<String>,
    },
}

impl fmt::Display for TermError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TermError::UnsupportedCapability { capability, profile } => {
                write!(f, "capability {capability} is not supported on the {profile} profile")
            }
            TermError::InvalidFieldValue { field, value } => {
                write!(f, "invalid value {value:#x} for field {field}")
            }
            TermError::Device { op, source } => {
                write!(f, "device {op} failed: {source}")
            }
            TermError::VerificationMismatch { diffs } => {
                write!(f, "device state diverges from request: {}", diffs.join("; "))
            }
        }
    }
}

impl std::error::Error for TermError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            TermError::Device { source, .. } => Some(source),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capability::LocalFlags;

    #[test]
    fn display_names_the_capability_and_profile() {
        let err = TermError::UnsupportedCapability {
            capability: Capability::Local(LocalFlags::EXTPROC),
            profile: "macos",
        };
        let text = err.to_string();
        assert!(text.contains("EXTPROC"));
        assert!(text.contains("macos"));
    }

    #[test]
    fn device_errors_expose_their_source() {
        use std::error::Error as _;
        let err = TermError::Device {
            op: DeviceOp::Commit(SetTiming::Flush),
            source: DeviceError::NotATerminal,
        };
        assert!(err.source().is_some());
        assert!(err.to_string().contains("Flush"));
    }
}
