#![forbid(unsafe_code)]

//! Flag register codec: bidirectional translation between raw native words
//! and portable capability sets, under one platform profile.
//!
//! Encoding is strict: a capability with no native mapping on the profile
//! is a hard error, never a silently dropped bit. A dropped parity or flow
//! control flag corrupts communication without any visible failure, so
//! there is no best-effort path here.
//!
//! Decoding is total over known capabilities and lossless over unknown
//! ones: bits claimed by no capability come back as an `unknown` remainder
//! that callers carry along and splice back in on encode, so foreign or
//! future kernel bits survive a read-modify-write cycle.
//!
//! The character-size field and the speed words are not bitwise: the size
//! field is masked and compared whole, and speed words are looked up as
//! values (with a literal-rate fallback on profiles that allow it).

use crate::capability::{
    Capability, CharSize, ControlChar, ControlFlags, FlowAction, FlushTarget, InputFlags,
    LocalFlags, OutputFlags, SetTiming, Speed,
};
use crate::error::{Result, TermError};
use crate::profile::{PlatformProfile, Support};

/// A decoded flag register: the recognized capabilities plus the raw bits
/// no capability claims.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Decoded<F> {
    /// Capabilities whose native bits were set.
    pub flags: F,
    /// Bits claimed by no known capability, preserved verbatim.
    pub unknown: u64,
}

/// A decoded control register: independent flags, the whole-field character
/// size, and the unknown remainder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodedControl {
    /// Independent control flags whose native bits were set.
    pub flags: ControlFlags,
    /// The character-size field, compared as a whole.
    pub size: CharSize,
    /// Bits claimed by no known capability, preserved verbatim.
    pub unknown: u64,
}

fn decode_flags<F>(table: &[(F, u64)], raw: u64) -> Decoded<F>
where
    F: bitflags::Flags + Copy,
{
    let mut flags = F::empty();
    let mut claimed = 0u64;
    for &(flag, native) in table {
        if native != 0 && raw & native == native {
            flags.insert(flag);
            claimed |= native;
        }
    }
    Decoded { flags, unknown: raw & !claimed }
}

fn encode_flags<F>(
    profile: &PlatformProfile,
    table: &[(F, u64)],
    flags: F,
    unknown: u64,
    wrap: fn(F) -> Capability,
) -> Result<u64>
where
    F: bitflags::Flags + Copy + PartialEq,
{
    let mut raw = unknown;
    for flag in flags.iter() {
        match table.iter().find(|&&(f, _)| f == flag) {
            Some(&(_, native)) => raw |= native,
            None => {
                return Err(TermError::UnsupportedCapability {
                    capability: wrap(flag),
                    profile: profile.name(),
                });
            }
        }
    }
    Ok(raw)
}

/// Decode a raw input register.
pub fn decode_input(profile: &PlatformProfile, raw: u64) -> Decoded<InputFlags> {
    decode_flags(profile.input, raw)
}

/// Encode an input register, splicing `unknown` back in verbatim.
pub fn encode_input(profile: &PlatformProfile, flags: InputFlags, unknown: u64) -> Result<u64> {
    encode_flags(profile, profile.input, flags, unknown, Capability::Input)
}

/// Decode a raw output register.
pub fn decode_output(profile: &PlatformProfile, raw: u64) -> Decoded<OutputFlags> {
    decode_flags(profile.output, raw)
}

/// Encode an output register, splicing `unknown` back in verbatim.
pub fn encode_output(profile: &PlatformProfile, flags: OutputFlags, unknown: u64) -> Result<u64> {
    encode_flags(profile, profile.output, flags, unknown, Capability::Output)
}

/// Decode a raw local register.
pub fn decode_local(profile: &PlatformProfile, raw: u64) -> Decoded<LocalFlags> {
    decode_flags(profile.local, raw)
}

/// Encode a local register, splicing `unknown` back in verbatim.
pub fn encode_local(profile: &PlatformProfile, flags: LocalFlags, unknown: u64) -> Result<u64> {
    encode_flags(profile, profile.local, flags, unknown, Capability::Local)
}

/// Decode a raw control register, separating the character-size field from
/// the independent bits.
pub fn decode_control(profile: &PlatformProfile, raw: u64) -> Result<DecodedControl> {
    let field = raw & profile.csize_mask;
    let size = profile
        .char_size
        .iter()
        .find(|&&(_, native)| native == field)
        .map(|&(size, _)| size)
        .ok_or(TermError::InvalidFieldValue { field: "CSIZE", value: field })?;

    let rest = raw & !profile.csize_mask;
    let Decoded { flags, unknown } = decode_flags(profile.control, rest);
    Ok(DecodedControl { flags, size, unknown })
}

/// Encode a control register from independent flags plus the whole-field
/// character size.
pub fn encode_control(
    profile: &PlatformProfile,
    flags: ControlFlags,
    size: CharSize,
    unknown: u64,
) -> Result<u64> {
    let field = match profile.map(Capability::Size(size)) {
        Support::Supported(native) => native,
        Support::Unsupported => {
            return Err(TermError::UnsupportedCapability {
                capability: Capability::Size(size),
                profile: profile.name(),
            });
        }
    };
    let bits = encode_flags(profile, profile.control, flags, unknown, Capability::Control)?;
    Ok(bits | field)
}

/// Decode a raw speed word.
///
/// On ladder profiles an unrecognized word is an error; on literal-rate
/// profiles it is an arbitrary rate.
pub fn decode_speed(profile: &PlatformProfile, raw: u64) -> Result<Speed> {
    if let Some(&(rate, _)) = profile.baud.iter().find(|&&(_, native)| native == raw) {
        return Ok(Speed::Rate(rate));
    }
    if profile.allows_arbitrary_rates() && raw > 0 && raw <= u64::from(u32::MAX) {
        return Ok(Speed::Other(raw as u32));
    }
    Err(TermError::InvalidFieldValue { field: "speed", value: raw })
}

/// Encode a speed into the profile's native word.
pub fn encode_speed(profile: &PlatformProfile, speed: Speed) -> Result<u64> {
    match speed {
        Speed::Rate(rate) => match profile.map(Capability::Baud(rate)) {
            Support::Supported(native) => Ok(native),
            Support::Unsupported => Err(TermError::UnsupportedCapability {
                capability: Capability::Baud(rate),
                profile: profile.name(),
            }),
        },
        Speed::Other(0) => Err(TermError::InvalidFieldValue { field: "speed", value: 0 }),
        Speed::Other(rate) => {
            if profile.allows_arbitrary_rates() {
                Ok(u64::from(rate))
            } else {
                Err(TermError::InvalidFieldValue { field: "speed", value: u64::from(rate) })
            }
        }
    }
}

/// The native control-character array slot for `c`.
pub fn control_char_slot(profile: &PlatformProfile, c: ControlChar) -> Result<usize> {
    match profile.map(Capability::Char(c)) {
        Support::Supported(index) => Ok(index as usize),
        Support::Unsupported => Err(TermError::UnsupportedCapability {
            capability: Capability::Char(c),
            profile: profile.name(),
        }),
    }
}

/// The native request code for a flow-control action.
pub fn flow_code(profile: &PlatformProfile, action: FlowAction) -> Result<u64> {
    match profile.map(Capability::Flow(action)) {
        Support::Supported(code) => Ok(code),
        Support::Unsupported => Err(TermError::UnsupportedCapability {
            capability: Capability::Flow(action),
            profile: profile.name(),
        }),
    }
}

/// The native request code for a flush target.
pub fn flush_code(profile: &PlatformProfile, target: FlushTarget) -> Result<u64> {
    match profile.map(Capability::Flush(target)) {
        Support::Supported(code) => Ok(code),
        Support::Unsupported => Err(TermError::UnsupportedCapability {
            capability: Capability::Flush(target),
            profile: profile.name(),
        }),
    }
}

/// The native request code for a commit-timing mode.
pub fn timing_code(profile: &PlatformProfile, timing: SetTiming) -> Result<u64> {
    match profile.map(Capability::Timing(timing)) {
        Support::Supported(code) => Ok(code),
        Support::Unsupported => Err(TermError::UnsupportedCapability {
            capability: Capability::Timing(timing),
            profile: profile.name(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capability::BaudRate;
    use crate::profile::{LINUX, MACOS};

    #[test]
    fn linux_canonical_echo_round_trips_exactly() {
        let wanted = LocalFlags::ICANON | LocalFlags::ECHO;
        let raw = encode_local(&LINUX, wanted, 0).unwrap();
        assert_eq!(raw, 0x0002 | 0x0008);

        let decoded = decode_local(&LINUX, raw);
        assert_eq!(decoded.flags, wanted);
        assert_eq!(decoded.unknown, 0);
    }

    #[test]
    fn extproc_is_rejected_where_unmapped() {
        let err = encode_local(&MACOS, LocalFlags::EXTPROC, 0).unwrap_err();
        assert_eq!(
            err,
            TermError::UnsupportedCapability {
                capability: Capability::Local(LocalFlags::EXTPROC),
                profile: "macos",
            }
        );
        // The same set encodes fine on Linux.
        assert!(encode_local(&LINUX, LocalFlags::EXTPROC, 0).is_ok());
    }

    #[test]
    fn unknown_bits_survive_decode_then_encode() {
        // Bit 15 of the Linux input register is claimed by nothing.
        let raw = 0x0100 | 0x8000;
        let decoded = decode_input(&LINUX, raw);
        assert_eq!(decoded.flags, InputFlags::ICRNL);
        assert_eq!(decoded.unknown, 0x8000);

        let back = encode_input(&LINUX, decoded.flags, decoded.unknown).unwrap();
        assert_eq!(back, raw);
    }

    #[test]
    fn csize_is_a_field_not_a_bitset() {
        // Darwin CS8 (0x300) contains CS7's bits (0x200); decoding must
        // report exactly one size.
        let decoded = decode_control(&MACOS, 0x0300).unwrap();
        assert_eq!(decoded.size, CharSize::Bits8);
        assert_eq!(decoded.flags, ControlFlags::empty());
        assert_eq!(decoded.unknown, 0);

        let decoded = decode_control(&MACOS, 0x0200).unwrap();
        assert_eq!(decoded.size, CharSize::Bits7);
    }

    #[test]
    fn control_encode_rebuilds_the_field() {
        let raw =
            encode_control(&LINUX, ControlFlags::CREAD | ControlFlags::HUPCL, CharSize::Bits8, 0)
                .unwrap();
        assert_eq!(raw, 0x0080 | 0x0400 | 0x0030);
    }

    #[test]
    fn bsd_rtscts_union_round_trips() {
        // On Darwin CRTSCTS is the union of CCTS_OFLOW and CRTS_IFLOW, so
        // decoding 0x30000 reports all three names; re-encoding yields the
        // identical word.
        let decoded = decode_control(&MACOS, 0x0003_0000).unwrap();
        assert!(decoded.flags.contains(ControlFlags::CRTSCTS));
        assert!(decoded.flags.contains(ControlFlags::CCTS_OFLOW));
        assert!(decoded.flags.contains(ControlFlags::CRTS_IFLOW));

        let back =
            encode_control(&MACOS, decoded.flags, decoded.size, decoded.unknown).unwrap();
        assert_eq!(back, 0x0003_0000);
    }

    #[test]
    fn speed_ladder_and_arbitrary_paths() {
        assert_eq!(encode_speed(&LINUX, Speed::Rate(BaudRate::B115200)).unwrap(), 0x1002);
        assert_eq!(decode_speed(&LINUX, 0x1002).unwrap(), Speed::Rate(BaudRate::B115200));

        // The BSD ladder has no megabit entries; Linux has no 76.8k entry.
        assert!(matches!(
            encode_speed(&MACOS, Speed::Rate(BaudRate::B4000000)),
            Err(TermError::UnsupportedCapability { .. })
        ));
        assert!(matches!(
            encode_speed(&LINUX, Speed::Rate(BaudRate::B76800)),
            Err(TermError::UnsupportedCapability { .. })
        ));

        // Literal-rate profiles accept arbitrary positive speeds.
        assert_eq!(encode_speed(&MACOS, Speed::Other(31_250)).unwrap(), 31_250);
        assert_eq!(decode_speed(&MACOS, 31_250).unwrap(), Speed::Other(31_250));
        assert!(matches!(
            encode_speed(&LINUX, Speed::Other(31_250)),
            Err(TermError::InvalidFieldValue { .. })
        ));
        assert!(matches!(
            encode_speed(&MACOS, Speed::Other(0)),
            Err(TermError::InvalidFieldValue { .. })
        ));
    }

    #[test]
    fn control_char_slots_differ_per_family() {
        assert_eq!(control_char_slot(&LINUX, ControlChar::Eof).unwrap(), 4);
        assert_eq!(control_char_slot(&MACOS, ControlChar::Eof).unwrap(), 0);
        assert!(control_char_slot(&LINUX, ControlChar::Status).is_err());
    }

    #[test]
    fn request_codes_follow_the_native_numbering() {
        // BSD request codes are one-based where Linux's are zero-based.
        assert_eq!(flow_code(&LINUX, FlowAction::SuspendOutput).unwrap(), 0);
        assert_eq!(flow_code(&MACOS, FlowAction::SuspendOutput).unwrap(), 1);
        assert_eq!(flush_code(&LINUX, FlushTarget::Both).unwrap(), 2);
        assert_eq!(flush_code(&MACOS, FlushTarget::Both).unwrap(), 3);
        assert_eq!(timing_code(&LINUX, SetTiming::Flush).unwrap(), 2);
        assert_eq!(timing_code(&MACOS, SetTiming::Flush).unwrap(), 2);
    }
}
