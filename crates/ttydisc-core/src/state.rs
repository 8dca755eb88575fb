#![forbid(unsafe_code)]

//! In-memory terminal attribute state, expressed in portable capabilities.
//!
//! A [`TermState`] is a plain value with no OS-side lifetime: it is built
//! from a device query (via [`TermState::from_raw`]) or from scratch,
//! mutated through capability-level accessors, and rendered back to a
//! [`RawState`] only at the device boundary. Internally everything is kept
//! decoded; raw integers never leak past `from_raw`/`to_raw`.
//!
//! Unknown native bits and unclaimed control-character slots picked up by
//! `from_raw` ride along untouched and are spliced back by `to_raw`, so a
//! read-modify-write cycle never destroys kernel state this crate does not
//! model.
//!
//! All setters validate against the state's profile and fail with
//! [`TermError::UnsupportedCapability`] rather than turning into no-ops; a
//! silently ignored mode change is how terminals end up wedged in modes
//! their owner never asked for.

use std::fmt;

use crate::capability::{
    Capability, CharSize, ControlChar, ControlFlags, InputFlags, LocalFlags, OutputFlags, Speed,
};
use crate::codec;
use crate::error::{Result, TermError};
use crate::profile::PlatformProfile;

/// Largest native control-character array across the supported profiles.
pub const CC_MAX: usize = 32;

/// The platform's native attribute structure, as exchanged with the device
/// collaborators. Field meanings are profile-specific; nothing outside the
/// codec should interpret them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawState {
    /// Input-processing register.
    pub iflag: u64,
    /// Output-processing register.
    pub oflag: u64,
    /// Hardware-control register.
    pub cflag: u64,
    /// Local-mode register.
    pub lflag: u64,
    /// Control-character array; only the profile's first
    /// `control_char_count()` slots are meaningful.
    pub cc: [u8; CC_MAX],
    /// Input speed word.
    pub ispeed: u64,
    /// Output speed word.
    pub ospeed: u64,
}

impl Default for RawState {
    fn default() -> Self {
        RawState::zeroed()
    }
}

impl RawState {
    /// An all-zero structure, as a freshly queried buffer would start.
    pub const fn zeroed() -> Self {
        RawState {
            iflag: 0,
            oflag: 0,
            cflag: 0,
            lflag: 0,
            cc: [0; CC_MAX],
            ispeed: 0,
            ospeed: 0,
        }
    }
}

/// A full terminal attribute set in portable form.
#[derive(Clone, PartialEq, Eq)]
pub struct TermState {
    profile: &'static PlatformProfile,
    input: InputFlags,
    input_unknown: u64,
    output: OutputFlags,
    output_unknown: u64,
    control: ControlFlags,
    size: CharSize,
    control_unknown: u64,
    local: LocalFlags,
    local_unknown: u64,
    cc: [u8; CC_MAX],
    ispeed: Speed,
    ospeed: Speed,
}

impl TermState {
    /// A blank state on `profile`: no flags set, eight-bit characters, all
    /// control characters disabled except `Min = 1` / `Time = 0`, speeds at
    /// 9600 baud.
    pub fn new(profile: &'static PlatformProfile) -> Self {
        let mut cc = [0u8; CC_MAX];
        for slot in cc.iter_mut().take(profile.control_char_count()) {
            *slot = profile.disabled_char();
        }
        // Seed the non-canonical read parameters from the profile table
        // itself, so a profile that relocates the slots stays correct.
        for &(c, slot) in profile.cc {
            match c {
                ControlChar::Min => cc[slot as usize] = 1,
                ControlChar::Time => cc[slot as usize] = 0,
                _ => {}
            }
        }
        TermState {
            profile,
            input: InputFlags::empty(),
            input_unknown: 0,
            output: OutputFlags::empty(),
            output_unknown: 0,
            control: ControlFlags::empty(),
            size: CharSize::Bits8,
            control_unknown: 0,
            local: LocalFlags::empty(),
            local_unknown: 0,
            cc,
            ispeed: Speed::Rate(crate::capability::BaudRate::B9600),
            ospeed: Speed::Rate(crate::capability::BaudRate::B9600),
        }
    }

    /// Decode a queried native structure into portable form.
    pub fn from_raw(profile: &'static PlatformProfile, raw: &RawState) -> Result<Self> {
        let input = codec::decode_input(profile, raw.iflag);
        let output = codec::decode_output(profile, raw.oflag);
        let control = codec::decode_control(profile, raw.cflag)?;
        let local = codec::decode_local(profile, raw.lflag);
        Ok(TermState {
            profile,
            input: input.flags,
            input_unknown: input.unknown,
            output: output.flags,
            output_unknown: output.unknown,
            control: control.flags,
            size: control.size,
            control_unknown: control.unknown,
            local: local.flags,
            local_unknown: local.unknown,
            cc: raw.cc,
            ispeed: codec::decode_speed(profile, raw.ispeed)?,
            ospeed: codec::decode_speed(profile, raw.ospeed)?,
        })
    }

    /// Encode back into the native structure for the device boundary.
    pub fn to_raw(&self) -> Result<RawState> {
        Ok(RawState {
            iflag: codec::encode_input(self.profile, self.input, self.input_unknown)?,
            oflag: codec::encode_output(self.profile, self.output, self.output_unknown)?,
            cflag: codec::encode_control(
                self.profile,
                self.control,
                self.size,
                self.control_unknown,
            )?,
            lflag: codec::encode_local(self.profile, self.local, self.local_unknown)?,
            cc: self.cc,
            ispeed: codec::encode_speed(self.profile, self.ispeed)?,
            ospeed: codec::encode_speed(self.profile, self.ospeed)?,
        })
    }

    /// The profile this state is bound to.
    pub fn profile(&self) -> &'static PlatformProfile {
        self.profile
    }

    /// Whether `capability` exists on this state's profile.
    pub fn supports(&self, capability: Capability) -> bool {
        self.profile.supports(capability)
    }

    // ── Flag registers ──────────────────────────────────────────────

    /// Current input flags.
    pub fn input(&self) -> InputFlags {
        self.input
    }

    /// Current output flags.
    pub fn output(&self) -> OutputFlags {
        self.output
    }

    /// Current independent control flags.
    pub fn control(&self) -> ControlFlags {
        self.control
    }

    /// Current local flags.
    pub fn local(&self) -> LocalFlags {
        self.local
    }

    /// Set or clear input flags. Every named flag must be supported.
    pub fn set_input(&mut self, flags: InputFlags, on: bool) -> Result<()> {
        self.ensure_all(flags, Capability::Input)?;
        self.input.set(flags, on);
        Ok(())
    }

    /// Set or clear output flags. Every named flag must be supported.
    pub fn set_output(&mut self, flags: OutputFlags, on: bool) -> Result<()> {
        self.ensure_all(flags, Capability::Output)?;
        self.output.set(flags, on);
        Ok(())
    }

    /// Set or clear independent control flags. Every named flag must be
    /// supported.
    pub fn set_control(&mut self, flags: ControlFlags, on: bool) -> Result<()> {
        self.ensure_all(flags, Capability::Control)?;
        self.control.set(flags, on);
        Ok(())
    }

    /// Set or clear local flags. Every named flag must be supported.
    pub fn set_local(&mut self, flags: LocalFlags, on: bool) -> Result<()> {
        self.ensure_all(flags, Capability::Local)?;
        self.local.set(flags, on);
        Ok(())
    }

    /// Whether a single flag capability is set. Fails on capabilities the
    /// profile does not map, and on non-flag categories.
    pub fn flag(&self, capability: Capability) -> Result<bool> {
        self.ensure_supported(capability)?;
        match capability {
            Capability::Input(f) => Ok(self.input.contains(f)),
            Capability::Output(f) => Ok(self.output.contains(f)),
            Capability::Control(f) => Ok(self.control.contains(f)),
            Capability::Local(f) => Ok(self.local.contains(f)),
            Capability::Size(s) => Ok(self.size == s),
            _ => Err(TermError::InvalidFieldValue { field: "flag capability", value: 0 }),
        }
    }

    /// Set or clear a single flag capability, dispatching on its category.
    ///
    /// Clearing a [`Capability::Size`] is meaningless (some size is always
    /// in effect) and is rejected; set a different size instead.
    pub fn set_flag(&mut self, capability: Capability, on: bool) -> Result<()> {
        match capability {
            Capability::Input(f) => self.set_input(f, on),
            Capability::Output(f) => self.set_output(f, on),
            Capability::Control(f) => self.set_control(f, on),
            Capability::Local(f) => self.set_local(f, on),
            Capability::Size(s) if on => self.set_char_size(s),
            _ => Err(TermError::InvalidFieldValue { field: "flag capability", value: 0 }),
        }
    }

    // ── Character size ──────────────────────────────────────────────

    /// The character-size field.
    pub fn char_size(&self) -> CharSize {
        self.size
    }

    /// Replace the character-size field.
    pub fn set_char_size(&mut self, size: CharSize) -> Result<()> {
        self.ensure_supported(Capability::Size(size))?;
        self.size = size;
        Ok(())
    }

    // ── Control characters ──────────────────────────────────────────

    /// The byte in a control-character slot.
    pub fn control_char(&self, c: ControlChar) -> Result<u8> {
        let slot = codec::control_char_slot(self.profile, c)?;
        Ok(self.cc[slot])
    }

    /// Store a byte in a control-character slot.
    pub fn set_control_char(&mut self, c: ControlChar, byte: u8) -> Result<()> {
        let slot = codec::control_char_slot(self.profile, c)?;
        self.cc[slot] = byte;
        Ok(())
    }

    /// Disable a control character by storing the profile's disable byte.
    pub fn disable_control_char(&mut self, c: ControlChar) -> Result<()> {
        self.set_control_char(c, self.profile.disabled_char())
    }

    /// Whether a control character currently holds the disable byte.
    pub fn control_char_disabled(&self, c: ControlChar) -> Result<bool> {
        Ok(self.control_char(c)? == self.profile.disabled_char())
    }

    // ── Speeds ──────────────────────────────────────────────────────

    /// Input transmission speed.
    pub fn input_speed(&self) -> Speed {
        self.ispeed
    }

    /// Output transmission speed.
    pub fn output_speed(&self) -> Speed {
        self.ospeed
    }

    /// Set the input speed. Validated against the profile immediately, so
    /// an unrepresentable rate fails here rather than at commit.
    pub fn set_input_speed(&mut self, speed: Speed) -> Result<()> {
        codec::encode_speed(self.profile, speed)?;
        self.ispeed = speed;
        Ok(())
    }

    /// Set the output speed.
    pub fn set_output_speed(&mut self, speed: Speed) -> Result<()> {
        codec::encode_speed(self.profile, speed)?;
        self.ospeed = speed;
        Ok(())
    }

    /// Set both speeds at once.
    pub fn set_speed(&mut self, speed: Speed) -> Result<()> {
        self.set_input_speed(speed)?;
        self.set_output_speed(speed)
    }

    // ── Presets ─────────────────────────────────────────────────────

    /// Switch to raw mode: no echo, no line buffering, no signal or
    /// flow-control characters, no output post-processing, eight-bit
    /// characters, byte-at-a-time reads.
    ///
    /// Clearing is always safe (an unmapped flag can never be present), so
    /// the same preset works on every profile.
    pub fn make_raw(&mut self) -> Result<()> {
        self.input.remove(
            InputFlags::IGNBRK
                | InputFlags::BRKINT
                | InputFlags::PARMRK
                | InputFlags::ISTRIP
                | InputFlags::INLCR
                | InputFlags::IGNCR
                | InputFlags::ICRNL
                | InputFlags::IXON,
        );
        self.output.remove(OutputFlags::OPOST);
        self.local.remove(
            LocalFlags::ECHO
                | LocalFlags::ECHONL
                | LocalFlags::ICANON
                | LocalFlags::ISIG
                | LocalFlags::IEXTEN,
        );
        self.control.remove(ControlFlags::PARENB);
        self.set_char_size(CharSize::Bits8)?;
        self.set_control_char(ControlChar::Min, 1)?;
        self.set_control_char(ControlChar::Time, 0)
    }

    // ── Comparison ──────────────────────────────────────────────────

    /// Describe every portable attribute where `device` differs from
    /// `self`. Unknown bits are excluded: only capabilities this crate
    /// models can be meaningfully verified.
    pub fn diff(&self, device: &TermState) -> Vec<String> {
        let mut diffs = Vec::new();
        if self.input != device.input {
            diffs.push(format!(
                "iflag: requested {}, device has {}",
                names(self.input),
                names(device.input)
            ));
        }
        if self.output != device.output {
            diffs.push(format!(
                "oflag: requested {}, device has {}",
                names(self.output),
                names(device.output)
            ));
        }
        if self.control != device.control {
            diffs.push(format!(
                "cflag: requested {}, device has {}",
                names(self.control),
                names(device.control)
            ));
        }
        if self.size != device.size {
            diffs.push(format!(
                "char size: requested {:?}, device has {:?}",
                self.size, device.size
            ));
        }
        if self.local != device.local {
            diffs.push(format!(
                "lflag: requested {}, device has {}",
                names(self.local),
                names(device.local)
            ));
        }
        for &(c, slot) in self.profile.cc {
            let slot = slot as usize;
            if self.cc[slot] != device.cc[slot] {
                diffs.push(format!(
                    "{c:?}: requested {:#04x}, device has {:#04x}",
                    self.cc[slot], device.cc[slot]
                ));
            }
        }
        if self.ispeed != device.ispeed {
            diffs.push(format!(
                "input speed: requested {:?}, device has {:?}",
                self.ispeed, device.ispeed
            ));
        }
        if self.ospeed != device.ospeed {
            diffs.push(format!(
                "output speed: requested {:?}, device has {:?}",
                self.ospeed, device.ospeed
            ));
        }
        diffs
    }

    fn ensure_supported(&self, capability: Capability) -> Result<()> {
        if self.profile.supports(capability) {
            Ok(())
        } else {
            Err(TermError::UnsupportedCapability {
                capability,
                profile: self.profile.name(),
            })
        }
    }

    fn ensure_all<F>(&self, flags: F, wrap: fn(F) -> Capability) -> Result<()>
    where
        F: bitflags::Flags + Copy,
    {
        for flag in flags.iter() {
            self.ensure_supported(wrap(flag))?;
        }
        Ok(())
    }
}

fn names<F: bitflags::Flags>(flags: F) -> String {
    let mut out = String::new();
    for (name, _) in flags.iter_names() {
        if !out.is_empty() {
            out.push_str(" | ");
        }
        out.push_str(name);
    }
    if out.is_empty() {
        out.push_str("(none)");
    }
    out
}

impl fmt::Debug for TermState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "iflag:\t{}", names(self.input))?;
        writeln!(f, "oflag:\t{}", names(self.output))?;
        writeln!(f, "cflag:\t{} | {:?}", names(self.control), self.size)?;
        writeln!(f, "lflag:\t{}", names(self.local))?;
        write!(f, "cc:\t")?;
        let mut first = true;
        for &(c, slot) in self.profile.cc {
            if !first {
                write!(f, ", ")?;
            }
            first = false;
            write!(f, "{c:?}: {}", self.cc[slot as usize])?;
        }
        writeln!(f)?;
        writeln!(f, "ispeed:\t{:?}", self.ispeed)?;
        write!(f, "ospeed:\t{:?}", self.ospeed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capability::BaudRate;
    use crate::profile::{LINUX, MACOS};

    #[test]
    fn raw_round_trip_preserves_unknown_bits_and_spare_slots() {
        let mut raw = RawState::zeroed();
        raw.iflag = 0x0100 | 0x0001_0000; // ICRNL plus an unclaimed bit
        raw.lflag = 0x0002 | 0x0008; // ICANON | ECHO
        raw.cflag = 0x0030 | 0x0080; // CS8 | CREAD
        raw.cc[25] = 0x7f; // spare slot no capability claims
        raw.ispeed = 0x000d;
        raw.ospeed = 0x000d;

        let state = TermState::from_raw(&LINUX, &raw).unwrap();
        assert_eq!(state.local(), LocalFlags::ICANON | LocalFlags::ECHO);
        assert_eq!(state.char_size(), CharSize::Bits8);
        assert_eq!(state.input_speed(), Speed::Rate(BaudRate::B9600));

        let back = state.to_raw().unwrap();
        assert_eq!(back, raw);
    }

    #[test]
    fn states_compare_by_value_within_a_profile() {
        let a = TermState::new(&LINUX);
        let b = TermState::new(&LINUX);
        assert_eq!(a, b);

        let mut c = b.clone();
        c.set_local(LocalFlags::ECHO, true).unwrap();
        assert_ne!(a, c);

        assert_ne!(TermState::new(&LINUX), TermState::new(&MACOS));
    }

    #[test]
    fn new_state_seeds_noncanonical_read_parameters() {
        // Min and Time live in different slots per family; both must come
        // up as one-byte reads with no timeout.
        for profile in [&LINUX, &MACOS] {
            let state = TermState::new(profile);
            assert_eq!(state.control_char(ControlChar::Min).unwrap(), 1);
            assert_eq!(state.control_char(ControlChar::Time).unwrap(), 0);
        }
    }

    #[test]
    fn set_rejects_unmapped_capabilities() {
        let mut state = TermState::new(&MACOS);
        let err = state.set_local(LocalFlags::EXTPROC, true).unwrap_err();
        assert!(matches!(err, TermError::UnsupportedCapability { .. }));
        // The rejection really was a no-op on the state.
        assert_eq!(state.local(), LocalFlags::empty());

        // Mixed sets fail atomically before any bit is applied.
        let err = state
            .set_local(LocalFlags::ECHO | LocalFlags::XCASE, true)
            .unwrap_err();
        assert!(matches!(err, TermError::UnsupportedCapability { .. }));
        assert_eq!(state.local(), LocalFlags::empty());
    }

    #[test]
    fn unsupported_control_chars_are_never_indexed() {
        let mut state = TermState::new(&LINUX);
        assert!(state.control_char(ControlChar::Status).is_err());
        assert!(state.set_control_char(ControlChar::Status, 0x14).is_err());

        let mut state = TermState::new(&MACOS);
        assert!(state.control_char(ControlChar::Switch).is_err());
        assert!(state.set_control_char(ControlChar::Switch, 0).is_err());
    }

    #[test]
    fn disable_uses_the_profile_sentinel() {
        let mut linux = TermState::new(&LINUX);
        linux.set_control_char(ControlChar::Eof, 4).unwrap();
        linux.disable_control_char(ControlChar::Eof).unwrap();
        assert_eq!(linux.control_char(ControlChar::Eof).unwrap(), 0x00);

        let mut mac = TermState::new(&MACOS);
        mac.disable_control_char(ControlChar::Eof).unwrap();
        assert_eq!(mac.control_char(ControlChar::Eof).unwrap(), 0xff);
        assert!(mac.control_char_disabled(ControlChar::Eof).unwrap());
    }

    #[test]
    fn make_raw_matches_the_classic_preset() {
        let mut state = TermState::new(&LINUX);
        state
            .set_local(
                LocalFlags::ICANON | LocalFlags::ECHO | LocalFlags::ISIG | LocalFlags::IEXTEN,
                true,
            )
            .unwrap();
        state
            .set_input(InputFlags::ICRNL | InputFlags::IXON | InputFlags::BRKINT, true)
            .unwrap();
        state.set_output(OutputFlags::OPOST | OutputFlags::ONLCR, true).unwrap();

        state.make_raw().unwrap();

        assert_eq!(state.local(), LocalFlags::empty());
        assert_eq!(state.input(), InputFlags::empty());
        // ONLCR survives; only OPOST itself is cleared.
        assert_eq!(state.output(), OutputFlags::ONLCR);
        assert_eq!(state.char_size(), CharSize::Bits8);
        assert_eq!(state.control_char(ControlChar::Min).unwrap(), 1);
        assert_eq!(state.control_char(ControlChar::Time).unwrap(), 0);
    }

    #[test]
    fn flag_umbrella_accessor_dispatches_by_category() {
        let mut state = TermState::new(&LINUX);
        state.set_flag(Capability::Local(LocalFlags::ECHO), true).unwrap();
        assert!(state.flag(Capability::Local(LocalFlags::ECHO)).unwrap());
        assert!(state.flag(Capability::Size(CharSize::Bits8)).unwrap());
        assert!(state.flag(Capability::Baud(BaudRate::B9600)).is_err());
        assert!(
            state
                .flag(Capability::Local(LocalFlags::ALTWERASE))
                .is_err(),
            "reading an unmapped capability must fail, not report false"
        );
    }

    #[test]
    fn debug_rendering_lists_set_flags_by_name() {
        let mut state = TermState::new(&LINUX);
        state.set_local(LocalFlags::ICANON | LocalFlags::ECHO, true).unwrap();
        let text = format!("{state:?}");
        assert!(text.contains("ECHO | ICANON") || text.contains("ICANON | ECHO"));
        assert!(text.contains("ispeed"));
    }
}
