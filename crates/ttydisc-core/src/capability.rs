#![forbid(unsafe_code)]

//! Portable capability registry.
//!
//! Every terminal attribute the line discipline understands is named here
//! exactly once, as a member of a closed, platform-independent vocabulary.
//! The set of names is identical on every platform profile; only the native
//! values a [`PlatformProfile`](crate::profile::PlatformProfile) assigns to
//! them vary (including "no value at all" for capabilities a kernel family
//! never implemented).
//!
//! Flag-register capabilities use `bitflags` sets with *portable* bit
//! positions. These positions are an internal encoding of "which named
//! capabilities are in this set" and are unrelated to the native bit values
//! the kernel uses; the codec translates between the two.
//!
//! # Invariants
//!
//! 1. **Closed universe**: no capability exists outside this module, and
//!    nothing here is conditionally compiled per platform.
//! 2. **Stable ordering**: [`all`] returns capabilities in declaration
//!    order, identically on every host.
//! 3. **One category each**: [`Capability::category`] is total and maps
//!    every identifier to exactly one [`Category`].

use std::fmt;

use bitflags::bitflags;

/// The attribute categories a capability can belong to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    /// Special control characters (`c_cc` slots).
    ControlChar,
    /// Input-processing flags (`c_iflag`).
    InputFlag,
    /// Output-processing flags (`c_oflag`).
    OutputFlag,
    /// Hardware control flags (`c_cflag`), including the character-size field.
    ControlFlag,
    /// Local / line-discipline flags (`c_lflag`).
    LocalFlag,
    /// Transmission suspend/resume actions.
    FlowAction,
    /// Buffered-data discard targets.
    FlushTarget,
    /// When an attribute commit takes effect.
    SetTiming,
    /// Standard transmission speeds.
    BaudRate,
}

// ── Control characters ──────────────────────────────────────────────────

/// Special control characters, named by their line-discipline role.
///
/// Each one indexes a slot of the control-character array. `Min` and `Time`
/// are not characters at all but the non-canonical read parameters that
/// share the array.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ControlChar {
    /// Generate an interrupt signal (typically `^C`).
    Intr,
    /// Generate a quit signal (typically `^\`).
    Quit,
    /// Erase the previous character (typically `^?`).
    Erase,
    /// Erase the current line (typically `^U`).
    Kill,
    /// End of file / input (typically `^D`).
    Eof,
    /// End of line.
    Eol,
    /// Alternate end of line.
    Eol2,
    /// Resume suspended output (typically `^Q`).
    Start,
    /// Suspend output (typically `^S`).
    Stop,
    /// Suspend the foreground job (typically `^Z`).
    Susp,
    /// Redraw the pending input line (typically `^R`).
    Reprint,
    /// Discard pending output (typically `^O`).
    Discard,
    /// Erase the previous word (typically `^W`).
    WordErase,
    /// Take the next character literally (typically `^V`).
    LiteralNext,
    /// Minimum byte count for non-canonical reads.
    Min,
    /// Timeout (deciseconds) for non-canonical reads.
    Time,
    /// Delayed suspend: signal when the character is read, not typed.
    /// BSD family only.
    DelayedSuspend,
    /// Print kernel status information for the foreground job.
    /// BSD family only.
    Status,
    /// Shell-layer switch character. Linux family only, historical.
    Switch,
}

impl ControlChar {
    /// All control-character capabilities, in declaration order.
    pub const ALL: [ControlChar; 19] = [
        ControlChar::Intr,
        ControlChar::Quit,
        ControlChar::Erase,
        ControlChar::Kill,
        ControlChar::Eof,
        ControlChar::Eol,
        ControlChar::Eol2,
        ControlChar::Start,
        ControlChar::Stop,
        ControlChar::Susp,
        ControlChar::Reprint,
        ControlChar::Discard,
        ControlChar::WordErase,
        ControlChar::LiteralNext,
        ControlChar::Min,
        ControlChar::Time,
        ControlChar::DelayedSuspend,
        ControlChar::Status,
        ControlChar::Switch,
    ];
}

// ── Flag registers ──────────────────────────────────────────────────────

bitflags! {
    /// Portable input-processing flags.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct InputFlags: u32 {
        /// Ignore BREAK condition.
        const IGNBRK = 1 << 0;
        /// BREAK generates an interrupt signal.
        const BRKINT = 1 << 1;
        /// Discard bytes with parity errors.
        const IGNPAR = 1 << 2;
        /// Mark parity and framing errors in the input stream.
        const PARMRK = 1 << 3;
        /// Enable input parity checking.
        const INPCK = 1 << 4;
        /// Strip the eighth bit off input bytes.
        const ISTRIP = 1 << 5;
        /// Map NL to CR on input.
        const INLCR = 1 << 6;
        /// Ignore CR on input.
        const IGNCR = 1 << 7;
        /// Map CR to NL on input.
        const ICRNL = 1 << 8;
        /// Enable output flow control (honor received `Stop`/`Start`).
        const IXON = 1 << 9;
        /// Any received byte restarts stopped output.
        const IXANY = 1 << 10;
        /// Enable input flow control (send `Stop`/`Start` to the peer).
        const IXOFF = 1 << 11;
        /// Ring the bell when the input queue is full.
        const IMAXBEL = 1 << 12;
        /// Input is UTF-8; erase multibyte characters correctly.
        const IUTF8 = 1 << 13;
        /// Map uppercase to lowercase on input. Linux family only.
        const IUCLC = 1 << 14;
    }
}

bitflags! {
    /// Portable output-processing flags.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct OutputFlags: u32 {
        /// Enable output post-processing; everything below requires it.
        const OPOST = 1 << 0;
        /// Map NL to CR-NL on output.
        const ONLCR = 1 << 1;
        /// Map CR to NL on output.
        const OCRNL = 1 << 2;
        /// Suppress CR at column 0.
        const ONOCR = 1 << 3;
        /// NL also performs the CR function.
        const ONLRET = 1 << 4;
        /// Send fill characters for delays.
        const OFILL = 1 << 5;
        /// Fill character is DEL rather than NUL.
        const OFDEL = 1 << 6;
        /// Map lowercase to uppercase on output. Linux family only.
        const OLCUC = 1 << 7;
        /// Expand tabs to spaces on output. BSD family only.
        const OXTABS = 1 << 8;
        /// Discard EOT (`^D`) on output. BSD family only.
        const ONOEOT = 1 << 9;
    }
}

bitflags! {
    /// Portable hardware-control flags.
    ///
    /// The character-size field is deliberately absent: it is a closed
    /// multi-valued choice, not a set of independent bits, and is modeled
    /// by [`CharSize`].
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct ControlFlags: u32 {
        /// Send two stop bits rather than one.
        const CSTOPB = 1 << 0;
        /// Enable the receiver.
        const CREAD = 1 << 1;
        /// Enable parity generation and detection.
        const PARENB = 1 << 2;
        /// Odd parity rather than even.
        const PARODD = 1 << 3;
        /// Hang up (drop modem control lines) on last close.
        const HUPCL = 1 << 4;
        /// Ignore modem status lines.
        const CLOCAL = 1 << 5;
        /// RTS/CTS full-duplex hardware flow control.
        const CRTSCTS = 1 << 6;
        /// Mark/space ("stick") parity. Linux family only.
        const CMSPAR = 1 << 7;
        /// Ignore hardware control information. BSD family only.
        const CIGNORE = 1 << 8;
        /// CTS flow control of output. BSD family only.
        const CCTS_OFLOW = 1 << 9;
        /// RTS flow control of input. BSD family only.
        const CRTS_IFLOW = 1 << 10;
        /// DTR flow control of input. BSD family only.
        const CDTR_IFLOW = 1 << 11;
        /// DSR flow control of output. BSD family only.
        const CDSR_OFLOW = 1 << 12;
        /// Carrier (DCD) flow control of output. BSD family only.
        const CCAR_OFLOW = 1 << 13;
        /// Old-style carrier flow control. BSD family only.
        const MDMBUF = 1 << 14;
    }
}

bitflags! {
    /// Portable local / line-discipline flags.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct LocalFlags: u32 {
        /// Enable the signal-generating characters (`Intr`, `Quit`, `Susp`).
        const ISIG = 1 << 0;
        /// Canonical (line-buffered) input.
        const ICANON = 1 << 1;
        /// Echo input characters.
        const ECHO = 1 << 2;
        /// Visually erase characters on `Erase`.
        const ECHOE = 1 << 3;
        /// Echo NL after line kill.
        const ECHOK = 1 << 4;
        /// Echo NL even when `ECHO` is off.
        const ECHONL = 1 << 5;
        /// Echo control characters as `^X`.
        const ECHOCTL = 1 << 6;
        /// Hardcopy-style visual erase.
        const ECHOPRT = 1 << 7;
        /// Visually erase the whole line on line kill.
        const ECHOKE = 1 << 8;
        /// Do not flush queues after an interrupt or quit.
        const NOFLSH = 1 << 9;
        /// Stop background jobs that write to the terminal.
        const TOSTOP = 1 << 10;
        /// Output is being discarded (toggled by `Discard`).
        const FLUSHO = 1 << 11;
        /// Pending input will be retyped at the next read.
        const PENDIN = 1 << 12;
        /// Enable the extended characters (`WordErase`, `LiteralNext`, ...).
        const IEXTEN = 1 << 13;
        /// External (kernel-bypassing) line-discipline processing.
        /// Linux family only.
        const EXTPROC = 1 << 14;
        /// Canonical uppercase/lowercase presentation. Linux family only.
        const XCASE = 1 << 15;
        /// Alternate word-erase algorithm. BSD family only.
        const ALTWERASE = 1 << 16;
        /// Suppress kernel status output for `Status`. BSD family only.
        const NOKERNINFO = 1 << 17;
    }
}

// ── Multi-valued fields ─────────────────────────────────────────────────

/// Character size: the closed CSIZE choice inside the control register.
///
/// Exactly one of these is in effect at any time. Modeling the field as an
/// enum (rather than four independent flags) makes invalid combinations
/// such as CS5|CS7 unrepresentable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CharSize {
    /// Five bits per character.
    Bits5,
    /// Six bits per character.
    Bits6,
    /// Seven bits per character.
    Bits7,
    /// Eight bits per character.
    #[default]
    Bits8,
}

impl CharSize {
    /// All character sizes, narrowest first.
    pub const ALL: [CharSize; 4] = [
        CharSize::Bits5,
        CharSize::Bits6,
        CharSize::Bits7,
        CharSize::Bits8,
    ];
}

// ── Ancillary operation vocabularies ────────────────────────────────────

/// Transmission suspend/resume actions, independent of attribute commits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FlowAction {
    /// Suspend output transmission.
    SuspendOutput,
    /// Resume suspended output.
    ResumeOutput,
    /// Ask the peer to stop transmitting (send `Stop`).
    SuspendInput,
    /// Ask the peer to resume transmitting (send `Start`).
    ResumeInput,
}

impl FlowAction {
    /// All flow actions, in declaration order.
    pub const ALL: [FlowAction; 4] = [
        FlowAction::SuspendOutput,
        FlowAction::ResumeOutput,
        FlowAction::SuspendInput,
        FlowAction::ResumeInput,
    ];
}

/// Which buffered data a flush discards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FlushTarget {
    /// Discard received-but-unread input.
    Input,
    /// Discard written-but-unsent output.
    Output,
    /// Discard both queues.
    Both,
}

impl FlushTarget {
    /// All flush targets, in declaration order.
    pub const ALL: [FlushTarget; 3] =
        [FlushTarget::Input, FlushTarget::Output, FlushTarget::Both];
}

/// When an attribute commit takes effect relative to buffered data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SetTiming {
    /// Apply immediately; pending output may be sent under mixed settings.
    Immediate,
    /// Wait for pending output to drain, then apply. The safe default for
    /// changes that affect output processing.
    Drain,
    /// Drain output, discard unread input, then apply. Required when input
    /// processing modes change, so queued bytes are never interpreted
    /// under the old discipline.
    Flush,
}

impl SetTiming {
    /// All timing modes, in declaration order.
    pub const ALL: [SetTiming; 3] =
        [SetTiming::Immediate, SetTiming::Drain, SetTiming::Flush];
}

/// Standard baud rates: the union of both platform ladders.
#[allow(missing_docs)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BaudRate {
    B0,
    B50,
    B75,
    B110,
    B134,
    B150,
    B200,
    B300,
    B600,
    B1200,
    B1800,
    B2400,
    B4800,
    B7200,
    B9600,
    B14400,
    B19200,
    B28800,
    B38400,
    B57600,
    B76800,
    B115200,
    B230400,
    B460800,
    B500000,
    B576000,
    B921600,
    B1000000,
    B1152000,
    B1500000,
    B2000000,
    B2500000,
    B3000000,
    B3500000,
    B4000000,
}

impl BaudRate {
    /// All standard rates, slowest first.
    pub const ALL: [BaudRate; 35] = [
        BaudRate::B0,
        BaudRate::B50,
        BaudRate::B75,
        BaudRate::B110,
        BaudRate::B134,
        BaudRate::B150,
        BaudRate::B200,
        BaudRate::B300,
        BaudRate::B600,
        BaudRate::B1200,
        BaudRate::B1800,
        BaudRate::B2400,
        BaudRate::B4800,
        BaudRate::B7200,
        BaudRate::B9600,
        BaudRate::B14400,
        BaudRate::B19200,
        BaudRate::B28800,
        BaudRate::B38400,
        BaudRate::B57600,
        BaudRate::B76800,
        BaudRate::B115200,
        BaudRate::B230400,
        BaudRate::B460800,
        BaudRate::B500000,
        BaudRate::B576000,
        BaudRate::B921600,
        BaudRate::B1000000,
        BaudRate::B1152000,
        BaudRate::B1500000,
        BaudRate::B2000000,
        BaudRate::B2500000,
        BaudRate::B3000000,
        BaudRate::B3500000,
        BaudRate::B4000000,
    ];

    /// The rate in bits per second.
    pub const fn bits_per_second(self) -> u32 {
        match self {
            BaudRate::B0 => 0,
            BaudRate::B50 => 50,
            BaudRate::B75 => 75,
            BaudRate::B110 => 110,
            BaudRate::B134 => 134,
            BaudRate::B150 => 150,
            BaudRate::B200 => 200,
            BaudRate::B300 => 300,
            BaudRate::B600 => 600,
            BaudRate::B1200 => 1200,
            BaudRate::B1800 => 1800,
            BaudRate::B2400 => 2400,
            BaudRate::B4800 => 4800,
            BaudRate::B7200 => 7200,
            BaudRate::B9600 => 9600,
            BaudRate::B14400 => 14_400,
            BaudRate::B19200 => 19_200,
            BaudRate::B28800 => 28_800,
            BaudRate::B38400 => 38_400,
            BaudRate::B57600 => 57_600,
            BaudRate::B76800 => 76_800,
            BaudRate::B115200 => 115_200,
            BaudRate::B230400 => 230_400,
            BaudRate::B460800 => 460_800,
            BaudRate::B500000 => 500_000,
            BaudRate::B576000 => 576_000,
            BaudRate::B921600 => 921_600,
            BaudRate::B1000000 => 1_000_000,
            BaudRate::B1152000 => 1_152_000,
            BaudRate::B1500000 => 1_500_000,
            BaudRate::B2000000 => 2_000_000,
            BaudRate::B2500000 => 2_500_000,
            BaudRate::B3000000 => 3_000_000,
            BaudRate::B3500000 => 3_500_000,
            BaudRate::B4000000 => 4_000_000,
        }
    }
}

/// A transmission speed: a standard ladder entry, or an arbitrary rate on
/// profiles whose speed words carry literal values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Speed {
    /// A standard rate from the platform ladder.
    Rate(BaudRate),
    /// A non-standard rate in bits per second. Must be positive.
    Other(u32),
}

// ── Umbrella identifier ─────────────────────────────────────────────────

/// A single portable capability from any category.
///
/// Flag-register members wrap a one-bit `bitflags` value; the registry only
/// ever produces single-bit members here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    /// A control-character slot.
    Char(ControlChar),
    /// One input flag.
    Input(InputFlags),
    /// One output flag.
    Output(OutputFlags),
    /// One independent control flag.
    Control(ControlFlags),
    /// One character-size choice.
    Size(CharSize),
    /// One local flag.
    Local(LocalFlags),
    /// One flow action.
    Flow(FlowAction),
    /// One flush target.
    Flush(FlushTarget),
    /// One commit-timing mode.
    Timing(SetTiming),
    /// One standard baud rate.
    Baud(BaudRate),
}

impl Capability {
    /// The category this capability belongs to.
    pub const fn category(self) -> Category {
        match self {
            Capability::Char(_) => Category::ControlChar,
            Capability::Input(_) => Category::InputFlag,
            Capability::Output(_) => Category::OutputFlag,
            Capability::Control(_) | Capability::Size(_) => Category::ControlFlag,
            Capability::Local(_) => Category::LocalFlag,
            Capability::Flow(_) => Category::FlowAction,
            Capability::Flush(_) => Category::FlushTarget,
            Capability::Timing(_) => Category::SetTiming,
            Capability::Baud(_) => Category::BaudRate,
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Capability::Char(c) => write!(f, "{c:?}"),
            Capability::Input(flags) => write_flag_names(f, flags.iter_names()),
            Capability::Output(flags) => write_flag_names(f, flags.iter_names()),
            Capability::Control(flags) => write_flag_names(f, flags.iter_names()),
            Capability::Size(s) => write!(f, "{s:?}"),
            Capability::Local(flags) => write_flag_names(f, flags.iter_names()),
            Capability::Flow(a) => write!(f, "{a:?}"),
            Capability::Flush(t) => write!(f, "{t:?}"),
            Capability::Timing(t) => write!(f, "{t:?}"),
            Capability::Baud(b) => write!(f, "{b:?}"),
        }
    }
}

fn write_flag_names<'a, F: bitflags::Flags>(
    f: &mut fmt::Formatter<'_>,
    names: bitflags::iter::IterNames<F>,
) -> fmt::Result {
    let mut first = true;
    for (name, _) in names {
        if !first {
            f.write_str(" | ")?;
        }
        first = false;
        f.write_str(name)?;
    }
    Ok(())
}

/// Every capability in `category`, in the registry's stable order.
pub fn all(category: Category) -> Vec<Capability> {
    match category {
        Category::ControlChar => ControlChar::ALL.iter().copied().map(Capability::Char).collect(),
        Category::InputFlag => InputFlags::all()
            .iter()
            .map(Capability::Input)
            .collect(),
        Category::OutputFlag => OutputFlags::all()
            .iter()
            .map(Capability::Output)
            .collect(),
        Category::ControlFlag => ControlFlags::all()
            .iter()
            .map(Capability::Control)
            .chain(CharSize::ALL.iter().copied().map(Capability::Size))
            .collect(),
        Category::LocalFlag => LocalFlags::all()
            .iter()
            .map(Capability::Local)
            .collect(),
        Category::FlowAction => FlowAction::ALL.iter().copied().map(Capability::Flow).collect(),
        Category::FlushTarget => {
            FlushTarget::ALL.iter().copied().map(Capability::Flush).collect()
        }
        Category::SetTiming => {
            SetTiming::ALL.iter().copied().map(Capability::Timing).collect()
        }
        Category::BaudRate => BaudRate::ALL.iter().copied().map(Capability::Baud).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_capability_reports_its_own_category() {
        for category in [
            Category::ControlChar,
            Category::InputFlag,
            Category::OutputFlag,
            Category::ControlFlag,
            Category::LocalFlag,
            Category::FlowAction,
            Category::FlushTarget,
            Category::SetTiming,
            Category::BaudRate,
        ] {
            for capability in all(category) {
                assert_eq!(capability.category(), category, "{capability}");
            }
        }
    }

    #[test]
    fn flag_registry_entries_are_single_bits() {
        for capability in all(Category::InputFlag) {
            let Capability::Input(flags) = capability else {
                panic!("wrong wrapper in input registry");
            };
            assert_eq!(flags.bits().count_ones(), 1);
        }
        for capability in all(Category::LocalFlag) {
            let Capability::Local(flags) = capability else { continue };
            assert_eq!(flags.bits().count_ones(), 1);
        }
    }

    #[test]
    fn registry_order_is_stable() {
        let first = all(Category::ControlChar);
        let second = all(Category::ControlChar);
        assert_eq!(first, second);
        assert_eq!(first[0], Capability::Char(ControlChar::Intr));
    }

    #[test]
    fn display_names_are_bare() {
        assert_eq!(Capability::Local(LocalFlags::ECHO).to_string(), "ECHO");
        assert_eq!(Capability::Char(ControlChar::Eof).to_string(), "Eof");
        assert_eq!(Capability::Baud(BaudRate::B9600).to_string(), "B9600");
    }

    #[test]
    fn baud_ladder_is_monotonic() {
        let mut last = None;
        for rate in BaudRate::ALL {
            let bps = rate.bits_per_second();
            if let Some(prev) = last {
                assert!(bps > prev, "{rate:?} out of order");
            }
            last = Some(bps);
        }
    }
}
