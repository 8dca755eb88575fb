#![forbid(unsafe_code)]

//! Platform profiles: the bridge between portable capability names and the
//! native constants of one kernel family.
//!
//! A profile is purely declarative. It is a read-only table built from the
//! platform's termios headers, consulted by the codec and never mutated.
//! Both profiles ship on every host so cross-platform behavior can be
//! exercised without the matching kernel; [`PlatformProfile::active`] picks
//! the one matching the compile target.
//!
//! A capability a kernel family never implemented maps to
//! [`Support::Unsupported`], never to zero: zero is a legitimate native
//! value (the Linux `B0` baud code, the Darwin CS5 field value), so an
//! "absent" sentinel folded into the value domain would be ambiguous.
//!
//! # Profile differences
//!
//! | Aspect | Linux family | BSD/macOS family |
//! |--------|--------------|------------------|
//! | Control chars | `Switch` extra | `DelayedSuspend`, `Status` extra |
//! | Input flags | `IUCLC` extra | — |
//! | Output flags | `OLCUC` extra | `OXTABS`, `ONOEOT` extra |
//! | Control flags | `CMSPAR` extra | carrier/DTR/DSR flow, `CIGNORE`, `MDMBUF` |
//! | Local flags | `EXTPROC`, `XCASE` extra | `ALTWERASE`, `NOKERNINFO` extra |
//! | Baud ladder | up to 4 Mbit enumerated | tops out at 230.4k, literal words |
//! | Arbitrary rates | no | yes (speed word is the rate itself) |
//! | Disabled control char | `0x00` | `0xff` |

use crate::capability::{
    BaudRate, Capability, Category, CharSize, ControlChar, ControlFlags, FlowAction, FlushTarget,
    InputFlags, LocalFlags, OutputFlags, SetTiming,
};

/// The native mapping of one portable capability on one profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Support {
    /// The capability exists; the native bit value, field value, or array
    /// index the kernel uses for it.
    Supported(u64),
    /// The kernel family has no notion of this capability.
    Unsupported,
}

impl Support {
    /// Whether the capability is available on the profile.
    pub const fn is_supported(self) -> bool {
        matches!(self, Support::Supported(_))
    }

    /// The native value, if supported.
    pub const fn value(self) -> Option<u64> {
        match self {
            Support::Supported(v) => Some(v),
            Support::Unsupported => None,
        }
    }
}

/// One kernel family's complete capability mapping.
///
/// Immutable after construction; the statics [`LINUX`] and [`MACOS`] are the
/// only instances and are safe to share across threads without locking.
#[derive(Debug, PartialEq, Eq)]
pub struct PlatformProfile {
    pub(crate) name: &'static str,
    /// Length of the native control-character array.
    pub(crate) cc_count: usize,
    /// Byte that disables a control character on this platform.
    pub(crate) cc_disable: u8,
    /// Whether speed words carry literal bit rates, permitting arbitrary
    /// non-ladder speeds.
    pub(crate) literal_rates: bool,
    pub(crate) cc: &'static [(ControlChar, u64)],
    pub(crate) input: &'static [(InputFlags, u64)],
    pub(crate) output: &'static [(OutputFlags, u64)],
    pub(crate) control: &'static [(ControlFlags, u64)],
    pub(crate) csize_mask: u64,
    pub(crate) char_size: &'static [(CharSize, u64)],
    pub(crate) local: &'static [(LocalFlags, u64)],
    pub(crate) flow: &'static [(FlowAction, u64)],
    pub(crate) flush: &'static [(FlushTarget, u64)],
    pub(crate) timing: &'static [(SetTiming, u64)],
    pub(crate) baud: &'static [(BaudRate, u64)],
}

impl PlatformProfile {
    /// The profile matching the compile target.
    pub fn active() -> &'static PlatformProfile {
        #[cfg(any(
            target_os = "macos",
            target_os = "ios",
            target_os = "freebsd",
            target_os = "dragonfly",
            target_os = "openbsd",
            target_os = "netbsd"
        ))]
        {
            &MACOS
        }
        #[cfg(not(any(
            target_os = "macos",
            target_os = "ios",
            target_os = "freebsd",
            target_os = "dragonfly",
            target_os = "openbsd",
            target_os = "netbsd"
        )))]
        {
            &LINUX
        }
    }

    /// Profile name, for diagnostics.
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// Native control-character array length.
    pub const fn control_char_count(&self) -> usize {
        self.cc_count
    }

    /// The byte that disables a control-character slot here.
    pub const fn disabled_char(&self) -> u8 {
        self.cc_disable
    }

    /// Whether non-ladder speeds are representable on this profile.
    pub const fn allows_arbitrary_rates(&self) -> bool {
        self.literal_rates
    }

    /// Native mapping of one capability.
    pub fn map(&self, capability: Capability) -> Support {
        match capability {
            Capability::Char(c) => lookup(self.cc, c),
            Capability::Input(f) => lookup(self.input, f),
            Capability::Output(f) => lookup(self.output, f),
            Capability::Control(f) => lookup(self.control, f),
            Capability::Size(s) => lookup(self.char_size, s),
            Capability::Local(f) => lookup(self.local, f),
            Capability::Flow(a) => lookup(self.flow, a),
            Capability::Flush(t) => lookup(self.flush, t),
            Capability::Timing(t) => lookup(self.timing, t),
            Capability::Baud(b) => lookup(self.baud, b),
        }
    }

    /// Whether the capability exists on this profile.
    pub fn supports(&self, capability: Capability) -> bool {
        self.map(capability).is_supported()
    }

    /// Inverse lookup: every capability in `category` whose native value
    /// matches `native`.
    ///
    /// For flag categories a capability matches when all of its native bits
    /// are present in `native`; for index/value categories the match is
    /// exact. Bits of `native` claimed by no capability are the caller's
    /// unknown remainder.
    pub fn unmap(&self, category: Category, native: u64) -> Vec<Capability> {
        crate::capability::all(category)
            .into_iter()
            .filter(|&capability| match self.map(capability) {
                Support::Unsupported => false,
                Support::Supported(value) => match category {
                    Category::InputFlag
                    | Category::OutputFlag
                    | Category::LocalFlag => value != 0 && native & value == value,
                    Category::ControlFlag => match capability {
                        // The size field is compared whole, never bitwise.
                        Capability::Size(_) => native & self.csize_mask == value,
                        _ => value != 0 && native & value == value,
                    },
                    _ => native == value,
                },
            })
            .collect()
    }
}

fn lookup<K: PartialEq + Copy>(table: &[(K, u64)], key: K) -> Support {
    table
        .iter()
        .find(|(k, _)| *k == key)
        .map_or(Support::Unsupported, |&(_, v)| Support::Supported(v))
}

// ── Linux family ────────────────────────────────────────────────────────
//
// Values follow the asm-generic termios layout used by glibc.

/// The Linux-family profile.
pub static LINUX: PlatformProfile = PlatformProfile {
    name: "linux",
    cc_count: 32,
    cc_disable: 0x00,
    literal_rates: false,
    cc: &[
        (ControlChar::Intr, 0),
        (ControlChar::Quit, 1),
        (ControlChar::Erase, 2),
        (ControlChar::Kill, 3),
        (ControlChar::Eof, 4),
        (ControlChar::Time, 5),
        (ControlChar::Min, 6),
        (ControlChar::Switch, 7),
        (ControlChar::Start, 8),
        (ControlChar::Stop, 9),
        (ControlChar::Susp, 10),
        (ControlChar::Eol, 11),
        (ControlChar::Reprint, 12),
        (ControlChar::Discard, 13),
        (ControlChar::WordErase, 14),
        (ControlChar::LiteralNext, 15),
        (ControlChar::Eol2, 16),
    ],
    input: &[
        (InputFlags::IGNBRK, 0x0001),
        (InputFlags::BRKINT, 0x0002),
        (InputFlags::IGNPAR, 0x0004),
        (InputFlags::PARMRK, 0x0008),
        (InputFlags::INPCK, 0x0010),
        (InputFlags::ISTRIP, 0x0020),
        (InputFlags::INLCR, 0x0040),
        (InputFlags::IGNCR, 0x0080),
        (InputFlags::ICRNL, 0x0100),
        (InputFlags::IUCLC, 0x0200),
        (InputFlags::IXON, 0x0400),
        (InputFlags::IXANY, 0x0800),
        (InputFlags::IXOFF, 0x1000),
        (InputFlags::IMAXBEL, 0x2000),
        (InputFlags::IUTF8, 0x4000),
    ],
    output: &[
        (OutputFlags::OPOST, 0x01),
        (OutputFlags::OLCUC, 0x02),
        (OutputFlags::ONLCR, 0x04),
        (OutputFlags::OCRNL, 0x08),
        (OutputFlags::ONOCR, 0x10),
        (OutputFlags::ONLRET, 0x20),
        (OutputFlags::OFILL, 0x40),
        (OutputFlags::OFDEL, 0x80),
    ],
    control: &[
        (ControlFlags::CSTOPB, 0x0040),
        (ControlFlags::CREAD, 0x0080),
        (ControlFlags::PARENB, 0x0100),
        (ControlFlags::PARODD, 0x0200),
        (ControlFlags::HUPCL, 0x0400),
        (ControlFlags::CLOCAL, 0x0800),
        (ControlFlags::CMSPAR, 0x4000_0000),
        (ControlFlags::CRTSCTS, 0x8000_0000),
    ],
    csize_mask: 0x0030,
    char_size: &[
        (CharSize::Bits5, 0x0000),
        (CharSize::Bits6, 0x0010),
        (CharSize::Bits7, 0x0020),
        (CharSize::Bits8, 0x0030),
    ],
    local: &[
        (LocalFlags::ISIG, 0x0000_0001),
        (LocalFlags::ICANON, 0x0000_0002),
        (LocalFlags::XCASE, 0x0000_0004),
        (LocalFlags::ECHO, 0x0000_0008),
        (LocalFlags::ECHOE, 0x0000_0010),
        (LocalFlags::ECHOK, 0x0000_0020),
        (LocalFlags::ECHONL, 0x0000_0040),
        (LocalFlags::NOFLSH, 0x0000_0080),
        (LocalFlags::TOSTOP, 0x0000_0100),
        (LocalFlags::ECHOCTL, 0x0000_0200),
        (LocalFlags::ECHOPRT, 0x0000_0400),
        (LocalFlags::ECHOKE, 0x0000_0800),
        (LocalFlags::FLUSHO, 0x0000_1000),
        (LocalFlags::PENDIN, 0x0000_4000),
        (LocalFlags::IEXTEN, 0x0000_8000),
        (LocalFlags::EXTPROC, 0x0001_0000),
    ],
    flow: &[
        (FlowAction::SuspendOutput, 0),
        (FlowAction::ResumeOutput, 1),
        (FlowAction::SuspendInput, 2),
        (FlowAction::ResumeInput, 3),
    ],
    flush: &[
        (FlushTarget::Input, 0),
        (FlushTarget::Output, 1),
        (FlushTarget::Both, 2),
    ],
    timing: &[
        (SetTiming::Immediate, 0),
        (SetTiming::Drain, 1),
        (SetTiming::Flush, 2),
    ],
    baud: &[
        (BaudRate::B0, 0x0000),
        (BaudRate::B50, 0x0001),
        (BaudRate::B75, 0x0002),
        (BaudRate::B110, 0x0003),
        (BaudRate::B134, 0x0004),
        (BaudRate::B150, 0x0005),
        (BaudRate::B200, 0x0006),
        (BaudRate::B300, 0x0007),
        (BaudRate::B600, 0x0008),
        (BaudRate::B1200, 0x0009),
        (BaudRate::B1800, 0x000a),
        (BaudRate::B2400, 0x000b),
        (BaudRate::B4800, 0x000c),
        (BaudRate::B9600, 0x000d),
        (BaudRate::B19200, 0x000e),
        (BaudRate::B38400, 0x000f),
        (BaudRate::B57600, 0x1001),
        (BaudRate::B115200, 0x1002),
        (BaudRate::B230400, 0x1003),
        (BaudRate::B460800, 0x1004),
        (BaudRate::B500000, 0x1005),
        (BaudRate::B576000, 0x1006),
        (BaudRate::B921600, 0x1007),
        (BaudRate::B1000000, 0x1008),
        (BaudRate::B1152000, 0x1009),
        (BaudRate::B1500000, 0x100a),
        (BaudRate::B2000000, 0x100b),
        (BaudRate::B2500000, 0x100c),
        (BaudRate::B3000000, 0x100d),
        (BaudRate::B3500000, 0x100e),
        (BaudRate::B4000000, 0x100f),
    ],
};

// ── BSD/macOS family ────────────────────────────────────────────────────
//
// Values follow the Darwin sys/termios.h layout, which FreeBSD shares for
// everything this table covers.

/// The BSD/macOS-family profile.
pub static MACOS: PlatformProfile = PlatformProfile {
    name: "macos",
    cc_count: 20,
    cc_disable: 0xff,
    literal_rates: true,
    cc: &[
        (ControlChar::Eof, 0),
        (ControlChar::Eol, 1),
        (ControlChar::Eol2, 2),
        (ControlChar::Erase, 3),
        (ControlChar::WordErase, 4),
        (ControlChar::Kill, 5),
        (ControlChar::Reprint, 6),
        (ControlChar::Intr, 8),
        (ControlChar::Quit, 9),
        (ControlChar::Susp, 10),
        (ControlChar::DelayedSuspend, 11),
        (ControlChar::Start, 12),
        (ControlChar::Stop, 13),
        (ControlChar::LiteralNext, 14),
        (ControlChar::Discard, 15),
        (ControlChar::Min, 16),
        (ControlChar::Time, 17),
        (ControlChar::Status, 18),
    ],
    input: &[
        (InputFlags::IGNBRK, 0x0001),
        (InputFlags::BRKINT, 0x0002),
        (InputFlags::IGNPAR, 0x0004),
        (InputFlags::PARMRK, 0x0008),
        (InputFlags::INPCK, 0x0010),
        (InputFlags::ISTRIP, 0x0020),
        (InputFlags::INLCR, 0x0040),
        (InputFlags::IGNCR, 0x0080),
        (InputFlags::ICRNL, 0x0100),
        (InputFlags::IXON, 0x0200),
        (InputFlags::IXOFF, 0x0400),
        (InputFlags::IXANY, 0x0800),
        (InputFlags::IMAXBEL, 0x2000),
        (InputFlags::IUTF8, 0x4000),
    ],
    output: &[
        (OutputFlags::OPOST, 0x0001),
        (OutputFlags::ONLCR, 0x0002),
        (OutputFlags::OXTABS, 0x0004),
        (OutputFlags::ONOEOT, 0x0008),
        (OutputFlags::OCRNL, 0x0010),
        (OutputFlags::ONOCR, 0x0020),
        (OutputFlags::ONLRET, 0x0040),
        (OutputFlags::OFILL, 0x0080),
        (OutputFlags::OFDEL, 0x0002_0000),
    ],
    control: &[
        (ControlFlags::CIGNORE, 0x0000_0001),
        (ControlFlags::CSTOPB, 0x0000_0400),
        (ControlFlags::CREAD, 0x0000_0800),
        (ControlFlags::PARENB, 0x0000_1000),
        (ControlFlags::PARODD, 0x0000_2000),
        (ControlFlags::HUPCL, 0x0000_4000),
        (ControlFlags::CLOCAL, 0x0000_8000),
        (ControlFlags::CCTS_OFLOW, 0x0001_0000),
        (ControlFlags::CRTS_IFLOW, 0x0002_0000),
        // CRTSCTS is the union of CTS output and RTS input flow control.
        (ControlFlags::CRTSCTS, 0x0003_0000),
        (ControlFlags::CDTR_IFLOW, 0x0004_0000),
        (ControlFlags::CDSR_OFLOW, 0x0008_0000),
        (ControlFlags::CCAR_OFLOW, 0x0010_0000),
        (ControlFlags::MDMBUF, 0x0010_0000),
    ],
    csize_mask: 0x0300,
    char_size: &[
        (CharSize::Bits5, 0x0000),
        (CharSize::Bits6, 0x0100),
        (CharSize::Bits7, 0x0200),
        (CharSize::Bits8, 0x0300),
    ],
    local: &[
        (LocalFlags::ECHOKE, 0x0000_0001),
        (LocalFlags::ECHOE, 0x0000_0002),
        (LocalFlags::ECHOK, 0x0000_0004),
        (LocalFlags::ECHO, 0x0000_0008),
        (LocalFlags::ECHONL, 0x0000_0010),
        (LocalFlags::ECHOPRT, 0x0000_0020),
        (LocalFlags::ECHOCTL, 0x0000_0040),
        (LocalFlags::ISIG, 0x0000_0080),
        (LocalFlags::ICANON, 0x0000_0100),
        (LocalFlags::ALTWERASE, 0x0000_0200),
        (LocalFlags::IEXTEN, 0x0000_0400),
        (LocalFlags::TOSTOP, 0x0040_0000),
        (LocalFlags::FLUSHO, 0x0080_0000),
        (LocalFlags::NOKERNINFO, 0x0200_0000),
        (LocalFlags::PENDIN, 0x2000_0000),
        (LocalFlags::NOFLSH, 0x8000_0000),
    ],
    flow: &[
        (FlowAction::SuspendOutput, 1),
        (FlowAction::ResumeOutput, 2),
        (FlowAction::SuspendInput, 3),
        (FlowAction::ResumeInput, 4),
    ],
    flush: &[
        (FlushTarget::Input, 1),
        (FlushTarget::Output, 2),
        (FlushTarget::Both, 3),
    ],
    timing: &[
        (SetTiming::Immediate, 0),
        (SetTiming::Drain, 1),
        (SetTiming::Flush, 2),
    ],
    // Speed words carry the literal rate on this family.
    baud: &[
        (BaudRate::B0, 0),
        (BaudRate::B50, 50),
        (BaudRate::B75, 75),
        (BaudRate::B110, 110),
        (BaudRate::B134, 134),
        (BaudRate::B150, 150),
        (BaudRate::B200, 200),
        (BaudRate::B300, 300),
        (BaudRate::B600, 600),
        (BaudRate::B1200, 1200),
        (BaudRate::B1800, 1800),
        (BaudRate::B2400, 2400),
        (BaudRate::B4800, 4800),
        (BaudRate::B7200, 7200),
        (BaudRate::B9600, 9600),
        (BaudRate::B14400, 14_400),
        (BaudRate::B19200, 19_200),
        (BaudRate::B28800, 28_800),
        (BaudRate::B38400, 38_400),
        (BaudRate::B57600, 57_600),
        (BaudRate::B76800, 76_800),
        (BaudRate::B115200, 115_200),
        (BaudRate::B230400, 230_400),
    ],
};
