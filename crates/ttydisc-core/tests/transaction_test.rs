//! End-to-end scenarios through the public surface: query a device, edit
//! the portable state, commit, and confirm what the device actually holds.

use ttydisc_core::capability::{
    BaudRate, Capability, CharSize, ControlChar, ControlFlags, FlowAction, FlushTarget, InputFlags,
    LocalFlags, OutputFlags, SetTiming, Speed,
};
use ttydisc_core::device::SimulatedDevice;
use ttydisc_core::error::{DeviceError, DeviceOp, TermError};
use ttydisc_core::profile::{LINUX, MACOS, PlatformProfile};
use ttydisc_core::state::TermState;
use ttydisc_core::transaction::Transaction;

/// A device already configured the way a login shell leaves a terminal:
/// canonical input, echo, signals, CR mapping and software flow control.
fn cooked_device(profile: &'static PlatformProfile) -> SimulatedDevice {
    let mut state = TermState::new(profile);
    state
        .set_local(
            LocalFlags::ICANON | LocalFlags::ECHO | LocalFlags::ECHOE | LocalFlags::ISIG,
            true,
        )
        .unwrap();
    state
        .set_input(InputFlags::ICRNL | InputFlags::IXON | InputFlags::BRKINT, true)
        .unwrap();
    state.set_output(OutputFlags::OPOST | OutputFlags::ONLCR, true).unwrap();
    state.set_control(ControlFlags::CREAD, true).unwrap();
    SimulatedDevice::new(state.to_raw().unwrap())
}

#[test]
fn raw_mode_round_trip_with_restore() {
    for profile in [&LINUX, &MACOS] {
        let mut device = cooked_device(profile);

        let mut tx = Transaction::query(&mut device, profile).unwrap();
        let saved = tx.state().clone();

        tx.state_mut().make_raw().unwrap();
        tx.commit(SetTiming::Flush).unwrap();

        let raw = TermState::from_raw(profile, device.current()).unwrap();
        assert!(!raw.local().contains(LocalFlags::ICANON), "{}", profile.name());
        assert!(!raw.local().contains(LocalFlags::ECHO));
        assert!(!raw.local().contains(LocalFlags::ISIG));
        assert!(!raw.input().contains(InputFlags::ICRNL));
        assert!(!raw.input().contains(InputFlags::IXON));
        assert!(!raw.output().contains(OutputFlags::OPOST));
        assert_eq!(raw.char_size(), CharSize::Bits8);
        assert_eq!(raw.control_char(ControlChar::Min).unwrap(), 1);
        assert_eq!(raw.control_char(ControlChar::Time).unwrap(), 0);

        let mut tx = Transaction::with_state(&mut device, saved.clone());
        tx.commit(SetTiming::Drain).unwrap();
        let restored = TermState::from_raw(profile, device.current()).unwrap();
        assert_eq!(restored.local(), saved.local());
        assert_eq!(restored.input(), saved.input());
        assert_eq!(restored.output(), saved.output());
    }
}

#[test]
fn unknown_bits_survive_a_read_modify_write_cycle() {
    // A foreign lflag bit no capability claims, as a future kernel or an
    // out-of-tree driver might set.
    let foreign = 0x0010_0000u64;
    let mut initial = cooked_device(&LINUX).current().to_owned();
    initial.lflag |= foreign;
    let mut device = SimulatedDevice::new(initial);

    let mut tx = Transaction::query(&mut device, &LINUX).unwrap();
    tx.state_mut().set_local(LocalFlags::ECHO, false).unwrap();
    tx.commit(SetTiming::Drain).unwrap();

    assert_eq!(device.current().lflag & foreign, foreign);
    let after = TermState::from_raw(&LINUX, device.current()).unwrap();
    assert!(!after.local().contains(LocalFlags::ECHO));
}

#[test]
fn platform_only_capabilities_fail_loudly_on_the_other_family() {
    let mut state = TermState::new(&MACOS);
    let err = state.set_local(LocalFlags::EXTPROC, true).unwrap_err();
    assert_eq!(
        err,
        TermError::UnsupportedCapability {
            capability: Capability::Local(LocalFlags::EXTPROC),
            profile: "macos",
        }
    );

    let mut state = TermState::new(&LINUX);
    assert!(state.set_control_char(ControlChar::Status, 0x14).is_err());
    assert!(state.set_output(OutputFlags::OXTABS, true).is_err());
}

#[test]
fn rejected_capability_leaves_the_whole_set_unchanged() {
    let mut state = TermState::new(&MACOS);
    let before = state.local();
    // One supported flag and one unsupported flag in the same request: the
    // supported half must not be half-applied.
    let err = state.set_local(LocalFlags::ECHO | LocalFlags::XCASE, true).unwrap_err();
    assert!(matches!(err, TermError::UnsupportedCapability { .. }));
    assert_eq!(state.local(), before);
}

#[test]
fn failed_commit_then_requery_resynchronizes() {
    let mut device = cooked_device(&LINUX);
    device.fail_next_write(DeviceError::Interrupted);

    let mut tx = Transaction::query(&mut device, &LINUX).unwrap();
    tx.state_mut().set_local(LocalFlags::ECHO, false).unwrap();
    let err = tx.commit(SetTiming::Drain).unwrap_err();
    assert!(matches!(err, TermError::Device { op: DeviceOp::Commit(SetTiming::Drain), .. }));

    // The device kept its old state; a fresh query sees ECHO still on.
    let tx = Transaction::query(&mut device, &LINUX).unwrap();
    assert!(tx.state().local().contains(LocalFlags::ECHO));
}

#[test]
fn verification_reports_speed_a_driver_refused() {
    let mut device = cooked_device(&MACOS);
    device.ignore_speeds();

    let mut tx = Transaction::query(&mut device, &MACOS).unwrap();
    tx.state_mut().set_speed(Speed::Other(31_250)).unwrap();

    let err = tx.commit_verified(SetTiming::Drain).unwrap_err();
    let TermError::VerificationMismatch { diffs } = err else {
        panic!("expected a verification mismatch, got {err:?}");
    };
    assert!(diffs.iter().any(|d| d.contains("speed")), "{diffs:?}");
}

#[test]
fn serial_line_setup_from_scratch() {
    // 8N1 at 115200 with hardware flow control, built without querying.
    let mut device = SimulatedDevice::new(TermState::new(&LINUX).to_raw().unwrap());

    let mut state = TermState::new(&LINUX);
    state.set_char_size(CharSize::Bits8).unwrap();
    state.set_control(ControlFlags::CREAD | ControlFlags::CLOCAL, true).unwrap();
    state.set_control(ControlFlags::PARENB | ControlFlags::CSTOPB, false).unwrap();
    state.set_control(ControlFlags::CRTSCTS, true).unwrap();
    state.set_speed(Speed::Rate(BaudRate::B115200)).unwrap();

    let mut tx = Transaction::with_state(&mut device, state);
    tx.commit_verified(SetTiming::Flush).unwrap();

    let applied = TermState::from_raw(&LINUX, device.current()).unwrap();
    assert_eq!(applied.input_speed(), Speed::Rate(BaudRate::B115200));
    assert_eq!(applied.output_speed(), Speed::Rate(BaudRate::B115200));
    assert!(applied.control().contains(ControlFlags::CRTSCTS));
    assert!(!applied.control().contains(ControlFlags::PARENB));
}

#[test]
fn arbitrary_rate_is_a_literal_profile_privilege() {
    let mut state = TermState::new(&MACOS);
    state.set_speed(Speed::Other(31_250)).unwrap();
    assert_eq!(state.input_speed(), Speed::Other(31_250));

    let mut state = TermState::new(&LINUX);
    assert!(matches!(
        state.set_speed(Speed::Other(31_250)),
        Err(TermError::InvalidFieldValue { field: "speed", .. })
    ));
}

#[test]
fn flow_and_flush_reach_the_device_in_order() {
    let mut device = cooked_device(&LINUX);
    let mut tx = Transaction::query(&mut device, &LINUX).unwrap();

    tx.flow_control(FlowAction::SuspendOutput).unwrap();
    tx.flush(FlushTarget::Input).unwrap();
    tx.flow_control(FlowAction::ResumeOutput).unwrap();

    assert_eq!(device.flows(), &[FlowAction::SuspendOutput, FlowAction::ResumeOutput]);
    assert_eq!(device.flushes(), &[FlushTarget::Input]);
}

#[test]
fn disabling_a_control_char_uses_the_native_sentinel() {
    let mut linux = TermState::new(&LINUX);
    linux.disable_control_char(ControlChar::Susp).unwrap();
    assert!(linux.control_char_disabled(ControlChar::Susp).unwrap());
    assert_eq!(linux.control_char(ControlChar::Susp).unwrap(), 0x00);

    let mut macos = TermState::new(&MACOS);
    macos.disable_control_char(ControlChar::Susp).unwrap();
    assert_eq!(macos.control_char(ControlChar::Susp).unwrap(), 0xff);
}

#[test]
fn query_maps_device_refusals() {
    let mut device = cooked_device(&LINUX);
    device.fail_next_read(DeviceError::NotATerminal);

    let err = Transaction::query(&mut device, &LINUX).unwrap_err();
    assert!(matches!(
        err,
        TermError::Device { op: DeviceOp::Query, source: DeviceError::NotATerminal }
    ));
}
