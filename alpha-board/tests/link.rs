mod common;

use alpha_board::{
    boards::{generic, stratify_alpha},
    link::{
        ConnectSpec, DelegatedConnect, Error, Framing, LinkFlags, LinkTransportDriver, OsError, Phy, PinConnect,
        PioAttr, PioIoctlConnect, PioMode, UnswitchedConnect, UsbAttr, UsbFlags,
    },
    pin::{McuPin, Polarity},
    Board,
};
use common::{init_log, Log, MockPin, MockPio, MockUsb, Op};

const LINK: &str = "/dev/link-phy-usb";
const CONNECT: ConnectSpec = ConnectSpec::new(McuPin::new(1, 19), Polarity::ActiveHigh);
const MASK: u32 = 1 << 19;

fn attr() -> UsbAttr {
    stratify_alpha::BoardImpl::usb_attr()
}

/// Whether the connect line ends up asserted according to the recorded pin operations.
fn pin_asserted(ops: &[Op], polarity: Polarity) -> bool {
    let asserted = if polarity.is_active_high() { Op::PinHigh } else { Op::PinLow };
    ops.iter().rev().find(|op| matches!(op, Op::PinHigh | Op::PinLow)) == Some(&asserted)
}

#[test]
fn pio_ioctl_sequence() {
    init_log();
    let log = Log::default();
    let mut link = stratify_alpha::link_transport(MockUsb::new(&log), MockPio::new(&log));

    assert_eq!(link.open(LINK), Ok(Phy(3)));
    assert!(link.is_open());
    assert_eq!(
        log.ops(),
        [
            Op::PioOpen("/dev/pio1".to_string()),
            Op::PioClear(MASK),
            Op::PioAttr(PioAttr { mask: MASK, mode: PioMode::OUTPUT | PioMode::DIRONLY }),
            Op::UsbOpen { name: LINK.to_string(), attr: attr(), connect: None },
            Op::PioSet(MASK),
            Op::PioClose,
        ]
    );
}

#[test]
fn pio_open_failure_leaves_usb_alone() {
    init_log();
    let log = Log::default();
    let mut pio = MockPio::new(&log);
    pio.open_error = Some(OsError::NOT_FOUND);
    let mut link = stratify_alpha::link_transport(MockUsb::new(&log), pio);

    assert_eq!(link.open(LINK), Err(Error::Pio(OsError::NOT_FOUND)));
    assert_eq!(link.handle(), Phy::CLOSED);
    assert_eq!(log.ops(), [Op::PioOpen("/dev/pio1".to_string())]);
}

#[test]
fn pio_usb_failure_keeps_line_deasserted() {
    init_log();
    let log = Log::default();
    let mut link = stratify_alpha::link_transport(MockUsb::failing(&log, OsError(-5)), MockPio::new(&log));

    assert_eq!(link.open(LINK), Err(Error::Usb(OsError(-5))));
    assert!(!link.is_open());
    let ops = log.ops();
    assert!(!ops.contains(&Op::PioSet(MASK)));
    assert_eq!(ops.last(), Some(&Op::PioClose));
}

#[test]
fn pio_reassert_failure_closes_usb() {
    init_log();
    let log = Log::default();
    let mut pio = MockPio::new(&log);
    pio.fail_set = true;
    let mut link = stratify_alpha::link_transport(MockUsb::new(&log), pio);

    assert_eq!(link.open(LINK), Err(Error::Connect));
    assert!(!link.is_open());
    let ops = log.ops();
    assert_eq!(&ops[ops.len() - 3..], [Op::PioSet(MASK), Op::UsbClose(Phy(3)), Op::PioClose]);
}

#[test]
fn pio_unused_connect_pin() {
    init_log();
    let log = Log::default();
    let connect = ConnectSpec::new(McuPin::UNUSED, Polarity::ActiveHigh);
    let mut link = LinkTransportDriver::new(PioIoctlConnect::new(MockUsb::new(&log), MockPio::new(&log), attr(), connect));

    assert_eq!(link.open(LINK), Err(Error::PortPath));
    assert!(log.ops().is_empty());
}

#[test]
fn pio_active_low() {
    init_log();
    let log = Log::default();
    let connect = ConnectSpec::new(McuPin::new(2, 9), Polarity::ActiveLow);
    let mut link = LinkTransportDriver::new(PioIoctlConnect::new(MockUsb::new(&log), MockPio::new(&log), attr(), connect));

    link.open(LINK).unwrap();
    let ops = log.ops();
    assert_eq!(ops[0], Op::PioOpen("/dev/pio2".to_string()));
    assert_eq!(ops[1], Op::PioSet(1 << 9));
    assert_eq!(ops[4], Op::PioClear(1 << 9));
}

#[test]
fn pin_sequence() {
    init_log();
    for polarity in [Polarity::ActiveHigh, Polarity::ActiveLow] {
        let log = Log::default();
        let mut link = LinkTransportDriver::new(PinConnect::new(MockUsb::new(&log), attr(), MockPin::new(&log), polarity));

        assert_eq!(link.open(LINK), Ok(Phy(3)));
        let (deassert, assert) =
            if polarity.is_active_high() { (Op::PinLow, Op::PinHigh) } else { (Op::PinHigh, Op::PinLow) };
        assert_eq!(
            log.ops(),
            [deassert, Op::UsbOpen { name: LINK.to_string(), attr: attr(), connect: None }, assert]
        );
    }
}

#[test]
fn pin_usb_failure_keeps_line_deasserted() {
    init_log();
    let log = Log::default();
    let mut link = stratify_alpha::pin_link_transport(MockUsb::failing(&log, OsError(-19)), MockPin::new(&log));

    assert_eq!(link.open(LINK), Err(Error::Usb(OsError(-19))));
    let ops = log.ops();
    assert_eq!(ops.len(), 2);
    assert_eq!(ops[0], Op::PinLow);
    assert!(!pin_asserted(&ops, Polarity::ActiveHigh));
}

#[test]
fn pin_reassert_failure_closes_usb() {
    init_log();
    let log = Log::default();
    let mut pin = MockPin::new(&log);
    pin.fail_high = true;
    let mut link = stratify_alpha::pin_link_transport(MockUsb::new(&log), pin);

    assert_eq!(link.open(LINK), Err(Error::Connect));
    assert_eq!(link.handle(), Phy::CLOSED);
    let ops = log.ops();
    assert_eq!(ops.last(), Some(&Op::UsbClose(Phy(3))));
}

#[test]
fn pin_deassert_failure() {
    init_log();
    let log = Log::default();
    let mut pin = MockPin::new(&log);
    pin.fail_low = true;
    let mut link = stratify_alpha::pin_link_transport(MockUsb::new(&log), pin);

    assert_eq!(link.open(LINK), Err(Error::Connect));
    assert_eq!(log.ops(), [Op::PinLow]);
}

#[test]
fn ok_handle_means_connected() {
    init_log();
    for usb_ok in [true, false] {
        for fail_high in [false, true] {
            let log = Log::default();
            let usb = if usb_ok { MockUsb::new(&log) } else { MockUsb::failing(&log, OsError(-1)) };
            let mut pin = MockPin::new(&log);
            pin.fail_high = fail_high;
            let mut link = LinkTransportDriver::new(PinConnect::new(usb, attr(), pin, Polarity::ActiveHigh));

            let res = link.open(LINK);
            assert_eq!(res.is_ok(), usb_ok && !fail_high);
            if res.is_ok() {
                assert!(pin_asserted(&log.ops(), Polarity::ActiveHigh));
            }
            assert_eq!(link.is_open(), res.is_ok());
        }
    }
}

#[test]
fn delegated_passes_connect_line() {
    init_log();
    let log = Log::default();
    let mut link = stratify_alpha::boot_link_transport(MockUsb::new(&log));

    assert_eq!(link.flags(), LinkFlags::empty());
    assert_eq!(link.framing(), Framing::Link1Slave);
    assert_eq!(link.timeout_ms(), 500);
    assert_eq!(link.open(LINK), Ok(Phy(3)));
    assert_eq!(log.usb_opens(), [(attr(), Some(CONNECT))]);
}

#[test]
fn unswitched_opens_usb_only() {
    init_log();
    let log = Log::default();
    let mut link = generic::link_transport(MockUsb::new(&log));

    assert_eq!(link.flags(), LinkFlags::CHECKSUM);
    assert_eq!(link.framing(), Framing::Default);
    assert_eq!(link.open(LINK), Ok(Phy(3)));
    assert_eq!(log.usb_opens(), [(generic::BoardImpl::usb_attr(), None)]);
}

#[test]
fn unused_usb_pins_reach_os() {
    init_log();
    let log = Log::default();

    LinkTransportDriver::new(PioIoctlConnect::new(MockUsb::new(&log), MockPio::new(&log), attr(), CONNECT))
        .open(LINK)
        .unwrap();
    LinkTransportDriver::new(PinConnect::new(MockUsb::new(&log), attr(), MockPin::new(&log), Polarity::ActiveHigh))
        .open(LINK)
        .unwrap();
    LinkTransportDriver::new(DelegatedConnect::new(MockUsb::new(&log), attr(), CONNECT)).open(LINK).unwrap();
    LinkTransportDriver::new(UnswitchedConnect::new(MockUsb::new(&log), attr())).open(LINK).unwrap();

    let opens = log.usb_opens();
    assert_eq!(opens.len(), 4);
    for (attr, _) in opens {
        assert_eq!(attr.flags, UsbFlags::SET_DEVICE);
        assert_eq!(attr.freq, 12_000_000);
        let pins = attr.pin_assignment.pins();
        assert_eq!(pins[0], McuPin::new(0, 29));
        assert_eq!(pins[1], McuPin::new(0, 30));
        for pin in &pins[2..] {
            assert_eq!((pin.port, pin.pin), (0xff, 0xff));
        }
    }
}

#[test]
fn negative_handle_is_error() {
    init_log();
    let log = Log::default();
    let mut usb = MockUsb::new(&log);
    usb.open_result = Ok(Phy(-16));
    let mut link = generic::link_transport(usb);

    assert_eq!(link.open(LINK), Err(Error::Usb(OsError(-16))));
    assert_eq!(link.handle(), Phy::CLOSED);
}

#[test]
fn open_once() {
    init_log();
    let log = Log::default();
    let mut link = stratify_alpha::pin_link_transport(MockUsb::new(&log), MockPin::new(&log));

    link.open(LINK).unwrap();
    let ops = log.ops();
    assert_eq!(link.open(LINK), Err(Error::AlreadyOpen));
    assert_eq!(log.ops(), ops);
    assert_eq!(link.handle(), Phy(3));
}

#[test]
fn closed_operations() {
    init_log();
    let log = Log::default();
    let mut link = generic::link_transport(MockUsb::new(&log));
    let mut buf = [0; 4];

    assert_eq!(link.read(&mut buf), Err(Error::NotOpen));
    assert_eq!(link.write(b"ping"), Err(Error::NotOpen));
    assert_eq!(link.notify(b"!"), Err(Error::NotOpen));
    assert_eq!(link.flush(), Err(Error::NotOpen));
    assert_eq!(link.close(), Err(Error::NotOpen));
    assert!(log.ops().is_empty());
}

#[test]
fn transfer_and_close() {
    init_log();
    let log = Log::default();
    let mut link = generic::link_transport(MockUsb::new(&log));
    link.open(LINK).unwrap();
    log.clear();

    let mut buf = [0; 4];
    assert_eq!(link.read(&mut buf), Ok(4));
    assert_eq!(buf, [0xa5; 4]);
    assert_eq!(link.write(b"ping"), Ok(4));
    assert_eq!(link.notify(b"!"), Ok(1));
    link.flush().unwrap();
    link.wait(10);
    link.close().unwrap();
    assert_eq!(link.handle(), Phy::CLOSED);

    assert_eq!(
        log.ops(),
        [
            Op::UsbRead(Phy(3)),
            Op::UsbWrite(Phy(3), b"ping".to_vec()),
            Op::UsbNotify(Phy(3), b"!".to_vec()),
            Op::UsbFlush(Phy(3)),
            Op::Wait(10),
            Op::UsbClose(Phy(3)),
        ]
    );

    assert_eq!(link.open(LINK), Ok(Phy(3)));
}
