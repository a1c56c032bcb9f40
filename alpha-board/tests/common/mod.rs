//! Mock operating system services recording every hardware operation.

#![allow(dead_code)]

use std::{cell::RefCell, rc::Rc};

use alpha_board::link::{ConnectSpec, OsError, Phy, PioAttr, PioFile, PioFs, UsbAttr, UsbTransport};
use embedded_hal::digital::v2::OutputPin;

/// Recorded operation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Op {
    UsbOpen { name: String, attr: UsbAttr, connect: Option<ConnectSpec> },
    UsbRead(Phy),
    UsbWrite(Phy, Vec<u8>),
    UsbNotify(Phy, Vec<u8>),
    UsbClose(Phy),
    UsbFlush(Phy),
    Wait(u32),
    PinHigh,
    PinLow,
    PioOpen(String),
    PioSet(u32),
    PioClear(u32),
    PioAttr(PioAttr),
    PioClose,
}

/// Shared operation log.
#[derive(Clone, Debug, Default)]
pub struct Log(Rc<RefCell<Vec<Op>>>);

impl Log {
    pub fn push(&self, op: Op) {
        self.0.borrow_mut().push(op);
    }

    pub fn ops(&self) -> Vec<Op> {
        self.0.borrow().clone()
    }

    pub fn clear(&self) {
        self.0.borrow_mut().clear();
    }

    pub fn usb_opens(&self) -> Vec<(UsbAttr, Option<ConnectSpec>)> {
        self.ops()
            .into_iter()
            .filter_map(|op| match op {
                Op::UsbOpen { attr, connect, .. } => Some((attr, connect)),
                _ => None,
            })
            .collect()
    }
}

/// Initializes logging for tests.
pub fn init_log() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// USB transport.
pub struct MockUsb {
    pub log: Log,
    pub open_result: Result<Phy, OsError>,
}

impl MockUsb {
    pub fn new(log: &Log) -> Self {
        Self { log: log.clone(), open_result: Ok(Phy(3)) }
    }

    pub fn failing(log: &Log, err: OsError) -> Self {
        Self { log: log.clone(), open_result: Err(err) }
    }
}

impl UsbTransport for MockUsb {
    fn open(&mut self, name: &str, attr: &UsbAttr, connect: Option<ConnectSpec>) -> Result<Phy, OsError> {
        self.log.push(Op::UsbOpen { name: name.to_string(), attr: *attr, connect });
        self.open_result
    }

    fn read(&mut self, phy: Phy, buf: &mut [u8]) -> Result<usize, OsError> {
        self.log.push(Op::UsbRead(phy));
        buf.fill(0xa5);
        Ok(buf.len())
    }

    fn write(&mut self, phy: Phy, buf: &[u8]) -> Result<usize, OsError> {
        self.log.push(Op::UsbWrite(phy, buf.to_vec()));
        Ok(buf.len())
    }

    fn close(&mut self, phy: Phy) -> Result<(), OsError> {
        self.log.push(Op::UsbClose(phy));
        Ok(())
    }

    fn wait(&mut self, ms: u32) {
        self.log.push(Op::Wait(ms));
    }

    fn flush(&mut self, phy: Phy) {
        self.log.push(Op::UsbFlush(phy));
    }

    fn notify(&mut self, phy: Phy, buf: &[u8]) -> Result<usize, OsError> {
        self.log.push(Op::UsbNotify(phy, buf.to_vec()));
        Ok(buf.len())
    }
}

/// GPIO output whose high or low transition can be made to fail.
pub struct MockPin {
    pub log: Log,
    pub fail_high: bool,
    pub fail_low: bool,
}

impl MockPin {
    pub fn new(log: &Log) -> Self {
        Self { log: log.clone(), fail_high: false, fail_low: false }
    }
}

impl OutputPin for MockPin {
    type Error = ();

    fn set_low(&mut self) -> Result<(), ()> {
        self.log.push(Op::PinLow);
        if self.fail_low {
            Err(())
        } else {
            Ok(())
        }
    }

    fn set_high(&mut self) -> Result<(), ()> {
        self.log.push(Op::PinHigh);
        if self.fail_high {
            Err(())
        } else {
            Ok(())
        }
    }
}

/// PIO devices.
pub struct MockPio {
    pub log: Log,
    pub open_error: Option<OsError>,
    pub fail_set: bool,
}

impl MockPio {
    pub fn new(log: &Log) -> Self {
        Self { log: log.clone(), open_error: None, fail_set: false }
    }
}

impl PioFs for MockPio {
    type File = MockPioFile;

    fn open(&mut self, path: &str) -> Result<MockPioFile, OsError> {
        self.log.push(Op::PioOpen(path.to_string()));
        match self.open_error {
            Some(err) => Err(err),
            None => Ok(MockPioFile { log: self.log.clone(), fail_set: self.fail_set }),
        }
    }
}

/// Open PIO device.
pub struct MockPioFile {
    log: Log,
    fail_set: bool,
}

impl PioFile for MockPioFile {
    fn set_mask(&mut self, mask: u32) -> Result<(), OsError> {
        self.log.push(Op::PioSet(mask));
        if self.fail_set {
            Err(OsError(-5))
        } else {
            Ok(())
        }
    }

    fn clear_mask(&mut self, mask: u32) -> Result<(), OsError> {
        self.log.push(Op::PioClear(mask));
        Ok(())
    }

    fn set_attr(&mut self, attr: &PioAttr) -> Result<(), OsError> {
        self.log.push(Op::PioAttr(*attr));
        Ok(())
    }

    fn close(self) -> Result<(), OsError> {
        self.log.push(Op::PioClose);
        Ok(())
    }
}
