//! Device table exposed below `/dev`.
//!
//! The operating system walks the table at boot to populate its device
//! namespace. The table is terminated by [`DeviceEntry::TERMINATOR`] and its
//! order defines the enumeration order.

use core::fmt;

use crate::{
    pin::McuPin,
    table::{fmt_mode, str_eq, TableError},
};

/// Owner and group id of the root user.
pub const ROOT: u8 = 0;

/// Default permissions of a device node.
pub const DEFAULT_MODE: u16 = 0o666;

/// Device driver backing a device node.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Driver {
    /// No driver; used by the terminator.
    None,
    /// MCU memory.
    McuMem,
    /// MCU core.
    McuCore,
    /// Analog to digital converter.
    McuAdc,
    /// Digital to analog converter.
    McuDac,
    /// External interrupt.
    McuEint,
    /// GPIO port.
    McuPio,
    /// I2C bus.
    McuI2c,
    /// PWM timer.
    McuPwm,
    /// Quadrature encoder interface.
    McuQei,
    /// Real-time clock.
    McuRtc,
    /// SSP (SPI) bus.
    McuSsp,
    /// Timer.
    McuTmr,
    /// UART.
    McuUart,
    /// USB.
    McuUsb,
    /// UART with receive FIFO.
    UartFifo,
    /// RAM FIFO.
    Fifo,
    /// USB CDC FIFO.
    UsbFifo,
    /// SST25VF SPI flash.
    Sst25vf,
    /// System information.
    Sys,
}

impl Driver {
    /// Driver name.
    pub const fn name(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::McuMem => "mcu_mem",
            Self::McuCore => "mcu_core",
            Self::McuAdc => "mcu_adc",
            Self::McuDac => "mcu_dac",
            Self::McuEint => "mcu_eint",
            Self::McuPio => "mcu_pio",
            Self::McuI2c => "mcu_i2c",
            Self::McuPwm => "mcu_pwm",
            Self::McuQei => "mcu_qei",
            Self::McuRtc => "mcu_rtc",
            Self::McuSsp => "mcu_ssp",
            Self::McuTmr => "mcu_tmr",
            Self::McuUart => "mcu_uart",
            Self::McuUsb => "mcu_usb",
            Self::UartFifo => "uartfifo",
            Self::Fifo => "fifo",
            Self::UsbFifo => "usbfifo",
            Self::Sst25vf => "sst25vf",
            Self::Sys => "sys",
        }
    }
}

/// Kind of device node.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum NodeKind {
    /// Character device.
    Char,
    /// Block device.
    Block,
}

/// RAM FIFO configuration.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FifoCfg {
    /// Buffer size in bytes.
    pub size: usize,
}

/// UART FIFO configuration.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct UartFifoCfg {
    /// UART port.
    pub port: u8,
    /// Receive buffer size in bytes.
    pub size: usize,
}

/// SST25VF SPI flash configuration.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Sst25vfCfg {
    /// Chip select.
    pub cs: McuPin,
    /// Hold line.
    pub hold: McuPin,
    /// Write protect line.
    pub wp: McuPin,
    /// MISO line, polled for write completion.
    pub miso: McuPin,
    /// Flash size in bytes.
    pub size: u32,
    /// SPI clock frequency in Hz.
    pub freq: u32,
}

/// Configuration handed to the driver of a device node.
///
/// Driver state is owned by the operating system.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DeviceCfg {
    /// Driver needs no configuration.
    None,
    /// RAM FIFO.
    Fifo(&'static FifoCfg),
    /// UART FIFO.
    UartFifo(&'static UartFifoCfg),
    /// USB FIFO of the link transport, configured by the operating system.
    LinkUsbFifo,
    /// SST25VF SPI flash.
    Sst25vf(&'static Sst25vfCfg),
}

/// Device table entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DeviceEntry {
    /// Node name below `/dev`.
    pub name: &'static str,
    /// Driver.
    pub driver: Driver,
    /// Peripheral instance.
    pub port: u8,
    /// Driver configuration.
    pub cfg: DeviceCfg,
    /// Permission bits.
    pub mode: u16,
    /// Owner.
    pub uid: u8,
    /// Group.
    pub gid: u8,
    /// Node kind.
    pub kind: NodeKind,
}

impl DeviceEntry {
    /// Table terminator.
    pub const TERMINATOR: Self = Self {
        name: "",
        driver: Driver::None,
        port: 0,
        cfg: DeviceCfg::None,
        mode: 0,
        uid: ROOT,
        gid: ROOT,
        kind: NodeKind::Char,
    };

    /// Character device owned by root.
    pub const fn char(name: &'static str, driver: Driver, port: u8) -> Self {
        Self { name, driver, port, cfg: DeviceCfg::None, mode: DEFAULT_MODE, uid: ROOT, gid: ROOT, kind: NodeKind::Char }
    }

    /// Block device owned by root.
    pub const fn block(name: &'static str, driver: Driver, port: u8) -> Self {
        Self { kind: NodeKind::Block, ..Self::char(name, driver, port) }
    }

    /// Sets the driver configuration.
    pub const fn with_cfg(self, cfg: DeviceCfg) -> Self {
        Self { cfg, ..self }
    }

    /// Sets the permission bits.
    pub const fn with_mode(self, mode: u16) -> Self {
        Self { mode, ..self }
    }

    /// Whether this is the table terminator.
    pub const fn is_terminator(&self) -> bool {
        matches!(self.driver, Driver::None)
    }
}

impl fmt::Display for DeviceEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self.kind {
            NodeKind::Char => 'c',
            NodeKind::Block => 'b',
        };
        write!(f, "{kind}")?;
        fmt_mode(f, self.mode)?;
        write!(f, " {} {} {:<9} {:<2} /dev/{}", self.uid, self.gid, self.driver.name(), self.port, self.name)
    }
}

/// Terminated device table.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DeviceTable {
    entries: &'static [DeviceEntry],
}

impl DeviceTable {
    /// Creates a device table from entries ending with [`DeviceEntry::TERMINATOR`].
    ///
    /// Panics if the table is invalid, which fails the build when used in a constant.
    pub const fn new(entries: &'static [DeviceEntry]) -> Self {
        match Self::check(entries) {
            Ok(()) => Self { entries },
            Err(TableError::MissingTerminator) => panic!("device table is not terminated"),
            Err(TableError::MisplacedTerminator(_)) => panic!("device table terminator is not last"),
            Err(TableError::EmptyName(_)) => panic!("device table entry has no name"),
            Err(TableError::DuplicateName(_)) => panic!("device table names are not unique"),
            Err(_) => panic!("invalid device table"),
        }
    }

    /// Creates a device table, returning an error if it is invalid.
    pub const fn try_new(entries: &'static [DeviceEntry]) -> Result<Self, TableError> {
        match Self::check(entries) {
            Ok(()) => Ok(Self { entries }),
            Err(err) => Err(err),
        }
    }

    /// Checks that the terminator appears exactly once at the end and that names are unique.
    pub const fn check(entries: &[DeviceEntry]) -> Result<(), TableError> {
        let len = entries.len();
        if len == 0 || !entries[len - 1].is_terminator() {
            return Err(TableError::MissingTerminator);
        }

        let mut i = 0;
        while i < len - 1 {
            if entries[i].is_terminator() {
                return Err(TableError::MisplacedTerminator(i));
            }
            if entries[i].name.is_empty() {
                return Err(TableError::EmptyName(i));
            }

            let mut j = 0;
            while j < i {
                if str_eq(entries[i].name, entries[j].name) {
                    return Err(TableError::DuplicateName(i));
                }
                j += 1;
            }

            i += 1;
        }

        Ok(())
    }

    /// Entries including the terminator.
    pub const fn raw(&self) -> &'static [DeviceEntry] {
        self.entries
    }

    /// Device entries without the terminator.
    pub fn entries(&self) -> &'static [DeviceEntry] {
        &self.entries[..self.len()]
    }

    /// Number of devices.
    pub const fn len(&self) -> usize {
        self.entries.len() - 1
    }

    /// Whether the table contains no devices.
    pub const fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Iterates over the devices in enumeration order.
    pub fn iter(&self) -> impl Iterator<Item = &'static DeviceEntry> {
        self.entries().iter()
    }

    /// Device at the specified index.
    pub fn get(&self, index: usize) -> Option<&'static DeviceEntry> {
        self.entries().get(index)
    }

    /// Device with the specified name.
    pub fn find(&self, name: &str) -> Option<&'static DeviceEntry> {
        self.iter().find(|entry| entry.name == name)
    }

    /// Index of the device with the specified name.
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.iter().position(|entry| entry.name == name)
    }

    /// Whether a device with the specified name exists.
    pub fn contains(&self, name: &str) -> bool {
        self.find(name).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    static STDIO: FifoCfg = FifoCfg { size: 128 };

    static VALID: [DeviceEntry; 4] = [
        DeviceEntry::block("mem0", Driver::McuMem, 0),
        DeviceEntry::char("core", Driver::McuCore, 0),
        DeviceEntry::char("stdio-out", Driver::Fifo, 0).with_cfg(DeviceCfg::Fifo(&STDIO)),
        DeviceEntry::TERMINATOR,
    ];

    #[test]
    fn valid_table() {
        let table = DeviceTable::try_new(&VALID).unwrap();
        assert_eq!(table.len(), 3);
        assert_eq!(table.raw().len(), 4);
        assert_eq!(table.index_of("core"), Some(1));
        assert_eq!(table.find("stdio-out").unwrap().cfg, DeviceCfg::Fifo(&FifoCfg { size: 128 }));
        assert!(table.find("").is_none());
        assert!(table.get(3).is_none());
        assert_eq!(table.iter().map(|e| e.name).collect::<Vec<_>>(), ["mem0", "core", "stdio-out"]);
    }

    #[test]
    fn empty_table() {
        let table = DeviceTable::new(&[DeviceEntry::TERMINATOR]);
        assert!(table.is_empty());
        assert_eq!(table.iter().count(), 0);
    }

    #[test]
    fn missing_terminator() {
        assert_eq!(DeviceTable::check(&[]), Err(TableError::MissingTerminator));
        assert_eq!(DeviceTable::check(&VALID[..3]), Err(TableError::MissingTerminator));
    }

    #[test]
    fn misplaced_terminator() {
        let entries = [DeviceEntry::char("core", Driver::McuCore, 0), DeviceEntry::TERMINATOR, DeviceEntry::TERMINATOR];
        assert_eq!(DeviceTable::check(&entries), Err(TableError::MisplacedTerminator(1)));
    }

    #[test]
    fn duplicate_name() {
        let entries = [
            DeviceEntry::char("uart0", Driver::McuUart, 0),
            DeviceEntry::char("uart1", Driver::McuUart, 1),
            DeviceEntry::char("uart0", Driver::UartFifo, 0),
            DeviceEntry::TERMINATOR,
        ];
        assert_eq!(DeviceTable::check(&entries), Err(TableError::DuplicateName(2)));
    }

    #[test]
    fn empty_name() {
        let entries = [DeviceEntry::char("", Driver::Sys, 0), DeviceEntry::TERMINATOR];
        assert_eq!(DeviceTable::check(&entries), Err(TableError::EmptyName(0)));
    }

    #[test]
    #[should_panic(expected = "not unique")]
    fn new_panics_on_invalid_table() {
        static DUP: [DeviceEntry; 3] =
            [DeviceEntry::char("sys", Driver::Sys, 0), DeviceEntry::char("sys", Driver::Sys, 0), DeviceEntry::TERMINATOR];
        DeviceTable::new(&DUP);
    }

    #[test]
    fn display() {
        assert_eq!(VALID[0].to_string(), "brw-rw-rw- 0 0 mcu_mem   0  /dev/mem0");
    }
}
