//! USB transport of the operating system.

use super::{OsError, Phy};
use crate::pin::{McuPin, Polarity};

bitflags::bitflags! {
    /// USB peripheral flags.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct UsbFlags: u32 {
        /// Configure the peripheral as USB device.
        const SET_DEVICE = 1 << 0;
    }
}

/// USB pin assignment.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct UsbPinAssignment {
    /// D+ line.
    pub dp: McuPin,
    /// D- line.
    pub dm: McuPin,
    /// VBUS sense.
    pub vbus: McuPin,
    /// OTG id line.
    pub id: McuPin,
}

impl UsbPinAssignment {
    /// All pins unused.
    pub const UNUSED: Self = Self { dp: McuPin::UNUSED, dm: McuPin::UNUSED, vbus: McuPin::UNUSED, id: McuPin::UNUSED };

    /// Pin assignment from the board's USB pins (D+, D-, VBUS, ID).
    pub const fn from_pins(pins: [McuPin; 4]) -> Self {
        Self { dp: pins[0], dm: pins[1], vbus: pins[2], id: pins[3] }
    }

    /// Pins as an array (D+, D-, VBUS, ID).
    pub const fn pins(&self) -> [McuPin; 4] {
        [self.dp, self.dm, self.vbus, self.id]
    }
}

impl Default for UsbPinAssignment {
    fn default() -> Self {
        Self::UNUSED
    }
}

/// Attributes for bringing up the USB peripheral.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct UsbAttr {
    /// Flags.
    pub flags: UsbFlags,
    /// Pin assignment.
    pub pin_assignment: UsbPinAssignment,
    /// Oscillator frequency in Hz.
    pub freq: u32,
}

impl UsbAttr {
    /// Device mode attributes for the specified pins and oscillator frequency.
    pub const fn device(pins: [McuPin; 4], freq: u32) -> Self {
        Self { flags: UsbFlags::SET_DEVICE, pin_assignment: UsbPinAssignment::from_pins(pins), freq }
    }
}

/// Connect line handed to the USB transport.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ConnectSpec {
    /// Pin driving the USB pull-up.
    pub pin: McuPin,
    /// Level that connects the device to the bus.
    pub polarity: Polarity,
}

impl ConnectSpec {
    /// Creates a connect line description.
    pub const fn new(pin: McuPin, polarity: Polarity) -> Self {
        Self { pin, polarity }
    }
}

/// USB CDC link transport provided by the operating system.
///
/// All calls are synchronous. Handles returned by `open` are negative on failure.
pub trait UsbTransport {
    /// Brings up the USB peripheral and opens the link.
    ///
    /// If `connect` is given, the transport deasserts the connect line before
    /// bringing up the peripheral and asserts it once the link is open.
    fn open(&mut self, name: &str, attr: &UsbAttr, connect: Option<ConnectSpec>) -> Result<Phy, OsError>;

    /// Reads from the link.
    fn read(&mut self, phy: Phy, buf: &mut [u8]) -> Result<usize, OsError>;

    /// Writes to the link.
    fn write(&mut self, phy: Phy, buf: &[u8]) -> Result<usize, OsError>;

    /// Closes the link.
    fn close(&mut self, phy: Phy) -> Result<(), OsError>;

    /// Waits for the specified number of milliseconds.
    fn wait(&mut self, ms: u32);

    /// Discards pending input.
    fn flush(&mut self, phy: Phy);

    /// Sends an asynchronous notification to the host.
    fn notify(&mut self, phy: Phy, buf: &[u8]) -> Result<usize, OsError>;
}
