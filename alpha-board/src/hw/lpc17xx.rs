//! LPC17xx fast GPIO.

use core::{convert::Infallible, fmt};

use embedded_hal::digital::v2::OutputPin;
use lpc176x5x::{gpio0::RegisterBlock, Peripherals};

use crate::{
    link::{
        pio::{PioAttr, PioFile, PioFs, PioMode},
        OsError,
    },
    pin::McuPin,
};

/// Number of GPIO ports.
pub const PORTS: u8 = 5;

/// GPIO port registers.
pub struct GpioPort {
    dp: Peripherals,
    port: u8,
}

impl fmt::Debug for GpioPort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GpioPort").field("port", &self.port).finish()
    }
}

impl GpioPort {
    /// Accesses the registers of the specified port.
    ///
    /// # Safety
    /// Bits of the port must not be modified concurrently by other code.
    pub unsafe fn steal(port: u8) -> Option<Self> {
        if port < PORTS {
            Some(Self { dp: Peripherals::steal(), port })
        } else {
            None
        }
    }

    fn regs(&self) -> &RegisterBlock {
        match self.port {
            0 => &self.dp.GPIO0,
            1 => &self.dp.GPIO1,
            2 => &self.dp.GPIO2,
            3 => &self.dp.GPIO3,
            _ => &self.dp.GPIO4,
        }
    }

    /// Port number.
    pub fn port(&self) -> u8 {
        self.port
    }

    /// Drives the pins in `mask` high.
    pub fn set_mask(&mut self, mask: u32) {
        self.regs().fioset.write(|w| unsafe { w.bits(mask) });
    }

    /// Drives the pins in `mask` low.
    pub fn clear_mask(&mut self, mask: u32) {
        self.regs().fioclr.write(|w| unsafe { w.bits(mask) });
    }

    /// Configures the pins in `mask` as outputs.
    pub fn set_output(&mut self, mask: u32) {
        self.regs().fiodir.modify(|r, w| unsafe { w.bits(r.bits() | mask) });
    }

    /// Configures the pins in `mask` as inputs.
    pub fn set_input(&mut self, mask: u32) {
        self.regs().fiodir.modify(|r, w| unsafe { w.bits(r.bits() & !mask) });
    }
}

/// Push-pull output pin.
#[derive(Debug)]
pub struct Output {
    port: GpioPort,
    mask: u32,
}

impl Output {
    /// Configures the pin as output.
    ///
    /// Returns `None` for unused pins.
    ///
    /// # Safety
    /// The pin must not be used by other code.
    pub unsafe fn new(pin: McuPin) -> Option<Self> {
        let mask = pin.mask();
        if mask == 0 {
            return None;
        }
        let mut port = GpioPort::steal(pin.port)?;
        port.set_output(mask);
        Some(Self { port, mask })
    }
}

impl OutputPin for Output {
    type Error = Infallible;

    fn set_low(&mut self) -> Result<(), Infallible> {
        self.port.clear_mask(self.mask);
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Infallible> {
        self.port.set_mask(self.mask);
        Ok(())
    }
}

/// PIO devices backed directly by the GPIO registers.
///
/// Used by images that run without the operating system's PIO driver.
#[derive(Debug, Default)]
pub struct Gpio;

impl PioFs for Gpio {
    type File = GpioPort;

    fn open(&mut self, path: &str) -> Result<GpioPort, OsError> {
        let port = path.strip_prefix("/dev/pio").and_then(|port| port.parse().ok()).ok_or(OsError::NOT_FOUND)?;
        unsafe { GpioPort::steal(port) }.ok_or(OsError::NOT_FOUND)
    }
}

impl PioFile for GpioPort {
    fn set_mask(&mut self, mask: u32) -> Result<(), OsError> {
        GpioPort::set_mask(self, mask);
        Ok(())
    }

    fn clear_mask(&mut self, mask: u32) -> Result<(), OsError> {
        GpioPort::clear_mask(self, mask);
        Ok(())
    }

    fn set_attr(&mut self, attr: &PioAttr) -> Result<(), OsError> {
        if attr.mode.contains(PioMode::OUTPUT) {
            self.set_output(attr.mask);
        } else if attr.mode.contains(PioMode::INPUT) {
            self.set_input(attr.mask);
        } else {
            return Err(OsError::INVALID);
        }
        Ok(())
    }

    fn close(self) -> Result<(), OsError> {
        Ok(())
    }
}
