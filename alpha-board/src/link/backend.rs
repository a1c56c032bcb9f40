//! Link backends.
//!
//! Each backend implements one revision of connecting the device to the USB
//! bus. The connect line is deasserted before the USB peripheral is brought up
//! and asserted only after the link has been opened. If USB cannot be opened,
//! the line stays deasserted. If the line cannot be asserted, the link is
//! closed again.

use embedded_hal::digital::v2::OutputPin;

use super::{
    connect::ConnectLine,
    open_usb,
    pio::{pio_path, PioAttr, PioFile, PioFs, PioMode},
    usb::{ConnectSpec, UsbAttr, UsbTransport},
    Error, LinkBackend, Phy, Result,
};
use crate::pin::Polarity;

/// Closes a link whose connect line could not be asserted.
fn abort<U: UsbTransport>(usb: &mut U, name: &str, phy: Phy) -> Error {
    error!("cannot assert USB connect line of {}", name);
    if let Err(err) = usb.close(phy) {
        warn!("cannot close USB link {}: error {}", name, err.0);
    }
    Error::Connect
}

/// Connect line switched through the operating system's PIO device.
///
/// Revision 1.
pub struct PioIoctlConnect<U, F> {
    usb: U,
    pio: F,
    attr: UsbAttr,
    connect: ConnectSpec,
}

impl<U, F> PioIoctlConnect<U, F>
where
    U: UsbTransport,
    F: PioFs,
{
    /// Creates the backend.
    pub const fn new(usb: U, pio: F, attr: UsbAttr, connect: ConnectSpec) -> Self {
        Self { usb, pio, attr, connect }
    }

    /// Connect line.
    pub fn connect(&self) -> ConnectSpec {
        self.connect
    }

    /// PIO devices.
    pub fn pio(&mut self) -> &mut F {
        &mut self.pio
    }

    fn drive(&self, file: &mut F::File, asserted: bool) -> core::result::Result<(), super::OsError> {
        let mask = self.connect.pin.mask();
        if asserted == self.connect.polarity.is_active_high() {
            file.set_mask(mask)
        } else {
            file.clear_mask(mask)
        }
    }

    fn open_with(&mut self, file: &mut F::File, name: &str) -> Result<Phy> {
        let mask = self.connect.pin.mask();

        self.drive(file, false).map_err(Error::Pio)?;
        file.set_attr(&PioAttr { mask, mode: PioMode::OUTPUT | PioMode::DIRONLY }).map_err(Error::Pio)?;
        debug!("USB connect line {:?} deasserted", self.connect.pin);

        let phy = open_usb(&mut self.usb, name, &self.attr, None)?;

        if self.drive(file, true).is_err() {
            return Err(abort(&mut self.usb, name, phy));
        }
        debug!("USB connect line {:?} asserted", self.connect.pin);

        Ok(phy)
    }
}

impl<U, F> LinkBackend for PioIoctlConnect<U, F>
where
    U: UsbTransport,
    F: PioFs,
{
    type Usb = U;

    fn open(&mut self, name: &str) -> Result<Phy> {
        if self.connect.pin.mask() == 0 {
            error!("USB connect pin {:?} is invalid", self.connect.pin);
            return Err(Error::PortPath);
        }
        let path = pio_path(self.connect.pin.port).ok_or(Error::PortPath)?;

        let mut file = self.pio.open(&path).map_err(|err| {
            error!("cannot open {}: error {}", path.as_str(), err.0);
            Error::Pio(err)
        })?;

        let res = self.open_with(&mut file, name);

        if let Err(err) = file.close() {
            warn!("cannot close {}: error {}", path.as_str(), err.0);
        }

        res
    }

    fn usb(&mut self) -> &mut U {
        &mut self.usb
    }
}

/// Connect line driven through a GPIO output pin.
///
/// Revision 2.
pub struct PinConnect<U, P> {
    usb: U,
    attr: UsbAttr,
    line: ConnectLine<P>,
}

impl<U, P> PinConnect<U, P>
where
    U: UsbTransport,
    P: OutputPin,
{
    /// Creates the backend.
    pub const fn new(usb: U, attr: UsbAttr, pin: P, polarity: Polarity) -> Self {
        Self { usb, attr, line: ConnectLine::new(pin, polarity) }
    }

    /// Connect line.
    pub fn line(&mut self) -> &mut ConnectLine<P> {
        &mut self.line
    }
}

impl<U, P> LinkBackend for PinConnect<U, P>
where
    U: UsbTransport,
    P: OutputPin,
{
    type Usb = U;

    fn open(&mut self, name: &str) -> Result<Phy> {
        if self.line.deassert().is_err() {
            error!("cannot deassert USB connect line of {}", name);
            return Err(Error::Connect);
        }

        let phy = open_usb(&mut self.usb, name, &self.attr, None)?;

        if self.line.assert().is_err() {
            return Err(abort(&mut self.usb, name, phy));
        }

        Ok(phy)
    }

    fn usb(&mut self) -> &mut U {
        &mut self.usb
    }
}

/// Connect line sequenced by the operating system's USB transport.
///
/// Revision 3, used by the bootloader.
pub struct DelegatedConnect<U> {
    usb: U,
    attr: UsbAttr,
    connect: ConnectSpec,
}

impl<U: UsbTransport> DelegatedConnect<U> {
    /// Creates the backend.
    pub const fn new(usb: U, attr: UsbAttr, connect: ConnectSpec) -> Self {
        Self { usb, attr, connect }
    }
}

impl<U: UsbTransport> LinkBackend for DelegatedConnect<U> {
    type Usb = U;

    fn open(&mut self, name: &str) -> Result<Phy> {
        debug!("USB transport drives connect line {:?}", self.connect.pin);
        open_usb(&mut self.usb, name, &self.attr, Some(self.connect))
    }

    fn usb(&mut self) -> &mut U {
        &mut self.usb
    }
}

/// No connect line; the pull-up is hard-wired.
///
/// Revision 4.
pub struct UnswitchedConnect<U> {
    usb: U,
    attr: UsbAttr,
}

impl<U: UsbTransport> UnswitchedConnect<U> {
    /// Creates the backend.
    pub const fn new(usb: U, attr: UsbAttr) -> Self {
        Self { usb, attr }
    }
}

impl<U: UsbTransport> LinkBackend for UnswitchedConnect<U> {
    type Usb = U;

    fn open(&mut self, name: &str) -> Result<Phy> {
        open_usb(&mut self.usb, name, &self.attr, None)
    }

    fn usb(&mut self) -> &mut U {
        &mut self.usb
    }
}
