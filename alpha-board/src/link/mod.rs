//! Link transport over USB.
//!
//! The link transport driver is constructed once before the scheduler starts
//! and handed to the operating system's link protocol layer. Opening the
//! transport brings up the USB peripheral and connects the device to the bus
//! using the board's connect mechanism, see [`backend`].

use core::fmt;

pub mod backend;
pub mod connect;
pub mod pio;
pub mod usb;

pub use backend::{DelegatedConnect, PinConnect, PioIoctlConnect, UnswitchedConnect};
pub use connect::ConnectLine;
pub use pio::{PioAttr, PioFile, PioFs, PioMode};
pub use usb::{ConnectSpec, UsbAttr, UsbFlags, UsbPinAssignment, UsbTransport};

/// Default timeout of link transactions in milliseconds.
pub const DEFAULT_TIMEOUT_MS: u32 = 500;

/// Handle of an open link.
///
/// Negative values signal an error or a closed link.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Phy(pub i32);

impl Phy {
    /// Closed link.
    pub const CLOSED: Self = Self(-1);

    /// Whether the handle refers to an open link.
    pub const fn is_open(&self) -> bool {
        self.0 >= 0
    }
}

impl Default for Phy {
    fn default() -> Self {
        Self::CLOSED
    }
}

/// Error code returned by the operating system.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct OsError(pub i32);

impl OsError {
    /// No such file or device.
    pub const NOT_FOUND: Self = Self(-2);
    /// Invalid argument.
    pub const INVALID: Self = Self(-22);
}

impl fmt::Display for OsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "error {}", self.0)
    }
}

/// Link transport error.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    /// Link is already open.
    AlreadyOpen,
    /// Link is not open.
    NotOpen,
    /// PIO device operation failed.
    Pio(OsError),
    /// USB transport operation failed.
    Usb(OsError),
    /// Driving the connect line failed.
    Connect,
    /// Connect pin has no PIO device.
    PortPath,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AlreadyOpen => write!(f, "link is already open"),
            Self::NotOpen => write!(f, "link is not open"),
            Self::Pio(err) => write!(f, "PIO device failed: {err}"),
            Self::Usb(err) => write!(f, "USB transport failed: {err}"),
            Self::Connect => write!(f, "cannot drive USB connect line"),
            Self::PortPath => write!(f, "connect pin has no PIO device"),
        }
    }
}

/// Link transport result.
pub type Result<T> = core::result::Result<T, Error>;

bitflags::bitflags! {
    /// Link transport flags.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct LinkFlags: u32 {
        /// Protocol layer checksums packets.
        ///
        /// Not needed on USB, which checksums on its own.
        const CHECKSUM = 1 << 0;
    }
}

/// Packet framing used by the operating system's protocol layer.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Framing {
    /// Framing of the main image.
    #[default]
    Default,
    /// Link 1 slave framing used by the bootloader.
    Link1Slave,
}

/// Board specific way of opening the USB link.
pub trait LinkBackend {
    /// USB transport of the operating system.
    type Usb: UsbTransport;

    /// Brings up USB and connects the device to the bus.
    ///
    /// Returns a non-negative handle only if the connect line is asserted.
    fn open(&mut self, name: &str) -> Result<Phy>;

    /// USB transport.
    fn usb(&mut self) -> &mut Self::Usb;
}

/// Opens the USB transport, converting negative handles into errors.
pub(crate) fn open_usb<U: UsbTransport>(
    usb: &mut U, name: &str, attr: &UsbAttr, connect: Option<ConnectSpec>,
) -> Result<Phy> {
    match usb.open(name, attr, connect) {
        Ok(phy) if phy.is_open() => Ok(phy),
        Ok(Phy(code)) | Err(OsError(code)) => {
            error!("cannot open USB link {}: error {}", name, code);
            Err(Error::Usb(OsError(code)))
        }
    }
}

/// Link transport driver.
pub struct LinkTransportDriver<B> {
    backend: B,
    handle: Phy,
    timeout_ms: u32,
    flags: LinkFlags,
    framing: Framing,
}

impl<B: LinkBackend> LinkTransportDriver<B> {
    /// Creates a closed driver with checksums enabled and the default framing.
    pub const fn new(backend: B) -> Self {
        Self {
            backend,
            handle: Phy::CLOSED,
            timeout_ms: DEFAULT_TIMEOUT_MS,
            flags: LinkFlags::CHECKSUM,
            framing: Framing::Default,
        }
    }

    /// Sets the transaction timeout.
    pub const fn with_timeout(mut self, timeout_ms: u32) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    /// Sets the flags.
    pub const fn with_flags(mut self, flags: LinkFlags) -> Self {
        self.flags = flags;
        self
    }

    /// Sets the framing.
    pub const fn with_framing(mut self, framing: Framing) -> Self {
        self.framing = framing;
        self
    }

    /// Opens the link.
    ///
    /// Fails without touching the hardware if the link is already open.
    pub fn open(&mut self, name: &str) -> Result<Phy> {
        if self.handle.is_open() {
            warn!("link {} is already open", name);
            return Err(Error::AlreadyOpen);
        }

        let phy = self.backend.open(name)?;
        if !phy.is_open() {
            return Err(Error::Usb(OsError(phy.0)));
        }

        info!("link {} open with handle {}", name, phy.0);
        self.handle = phy;
        Ok(phy)
    }

    fn phy(&self) -> Result<Phy> {
        if self.handle.is_open() {
            Ok(self.handle)
        } else {
            Err(Error::NotOpen)
        }
    }

    /// Reads from the link.
    pub fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
        let phy = self.phy()?;
        self.backend.usb().read(phy, buf).map_err(Error::Usb)
    }

    /// Writes to the link.
    pub fn write(&mut self, buf: &[u8]) -> Result<usize> {
        let phy = self.phy()?;
        self.backend.usb().write(phy, buf).map_err(Error::Usb)
    }

    /// Sends an asynchronous notification to the host.
    pub fn notify(&mut self, buf: &[u8]) -> Result<usize> {
        let phy = self.phy()?;
        self.backend.usb().notify(phy, buf).map_err(Error::Usb)
    }

    /// Closes the link.
    ///
    /// The driver is closed afterwards even if the transport reports an error.
    pub fn close(&mut self) -> Result<()> {
        let phy = self.phy()?;
        self.handle = Phy::CLOSED;
        info!("link closed");
        self.backend.usb().close(phy).map_err(Error::Usb)
    }

    /// Discards pending input.
    pub fn flush(&mut self) -> Result<()> {
        let phy = self.phy()?;
        self.backend.usb().flush(phy);
        Ok(())
    }

    /// Waits for the specified number of milliseconds.
    pub fn wait(&mut self, ms: u32) {
        self.backend.usb().wait(ms);
    }

    /// Handle of the open link or [`Phy::CLOSED`].
    pub fn handle(&self) -> Phy {
        self.handle
    }

    /// Whether the link is open.
    pub fn is_open(&self) -> bool {
        self.handle.is_open()
    }

    /// Transaction timeout in milliseconds.
    pub fn timeout_ms(&self) -> u32 {
        self.timeout_ms
    }

    /// Flags.
    pub fn flags(&self) -> LinkFlags {
        self.flags
    }

    /// Framing.
    pub fn framing(&self) -> Framing {
        self.framing
    }

    /// Backend.
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Mutable backend.
    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }
}

impl<B> fmt::Debug for LinkTransportDriver<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LinkTransportDriver")
            .field("handle", &self.handle)
            .field("timeout_ms", &self.timeout_ms)
            .field("flags", &self.flags)
            .field("framing", &self.framing)
            .finish_non_exhaustive()
    }
}
