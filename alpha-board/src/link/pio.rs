//! PIO device of the operating system.

use core::fmt::Write;

use heapless::String;

use super::OsError;

bitflags::bitflags! {
    /// PIO pin mode.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct PioMode: u32 {
        /// Input.
        const INPUT = 1 << 0;
        /// Push-pull output.
        const OUTPUT = 1 << 1;
        /// Only change the direction; leave pull-ups and function alone.
        const DIRONLY = 1 << 2;
    }
}

/// PIO pin attributes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PioAttr {
    /// Pins to configure.
    pub mask: u32,
    /// Mode.
    pub mode: PioMode,
}

/// Maximum length of a PIO device path.
pub const PIO_PATH_LEN: usize = 16;

/// PIO device path, for example `/dev/pio1`.
pub type PioPath = String<PIO_PATH_LEN>;

/// Path of the PIO device of the specified port.
pub fn pio_path(port: u8) -> Option<PioPath> {
    let mut path = PioPath::new();
    write!(path, "/dev/pio{port}").ok()?;
    Some(path)
}

/// PIO devices below `/dev`.
pub trait PioFs {
    /// Open PIO device.
    type File: PioFile;

    /// Opens a PIO device for reading and writing.
    fn open(&mut self, path: &str) -> Result<Self::File, OsError>;
}

/// An open PIO device.
pub trait PioFile {
    /// Drives the pins in `mask` high.
    fn set_mask(&mut self, mask: u32) -> Result<(), OsError>;

    /// Drives the pins in `mask` low.
    fn clear_mask(&mut self, mask: u32) -> Result<(), OsError>;

    /// Configures the pins in `attr.mask`.
    fn set_attr(&mut self, attr: &PioAttr) -> Result<(), OsError>;

    /// Closes the device.
    fn close(self) -> Result<(), OsError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paths() {
        assert_eq!(pio_path(1).unwrap().as_str(), "/dev/pio1");
        assert_eq!(pio_path(255).unwrap().as_str(), "/dev/pio255");
    }
}
