//! MCU pin assignment.

use core::fmt;

/// A GPIO line identified by port and pin number.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct McuPin {
    /// Port number.
    pub port: u8,
    /// Pin number within the port.
    pub pin: u8,
}

impl McuPin {
    /// Marks an unused pin.
    pub const UNUSED: Self = Self { port: 0xff, pin: 0xff };

    /// Number of pins per port.
    pub const PINS_PER_PORT: u8 = 32;

    /// Creates a pin assignment.
    pub const fn new(port: u8, pin: u8) -> Self {
        Self { port, pin }
    }

    /// Whether this is the unused sentinel.
    pub const fn is_unused(&self) -> bool {
        self.port == Self::UNUSED.port && self.pin == Self::UNUSED.pin
    }

    /// Bit mask of the pin within its port.
    ///
    /// Zero for unused pins and pin numbers out of range.
    pub const fn mask(&self) -> u32 {
        if self.is_unused() || self.pin >= Self::PINS_PER_PORT {
            0
        } else {
            1 << self.pin
        }
    }
}

/// Logic level that asserts a line.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Polarity {
    /// Line is asserted when driven high.
    ActiveHigh,
    /// Line is asserted when driven low.
    ActiveLow,
}

impl Polarity {
    /// Polarity from an active-high flag.
    pub const fn from_active_high(active_high: bool) -> Self {
        if active_high {
            Self::ActiveHigh
        } else {
            Self::ActiveLow
        }
    }

    /// Whether the line is asserted when driven high.
    pub const fn is_active_high(self) -> bool {
        matches!(self, Self::ActiveHigh)
    }
}

impl Default for McuPin {
    fn default() -> Self {
        Self::UNUSED
    }
}

impl fmt::Display for McuPin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_unused() {
            write!(f, "unused")
        } else {
            write!(f, "P{}.{}", self.port, self.pin)
        }
    }
}
