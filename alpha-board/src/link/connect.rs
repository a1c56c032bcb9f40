//! USB connect line.
//!
//! The connect line switches the pull-up on D+ that signals the device's
//! presence to the host.

use embedded_hal::digital::v2::OutputPin;

use crate::pin::Polarity;

/// USB connect line driven through a GPIO output.
#[derive(Debug)]
pub struct ConnectLine<P> {
    pin: P,
    polarity: Polarity,
}

impl<P: OutputPin> ConnectLine<P> {
    /// Creates a connect line.
    ///
    /// The pin is not driven until [`assert`](Self::assert) or
    /// [`deassert`](Self::deassert) is called.
    pub const fn new(pin: P, polarity: Polarity) -> Self {
        Self { pin, polarity }
    }

    /// Connects the device to the bus.
    pub fn assert(&mut self) -> Result<(), P::Error> {
        trace!("asserting USB connect line");
        match self.polarity {
            Polarity::ActiveHigh => self.pin.set_high(),
            Polarity::ActiveLow => self.pin.set_low(),
        }
    }

    /// Disconnects the device from the bus.
    pub fn deassert(&mut self) -> Result<(), P::Error> {
        trace!("deasserting USB connect line");
        match self.polarity {
            Polarity::ActiveHigh => self.pin.set_low(),
            Polarity::ActiveLow => self.pin.set_high(),
        }
    }

    /// Polarity.
    pub fn polarity(&self) -> Polarity {
        self.polarity
    }

    /// Releases the pin.
    pub fn free(self) -> P {
        self.pin
    }
}

#[cfg(test)]
mod tests {
    use core::convert::Infallible;

    use super::*;

    #[derive(Default)]
    struct Level(Option<bool>);

    impl OutputPin for Level {
        type Error = Infallible;

        fn set_low(&mut self) -> Result<(), Infallible> {
            self.0 = Some(false);
            Ok(())
        }

        fn set_high(&mut self) -> Result<(), Infallible> {
            self.0 = Some(true);
            Ok(())
        }
    }

    #[test]
    fn active_high() {
        let mut line = ConnectLine::new(Level::default(), Polarity::ActiveHigh);
        line.deassert().unwrap();
        assert_eq!(line.pin.0, Some(false));
        line.assert().unwrap();
        assert_eq!(line.free().0, Some(true));
    }

    #[test]
    fn active_low() {
        let mut line = ConnectLine::new(Level::default(), Polarity::ActiveLow);
        line.assert().unwrap();
        assert_eq!(line.pin.0, Some(false));
        line.deassert().unwrap();
        assert_eq!(line.free().0, Some(true));
    }
}
