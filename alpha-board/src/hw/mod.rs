//! Hardware access on the board's MCU.

use embedded_hal::digital::v2::{OutputPin, PinState};

use crate::{config::McuBoardConfig, event::BoardHooks, pin::Polarity};

pub mod lpc17xx;

pub use lpc17xx::{Gpio, GpioPort, Output};

/// Address of the bootloader's vector table.
pub const BOOTLOADER_VECTOR_TABLE: usize = 0x0000_0000;

/// Starts the bootloader.
///
/// Disables and clears all interrupts and jumps to the bootloader's reset handler.
///
/// No request marker is passed. The bootloader at [`BOOTLOADER_VECTOR_TABLE`] must
/// stay resident when entered this way instead of starting a valid application
/// image on its own.
pub fn invoke_bootloader() -> ! {
    warn!("invoking bootloader");

    cortex_m::interrupt::disable();
    let mut cp = unsafe { cortex_m::Peripherals::steal() };

    cp.SYST.disable_interrupt();
    cp.SYST.disable_counter();
    cortex_m::peripheral::SCB::clear_pendst();

    for icer in cp.NVIC.icer.iter() {
        unsafe { icer.write(0xffffffff) };
    }
    for icpr in cp.NVIC.icpr.iter() {
        unsafe { icpr.write(0xffffffff) };
    }

    unsafe { cortex_m::asm::bootload(BOOTLOADER_VECTOR_TABLE as *const u32) }
}

/// Board hooks driving the status LED and starting the bootloader.
pub struct AlphaHooks {
    led: Option<Output>,
    polarity: Polarity,
}

impl AlphaHooks {
    /// Configures the status LED of the specified MCU configuration and switches it off.
    ///
    /// # Safety
    /// The LED pin must not be used by other code.
    pub unsafe fn new(mcu: &McuBoardConfig) -> Self {
        let mut this = Self { led: Output::new(mcu.led), polarity: mcu.led_polarity() };
        this.set_led(false);
        this
    }

    /// Switches the status LED.
    pub fn set_led(&mut self, on: bool) {
        if let Some(led) = &mut self.led {
            let _ = led.set_state(PinState::from(on == self.polarity.is_active_high()));
        }
    }
}

impl BoardHooks for AlphaHooks {
    fn invoke_bootloader(&mut self) -> ! {
        self.set_led(false);
        invoke_bootloader()
    }

    fn led_startup(&mut self) {
        self.set_led(true);
    }
}
