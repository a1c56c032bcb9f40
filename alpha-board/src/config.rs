//! Board configuration consumed by the operating system at boot.

use crate::pin::{McuPin, Polarity};

bitflags::bitflags! {
    /// MCU board configuration flags.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct McuFlags: u32 {
        /// Status LED lights up when its pin is driven high.
        const LED_ACTIVE_HIGH = 1 << 0;
    }
}

bitflags::bitflags! {
    /// System flags.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct SysFlags: u32 {
        /// Standard input and output are FIFO devices.
        const STDIO_FIFO = 1 << 0;
    }
}

/// MCU configuration: clocks and fixed pin assignments.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct McuBoardConfig {
    /// Crystal oscillator frequency in Hz.
    pub core_osc_freq: u32,
    /// CPU clock frequency in Hz.
    pub core_cpu_freq: u32,
    /// Peripheral clock frequency in Hz.
    pub core_periph_freq: u32,
    /// Maximum packet size of USB endpoint zero.
    pub usb_max_packet_zero: u16,
    /// Debug UART pins (TX, RX).
    pub debug_uart_pins: [McuPin; 2],
    /// USB pins (D+, D-, VBUS, ID).
    pub usb_pins: [McuPin; 4],
    /// Flags.
    pub flags: McuFlags,
    /// Status LED.
    pub led: McuPin,
}

impl McuBoardConfig {
    /// Polarity of the status LED.
    pub const fn led_polarity(&self) -> Polarity {
        Polarity::from_active_high(self.flags.bits() & McuFlags::LED_ACTIVE_HIGH.bits() != 0)
    }
}

/// Operating system configuration: scheduler, clocks, stdio and identity.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SosBoardConfig {
    /// Timer reserved for the microsecond clock.
    pub clk_usecond_tmr: u8,
    /// Number of scheduler task slots.
    pub task_total: usize,
    /// Core clock ticks per microsecond.
    pub clk_usec_mult: u32,
    /// Nanoseconds per 1024 core clock ticks.
    pub clk_nsec_div: u32,
    /// Standard input device path.
    pub stdin_dev: &'static str,
    /// Standard output device path.
    pub stdout_dev: &'static str,
    /// Standard error device path.
    pub stderr_dev: &'static str,
    /// System flags.
    pub sys_flags: SysFlags,
    /// System name.
    pub sys_name: &'static str,
    /// System version.
    pub sys_version: &'static str,
    /// System id.
    pub sys_id: &'static str,
    /// Memory reserved for the system in bytes.
    pub sys_memory_size: u32,
    /// Stack size of the start thread in bytes.
    pub start_stack_size: u32,
}

impl SosBoardConfig {
    /// Default stack size of the start thread.
    pub const DEFAULT_START_STACK_SIZE: u32 = 2048;

    /// Configuration for the specified core clock with a single task slot and
    /// FIFO stdio devices.
    ///
    /// Boards override the remaining fields using struct update syntax.
    pub const fn new(sys_clock: u32) -> Self {
        Self {
            clk_usecond_tmr: 0,
            task_total: 1,
            clk_usec_mult: Self::clk_usec_mult(sys_clock),
            clk_nsec_div: Self::clk_nsec_div(sys_clock),
            stdin_dev: "/dev/stdio-in",
            stdout_dev: "/dev/stdio-out",
            stderr_dev: "/dev/stdio-out",
            sys_flags: SysFlags::STDIO_FIFO,
            sys_name: "",
            sys_version: "",
            sys_id: "",
            sys_memory_size: 0,
            start_stack_size: Self::DEFAULT_START_STACK_SIZE,
        }
    }

    /// Core clock ticks per microsecond.
    pub const fn clk_usec_mult(sys_clock: u32) -> u32 {
        sys_clock / 1_000_000
    }

    /// Lowest core clock in Hz whose `clk_nsec_div` fits into 32 bits.
    pub const MIN_SYS_CLOCK: u32 = 239;

    /// Nanoseconds per 1024 core clock ticks.
    ///
    /// Panics if `sys_clock` is below [`Self::MIN_SYS_CLOCK`].
    pub const fn clk_nsec_div(sys_clock: u32) -> u32 {
        assert!(sys_clock >= Self::MIN_SYS_CLOCK, "core clock too low for nanosecond timing");
        (1024 * 1_000_000_000u64 / sys_clock as u64) as u32
    }

    /// Paths of the stdio devices (stdin, stdout, stderr).
    pub const fn stdio_devs(&self) -> [&'static str; 3] {
        [self.stdin_dev, self.stdout_dev, self.stderr_dev]
    }
}

/// Device name of a path below `/dev`.
pub fn dev_name(path: &str) -> Option<&str> {
    path.strip_prefix("/dev/").filter(|name| !name.is_empty() && !name.contains('/'))
}
