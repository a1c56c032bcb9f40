//! Stratify Alpha board.
//
// ALPHA-BOARD-VERSION: 1
// ALPHA-MCU: lpc1769
// ALPHA-TARGET: thumbv7m-none-eabi
//

use embedded_hal::digital::v2::OutputPin;

use crate::{
    board::Board,
    config::{McuBoardConfig, McuFlags, SosBoardConfig, SysFlags},
    devfs::{DeviceCfg, DeviceEntry, DeviceTable, Driver, FifoCfg, UartFifoCfg},
    link::{
        ConnectSpec, DelegatedConnect, Framing, LinkFlags, LinkTransportDriver, PinConnect, PioFs, PioIoctlConnect,
        UsbTransport,
    },
    pin::{McuPin, Polarity},
    sysfs::{Access, Filesystem, Mount, MountTable},
};

/// Core clock in Hz.
pub const SYSTEM_CLOCK: u32 = 120_000_000;

/// Memory reserved for the system in bytes.
pub const SYSTEM_MEMORY_SIZE: u32 = 8192 * 2;

/// Number of scheduler task slots.
pub const TASK_TOTAL: usize = 10;

/// Size of the stdio FIFOs in bytes.
pub const STDIO_BUFFER_SIZE: usize = 128;

/// USB pull-up switch.
pub const USB_CONNECT: ConnectSpec = ConnectSpec::new(McuPin::new(1, 19), Polarity::ActiveHigh);

/// MCU configuration.
pub const MCU: McuBoardConfig = McuBoardConfig {
    core_osc_freq: 12_000_000,
    core_cpu_freq: SYSTEM_CLOCK,
    core_periph_freq: SYSTEM_CLOCK,
    usb_max_packet_zero: 64,
    debug_uart_pins: [McuPin::new(0, 2), McuPin::new(0, 3)],
    usb_pins: [McuPin::new(0, 29), McuPin::new(0, 30), McuPin::UNUSED, McuPin::UNUSED],
    flags: McuFlags::empty(),
    led: McuPin::new(1, 18),
};

/// Operating system configuration.
pub const SOS: SosBoardConfig = SosBoardConfig {
    clk_usecond_tmr: 3,
    task_total: TASK_TOTAL,
    stdin_dev: "/dev/stdio-in",
    stdout_dev: "/dev/stdio-out",
    stderr_dev: "/dev/stdio-out",
    sys_flags: SysFlags::STDIO_FIFO,
    sys_name: "Stratify Alpha",
    sys_version: "1.3",
    sys_id: "-KZKdVwMXIj6vTVsbX56",
    sys_memory_size: SYSTEM_MEMORY_SIZE,
    ..SosBoardConfig::new(SYSTEM_CLOCK)
};

const UART0_FIFO: UartFifoCfg = UartFifoCfg { port: 0, size: 128 };
const STDIO_OUT: FifoCfg = FifoCfg { size: STDIO_BUFFER_SIZE };
const STDIO_IN: FifoCfg = FifoCfg { size: STDIO_BUFFER_SIZE };

#[cfg(feature = "external-flash")]
const DISK0: crate::devfs::Sst25vfCfg = crate::devfs::Sst25vfCfg {
    cs: McuPin::new(0, 6),
    hold: McuPin::UNUSED,
    wp: McuPin::UNUSED,
    miso: McuPin::new(0, 8),
    size: 2 * 1024 * 1024,
    freq: 10_000_000,
};

/// Index of the application memory device.
const MEM_DEV: usize = 0;

macro_rules! device_entries {
    ($($extra:expr,)*) => {
        &[
            DeviceEntry::block("mem0", Driver::McuMem, 0),
            DeviceEntry::char("core", Driver::McuCore, 0),
            DeviceEntry::char("core0", Driver::McuCore, 0),
            DeviceEntry::char("adc0", Driver::McuAdc, 0),
            DeviceEntry::char("dac0", Driver::McuDac, 0),
            DeviceEntry::char("eint0", Driver::McuEint, 0),
            DeviceEntry::char("eint1", Driver::McuEint, 1),
            DeviceEntry::char("eint2", Driver::McuEint, 2),
            DeviceEntry::char("eint3", Driver::McuEint, 3),
            DeviceEntry::char("pio0", Driver::McuPio, 0),
            DeviceEntry::char("pio1", Driver::McuPio, 1),
            DeviceEntry::char("pio2", Driver::McuPio, 2),
            DeviceEntry::char("pio3", Driver::McuPio, 3),
            DeviceEntry::char("pio4", Driver::McuPio, 4),
            DeviceEntry::char("i2c0", Driver::McuI2c, 0),
            DeviceEntry::char("i2c1", Driver::McuI2c, 1),
            DeviceEntry::char("i2c2", Driver::McuI2c, 2),
            DeviceEntry::block("pwm1", Driver::McuPwm, 1),
            DeviceEntry::char("qei0", Driver::McuQei, 0),
            DeviceEntry::char("rtc", Driver::McuRtc, 0),
            DeviceEntry::char("spi0", Driver::McuSsp, 0),
            DeviceEntry::char("spi1", Driver::McuSsp, 1),
            DeviceEntry::char("spi2", Driver::McuSsp, 2),
            // tmr3 is the microsecond clock
            DeviceEntry::char("tmr0", Driver::McuTmr, 0),
            DeviceEntry::char("tmr1", Driver::McuTmr, 1),
            DeviceEntry::char("tmr2", Driver::McuTmr, 2),
            DeviceEntry::char("uart0", Driver::UartFifo, 0).with_cfg(DeviceCfg::UartFifo(&UART0_FIFO)),
            DeviceEntry::char("uart1", Driver::McuUart, 1),
            DeviceEntry::char("uart2", Driver::McuUart, 2),
            DeviceEntry::char("usb0", Driver::McuUsb, 0),
            $($extra,)*
            DeviceEntry::char("stdio-out", Driver::Fifo, 0).with_cfg(DeviceCfg::Fifo(&STDIO_OUT)),
            DeviceEntry::char("stdio-in", Driver::Fifo, 0).with_cfg(DeviceCfg::Fifo(&STDIO_IN)),
            DeviceEntry::char("link-phy-usb", Driver::UsbFifo, 0).with_cfg(DeviceCfg::LinkUsbFifo),
            DeviceEntry::char("sys", Driver::Sys, 0),
            DeviceEntry::TERMINATOR,
        ]
    };
}

#[cfg(not(feature = "external-flash"))]
const DEVICE_ENTRIES: &[DeviceEntry] = device_entries!();

#[cfg(feature = "external-flash")]
const DEVICE_ENTRIES: &[DeviceEntry] =
    device_entries!(DeviceEntry::block("disk0", Driver::Sst25vf, 1).with_cfg(DeviceCfg::Sst25vf(&DISK0)),);

/// Devices exposed below `/dev`.
pub const DEVICES: DeviceTable = DeviceTable::new(DEVICE_ENTRIES);

#[cfg(feature = "external-flash")]
const SFFS: crate::sysfs::SffsCfg = crate::sysfs::SffsCfg { device: "disk0", devfs: &DEVICES };

macro_rules! mount_entries {
    ($($extra:expr,)*) => {
        &[
            Mount::new("/app", Filesystem::AppFs(&DEVICE_ENTRIES[MEM_DEV]), Access::ALL),
            Mount::new("/dev", Filesystem::DevFs(&DEVICES), Access::READ_ONLY),
            $($extra,)*
            Mount::root(),
            Mount::TERMINATOR,
        ]
    };
}

#[cfg(not(feature = "external-flash"))]
const MOUNT_ENTRIES: &[Mount] = mount_entries!();

#[cfg(feature = "external-flash")]
const MOUNT_ENTRIES: &[Mount] = mount_entries!(Mount::new("/home", Filesystem::Sffs(&SFFS), Access::ALL),);

/// File system mounts.
pub const MOUNTS: MountTable = MountTable::new(MOUNT_ENTRIES);

/// Stratify Alpha board.
pub struct BoardImpl;

impl Board for BoardImpl {
    const MODEL: &'static str = "stratify-alpha";
    const MCU: McuBoardConfig = MCU;
    const SOS: SosBoardConfig = SOS;
    const DEVICES: DeviceTable = DEVICES;
    const MOUNTS: MountTable = MOUNTS;
    const USB_CONNECT: Option<ConnectSpec> = Some(USB_CONNECT);
}

/// Link transport of the main image.
pub type LinkTransport<U, F> = LinkTransportDriver<PioIoctlConnect<U, F>>;

/// Link transport of the bootloader.
pub type BootLinkTransport<U> = LinkTransportDriver<DelegatedConnect<U>>;

/// Link transport of the main image, switching the USB pull-up through `/dev/pio1`.
pub fn link_transport<U: UsbTransport, F: PioFs>(usb: U, pio: F) -> LinkTransport<U, F> {
    LinkTransportDriver::new(PioIoctlConnect::new(usb, pio, BoardImpl::usb_attr(), USB_CONNECT))
        .with_timeout(BoardImpl::LINK_TIMEOUT_MS)
}

/// Link transport of the main image for images that own the pull-up GPIO.
pub fn pin_link_transport<U: UsbTransport, P: OutputPin>(usb: U, pin: P) -> LinkTransportDriver<PinConnect<U, P>> {
    LinkTransportDriver::new(PinConnect::new(usb, BoardImpl::usb_attr(), pin, USB_CONNECT.polarity))
        .with_timeout(BoardImpl::LINK_TIMEOUT_MS)
}

/// Link transport of the bootloader.
///
/// The USB transport sequences the pull-up. Checksums are disabled since USB
/// checksums packets on its own.
pub fn boot_link_transport<U: UsbTransport>(usb: U) -> BootLinkTransport<U> {
    LinkTransportDriver::new(DelegatedConnect::new(usb, BoardImpl::usb_attr(), USB_CONNECT))
        .with_timeout(BoardImpl::LINK_TIMEOUT_MS)
        .with_flags(LinkFlags::empty())
        .with_framing(Framing::Link1Slave)
}
