//! Generic board without a switched USB pull-up.
//
// ALPHA-BOARD-VERSION: 1
// ALPHA-MCU: lpc1769
// ALPHA-TARGET: thumbv7m-none-eabi
//

use crate::{
    board::Board,
    config::{McuBoardConfig, McuFlags, SosBoardConfig},
    devfs::{DeviceCfg, DeviceEntry, DeviceTable, Driver, FifoCfg},
    link::{Framing, LinkFlags, LinkTransportDriver, UnswitchedConnect, UsbTransport},
    pin::McuPin,
    sysfs::{Access, Filesystem, Mount, MountTable},
};

const SYSTEM_CLOCK: u32 = 96_000_000;

const STDIO: FifoCfg = FifoCfg { size: 64 };

const DEVICE_ENTRIES: &[DeviceEntry] = &[
    DeviceEntry::char("core", Driver::McuCore, 0),
    DeviceEntry::char("stdio-out", Driver::Fifo, 0).with_cfg(DeviceCfg::Fifo(&STDIO)),
    DeviceEntry::char("stdio-in", Driver::Fifo, 0).with_cfg(DeviceCfg::Fifo(&STDIO)),
    DeviceEntry::char("link-phy-usb", Driver::UsbFifo, 0).with_cfg(DeviceCfg::LinkUsbFifo),
    DeviceEntry::char("sys", Driver::Sys, 0),
    DeviceEntry::TERMINATOR,
];

const DEVICES: DeviceTable = DeviceTable::new(DEVICE_ENTRIES);

const MOUNT_ENTRIES: &[Mount] =
    &[Mount::new("/dev", Filesystem::DevFs(&DEVICES), Access::READ_ONLY), Mount::root(), Mount::TERMINATOR];

/// Generic board.
pub struct BoardImpl;

impl Board for BoardImpl {
    const MODEL: &'static str = "generic";
    const MCU: McuBoardConfig = McuBoardConfig {
        core_osc_freq: 12_000_000,
        core_cpu_freq: SYSTEM_CLOCK,
        core_periph_freq: SYSTEM_CLOCK,
        usb_max_packet_zero: 64,
        debug_uart_pins: [McuPin::UNUSED; 2],
        usb_pins: [McuPin::new(0, 29), McuPin::new(0, 30), McuPin::UNUSED, McuPin::UNUSED],
        flags: McuFlags::LED_ACTIVE_HIGH,
        led: McuPin::UNUSED,
    };
    const SOS: SosBoardConfig = SosBoardConfig {
        task_total: 4,
        sys_name: "Generic",
        sys_version: "1.0",
        sys_memory_size: 8192,
        ..SosBoardConfig::new(SYSTEM_CLOCK)
    };
    const DEVICES: DeviceTable = DEVICES;
    const MOUNTS: MountTable = MountTable::new(MOUNT_ENTRIES);
}

/// Link transport of the main image.
pub fn link_transport<U: UsbTransport>(usb: U) -> LinkTransportDriver<UnswitchedConnect<U>> {
    LinkTransportDriver::new(UnswitchedConnect::new(usb, BoardImpl::usb_attr())).with_timeout(BoardImpl::LINK_TIMEOUT_MS)
}

/// Link transport of the bootloader.
pub fn boot_link_transport<U: UsbTransport>(usb: U) -> LinkTransportDriver<UnswitchedConnect<U>> {
    link_transport(usb).with_flags(LinkFlags::empty()).with_framing(Framing::Link1Slave)
}
