//! Board.

use core::fmt;

use crate::{
    config::{dev_name, McuBoardConfig, SosBoardConfig},
    devfs::{DeviceTable, Driver},
    link::{ConnectSpec, UsbAttr, DEFAULT_TIMEOUT_MS},
    sysfs::{Filesystem, MountTable},
    table::TableError,
};

/// Board-specific configuration.
pub trait Board {
    /// Board model.
    const MODEL: &'static str;

    /// MCU configuration.
    const MCU: McuBoardConfig;

    /// Operating system configuration.
    const SOS: SosBoardConfig;

    /// Devices exposed below `/dev`.
    const DEVICES: DeviceTable;

    /// File system mounts.
    const MOUNTS: MountTable;

    /// USB connect line, if the pull-up is switched.
    const USB_CONNECT: Option<ConnectSpec> = None;

    /// Timeout of link transactions in milliseconds.
    const LINK_TIMEOUT_MS: u32 = DEFAULT_TIMEOUT_MS;

    /// Attributes for bringing up USB in device mode.
    fn usb_attr() -> UsbAttr {
        UsbAttr::device(Self::MCU.usb_pins, Self::MCU.core_osc_freq)
    }
}

/// Inconsistent board configuration.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Scheduler has no task slots.
    NoTasks,
    /// Standard I/O device is not in the device table.
    MissingStdio(&'static str),
    /// Timer reserved for the microsecond clock is exposed as device.
    UsecondTimerExposed(u8),
    /// The devfs mount does not show the board's device table.
    DevfsMismatch,
    /// Device backing a file system is not in the device table.
    MissingDevice(&'static str),
    /// Registration table is invalid.
    Table(TableError),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoTasks => write!(f, "scheduler has no task slots"),
            Self::MissingStdio(path) => write!(f, "stdio device {path} does not exist"),
            Self::UsecondTimerExposed(port) => write!(f, "microsecond timer tmr{port} is exposed"),
            Self::DevfsMismatch => write!(f, "devfs mount does not show board devices"),
            Self::MissingDevice(name) => write!(f, "device {name} does not exist"),
            Self::Table(err) => write!(f, "invalid table: {err}"),
        }
    }
}

impl From<TableError> for ConfigError {
    fn from(err: TableError) -> Self {
        Self::Table(err)
    }
}

/// Board configuration handed to the operating system's boot sequencer.
#[derive(Debug)]
pub struct BoardSupport<L> {
    /// Board model.
    pub model: &'static str,
    /// MCU configuration.
    pub mcu: McuBoardConfig,
    /// Operating system configuration.
    pub sos: SosBoardConfig,
    /// Device table.
    pub devices: DeviceTable,
    /// Mount table.
    pub mounts: MountTable,
    /// Link transport driver, started by the start thread.
    pub link: L,
}

impl<L> BoardSupport<L> {
    /// Board support for board `B` using the specified link transport driver.
    pub fn new<B: Board>(link: L) -> Self {
        Self { model: B::MODEL, mcu: B::MCU, sos: B::SOS, devices: B::DEVICES, mounts: B::MOUNTS, link }
    }

    /// Cross-checks configuration and tables.
    pub fn validate(&self) -> Result<(), ConfigError> {
        DeviceTable::check(self.devices.raw())?;
        MountTable::check(self.mounts.raw())?;

        if self.sos.task_total == 0 {
            return Err(ConfigError::NoTasks);
        }

        for path in self.sos.stdio_devs() {
            match dev_name(path) {
                Some(name) if self.devices.contains(name) => (),
                _ => return Err(ConfigError::MissingStdio(path)),
            }
        }

        let tmr = self.sos.clk_usecond_tmr;
        if self.devices.iter().any(|dev| dev.driver == Driver::McuTmr && dev.port == tmr) {
            return Err(ConfigError::UsecondTimerExposed(tmr));
        }

        for mount in self.mounts.iter() {
            match mount.fs {
                Filesystem::DevFs(table) if *table != self.devices => return Err(ConfigError::DevfsMismatch),
                Filesystem::AppFs(dev) if self.devices.find(dev.name) != Some(dev) => {
                    return Err(ConfigError::MissingDevice(dev.name))
                }
                Filesystem::Sffs(cfg) if !self.devices.contains(cfg.device) => {
                    return Err(ConfigError::MissingDevice(cfg.device))
                }
                Filesystem::Sffs(cfg) if *cfg.devfs != self.devices => return Err(ConfigError::DevfsMismatch),
                _ => (),
            }
        }

        Ok(())
    }

    /// Logs the board header.
    pub fn log_summary(&self) {
        info!("{} {} ({})", self.sos.sys_name, self.sos.sys_version, self.model);
        info!("board support {}", crate::VERSION);
        info!("system id {}", self.sos.sys_id);
        info!(
            "core {} MHz, oscillator {} MHz, {} tasks",
            self.mcu.core_cpu_freq / 1_000_000,
            self.mcu.core_osc_freq / 1_000_000,
            self.sos.task_total
        );
        info!("{} devices, {} mounts", self.devices.len(), self.mounts.len());
        for mount in self.mounts.iter() {
            debug!("mount {} ({})", mount.path, mount.fs.name());
        }
    }
}
