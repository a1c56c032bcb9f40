//! File system mount table.
//!
//! The root mount `/` must be the last entry before the terminator and must be
//! read-only.

use core::fmt;

use crate::{
    devfs::{DeviceEntry, DeviceTable},
    table::{fmt_mode, str_eq, TableError},
};

bitflags::bitflags! {
    /// Access rights of a mount.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Access: u16 {
        /// Read access for owner, group and others.
        const READ = 0o444;
        /// Write access for owner, group and others.
        const WRITE = 0o222;
        /// Execute and search access for owner, group and others.
        const EXEC = 0o111;
        /// Full access.
        const ALL = Self::READ.bits() | Self::WRITE.bits() | Self::EXEC.bits();
        /// Read-only access.
        const READ_ONLY = Self::READ.bits() | Self::EXEC.bits();
    }
}

impl Access {
    /// Whether no write access is granted.
    pub const fn is_read_only(&self) -> bool {
        self.bits() & Self::WRITE.bits() == 0
    }
}

/// Stratify flash file system configuration.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SffsCfg {
    /// Name of the backing block device.
    pub device: &'static str,
    /// Device table containing the backing device.
    pub devfs: &'static DeviceTable,
}

/// File system behind a mount.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Filesystem {
    /// No file system; used by the terminator.
    None,
    /// Applications in RAM or flash, stored on a memory device.
    AppFs(&'static DeviceEntry),
    /// Device nodes of a device table.
    DevFs(&'static DeviceTable),
    /// Stratify flash file system.
    Sffs(&'static SffsCfg),
    /// Root directory listing all other mounts of the table.
    Root,
}

impl Filesystem {
    /// File system name.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::AppFs(_) => "appfs",
            Self::DevFs(_) => "devfs",
            Self::Sffs(_) => "sffs",
            Self::Root => "sysfs",
        }
    }
}

/// Mount table entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Mount {
    /// Mount path.
    pub path: &'static str,
    /// File system.
    pub fs: Filesystem,
    /// Access rights.
    pub access: Access,
}

impl Mount {
    /// Table terminator.
    pub const TERMINATOR: Self = Self { path: "", fs: Filesystem::None, access: Access::empty() };

    /// Path of the root mount.
    pub const ROOT_PATH: &'static str = "/";

    /// Creates a mount.
    pub const fn new(path: &'static str, fs: Filesystem, access: Access) -> Self {
        Self { path, fs, access }
    }

    /// Read-only root mount.
    pub const fn root() -> Self {
        Self::new(Self::ROOT_PATH, Filesystem::Root, Access::READ_ONLY)
    }

    /// Whether this is the table terminator.
    pub const fn is_terminator(&self) -> bool {
        matches!(self.fs, Filesystem::None)
    }

    /// Whether this is the root mount.
    pub const fn is_root(&self) -> bool {
        str_eq(self.path, Self::ROOT_PATH) && matches!(self.fs, Filesystem::Root)
    }
}

impl fmt::Display for Mount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "d")?;
        fmt_mode(f, self.access.bits())?;
        write!(f, " {:<5} {}", self.fs.name(), self.path)?;
        match self.fs {
            Filesystem::AppFs(dev) => write!(f, " (on /dev/{})", dev.name),
            Filesystem::Sffs(cfg) => write!(f, " (on /dev/{})", cfg.device),
            _ => Ok(()),
        }
    }
}

/// Terminated mount table.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MountTable {
    entries: &'static [Mount],
}

impl MountTable {
    /// Creates a mount table from entries ending with [`Mount::TERMINATOR`].
    ///
    /// Panics if the table is invalid, which fails the build when used in a constant.
    pub const fn new(entries: &'static [Mount]) -> Self {
        match Self::check(entries) {
            Ok(()) => Self { entries },
            Err(TableError::MissingTerminator) => panic!("mount table is not terminated"),
            Err(TableError::MisplacedTerminator(_)) => panic!("mount table terminator is not last"),
            Err(TableError::MissingRoot) => panic!("mount table has no root mount"),
            Err(TableError::RootNotLast(_)) => panic!("root mount is not last"),
            Err(TableError::WritableRoot) => panic!("root mount is writable"),
            Err(TableError::MisplacedRoot(_)) => panic!("root file system and root path do not match"),
            Err(_) => panic!("invalid mount table"),
        }
    }

    /// Creates a mount table, returning an error if it is invalid.
    pub const fn try_new(entries: &'static [Mount]) -> Result<Self, TableError> {
        match Self::check(entries) {
            Ok(()) => Ok(Self { entries }),
            Err(err) => Err(err),
        }
    }

    /// Checks terminator, root placement and access, and path uniqueness.
    pub const fn check(entries: &[Mount]) -> Result<(), TableError> {
        let len = entries.len();
        if len == 0 || !entries[len - 1].is_terminator() {
            return Err(TableError::MissingTerminator);
        }

        let mut i = 0;
        while i < len - 1 {
            let mount = &entries[i];
            if mount.is_terminator() {
                return Err(TableError::MisplacedTerminator(i));
            }
            if mount.path.is_empty() {
                return Err(TableError::EmptyName(i));
            }
            if str_eq(mount.path, Mount::ROOT_PATH) != matches!(mount.fs, Filesystem::Root) {
                return Err(TableError::MisplacedRoot(i));
            }
            if mount.is_root() && i != len - 2 {
                return Err(TableError::RootNotLast(i));
            }

            let mut j = 0;
            while j < i {
                if str_eq(mount.path, entries[j].path) {
                    return Err(TableError::DuplicateName(i));
                }
                j += 1;
            }

            i += 1;
        }

        if len < 2 || !entries[len - 2].is_root() {
            return Err(TableError::MissingRoot);
        }
        if !entries[len - 2].access.is_read_only() {
            return Err(TableError::WritableRoot);
        }

        Ok(())
    }

    /// Entries including the terminator.
    pub const fn raw(&self) -> &'static [Mount] {
        self.entries
    }

    /// Mounts without the terminator.
    pub fn entries(&self) -> &'static [Mount] {
        &self.entries[..self.len()]
    }

    /// Number of mounts.
    pub const fn len(&self) -> usize {
        self.entries.len() - 1
    }

    /// Whether the table is empty, which a valid table never is.
    pub const fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Iterates over the mounts.
    pub fn iter(&self) -> impl Iterator<Item = &'static Mount> {
        self.entries().iter()
    }

    /// Mount with the specified path.
    pub fn find(&self, path: &str) -> Option<&'static Mount> {
        self.iter().find(|mount| mount.path == path)
    }

    /// The root mount.
    pub fn root(&self) -> &'static Mount {
        &self.entries[self.len() - 1]
    }

    /// The device table mounted as devfs, if any.
    pub fn devfs(&self) -> Option<&'static DeviceTable> {
        self.iter().find_map(|mount| match mount.fs {
            Filesystem::DevFs(table) => Some(table),
            _ => None,
        })
    }
}
