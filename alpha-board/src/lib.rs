//
// Stratify Alpha board support
// Copyright (C) 2026 The alpha-board developers
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.
//

//! Stratify Alpha board support.
//!
//! Wires the board's USB and PIO peripherals into the operating system's link
//! transport and declares the device table, file system mounts and scheduler
//! sizes of the bootloader and main images.
//!
//! The operating system is reached only through the traits in [`link`] and
//! [`event`]. The board is selected at build time by the `ALPHA_BOARD`
//! environment variable and available as [`ThisBoard`].

#![cfg_attr(not(test), no_std)]

#[macro_use]
mod fmt;

pub mod board;
pub mod boards;
pub mod config;
pub mod devfs;
pub mod event;
#[cfg(target_arch = "arm")]
pub mod hw;
pub mod link;
pub mod pin;
pub mod sysfs;
pub mod table;

pub use board::{Board, BoardSupport};
pub use boards::Chosen as ThisBoard;

/// Board support version.
///
/// Has the form `<crate version>/<board version>`.
pub static VERSION: &str = include_str!(concat!(env!("OUT_DIR"), "/board_version.txt"));
