//! Supported boards.
//!
//! Each board module provides `BoardImpl` and constructors for the link
//! transport of the main image and the bootloader. [`NAMES`] lists all
//! boards and [`visit`] dispatches on a board name.

use crate::board::Board;

/// Operation generic over the board type.
pub trait BoardVisitor {
    /// Result of the operation.
    type Output;

    /// Runs the operation for board `B`.
    fn visit<B: Board>(self) -> Self::Output;
}

include!(concat!(env!("OUT_DIR"), "/board_mods.rs"));
