//! Checks shared by the registration tables.

use core::fmt;

/// Invalid registration table.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TableError {
    /// Last element is not the terminator.
    MissingTerminator,
    /// Terminator found before the end of the table.
    MisplacedTerminator(usize),
    /// Entry has an empty name or path.
    EmptyName(usize),
    /// Name or path already used by an earlier entry.
    DuplicateName(usize),
    /// Table has no root mount.
    MissingRoot,
    /// Root mount is not the last entry.
    RootNotLast(usize),
    /// Root mount is writable.
    WritableRoot,
    /// Root file system mounted elsewhere than `/`, or `/` backed by another file system.
    MisplacedRoot(usize),
}

impl fmt::Display for TableError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingTerminator => write!(f, "table is not terminated"),
            Self::MisplacedTerminator(i) => write!(f, "terminator at entry {i} is not last"),
            Self::EmptyName(i) => write!(f, "entry {i} has no name"),
            Self::DuplicateName(i) => write!(f, "name of entry {i} is not unique"),
            Self::MissingRoot => write!(f, "root mount is missing"),
            Self::RootNotLast(i) => write!(f, "root mount at entry {i} is not last"),
            Self::WritableRoot => write!(f, "root mount is writable"),
            Self::MisplacedRoot(i) => write!(f, "entry {i} mixes up the root path and the root file system"),
        }
    }
}

/// Compares two strings in const context.
pub(crate) const fn str_eq(a: &str, b: &str) -> bool {
    let (a, b) = (a.as_bytes(), b.as_bytes());
    if a.len() != b.len() {
        return false;
    }

    let mut i = 0;
    while i < a.len() {
        if a[i] != b[i] {
            return false;
        }
        i += 1;
    }
    true
}

/// Formats permission bits like `ls -l`.
pub(crate) fn fmt_mode(f: &mut fmt::Formatter<'_>, mode: u16) -> fmt::Result {
    const CHARS: [char; 3] = ['r', 'w', 'x'];
    for bit in (0..9).rev() {
        let c = if mode & (1 << bit) != 0 { CHARS[2 - bit % 3] } else { '-' };
        write!(f, "{c}")?;
    }
    Ok(())
}
