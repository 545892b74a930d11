//! Grid cells.

use bitflags::bitflags;
use mudterm_style::Flavor;

bitflags! {
    /// Cell-level flags independent of the flavor.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct CellFlags: u8 {
        /// Leading (left) cell of a 2-column character.
        const WIDE = 1 << 0;
        /// Trailing half of a wide character. Its content is ignored.
        const WIDE_CONTINUATION = 1 << 1;
    }
}

/// One character cell of a [`DisplaySurface`](crate::DisplaySurface).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cell {
    pub ch: char,
    pub flavor: Flavor,
    pub flags: CellFlags,
}

impl Default for Cell {
    fn default() -> Self {
        Self::BLANK
    }
}

impl Cell {
    /// An erased cell.
    pub const BLANK: Self = Self {
        ch: ' ',
        flavor: Flavor::DEFAULT,
        flags: CellFlags::empty(),
    };

    #[must_use]
    pub const fn new(ch: char, flavor: Flavor) -> Self {
        Self {
            ch,
            flavor,
            flags: CellFlags::empty(),
        }
    }

    /// The `(leading, continuation)` pair of a wide character.
    #[must_use]
    pub const fn wide(ch: char, flavor: Flavor) -> (Self, Self) {
        (
            Self {
                ch,
                flavor,
                flags: CellFlags::WIDE,
            },
            Self {
                ch: ' ',
                flavor,
                flags: CellFlags::WIDE_CONTINUATION,
            },
        )
    }

    #[inline]
    #[must_use]
    pub const fn is_wide(&self) -> bool {
        self.flags.contains(CellFlags::WIDE)
    }

    #[inline]
    #[must_use]
    pub const fn is_continuation(&self) -> bool {
        self.flags.contains(CellFlags::WIDE_CONTINUATION)
    }

    pub fn clear(&mut self) {
        *self = Self::BLANK;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_is_default() {
        assert_eq!(Cell::default(), Cell::BLANK);
        assert!(!Cell::BLANK.is_wide());
    }

    #[test]
    fn wide_pair_shares_flavor() {
        let flavor = Flavor::new().bold();
        let (lead, cont) = Cell::wide('日', flavor);
        assert!(lead.is_wide());
        assert!(cont.is_continuation());
        assert_eq!(lead.flavor, cont.flavor);
    }

    #[test]
    fn clear_resets_everything() {
        let (mut lead, _) = Cell::wide('日', Flavor::new().italic());
        lead.clear();
        assert_eq!(lead, Cell::BLANK);
    }
}
