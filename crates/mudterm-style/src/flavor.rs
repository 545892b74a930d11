//! Per-character display attributes.
//!
//! A [`Flavor`] is the combination of [`FlavorFlags`] and a foreground and
//! background [`Color`]. Flavors are small `Copy` values; text stores them as
//! runs so that a line of uniformly colored output costs one entry.

use std::ops::{Add, AddAssign};

use bitflags::bitflags;

bitflags! {
    /// Character attribute flags.
    ///
    /// All but [`HIDDEN`](Self::HIDDEN) map to an SGR parameter. Hidden
    /// characters are kept in the text but take no display width.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct FlavorFlags: u16 {
        const BOLD          = 1 << 0;
        const FAINT         = 1 << 1;
        const ITALIC        = 1 << 2;
        const UNDERLINE     = 1 << 3;
        const BLINK         = 1 << 4;
        const INVERSE       = 1 << 5;
        const CONCEAL       = 1 << 6;
        const STRIKETHROUGH = 1 << 7;
        const HIDDEN        = 1 << 8;
    }
}

impl FlavorFlags {
    /// Flags paired with the SGR parameter that enables them.
    ///
    /// The disabling parameter is `20 + code`.
    pub const SGR_CODES: [(FlavorFlags, u16); 8] = [
        (FlavorFlags::BOLD, 1),
        (FlavorFlags::FAINT, 2),
        (FlavorFlags::ITALIC, 3),
        (FlavorFlags::UNDERLINE, 4),
        (FlavorFlags::BLINK, 5),
        (FlavorFlags::INVERSE, 7),
        (FlavorFlags::CONCEAL, 8),
        (FlavorFlags::STRIKETHROUGH, 9),
    ];
}

/// Foreground or background color.
///
/// Mirrors the terminal color hierarchy: default, 16 named colors, the
/// 256-color palette and 24-bit RGB.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Color {
    /// Terminal default (SGR 39 / SGR 49).
    #[default]
    Default,
    /// Named color 0-15: standard 8 followed by bright 8.
    Simple(u8),
    /// 256-color palette index.
    Indexed(u8),
    /// 24-bit true color.
    Rgb(u8, u8, u8),
}

impl Color {
    /// Named color, wrapped into `0..16`.
    #[must_use]
    pub const fn simple(index: u8) -> Self {
        Self::Simple(index % 16)
    }

    #[must_use]
    pub const fn is_default(self) -> bool {
        matches!(self, Self::Default)
    }

    /// `other` wins unless it is the default color.
    #[must_use]
    pub const fn merge(self, other: Color) -> Self {
        if other.is_default() { self } else { other }
    }
}

/// Display attributes of one character.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Flavor {
    pub flags: FlavorFlags,
    pub fg: Color,
    pub bg: Color,
}

macro_rules! flag_accessors {
    ($($(#[$meta:meta])* $set:ident, $is:ident => $flag:ident;)*) => {
        $(
            $(#[$meta])*
            #[must_use]
            pub const fn $set(mut self) -> Self {
                self.flags = self.flags.union(FlavorFlags::$flag);
                self
            }

            #[must_use]
            pub const fn $is(&self) -> bool {
                self.flags.contains(FlavorFlags::$flag)
            }
        )*
    };
}

impl Flavor {
    /// The default flavor: no flags, default colors.
    pub const DEFAULT: Flavor = Flavor {
        flags: FlavorFlags::empty(),
        fg: Color::Default,
        bg: Color::Default,
    };

    #[must_use]
    pub const fn new() -> Self {
        Self::DEFAULT
    }

    flag_accessors! {
        bold, is_bold => BOLD;
        faint, is_faint => FAINT;
        italic, is_italic => ITALIC;
        underline, is_underline => UNDERLINE;
        blink, is_blink => BLINK;
        /// Swap foreground and background when drawn.
        inverse, is_inverse => INVERSE;
        conceal, is_conceal => CONCEAL;
        strikethrough, is_strikethrough => STRIKETHROUGH;
        /// Zero-width, not drawn.
        hidden, is_hidden => HIDDEN;
    }

    #[must_use]
    pub const fn fg(mut self, color: Color) -> Self {
        self.fg = color;
        self
    }

    #[must_use]
    pub const fn bg(mut self, color: Color) -> Self {
        self.bg = color;
        self
    }

    #[must_use]
    pub const fn with_flags(mut self, flags: FlavorFlags) -> Self {
        self.flags = flags;
        self
    }

    #[must_use]
    pub fn is_default(&self) -> bool {
        *self == Self::DEFAULT
    }

    /// Flip the inverse flag. Used for search highlights.
    #[must_use]
    pub const fn toggle_inverse(mut self) -> Self {
        self.flags = self.flags.symmetric_difference(FlavorFlags::INVERSE);
        self
    }

    /// Combine two flavors: flags are OR-ed and non-default colors of `other`
    /// override ours.
    #[must_use]
    pub const fn merge(self, other: Flavor) -> Self {
        Flavor {
            flags: self.flags.union(other.flags),
            fg: self.fg.merge(other.fg),
            bg: self.bg.merge(other.bg),
        }
    }
}

impl Add for Flavor {
    type Output = Flavor;

    fn add(self, rhs: Flavor) -> Flavor {
        self.merge(rhs)
    }
}

impl AddAssign for Flavor {
    fn add_assign(&mut self, rhs: Flavor) {
        *self = self.merge(rhs);
    }
}
