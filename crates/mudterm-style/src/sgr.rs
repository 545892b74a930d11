//! SGR (Select Graphic Rendition) encoding and decoding of flavors.
//!
//! Encoding emits the smallest parameter list that moves a terminal from one
//! flavor to another. Decoding turns a CSI `m` parameter list into a stream of
//! [`SgrChange`]s which can be applied to a running [`Flavor`].

use std::fmt::Write as _;

use crate::flavor::{Color, Flavor, FlavorFlags};

/// Full attribute reset.
pub const RESET: &str = "\x1b[0m";

/// Append the escape sequence that changes `from` into `to`.
///
/// Nothing is written when the flavors are equal or only differ in flags
/// without an SGR code. A transition to the default flavor is always a full
/// reset.
pub fn write_transition(from: Flavor, to: Flavor, out: &mut String) {
    if from == to {
        return;
    }
    if to.is_default() {
        out.push_str(RESET);
        return;
    }

    let mut params: Vec<u16> = Vec::new();
    let cleared = from.flags.difference(to.flags);
    let mut set = to.flags.difference(from.flags);

    // SGR 22 drops bold as well as faint on most terminals.
    if cleared.contains(FlavorFlags::FAINT) && to.flags.contains(FlavorFlags::BOLD) {
        set.insert(FlavorFlags::BOLD);
    }

    for (flag, code) in FlavorFlags::SGR_CODES {
        if cleared.contains(flag) {
            params.push(20 + code);
        }
    }
    for (flag, code) in FlavorFlags::SGR_CODES {
        if set.contains(flag) {
            params.push(code);
        }
    }
    if from.fg != to.fg {
        push_color(&mut params, to.fg, ColorSlot::Foreground);
    }
    if from.bg != to.bg {
        push_color(&mut params, to.bg, ColorSlot::Background);
    }

    if params.is_empty() {
        return;
    }
    out.push_str("\x1b[");
    for (i, p) in params.iter().enumerate() {
        if i > 0 {
            out.push(';');
        }
        let _ = write!(out, "{p}");
    }
    out.push('m');
}

/// The escape sequence that changes `from` into `to`, as an owned string.
#[must_use]
pub fn transition(from: Flavor, to: Flavor) -> String {
    let mut out = String::new();
    write_transition(from, to, &mut out);
    out
}

#[derive(Clone, Copy)]
enum ColorSlot {
    Foreground,
    Background,
}

fn push_color(params: &mut Vec<u16>, color: Color, slot: ColorSlot) {
    let (base, bright, extended, default) = match slot {
        ColorSlot::Foreground => (30, 90, 38, 39),
        ColorSlot::Background => (40, 100, 48, 49),
    };
    match color {
        Color::Default => params.push(default),
        Color::Simple(n) => {
            let n = u16::from(n % 16);
            if n < 8 {
                params.push(base + n);
            } else {
                params.push(bright + n - 8);
            }
        }
        Color::Indexed(n) => params.extend([extended, 5, u16::from(n)]),
        Color::Rgb(r, g, b) => {
            params.extend([extended, 2, u16::from(r), u16::from(g), u16::from(b)]);
        }
    }
}

/// A single attribute change decoded from SGR parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SgrChange {
    /// Reset everything (SGR 0 or an empty parameter list).
    Reset,
    Set(FlavorFlags),
    Clear(FlavorFlags),
    Foreground(Color),
    Background(Color),
}

/// Decode SGR parameters. Unknown parameters are skipped.
pub fn parse_sgr(params: &[u16]) -> impl Iterator<Item = SgrChange> + '_ {
    SgrIterator {
        params,
        index: 0,
        empty: params.is_empty(),
    }
}

struct SgrIterator<'a> {
    params: &'a [u16],
    index: usize,
    empty: bool,
}

impl SgrIterator<'_> {
    fn next_param(&mut self) -> Option<u16> {
        let val = self.params.get(self.index).copied()?;
        self.index += 1;
        Some(val)
    }

    fn extended_color(&mut self) -> Option<Color> {
        match self.next_param()? {
            5 => {
                let n = self.next_param()?;
                Some(Color::Indexed(clamp_u8(n)))
            }
            2 => {
                let r = self.next_param()?;
                let g = self.next_param()?;
                let b = self.next_param()?;
                Some(Color::Rgb(clamp_u8(r), clamp_u8(g), clamp_u8(b)))
            }
            _ => None,
        }
    }
}

fn clamp_u8(v: u16) -> u8 {
    u8::try_from(v).unwrap_or(u8::MAX)
}

fn flag_for_code(code: u16) -> Option<FlavorFlags> {
    FlavorFlags::SGR_CODES
        .iter()
        .find(|(_, c)| *c == code)
        .map(|(flag, _)| *flag)
}

impl Iterator for SgrIterator<'_> {
    type Item = SgrChange;

    fn next(&mut self) -> Option<SgrChange> {
        if self.empty {
            self.empty = false;
            return Some(SgrChange::Reset);
        }
        loop {
            let code = self.next_param()?;
            let change = match code {
                0 => Some(SgrChange::Reset),
                1..=9 => flag_for_code(code).map(SgrChange::Set),
                22 => Some(SgrChange::Clear(FlavorFlags::BOLD | FlavorFlags::FAINT)),
                21 | 23..=29 => flag_for_code(code - 20).map(SgrChange::Clear),
                30..=37 => Some(SgrChange::Foreground(Color::Simple((code - 30) as u8))),
                38 => self.extended_color().map(SgrChange::Foreground),
                39 => Some(SgrChange::Foreground(Color::Default)),
                40..=47 => Some(SgrChange::Background(Color::Simple((code - 40) as u8))),
                48 => self.extended_color().map(SgrChange::Background),
                49 => Some(SgrChange::Background(Color::Default)),
                90..=97 => Some(SgrChange::Foreground(Color::Simple((code - 90 + 8) as u8))),
                100..=107 => Some(SgrChange::Background(Color::Simple((code - 100 + 8) as u8))),
                _ => None,
            };
            if let Some(change) = change {
                return Some(change);
            }
        }
    }
}

impl Flavor {
    /// Apply one decoded change.
    pub fn apply(&mut self, change: SgrChange) {
        match change {
            SgrChange::Reset => *self = Flavor::DEFAULT,
            SgrChange::Set(flags) => self.flags.insert(flags),
            SgrChange::Clear(flags) => self.flags.remove(flags),
            SgrChange::Foreground(color) => self.fg = color,
            SgrChange::Background(color) => self.bg = color,
        }
    }

    /// Apply a whole SGR parameter list.
    pub fn apply_sgr(&mut self, params: &[u16]) {
        for change in parse_sgr(params) {
            self.apply(change);
        }
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn color() -> impl Strategy<Value = Color> {
        prop_oneof![
            Just(Color::Default),
            (0u8..16).prop_map(Color::Simple),
            any::<u8>().prop_map(Color::Indexed),
            any::<(u8, u8, u8)>().prop_map(|(r, g, b)| Color::Rgb(r, g, b)),
        ]
    }

    fn flavor() -> impl Strategy<Value = Flavor> {
        (0u16..0x100, color(), color()).prop_map(|(bits, fg, bg)| Flavor {
            flags: FlavorFlags::from_bits_truncate(bits),
            fg,
            bg,
        })
    }

    fn parse_params(seq: &str) -> Vec<u16> {
        let body = &seq[2..seq.len() - 1];
        if body.is_empty() {
            return Vec::new();
        }
        body.split(';').map(|p| p.parse().unwrap()).collect()
    }

    proptest! {
        #[test]
        fn transition_reaches_target(from in flavor(), to in flavor()) {
            let seq = transition(from, to);
            let mut state = from;
            if !seq.is_empty() {
                state.apply_sgr(&parse_params(&seq));
            }
            prop_assert_eq!(state, to);
        }
    }
}
