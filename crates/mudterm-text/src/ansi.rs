//! Conversion between [`StyledText`] and text with inline SGR escapes.
//!
//! This is the persisted scrollback format. Only SGR (`CSI ... m`) sequences
//! carry meaning when decoding; other escape sequences are dropped.

use mudterm_style::{Flavor, sgr};

use crate::styled::{StyledSlice, StyledText};

const ESC: char = '\x1b';

/// Encode `text` with SGR escapes at every flavor change.
///
/// Default-flavored text starts with a reset; text ending in a non-default
/// flavor ends with one, so encoded lines never leak attributes into each
/// other.
#[must_use]
pub fn to_ansi(text: &StyledText) -> String {
    slice_to_ansi(text.as_slice())
}

/// [`to_ansi`] for a borrowed view.
#[must_use]
pub fn slice_to_ansi(text: StyledSlice<'_>) -> String {
    let mut out = String::with_capacity(text.len() + 16);
    let mut current: Option<Flavor> = None;
    for chunk in text.chunks() {
        match current {
            None if chunk.flavor.is_default() => out.push_str(sgr::RESET),
            None => sgr::write_transition(Flavor::DEFAULT, chunk.flavor, &mut out),
            Some(prev) => sgr::write_transition(prev, chunk.flavor, &mut out),
        }
        out.extend(chunk.text.iter());
        current = Some(chunk.flavor);
    }
    if current.is_some_and(|f| !f.is_default()) {
        out.push_str(sgr::RESET);
    }
    out
}

/// Decode text with inline escapes.
///
/// Carriage returns are dropped. If the escapes leave a flavor different
/// from the last character's, it becomes the trailing flavor.
#[must_use]
pub fn from_ansi(input: &str) -> StyledText {
    let mut out = StyledText::new();
    let mut flavor = Flavor::DEFAULT;
    let mut chars = input.chars().peekable();
    let mut params: Vec<u16> = Vec::new();

    while let Some(ch) = chars.next() {
        match ch {
            ESC => match chars.next() {
                Some('[') => {
                    params.clear();
                    let mut current: Option<u16> = None;
                    let mut final_byte = None;
                    for c in chars.by_ref() {
                        match c {
                            '0'..='9' => {
                                let digit = u16::from(c as u8 - b'0');
                                current = Some(
                                    current.unwrap_or(0).saturating_mul(10).saturating_add(digit),
                                );
                            }
                            ';' | ':' => params.push(current.take().unwrap_or(0)),
                            '\u{40}'..='\u{7e}' => {
                                final_byte = Some(c);
                                break;
                            }
                            _ => {}
                        }
                    }
                    if let Some(p) = current {
                        params.push(p);
                    }
                    if final_byte == Some('m') {
                        flavor.apply_sgr(&params);
                    }
                }
                Some(']') => {
                    // OSC: skip to BEL or ST.
                    while let Some(c) = chars.next() {
                        if c == '\x07' {
                            break;
                        }
                        if c == ESC && chars.peek() == Some(&'\\') {
                            chars.next();
                            break;
                        }
                    }
                }
                _ => {}
            },
            '\r' => {}
            _ => out.push(ch, flavor),
        }
    }

    if out.last_flavor() != Some(flavor) && !(out.is_empty() && flavor.is_default()) {
        out.set_trailing_flavor(Some(flavor));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use mudterm_style::Color;

    #[test]
    fn default_flavor_starts_with_reset() {
        assert_eq!(
            to_ansi(&StyledText::plain("Take my love")),
            "\x1b[0mTake my love"
        );
    }

    #[test]
    fn changing_flags() {
        let mut text = StyledText::new();
        text.push_str("Take ", Flavor::new().bold());
        text.push_str("my ", Flavor::new().bold().italic());
        text.push_str("love", Flavor::new().italic());
        assert_eq!(
            to_ansi(&text),
            "\x1b[1mTake \x1b[3mmy \x1b[21mlove\x1b[0m"
        );
    }

    #[test]
    fn empty_text_encodes_to_nothing() {
        assert_eq!(to_ansi(&StyledText::new()), "");
    }

    #[test]
    fn decodes_simple_ansi() {
        let line = from_ansi("\x1b[1;36mTake my \x1b[1;32mlove");
        let mut expected = StyledText::new();
        expected.push_str("Take my ", Flavor::new().bold().fg(Color::simple(6)));
        expected.push_str("love", Flavor::new().bold().fg(Color::simple(2)));
        assert_eq!(line, expected);
        assert_eq!(line.trailing_flavor(), None);
    }

    #[test]
    fn trailing_escape_becomes_trailing_flavor() {
        let line = from_ansi("\x1b[1;36mTake my \x1b[1;32m");
        assert_eq!(line.to_string(), "Take my ");
        assert_eq!(
            line.trailing_flavor(),
            Some(Flavor::new().bold().fg(Color::simple(2)))
        );
    }

    #[test]
    fn trailing_flavor_with_only_escapes() {
        let raw = "\x1b[48;5;234m  \x1b[0;38;5;007;48;5;000m\r\x1b[38;5;000;48;5;232m";
        let line = from_ansi(raw);
        assert_eq!(line.len(), 2);
        assert_eq!(
            line.trailing_flavor(),
            Some(Flavor::new().fg(Color::Indexed(0)).bg(Color::Indexed(232)))
        );
    }

    #[test]
    fn skips_non_sgr_sequences() {
        let line = from_ansi("\x1b[2Jwash\x1b]0;title\x07 zoe");
        assert_eq!(line.to_string(), "wash zoe");
    }

    #[test]
    fn encoded_text_decodes_to_itself() {
        let mut text = StyledText::new();
        text.push_str("Take ", Flavor::new().underline().fg(Color::Rgb(9, 8, 7)));
        text.push_str("my ", Flavor::DEFAULT);
        text.push_str("love", Flavor::new().bg(Color::Indexed(17)).strikethrough());
        assert_eq!(from_ansi(&to_ansi(&text)), text);
    }
}
