//! Escape sequences and codepoint conversions for quoted `.strings` text.
//!
//! Decoding turns the text following a backslash into a character; encoding
//! picks the shortest unambiguous escape for characters that cannot appear
//! verbatim in a quoted string.

use std::borrow::Cow;

use crate::error::Error;

/// The result of decoding one backslash escape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Escape {
    /// The escape stands for this character.
    Char(char),
    /// The backslash was the last character on its physical line.
    LineContinuation,
}

/// Decodes the escape whose text starts right after a backslash.
///
/// Returns the decoded escape and the number of bytes of `after_backslash`
/// it consumed. Numeric escapes denoting a surrogate or a value above
/// `U+10FFFF` fail with [`Error::InvalidCodepoint`].
///
/// ```rust
/// use nslocalized::escape::{Escape, decode_escape};
///
/// assert_eq!(decode_escape("n rest").unwrap(), (Escape::Char('\n'), 1));
/// assert_eq!(decode_escape("u2030").unwrap(), (Escape::Char('‰'), 5));
/// assert_eq!(decode_escape("").unwrap(), (Escape::LineContinuation, 0));
/// ```
pub fn decode_escape(after_backslash: &str) -> Result<(Escape, usize), Error> {
    let Some(marker) = after_backslash.chars().next() else {
        return Ok((Escape::LineContinuation, 0));
    };

    if let Some(ch) = named_char(marker) {
        return Ok((Escape::Char(ch), 1));
    }

    match marker {
        '0'..='7' => {
            let digits = after_backslash
                .bytes()
                .take(3)
                .take_while(|b| (b'0'..=b'7').contains(b))
                .count();
            let value = parse_digits(&after_backslash[..digits], 8);
            Ok((Escape::Char(codepoint(value)?), digits))
        }
        'x' => {
            let digits = after_backslash[1..]
                .bytes()
                .take_while(u8::is_ascii_hexdigit)
                .count();
            if digits == 0 {
                return Ok((Escape::Char('x'), 1));
            }
            let value = parse_digits(&after_backslash[1..1 + digits], 16);
            Ok((Escape::Char(codepoint(value)?), 1 + digits))
        }
        'u' => fixed_width_hex(after_backslash, 4),
        'U' => fixed_width_hex(after_backslash, 8),
        other => Ok((Escape::Char(other), other.len_utf8())),
    }
}

/// `\u` and `\U` take exactly `width` digits; with fewer the marker is literal.
fn fixed_width_hex(after_backslash: &str, width: usize) -> Result<(Escape, usize), Error> {
    let digits = &after_backslash.as_bytes()[1..];
    if digits.len() < width || !digits[..width].iter().all(u8::is_ascii_hexdigit) {
        return Ok((Escape::Char(after_backslash.as_bytes()[0] as char), 1));
    }

    let value = parse_digits(&after_backslash[1..1 + width], 16);
    Ok((Escape::Char(codepoint(value)?), 1 + width))
}

// Saturates instead of overflowing so long `\x` runs still report the
// out-of-range value.
fn parse_digits(digits: &str, radix: u32) -> u32 {
    digits.chars().fold(0u32, |value, digit| {
        let digit = digit.to_digit(radix).unwrap_or(0);
        value.saturating_mul(radix).saturating_add(digit)
    })
}

fn codepoint(value: u32) -> Result<char, Error> {
    char::from_u32(value).ok_or(Error::InvalidCodepoint(value))
}

fn named_char(marker: char) -> Option<char> {
    match marker {
        'a' => Some('\u{07}'),
        'b' => Some('\u{08}'),
        'f' => Some('\u{0c}'),
        'n' => Some('\n'),
        'r' => Some('\r'),
        't' => Some('\t'),
        'v' => Some('\u{0b}'),
        _ => None,
    }
}

fn named_marker(ch: char) -> Option<char> {
    match ch {
        '\u{07}' => Some('a'),
        '\u{08}' => Some('b'),
        '\u{0c}' => Some('f'),
        '\n' => Some('n'),
        '\r' => Some('r'),
        '\t' => Some('t'),
        '\u{0b}' => Some('v'),
        '"' => Some('"'),
        '\\' => Some('\\'),
        _ => None,
    }
}

/// Whether `ch` must be escaped inside a quoted string on output.
pub fn needs_escape(ch: char) -> bool {
    matches!(
        ch as u32,
        0x00..=0x1f
            | 0x7f..=0x9f
            | 0x200e
            | 0x200f
            | 0x2028..=0x202e
            | 0xfe00..=0xfe0f
            | 0xe0100..=0xe01ef
    ) || ch == '"'
        || ch == '\\'
}

/// Escapes `text` for use between the quotes of a key or value.
///
/// Named C escapes are preferred, then `\xHH`, `\uHHHH` and `\UHHHHHHHH`.
/// A `\xHH` escape is never followed by a hex digit, since on input `\x`
/// consumes every hex digit that follows it; `\u00HH` is used instead.
///
/// ```rust
/// use nslocalized::escape::escape_for_output;
///
/// assert_eq!(escape_for_output("plain"), "plain");
/// assert_eq!(escape_for_output("say \"hi\"\n"), "say \\\"hi\\\"\\n");
/// assert_eq!(escape_for_output("\u{3}a"), "\\u0003a");
/// ```
pub fn escape_for_output(text: &str) -> Cow<'_, str> {
    if !text.chars().any(needs_escape) {
        return Cow::Borrowed(text);
    }

    let mut escaped = String::with_capacity(text.len() + 8);
    let mut chars = text.chars().peekable();
    while let Some(ch) = chars.next() {
        if !needs_escape(ch) {
            escaped.push(ch);
            continue;
        }

        let value = ch as u32;
        if let Some(marker) = named_marker(ch) {
            escaped.push('\\');
            escaped.push(marker);
        } else if value <= 0xff && !chars.peek().is_some_and(char::is_ascii_hexdigit) {
            escaped.push_str(&format!("\\x{value:02x}"));
        } else if value <= 0xffff {
            escaped.push_str(&format!("\\u{value:04x}"));
        } else {
            escaped.push_str(&format!("\\U{value:08x}"));
        }
    }

    Cow::Owned(escaped)
}

/// Splits a supplementary-plane character into its UTF-16 surrogate pair.
///
/// Returns `None` for characters in the Basic Multilingual Plane, which are
/// a single UTF-16 unit.
pub fn to_surrogate_pair(ch: char) -> Option<(u16, u16)> {
    let value = ch as u32;
    if value < 0x10000 {
        return None;
    }

    let offset = value - 0x10000;
    Some((
        0xd800 + (offset >> 10) as u16,
        0xdc00 + (offset & 0x3ff) as u16,
    ))
}

/// Joins a UTF-16 surrogate pair into the character it encodes.
pub fn from_surrogate_pair(high: u16, low: u16) -> Result<char, Error> {
    if !(0xd800..=0xdbff).contains(&high) {
        return Err(Error::MalformedSurrogate(high));
    }
    if !(0xdc00..=0xdfff).contains(&low) {
        return Err(Error::MalformedSurrogate(low));
    }

    let value = 0x10000 + ((u32::from(high - 0xd800) << 10) | u32::from(low - 0xdc00));
    codepoint(value)
}

/// Encodes `text` as UTF-16 code units, splitting supplementary characters
/// into surrogate pairs.
pub fn encode_utf16_units(text: &str) -> Vec<u16> {
    let mut units = Vec::with_capacity(text.len());
    for ch in text.chars() {
        match to_surrogate_pair(ch) {
            Some((high, low)) => {
                units.push(high);
                units.push(low);
            }
            None => units.push(ch as u16),
        }
    }
    units
}

/// Decodes UTF-16 code units, failing on any unpaired surrogate.
pub fn decode_utf16_units(units: &[u16]) -> Result<String, Error> {
    let mut text = String::with_capacity(units.len());
    let mut iter = units.iter().copied();
    while let Some(unit) = iter.next() {
        match unit {
            0xd800..=0xdbff => {
                let low = iter.next().ok_or(Error::MalformedSurrogate(unit))?;
                text.push(from_surrogate_pair(unit, low)?);
            }
            0xdc00..=0xdfff => return Err(Error::MalformedSurrogate(unit)),
            _ => text.push(codepoint(u32::from(unit))?),
        }
    }
    Ok(text)
}
