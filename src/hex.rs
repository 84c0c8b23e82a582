//! Hex text conversion.
//!
//! Parsing is deliberately lenient: any non-hex character between byte pairs
//! acts as a separator, so `"DE:AD be-ef"` parses the same as `"DEADBEEF"`.
//! A hex digit that is not followed by a second digit is an error, reported
//! with the character index it occurred at.

use anyhow::{Result, bail};

/// Parses a hex string into raw bytes.
///
/// Non-hex characters are skipped when they appear where a new byte would
/// start; a half-formed pair fails with a parse error naming the offending
/// position.
pub fn parse(value: &str) -> Result<Vec<u8>> {
    let chars: Vec<char> = value.chars().collect();
    let mut bytes = Vec::with_capacity(chars.len() / 2);
    let mut j = 0;

    while j < chars.len() {
        let c = chars[j];
        j += 1;
        let Some(hi) = digit(c) else { continue };

        if j == chars.len() {
            bail!("Parse error at {}: {}", j - 1, value);
        }
        let c = chars[j];
        j += 1;
        let Some(lo) = digit(c) else {
            bail!("Parse error at {}: {}", j - 1, value);
        };

        bytes.push(hi << 4 | lo);
    }

    Ok(bytes)
}

/// Formats raw bytes as uppercase hex.
#[inline]
#[must_use]
pub fn encode(bytes: &[u8]) -> String {
    ::hex::encode_upper(bytes)
}

#[inline]
fn digit(c: char) -> Option<u8> {
    match c {
        '0'..='9' => Some(c as u8 - b'0'),
        'A'..='F' => Some(10 + c as u8 - b'A'),
        'a'..='f' => Some(10 + c as u8 - b'a'),
        _ => None,
    }
}
