//! ToUnicode CMap parsing.
//!
//! Maps font character codes to Unicode strings using the `bfchar` and
//! `bfrange` sections of a `/ToUnicode` stream. Destination values are
//! UTF-16BE hex strings and may hold more than one character (ligatures).

use std::collections::HashMap;

use crate::error::DecodeError;
use crate::font::MAX_CODE_RANGE;

/// A parsed ToUnicode CMap.
#[derive(Debug, Clone, Default)]
pub struct ToUnicodeCMap {
    mappings: HashMap<u32, String>,
    /// Source code width in bytes from `begincodespacerange`, if declared.
    code_bytes: Option<usize>,
    /// `bfrange` entries cut to the code space or to [`MAX_CODE_RANGE`].
    truncated: usize,
}

impl ToUnicodeCMap {
    /// Parse CMap stream content.
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError::Parse`] if a hex token is malformed.
    pub fn parse(data: &[u8]) -> Result<Self, DecodeError> {
        let text = String::from_utf8_lossy(data);
        let mut cmap = ToUnicodeCMap::default();

        if let Some(section) = sections(&text, "begincodespacerange", "endcodespacerange").next() {
            cmap.code_bytes = hex_tokens(section)
                .first()
                .map(|t| t.len().div_ceil(2))
                .filter(|&n| n > 0);
        }
        for section in sections(&text, "beginbfchar", "endbfchar") {
            cmap.parse_bfchar(section)?;
        }
        for section in sections(&text, "beginbfrange", "endbfrange") {
            cmap.parse_bfrange(section)?;
        }
        Ok(cmap)
    }

    pub fn lookup(&self, code: u32) -> Option<&str> {
        self.mappings.get(&code).map(String::as_str)
    }

    /// Declared source code width in bytes, if any.
    pub fn code_bytes(&self) -> Option<usize> {
        self.code_bytes
    }

    /// Number of `bfrange` entries that were cut short because they ran past
    /// the declared code space or covered more than [`MAX_CODE_RANGE`] codes.
    pub fn truncated_ranges(&self) -> usize {
        self.truncated
    }

    pub fn len(&self) -> usize {
        self.mappings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mappings.is_empty()
    }

    /// `<src> <dst>` pairs.
    fn parse_bfchar(&mut self, section: &str) -> Result<(), DecodeError> {
        let tokens = hex_tokens(section);
        for pair in tokens.chunks_exact(2) {
            let code = parse_code(pair[0])?;
            self.mappings.insert(code, decode_utf16be(pair[1])?);
        }
        Ok(())
    }

    /// `<lo> <hi> <dst>` and `<lo> <hi> [<dst> …]` lines.
    fn parse_bfrange(&mut self, section: &str) -> Result<(), DecodeError> {
        for line in section.lines() {
            let line = line.trim();
            let tokens = hex_tokens(line);
            if tokens.len() < 3 {
                continue;
            }
            let lo = parse_code(tokens[0])?;
            let hi = parse_code(tokens[1])?;
            if hi < lo {
                continue;
            }
            let max = self.max_code();
            if lo > max {
                self.truncated += 1;
                continue;
            }
            let end = hi.min(max).min(lo.saturating_add(MAX_CODE_RANGE));
            if end < hi {
                self.truncated += 1;
            }

            if line.contains('[') {
                for (offset, dst) in tokens[2..].iter().enumerate() {
                    let Some(code) = u32::try_from(offset).ok().and_then(|o| lo.checked_add(o))
                    else {
                        break;
                    };
                    if code > end {
                        break;
                    }
                    self.mappings.insert(code, decode_utf16be(dst)?);
                }
                continue;
            }

            // The last UTF-16 unit of the destination increments across the range.
            let mut units = utf16_units(tokens[2])?;
            for code in lo..=end {
                if let Ok(s) = String::from_utf16(&units) {
                    self.mappings.insert(code, s);
                }
                if let Some(last) = units.last_mut() {
                    *last = last.wrapping_add(1);
                }
            }
        }
        Ok(())
    }

    /// Largest code the declared code space can hold.
    fn max_code(&self) -> u32 {
        match self.code_bytes {
            Some(n) if n < 4 => (1u32 << (8 * n)) - 1,
            _ => u32::MAX,
        }
    }
}

/// Iterate over the text between each `begin` … `end` marker pair.
fn sections<'a>(text: &'a str, begin: &'a str, end: &'a str) -> impl Iterator<Item = &'a str> {
    let mut rest = text;
    std::iter::from_fn(move || {
        let start = rest.find(begin)? + begin.len();
        let len = rest[start..].find(end)?;
        let section = &rest[start..start + len];
        rest = &rest[start + len + end.len()..];
        Some(section)
    })
}

/// Every `<hex>` token in `text`, without the brackets.
fn hex_tokens(text: &str) -> Vec<&str> {
    let mut tokens = Vec::new();
    let mut rest = text;
    while let Some(start) = rest.find('<') {
        let Some(len) = rest[start + 1..].find('>') else {
            break;
        };
        tokens.push(rest[start + 1..start + 1 + len].trim());
        rest = &rest[start + 1 + len + 1..];
    }
    tokens
}

fn parse_code(hex: &str) -> Result<u32, DecodeError> {
    u32::from_str_radix(hex, 16)
        .map_err(|e| DecodeError::Parse(format!("invalid CMap code <{hex}>: {e}")))
}

fn utf16_units(hex: &str) -> Result<Vec<u16>, DecodeError> {
    // Single-byte destinations ("<41>") are widened to one UTF-16 unit.
    let padded;
    let hex = if hex.len() <= 2 {
        padded = format!("{hex:0>4}");
        padded.as_str()
    } else {
        hex
    };
    if hex.len() % 4 != 0 {
        return Err(DecodeError::Parse(format!(
            "UTF-16BE destination <{hex}> has odd length"
        )));
    }
    hex.as_bytes()
        .chunks(4)
        .map(|chunk| {
            let digits = std::str::from_utf8(chunk).unwrap_or("");
            u16::from_str_radix(digits, 16)
                .map_err(|e| DecodeError::Parse(format!("invalid UTF-16BE unit {digits:?}: {e}")))
        })
        .collect()
}

fn decode_utf16be(hex: &str) -> Result<String, DecodeError> {
    let units = utf16_units(hex)?;
    Ok(String::from_utf16_lossy(&units))
}
