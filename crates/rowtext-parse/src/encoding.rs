//! Single-byte font encodings.
//!
//! Resolves character codes of simple (non-Type0) fonts to Unicode through a
//! base encoding plus the font's `/Differences` overrides. Only used when the
//! font carries no `/ToUnicode` CMap or the CMap has no entry for a code.

use std::collections::HashMap;

/// A predefined base encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BaseEncoding {
    #[default]
    Standard,
    WinAnsi,
    MacRoman,
}

impl BaseEncoding {
    /// Map a PDF encoding name (`WinAnsiEncoding`, …) to a base encoding.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "StandardEncoding" => Some(BaseEncoding::Standard),
            "WinAnsiEncoding" => Some(BaseEncoding::WinAnsi),
            "MacRomanEncoding" => Some(BaseEncoding::MacRoman),
            _ => None,
        }
    }

    /// Decode one code with this base encoding.
    pub fn decode(self, code: u8) -> Option<char> {
        match self {
            BaseEncoding::Standard => standard(code),
            BaseEncoding::WinAnsi => win_ansi(code),
            BaseEncoding::MacRoman => mac_roman(code),
        }
    }
}

/// Base encoding plus `/Differences`.
#[derive(Debug, Clone, Default)]
pub struct SimpleEncoding {
    base: BaseEncoding,
    differences: HashMap<u8, String>,
}

impl SimpleEncoding {
    pub fn new(base: BaseEncoding) -> Self {
        Self {
            base,
            differences: HashMap::new(),
        }
    }

    pub fn base(&self) -> BaseEncoding {
        self.base
    }

    /// Apply a `/Differences` array given as (code, glyph name) pairs.
    /// Glyph names that cannot be resolved leave the base mapping in place.
    pub fn apply_differences<'a>(&mut self, entries: impl IntoIterator<Item = (u8, &'a str)>) {
        for (code, glyph) in entries {
            if let Some(text) = glyph_to_unicode(glyph) {
                self.differences.insert(code, text);
            }
        }
    }

    pub fn decode(&self, code: u8) -> Option<String> {
        if let Some(text) = self.differences.get(&code) {
            return Some(text.clone());
        }
        self.base.decode(code).map(String::from)
    }
}

fn standard(code: u8) -> Option<char> {
    match code {
        0x27 => Some('\u{2019}'),
        0x60 => Some('\u{2018}'),
        0x20..=0x7E => Some(code as char),
        0xA1 => Some('\u{00A1}'),
        0xA2 => Some('\u{00A2}'),
        0xA3 => Some('\u{00A3}'),
        0xA4 => Some('\u{2044}'),
        0xA5 => Some('\u{00A5}'),
        0xA6 => Some('\u{0192}'),
        0xA7 => Some('\u{00A7}'),
        0xA9 => Some('\''),
        0xAA => Some('\u{201C}'),
        0xAB => Some('\u{00AB}'),
        0xAE => Some('\u{FB01}'),
        0xAF => Some('\u{FB02}'),
        0xB1 => Some('\u{2013}'),
        0xB2 => Some('\u{2020}'),
        0xB3 => Some('\u{2021}'),
        0xB4 => Some('\u{00B7}'),
        0xB7 => Some('\u{2022}'),
        0xBA => Some('\u{201D}'),
        0xBB => Some('\u{00BB}'),
        0xBC => Some('\u{2026}'),
        0xBD => Some('\u{2030}'),
        0xD0 => Some('\u{2014}'),
        0xE1 => Some('\u{00C6}'),
        0xE8 => Some('\u{0141}'),
        0xE9 => Some('\u{00D8}'),
        0xEA => Some('\u{0152}'),
        0xF1 => Some('\u{00E6}'),
        0xF5 => Some('\u{0131}'),
        0xF8 => Some('\u{0142}'),
        0xF9 => Some('\u{00F8}'),
        0xFA => Some('\u{0153}'),
        0xFB => Some('\u{00DF}'),
        _ => None,
    }
}

const WIN_ANSI_80_9F: [Option<char>; 32] = [
    Some('\u{20AC}'),
    None,
    Some('\u{201A}'),
    Some('\u{0192}'),
    Some('\u{201E}'),
    Some('\u{2026}'),
    Some('\u{2020}'),
    Some('\u{2021}'),
    Some('\u{02C6}'),
    Some('\u{2030}'),
    Some('\u{0160}'),
    Some('\u{2039}'),
    Some('\u{0152}'),
    None,
    Some('\u{017D}'),
    None,
    None,
    Some('\u{2018}'),
    Some('\u{2019}'),
    Some('\u{201C}'),
    Some('\u{201D}'),
    Some('\u{2022}'),
    Some('\u{2013}'),
    Some('\u{2014}'),
    Some('\u{02DC}'),
    Some('\u{2122}'),
    Some('\u{0161}'),
    Some('\u{203A}'),
    Some('\u{0153}'),
    None,
    Some('\u{017E}'),
    Some('\u{0178}'),
];

fn win_ansi(code: u8) -> Option<char> {
    match code {
        0x20..=0x7E => Some(code as char),
        0x80..=0x9F => WIN_ANSI_80_9F[usize::from(code - 0x80)],
        // 0xA0..=0xFF matches Latin-1.
        0xA0..=0xFF => Some(char::from(code)),
        _ => None,
    }
}

const MAC_ROMAN_HIGH: &str = "ÄÅÇÉÑÖÜáàâäãåçéèêëíìîïñóòôöõúùûü\u{2020}\u{00B0}\u{00A2}\u{00A3}\u{00A7}\u{2022}\u{00B6}ß\u{00AE}\u{00A9}\u{2122}\u{00B4}\u{00A8}\u{2260}ÆØ\u{221E}\u{00B1}\u{2264}\u{2265}\u{00A5}µ\u{2202}\u{2211}\u{220F}\u{03C0}\u{222B}ªº\u{03A9}æø\u{00BF}\u{00A1}\u{00AC}\u{221A}ƒ\u{2248}\u{2206}\u{00AB}\u{00BB}\u{2026}\u{00A0}ÀÃÕŒœ\u{2013}\u{2014}\u{201C}\u{201D}\u{2018}\u{2019}\u{00F7}\u{25CA}ÿŸ\u{2044}\u{20AC}\u{2039}\u{203A}\u{FB01}\u{FB02}\u{2021}\u{00B7}\u{201A}\u{201E}\u{2030}ÂÊÁËÈÍÎÏÌÓÔ\u{F8FF}ÒÚÛÙı\u{02C6}\u{02DC}\u{00AF}\u{02D8}\u{02D9}\u{02DA}\u{00B8}\u{02DD}\u{02DB}\u{02C7}";

fn mac_roman(code: u8) -> Option<char> {
    match code {
        0x20..=0x7E => Some(code as char),
        0x80..=0xFF => MAC_ROMAN_HIGH.chars().nth(usize::from(code - 0x80)),
        _ => None,
    }
}

/// Resolve a glyph name to Unicode text.
///
/// Handles `uniXXXX` / `uXXXX` names, single-letter names and the glyph names
/// that show up in receipt fonts (digits, punctuation, currency, ligatures).
/// Suffixes such as `.sc` or `.alt` are ignored.
pub fn glyph_to_unicode(name: &str) -> Option<String> {
    let base = name.split('.').next().unwrap_or(name);
    if base.is_empty() {
        return None;
    }

    if let Some(hex) = base.strip_prefix("uni") {
        if hex.len() >= 4 && hex.len() % 4 == 0 {
            let units: Option<Vec<u16>> = hex
                .as_bytes()
                .chunks(4)
                .map(|c| u16::from_str_radix(std::str::from_utf8(c).ok()?, 16).ok())
                .collect();
            return units.map(|u| String::from_utf16_lossy(&u));
        }
    }
    if let Some(hex) = base.strip_prefix('u') {
        if (4..=6).contains(&hex.len()) && hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return u32::from_str_radix(hex, 16)
                .ok()
                .and_then(char::from_u32)
                .map(String::from);
        }
    }

    let mut chars = base.chars();
    if let (Some(c), None) = (chars.next(), chars.next()) {
        if c.is_ascii_alphabetic() {
            return Some(c.to_string());
        }
    }

    named_glyph(base).map(String::from)
}

fn named_glyph(name: &str) -> Option<&'static str> {
    let text = match name {
        "space" | "nbspace" | "nonbreakingspace" => " ",
        "exclam" => "!",
        "quotedbl" => "\"",
        "numbersign" => "#",
        "dollar" => "$",
        "percent" => "%",
        "ampersand" => "&",
        "quotesingle" => "'",
        "parenleft" => "(",
        "parenright" => ")",
        "asterisk" => "*",
        "plus" => "+",
        "comma" => ",",
        "hyphen" | "minus" => "-",
        "period" => ".",
        "slash" => "/",
        "zero" => "0",
        "one" => "1",
        "two" => "2",
        "three" => "3",
        "four" => "4",
        "five" => "5",
        "six" => "6",
        "seven" => "7",
        "eight" => "8",
        "nine" => "9",
        "colon" => ":",
        "semicolon" => ";",
        "less" => "<",
        "equal" => "=",
        "greater" => ">",
        "question" => "?",
        "at" => "@",
        "bracketleft" => "[",
        "backslash" => "\\",
        "bracketright" => "]",
        "asciicircum" => "^",
        "underscore" => "_",
        "grave" => "`",
        "braceleft" => "{",
        "bar" => "|",
        "braceright" => "}",
        "asciitilde" => "~",
        "bullet" => "\u{2022}",
        "endash" => "\u{2013}",
        "emdash" => "\u{2014}",
        "ellipsis" => "\u{2026}",
        "quoteleft" => "\u{2018}",
        "quoteright" => "\u{2019}",
        "quotedblleft" => "\u{201C}",
        "quotedblright" => "\u{201D}",
        "quotesinglbase" => "\u{201A}",
        "quotedblbase" => "\u{201E}",
        "guillemotleft" => "\u{00AB}",
        "guillemotright" => "\u{00BB}",
        "Euro" => "\u{20AC}",
        "sterling" => "\u{00A3}",
        "yen" => "\u{00A5}",
        "cent" => "\u{00A2}",
        "section" => "\u{00A7}",
        "paragraph" => "\u{00B6}",
        "degree" => "\u{00B0}",
        "copyright" => "\u{00A9}",
        "registered" => "\u{00AE}",
        "trademark" => "\u{2122}",
        "multiply" => "\u{00D7}",
        "divide" => "\u{00F7}",
        "plusminus" => "\u{00B1}",
        "fi" => "fi",
        "fl" => "fl",
        "ff" => "ff",
        "ffi" => "ffi",
        "ffl" => "ffl",
        "germandbls" => "\u{00DF}",
        "aacute" => "\u{00E1}",
        "agrave" => "\u{00E0}",
        "acircumflex" => "\u{00E2}",
        "adieresis" => "\u{00E4}",
        "ccedilla" => "\u{00E7}",
        "eacute" => "\u{00E9}",
        "egrave" => "\u{00E8}",
        "ecircumflex" => "\u{00EA}",
        "edieresis" => "\u{00EB}",
        "iacute" => "\u{00ED}",
        "icircumflex" => "\u{00EE}",
        "idieresis" => "\u{00EF}",
        "ntilde" => "\u{00F1}",
        "oacute" => "\u{00F3}",
        "ocircumflex" => "\u{00F4}",
        "odieresis" => "\u{00F6}",
        "uacute" => "\u{00FA}",
        "ugrave" => "\u{00F9}",
        "ucircumflex" => "\u{00FB}",
        "udieresis" => "\u{00FC}",
        "Eacute" => "\u{00C9}",
        "Egrave" => "\u{00C8}",
        "Agrave" => "\u{00C0}",
        "Ccedilla" => "\u{00C7}",
        _ => return None,
    };
    Some(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_encoding_from_name() {
        assert_eq!(
            BaseEncoding::from_name("WinAnsiEncoding"),
            Some(BaseEncoding::WinAnsi)
        );
        assert_eq!(
            BaseEncoding::from_name("MacRomanEncoding"),
            Some(BaseEncoding::MacRoman)
        );
        assert_eq!(BaseEncoding::from_name("Identity-H"), None);
    }

    #[test]
    fn ascii_is_identity_in_all_bases() {
        for base in [
            BaseEncoding::Standard,
            BaseEncoding::WinAnsi,
            BaseEncoding::MacRoman,
        ] {
            assert_eq!(base.decode(b'A'), Some('A'));
            assert_eq!(base.decode(b':'), Some(':'));
            assert_eq!(base.decode(b'0'), Some('0'));
        }
    }

    #[test]
    fn standard_quotes_are_curly() {
        assert_eq!(BaseEncoding::Standard.decode(0x27), Some('\u{2019}'));
        assert_eq!(BaseEncoding::WinAnsi.decode(0x27), Some('\''));
    }

    #[test]
    fn win_ansi_high_range() {
        assert_eq!(BaseEncoding::WinAnsi.decode(0x80), Some('\u{20AC}'));
        assert_eq!(BaseEncoding::WinAnsi.decode(0x81), None);
        assert_eq!(BaseEncoding::WinAnsi.decode(0x96), Some('\u{2013}'));
        assert_eq!(BaseEncoding::WinAnsi.decode(0xE9), Some('\u{00E9}'));
    }

    #[test]
    fn mac_roman_high_range() {
        assert_eq!(BaseEncoding::MacRoman.decode(0x80), Some('\u{00C4}'));
        assert_eq!(BaseEncoding::MacRoman.decode(0xDB), Some('\u{20AC}'));
        assert_eq!(BaseEncoding::MacRoman.decode(0xFF), Some('\u{02C7}'));
    }

    #[test]
    fn control_codes_are_unmapped() {
        assert_eq!(BaseEncoding::WinAnsi.decode(0x05), None);
    }

    #[test]
    fn differences_override_base() {
        let mut enc = SimpleEncoding::new(BaseEncoding::WinAnsi);
        enc.apply_differences([(0x41, "Euro"), (0x42, "fi"), (0x43, "notaglyph")]);
        assert_eq!(enc.decode(0x41).as_deref(), Some("\u{20AC}"));
        assert_eq!(enc.decode(0x42).as_deref(), Some("fi"));
        assert_eq!(enc.decode(0x43).as_deref(), Some("C"));
        assert_eq!(enc.base(), BaseEncoding::WinAnsi);
    }

    #[test]
    fn glyph_names() {
        assert_eq!(glyph_to_unicode("colon").as_deref(), Some(":"));
        assert_eq!(glyph_to_unicode("R").as_deref(), Some("R"));
        assert_eq!(glyph_to_unicode("uni0041").as_deref(), Some("A"));
        assert_eq!(glyph_to_unicode("uni00410042").as_deref(), Some("AB"));
        assert_eq!(glyph_to_unicode("u1F600").as_deref(), Some("\u{1F600}"));
        assert_eq!(glyph_to_unicode("a.sc").as_deref(), Some("a"));
        assert_eq!(glyph_to_unicode("seven.alt").as_deref(), Some("7"));
        assert_eq!(glyph_to_unicode(".notdef"), None);
        assert_eq!(glyph_to_unicode("g123"), None);
    }
}
