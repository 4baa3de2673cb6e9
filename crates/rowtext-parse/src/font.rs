//! Font resources: character code decoding and glyph widths.

use std::collections::HashMap;

use crate::cmap::ToUnicodeCMap;
use crate::encoding::{BaseEncoding, SimpleEncoding};
use crate::error::{DecodeWarning, WarningKind};
use crate::lopdf_backend::{object_to_f64, resolve_ref};

/// Width used by simple fonts when `/Widths` has no entry, in glyph units.
pub const DEFAULT_SIMPLE_WIDTH: f64 = 500.0;
/// Width used by Type0 fonts when neither `/W` nor `/DW` covers a CID.
pub const DEFAULT_CID_WIDTH: f64 = 1000.0;
/// Most codes past the first that one `/W` range or CMap `bfrange` may cover.
pub const MAX_CODE_RANGE: u32 = 0xFFFF;

/// One decoded character code.
#[derive(Debug, Clone, PartialEq)]
pub struct Glyph {
    pub code: u32,
    /// Unicode text, `None` when the font gives no mapping for the code.
    pub text: Option<String>,
    /// Advance width in glyph space (1/1000 em).
    pub width: f64,
    /// Single-byte code 32, which receives word spacing.
    pub is_word_space: bool,
}

/// The parts of a font dictionary needed to decode and advance text.
#[derive(Debug, Clone)]
pub struct FontInfo {
    base_font: String,
    composite: bool,
    to_unicode: Option<ToUnicodeCMap>,
    encoding: SimpleEncoding,
    widths: HashMap<u32, f64>,
    default_width: f64,
}

impl Default for FontInfo {
    fn default() -> Self {
        Self::simple("", SimpleEncoding::new(BaseEncoding::Standard))
    }
}

impl FontInfo {
    /// A simple font with no width table.
    pub fn simple(base_font: impl Into<String>, encoding: SimpleEncoding) -> Self {
        Self {
            base_font: base_font.into(),
            composite: false,
            to_unicode: None,
            encoding,
            widths: HashMap::new(),
            default_width: DEFAULT_SIMPLE_WIDTH,
        }
    }

    /// A Type0 font with two-byte codes and no width table.
    pub fn composite(base_font: impl Into<String>) -> Self {
        Self {
            base_font: base_font.into(),
            composite: true,
            to_unicode: None,
            encoding: SimpleEncoding::default(),
            widths: HashMap::new(),
            default_width: DEFAULT_CID_WIDTH,
        }
    }

    pub fn with_to_unicode(mut self, cmap: ToUnicodeCMap) -> Self {
        self.to_unicode = Some(cmap);
        self
    }

    pub fn with_widths(mut self, widths: HashMap<u32, f64>) -> Self {
        self.widths = widths;
        self
    }

    pub fn base_font(&self) -> &str {
        &self.base_font
    }

    pub fn is_composite(&self) -> bool {
        self.composite
    }

    pub fn width(&self, code: u32) -> f64 {
        self.widths.get(&code).copied().unwrap_or(self.default_width)
    }

    /// Bytes per character code: the ToUnicode code space for Type0 fonts
    /// that declare one, two for other Type0 fonts, one for simple fonts.
    pub fn code_bytes(&self) -> usize {
        if !self.composite {
            return 1;
        }
        self.to_unicode
            .as_ref()
            .and_then(ToUnicodeCMap::code_bytes)
            .filter(|n| (1..=4).contains(n))
            .unwrap_or(2)
    }

    /// Split a string operand into character codes and decode each one.
    ///
    /// A trailing partial code is read from the bytes that remain.
    pub fn glyphs(&self, bytes: &[u8]) -> Vec<Glyph> {
        bytes
            .chunks(self.code_bytes())
            .map(|chunk| {
                let code = chunk.iter().fold(0u32, |acc, &b| (acc << 8) | u32::from(b));
                Glyph {
                    code,
                    text: self.unicode(code),
                    width: self.width(code),
                    is_word_space: chunk.len() == 1 && code == 32,
                }
            })
            .collect()
    }

    /// Decode a string operand to text, skipping unmapped codes.
    pub fn decode_text(&self, bytes: &[u8]) -> String {
        self.glyphs(bytes)
            .into_iter()
            .filter_map(|g| g.text)
            .collect()
    }

    fn unicode(&self, code: u32) -> Option<String> {
        if let Some(text) = self.to_unicode.as_ref().and_then(|c| c.lookup(code)) {
            return Some(text.to_string());
        }
        if self.composite {
            return None;
        }
        u8::try_from(code).ok().and_then(|b| self.encoding.decode(b))
    }

    /// Read a font dictionary.
    ///
    /// Never fails: unusable entries fall back to defaults. A `/ToUnicode`
    /// stream that cannot be parsed, and width or CMap ranges cut short at
    /// the code space, are reported as warnings.
    pub fn load(doc: &lopdf::Document, dict: &lopdf::Dictionary) -> (Self, Vec<DecodeWarning>) {
        let base_font = dict
            .get(b"BaseFont")
            .ok()
            .and_then(|o| o.as_name().ok())
            .map(|n| String::from_utf8_lossy(n).into_owned())
            .unwrap_or_default();
        let subtype = dict
            .get(b"Subtype")
            .ok()
            .and_then(|o| o.as_name().ok())
            .unwrap_or(b"");

        let (mut font, truncated) = if subtype == b"Type0" {
            load_composite(doc, dict, base_font)
        } else {
            load_simple(doc, dict, base_font)
        };

        let mut warnings = Vec::new();
        if truncated > 0 {
            warnings.push(DecodeWarning::new(
                WarningKind::TruncatedRange,
                format!("font {}: {truncated} width range(s) cut short", font.base_font),
            ));
        }
        if let Some(stream) = dict
            .get(b"ToUnicode")
            .ok()
            .map(|o| resolve_ref(doc, o))
            .and_then(|o| o.as_stream().ok())
        {
            let parsed = crate::lopdf_backend::stream_content(stream)
                .and_then(|bytes| ToUnicodeCMap::parse(&bytes));
            match parsed {
                Ok(cmap) => {
                    if cmap.truncated_ranges() > 0 {
                        warnings.push(DecodeWarning::new(
                            WarningKind::TruncatedRange,
                            format!(
                                "font {}: {} ToUnicode range(s) cut short",
                                font.base_font,
                                cmap.truncated_ranges()
                            ),
                        ));
                    }
                    font.to_unicode = Some(cmap);
                }
                Err(e) => warnings.push(DecodeWarning::new(
                    WarningKind::BadToUnicode,
                    format!("font {}: {e}", font.base_font),
                )),
            }
        }
        (font, warnings)
    }
}

/// The font and how many width entries ran past the largest code.
fn load_simple(
    doc: &lopdf::Document,
    dict: &lopdf::Dictionary,
    base_font: String,
) -> (FontInfo, usize) {
    let encoding = match dict.get(b"Encoding").ok().map(|o| resolve_ref(doc, o)) {
        Some(lopdf::Object::Name(name)) => SimpleEncoding::new(
            BaseEncoding::from_name(&String::from_utf8_lossy(name)).unwrap_or_default(),
        ),
        Some(lopdf::Object::Dictionary(enc)) => encoding_from_dict(doc, enc),
        _ => SimpleEncoding::default(),
    };

    let first_char = dict
        .get(b"FirstChar")
        .ok()
        .and_then(|o| o.as_i64().ok())
        .and_then(|v| u32::try_from(v).ok())
        .unwrap_or(0);
    let mut widths = HashMap::new();
    let mut truncated = 0;
    if let Some(arr) = dict
        .get(b"Widths")
        .ok()
        .map(|o| resolve_ref(doc, o))
        .and_then(|o| o.as_array().ok())
    {
        for (i, w) in arr.iter().enumerate() {
            let Some(code) = offset_code(first_char, i) else {
                truncated += 1;
                break;
            };
            if let Ok(w) = object_to_f64(resolve_ref(doc, w)) {
                widths.insert(code, w);
            }
        }
    }

    (FontInfo::simple(base_font, encoding).with_widths(widths), truncated)
}

/// `first + offset`, or `None` past `u32::MAX`.
fn offset_code(first: u32, offset: usize) -> Option<u32> {
    u32::try_from(offset).ok().and_then(|o| first.checked_add(o))
}

fn encoding_from_dict(doc: &lopdf::Document, enc: &lopdf::Dictionary) -> SimpleEncoding {
    let base = enc
        .get(b"BaseEncoding")
        .ok()
        .and_then(|o| o.as_name().ok())
        .and_then(|n| BaseEncoding::from_name(&String::from_utf8_lossy(n)))
        .unwrap_or_default();
    let mut encoding = SimpleEncoding::new(base);

    if let Some(diffs) = enc
        .get(b"Differences")
        .ok()
        .map(|o| resolve_ref(doc, o))
        .and_then(|o| o.as_array().ok())
    {
        let mut names = Vec::new();
        let mut code: Option<u32> = None;
        for item in diffs {
            match resolve_ref(doc, item) {
                lopdf::Object::Integer(n) => code = u32::try_from(*n).ok(),
                lopdf::Object::Name(name) => {
                    if let Some(c) = code {
                        if let Ok(byte) = u8::try_from(c) {
                            names.push((byte, String::from_utf8_lossy(name).into_owned()));
                        }
                        code = c.checked_add(1);
                    }
                }
                _ => {}
            }
        }
        encoding.apply_differences(names.iter().map(|(c, n)| (*c, n.as_str())));
    }
    encoding
}

fn load_composite(
    doc: &lopdf::Document,
    dict: &lopdf::Dictionary,
    base_font: String,
) -> (FontInfo, usize) {
    let descendant = dict
        .get(b"DescendantFonts")
        .ok()
        .map(|o| resolve_ref(doc, o))
        .and_then(|o| o.as_array().ok())
        .and_then(|arr| arr.first())
        .map(|o| resolve_ref(doc, o))
        .and_then(|o| o.as_dict().ok());

    let mut font = FontInfo::composite(base_font);
    let mut truncated = 0;
    if let Some(cid_font) = descendant {
        if let Some(dw) = cid_font
            .get(b"DW")
            .ok()
            .and_then(|o| object_to_f64(resolve_ref(doc, o)).ok())
        {
            font.default_width = dw;
        }
        if let Some(w) = cid_font
            .get(b"W")
            .ok()
            .map(|o| resolve_ref(doc, o))
            .and_then(|o| o.as_array().ok())
        {
            (font.widths, truncated) = parse_cid_widths(doc, w);
        }
    }
    (font, truncated)
}

/// Parse a CIDFont `/W` array: `c [w1 w2 …]` and `c_first c_last w` entries.
///
/// Also returns how many entries were cut short: a list running past
/// `u32::MAX`, or a range covering more than [`MAX_CODE_RANGE`] CIDs.
pub fn parse_cid_widths(
    doc: &lopdf::Document,
    objects: &[lopdf::Object],
) -> (HashMap<u32, f64>, usize) {
    let as_cid = |o: &lopdf::Object| {
        object_to_f64(resolve_ref(doc, o))
            .ok()
            .filter(|v| *v >= 0.0)
            .map(|v| v as u32)
    };

    let mut widths = HashMap::new();
    let mut truncated = 0;
    let mut i = 0;
    while i < objects.len() {
        let Some(first) = as_cid(&objects[i]) else {
            i += 1;
            continue;
        };
        let Some(next) = objects.get(i + 1).map(|o| resolve_ref(doc, o)) else {
            break;
        };
        if let Ok(arr) = next.as_array() {
            for (j, w) in arr.iter().enumerate() {
                let Some(cid) = offset_code(first, j) else {
                    truncated += 1;
                    break;
                };
                if let Ok(w) = object_to_f64(resolve_ref(doc, w)) {
                    widths.insert(cid, w);
                }
            }
            i += 2;
        } else if let Some(last) = as_cid(next) {
            if let Some(w) = objects
                .get(i + 2)
                .and_then(|o| object_to_f64(resolve_ref(doc, o)).ok())
            {
                let end = last.min(first.saturating_add(MAX_CODE_RANGE));
                if end < last {
                    truncated += 1;
                }
                for cid in first..=end {
                    widths.insert(cid, w);
                }
            }
            i += 3;
        } else {
            i += 2;
        }
    }
    (widths, truncated)
}
