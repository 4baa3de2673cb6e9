use std::fmt;
use std::string::FromUtf8Error;

use crate::error::ReconstructError;

/// Percent-encoded fragment text that cannot be decoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EncodedTextError {
    /// A `%` at this byte offset is not followed by two hex digits.
    InvalidEscape { offset: usize },
    /// The escapes decode to bytes that are not UTF-8.
    InvalidUtf8(FromUtf8Error),
}

impl fmt::Display for EncodedTextError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EncodedTextError::InvalidEscape { offset } => {
                write!(f, "invalid percent escape at byte {offset}")
            }
            EncodedTextError::InvalidUtf8(e) => write!(f, "decoded text is not UTF-8: {e}"),
        }
    }
}

impl std::error::Error for EncodedTextError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            EncodedTextError::InvalidUtf8(e) => Some(e),
            EncodedTextError::InvalidEscape { .. } => None,
        }
    }
}

/// Offset of the first `%` not followed by two hex digits.
fn invalid_escape(raw: &str) -> Option<usize> {
    let bytes = raw.as_bytes();
    bytes.iter().enumerate().find_map(|(i, &b)| {
        let well_formed = bytes
            .get(i + 1..i + 3)
            .is_some_and(|hex| hex.iter().all(u8::is_ascii_hexdigit));
        (b == b'%' && !well_formed).then_some(i)
    })
}

/// A positioned text run as reported by a PDF decoder.
///
/// Coordinates use a top-left origin: `y` grows towards the bottom of the
/// page, so the smallest `y` is the top line. Units are whatever the decoder
/// emits; the reconstructor only compares them against each other.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Fragment {
    /// Horizontal offset of the run's origin.
    pub x: f64,
    /// Vertical offset of the run's origin (distance from the top of the page).
    pub y: f64,
    /// Decoded text content.
    pub text: String,
}

impl Fragment {
    pub fn new(x: f64, y: f64, text: impl Into<String>) -> Self {
        Self {
            x,
            y,
            text: text.into(),
        }
    }

    /// Build a fragment from percent-encoded text, as JSON-emitting decoders
    /// report it (`"Amount%20%3A"` becomes `"Amount :"`).
    ///
    /// # Errors
    ///
    /// Returns [`EncodedTextError::InvalidEscape`] for a `%` not followed by
    /// two hex digits (`"100%"`, `"%ZZ"`), and
    /// [`EncodedTextError::InvalidUtf8`] if the decoded bytes are not UTF-8.
    pub fn from_encoded(x: f64, y: f64, raw: &str) -> Result<Self, EncodedTextError> {
        if let Some(offset) = invalid_escape(raw) {
            return Err(EncodedTextError::InvalidEscape { offset });
        }
        let text = urlencoding::decode(raw).map_err(EncodedTextError::InvalidUtf8)?;
        Ok(Self::new(x, y, text.into_owned()))
    }

    /// Whether both coordinates are finite numbers.
    pub fn has_finite_position(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

/// All fragments belonging to one PDF page, in decoder order.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PageFragments {
    /// Page number (0-indexed).
    pub page_number: usize,
    /// Fragments as emitted by the decoder. Order carries no meaning beyond
    /// breaking ties between runs at exactly the same `x`.
    pub fragments: Vec<Fragment>,
}

impl PageFragments {
    pub fn new(page_number: usize) -> Self {
        Self {
            page_number,
            fragments: Vec::new(),
        }
    }

    pub fn with_fragments(page_number: usize, fragments: Vec<Fragment>) -> Self {
        Self {
            page_number,
            fragments,
        }
    }

    pub fn push(&mut self, fragment: Fragment) {
        self.fragments.push(fragment);
    }

    /// Percent-decode `raw` and append the resulting fragment.
    ///
    /// # Errors
    ///
    /// Returns [`ReconstructError::MalformedFragment`] if `raw` holds a
    /// malformed percent escape or decodes to invalid UTF-8.
    pub fn push_encoded(&mut self, x: f64, y: f64, raw: &str) -> Result<(), ReconstructError> {
        let index = self.fragments.len();
        let fragment = Fragment::from_encoded(x, y, raw).map_err(|e| {
            ReconstructError::malformed(self.page_number, index, format!("bad text encoding: {e}"))
        })?;
        self.fragments.push(fragment);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.fragments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }
}

/// A decoded PDF: one [`PageFragments`] per page, in page order.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Document {
    pub pages: Vec<PageFragments>,
}

impl Document {
    pub fn new(pages: Vec<PageFragments>) -> Self {
        Self { pages }
    }

    /// Build a document from bare fragment lists, numbering pages from 0.
    pub fn from_pages(pages: Vec<Vec<Fragment>>) -> Self {
        Self {
            pages: pages
                .into_iter()
                .enumerate()
                .map(|(i, fragments)| PageFragments::with_fragments(i, fragments))
                .collect(),
        }
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Total number of fragments across all pages.
    pub fn fragment_count(&self) -> usize {
        self.pages.iter().map(PageFragments::len).sum()
    }
}
