//! Error and warning types for the decoding layer.

use std::fmt;

use thiserror::Error;

/// A fatal failure while decoding a PDF into text fragments.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// The file structure, an object or a CMap could not be parsed.
    #[error("PDF parse error: {0}")]
    Parse(String),

    /// Reading the input failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The document is encrypted.
    #[error("PDF is encrypted")]
    Encrypted,

    /// A content stream could not be interpreted.
    #[error("interpreter error: {0}")]
    Interpreter(String),

    /// Form XObjects nest deeper than allowed.
    #[error("form XObject recursion depth {depth} exceeds limit {limit}")]
    RecursionLimit { depth: usize, limit: usize },

    /// `unit_scale` must be finite and positive.
    #[error("invalid unit scale {0}: must be finite and positive")]
    InvalidUnitScale(f64),

    /// A page index past the end of the document.
    #[error("page index {index} out of range (document has {count} pages)")]
    PageOutOfRange { index: usize, count: usize },
}

/// Category of a [`DecodeWarning`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WarningKind {
    /// `Tf` names a font that is not in the page resources.
    MissingFont,
    /// `Do` names an XObject that is missing or unusable.
    MissingXObject,
    /// A font's `/ToUnicode` stream could not be parsed.
    BadToUnicode,
    /// A text-show operator ran outside `BT`/`ET` or without a font.
    TextOutsideObject,
    /// A font width table or CMap range overflowed the code space or was
    /// larger than [`MAX_CODE_RANGE`](crate::font::MAX_CODE_RANGE) and was cut short.
    TruncatedRange,
}

impl WarningKind {
    pub fn as_str(self) -> &'static str {
        match self {
            WarningKind::MissingFont => "missing_font",
            WarningKind::MissingXObject => "missing_xobject",
            WarningKind::BadToUnicode => "bad_tounicode",
            WarningKind::TextOutsideObject => "text_outside_object",
            WarningKind::TruncatedRange => "truncated_range",
        }
    }
}

/// A non-fatal problem found while interpreting a page.
///
/// Decoding continues after a warning; the affected text may be missing or
/// decoded with a fallback.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodeWarning {
    pub kind: WarningKind,
    pub description: String,
    /// Page index (0-based), filled in by the page driver.
    pub page: Option<usize>,
    /// Index of the operator in its content stream.
    pub operator_index: Option<usize>,
}

impl DecodeWarning {
    pub fn new(kind: WarningKind, description: impl Into<String>) -> Self {
        Self {
            kind,
            description: description.into(),
            page: None,
            operator_index: None,
        }
    }

    pub fn at_operator(mut self, index: usize) -> Self {
        self.operator_index = Some(index);
        self
    }
}

impl fmt::Display for DecodeWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.kind.as_str(), self.description)?;
        if let Some(page) = self.page {
            write!(f, " (page {})", page + 1)?;
        }
        if let Some(op) = self.operator_index {
            write!(f, " at operator #{op}")?;
        }
        Ok(())
    }
}
