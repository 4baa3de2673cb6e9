//! Top-level PDF document type.

use rowtext_core::{
    Document, LineMatch, LineOptions, LineSequence, SearchOptions, reconstruct, reconstruct_page,
    search_lines,
};
use rowtext_parse::{DecodeOptions, DecodeWarning, LopdfBackend, decode_with};

use crate::error::Error;

/// Options for opening a PDF and rebuilding its lines.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Options {
    /// How the PDF is decoded into fragments.
    pub decode: DecodeOptions,
    /// How fragments are grouped into lines.
    pub lines: LineOptions,
    /// Reject inputs larger than this many bytes before parsing.
    pub max_input_bytes: Option<usize>,
}

impl Options {
    pub fn with_resolution(mut self, resolution: f64) -> Self {
        self.lines = LineOptions::with_resolution(resolution);
        self
    }

    pub fn with_unit_scale(mut self, unit_scale: f64) -> Self {
        self.decode.unit_scale = unit_scale;
        self
    }
}

/// A decoded PDF, ready for line reconstruction.
///
/// Decoding happens once in [`Pdf::open`]; every later call works on the
/// decoded fragments.
///
/// # Example
///
/// ```ignore
/// let pdf = Pdf::open(bytes, None)?;
/// let lines = pdf.lines()?;
/// assert!(lines.contains("Amount : MUR 100.00"));
/// ```
#[derive(Debug, Clone)]
pub struct Pdf {
    document: Document,
    warnings: Vec<DecodeWarning>,
    options: Options,
}

impl Pdf {
    /// Decode a PDF from bytes.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InputTooLarge`] if `bytes` exceeds
    /// `options.max_input_bytes`, and [`Error::Decode`] if decoding fails.
    pub fn open(bytes: &[u8], options: Option<Options>) -> Result<Self, Error> {
        let options = options.unwrap_or_default();
        if let Some(limit) = options.max_input_bytes {
            if bytes.len() > limit {
                return Err(Error::InputTooLarge {
                    limit,
                    actual: bytes.len(),
                });
            }
        }

        let decoded = decode_with::<LopdfBackend>(bytes, &options.decode)?;

        #[cfg(feature = "tracing")]
        tracing::info!(
            pages = decoded.document.page_count(),
            fragments = decoded.document.fragment_count(),
            warnings = decoded.warnings.len(),
            "decoded PDF"
        );

        Ok(Self {
            document: decoded.document,
            warnings: decoded.warnings,
            options,
        })
    }

    /// Read and decode a PDF file.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if the file cannot be read, otherwise the errors
    /// of [`Pdf::open`].
    #[cfg(feature = "std")]
    pub fn open_file(
        path: impl AsRef<std::path::Path>,
        options: Option<Options>,
    ) -> Result<Self, Error> {
        let bytes = std::fs::read(path.as_ref())?;
        Self::open(&bytes, options)
    }

    pub fn page_count(&self) -> usize {
        self.document.page_count()
    }

    /// The decoded fragments.
    pub fn document(&self) -> &Document {
        &self.document
    }

    /// Non-fatal problems found while decoding.
    pub fn warnings(&self) -> &[DecodeWarning] {
        &self.warnings
    }

    pub fn options(&self) -> &Options {
        &self.options
    }

    /// All lines of the document, one `""` separator after each page.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Reconstruct`] for fragments with non-finite
    /// coordinates or an invalid resolution.
    pub fn lines(&self) -> Result<LineSequence, Error> {
        Ok(reconstruct(&self.document, &self.options.lines)?)
    }

    /// Lines of one page (0-based), without the page separator.
    ///
    /// # Errors
    ///
    /// Returns [`Error::PageOutOfRange`] for an index past the last page.
    pub fn page_lines(&self, index: usize) -> Result<Vec<String>, Error> {
        let page = self
            .document
            .pages
            .get(index)
            .ok_or(Error::PageOutOfRange {
                index,
                count: self.page_count(),
            })?;
        Ok(reconstruct_page(page, &self.options.lines)?)
    }

    /// Search the reconstructed lines for `pattern`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Search`] for an invalid regex.
    pub fn search(&self, pattern: &str, options: &SearchOptions) -> Result<Vec<LineMatch>, Error> {
        let lines = self.lines()?;
        Ok(search_lines(&lines, pattern, options)?)
    }
}
