//! PDF parsing backend trait.
//!
//! [`PdfBackend`] abstracts opening a document, walking its pages and running
//! the content stream interpreter over a page. [`LopdfBackend`] is the only
//! implementation shipped.
//!
//! [`LopdfBackend`]: crate::lopdf_backend::LopdfBackend

use crate::decode::DecodeOptions;
use crate::error::DecodeError;
use crate::handler::ContentHandler;

/// A page's MediaBox in PDF user space (bottom-left origin), normalized so
/// that `x0 <= x1` and `y0 <= y1`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MediaBox {
    pub x0: f64,
    pub y0: f64,
    pub x1: f64,
    pub y1: f64,
}

impl MediaBox {
    /// US Letter, used when a page tree declares no MediaBox.
    pub const LETTER: MediaBox = MediaBox {
        x0: 0.0,
        y0: 0.0,
        x1: 612.0,
        y1: 792.0,
    };

    pub fn new(x0: f64, y0: f64, x1: f64, y1: f64) -> Self {
        Self {
            x0: x0.min(x1),
            y0: y0.min(y1),
            x1: x0.max(x1),
            y1: y0.max(y1),
        }
    }

    pub fn width(&self) -> f64 {
        self.x1 - self.x0
    }

    pub fn height(&self) -> f64 {
        self.y1 - self.y0
    }
}

/// Trait abstracting PDF parsing operations.
///
/// # Usage
///
/// ```ignore
/// let doc = MyBackend::open(pdf_bytes)?;
/// let page = MyBackend::get_page(&doc, 0)?;
/// let media_box = MyBackend::page_media_box(&doc, &page)?;
/// MyBackend::interpret_page(&doc, &page, &mut handler, &options)?;
/// ```
pub trait PdfBackend {
    /// The parsed PDF document type.
    type Document;

    /// A reference to a single page within a document.
    type Page;

    /// Backend-specific error type, convertible to [`DecodeError`].
    type Error: std::error::Error + Into<DecodeError>;

    /// Parse PDF bytes into a document.
    ///
    /// # Errors
    ///
    /// Returns an error if the bytes are not a readable, unencrypted PDF.
    fn open(bytes: &[u8]) -> Result<Self::Document, Self::Error>;

    fn page_count(doc: &Self::Document) -> usize;

    /// Access a page by 0-based index.
    ///
    /// # Errors
    ///
    /// Returns an error if the index is out of range.
    fn get_page(doc: &Self::Document, index: usize) -> Result<Self::Page, Self::Error>;

    /// The page's MediaBox, inherited from the page tree when needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the MediaBox entry exists but is malformed.
    fn page_media_box(doc: &Self::Document, page: &Self::Page) -> Result<MediaBox, Self::Error>;

    /// Interpret the page's content stream, calling back into `handler`.
    ///
    /// # Errors
    ///
    /// Returns an error if the content stream cannot be read or tokenized, or
    /// if form XObjects nest deeper than `options.max_recursion_depth`.
    fn interpret_page(
        doc: &Self::Document,
        page: &Self::Page,
        handler: &mut dyn ContentHandler,
        options: &DecodeOptions,
    ) -> Result<(), Self::Error>;
}
