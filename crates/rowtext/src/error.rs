//! Facade error type.

use rowtext_core::{ReconstructError, SearchError};
use rowtext_parse::DecodeError;
use thiserror::Error;

/// Errors returned by [`Pdf`](crate::Pdf).
#[derive(Debug, Error)]
pub enum Error {
    /// The PDF could not be decoded.
    #[error(transparent)]
    Decode(#[from] DecodeError),

    /// Decoded fragments could not be turned into lines.
    #[error(transparent)]
    Reconstruct(#[from] ReconstructError),

    #[error(transparent)]
    Search(#[from] SearchError),

    /// Reading the input file failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The input is larger than [`Options::max_input_bytes`](crate::Options::max_input_bytes).
    #[error("input is {actual} bytes, over the {limit} byte limit")]
    InputTooLarge { limit: usize, actual: usize },

    /// A page index past the end of the document.
    #[error("page index {index} out of range (document has {count} pages)")]
    PageOutOfRange { index: usize, count: usize },
}
