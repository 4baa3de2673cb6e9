//! rowtext-core: Backend-independent data types and algorithms.
//!
//! This crate provides the fragment model produced by a PDF decoder
//! ([`Fragment`], [`PageFragments`], [`Document`]), the row-based line
//! reconstruction that turns those fragments into a [`LineSequence`], and the
//! receipt field checks and line search used by callers of that sequence.
//! It does no I/O.

pub mod error;
pub mod fragment;
pub mod lines;
pub mod receipt;
pub mod search;

pub use error::ReconstructError;
pub use fragment::{Document, EncodedTextError, Fragment, PageFragments};
pub use lines::{
    DEFAULT_RESOLUTION, LineOptions, LineSequence, normalize_whitespace, reconstruct,
    reconstruct_default, reconstruct_page, row_key,
};
pub use receipt::{FieldReport, ReceiptField, check_fields};
pub use search::{LineMatch, SearchError, SearchOptions, search_lines};
