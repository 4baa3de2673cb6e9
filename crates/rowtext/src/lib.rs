//! rowtext: Rebuild the visual text lines of PDF receipts.
//!
//! This is the public API facade. It re-exports the fragment model and line
//! reconstruction from rowtext-core and uses rowtext-parse to decode PDFs.
//!
//! # Architecture
//!
//! - **rowtext-core**: fragment model, row-based line reconstruction, receipt checks
//! - **rowtext-parse**: PDF decoding into positioned text fragments
//! - **rowtext** (this crate): [`Pdf`] and [`verify_receipt`], tying both together
//!
//! # Example
//!
//! ```ignore
//! let pdf = rowtext::Pdf::open_file("receipt.pdf", None)?;
//! for line in pdf.lines()?.lines() {
//!     println!("{line}");
//! }
//! ```

mod error;
mod pdf;
mod verify;

pub use error::Error;
pub use pdf::{Options, Pdf};
#[cfg(feature = "std")]
pub use verify::verify_receipt;
pub use verify::VerifyError;

pub use rowtext_core::{
    DEFAULT_RESOLUTION, Document, FieldReport, Fragment, LineMatch, LineOptions, LineSequence,
    PageFragments, ReceiptField, ReconstructError, SearchError, SearchOptions, check_fields,
    reconstruct, reconstruct_default, search_lines,
};
pub use rowtext_parse::{
    DEFAULT_UNIT_SCALE, DecodeError, DecodeOptions, DecodeWarning, WarningKind,
};

pub use rowtext_core;
pub use rowtext_parse;
