//! rowtext-parse: PDF decoding into positioned text fragments.
//!
//! Opens a PDF through a pluggable [`PdfBackend`] ([`LopdfBackend`] by
//! default), interprets each page's content stream and reports every
//! text-show operator as a [`Fragment`](rowtext_core::Fragment) in a top-left
//! page coordinate system. The result is a [`rowtext_core::Document`] ready
//! for line reconstruction.

pub mod backend;
pub mod cmap;
pub mod decode;
pub mod encoding;
pub mod error;
pub mod font;
pub mod handler;
mod interpreter;
pub mod lopdf_backend;
pub mod text_state;
pub mod tokenizer;

pub use backend::{MediaBox, PdfBackend};
pub use decode::{
    DEFAULT_MAX_RECURSION_DEPTH, DEFAULT_UNIT_SCALE, DecodeOptions, Decoded, decode_document,
    decode_with,
};
pub use error::{DecodeError, DecodeWarning, WarningKind};
pub use handler::{ContentHandler, FragmentCollector, TextRunEvent};
pub use interpreter::TJ_SPACE_THRESHOLD;
pub use lopdf_backend::{LopdfBackend, LopdfDocument, LopdfPage};
pub use rowtext_core;
