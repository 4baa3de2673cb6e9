//! Whole-document decoding into the fragment model.

use rowtext_core::Document;

use crate::backend::PdfBackend;
use crate::error::{DecodeError, DecodeWarning};
use crate::handler::FragmentCollector;
use crate::lopdf_backend::LopdfBackend;

/// PDF points per fragment coordinate unit.
pub const DEFAULT_UNIT_SCALE: f64 = 16.0;
/// Form XObject nesting allowed below a page's content stream.
pub const DEFAULT_MAX_RECURSION_DEPTH: usize = 10;

/// Options for decoding a PDF into fragments.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodeOptions {
    /// Maximum form XObject nesting depth (default: 10).
    pub max_recursion_depth: usize,
    /// PDF points per output unit (default: 16.0). Use 1.0 for plain points.
    pub unit_scale: f64,
}

impl Default for DecodeOptions {
    fn default() -> Self {
        Self {
            max_recursion_depth: DEFAULT_MAX_RECURSION_DEPTH,
            unit_scale: DEFAULT_UNIT_SCALE,
        }
    }
}

impl DecodeOptions {
    pub fn with_unit_scale(mut self, unit_scale: f64) -> Self {
        self.unit_scale = unit_scale;
        self
    }

    fn validate(&self) -> Result<(), DecodeError> {
        if !self.unit_scale.is_finite() || self.unit_scale <= 0.0 {
            return Err(DecodeError::InvalidUnitScale(self.unit_scale));
        }
        Ok(())
    }
}

/// A decoded document together with the warnings raised along the way.
#[derive(Debug, Clone)]
pub struct Decoded {
    pub document: Document,
    pub warnings: Vec<DecodeWarning>,
}

/// Decode every page of `bytes` with backend `B`, in page order.
///
/// # Errors
///
/// Returns the first fatal [`DecodeError`]; nothing is returned for pages
/// decoded before it.
pub fn decode_with<B: PdfBackend>(
    bytes: &[u8],
    options: &DecodeOptions,
) -> Result<Decoded, DecodeError> {
    options.validate()?;
    let doc = B::open(bytes).map_err(Into::into)?;
    let count = B::page_count(&doc);

    let mut pages = Vec::with_capacity(count);
    let mut warnings = Vec::new();
    for index in 0..count {
        let page = B::get_page(&doc, index).map_err(Into::into)?;
        let media_box = B::page_media_box(&doc, &page).map_err(Into::into)?;
        let mut collector = FragmentCollector::new(index, media_box, options.unit_scale);
        B::interpret_page(&doc, &page, &mut collector, options).map_err(Into::into)?;
        let (fragments, page_warnings) = collector.finish();

        #[cfg(feature = "tracing")]
        tracing::debug!(
            page = index,
            fragments = fragments.len(),
            warnings = page_warnings.len(),
            "decoded page"
        );

        pages.push(fragments);
        warnings.extend(page_warnings);
    }

    Ok(Decoded {
        document: Document::new(pages),
        warnings,
    })
}

/// Decode a PDF into a [`Document`] with the lopdf backend.
///
/// # Errors
///
/// See [`decode_with`].
pub fn decode_document(bytes: &[u8], options: &DecodeOptions) -> Result<Document, DecodeError> {
    decode_with::<LopdfBackend>(bytes, options).map(|d| d.document)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_options() {
        let opts = DecodeOptions::default();
        assert_eq!(opts.max_recursion_depth, 10);
        assert_eq!(opts.unit_scale, 16.0);
    }

    #[test]
    fn invalid_unit_scale_is_rejected_before_parsing() {
        for scale in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            let opts = DecodeOptions::default().with_unit_scale(scale);
            let err = decode_document(b"not a pdf", &opts).unwrap_err();
            assert!(matches!(err, DecodeError::InvalidUnitScale(_)));
        }
    }

    #[test]
    fn garbage_is_a_parse_error() {
        let err = decode_document(b"not a pdf", &DecodeOptions::default()).unwrap_err();
        assert!(matches!(err, DecodeError::Parse(_)));
    }
}
