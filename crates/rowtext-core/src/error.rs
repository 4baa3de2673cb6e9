//! Error types for line reconstruction.
//!
//! Provides [`ReconstructError`] for input that cannot be turned into lines.
//! Decoder failures live in `rowtext-parse`; this crate never sees raw PDF bytes.

use std::fmt;

/// Fatal error raised while reconstructing lines from fragments.
#[derive(Debug, Clone, PartialEq)]
pub enum ReconstructError {
    /// A fragment lacks usable coordinate or text data.
    MalformedFragment {
        /// Page number (0-indexed) of the offending fragment.
        page: usize,
        /// Index of the fragment within its page.
        index: usize,
        /// What is wrong with it.
        reason: String,
    },
    /// The row quantization resolution is not a positive finite number.
    InvalidResolution(f64),
}

impl ReconstructError {
    /// Build a [`ReconstructError::MalformedFragment`].
    pub fn malformed(page: usize, index: usize, reason: impl Into<String>) -> Self {
        ReconstructError::MalformedFragment {
            page,
            index,
            reason: reason.into(),
        }
    }
}

impl fmt::Display for ReconstructError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReconstructError::MalformedFragment {
                page,
                index,
                reason,
            } => write!(
                f,
                "malformed fragment {index} on page {}: {reason}",
                page + 1
            ),
            ReconstructError::InvalidResolution(value) => {
                write!(f, "invalid row resolution: {value} (must be positive and finite)")
            }
        }
    }
}

impl std::error::Error for ReconstructError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn malformed_fragment_display_uses_one_based_page() {
        let err = ReconstructError::malformed(0, 3, "y is NaN");
        assert_eq!(err.to_string(), "malformed fragment 3 on page 1: y is NaN");
    }

    #[test]
    fn invalid_resolution_display() {
        let err = ReconstructError::InvalidResolution(-1.0);
        assert!(err.to_string().contains("-1"));
        assert!(err.to_string().contains("positive"));
    }

    #[test]
    fn implements_std_error() {
        let err: Box<dyn std::error::Error> = Box::new(ReconstructError::InvalidResolution(0.0));
        assert!(err.to_string().contains("resolution"));
    }
}
