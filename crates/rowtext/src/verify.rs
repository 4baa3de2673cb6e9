//! Receipt verification: decode, rebuild lines, check expected fields.

use rowtext_core::{FieldReport, ReceiptField, ReconstructError, check_fields};
use thiserror::Error;

use crate::error::Error;
use crate::pdf::{Options, Pdf};

/// Why a receipt failed verification.
///
/// A receipt that cannot be decoded is a different failure from one that
/// decodes but lacks an expected field; callers usually report the first as
/// a broken file and the second as a content mismatch.
#[derive(Debug, Error)]
pub enum VerifyError {
    /// The caller's options cannot rebuild lines for any receipt.
    #[error("invalid verification options: {0}")]
    InvalidOptions(ReconstructError),

    /// The receipt could not be opened or decoded.
    #[error("receipt could not be decoded: {0}")]
    Decode(#[from] Error),

    /// The receipt decoded but some expected fields are absent.
    #[error("receipt is missing {} expected field(s): {}", .missing.len(), list(.missing))]
    MissingFields {
        missing: Vec<ReceiptField>,
        /// The reconstructed text the fields were searched in.
        text: String,
    },
}

fn list(fields: &[ReceiptField]) -> String {
    fields
        .iter()
        .map(|f| format!("\"{f}\""))
        .collect::<Vec<_>>()
        .join(", ")
}

impl Pdf {
    /// Check the reconstructed text for every field in `fields`.
    ///
    /// # Errors
    ///
    /// Returns [`VerifyError::MissingFields`] when any field is absent and
    /// [`VerifyError::Decode`] when lines cannot be rebuilt. A bad row
    /// resolution in [`Options::lines`] is [`VerifyError::InvalidOptions`].
    pub fn verify(&self, fields: &[ReceiptField]) -> Result<FieldReport, VerifyError> {
        self.options()
            .lines
            .validate()
            .map_err(VerifyError::InvalidOptions)?;
        let lines = self.lines()?;
        let report = check_fields(&lines, fields);
        if report.is_complete() {
            return Ok(report);
        }

        #[cfg(feature = "tracing")]
        tracing::warn!(missing = report.missing.len(), "receipt fields missing");

        Err(VerifyError::MissingFields {
            missing: report.missing,
            text: lines.text(),
        })
    }
}

/// Open the receipt at `path` and check it for `fields`.
///
/// ```ignore
/// let fields = [
///     ReceiptField::new("Date", "01/01/2024"),
///     ReceiptField::amount("Amount", "MUR", 100.0),
/// ];
/// verify_receipt("receipt.pdf", &fields, None)?;
/// ```
///
/// # Errors
///
/// See [`Pdf::verify`]. File and decode failures are [`VerifyError::Decode`].
/// Options are checked before the file is read.
#[cfg(feature = "std")]
pub fn verify_receipt(
    path: impl AsRef<std::path::Path>,
    fields: &[ReceiptField],
    options: Option<Options>,
) -> Result<FieldReport, VerifyError> {
    if let Some(options) = &options {
        options
            .lines
            .validate()
            .map_err(VerifyError::InvalidOptions)?;
    }
    let pdf = Pdf::open_file(path, options)?;
    pdf.verify(fields)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_display_lists_expected_text() {
        let err = VerifyError::MissingFields {
            missing: vec![
                ReceiptField::new("To", "000987"),
                ReceiptField::amount("Amount", "MUR", 5.0),
            ],
            text: String::new(),
        };
        assert_eq!(
            err.to_string(),
            "receipt is missing 2 expected field(s): \"To : 000987\", \"Amount : MUR 5.00\""
        );
    }

    #[test]
    fn unreadable_file_is_a_decode_failure() {
        let err = verify_receipt("/no/such/receipt.pdf", &[], None).unwrap_err();
        assert!(matches!(err, VerifyError::Decode(Error::Io(_))));
    }

    #[test]
    fn bad_resolution_is_not_a_decode_failure() {
        let options = Options::default().with_resolution(0.0);
        let err = verify_receipt("/no/such/receipt.pdf", &[], Some(options)).unwrap_err();
        assert!(matches!(
            err,
            VerifyError::InvalidOptions(ReconstructError::InvalidResolution(r)) if r == 0.0
        ));
        assert_eq!(
            err.to_string(),
            "invalid verification options: invalid row resolution: 0 (must be positive and finite)"
        );
    }
}
