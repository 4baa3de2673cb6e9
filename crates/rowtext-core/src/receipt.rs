//! Receipt field checks over reconstructed lines.
//!
//! A receipt renders each field as `"<Label> : <value>"` on one line. A field
//! is present when that text occurs in the space-joined line sequence.

use std::fmt;

use crate::lines::LineSequence;

/// One expected receipt field.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ReceiptField {
    pub label: String,
    pub value: String,
}

impl ReceiptField {
    pub fn new(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
        }
    }

    /// A monetary field rendered as `"<currency> <amount>"` with two decimals.
    pub fn amount(label: impl Into<String>, currency: &str, amount: f64) -> Self {
        Self::new(label, format!("{currency} {amount:.2}"))
    }

    /// The text this field produces on the receipt.
    pub fn expected_text(&self) -> String {
        format!("{} : {}", self.label, self.value)
    }
}

impl fmt::Display for ReceiptField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} : {}", self.label, self.value)
    }
}

/// Outcome of checking a set of fields against a receipt.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FieldReport {
    /// Fields found on the receipt, in the order they were requested.
    pub matched: Vec<ReceiptField>,
    /// Fields not found, in the order they were requested.
    pub missing: Vec<ReceiptField>,
}

impl FieldReport {
    /// True when every requested field was found.
    pub fn is_complete(&self) -> bool {
        self.missing.is_empty()
    }
}

/// Check which `fields` appear in `lines`.
pub fn check_fields(lines: &LineSequence, fields: &[ReceiptField]) -> FieldReport {
    let text = lines.text();
    let mut report = FieldReport::default();
    for field in fields {
        if text.contains(&field.expected_text()) {
            report.matched.push(field.clone());
        } else {
            report.missing.push(field.clone());
        }
    }
    report
}
