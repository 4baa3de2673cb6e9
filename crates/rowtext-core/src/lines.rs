//! Row-based line reconstruction.
//!
//! Rebuilds human-readable lines from a page's positioned fragments using only
//! their coordinates: fragments are bucketed into rows by a quantized `y`,
//! rows are read top to bottom, and each row is read left to right.

use std::collections::BTreeMap;

use crate::error::ReconstructError;
use crate::fragment::{Document, Fragment, PageFragments};

/// Default row quantization: `y` is multiplied by 10 and rounded, so fragments
/// less than 0.05 units apart share a row and fragments 0.1 or more apart don't.
pub const DEFAULT_RESOLUTION: f64 = 10.0;

/// Options for line reconstruction.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LineOptions {
    /// Multiplier applied to `y` before rounding to a row key (default: 10).
    pub resolution: f64,
}

impl Default for LineOptions {
    fn default() -> Self {
        Self {
            resolution: DEFAULT_RESOLUTION,
        }
    }
}

impl LineOptions {
    /// Options with a custom row resolution.
    pub fn with_resolution(resolution: f64) -> Self {
        Self { resolution }
    }

    /// Check the options without reconstructing anything.
    ///
    /// # Errors
    ///
    /// Returns [`ReconstructError::InvalidResolution`] for a non-positive or
    /// non-finite resolution.
    pub fn validate(&self) -> Result<(), ReconstructError> {
        if self.resolution.is_finite() && self.resolution > 0.0 {
            Ok(())
        } else {
            Err(ReconstructError::InvalidResolution(self.resolution))
        }
    }
}

/// Reconstructed lines for a whole document.
///
/// Each page contributes its non-empty lines followed by exactly one empty
/// string marking the page boundary. Empty strings appear nowhere else.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(transparent)
)]
pub struct LineSequence {
    lines: Vec<String>,
}

impl LineSequence {
    /// All lines, page separators included.
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn into_vec(self) -> Vec<String> {
        self.lines
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Lines grouped per page, separators removed.
    pub fn pages(&self) -> Vec<&[String]> {
        let mut pages: Vec<&[String]> = self.lines.split(|line| line.is_empty()).collect();
        // The trailing separator (or an empty sequence) leaves one empty tail.
        if self.lines.last().is_none_or(|line| line.is_empty()) {
            pages.pop();
        }
        pages
    }

    /// Join every line, separators included, with `sep`.
    pub fn joined(&self, sep: &str) -> String {
        self.lines.join(sep)
    }

    /// The lines joined with a single space, the form receipt checks run against.
    pub fn text(&self) -> String {
        self.joined(" ")
    }

    /// Whether `needle` occurs anywhere in [`LineSequence::text`].
    pub fn contains(&self, needle: &str) -> bool {
        self.text().contains(needle)
    }
}

impl From<Vec<String>> for LineSequence {
    fn from(lines: Vec<String>) -> Self {
        Self { lines }
    }
}

impl IntoIterator for LineSequence {
    type Item = String;
    type IntoIter = std::vec::IntoIter<String>;

    fn into_iter(self) -> Self::IntoIter {
        self.lines.into_iter()
    }
}

impl<'a> IntoIterator for &'a LineSequence {
    type Item = &'a String;
    type IntoIter = std::slice::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.lines.iter()
    }
}

/// Quantize a vertical coordinate into an integer row key.
///
/// Returns `None` when the scaled value is not finite or does not fit in an `i64`.
pub fn row_key(y: f64, resolution: f64) -> Option<i64> {
    let scaled = (y * resolution).round();
    // i64::MAX as f64 rounds up to 2^63, which is itself out of range.
    if scaled.is_finite() && scaled >= i64::MIN as f64 && scaled < i64::MAX as f64 {
        Some(scaled as i64)
    } else {
        None
    }
}

/// Collapse every whitespace run to one space and trim both ends.
pub fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Reconstruct the lines of a single page, without the page separator.
///
/// # Errors
///
/// Returns [`ReconstructError::InvalidResolution`] for a non-positive or
/// non-finite resolution, and [`ReconstructError::MalformedFragment`] for a
/// fragment whose coordinates are not finite.
pub fn reconstruct_page(
    page: &PageFragments,
    options: &LineOptions,
) -> Result<Vec<String>, ReconstructError> {
    options.validate()?;

    let mut rows: BTreeMap<i64, Vec<&Fragment>> = BTreeMap::new();
    for (index, fragment) in page.fragments.iter().enumerate() {
        if !fragment.has_finite_position() {
            return Err(ReconstructError::malformed(
                page.page_number,
                index,
                format!("non-finite position ({}, {})", fragment.x, fragment.y),
            ));
        }
        let key = row_key(fragment.y, options.resolution).ok_or_else(|| {
            ReconstructError::malformed(
                page.page_number,
                index,
                format!("y = {} is out of range for row quantization", fragment.y),
            )
        })?;
        rows.entry(key).or_default().push(fragment);
    }

    let mut lines = Vec::with_capacity(rows.len());
    for mut row in rows.into_values() {
        // sort_by is stable: runs at exactly the same x keep decoder order.
        row.sort_by(|a, b| a.x.total_cmp(&b.x));
        let joined = row
            .iter()
            .map(|f| f.text.as_str())
            .collect::<Vec<_>>()
            .join(" ");
        let line = normalize_whitespace(&joined);
        if !line.is_empty() {
            lines.push(line);
        }
    }
    Ok(lines)
}

/// Reconstruct the lines of every page, in page order, each page followed by
/// one empty separator line.
///
/// # Errors
///
/// Fails on the first page that [`reconstruct_page`] rejects.
pub fn reconstruct(
    document: &Document,
    options: &LineOptions,
) -> Result<LineSequence, ReconstructError> {
    options.validate()?;
    let mut lines = Vec::new();
    for page in &document.pages {
        lines.extend(reconstruct_page(page, options)?);
        lines.push(String::new());
    }
    Ok(LineSequence { lines })
}

/// [`reconstruct`] with [`LineOptions::default`].
pub fn reconstruct_default(document: &Document) -> Result<LineSequence, ReconstructError> {
    reconstruct(document, &LineOptions::default())
}
