//! Content handler callback trait and the fragment-collecting handler.
//!
//! The interpreter reports every text-show operator through
//! [`ContentHandler::on_text_run`]. [`FragmentCollector`] turns those events
//! into the page-local [`Fragment`]s the reconstructor consumes.

use rowtext_core::{Fragment, PageFragments};

use crate::backend::MediaBox;
use crate::error::DecodeWarning;

/// One text-show operator (`Tj`, `TJ`, `'`, `"`) as seen by the interpreter.
#[derive(Debug, Clone, PartialEq)]
pub struct TextRunEvent {
    /// Decoded text of the whole operator.
    pub text: String,
    /// Origin of the run in user space (PDF points, bottom-left origin).
    pub x: f64,
    pub y: f64,
    /// Resource name of the active font (`F1`).
    pub font_name: String,
    pub font_size: f64,
    /// Index of the operator in its content stream.
    pub operator_index: usize,
}

/// Callback handler for content stream interpretation.
///
/// Both methods default to no-ops so handlers can subscribe to only what
/// they need.
pub trait ContentHandler {
    /// Called once per text-show operator.
    fn on_text_run(&mut self, _event: TextRunEvent) {}

    /// Called for non-fatal problems. Interpretation continues afterwards.
    fn on_warning(&mut self, _warning: DecodeWarning) {}
}

/// Collects text runs of one page as [`Fragment`]s.
///
/// Positions move to a top-left origin at the MediaBox corner and are divided
/// by `unit_scale`.
#[derive(Debug)]
pub struct FragmentCollector {
    page: PageFragments,
    media_box: MediaBox,
    unit_scale: f64,
    warnings: Vec<DecodeWarning>,
}

impl FragmentCollector {
    pub fn new(page_number: usize, media_box: MediaBox, unit_scale: f64) -> Self {
        Self {
            page: PageFragments::new(page_number),
            media_box,
            unit_scale,
            warnings: Vec::new(),
        }
    }

    /// Map a user-space point to fragment coordinates.
    pub fn to_page_units(&self, x: f64, y: f64) -> (f64, f64) {
        (
            (x - self.media_box.x0) / self.unit_scale,
            (self.media_box.y1 - y) / self.unit_scale,
        )
    }

    pub fn warnings(&self) -> &[DecodeWarning] {
        &self.warnings
    }

    pub fn finish(self) -> (PageFragments, Vec<DecodeWarning>) {
        (self.page, self.warnings)
    }
}

impl ContentHandler for FragmentCollector {
    fn on_text_run(&mut self, event: TextRunEvent) {
        if event.text.is_empty() {
            return;
        }
        let (x, y) = self.to_page_units(event.x, event.y);
        self.page.push(Fragment::new(x, y, event.text));
    }

    fn on_warning(&mut self, mut warning: DecodeWarning) {
        warning.page = Some(self.page.page_number);
        #[cfg(feature = "tracing")]
        tracing::warn!(page = self.page.page_number, "{warning}");
        self.warnings.push(warning);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::WarningKind;

    fn run(text: &str, x: f64, y: f64) -> TextRunEvent {
        TextRunEvent {
            text: text.to_string(),
            x,
            y,
            font_name: "F1".to_string(),
            font_size: 12.0,
            operator_index: 0,
        }
    }

    struct NoopHandler;
    impl ContentHandler for NoopHandler {}

    #[test]
    fn noop_handler_accepts_events() {
        let mut h = NoopHandler;
        h.on_text_run(run("x", 0.0, 0.0));
        h.on_warning(DecodeWarning::new(WarningKind::MissingFont, "gone"));
    }

    #[test]
    fn collector_flips_y_and_scales() {
        let mut c = FragmentCollector::new(2, MediaBox::new(0.0, 0.0, 612.0, 792.0), 16.0);
        c.on_text_run(run("Total", 32.0, 760.0));
        let (page, warnings) = c.finish();
        assert!(warnings.is_empty());
        assert_eq!(page.page_number, 2);
        assert_eq!(page.fragments, vec![Fragment::new(2.0, 2.0, "Total")]);
    }

    #[test]
    fn collector_honors_media_box_offset() {
        let c = FragmentCollector::new(0, MediaBox::new(10.0, 20.0, 110.0, 220.0), 1.0);
        assert_eq!(c.to_page_units(10.0, 220.0), (0.0, 0.0));
        assert_eq!(c.to_page_units(60.0, 120.0), (50.0, 100.0));
    }

    #[test]
    fn collector_skips_empty_runs() {
        let mut c = FragmentCollector::new(0, MediaBox::new(0.0, 0.0, 100.0, 100.0), 1.0);
        c.on_text_run(run("", 1.0, 1.0));
        c.on_text_run(run(" ", 1.0, 1.0));
        assert_eq!(c.finish().0.len(), 1);
    }

    #[test]
    fn collector_tags_warnings_with_page() {
        let mut c = FragmentCollector::new(4, MediaBox::new(0.0, 0.0, 100.0, 100.0), 1.0);
        c.on_warning(DecodeWarning::new(WarningKind::MissingXObject, "no /Fm0"));
        assert_eq!(c.warnings()[0].page, Some(4));
    }
}
