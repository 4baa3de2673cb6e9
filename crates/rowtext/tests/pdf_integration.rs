//! Integration tests for the Pdf public API.
//!
//! PDF bytes → Pdf::open → lines / page_lines / search. Test PDFs are built
//! with lopdf.

mod common;

use common::{pdf_from_contents, pdf_from_pages, run, transfer_receipt};
use rowtext::{Error, Options, Pdf, SearchOptions};

#[test]
fn transfer_receipt_lines() {
    let pdf = Pdf::open(&transfer_receipt(), None).unwrap();
    assert_eq!(pdf.page_count(), 1);
    assert!(pdf.warnings().is_empty());
    assert_eq!(
        pdf.lines().unwrap().into_vec(),
        vec![
            "Transfer successful",
            "Date : 01/01/2024",
            "From : 000123456789",
            "Amount : MUR 1,500.00",
            "Reference : TRX-0042",
            "",
        ]
    );
}

#[test]
fn open_file_matches_open() {
    let bytes = transfer_receipt();
    let file = tempfile::NamedTempFile::new().unwrap();
    std::fs::write(file.path(), &bytes).unwrap();

    let from_file = Pdf::open_file(file.path(), None).unwrap();
    let from_bytes = Pdf::open(&bytes, None).unwrap();
    assert_eq!(from_file.lines().unwrap(), from_bytes.lines().unwrap());
    assert_eq!(from_file.document(), from_bytes.document());
}

#[test]
fn page_lines_per_page() {
    let bytes = pdf_from_pages(&[
        vec![run(72.0, 700.0, "page one")],
        vec![run(72.0, 700.0, "page two"), run(72.0, 680.0, "second line")],
    ]);
    let pdf = Pdf::open(&bytes, None).unwrap();
    assert_eq!(pdf.page_lines(1).unwrap(), vec!["page two", "second line"]);
    assert_eq!(
        pdf.lines().unwrap().pages(),
        vec![&["page one".to_string()][..], &["page two".to_string(), "second line".to_string()][..]]
    );

    let err = pdf.page_lines(2).unwrap_err();
    assert!(matches!(err, Error::PageOutOfRange { index: 2, count: 2 }));
}

#[test]
fn blank_page_still_gets_separator() {
    let bytes = pdf_from_contents(&[Vec::new()]);
    let pdf = Pdf::open(&bytes, None).unwrap();
    assert_eq!(pdf.lines().unwrap().into_vec(), vec![""]);
}

#[test]
fn resolution_option_changes_grouping() {
    // Baselines 3 pt apart: 0.1875 layout units.
    let bytes = pdf_from_pages(&[vec![run(72.0, 700.0, "upper"), run(300.0, 697.0, "lower")]]);

    let merged = Pdf::open(&bytes, Some(Options::default().with_resolution(2.0))).unwrap();
    assert_eq!(merged.lines().unwrap().into_vec(), vec!["upper lower", ""]);

    let split = Pdf::open(&bytes, None).unwrap();
    assert_eq!(split.lines().unwrap().into_vec(), vec!["upper", "lower", ""]);
}

#[test]
fn search_finds_reference_line() {
    let pdf = Pdf::open(&transfer_receipt(), None).unwrap();
    let matches = pdf.search(r"TRX-\d+", &SearchOptions::default()).unwrap();
    assert_eq!(matches.len(), 1);
    assert_eq!(matches[0].line, "Reference : TRX-0042");
    assert_eq!(matches[0].line_index, 4);

    let err = pdf.search("(", &SearchOptions::default()).unwrap_err();
    assert!(matches!(err, Error::Search(_)));
}

#[test]
fn invalid_resolution_surfaces_as_reconstruct_error() {
    let pdf = Pdf::open(&transfer_receipt(), Some(Options::default().with_resolution(0.0))).unwrap();
    assert!(matches!(pdf.lines().unwrap_err(), Error::Reconstruct(_)));
}

#[test]
fn max_input_bytes_allows_small_files() {
    let bytes = transfer_receipt();
    let opts = Options {
        max_input_bytes: Some(bytes.len()),
        ..Default::default()
    };
    assert!(Pdf::open(&bytes, Some(opts.clone())).is_ok());

    let opts = Options {
        max_input_bytes: Some(bytes.len() - 1),
        ..opts
    };
    assert!(matches!(
        Pdf::open(&bytes, Some(opts)).unwrap_err(),
        Error::InputTooLarge { .. }
    ));
}

#[cfg(feature = "serde")]
#[test]
fn lines_serialize_as_a_plain_array() {
    let pdf = Pdf::open(&transfer_receipt(), None).unwrap();
    let json = serde_json::to_value(pdf.lines().unwrap()).unwrap();
    assert_eq!(json[0], "Transfer successful");
    assert_eq!(json.as_array().unwrap().last().unwrap(), "");
}
