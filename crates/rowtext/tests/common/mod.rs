//! Shared helpers for building receipt PDFs with lopdf.

#![allow(dead_code)]

use lopdf::{Document, Object, ObjectId, Stream, dictionary};

/// A text run drawn at `(x, y)` in PDF points (bottom-left origin).
pub struct Run<'a> {
    pub x: f64,
    pub y: f64,
    pub text: &'a str,
}

pub fn run(x: f64, y: f64, text: &str) -> Run<'_> {
    Run { x, y, text }
}

/// Content stream drawing each run in its own text object.
pub fn content_for(runs: &[Run<'_>]) -> Vec<u8> {
    runs.iter()
        .map(|r| format!("BT /F1 10 Tf {} {} Td ({}) Tj ET\n", r.x, r.y, r.text))
        .collect::<String>()
        .into_bytes()
}

/// A Letter-sized PDF with one page per content stream and a Helvetica
/// `/F1` font.
pub fn pdf_from_contents(contents: &[Vec<u8>]) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id: ObjectId = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
        "Encoding" => "WinAnsiEncoding",
    });

    let mut kids = Vec::new();
    for content in contents {
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.clone()));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "MediaBox" => vec![
                Object::Integer(0),
                Object::Integer(0),
                Object::Integer(612),
                Object::Integer(792),
            ],
            "Contents" => Object::Reference(content_id),
            "Resources" => dictionary! {
                "Font" => dictionary! { "F1" => Object::Reference(font_id) },
            },
        });
        kids.push(Object::Reference(page_id));
    }
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => Object::Integer(contents.len() as i64),
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => Object::Reference(pages_id),
    });
    doc.trailer.set("Root", Object::Reference(catalog_id));

    let mut buf = Vec::new();
    doc.save_to(&mut buf).expect("failed to save test PDF");
    buf
}

pub fn pdf_from_pages(pages: &[Vec<Run<'_>>]) -> Vec<u8> {
    let contents: Vec<Vec<u8>> = pages.iter().map(|runs| content_for(runs)).collect();
    pdf_from_contents(&contents)
}

/// A one-page transfer receipt. Runs are emitted out of visual order and the
/// value columns sit a fraction of a point off their labels' baselines.
pub fn transfer_receipt() -> Vec<u8> {
    pdf_from_pages(&[vec![
        run(250.0, 700.4, "Transfer successful"),
        run(72.0, 660.0, "Date"),
        run(220.0, 659.7, "01/01/2024"),
        run(200.0, 660.0, ":"),
        run(72.0, 640.0, "From"),
        run(200.0, 640.0, ":"),
        run(220.0, 640.2, "000123456789"),
        run(220.0, 620.0, "MUR"),
        run(72.0, 620.0, "Amount"),
        run(250.0, 620.0, "1,500.00"),
        run(200.0, 620.0, ":"),
        run(72.0, 600.0, "Reference"),
        run(200.0, 600.0, ":"),
        run(220.0, 600.0, "TRX-0042"),
    ]])
}
