//! lopdf-based PDF parsing backend.
//!
//! Implements [`PdfBackend`] using the [lopdf](https://crates.io/crates/lopdf)
//! crate for document structure, stream decompression and object lookup.

use std::sync::LazyLock;

use crate::backend::{MediaBox, PdfBackend};
use crate::decode::DecodeOptions;
use crate::error::DecodeError;
use crate::handler::ContentHandler;
use crate::interpreter::Interpreter;

/// A parsed PDF document backed by lopdf.
pub struct LopdfDocument {
    inner: lopdf::Document,
    /// Page object IDs in page order.
    page_ids: Vec<lopdf::ObjectId>,
}

impl LopdfDocument {
    /// Access the underlying lopdf document.
    pub fn inner(&self) -> &lopdf::Document {
        &self.inner
    }
}

impl std::fmt::Debug for LopdfDocument {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LopdfDocument")
            .field("page_count", &self.page_ids.len())
            .finish_non_exhaustive()
    }
}

/// A page within a [`LopdfDocument`].
#[derive(Debug, Clone, Copy)]
pub struct LopdfPage {
    pub object_id: lopdf::ObjectId,
    /// 0-based page index.
    pub index: usize,
}

/// The lopdf-based PDF backend.
///
/// ```ignore
/// use rowtext_parse::{LopdfBackend, PdfBackend};
///
/// let doc = LopdfBackend::open(pdf_bytes)?;
/// let page = LopdfBackend::get_page(&doc, 0)?;
/// ```
pub struct LopdfBackend;

impl PdfBackend for LopdfBackend {
    type Document = LopdfDocument;
    type Page = LopdfPage;
    type Error = DecodeError;

    fn open(bytes: &[u8]) -> Result<Self::Document, Self::Error> {
        let inner = match lopdf::Document::load_mem(bytes) {
            Ok(doc) => doc,
            Err(_) if declares_encryption(bytes) => return Err(DecodeError::Encrypted),
            Err(e) => return Err(DecodeError::Parse(format!("failed to parse PDF: {e}"))),
        };
        if inner.is_encrypted() {
            return Err(DecodeError::Encrypted);
        }

        // get_pages is keyed by 1-based page number, so values come out in order.
        let page_ids: Vec<lopdf::ObjectId> = inner.get_pages().values().copied().collect();

        #[cfg(feature = "tracing")]
        tracing::debug!(pages = page_ids.len(), bytes = bytes.len(), "opened PDF");

        Ok(LopdfDocument { inner, page_ids })
    }

    fn page_count(doc: &Self::Document) -> usize {
        doc.page_ids.len()
    }

    fn get_page(doc: &Self::Document, index: usize) -> Result<Self::Page, Self::Error> {
        let object_id = *doc
            .page_ids
            .get(index)
            .ok_or(DecodeError::PageOutOfRange {
                index,
                count: doc.page_ids.len(),
            })?;
        Ok(LopdfPage { object_id, index })
    }

    fn page_media_box(doc: &Self::Document, page: &Self::Page) -> Result<MediaBox, Self::Error> {
        let Some(obj) = resolve_inherited(&doc.inner, page.object_id, b"MediaBox")? else {
            return Ok(MediaBox::LETTER);
        };
        let array = resolve_ref(&doc.inner, obj)
            .as_array()
            .map_err(|e| DecodeError::Parse(format!("MediaBox is not an array: {e}")))?;
        if array.len() != 4 {
            return Err(DecodeError::Parse(format!(
                "expected 4-element MediaBox, got {}",
                array.len()
            )));
        }
        let mut v = [0.0; 4];
        for (slot, obj) in v.iter_mut().zip(array) {
            *slot = object_to_f64(resolve_ref(&doc.inner, obj))?;
        }
        Ok(MediaBox::new(v[0], v[1], v[2], v[3]))
    }

    fn interpret_page(
        doc: &Self::Document,
        page: &Self::Page,
        handler: &mut dyn ContentHandler,
        options: &DecodeOptions,
    ) -> Result<(), Self::Error> {
        let inner = &doc.inner;
        let page_dict = inner
            .get_object(page.object_id)
            .and_then(|o| o.as_dict())
            .map_err(|e| DecodeError::Parse(format!("failed to get page dictionary: {e}")))?;

        let content = page_content_bytes(inner, page_dict)?;
        let resources = page_resources(inner, page.object_id)?;

        Interpreter::new(inner, options).run(&content, resources, handler, 0)
    }
}

/// Whether the trailer area of a file that lopdf rejected names an
/// `/Encrypt` dictionary.
fn declares_encryption(bytes: &[u8]) -> bool {
    let tail = &bytes[bytes.len().saturating_sub(4096)..];
    tail.windows(b"/Encrypt".len()).any(|w| w == b"/Encrypt")
}

/// Follow an indirect reference, returning the object itself otherwise.
/// Dangling references resolve to themselves.
pub(crate) fn resolve_ref<'a>(doc: &'a lopdf::Document, obj: &'a lopdf::Object) -> &'a lopdf::Object {
    match obj {
        lopdf::Object::Reference(id) => doc.get_object(*id).unwrap_or(obj),
        _ => obj,
    }
}

pub(crate) fn object_to_f64(obj: &lopdf::Object) -> Result<f64, DecodeError> {
    match obj {
        lopdf::Object::Integer(i) => Ok(*i as f64),
        lopdf::Object::Real(f) => Ok(f64::from(*f)),
        _ => Err(DecodeError::Parse(format!("expected number, got {obj:?}"))),
    }
}

/// Stream bytes, decompressed when a `/Filter` is present.
pub(crate) fn stream_content(stream: &lopdf::Stream) -> Result<Vec<u8>, DecodeError> {
    if stream.dict.get(b"Filter").is_ok() {
        stream
            .decompressed_content()
            .map_err(|e| DecodeError::Parse(format!("failed to decompress stream: {e}")))
    } else {
        Ok(stream.content.clone())
    }
}

/// Look up a key on the page, then up the page tree through `/Parent`.
fn resolve_inherited<'a>(
    doc: &'a lopdf::Document,
    page_id: lopdf::ObjectId,
    key: &[u8],
) -> Result<Option<&'a lopdf::Object>, DecodeError> {
    let mut current = page_id;
    // A malformed tree may loop through /Parent.
    for _ in 0..64 {
        let dict = doc
            .get_object(current)
            .and_then(|o| o.as_dict())
            .map_err(|e| DecodeError::Parse(format!("failed to get page tree node: {e}")))?;
        if let Ok(value) = dict.get(key) {
            return Ok(Some(value));
        }
        match dict.get(b"Parent").and_then(|p| p.as_reference()) {
            Ok(parent) => current = parent,
            Err(_) => return Ok(None),
        }
    }
    Ok(None)
}

/// Concatenated `/Contents` bytes: a single stream or an array of streams.
fn page_content_bytes(
    doc: &lopdf::Document,
    page_dict: &lopdf::Dictionary,
) -> Result<Vec<u8>, DecodeError> {
    let Ok(contents) = page_dict.get(b"Contents") else {
        return Ok(Vec::new());
    };

    let as_stream = |obj: &lopdf::Object| -> Result<Vec<u8>, DecodeError> {
        let stream = resolve_ref(doc, obj)
            .as_stream()
            .map_err(|e| DecodeError::Parse(format!("/Contents is not a stream: {e}")))?;
        stream_content(stream)
    };

    match resolve_ref(doc, contents) {
        lopdf::Object::Array(parts) => {
            let mut content = Vec::new();
            for part in parts {
                let bytes = as_stream(part)?;
                if !content.is_empty() {
                    content.push(b'\n');
                }
                content.extend_from_slice(&bytes);
            }
            Ok(content)
        }
        other => as_stream(other),
    }
}

/// The page's resource dictionary, inherited when needed; empty if none.
fn page_resources(
    doc: &lopdf::Document,
    page_id: lopdf::ObjectId,
) -> Result<&lopdf::Dictionary, DecodeError> {
    static EMPTY: LazyLock<lopdf::Dictionary> = LazyLock::new(lopdf::Dictionary::new);

    match resolve_inherited(doc, page_id, b"Resources")? {
        Some(obj) => resolve_ref(doc, obj)
            .as_dict()
            .map_err(|_| DecodeError::Parse("/Resources is not a dictionary".to_string())),
        None => Ok(&EMPTY),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::TextRunEvent;
    use lopdf::{Document, Object, ObjectId, Stream, StringFormat, dictionary};

    #[derive(Default)]
    struct Collect(Vec<TextRunEvent>);

    impl ContentHandler for Collect {
        fn on_text_run(&mut self, event: TextRunEvent) {
            self.0.push(event);
        }
    }

    fn font_resources() -> lopdf::Dictionary {
        dictionary! {
            "Font" => dictionary! {
                "F1" => dictionary! {
                    "Type" => "Font",
                    "Subtype" => "Type1",
                    "BaseFont" => "Helvetica",
                    "Encoding" => "WinAnsiEncoding",
                },
            },
        }
    }

    /// One page per content string, resources and MediaBox on the Pages node.
    fn build_pdf(contents: &[&[u8]]) -> Vec<u8> {
        let mut doc = Document::with_version("1.5");
        let pages_id: ObjectId = doc.new_object_id();
        let mut kids = Vec::new();
        for content in contents {
            let content_id = doc.add_object(Stream::new(dictionary! {}, content.to_vec()));
            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "Contents" => content_id,
            });
            kids.push(Object::from(page_id));
        }
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => contents.len() as i64,
                "MediaBox" => vec![0.into(), 0.into(), 300.into(), 400.into()],
                "Resources" => font_resources(),
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        let mut buf = Vec::new();
        doc.save_to(&mut buf).expect("failed to save test PDF");
        buf
    }

    #[test]
    fn open_counts_pages() {
        let pdf = build_pdf(&[b"", b"", b""]);
        let doc = LopdfBackend::open(&pdf).unwrap();
        assert_eq!(LopdfBackend::page_count(&doc), 3);
        assert!(format!("{doc:?}").contains("page_count: 3"));
    }

    #[test]
    fn open_rejects_garbage() {
        let err = LopdfBackend::open(b"not a pdf").unwrap_err();
        assert!(matches!(err, DecodeError::Parse(_)));
    }

    #[test]
    fn get_page_out_of_range() {
        let pdf = build_pdf(&[b""]);
        let doc = LopdfBackend::open(&pdf).unwrap();
        let err = LopdfBackend::get_page(&doc, 1).unwrap_err();
        assert!(matches!(err, DecodeError::PageOutOfRange { index: 1, count: 1 }));
    }

    #[test]
    fn media_box_is_inherited() {
        let pdf = build_pdf(&[b""]);
        let doc = LopdfBackend::open(&pdf).unwrap();
        let page = LopdfBackend::get_page(&doc, 0).unwrap();
        let mb = LopdfBackend::page_media_box(&doc, &page).unwrap();
        assert_eq!(mb, MediaBox::new(0.0, 0.0, 300.0, 400.0));
    }

    #[test]
    fn interpret_page_uses_inherited_resources() {
        let pdf = build_pdf(&[b"BT /F1 12 Tf 20 380 Td (Receipt) Tj ET"]);
        let doc = LopdfBackend::open(&pdf).unwrap();
        let page = LopdfBackend::get_page(&doc, 0).unwrap();
        let mut handler = Collect::default();
        LopdfBackend::interpret_page(&doc, &page, &mut handler, &DecodeOptions::default())
            .unwrap();
        assert_eq!(handler.0.len(), 1);
        assert_eq!(handler.0[0].text, "Receipt");
        assert_eq!((handler.0[0].x, handler.0[0].y), (20.0, 380.0));
    }

    #[test]
    fn contents_array_is_concatenated() {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let a = doc.add_object(Stream::new(dictionary! {}, b"BT /F1 10 Tf 0 10 Td".to_vec()));
        let b = doc.add_object(Stream::new(dictionary! {}, b"(split) Tj ET".to_vec()));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => vec![Object::Reference(a), Object::Reference(b)],
            "Resources" => font_resources(),
        });
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => vec![Object::from(page_id)],
                "Count" => 1i64,
            }),
        );
        let catalog_id = doc.add_object(dictionary! { "Type" => "Catalog", "Pages" => pages_id });
        doc.trailer.set("Root", catalog_id);
        let mut buf = Vec::new();
        doc.save_to(&mut buf).unwrap();

        let doc = LopdfBackend::open(&buf).unwrap();
        let page = LopdfBackend::get_page(&doc, 0).unwrap();
        assert_eq!(
            LopdfBackend::page_media_box(&doc, &page).unwrap(),
            MediaBox::LETTER
        );
        let mut handler = Collect::default();
        LopdfBackend::interpret_page(&doc, &page, &mut handler, &DecodeOptions::default())
            .unwrap();
        assert_eq!(handler.0[0].text, "split");
    }

    #[test]
    fn encrypted_pdf_is_rejected() {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => Vec::<Object>::new(),
                "Count" => 0i64,
            }),
        );
        let catalog_id = doc.add_object(dictionary! { "Type" => "Catalog", "Pages" => pages_id });
        doc.trailer.set("Root", catalog_id);
        let encrypt_id = doc.add_object(dictionary! {
            "Filter" => "Standard",
            "V" => 1_i64,
            "R" => 2_i64,
            "Length" => 40_i64,
            "O" => Object::String(vec![0u8; 32], StringFormat::Literal),
            "U" => Object::String(vec![0u8; 32], StringFormat::Literal),
            "P" => -4_i64,
        });
        doc.trailer.set("Encrypt", Object::Reference(encrypt_id));
        doc.trailer.set(
            "ID",
            Object::Array(vec![
                Object::String(b"0123456789abcdef".to_vec(), StringFormat::Literal),
                Object::String(b"0123456789abcdef".to_vec(), StringFormat::Literal),
            ]),
        );
        let mut buf = Vec::new();
        doc.save_to(&mut buf).unwrap();

        let err = LopdfBackend::open(&buf).unwrap_err();
        assert!(matches!(err, DecodeError::Encrypted), "got {err:?}");
    }
}
