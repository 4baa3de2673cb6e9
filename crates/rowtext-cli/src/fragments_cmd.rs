use std::path::Path;

use rowtext::{Options, PageFragments};

use crate::cli::OutputFormat;
use crate::shared::{csv_escape, open_pdf, print_json, resolve_pages};

pub fn run(
    file: &Path,
    pages: Option<&str>,
    unit_scale: f64,
    format: OutputFormat,
) -> Result<(), i32> {
    let pdf = open_pdf(file, Options::default().with_unit_scale(unit_scale))?;
    let page_indices = resolve_pages(pages, pdf.page_count())?;
    let selected: Vec<&PageFragments> = page_indices
        .iter()
        .filter_map(|&idx| pdf.document().pages.get(idx))
        .collect();

    match format {
        OutputFormat::Text => {
            println!("page\tx\ty\ttext");
            for (idx, page) in page_indices.iter().zip(&selected) {
                for f in &page.fragments {
                    println!("{}\t{:.2}\t{:.2}\t{}", idx + 1, f.x, f.y, f.text);
                }
            }
            Ok(())
        }
        OutputFormat::Csv => {
            println!("page,x,y,text");
            for (idx, page) in page_indices.iter().zip(&selected) {
                for f in &page.fragments {
                    println!("{},{:.2},{:.2},{}", idx + 1, f.x, f.y, csv_escape(&f.text));
                }
            }
            Ok(())
        }
        OutputFormat::Json => {
            let mut items = Vec::new();
            for (idx, page) in page_indices.iter().zip(&selected) {
                for f in &page.fragments {
                    items.push(serde_json::json!({
                        "page": idx + 1,
                        "x": f.x,
                        "y": f.y,
                        "text": f.text,
                    }));
                }
            }
            print_json(&serde_json::Value::Array(items))
        }
    }
}
