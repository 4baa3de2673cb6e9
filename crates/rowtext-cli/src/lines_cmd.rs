use std::path::Path;

use rowtext::{LineMatch, Pdf, SearchOptions};

use crate::cli::{LayoutArgs, LinesFormat};
use crate::shared::{fail, layout_options, open_pdf, print_json, resolve_pages};

/// Line filter for `--grep`.
pub struct Grep<'a> {
    pub pattern: &'a str,
    pub literal: bool,
    pub ignore_case: bool,
}

pub fn run(
    file: &Path,
    pages: Option<&str>,
    layout: &LayoutArgs,
    format: LinesFormat,
    grep: Option<Grep<'_>>,
) -> Result<(), i32> {
    let pdf = open_pdf(file, layout_options(layout))?;
    let page_indices = resolve_pages(pages, pdf.page_count())?;

    match grep {
        Some(grep) => write_matches(&pdf, &page_indices, &grep, format),
        None => write_lines(&pdf, &page_indices, format),
    }
}

fn write_lines(pdf: &Pdf, page_indices: &[usize], format: LinesFormat) -> Result<(), i32> {
    let mut json_pages = Vec::new();

    for &idx in page_indices {
        let lines = pdf.page_lines(idx).map_err(fail("reading page"))?;
        match format {
            LinesFormat::Text => {
                for line in &lines {
                    println!("{line}");
                }
                // Same page boundary the line sequence uses.
                println!();
            }
            LinesFormat::Json => json_pages.push(serde_json::json!({
                "page": idx + 1,
                "lines": lines,
            })),
        }
    }

    if format == LinesFormat::Json {
        print_json(&serde_json::Value::Array(json_pages))?;
    }
    Ok(())
}

fn write_matches(
    pdf: &Pdf,
    page_indices: &[usize],
    grep: &Grep<'_>,
    format: LinesFormat,
) -> Result<(), i32> {
    let opts = SearchOptions {
        regex: !grep.literal,
        case_sensitive: !grep.ignore_case,
    };
    let matches: Vec<LineMatch> = pdf
        .search(grep.pattern, &opts)
        .map_err(fail("invalid --grep pattern"))?
        .into_iter()
        .filter(|m| page_indices.binary_search(&m.page_number).is_ok())
        .collect();
    tracing::info!(pattern = grep.pattern, matches = matches.len(), "searched lines");

    match format {
        LinesFormat::Text => {
            let mut last = None;
            for m in &matches {
                // A line with several hits is printed once.
                let key = (m.page_number, m.line_index);
                if last != Some(key) {
                    println!("{}:{}", m.page_number + 1, m.line);
                    last = Some(key);
                }
            }
            Ok(())
        }
        LinesFormat::Json => {
            let items = matches
                .iter()
                .map(|m| {
                    serde_json::json!({
                        "page": m.page_number + 1,
                        "line_index": m.line_index,
                        "line": m.line,
                        "match": m.text,
                    })
                })
                .collect();
            print_json(&serde_json::Value::Array(items))
        }
    }
}
