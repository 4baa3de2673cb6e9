use std::path::Path;

use rowtext::{Options, Pdf};

use crate::cli::LayoutArgs;
use crate::page_range::parse_page_range;

/// Open a PDF, printing a message to stderr and returning exit code 1 on failure.
pub fn open_pdf(file: &Path, options: Options) -> Result<Pdf, i32> {
    if !file.exists() {
        eprintln!("Error: file not found: {}", file.display());
        return Err(1);
    }

    let pdf = Pdf::open_file(file, Some(options)).map_err(|e| {
        eprintln!("Error: failed to open PDF: {e}");
        1
    })?;
    tracing::debug!(
        file = %file.display(),
        pages = pdf.page_count(),
        warnings = pdf.warnings().len(),
        "opened PDF"
    );
    Ok(pdf)
}

/// Decode and line options from the shared layout flags.
pub fn layout_options(layout: &LayoutArgs) -> Options {
    Options::default()
        .with_resolution(layout.resolution)
        .with_unit_scale(layout.unit_scale)
}

/// All pages when `pages` is `None`, otherwise the parsed selection.
pub fn resolve_pages(pages: Option<&str>, page_count: usize) -> Result<Vec<usize>, i32> {
    match pages {
        Some(range) => parse_page_range(range, page_count).map_err(|e| {
            eprintln!("Error: {e}");
            1
        }),
        None => Ok((0..page_count).collect()),
    }
}

/// Quote a CSV field when it contains a comma, quote or line break.
pub fn csv_escape(text: &str) -> String {
    if text.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", text.replace('"', "\"\""))
    } else {
        text.to_string()
    }
}

/// Print any error to stderr and map it to exit code 1.
pub fn fail(context: &str) -> impl Fn(rowtext::Error) -> i32 + '_ {
    move |e| {
        eprintln!("Error: {context}: {e}");
        1
    }
}

/// Serialize `value` as one JSON line on stdout.
pub fn print_json(value: &serde_json::Value) -> Result<(), i32> {
    let out = serde_json::to_string(value).map_err(|e| {
        eprintln!("Error: failed to serialize output: {e}");
        1
    })?;
    println!("{out}");
    Ok(())
}
