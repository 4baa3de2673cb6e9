use std::path::Path;

use rowtext::{ReceiptField, VerifyError};

use crate::cli::LayoutArgs;
use crate::shared::{layout_options, open_pdf};

/// Exit code for a receipt that decoded but lacks expected fields.
pub const EXIT_MISSING_FIELDS: i32 = 2;

pub fn run(
    file: &Path,
    fields: &[ReceiptField],
    layout: &LayoutArgs,
    show_text: bool,
) -> Result<(), i32> {
    let pdf = open_pdf(file, layout_options(layout))?;

    match pdf.verify(fields) {
        Ok(report) => {
            for field in &report.matched {
                println!("ok\t{field}");
            }
            Ok(())
        }
        Err(VerifyError::MissingFields { missing, text }) => {
            for field in fields.iter().filter(|f| !missing.contains(f)) {
                println!("ok\t{field}");
            }
            for field in &missing {
                println!("missing\t{field}");
            }
            eprintln!(
                "Error: {} of {} expected field(s) missing",
                missing.len(),
                fields.len()
            );
            if show_text {
                eprintln!("{text}");
            }
            Err(EXIT_MISSING_FIELDS)
        }
        Err(e @ (VerifyError::Decode(_) | VerifyError::InvalidOptions(_))) => {
            eprintln!("Error: {e}");
            Err(1)
        }
    }
}
