use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use rowtext::{DEFAULT_RESOLUTION, DEFAULT_UNIT_SCALE, ReceiptField};

/// Rebuild the visual text lines of PDF receipts and check them for expected fields.
#[derive(Debug, Parser)]
#[command(name = "rowtext", about, version)]
pub struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace). RUST_LOG overrides
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

/// Layout knobs for the subcommands that rebuild lines (`lines`, `verify`).
///
/// `fragments` never groups rows, so it takes only `--unit-scale`.
#[derive(Debug, Clone, clap::Args)]
pub struct LayoutArgs {
    /// Row quantization resolution: fragments share a line when round(y * R) matches
    #[arg(long, default_value_t = DEFAULT_RESOLUTION)]
    pub resolution: f64,

    /// PDF points per layout unit (1 gives plain points)
    #[arg(long, default_value_t = DEFAULT_UNIT_SCALE)]
    pub unit_scale: f64,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Print the reconstructed lines of each page
    Lines {
        /// Path to the PDF file
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Page range (e.g. '1,3-5'). Default: all pages
        #[arg(long)]
        pages: Option<String>,

        #[command(flatten)]
        layout: LayoutArgs,

        /// Output format
        #[arg(long, value_enum, default_value_t = LinesFormat::Text)]
        format: LinesFormat,

        /// Only print lines matching this regex
        #[arg(long, value_name = "PATTERN")]
        grep: Option<String>,

        /// Treat the --grep pattern as literal text
        #[arg(long, requires = "grep")]
        literal: bool,

        /// Case-insensitive --grep
        #[arg(short = 'i', long, requires = "grep")]
        ignore_case: bool,
    },

    /// Print the positioned text fragments the lines are built from
    Fragments {
        /// Path to the PDF file
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Page range (e.g. '1,3-5'). Default: all pages
        #[arg(long)]
        pages: Option<String>,

        /// PDF points per layout unit (1 gives plain points)
        #[arg(long, default_value_t = DEFAULT_UNIT_SCALE)]
        unit_scale: f64,

        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },

    /// Check that a receipt contains every expected "Label : value" line.
    ///
    /// Exits with 2 when the receipt decodes but a field is missing.
    Verify {
        /// Path to the PDF file
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Expected field as LABEL=VALUE (repeatable)
        #[arg(long = "expect", value_name = "LABEL=VALUE", required = true, value_parser = parse_expect)]
        expect: Vec<ReceiptField>,

        #[command(flatten)]
        layout: LayoutArgs,

        /// Print the reconstructed text when fields are missing
        #[arg(long)]
        show_text: bool,
    },
}

/// Output format for `lines`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LinesFormat {
    Text,
    Json,
}

/// Output format for `fragments`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
    Csv,
}

/// Parse `LABEL=VALUE` into a [`ReceiptField`]. The value may contain `=`.
pub fn parse_expect(raw: &str) -> Result<ReceiptField, String> {
    let (label, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected LABEL=VALUE, got '{raw}'"))?;
    let (label, value) = (label.trim(), value.trim());
    if label.is_empty() {
        return Err(format!("empty label in '{raw}'"));
    }
    Ok(ReceiptField::new(label, value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn lines_defaults() {
        let cli = Cli::try_parse_from(["rowtext", "lines", "r.pdf"]).unwrap();
        match cli.command {
            Commands::Lines {
                layout,
                format,
                grep,
                ..
            } => {
                assert_eq!(layout.resolution, 10.0);
                assert_eq!(layout.unit_scale, 16.0);
                assert_eq!(format, LinesFormat::Text);
                assert!(grep.is_none());
            }
            other => panic!("expected Lines, got {other:?}"),
        }
    }

    #[test]
    fn fragments_takes_unit_scale_but_not_resolution() {
        let cli =
            Cli::try_parse_from(["rowtext", "fragments", "r.pdf", "--unit-scale", "1"]).unwrap();
        match cli.command {
            Commands::Fragments { unit_scale, .. } => assert_eq!(unit_scale, 1.0),
            other => panic!("expected Fragments, got {other:?}"),
        }
        assert!(
            Cli::try_parse_from(["rowtext", "fragments", "r.pdf", "--resolution", "2"]).is_err()
        );
    }

    #[test]
    fn verify_takes_both_layout_flags() {
        let cli = Cli::try_parse_from([
            "rowtext",
            "verify",
            "r.pdf",
            "--expect",
            "Date=x",
            "--resolution",
            "2",
            "--unit-scale",
            "1",
        ])
        .unwrap();
        match cli.command {
            Commands::Verify { layout, .. } => {
                assert_eq!(layout.resolution, 2.0);
                assert_eq!(layout.unit_scale, 1.0);
            }
            other => panic!("expected Verify, got {other:?}"),
        }
    }

    #[test]
    fn verbose_is_counted() {
        let cli = Cli::try_parse_from(["rowtext", "-vv", "lines", "r.pdf"]).unwrap();
        assert_eq!(cli.verbose, 2);
    }

    #[test]
    fn literal_requires_grep() {
        assert!(Cli::try_parse_from(["rowtext", "lines", "r.pdf", "--literal"]).is_err());
    }

    #[test]
    fn verify_requires_expect() {
        assert!(Cli::try_parse_from(["rowtext", "verify", "r.pdf"]).is_err());
    }

    #[test]
    fn verify_collects_fields() {
        let cli = Cli::try_parse_from([
            "rowtext",
            "verify",
            "r.pdf",
            "--expect",
            "Date=01/01/2024",
            "--expect",
            "Amount = MUR 1,500.00",
        ])
        .unwrap();
        match cli.command {
            Commands::Verify { expect, .. } => assert_eq!(
                expect,
                vec![
                    ReceiptField::new("Date", "01/01/2024"),
                    ReceiptField::new("Amount", "MUR 1,500.00"),
                ]
            ),
            other => panic!("expected Verify, got {other:?}"),
        }
    }

    #[test]
    fn expect_value_keeps_equals_signs() {
        assert_eq!(
            parse_expect("Ref=a=b").unwrap(),
            ReceiptField::new("Ref", "a=b")
        );
    }

    #[test]
    fn expect_without_separator_is_rejected() {
        assert!(parse_expect("Date").unwrap_err().contains("LABEL=VALUE"));
        assert!(parse_expect("=x").unwrap_err().contains("empty label"));
    }
}
