mod cli;
mod fragments_cmd;
mod lines_cmd;
mod page_range;
mod shared;
mod verify_cmd;

use clap::Parser;
use cli::{Cli, Commands};
use tracing_subscriber::EnvFilter;

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Lines {
            ref file,
            ref pages,
            ref layout,
            format,
            ref grep,
            literal,
            ignore_case,
        } => lines_cmd::run(
            file,
            pages.as_deref(),
            layout,
            format,
            grep.as_deref().map(|pattern| lines_cmd::Grep {
                pattern,
                literal,
                ignore_case,
            }),
        ),
        Commands::Fragments {
            ref file,
            ref pages,
            unit_scale,
            format,
        } => fragments_cmd::run(file, pages.as_deref(), unit_scale, format),
        Commands::Verify {
            ref file,
            ref expect,
            ref layout,
            show_text,
        } => verify_cmd::run(file, expect, layout, show_text),
    };

    if let Err(code) = result {
        std::process::exit(code);
    }
}
