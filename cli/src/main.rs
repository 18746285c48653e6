mod commands;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use sheetcmp::{ContainerError, DiffError, OdsError, XlsxError, XmlParseError};
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "sheetcmp")]
#[command(about = "Compare spreadsheets and report cell, style, and layout differences")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Compare two spreadsheets")]
    Diff {
        #[arg(help = "Path to the first spreadsheet")]
        file_a: String,
        #[arg(help = "Path to the second spreadsheet")]
        file_b: String,
        #[arg(long, short, value_enum, default_value = "text", help = "Output format")]
        format: OutputFormat,
        #[arg(
            long,
            value_name = "RULE",
            help = "Ignore rule for the first spreadsheet (sheet:rows:cols:cells, repeatable)"
        )]
        ignore_a: Vec<String>,
        #[arg(
            long,
            value_name = "RULE",
            help = "Ignore rule for the second spreadsheet (sheet:rows:cols:cells, repeatable)"
        )]
        ignore_b: Vec<String>,
        #[arg(long, help = "Report every differing style attribute, not just the first")]
        all_style_mismatches: bool,
        #[arg(long, short, help = "Quiet mode: only show the summary")]
        quiet: bool,
    },
    #[command(about = "Show information about a spreadsheet")]
    Info {
        #[arg(help = "Path to the spreadsheet")]
        path: String,
    },
}

#[derive(Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
    Jsonl,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Diff {
            file_a,
            file_b,
            format,
            ignore_a,
            ignore_b,
            all_style_mismatches,
            quiet,
        } => commands::diff::run(
            &file_a,
            &file_b,
            format,
            ignore_a,
            ignore_b,
            all_style_mismatches,
            quiet,
        ),
        Commands::Info { path } => commands::info::run(&path),
    };

    match result {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            exit_code_for_error(&e)
        }
    }
}

fn exit_code_for_error(err: &anyhow::Error) -> ExitCode {
    if is_internal_error(err) {
        ExitCode::from(3)
    } else {
        ExitCode::from(2)
    }
}

fn is_internal_error(err: &anyhow::Error) -> bool {
    err.chain().any(|cause| {
        if let Some(diff_err) = cause.downcast_ref::<DiffError>() {
            return !matches!(diff_err, DiffError::Config { .. });
        }
        cause.is::<ContainerError>()
            || cause.is::<XlsxError>()
            || cause.is::<OdsError>()
            || cause.is::<XmlParseError>()
    })
}
