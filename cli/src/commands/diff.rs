use crate::output::{json, text};
use crate::OutputFormat;
use anyhow::{Context, Result};
use sheetcmp::{
    diff_spreadsheets, diff_spreadsheets_streaming, open_spreadsheet_path, DiffConfig, DiffReport,
    JsonLinesSink, LoadedSpreadsheet,
};
use std::io::{self, BufWriter, Write};
use std::process::ExitCode;

#[derive(Clone, Copy, PartialEq, Eq)]
pub enum Verbosity {
    Quiet,
    Normal,
}

pub fn run(
    path_a: &str,
    path_b: &str,
    format: OutputFormat,
    ignore_a: Vec<String>,
    ignore_b: Vec<String>,
    all_style_mismatches: bool,
    quiet: bool,
) -> Result<ExitCode> {
    let verbosity = if quiet {
        Verbosity::Quiet
    } else {
        Verbosity::Normal
    };

    let config = DiffConfig::builder()
        .source_a(path_a)
        .source_b(path_b)
        .ignore_a(ignore_a)
        .ignore_b(ignore_b)
        .all_style_mismatches(all_style_mismatches)
        .build()
        .context("Invalid ignore rules")?;

    let loaded_a = open_spreadsheet_path(path_a)
        .with_context(|| format!("Failed to open first spreadsheet: {}", path_a))?;
    let loaded_b = open_spreadsheet_path(path_b)
        .with_context(|| format!("Failed to open second spreadsheet: {}", path_b))?;

    if format == OutputFormat::Jsonl {
        return run_streaming(&loaded_a, &loaded_b, &config);
    }

    let report = diff_spreadsheets(loaded_a.view.as_ref(), loaded_b.view.as_ref(), &config)
        .context("Diff failed")?;

    let stdout = io::stdout();
    let mut handle = stdout.lock();

    match format {
        OutputFormat::Text => {
            text::write_text_report(&mut handle, &report, verbosity)?;
        }
        OutputFormat::Json => {
            json::write_json_report(&mut handle, &report)?;
        }
        OutputFormat::Jsonl => {
            unreachable!("JSONL handled by streaming path");
        }
    }

    Ok(exit_code_from_report(&report))
}

fn run_streaming(
    loaded_a: &LoadedSpreadsheet,
    loaded_b: &LoadedSpreadsheet,
    config: &DiffConfig,
) -> Result<ExitCode> {
    let stdout = io::stdout();
    let handle = stdout.lock();
    let mut writer = BufWriter::new(handle);
    let mut sink = JsonLinesSink::new(&mut writer, &config.source_a, &config.source_b);

    let summary = diff_spreadsheets_streaming(
        loaded_a.view.as_ref(),
        loaded_b.view.as_ref(),
        config,
        &mut sink,
    )
    .context("Streaming diff failed")?;

    writer.flush()?;

    if summary.differs {
        Ok(ExitCode::from(1))
    } else {
        Ok(ExitCode::from(0))
    }
}

fn exit_code_from_report(report: &DiffReport) -> ExitCode {
    if report.differs {
        ExitCode::from(1)
    } else {
        ExitCode::from(0)
    }
}
