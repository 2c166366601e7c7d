// Entry point for the PDF table extractor.
// Reads every PDF in ./pdfs and writes one CSV per detected table to ./outputs.

use std::process::ExitCode;
use anyhow::Context;
use clap::Parser;
use collection_tools_lib::run_pdf_tables;
use collection_tools_lib::utils::logging::init_console_logging;

/// Extract tables from the PDFs in ./pdfs into CSV files under ./outputs.
#[derive(Parser, Debug)]
#[command(name = "pdf-tables", version, about)]
struct Cli {}

fn run() -> anyhow::Result<()> {
    let base_dir = std::env::current_dir().context("Cannot determine working directory")?;
    let summary = run_pdf_tables(&base_dir).context("Table extraction failed")?;
    println!(
        "Extracted {} tables from {} PDFs ({} could not be read)",
        summary.tables, summary.pdfs, summary.failed_pdfs
    );
    Ok(())
}

fn main() -> ExitCode {
    let _cli = Cli::parse();
    init_console_logging();

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}
