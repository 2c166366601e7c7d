// Entry point for the image describer.
// The library in lib.rs holds everything; this file only parses arguments
// and maps the session result to an exit code.

use std::path::PathBuf;
use std::process::ExitCode;
use anyhow::Context;
use clap::Parser;
use collection_tools_lib::processing::SessionStatus;
use collection_tools_lib::{print_summary, run_describer};

/// Describe every image under a folder with a local vision model.
#[derive(Parser, Debug)]
#[command(name = "image-describer", version, about)]
struct Cli {
    /// Root folder to scan for images
    folder: PathBuf,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<ExitCode> {
    let base_dir = std::env::current_dir().context("Cannot determine working directory")?;
    let report = run_describer(&cli.folder, &base_dir).await?;
    print_summary(&report);

    Ok(match report.outcome.status {
        SessionStatus::Aborted => ExitCode::FAILURE,
        SessionStatus::Completed | SessionStatus::Interrupted => ExitCode::SUCCESS,
    })
}
