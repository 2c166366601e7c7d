//! The PDF table extraction run.

use std::path::Path;
use tracing::info;
use crate::processing::pdf::{ExtractionSummary, GridFormatter, PdfiumTables, run_table_extraction};
use crate::utils::PdfError;

/// Folder scanned for PDFs, relative to the working directory.
pub const PDF_DIR: &str = "pdfs";
/// Folder receiving the extracted CSV files.
pub const TABLES_OUTPUT_DIR: &str = "outputs";

/// Extracts tables from every PDF in `base_dir/pdfs` into `base_dir/outputs`.
pub fn run_pdf_tables(base_dir: &Path) -> Result<ExtractionSummary, PdfError> {
    let pdf_dir = base_dir.join(PDF_DIR);
    let output_dir = base_dir.join(TABLES_OUTPUT_DIR);
    std::fs::create_dir_all(&output_dir)?;

    let detector = PdfiumTables::new()?;
    let summary = run_table_extraction(&pdf_dir, &output_dir, &detector, &GridFormatter)?;

    info!(
        "Extracted {} tables from {} PDFs ({} failed)",
        summary.tables, summary.pdfs, summary.failed_pdfs
    );
    Ok(summary)
}
