use std::io;
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};
use walkdir::WalkDir;
use crate::processing::pdf::{SavedTable, TableDetector, TableFormatter, TableGrid};
use crate::utils::{PdfError, file_stem_string};

/// Output file name for table `table` on page `page` (both 1-based).
pub fn table_file_name(stem: &str, page: usize, table: usize) -> String {
    format!("{}_page{}_table{}.csv", stem, page, table)
}

fn write_grid(path: &Path, grid: &TableGrid) -> Result<(), csv::Error> {
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(&grid.headers)?;
    for row in &grid.rows {
        writer.write_record(row)?;
    }
    writer.flush()?;
    Ok(())
}

/// Extracts every detected table of `pdf_path` into `output_dir`.
///
/// A table that fails to format or write is logged and skipped. Only a PDF
/// that cannot be read at all is returned as an error.
pub fn extract_tables_from_pdf(
    pdf_path: &Path,
    output_dir: &Path,
    detector: &dyn TableDetector,
    formatter: &dyn TableFormatter,
) -> Result<Vec<SavedTable>, PdfError> {
    std::fs::create_dir_all(output_dir)?;
    let stem = file_stem_string(pdf_path);
    let pages = detector.detect(pdf_path)?;

    let mut saved = Vec::new();
    for page in pages {
        for table in &page.tables {
            let grid = match formatter.format(table) {
                Ok(grid) => grid,
                Err(e) => {
                    error!("Error processing table {} on page {}: {}", table.index, page.page, e);
                    continue;
                }
            };

            let filename = table_file_name(&stem, page.page, table.index);
            let path = output_dir.join(&filename);
            if let Err(e) = write_grid(&path, &grid) {
                error!("Error writing table {} on page {}: {}", table.index, page.page, e);
                continue;
            }

            info!("Saved table {} from page {} to {}", table.index, page.page, filename);
            saved.push(SavedTable {
                page: page.page,
                table: table.index,
                path,
                filename,
                rows: grid.rows.len(),
            });
        }
    }

    Ok(saved)
}

/// Lists `*.pdf` files directly inside `dir`, sorted by name.
pub fn find_pdfs(dir: &Path) -> Result<Vec<PathBuf>, PdfError> {
    let mut pdfs = Vec::new();
    for entry in WalkDir::new(dir).min_depth(1).max_depth(1).sort_by_file_name() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) if e.depth() == 0 => return Err(PdfError::IO(io::Error::from(e))),
            Err(e) => {
                warn!("Skipping unreadable entry: {}", e);
                continue;
            }
        };
        let is_pdf = entry
            .path()
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"));
        if entry.file_type().is_file() && is_pdf {
            pdfs.push(entry.into_path());
        }
    }
    Ok(pdfs)
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct ExtractionSummary {
    pub pdfs: usize,
    pub tables: usize,
    pub failed_pdfs: usize,
}

/// Runs table extraction over every PDF in `pdf_dir`.
pub fn run_table_extraction(
    pdf_dir: &Path,
    output_dir: &Path,
    detector: &dyn TableDetector,
    formatter: &dyn TableFormatter,
) -> Result<ExtractionSummary, PdfError> {
    let pdfs = find_pdfs(pdf_dir)?;
    if pdfs.is_empty() {
        warn!("No PDF files found in {}", pdf_dir.display());
    }

    let mut summary = ExtractionSummary::default();
    for pdf in pdfs {
        let name = pdf.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_default();
        info!("Processing {}...", name);
        summary.pdfs += 1;

        match extract_tables_from_pdf(&pdf, output_dir, detector, formatter) {
            Ok(saved) if saved.is_empty() => info!("No tables found in the PDF."),
            Ok(saved) => {
                info!("Extracted {} tables from {}", saved.len(), name);
                summary.tables += saved.len();
            }
            Err(e) => {
                error!("Error processing {}: {}", name, e);
                summary.failed_pdfs += 1;
            }
        }
    }

    Ok(summary)
}
