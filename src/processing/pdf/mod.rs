//! PDF table extraction.
//!
//! Detection and formatting sit behind [`TableDetector`] and
//! [`TableFormatter`]; [`extract_tables_from_pdf`] only drives them and writes
//! one CSV per table.
//!
//! # Architecture
//!
//! - [`extractor`]: Per-PDF loop with per-table failure isolation.
//! - [`layout`]: Groups positioned text into aligned table regions and grids.
//! - [`pdfium`]: Pdfium-backed page reader feeding [`layout`].

mod extractor;
mod layout;
mod pdfium;
mod types;

use std::path::Path;
use crate::utils::{FormatError, PdfError};

pub use extractor::{ExtractionSummary, extract_tables_from_pdf, find_pdfs, run_table_extraction, table_file_name};
pub use layout::{GridFormatter, group_regions};
pub use pdfium::PdfiumTables;
pub use types::{DetectedTable, PageTables, SavedTable, TableGrid, TextCell};

/// Finds candidate tables on every page of a PDF.
pub trait TableDetector {
    /// Returns the detected tables of each page, in page order.
    fn detect(&self, pdf_path: &Path) -> Result<Vec<PageTables>, PdfError>;
}

/// Turns a detected region into a rectangular grid.
pub trait TableFormatter {
    fn format(&self, table: &DetectedTable) -> Result<TableGrid, FormatError>;
}
