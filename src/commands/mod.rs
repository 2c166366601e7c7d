//! Entry points shared by the binaries.
//!
//! - [`run_describer`]: Describe every image under a root folder
//! - [`run_pdf_tables`]: Extract tables from the PDFs in `pdfs/`

mod describe;
mod tables;

pub use describe::{DescribeReport, print_summary, run_describer};
pub use tables::{PDF_DIR, TABLES_OUTPUT_DIR, run_pdf_tables};
