use std::path::Path;
use pdfium_render::prelude::*;
use tracing::{debug, warn};
use crate::processing::pdf::{PageTables, TableDetector, TextCell, group_regions};
use crate::utils::PdfError;

/// Directories searched for a bundled pdfium before the system library.
const LIBRARY_DIRS: [&str; 2] = ["./libs/pdfium/lib", "./"];

/// Table detector reading text runs through pdfium.
pub struct PdfiumTables {
    pdfium: Pdfium,
}

impl PdfiumTables {
    /// Binds to a bundled pdfium library, falling back to the system one.
    pub fn new() -> Result<Self, PdfError> {
        let bundled = LIBRARY_DIRS.iter().find_map(|dir| {
            Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path(dir))
                .inspect(|_| debug!("Bound pdfium from {}", dir))
                .ok()
        });
        let bindings = match bundled {
            Some(bindings) => bindings,
            None => Pdfium::bind_to_system_library().map_err(|e| PdfError::Library(e.to_string()))?,
        };

        Ok(Self {
            pdfium: Pdfium::new(bindings),
        })
    }

    fn page_cells(page: &PdfPage, path: &Path, number: usize) -> Result<Vec<TextCell>, PdfError> {
        let text = page.text().map_err(|e| PdfError::Page {
            path: path.to_path_buf(),
            page: number,
            reason: e.to_string(),
        })?;

        let segments = text.segments();
        let cells = segments
            .iter()
            .map(|segment| {
                let bounds = segment.bounds();
                TextCell::new(
                    segment.text(),
                    bounds.left().value,
                    bounds.bottom().value,
                    bounds.right().value,
                    bounds.top().value,
                )
            })
            .collect();
        Ok(cells)
    }
}

/// Groups each page's text into tables. A page whose text could not be read
/// is logged and contributes no tables; the other pages are kept.
fn tables_per_page<I>(pdf_path: &Path, pages: I) -> Vec<PageTables>
where
    I: IntoIterator<Item = Result<Vec<TextCell>, PdfError>>,
{
    pages
        .into_iter()
        .enumerate()
        .map(|(index, cells)| {
            let number = index + 1;
            let tables = match cells {
                Ok(cells) => group_regions(number, cells),
                Err(e) => {
                    warn!("Skipping page {} of {}: {}", number, pdf_path.display(), e);
                    Vec::new()
                }
            };
            debug!("Page {}: {} candidate tables", number, tables.len());
            PageTables { page: number, tables }
        })
        .collect()
}

impl TableDetector for PdfiumTables {
    fn detect(&self, pdf_path: &Path) -> Result<Vec<PageTables>, PdfError> {
        let document = self
            .pdfium
            .load_pdf_from_file(pdf_path, None)
            .map_err(|e| PdfError::Load {
                path: pdf_path.to_path_buf(),
                reason: e.to_string(),
            })?;

        let pages = document
            .pages()
            .iter()
            .enumerate()
            .map(|(index, page)| Self::page_cells(&page, pdf_path, index + 1));
        Ok(tables_per_page(pdf_path, pages))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn aligned_page() -> Vec<TextCell> {
        vec![
            TextCell::new("Item", 72.0, 700.0, 110.0, 710.0),
            TextCell::new("Qty", 200.0, 700.0, 230.0, 710.0),
            TextCell::new("Bolt", 72.0, 685.0, 110.0, 695.0),
            TextCell::new("4", 200.0, 685.0, 210.0, 695.0),
        ]
    }

    #[test]
    fn unreadable_page_keeps_other_pages() {
        let pages = vec![
            Ok(aligned_page()),
            Err(PdfError::Page {
                path: "scan.pdf".into(),
                page: 2,
                reason: "text layer missing".to_string(),
            }),
            Ok(aligned_page()),
        ];

        let detected = tables_per_page(Path::new("scan.pdf"), pages);

        assert_eq!(detected.iter().map(|p| p.page).collect::<Vec<_>>(), vec![1, 2, 3]);
        assert_eq!(detected[0].tables.len(), 1);
        assert!(detected[1].tables.is_empty());
        assert_eq!(detected[2].tables.len(), 1);
        assert_eq!(detected[2].tables[0].page, 3);
    }
}
