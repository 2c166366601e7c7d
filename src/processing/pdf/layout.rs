//! Alignment-based table layout.
//!
//! Text runs sharing a baseline form a line. Consecutive lines whose cells
//! line up with the first line's left edges form a table region. This is a
//! light heuristic for ruled-less tables with a header row; anything smarter
//! plugs in through [`TableDetector`](super::TableDetector).

use crate::processing::pdf::{DetectedTable, TableFormatter, TableGrid, TextCell};
use crate::utils::FormatError;

/// Maximum baseline difference, in points, for runs on the same line.
const LINE_TOLERANCE: f32 = 3.0;
/// Maximum left-edge difference, in points, for cells in the same column.
const COLUMN_TOLERANCE: f32 = 6.0;
const MIN_COLUMNS: usize = 2;
const MIN_ROWS: usize = 2;

fn group_lines(mut cells: Vec<TextCell>) -> Vec<Vec<TextCell>> {
    cells.retain(|c| !c.text.trim().is_empty());
    // PDF y grows upwards, so the top of the page comes first
    cells.sort_by(|a, b| b.bottom.total_cmp(&a.bottom).then(a.left.total_cmp(&b.left)));

    let mut lines: Vec<Vec<TextCell>> = Vec::new();
    for cell in cells {
        match lines.last_mut() {
            Some(line) if (line[0].bottom - cell.bottom).abs() <= LINE_TOLERANCE => line.push(cell),
            _ => lines.push(vec![cell]),
        }
    }
    for line in &mut lines {
        line.sort_by(|a, b| a.left.total_cmp(&b.left));
    }
    lines
}

fn aligned_cells(anchors: &[f32], line: &[TextCell]) -> usize {
    line.iter()
        .filter(|cell| anchors.iter().any(|a| (a - cell.left).abs() <= COLUMN_TOLERANCE))
        .count()
}

fn close_region(current: &mut Vec<Vec<TextCell>>, tables: &mut Vec<DetectedTable>, page: usize) {
    let rows = std::mem::take(current);
    if rows.len() >= MIN_ROWS {
        tables.push(DetectedTable {
            page,
            index: tables.len() + 1,
            rows,
        });
    }
}

/// Groups the text runs of one page into table regions, top to bottom.
pub fn group_regions(page: usize, cells: Vec<TextCell>) -> Vec<DetectedTable> {
    let mut tables = Vec::new();
    let mut current: Vec<Vec<TextCell>> = Vec::new();
    let mut anchors: Vec<f32> = Vec::new();

    for line in group_lines(cells) {
        if !current.is_empty() && aligned_cells(&anchors, &line) >= MIN_COLUMNS {
            current.push(line);
            continue;
        }

        close_region(&mut current, &mut tables, page);
        if line.len() >= MIN_COLUMNS {
            anchors = line.iter().map(|c| c.left).collect();
            current.push(line);
        }
    }
    close_region(&mut current, &mut tables, page);

    tables
}

/// Formats a region using its first line as the header.
///
/// Body cells go to the header column with the nearest left edge. Cells
/// landing in the same column are joined with a space.
#[derive(Debug, Default, Clone, Copy)]
pub struct GridFormatter;

impl TableFormatter for GridFormatter {
    fn format(&self, table: &DetectedTable) -> Result<TableGrid, FormatError> {
        let header = match table.rows.first() {
            Some(row) if !row.is_empty() => row,
            _ => return Err(FormatError::MissingHeader),
        };
        let anchors: Vec<f32> = header.iter().map(|c| c.left).collect();
        let headers = header.iter().map(|c| c.text.trim().to_string()).collect();

        let mut rows = Vec::with_capacity(table.rows.len() - 1);
        for (i, line) in table.rows.iter().enumerate().skip(1) {
            if line.len() > anchors.len() {
                return Err(FormatError::RaggedRow {
                    row: i,
                    found: line.len(),
                    expected: anchors.len(),
                });
            }

            let mut row = vec![String::new(); anchors.len()];
            for cell in line {
                let column = anchors
                    .iter()
                    .enumerate()
                    .min_by(|(_, a), (_, b)| (*a - cell.left).abs().total_cmp(&(*b - cell.left).abs()))
                    .map(|(column, _)| column)
                    .unwrap_or(0);
                let slot = &mut row[column];
                if !slot.is_empty() {
                    slot.push(' ');
                }
                slot.push_str(cell.text.trim());
            }
            rows.push(row);
        }

        Ok(TableGrid { headers, rows })
    }
}
