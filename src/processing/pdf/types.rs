use std::path::PathBuf;

/// A run of text with its position on the page, in PDF points with the
/// origin at the bottom-left corner.
#[derive(Debug, Clone, PartialEq)]
pub struct TextCell {
    pub text: String,
    pub left: f32,
    pub right: f32,
    pub bottom: f32,
    pub top: f32,
}

impl TextCell {
    pub fn new(text: impl Into<String>, left: f32, bottom: f32, right: f32, top: f32) -> Self {
        Self {
            text: text.into(),
            left,
            right,
            bottom,
            top,
        }
    }
}

/// A tabular region found on a page.
#[derive(Debug, Clone, PartialEq)]
pub struct DetectedTable {
    /// 1-based page number
    pub page: usize,
    /// 1-based index of the table on its page
    pub index: usize,
    /// Lines of the region, top to bottom, cells left to right
    pub rows: Vec<Vec<TextCell>>,
}

/// All tables detected on one page.
#[derive(Debug, Clone, PartialEq)]
pub struct PageTables {
    /// 1-based page number
    pub page: usize,
    pub tables: Vec<DetectedTable>,
}

/// A formatted table ready for CSV output.
#[derive(Debug, Clone, PartialEq)]
pub struct TableGrid {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

/// A table written to disk.
#[derive(Debug, Clone, PartialEq)]
pub struct SavedTable {
    pub page: usize,
    pub table: usize,
    pub path: PathBuf,
    pub filename: String,
    pub rows: usize,
}
