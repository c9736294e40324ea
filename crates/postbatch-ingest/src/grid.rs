//! Rectangular-ish cell grid shared by every input format.
//!
//! Rows and columns are addressed 1-indexed, matching how submission
//! templates describe fixed positions ("row 6", "column 2"). Reads past the
//! end of a row or the grid yield an empty cell.

use std::path::Path;

use calamine::{open_workbook_auto, Data, Range, Reader};
use csv::ReaderBuilder;

use crate::error::IngestError;

pub const MIME_NATIVE_SPREADSHEET: &str = "application/vnd.google-apps.spreadsheet";
pub const MIME_XLSX: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";
pub const MIME_LEGACY_EXCEL: &str = "application/vnd.ms-excel";
pub const MIME_CSV: &str = "text/csv";

/// How a submission file's grid is obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    /// Read directly by the spreadsheet engine.
    NativeSpreadsheet,
    /// Converted to a native copy first; the copy is discarded afterwards.
    LegacyBinary,
    /// Decoded as UTF-8 text and parsed as CSV.
    DelimitedText,
}

impl SourceFormat {
    /// Classifies a declared MIME type.
    ///
    /// # Errors
    ///
    /// Returns [`IngestError::UnsupportedFormat`] for any MIME type outside
    /// the three supported kinds.
    pub fn from_mime(mime_type: &str) -> Result<Self, IngestError> {
        match mime_type.trim().to_ascii_lowercase().as_str() {
            MIME_NATIVE_SPREADSHEET | MIME_XLSX => Ok(Self::NativeSpreadsheet),
            MIME_LEGACY_EXCEL => Ok(Self::LegacyBinary),
            MIME_CSV => Ok(Self::DelimitedText),
            _ => Err(IngestError::UnsupportedFormat(mime_type.to_string())),
        }
    }

    #[must_use]
    pub fn is_supported(mime_type: &str) -> bool {
        Self::from_mime(mime_type).is_ok()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Grid {
    rows: Vec<Vec<String>>,
}

impl Grid {
    #[must_use]
    pub fn new(rows: Vec<Vec<String>>) -> Self {
        Self { rows }
    }

    #[must_use]
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Cells of 1-indexed `row`, or `None` past the end.
    #[must_use]
    pub fn row(&self, row: usize) -> Option<&[String]> {
        row.checked_sub(1)
            .and_then(|i| self.rows.get(i))
            .map(Vec::as_slice)
    }

    /// Cell at 1-indexed (`row`, `col`); empty when out of range.
    #[must_use]
    pub fn cell(&self, row: usize, col: usize) -> &str {
        self.row(row)
            .and_then(|cells| col.checked_sub(1).and_then(|i| cells.get(i)))
            .map_or("", String::as_str)
    }

    /// Parses CSV text into a grid. No header handling: every record is a
    /// grid row. Records may have differing lengths.
    ///
    /// # Errors
    ///
    /// Returns [`IngestError::Csv`] on malformed input (e.g. an unterminated
    /// quote).
    pub fn from_csv_text(text: &str) -> Result<Self, IngestError> {
        let text = text.strip_prefix('\u{feff}').unwrap_or(text);
        let mut reader = ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(text.as_bytes());

        let mut rows = Vec::new();
        let mut next_line = 1u64;
        for record in reader.records() {
            let record = record?;
            // The csv reader drops empty lines; put them back as empty rows
            // so fixed row positions survive.
            if let Some(position) = record.position() {
                for _ in next_line..position.line() {
                    rows.push(Vec::new());
                }
                let embedded: usize = record.iter().map(|f| f.matches('\n').count()).sum();
                next_line = position.line() + 1 + embedded as u64;
            }
            rows.push(record.iter().map(str::to_string).collect());
        }
        Ok(Self { rows })
    }

    /// Converts a worksheet range into a grid anchored at A1.
    ///
    /// calamine ranges start at the first used cell, so leading empty rows
    /// and columns are padded back in to keep fixed positions stable.
    #[must_use]
    pub fn from_range(range: &Range<Data>) -> Self {
        let Some((start_row, start_col)) = range.start() else {
            return Self::default();
        };
        let pad_rows = start_row as usize;
        let pad_cols = start_col as usize;

        let mut rows: Vec<Vec<String>> = vec![Vec::new(); pad_rows];
        for cells in range.rows() {
            let mut row = vec![String::new(); pad_cols];
            row.extend(cells.iter().map(cell_text));
            rows.push(row);
        }
        Self { rows }
    }
}

impl From<Vec<Vec<String>>> for Grid {
    fn from(rows: Vec<Vec<String>>) -> Self {
        Self::new(rows)
    }
}

fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        other => other.to_string(),
    }
}

/// Reads the first worksheet of an `.xlsx`/`.xls`/`.ods` file.
///
/// # Errors
///
/// Returns [`IngestError::ReadFailure`] if the workbook cannot be opened,
/// has no worksheets, or the first worksheet cannot be read.
pub fn read_workbook(path: &Path) -> Result<Grid, IngestError> {
    let failure = |reason: String| IngestError::ReadFailure {
        source_id: path.display().to_string(),
        reason,
    };

    let mut workbook = open_workbook_auto(path).map_err(|e| failure(e.to_string()))?;
    let Some(sheet) = workbook.sheet_names().first().cloned() else {
        return Err(failure("workbook has no worksheets".to_string()));
    };
    let range = workbook
        .worksheet_range(&sheet)
        .map_err(|e| failure(e.to_string()))?;

    let grid = Grid::from_range(&range);
    tracing::debug!(path = %path.display(), sheet = %sheet, rows = grid.row_count(), "worksheet read");
    Ok(grid)
}
