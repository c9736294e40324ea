//! Grid → [`ParsedSubmission`].
//!
//! Template layout (1-indexed):
//!
//! | Row | Content |
//! |-----|---------|
//! | 1-4 | header values in column 2: group id, group name, account id, pass |
//! | 5   | free text, ignored |
//! | 6   | detail column labels |
//! | 7.. | one product per row |

use std::collections::HashMap;

use postbatch_core::actions::action_for_label;
use postbatch_core::{ParsedSubmission, SubmissionHeader, SubmissionRow};

use crate::grid::Grid;
use crate::labels::{field_for_label, header_value, Field};
use crate::validate::{parse_price, validate_header, validate_row};

/// Row carrying the detail column labels.
pub const DETAIL_HEADER_ROW: usize = 6;

const HEADER_VALUE_COLUMN: usize = 2;

/// Parses a submission grid.
///
/// Two conditions make the document fatal (`header == None`, no rows): a
/// grid shorter than [`DETAIL_HEADER_ROW`] and a detail-header row without
/// a single recognised label. Missing header values are reported in
/// `header_errors` but do not stop row parsing.
#[must_use]
pub fn parse_submission(grid: &Grid) -> ParsedSubmission {
    if grid.row_count() < DETAIL_HEADER_ROW {
        return ParsedSubmission::fatal(format!(
            "file has {} rows; at least {DETAIL_HEADER_ROW} are required",
            grid.row_count()
        ));
    }

    let header = SubmissionHeader {
        business_group_id: header_value(grid.cell(1, HEADER_VALUE_COLUMN)),
        business_group_name: header_value(grid.cell(2, HEADER_VALUE_COLUMN)),
        account_id: header_value(grid.cell(3, HEADER_VALUE_COLUMN)),
        pass: header_value(grid.cell(4, HEADER_VALUE_COLUMN)),
    };
    let header_errors = validate_header(&header);

    let columns = column_map(grid.row(DETAIL_HEADER_ROW).unwrap_or_default());
    if columns.is_empty() {
        return ParsedSubmission::fatal(format!(
            "no recognised column labels in row {DETAIL_HEADER_ROW}"
        ));
    }

    let rows: Vec<SubmissionRow> = (DETAIL_HEADER_ROW + 1..=grid.row_count())
        .filter_map(|row_number| {
            let cells = grid.row(row_number)?;
            if cells.iter().all(|c| c.trim().is_empty()) {
                return None;
            }
            Some(build_row(row_number, cells, &columns))
        })
        .collect();

    tracing::debug!(
        rows = rows.len(),
        invalid = rows.iter().filter(|r| !r.is_valid()).count(),
        header_errors = header_errors.len(),
        "submission parsed"
    );

    ParsedSubmission {
        header: Some(header),
        rows,
        header_errors,
    }
}

/// Field → 0-based column index. The first column carrying a label wins.
fn column_map(labels: &[String]) -> HashMap<Field, usize> {
    let mut columns = HashMap::new();
    for (index, label) in labels.iter().enumerate() {
        if let Some(field) = field_for_label(label) {
            columns.entry(field).or_insert(index);
        }
    }
    columns
}

fn build_row(row_number: usize, cells: &[String], columns: &HashMap<Field, usize>) -> SubmissionRow {
    let value = |field: Field| -> String {
        columns
            .get(&field)
            .and_then(|&i| cells.get(i))
            .map(|c| c.trim().to_string())
            .unwrap_or_default()
    };

    let button_label = value(Field::ButtonLabel);
    let mut row = SubmissionRow {
        row_number,
        business_name: value(Field::BusinessName),
        store_code: value(Field::StoreCode),
        product_category: value(Field::ProductCategory),
        product_name: value(Field::ProductName),
        description: value(Field::Description),
        price: parse_price(&value(Field::Price)),
        button_action_type: action_for_label(&button_label),
        button_label,
        landing_page_url: value(Field::LandingPageUrl),
        image_path: value(Field::ImagePath),
        errors: Vec::new(),
    };
    row.errors = validate_row(&row);
    row
}

#[cfg(test)]
#[path = "parse_test.rs"]
mod tests;
