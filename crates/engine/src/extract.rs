// Cell extraction: flatten the rows below the header into (column, text) pairs.

use crate::columns::ColumnMap;
use crate::grid::{is_blank, Grid};
use crate::store::NewCellValue;

/// Emit one value per non-blank cell in rows `header_row + 1 ..= max_row`,
/// row by row, left to right, for mapped columns only.
///
/// Text is kept exactly as read; only the blank test trims. Cells under an
/// unmapped (blank-header) position are dropped.
pub fn extract_cells(grid: &Grid, header_row: usize, max_row: usize, columns: &ColumnMap) -> Vec<NewCellValue> {
    let mut values = Vec::new();
    for row in (header_row + 1)..=max_row {
        for (position, column) in columns.iter() {
            let text = grid.cell_text(row, position);
            if is_blank(text) {
                continue;
            }
            values.push(NewCellValue { text: text.to_string(), column, row });
        }
    }
    values
}
