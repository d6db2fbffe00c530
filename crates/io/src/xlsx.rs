// Excel grid reader (xlsx only)
//
// Reads the first worksheet of an in-memory .xlsx payload into a Grid of cell
// text. Values are rendered the way a user sees them in the sheet: integral
// numbers without decimals, booleans as TRUE/FALSE, dates as ISO text.

use std::io::Cursor;

use calamine::{Data, ExcelDateTime, Reader, Xlsx};
use sheetvault_engine::error::GridError;
use sheetvault_engine::grid::{Extent, Grid, GridReader};

#[derive(Debug, Clone, Copy, Default)]
pub struct XlsxReader;

impl XlsxReader {
    pub fn new() -> Self {
        Self
    }
}

impl GridReader for XlsxReader {
    fn open(&self, bytes: &[u8]) -> Result<Grid, GridError> {
        read_first_sheet(bytes)
    }
}

/// Read the first worksheet. An empty worksheet yields an empty grid.
pub fn read_first_sheet(bytes: &[u8]) -> Result<Grid, GridError> {
    let mut workbook: Xlsx<_> = Xlsx::new(Cursor::new(bytes))
        .map_err(|e| GridError::Unreadable(format!("Failed to open Excel file: {}", e)))?;

    let sheet_name = workbook.sheet_names().first().cloned().ok_or(GridError::NoWorksheet)?;
    let range = workbook
        .worksheet_range(&sheet_name)
        .map_err(|e| GridError::Unreadable(format!("Failed to read sheet '{}': {}", sheet_name, e)))?;

    let mut grid = Grid::new(&sheet_name);
    if range.is_empty() {
        log::debug!("sheet '{}' has no cells", sheet_name);
        return Ok(grid);
    }

    // Range start offset (data may not begin at A1)
    let (start_row, start_col) = range.start().unwrap_or((0, 0));
    for (row_idx, row) in range.rows().enumerate() {
        for (col_idx, cell) in row.iter().enumerate() {
            if let Some(text) = cell_text(cell) {
                grid.set_text(start_row as usize + row_idx + 1, start_col as usize + col_idx + 1, &text);
            }
        }
    }
    if let Some((end_row, end_col)) = range.end() {
        grid.grow_extent(Extent::new(end_row as usize + 1, end_col as usize + 1));
    }

    log::debug!("read sheet '{}': extent {:?}, {} non-blank cells", sheet_name, grid.extent(), grid.non_blank_count());
    Ok(grid)
}

/// Displayed text of a cell, `None` for empty cells.
fn cell_text(cell: &Data) -> Option<String> {
    match cell {
        Data::Empty => None,
        Data::String(s) => Some(s.clone()),
        Data::Float(n) => Some(format_number(*n)),
        Data::Int(n) => Some(n.to_string()),
        Data::Bool(b) => Some(if *b { "TRUE" } else { "FALSE" }.to_string()),
        Data::Error(e) => Some(e.to_string()),
        Data::DateTime(dt) => Some(format_datetime(dt)),
        Data::DateTimeIso(s) => Some(s.clone()),
        Data::DurationIso(s) => Some(s.clone()),
    }
}

// Integers without decimals
fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{}", n)
    }
}

/// Render a date cell as ISO text. Calendar conversion (the 1904 date system
/// and the phantom 1900-02-29) is left to calamine.
///
/// Serials below 1 are times of day; whole serials are dates.
fn format_datetime(dt: &ExcelDateTime) -> String {
    let serial = dt.as_f64();
    if dt.is_duration() {
        return match dt.as_duration() {
            Some(d) => {
                let secs = d.num_seconds();
                let sign = if secs < 0 { "-" } else { "" };
                let secs = secs.abs();
                format!("{}{}:{:02}:{:02}", sign, secs / 3600, secs / 60 % 60, secs % 60)
            }
            None => format_number(serial),
        };
    }
    match dt.as_datetime() {
        Some(t) if serial.abs() < 1.0 => t.format("%H:%M:%S").to_string(),
        Some(t) if serial.fract() == 0.0 => t.format("%Y-%m-%d").to_string(),
        Some(t) => t.format("%Y-%m-%d %H:%M:%S").to_string(),
        None => format_number(serial),
    }
}
