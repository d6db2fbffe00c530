// In-memory grid of cell text, 1-indexed rows and columns.
//
// The grid is fully materialized before any import step runs. Only non-blank
// cells are kept; every other position reads back as "".

use std::collections::HashMap;

use crate::error::GridError;

/// True for empty or whitespace-only text.
pub fn is_blank(text: &str) -> bool {
    text.trim().is_empty()
}

/// Bounding extent of the used cells: `1..=max_row` x `1..=max_col`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Extent {
    pub max_row: usize,
    pub max_col: usize,
}

impl Extent {
    pub fn new(max_row: usize, max_col: usize) -> Self {
        Self { max_row, max_col }
    }

    /// An extent with no usable row or column.
    pub fn is_empty(&self) -> bool {
        self.max_row == 0 || self.max_col == 0
    }
}

#[derive(Debug, Clone, Default)]
pub struct Grid {
    pub name: String,
    cells: HashMap<(usize, usize), String>,
    extent: Extent,
}

impl Grid {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            cells: HashMap::new(),
            extent: Extent::default(),
        }
    }

    /// Build a grid from row-major text, starting at A1.
    pub fn from_rows<R, C>(rows: R) -> Self
    where
        R: IntoIterator<Item = C>,
        C: IntoIterator,
        C::Item: AsRef<str>,
    {
        let mut grid = Self::new("Sheet1");
        for (r, row) in rows.into_iter().enumerate() {
            for (c, text) in row.into_iter().enumerate() {
                grid.set_text(r + 1, c + 1, text.as_ref());
            }
        }
        grid
    }

    /// Set the text at a 1-indexed position. Row or column 0 is ignored.
    ///
    /// Empty text clears the cell. Whitespace-only text is kept (it still
    /// counts toward the extent, matching how spreadsheet dimensions work),
    /// but every blank test treats it as empty.
    pub fn set_text(&mut self, row: usize, col: usize, text: &str) {
        if row == 0 || col == 0 {
            return;
        }
        if text.is_empty() {
            self.cells.remove(&(row, col));
            return;
        }
        self.cells.insert((row, col), text.to_string());
        self.extent.max_row = self.extent.max_row.max(row);
        self.extent.max_col = self.extent.max_col.max(col);
    }

    /// Text at a 1-indexed position; "" for empty or out-of-range cells.
    pub fn cell_text(&self, row: usize, col: usize) -> &str {
        self.cells.get(&(row, col)).map(String::as_str).unwrap_or("")
    }

    pub fn extent(&self) -> Extent {
        self.extent
    }

    /// Widen the extent without adding cells (e.g. a reader reporting the
    /// sheet's declared dimension).
    pub fn grow_extent(&mut self, extent: Extent) {
        self.extent.max_row = self.extent.max_row.max(extent.max_row);
        self.extent.max_col = self.extent.max_col.max(extent.max_col);
    }

    /// True if any cell in `1..=max_col` of `row` has non-whitespace text.
    pub fn row_has_text(&self, row: usize) -> bool {
        (1..=self.extent.max_col).any(|col| !is_blank(self.cell_text(row, col)))
    }

    pub fn non_blank_count(&self) -> usize {
        self.cells.values().filter(|text| !is_blank(text)).count()
    }
}

/// Opens an uploaded payload as a grid (the first worksheet only).
pub trait GridReader {
    fn open(&self, bytes: &[u8]) -> Result<Grid, GridError>;
}
