// Header row detection.
//
// Two policies exist and they disagree on sheets with several non-empty rows,
// so the policy is a configuration value rather than a fixed rule.

use crate::grid::Grid;

/// Rows inspected by the bounded policy unless configured otherwise.
pub const DEFAULT_WINDOW_ROWS: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderSearchMode {
    /// Scan every row; the last non-empty row wins. On a sheet where every
    /// row has text this picks the final data row.
    FullScanLastNonEmpty,
    /// Scan rows `1..=window_rows`; the first non-empty row wins.
    BoundedScanFirstNonEmpty { window_rows: usize },
}

impl Default for HeaderSearchMode {
    fn default() -> Self {
        Self::BoundedScanFirstNonEmpty { window_rows: DEFAULT_WINDOW_ROWS }
    }
}

/// Find the 1-indexed header row, or `None` if the policy finds no candidate.
pub fn locate_header_row(grid: &Grid, mode: HeaderSearchMode) -> Option<usize> {
    let max_row = grid.extent().max_row;
    let found = match mode {
        HeaderSearchMode::FullScanLastNonEmpty => {
            (1..=max_row).rev().find(|&row| grid.row_has_text(row))
        }
        HeaderSearchMode::BoundedScanFirstNonEmpty { window_rows } => {
            (1..=window_rows.min(max_row)).find(|&row| grid.row_has_text(row))
        }
    };
    log::debug!("header search {:?} over {} rows -> {:?}", mode, max_row, found);
    found
}

#[cfg(test)]
mod tests {
    use super::*;

    const BOUNDED: HeaderSearchMode = HeaderSearchMode::BoundedScanFirstNonEmpty { window_rows: 3 };

    #[test]
    fn test_bounded_picks_first_non_empty() {
        let grid = Grid::from_rows([vec!["", ""], vec!["A", "B"], vec!["1", "2"]]);
        assert_eq!(locate_header_row(&grid, BOUNDED), Some(2));
    }

    #[test]
    fn test_bounded_ignores_rows_past_window() {
        let mut grid = Grid::new("Sheet1");
        grid.set_text(4, 1, "late header");
        grid.set_text(5, 1, "data");
        assert_eq!(locate_header_row(&grid, BOUNDED), None);
    }

    #[test]
    fn test_bounded_window_clamped_to_extent() {
        let grid = Grid::from_rows([vec!["only"]]);
        let wide = HeaderSearchMode::BoundedScanFirstNonEmpty { window_rows: 100 };
        assert_eq!(locate_header_row(&grid, wide), Some(1));
    }

    #[test]
    fn test_bounded_zero_window_finds_nothing() {
        let grid = Grid::from_rows([vec!["A"]]);
        let none = HeaderSearchMode::BoundedScanFirstNonEmpty { window_rows: 0 };
        assert_eq!(locate_header_row(&grid, none), None);
    }

    #[test]
    fn test_full_scan_picks_last_non_empty() {
        let grid = Grid::from_rows([vec!["A", "B"], vec!["1", "2"], vec!["3", "4"], vec!["", ""]]);
        assert_eq!(locate_header_row(&grid, HeaderSearchMode::FullScanLastNonEmpty), Some(3));
    }

    #[test]
    fn test_whitespace_rows_are_empty() {
        let grid = Grid::from_rows([vec!["  ", "\t"], vec!["", "H"]]);
        assert_eq!(locate_header_row(&grid, BOUNDED), Some(2));
        assert_eq!(locate_header_row(&grid, HeaderSearchMode::FullScanLastNonEmpty), Some(2));
    }

    #[test]
    fn test_empty_grid_has_no_header() {
        let grid = Grid::new("Sheet1");
        assert_eq!(locate_header_row(&grid, BOUNDED), None);
        assert_eq!(locate_header_row(&grid, HeaderSearchMode::FullScanLastNonEmpty), None);
    }

    #[test]
    fn test_default_is_bounded_three() {
        assert_eq!(HeaderSearchMode::default(), BOUNDED);
    }
}
