// Column mapping: header cells -> named columns -> store identities.

use std::collections::BTreeMap;

use crate::error::StoreError;
use crate::grid::{is_blank, Grid};
use crate::store::ColumnId;

/// Longest column name kept by default, in characters.
pub const MAX_COLUMN_NAME_LEN: usize = 80;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedColumn {
    /// 1-indexed sheet column.
    pub position: usize,
    pub name: String,
    pub truncated: bool,
}

/// Column creation requests, left to right, one per non-blank header cell.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnPlan {
    pub columns: Vec<PlannedColumn>,
    /// Header positions skipped because their cell was blank.
    pub skipped: Vec<usize>,
}

impl ColumnPlan {
    pub fn names(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.name.clone()).collect()
    }

    pub fn truncated_count(&self) -> usize {
        self.columns.iter().filter(|c| c.truncated).count()
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

fn limit_name(name: &str, max_len: usize) -> (String, bool) {
    match name.char_indices().nth(max_len) {
        Some((cut, _)) => (name[..cut].trim_end().to_string(), true),
        None => (name.to_string(), false),
    }
}

/// Plan one column per non-blank header cell in `1..=max_col`.
pub fn plan_columns(grid: &Grid, header_row: usize, max_col: usize, max_name_len: usize) -> ColumnPlan {
    let mut plan = ColumnPlan::default();
    for position in 1..=max_col {
        let text = grid.cell_text(header_row, position);
        if is_blank(text) {
            plan.skipped.push(position);
            continue;
        }
        let (name, truncated) = limit_name(text.trim(), max_name_len);
        if truncated {
            log::warn!("column name at position {} truncated to {} characters", position, max_name_len);
        }
        plan.columns.push(PlannedColumn { position, name, truncated });
    }
    log::debug!(
        "header row {}: {} columns planned, {} blank positions skipped",
        header_row,
        plan.columns.len(),
        plan.skipped.len()
    );
    plan
}

/// Sheet column position -> assigned column identity.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnMap {
    by_position: BTreeMap<usize, ColumnId>,
}

impl ColumnMap {
    /// Pair planned columns with the identities the store returned for them.
    ///
    /// The store hands identities back in creation order, so the mapping is
    /// recorded here rather than re-derived from a later listing.
    pub fn bind(plan: &ColumnPlan, ids: &[ColumnId]) -> Result<Self, StoreError> {
        if plan.columns.len() != ids.len() {
            return Err(StoreError::IdentityCount { expected: plan.columns.len(), got: ids.len() });
        }
        let by_position = plan.columns.iter().map(|c| c.position).zip(ids.iter().copied()).collect();
        Ok(Self { by_position })
    }

    pub fn get(&self, position: usize) -> Option<ColumnId> {
        self.by_position.get(&position).copied()
    }

    /// Mapped positions in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, ColumnId)> + '_ {
        self.by_position.iter().map(|(&position, &id)| (position, id))
    }

    pub fn len(&self) -> usize {
        self.by_position.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_position.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_blank_header_cells_skipped() {
        let grid = Grid::from_rows([vec!["A", "", "C"], vec!["1", "2", "3"]]);
        let plan = plan_columns(&grid, 1, 3, MAX_COLUMN_NAME_LEN);
        assert_eq!(plan.names(), vec!["A", "C"]);
        assert_eq!(plan.skipped, vec![2]);
        assert_eq!(plan.columns[1].position, 3);
    }

    #[test]
    fn test_names_trimmed_and_duplicates_kept() {
        let grid = Grid::from_rows([vec!["  Name ", "\tName", "   "]]);
        let plan = plan_columns(&grid, 1, 3, MAX_COLUMN_NAME_LEN);
        assert_eq!(plan.names(), vec!["Name", "Name"]);
    }

    #[test]
    fn test_long_name_truncated_by_chars() {
        let long = "é".repeat(100);
        let grid = Grid::from_rows([vec![long.as_str()]]);
        let plan = plan_columns(&grid, 1, 1, MAX_COLUMN_NAME_LEN);
        assert_eq!(plan.columns[0].name.chars().count(), 80);
        assert!(plan.columns[0].truncated);
        assert_eq!(plan.truncated_count(), 1);
    }

    #[test]
    fn test_name_at_limit_not_truncated() {
        let exact = "x".repeat(80);
        let grid = Grid::from_rows([vec![exact.as_str()]]);
        let plan = plan_columns(&grid, 1, 1, MAX_COLUMN_NAME_LEN);
        assert_eq!(plan.columns[0].name, exact);
        assert!(!plan.columns[0].truncated);
    }

    #[test]
    fn test_bind_records_positions() {
        let grid = Grid::from_rows([vec!["", "B", "", "D"]]);
        let plan = plan_columns(&grid, 1, 4, MAX_COLUMN_NAME_LEN);
        let map = ColumnMap::bind(&plan, &[ColumnId(10), ColumnId(11)]).unwrap();
        assert_eq!(map.get(1), None);
        assert_eq!(map.get(2), Some(ColumnId(10)));
        assert_eq!(map.get(4), Some(ColumnId(11)));
        assert_eq!(map.iter().collect::<Vec<_>>(), vec![(2, ColumnId(10)), (4, ColumnId(11))]);
    }

    #[test]
    fn test_bind_rejects_count_mismatch() {
        let grid = Grid::from_rows([vec!["A", "B"]]);
        let plan = plan_columns(&grid, 1, 2, MAX_COLUMN_NAME_LEN);
        let err = ColumnMap::bind(&plan, &[ColumnId(1)]).unwrap_err();
        assert!(matches!(err, StoreError::IdentityCount { expected: 2, got: 1 }));
    }

    proptest! {
        #[test]
        fn prop_plan_matches_non_blank_header_cells(header in proptest::collection::vec("[ a-c]{0,3}", 1..12)) {
            let grid = Grid::from_rows([header.clone()]);
            let max_col = header.len();
            let plan = plan_columns(&grid, 1, max_col, MAX_COLUMN_NAME_LEN);

            let expected: Vec<(usize, String)> = header
                .iter()
                .enumerate()
                .filter(|(_, text)| !text.trim().is_empty())
                .map(|(i, text)| (i + 1, text.trim().to_string()))
                .collect();
            let actual: Vec<(usize, String)> = plan.columns.iter().map(|c| (c.position, c.name.clone())).collect();
            prop_assert_eq!(actual, expected);
            prop_assert_eq!(plan.len() + plan.skipped.len(), max_col);
        }
    }
}
