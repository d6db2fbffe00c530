// Table reconstruction: per-column value lists back into a rectangle.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use crate::error::StoreError;
use crate::store::{StoredCellValue, Store};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ReconstructMode {
    /// Row `i` takes the `i`-th stored value of every column. Columns with
    /// interior gaps shift up, so values from different sheet rows can end up
    /// side by side.
    #[default]
    Positional,
    /// Rows are the distinct recorded source rows, ascending. Values without a
    /// recorded row are appended positionally after them.
    RowAligned,
}

/// One stored column with its values in identity order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnValues {
    pub name: String,
    pub values: Vec<StoredCellValue>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReconstructedTable {
    pub columns: Vec<String>,
    /// Every row has exactly `columns.len()` cells.
    pub rows: Vec<Vec<String>>,
}

impl ReconstructedTable {
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

pub fn reconstruct(columns: &[ColumnValues], mode: ReconstructMode) -> ReconstructedTable {
    let names = columns.iter().map(|c| c.name.clone()).collect();
    let rows = match mode {
        ReconstructMode::Positional => {
            let lists: Vec<Vec<&str>> = columns
                .iter()
                .map(|c| c.values.iter().map(|v| v.text.as_str()).collect())
                .collect();
            pad_positional(&lists)
        }
        ReconstructMode::RowAligned => row_aligned(columns),
    };
    ReconstructedTable { columns: names, rows }
}

/// `max(len)` rows; short lists are padded with "".
fn pad_positional(lists: &[Vec<&str>]) -> Vec<Vec<String>> {
    let max_rows = lists.iter().map(Vec::len).max().unwrap_or(0);
    (0..max_rows)
        .map(|i| {
            lists
                .iter()
                .map(|list| list.get(i).map(|s| s.to_string()).unwrap_or_default())
                .collect()
        })
        .collect()
}

fn row_aligned(columns: &[ColumnValues]) -> Vec<Vec<String>> {
    let source_rows: BTreeSet<usize> = columns
        .iter()
        .flat_map(|c| c.values.iter().filter_map(|v| v.row))
        .collect();
    let slot: BTreeMap<usize, usize> = source_rows.iter().enumerate().map(|(i, &row)| (row, i)).collect();

    let mut rows = vec![vec![String::new(); columns.len()]; slot.len()];
    let mut unplaced: Vec<Vec<&str>> = vec![Vec::new(); columns.len()];
    for (j, column) in columns.iter().enumerate() {
        for value in &column.values {
            let target = value.row.and_then(|row| slot.get(&row).copied());
            match target {
                Some(i) if rows[i][j].is_empty() => rows[i][j] = value.text.clone(),
                // No recorded row, or a second value for the same row.
                _ => unplaced[j].push(value.text.as_str()),
            }
        }
    }
    rows.extend(pad_positional(&unplaced));
    rows
}

/// Read every column and its values from the store and rebuild the table.
pub fn load_table<S: Store + ?Sized>(store: &S, mode: ReconstructMode) -> Result<ReconstructedTable, StoreError> {
    let mut columns = Vec::new();
    for column in store.list_columns_ordered_by_id()? {
        let values = store.list_cell_values_for_column(column.id)?;
        columns.push(ColumnValues { name: column.name, values });
    }
    let table = reconstruct(&columns, mode);
    log::debug!("reconstructed {} x {} table ({:?})", table.rows.len(), table.columns.len(), mode);
    Ok(table)
}
