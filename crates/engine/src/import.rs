// Import entry point: upload -> grid -> header -> columns -> cells -> store.
//
// Everything that can reject the file runs before the store is touched. The
// replace step (delete old values, delete old columns, create new ones) runs
// inside one transaction, so a failure leaves the previous import in place.

use serde::Serialize;

use crate::columns::{plan_columns, ColumnMap, MAX_COLUMN_NAME_LEN};
use crate::error::ImportError;
use crate::extract::extract_cells;
use crate::grid::{Grid, GridReader};
use crate::header::{locate_header_row, HeaderSearchMode};
use crate::reconstruct::{load_table, ReconstructMode, ReconstructedTable};
use crate::store::{Store, Transaction};
use crate::upload::Upload;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImportOptions {
    pub header_mode: HeaderSearchMode,
    pub max_column_name_len: usize,
}

impl Default for ImportOptions {
    fn default() -> Self {
        Self {
            header_mode: HeaderSearchMode::default(),
            max_column_name_len: MAX_COLUMN_NAME_LEN,
        }
    }
}

/// Result of a successful import
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ImportSummary {
    pub sheet: String,
    /// 1-indexed header row
    pub header_row: usize,
    pub columns_created: usize,
    pub cells_stored: usize,
    /// Header positions with blank text; their data was discarded
    pub skipped_positions: Vec<usize>,
    pub truncated_names: usize,
    pub replaced_columns: usize,
    pub replaced_cells: usize,
}

/// Validate, open, and import an uploaded workbook.
pub fn import_upload<R, S>(reader: &R, store: &mut S, upload: &Upload, options: &ImportOptions) -> Result<ImportSummary, ImportError>
where
    R: GridReader + ?Sized,
    S: Store + ?Sized,
{
    upload.validate()?;
    log::info!("importing '{}' ({} bytes)", upload.file_name, upload.bytes.len());
    let grid = reader.open(&upload.bytes)?;
    import_grid(store, &grid, options)
}

/// Import an already materialized grid with replace semantics.
pub fn import_grid<S: Store + ?Sized>(store: &mut S, grid: &Grid, options: &ImportOptions) -> Result<ImportSummary, ImportError> {
    let extent = grid.extent();
    if extent.is_empty() {
        return Err(ImportError::EmptySheet);
    }
    let header_row = locate_header_row(grid, options.header_mode).ok_or(ImportError::NoHeaderFound)?;
    let plan = plan_columns(grid, header_row, extent.max_col, options.max_column_name_len);

    let mut tx = Transaction::begin(store)?;
    let replaced_cells = tx.delete_all_cell_values()?;
    let replaced_columns = tx.delete_all_columns()?;

    let ids = tx.create_columns(&plan.names())?;
    let columns = ColumnMap::bind(&plan, &ids)?;

    let values = extract_cells(grid, header_row, extent.max_row, &columns);
    if !values.is_empty() {
        tx.create_cell_values(&values)?;
    }
    tx.commit()?;

    let summary = ImportSummary {
        sheet: grid.name.clone(),
        header_row,
        columns_created: columns.len(),
        cells_stored: values.len(),
        skipped_positions: plan.skipped.clone(),
        truncated_names: plan.truncated_count(),
        replaced_columns,
        replaced_cells,
    };
    log::info!(
        "imported sheet '{}': header row {}, {} columns, {} values (replaced {} columns, {} values)",
        summary.sheet,
        summary.header_row,
        summary.columns_created,
        summary.cells_stored,
        summary.replaced_columns,
        summary.replaced_cells
    );
    Ok(summary)
}

/// Display entry point: the stored data as a rectangular table.
pub fn display_table<S: Store + ?Sized>(store: &S, mode: ReconstructMode) -> Result<ReconstructedTable, ImportError> {
    Ok(load_table(store, mode)?)
}
