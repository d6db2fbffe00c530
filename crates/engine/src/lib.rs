//! `sheetvault-engine`: spreadsheet ingestion and reconstruction.
//!
//! Pure pipeline crate: header detection, column mapping, cell extraction and
//! table reconstruction over a `Store` trait. No file or database IO; the
//! concrete grid reader and SQLite store live in `sheetvault-io`.

pub mod columns;
pub mod error;
pub mod extract;
pub mod grid;
pub mod header;
pub mod import;
pub mod reconstruct;
pub mod store;
pub mod upload;

pub use error::{GridError, ImportError, StoreError};
pub use grid::{Extent, Grid, GridReader};
pub use header::HeaderSearchMode;
pub use import::{display_table, import_grid, import_upload, ImportOptions, ImportSummary};
pub use reconstruct::{ReconstructMode, ReconstructedTable};
pub use store::{ColumnId, CellId, MemoryStore, Store, Transaction};
pub use upload::Upload;
