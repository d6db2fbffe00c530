// Store adapter contract and an in-memory implementation.
//
// The pipeline never talks to a database directly. Backends implement `Store`;
// the write path wraps its mutations in a `Transaction` guard.

use std::ops::{Deref, DerefMut};

use crate::error::StoreError;

/// Opaque column identity, assigned by the store on creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ColumnId(pub i64);

/// Opaque cell value identity, assigned by the store on creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CellId(pub i64);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredColumn {
    pub id: ColumnId,
    pub name: String,
}

/// A cell value to be created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCellValue {
    pub text: String,
    pub column: ColumnId,
    /// 1-indexed sheet row the value came from.
    pub row: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredCellValue {
    pub id: CellId,
    pub text: String,
    /// Source sheet row; `None` for values written without one.
    pub row: Option<usize>,
}

pub trait Store {
    fn begin(&mut self) -> Result<(), StoreError>;
    fn commit(&mut self) -> Result<(), StoreError>;
    fn rollback(&mut self) -> Result<(), StoreError>;

    /// Create one column per name. Identities come back in input order.
    fn create_columns(&mut self, names: &[String]) -> Result<Vec<ColumnId>, StoreError>;
    fn create_cell_values(&mut self, values: &[NewCellValue]) -> Result<Vec<CellId>, StoreError>;
    /// Returns the number of rows removed.
    fn delete_all_cell_values(&mut self) -> Result<usize, StoreError>;
    /// Returns the number of rows removed. Cell values still pointing at a
    /// deleted column lose their column reference instead of being deleted.
    fn delete_all_columns(&mut self) -> Result<usize, StoreError>;

    fn list_columns_ordered_by_id(&self) -> Result<Vec<StoredColumn>, StoreError>;
    /// Values owned by `column`, ordered by identity.
    fn list_cell_values_for_column(&self, column: ColumnId) -> Result<Vec<StoredCellValue>, StoreError>;
}

/// Scoped store transaction. Rolls back on drop unless `commit` was called.
pub struct Transaction<'a, S: Store + ?Sized> {
    store: &'a mut S,
    done: bool,
}

impl<'a, S: Store + ?Sized> Transaction<'a, S> {
    pub fn begin(store: &'a mut S) -> Result<Self, StoreError> {
        store.begin()?;
        Ok(Self { store, done: false })
    }

    /// A failed commit drops the guard, which rolls back.
    pub fn commit(mut self) -> Result<(), StoreError> {
        self.store.commit()?;
        self.done = true;
        Ok(())
    }
}

impl<S: Store + ?Sized> Deref for Transaction<'_, S> {
    type Target = S;

    fn deref(&self) -> &S {
        self.store
    }
}

impl<S: Store + ?Sized> DerefMut for Transaction<'_, S> {
    fn deref_mut(&mut self) -> &mut S {
        self.store
    }
}

impl<S: Store + ?Sized> Drop for Transaction<'_, S> {
    fn drop(&mut self) {
        if self.done {
            return;
        }
        log::warn!("import aborted, rolling back store transaction");
        if let Err(e) = self.store.rollback() {
            log::error!("rollback failed: {}", e);
        }
    }
}

#[derive(Debug, Clone, Default)]
struct MemoryState {
    columns: Vec<StoredColumn>,
    cells: Vec<(StoredCellValue, Option<ColumnId>)>,
    next_column_id: i64,
    next_cell_id: i64,
}

/// Store kept entirely in memory. Identities grow monotonically and are never
/// reused, like an autoincrement key.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    state: MemoryState,
    snapshot: Option<MemoryState>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored cell values whose column was deleted.
    pub fn orphaned_cell_count(&self) -> usize {
        self.state.cells.iter().filter(|(_, column)| column.is_none()).count()
    }
}

impl Store for MemoryStore {
    fn begin(&mut self) -> Result<(), StoreError> {
        if self.snapshot.is_some() {
            return Err(StoreError::TransactionOpen);
        }
        self.snapshot = Some(self.state.clone());
        Ok(())
    }

    fn commit(&mut self) -> Result<(), StoreError> {
        self.snapshot.take().map(|_| ()).ok_or(StoreError::NoTransaction)
    }

    fn rollback(&mut self) -> Result<(), StoreError> {
        self.state = self.snapshot.take().ok_or(StoreError::NoTransaction)?;
        Ok(())
    }

    fn create_columns(&mut self, names: &[String]) -> Result<Vec<ColumnId>, StoreError> {
        let mut ids = Vec::with_capacity(names.len());
        for name in names {
            self.state.next_column_id += 1;
            let id = ColumnId(self.state.next_column_id);
            self.state.columns.push(StoredColumn { id, name: name.clone() });
            ids.push(id);
        }
        Ok(ids)
    }

    fn create_cell_values(&mut self, values: &[NewCellValue]) -> Result<Vec<CellId>, StoreError> {
        let mut ids = Vec::with_capacity(values.len());
        for value in values {
            self.state.next_cell_id += 1;
            let id = CellId(self.state.next_cell_id);
            let stored = StoredCellValue { id, text: value.text.clone(), row: Some(value.row) };
            self.state.cells.push((stored, Some(value.column)));
            ids.push(id);
        }
        Ok(ids)
    }

    fn delete_all_cell_values(&mut self) -> Result<usize, StoreError> {
        let removed = self.state.cells.len();
        self.state.cells.clear();
        Ok(removed)
    }

    fn delete_all_columns(&mut self) -> Result<usize, StoreError> {
        let removed = self.state.columns.len();
        self.state.columns.clear();
        for (_, column) in &mut self.state.cells {
            *column = None;
        }
        Ok(removed)
    }

    fn list_columns_ordered_by_id(&self) -> Result<Vec<StoredColumn>, StoreError> {
        let mut columns = self.state.columns.clone();
        columns.sort_by_key(|c| c.id);
        Ok(columns)
    }

    fn list_cell_values_for_column(&self, column: ColumnId) -> Result<Vec<StoredCellValue>, StoreError> {
        let mut values: Vec<StoredCellValue> = self
            .state
            .cells
            .iter()
            .filter(|(_, owner)| *owner == Some(column))
            .map(|(value, _)| value.clone())
            .collect();
        values.sort_by_key(|v| v.id);
        Ok(values)
    }
}
