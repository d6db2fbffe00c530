// SQLite-backed store for imported columns and cell values

use std::path::Path;

use rusqlite::{params, Connection};
use sheetvault_engine::error::StoreError;
use sheetvault_engine::store::{CellId, ColumnId, NewCellValue, Store, StoredCellValue, StoredColumn};

const SCHEMA: &str = r#"
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS column_name (
    id INTEGER PRIMARY KEY AUTOINCREMENT,  -- never reused after delete
    name TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS column_data (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    data_text TEXT NOT NULL,
    row_index INTEGER,                     -- 1-indexed source row, NULL if unknown
    column_name INTEGER REFERENCES column_name(id) ON DELETE SET NULL
);

CREATE INDEX IF NOT EXISTS column_data_by_column ON column_data (column_name, id);
"#;

/// Column listing with the number of values each column owns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnStats {
    pub id: ColumnId,
    pub name: String,
    pub values: usize,
}

pub struct SqliteStore {
    conn: Connection,
    in_transaction: bool,
}

impl SqliteStore {
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        let conn = Connection::open(path).map_err(StoreError::backend)?;
        Self::with_connection(conn)
    }

    pub fn open_in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory().map_err(StoreError::backend)?;
        Self::with_connection(conn)
    }

    fn with_connection(conn: Connection) -> Result<Self, StoreError> {
        conn.execute_batch(SCHEMA).map_err(StoreError::backend)?;

        // Databases written before row indices were recorded lack the column
        let has_row_index = conn.prepare("SELECT row_index FROM column_data LIMIT 1").is_ok();
        if !has_row_index {
            log::info!("adding row_index column to existing column_data table");
            conn.execute("ALTER TABLE column_data ADD COLUMN row_index INTEGER", [])
                .map_err(StoreError::backend)?;
        }

        Ok(Self { conn, in_transaction: false })
    }

    pub fn column_stats(&self) -> Result<Vec<ColumnStats>, StoreError> {
        let mut stmt = self
            .conn
            .prepare(
                "SELECT c.id, c.name, COUNT(d.id) FROM column_name c \
                 LEFT JOIN column_data d ON d.column_name = c.id \
                 GROUP BY c.id, c.name ORDER BY c.id",
            )
            .map_err(StoreError::backend)?;
        let rows = stmt
            .query_map([], |row| {
                let id: i64 = row.get(0)?;
                let name: String = row.get(1)?;
                let values: i64 = row.get(2)?;
                Ok(ColumnStats { id: ColumnId(id), name, values: values as usize })
            })
            .map_err(StoreError::backend)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(StoreError::backend)
    }

    /// Cell values whose column has been deleted.
    pub fn orphaned_cell_count(&self) -> Result<usize, StoreError> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM column_data WHERE column_name IS NULL", [], |row| row.get(0))
            .map_err(StoreError::backend)?;
        Ok(count as usize)
    }
}

impl Store for SqliteStore {
    fn begin(&mut self) -> Result<(), StoreError> {
        if self.in_transaction {
            return Err(StoreError::TransactionOpen);
        }
        self.conn.execute_batch("BEGIN IMMEDIATE").map_err(StoreError::backend)?;
        self.in_transaction = true;
        Ok(())
    }

    fn commit(&mut self) -> Result<(), StoreError> {
        if !self.in_transaction {
            return Err(StoreError::NoTransaction);
        }
        self.conn.execute_batch("COMMIT").map_err(StoreError::backend)?;
        self.in_transaction = false;
        Ok(())
    }

    fn rollback(&mut self) -> Result<(), StoreError> {
        if !self.in_transaction {
            return Err(StoreError::NoTransaction);
        }
        self.in_transaction = false;
        self.conn.execute_batch("ROLLBACK").map_err(StoreError::backend)
    }

    fn create_columns(&mut self, names: &[String]) -> Result<Vec<ColumnId>, StoreError> {
        let mut stmt = self
            .conn
            .prepare_cached("INSERT INTO column_name (name) VALUES (?1)")
            .map_err(StoreError::backend)?;
        let mut ids = Vec::with_capacity(names.len());
        for name in names {
            stmt.execute(params![name]).map_err(StoreError::backend)?;
            ids.push(ColumnId(self.conn.last_insert_rowid()));
        }
        Ok(ids)
    }

    fn create_cell_values(&mut self, values: &[NewCellValue]) -> Result<Vec<CellId>, StoreError> {
        let mut stmt = self
            .conn
            .prepare_cached("INSERT INTO column_data (data_text, row_index, column_name) VALUES (?1, ?2, ?3)")
            .map_err(StoreError::backend)?;
        let mut ids = Vec::with_capacity(values.len());
        for value in values {
            stmt.execute(params![value.text, value.row as i64, value.column.0])
                .map_err(StoreError::backend)?;
            ids.push(CellId(self.conn.last_insert_rowid()));
        }
        Ok(ids)
    }

    fn delete_all_cell_values(&mut self) -> Result<usize, StoreError> {
        self.conn.execute("DELETE FROM column_data", []).map_err(StoreError::backend)
    }

    fn delete_all_columns(&mut self) -> Result<usize, StoreError> {
        self.conn.execute("DELETE FROM column_name", []).map_err(StoreError::backend)
    }

    fn list_columns_ordered_by_id(&self) -> Result<Vec<StoredColumn>, StoreError> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, name FROM column_name ORDER BY id")
            .map_err(StoreError::backend)?;
        let rows = stmt
            .query_map([], |row| {
                Ok(StoredColumn { id: ColumnId(row.get(0)?), name: row.get(1)? })
            })
            .map_err(StoreError::backend)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(StoreError::backend)
    }

    fn list_cell_values_for_column(&self, column: ColumnId) -> Result<Vec<StoredCellValue>, StoreError> {
        let mut stmt = self
            .conn
            .prepare_cached("SELECT id, data_text, row_index FROM column_data WHERE column_name = ?1 ORDER BY id")
            .map_err(StoreError::backend)?;
        let rows = stmt
            .query_map(params![column.0], |row| {
                let row_index: Option<i64> = row.get(2)?;
                Ok(StoredCellValue {
                    id: CellId(row.get(0)?),
                    text: row.get(1)?,
                    row: row_index.map(|r| r as usize),
                })
            })
            .map_err(StoreError::backend)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(StoreError::backend)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sheetvault_engine::grid::Grid;
    use sheetvault_engine::import::{display_table, import_grid, ImportOptions};
    use sheetvault_engine::reconstruct::ReconstructMode;
    use sheetvault_engine::store::Transaction;
    use tempfile::NamedTempFile;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_identities_in_creation_order() {
        let mut store = SqliteStore::open_in_memory().unwrap();
        let ids = store.create_columns(&names(&["C", "A", "B"])).unwrap();
        assert!(ids.windows(2).all(|w| w[0] < w[1]));
        let listed: Vec<String> = store.list_columns_ordered_by_id().unwrap().into_iter().map(|c| c.name).collect();
        assert_eq!(listed, names(&["C", "A", "B"]));
    }

    #[test]
    fn test_ids_not_reused_after_delete() {
        let mut store = SqliteStore::open_in_memory().unwrap();
        let first = store.create_columns(&names(&["A"])).unwrap();
        store.delete_all_columns().unwrap();
        let second = store.create_columns(&names(&["A"])).unwrap();
        assert!(second[0] > first[0]);
    }

    #[test]
    fn test_delete_column_sets_null() {
        let mut store = SqliteStore::open_in_memory().unwrap();
        let ids = store.create_columns(&names(&["A"])).unwrap();
        store
            .create_cell_values(&[NewCellValue { text: "v".into(), column: ids[0], row: 2 }])
            .unwrap();
        assert_eq!(store.delete_all_columns().unwrap(), 1);
        assert_eq!(store.orphaned_cell_count().unwrap(), 1);
    }

    #[test]
    fn test_values_ordered_by_id_with_rows() {
        let mut store = SqliteStore::open_in_memory().unwrap();
        let ids = store.create_columns(&names(&["A", "B"])).unwrap();
        store
            .create_cell_values(&[
                NewCellValue { text: "a2".into(), column: ids[0], row: 2 },
                NewCellValue { text: "b2".into(), column: ids[1], row: 2 },
                NewCellValue { text: " a3 ".into(), column: ids[0], row: 3 },
            ])
            .unwrap();
        let values = store.list_cell_values_for_column(ids[0]).unwrap();
        let texts: Vec<(&str, Option<usize>)> = values.iter().map(|v| (v.text.as_str(), v.row)).collect();
        assert_eq!(texts, vec![("a2", Some(2)), (" a3 ", Some(3))]);
    }

    #[test]
    fn test_rollback_restores_previous_state() {
        let mut store = SqliteStore::open_in_memory().unwrap();
        store.create_columns(&names(&["keep"])).unwrap();
        {
            let mut tx = Transaction::begin(&mut store).unwrap();
            tx.delete_all_columns().unwrap();
            tx.create_columns(&names(&["discard"])).unwrap();
        }
        let listed = store.list_columns_ordered_by_id().unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].name, "keep");
    }

    #[test]
    fn test_column_stats() {
        let mut store = SqliteStore::open_in_memory().unwrap();
        let grid = Grid::from_rows([vec!["A", "B"], vec!["1", ""], vec!["2", "x"]]);
        import_grid(&mut store, &grid, &ImportOptions::default()).unwrap();
        let stats = store.column_stats().unwrap();
        let counts: Vec<(&str, usize)> = stats.iter().map(|s| (s.name.as_str(), s.values)).collect();
        assert_eq!(counts, vec![("A", 2), ("B", 1)]);
    }

    #[test]
    fn test_import_persists_across_connections() {
        let file = NamedTempFile::with_suffix(".db").unwrap();
        {
            let mut store = SqliteStore::open(file.path()).unwrap();
            let grid = Grid::from_rows([vec!["A", "B"], vec!["1", "2"], vec!["3", "4"]]);
            import_grid(&mut store, &grid, &ImportOptions::default()).unwrap();
        }
        let store = SqliteStore::open(file.path()).unwrap();
        let table = display_table(&store, ReconstructMode::Positional).unwrap();
        assert_eq!(table.columns, names(&["A", "B"]));
        assert_eq!(table.rows, vec![names(&["1", "2"]), names(&["3", "4"])]);
        assert_eq!(store.orphaned_cell_count().unwrap(), 0);
    }

    #[test]
    fn test_backward_compat_database_without_row_index() {
        let file = NamedTempFile::with_suffix(".db").unwrap();
        {
            let conn = Connection::open(file.path()).unwrap();
            conn.execute_batch(
                r#"
                CREATE TABLE column_name (id INTEGER PRIMARY KEY AUTOINCREMENT, name TEXT NOT NULL);
                CREATE TABLE column_data (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    data_text TEXT NOT NULL,
                    column_name INTEGER REFERENCES column_name(id) ON DELETE SET NULL
                );
                INSERT INTO column_name (name) VALUES ('A'), ('B');
                INSERT INTO column_data (data_text, column_name) VALUES ('x', 1), ('y', 1), ('z', 2);
            "#,
            )
            .unwrap();
        }

        let store = SqliteStore::open(file.path()).expect("Should open old database");
        let columns = store.list_columns_ordered_by_id().unwrap();
        let values = store.list_cell_values_for_column(columns[0].id).unwrap();
        assert!(values.iter().all(|v| v.row.is_none()));

        let table = display_table(&store, ReconstructMode::RowAligned).unwrap();
        assert_eq!(table.rows, vec![names(&["x", "z"]), names(&["y", ""])]);
    }
}
