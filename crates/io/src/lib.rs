// File and storage IO for the import pipeline

pub mod store;
pub mod xlsx;

pub use store::SqliteStore;
pub use xlsx::XlsxReader;
