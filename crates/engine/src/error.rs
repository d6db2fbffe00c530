use thiserror::Error;

/// Failure reported by a grid reader while opening an uploaded payload.
#[derive(Debug, Error)]
pub enum GridError {
    /// The payload is not a readable workbook container.
    #[error("cannot read workbook: {0}")]
    Unreadable(String),
    /// The container opened but has no worksheet.
    #[error("workbook contains no worksheets")]
    NoWorksheet,
}

/// Failure reported by a store backend.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store backend error: {0}")]
    Backend(String),
    /// A bulk create returned a different number of identities than requested.
    #[error("store returned {got} identities for {expected} rows")]
    IdentityCount { expected: usize, got: usize },
    #[error("no transaction is open")]
    NoTransaction,
    #[error("a transaction is already open")]
    TransactionOpen,
}

impl StoreError {
    pub fn backend(err: impl std::fmt::Display) -> Self {
        Self::Backend(err.to_string())
    }
}

/// Everything that can stop an import.
///
/// All variants except `Persistence` are validation failures: they are
/// detected before the store is touched, and the caller redisplays the
/// upload form with `reason()`.
#[derive(Debug, Error)]
pub enum ImportError {
    #[error("no file was uploaded, or the file is empty")]
    EmptyUpload,
    #[error("'{file_name}' is not an .xlsx file")]
    UnsupportedExtension { file_name: String },
    #[error("{0}")]
    UnreadableWorkbook(String),
    #[error("the file contains no worksheets")]
    NoWorksheet,
    #[error("the worksheet is empty: no cell is filled")]
    EmptySheet,
    #[error("no non-empty row was found to use as the header")]
    NoHeaderFound,
    #[error("storage failure: {0}")]
    Persistence(#[from] StoreError),
}

impl ImportError {
    /// True if the failure left prior data untouched and can be shown to the user.
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, Self::Persistence(_))
    }

    /// Human-readable reason for the upload form.
    pub fn reason(&self) -> String {
        match self {
            Self::EmptyUpload => "Please choose an Excel file (.xlsx).".to_string(),
            Self::UnsupportedExtension { .. } => "The file must be in .xlsx format.".to_string(),
            _ => self.to_string(),
        }
    }
}

impl From<GridError> for ImportError {
    fn from(err: GridError) -> Self {
        match err {
            GridError::Unreadable(msg) => Self::UnreadableWorkbook(msg),
            GridError::NoWorksheet => Self::NoWorksheet,
        }
    }
}
