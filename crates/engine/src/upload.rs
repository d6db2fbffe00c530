// File acceptance checks, run before the payload is parsed.

use std::path::Path;

use crate::error::ImportError;

/// The only accepted container extension, compared case-insensitively.
pub const ACCEPTED_EXTENSION: &str = "xlsx";

/// An uploaded file: its client-side name and the full payload.
#[derive(Debug, Clone, Default)]
pub struct Upload {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl Upload {
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self { file_name: file_name.into(), bytes }
    }

    /// Reject empty payloads and anything that is not `.xlsx`.
    pub fn validate(&self) -> Result<(), ImportError> {
        if self.bytes.is_empty() {
            return Err(ImportError::EmptyUpload);
        }
        let accepted = Path::new(&self.file_name)
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case(ACCEPTED_EXTENSION));
        if !accepted {
            return Err(ImportError::UnsupportedExtension { file_name: self.file_name.clone() });
        }
        Ok(())
    }
}
