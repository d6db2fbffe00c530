//! CLI Exit Code Registry
//!
//! This is the single source of truth for all CLI exit codes.
//! Exit codes are part of the shell contract; scripts rely on them.
//!
//! # Exit Code Ranges
//!
//! | Range   | Domain           | Description                              |
//! |---------|------------------|------------------------------------------|
//! | 0       | Universal        | Success                                  |
//! | 1       | Universal        | General error (unspecified)              |
//! | 2       | Universal        | CLI usage error (bad args, missing file) |
//! | 3       | Universal        | File or database could not be opened     |
//! | 10-19   | import           | Import outcome codes                     |
//!
//! # Adding New Exit Codes
//!
//! 1. Add the constant in the appropriate range
//! 2. Document what triggers it
//! 3. Update the table above
//! 4. Wire it into the relevant command's error handling

use sheetvault_engine::ImportError;

// =============================================================================
// Universal (0-3)
// =============================================================================

/// Success - command completed without errors.
pub const EXIT_SUCCESS: u8 = 0;

/// General error - unspecified failure.
/// Avoid using this; prefer a specific error code.
pub const EXIT_ERROR: u8 = 1;

/// Usage error - bad arguments, missing required options.
pub const EXIT_USAGE: u8 = 2;

/// IO error - input file unreadable, database cannot be opened.
pub const EXIT_IO: u8 = 3;

// =============================================================================
// Import (10-19)
// =============================================================================

/// Upload rejected before the store was touched (wrong extension, empty
/// file, unreadable workbook, no worksheet, empty sheet, no header row).
/// Previously stored data is unchanged.
pub const EXIT_IMPORT_REJECTED: u8 = 10;

/// Storage failed during the replace step. The transaction was rolled back.
pub const EXIT_IMPORT_PERSISTENCE: u8 = 11;

/// Map an import error to its exit code.
pub fn import_exit_code(err: &ImportError) -> u8 {
    if err.is_recoverable() {
        EXIT_IMPORT_REJECTED
    } else {
        EXIT_IMPORT_PERSISTENCE
    }
}
