//! CLI Exit Code Registry
//!
//! This is the single source of truth for all `cellboard` exit codes.
//! Scripts rely on them; do not renumber.
//!
//! | Code | Meaning                                            |
//! |------|----------------------------------------------------|
//! | 0    | Success                                            |
//! | 1    | General error (unspecified)                        |
//! | 2    | Usage error (bad arguments, file already exists)   |
//! | 3    | Dashboard file could not be read or written        |
//! | 4    | Dashboard file is not valid JSON or has no columns |
//! | 5    | Column, cell or sub-cell index out of range        |

/// Success - command completed without errors.
pub const EXIT_SUCCESS: u8 = 0;

/// General error - unspecified failure.
pub const EXIT_ERROR: u8 = 1;

/// Usage error - bad arguments, refusing to overwrite.
pub const EXIT_USAGE: u8 = 2;

/// Dashboard file I/O failure (missing, unreadable, unwritable).
pub const EXIT_CONFIG_IO: u8 = 3;

/// Dashboard file content unusable.
pub const EXIT_CONFIG_PARSE: u8 = 4;

/// Addressed cell does not exist.
pub const EXIT_NOT_FOUND: u8 = 5;

/// Exit code for a store failure.
pub fn store_exit_code(err: &cellboard_io::StoreError) -> u8 {
    if err.is_parse() {
        EXIT_CONFIG_PARSE
    } else if err.is_io() {
        EXIT_CONFIG_IO
    } else {
        EXIT_ERROR
    }
}
