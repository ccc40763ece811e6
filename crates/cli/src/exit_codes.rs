//! CLI Exit Code Registry
//!
//! This is the single source of truth for all CLI exit codes.
//! Exit codes are part of the shell contract; scripts rely on them.
//!
//! | Code | Description                                        |
//! |------|----------------------------------------------------|
//! | 0    | Success                                            |
//! | 1    | General error (unspecified)                        |
//! | 2    | Usage error (bad selection, missing option)        |
//! | 3    | I/O error (cannot read table, cannot write output) |
//! | 4    | Parse error (malformed table or event stream)      |
//!
//! # Adding New Exit Codes
//!
//! 1. Add the constant
//! 2. Document what triggers it
//! 3. Update the table above

/// Success - command completed without errors.
pub const EXIT_SUCCESS: u8 = 0;

/// General error - unspecified failure.
/// Avoid using this; prefer a specific error code.
pub const EXIT_ERROR: u8 = 1;

/// Usage error - bad arguments, coordinates outside the table.
pub const EXIT_USAGE: u8 = 2;

/// File could not be opened, read or written.
pub const EXIT_IO: u8 = 3;

/// Input was readable but not a valid table payload or event stream.
pub const EXIT_PARSE: u8 = 4;
