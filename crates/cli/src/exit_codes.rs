//! CLI Exit Code Registry
//!
//! Single source of truth for exit codes. Scripts rely on them.
//!
//! | Code | Description                                        |
//! |------|----------------------------------------------------|
//! | 0    | Success                                            |
//! | 1    | General error (I/O, unreadable settings)           |
//! | 2    | Usage error (bad arguments, unparseable cell refs) |

/// Success - command completed without errors.
pub const EXIT_SUCCESS: u8 = 0;

/// General error - I/O or settings failure.
pub const EXIT_ERROR: u8 = 1;

/// Usage error - bad arguments, malformed cell references or input JSON.
pub const EXIT_USAGE: u8 = 2;
