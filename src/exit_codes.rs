//! Process exit codes.
//!
//! - `0`: success, or usage was printed
//! - `1`: the requested mode is not implemented yet
//! - `2`: failure before anything was written
//! - `3`: a write failed and everything written was cleaned up
//! - `4`: a write failed and cleanup failed too, manual repair needed

pub const SUCCESS: i32 = 0;
pub const NOT_IMPLEMENTED_YET: i32 = 1;
pub const ERROR_BEFORE_WRITE: i32 = 2;
pub const FAIL_CLEANUP_OK: i32 = 3;
pub const FAIL_CLEANUP_FAIL: i32 = 4;
