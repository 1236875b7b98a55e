//! Arrow Glue - C FFI Interface
//!
//! This crate provides a C-compatible interface over the `arrow-glue` core
//! library. Every Arrow value crosses the boundary as an `int64_t` handle id.
//!
//! # Usage from C/C++
//!
//! ```c
//! #include <arrow_glue/arrow_glue.h>
//!
//! arrow_glue_init();
//!
//! int64_t data_type = arrow_glue_int32_data_type_new();
//! int64_t field = arrow_glue_field_new("a", data_type, true);
//! int64_t schema = arrow_glue_schema_new(&field, 1);
//! int64_t data = arrow_glue_int32_array_new(NULL, NULL, 0);
//! int64_t column = arrow_glue_column_new(field, data);
//! int64_t table = arrow_glue_table_new("t", schema, &column, 1);
//! if (table == 0) {
//!     const char* error = arrow_glue_get_last_error();
//!     // Handle error
//! }
//!
//! const char* name = arrow_glue_table_get_name(table);   // borrowed
//! int64_t n_rows = arrow_glue_table_get_n_rows(table);
//!
//! // Every handle is released exactly once
//! arrow_glue_handle_release(table);
//! ```
//!
//! # Conventions
//!
//! * Constructors and accessors returning handles return 0 on error.
//! * Status functions return `ARROW_GLUE_SUCCESS` (0) or a negative error code.
//! * Counts are returned as `int64_t`; negative values are error codes.
//! * After any failure, `arrow_glue_get_last_error()` describes it.
//! * `const char*` results are borrowed from the handle; `char*` results are
//!   owned by the caller and freed with `arrow_glue_string_free()`.

use std::any::Any;
use std::cell::RefCell;
use std::ffi::{CStr, CString};
use std::os::raw::{c_char, c_int};
use std::panic::{self, AssertUnwindSafe};

use arrow_glue::registry;
use arrow_glue::{GlueError, HandleId, HandleKind, Result};

mod array;
mod data_type;
mod schema;
mod table;

pub use array::*;
pub use data_type::*;
pub use schema::*;
pub use table::*;

// ============================================================================
// Error code constants for C interface
// ============================================================================

/// Operation completed successfully
pub const ARROW_GLUE_SUCCESS: c_int = 0;

/// A required pointer was NULL
pub const ARROW_GLUE_ERROR_NULL_POINTER: c_int = -1;

/// An argument was rejected (negative length, NUL in a name, ...)
pub const ARROW_GLUE_ERROR_INVALID_ARGUMENT: c_int = -2;

/// A string argument was not valid UTF-8
pub const ARROW_GLUE_ERROR_INVALID_UTF8: c_int = -3;

/// Unknown or already released handle
pub const ARROW_GLUE_ERROR_INVALID_HANDLE: c_int = -4;

/// Handle refers to a different kind of value
pub const ARROW_GLUE_ERROR_KIND_MISMATCH: c_int = -5;

/// Index past the end of an array, schema or table
pub const ARROW_GLUE_ERROR_INDEX_OUT_OF_BOUNDS: c_int = -6;

/// Typed accessor used on an array of another type
pub const ARROW_GLUE_ERROR_TYPE_MISMATCH: c_int = -7;

/// Error reported by Arrow
pub const ARROW_GLUE_ERROR_ARROW: c_int = -8;

/// A Rust panic was caught at the boundary
pub const ARROW_GLUE_ERROR_PANIC: c_int = -9;

// ============================================================================
// Handle kind constants, as returned by arrow_glue_handle_get_kind
// ============================================================================

pub const ARROW_GLUE_KIND_DATA_TYPE: c_int = 0;
pub const ARROW_GLUE_KIND_FIELD: c_int = 1;
pub const ARROW_GLUE_KIND_SCHEMA: c_int = 2;
pub const ARROW_GLUE_KIND_ARRAY: c_int = 3;
pub const ARROW_GLUE_KIND_COLUMN: c_int = 4;
pub const ARROW_GLUE_KIND_TABLE: c_int = 5;

fn kind_code(kind: HandleKind) -> c_int {
    match kind {
        HandleKind::DataType => ARROW_GLUE_KIND_DATA_TYPE,
        HandleKind::Field => ARROW_GLUE_KIND_FIELD,
        HandleKind::Schema => ARROW_GLUE_KIND_SCHEMA,
        HandleKind::Array => ARROW_GLUE_KIND_ARRAY,
        HandleKind::Column => ARROW_GLUE_KIND_COLUMN,
        HandleKind::Table => ARROW_GLUE_KIND_TABLE,
    }
}

// ============================================================================
// Error handling
// ============================================================================

// Thread-local error message storage
thread_local! {
    static LAST_ERROR: RefCell<Option<CString>> = const { RefCell::new(None) };
}

fn set_last_error_message(msg: String) {
    LAST_ERROR.with(|e| {
        *e.borrow_mut() = CString::new(msg).ok();
    });
}

fn set_last_error(err: &GlueError) {
    set_last_error_message(err.to_string());
}

fn error_code(err: &GlueError) -> c_int {
    match err {
        GlueError::NullPointer(_) => ARROW_GLUE_ERROR_NULL_POINTER,
        GlueError::InvalidArgument(_) => ARROW_GLUE_ERROR_INVALID_ARGUMENT,
        GlueError::InvalidUtf8(_) => ARROW_GLUE_ERROR_INVALID_UTF8,
        GlueError::InvalidHandle(_) => ARROW_GLUE_ERROR_INVALID_HANDLE,
        GlueError::KindMismatch { .. } => ARROW_GLUE_ERROR_KIND_MISMATCH,
        GlueError::IndexOutOfBounds { .. } => ARROW_GLUE_ERROR_INDEX_OUT_OF_BOUNDS,
        GlueError::TypeMismatch(_) => ARROW_GLUE_ERROR_TYPE_MISMATCH,
        GlueError::ArrowError(_) => ARROW_GLUE_ERROR_ARROW,
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        format!("panic: {}", s)
    } else if let Some(s) = payload.downcast_ref::<String>() {
        format!("panic: {}", s)
    } else {
        "panic: unknown payload".to_string()
    }
}

/// Run `f`, recording any error or panic as the thread's last error
///
/// Returns the C error code on failure.
pub(crate) fn guard<T, F>(f: F) -> std::result::Result<T, c_int>
where
    F: FnOnce() -> Result<T>,
{
    match panic::catch_unwind(AssertUnwindSafe(f)) {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(err)) => {
            log::debug!("arrow-glue call failed: {}", err);
            set_last_error(&err);
            Err(error_code(&err))
        }
        Err(payload) => {
            let msg = panic_message(payload.as_ref());
            log::error!("{}", msg);
            set_last_error_message(msg);
            Err(ARROW_GLUE_ERROR_PANIC)
        }
    }
}

/// Status-returning entry point
pub(crate) fn guard_status<F: FnOnce() -> Result<()>>(f: F) -> c_int {
    match guard(f) {
        Ok(()) => ARROW_GLUE_SUCCESS,
        Err(code) => code,
    }
}

/// Handle-returning entry point; 0 on error
pub(crate) fn guard_handle<F: FnOnce() -> Result<HandleId>>(f: F) -> i64 {
    guard(f).unwrap_or(0)
}

/// Count-returning entry point; negative error code on error
pub(crate) fn guard_count<F: FnOnce() -> Result<usize>>(f: F) -> i64 {
    match guard(f) {
        Ok(n) => i64::try_from(n).unwrap_or(i64::MAX),
        Err(code) => i64::from(code),
    }
}

/// Boolean-returning entry point: 1, 0, or a negative error code
pub(crate) fn guard_flag<F: FnOnce() -> Result<bool>>(f: F) -> c_int {
    match guard(f) {
        Ok(flag) => c_int::from(flag),
        Err(code) => code,
    }
}

/// Pointer-returning entry point; NULL on error
pub(crate) fn guard_ptr<T, F: FnOnce() -> Result<*const T>>(f: F) -> *const T {
    guard(f).unwrap_or(std::ptr::null())
}

// ============================================================================
// Argument conversion
// ============================================================================

/// Borrow a C string argument
///
/// # Safety
/// `ptr` must be NULL or a valid NUL-terminated string outliving `'a`.
pub(crate) unsafe fn str_arg<'a>(ptr: *const c_char, what: &str) -> Result<&'a str> {
    if ptr.is_null() {
        return Err(GlueError::NullPointer(what.to_string()));
    }
    Ok(CStr::from_ptr(ptr).to_str()?)
}

/// Borrow a C array argument; NULL is accepted when `len` is 0
///
/// # Safety
/// `ptr` must be NULL or point to `len` initialized values outliving `'a`.
pub(crate) unsafe fn slice_arg<'a, T>(ptr: *const T, len: i64, what: &str) -> Result<&'a [T]> {
    let len = length_arg(len, what)?;
    if len == 0 {
        return Ok(&[]);
    }
    if ptr.is_null() {
        return Err(GlueError::NullPointer(what.to_string()));
    }
    Ok(std::slice::from_raw_parts(ptr, len))
}

pub(crate) fn length_arg(len: i64, what: &str) -> Result<usize> {
    usize::try_from(len)
        .map_err(|_| GlueError::InvalidArgument(format!("negative {}: {}", what, len)))
}

pub(crate) fn index_arg(i: i64) -> Result<usize> {
    length_arg(i, "index")
}

/// Store `value` through an out-pointer
///
/// # Safety
/// `out` must be NULL or valid for writes.
pub(crate) unsafe fn write_out<T>(out: *mut T, value: T, what: &str) -> Result<()> {
    if out.is_null() {
        return Err(GlueError::NullPointer(what.to_string()));
    }
    out.write(value);
    Ok(())
}

/// Hand an owned string to the caller
pub(crate) fn owned_string(s: String) -> Result<*mut c_char> {
    CString::new(s)
        .map(CString::into_raw)
        .map_err(|_| GlueError::InvalidArgument("string contains a NUL byte".to_string()))
}

/// Owned-string entry point; NULL on error
pub(crate) fn guard_string<F: FnOnce() -> Result<String>>(f: F) -> *mut c_char {
    guard(|| f().and_then(owned_string)).unwrap_or(std::ptr::null_mut())
}

// ============================================================================
// Lifecycle
// ============================================================================

/// Initialize the library
///
/// Sets up logging from the `ARROW_GLUE_*` environment variables and flags
/// the registry as initialized. Safe to call more than once.
#[no_mangle]
pub extern "C" fn arrow_glue_init() -> c_int {
    guard_status(|| {
        arrow_glue::init();
        Ok(())
    })
}

/// Release every handle that is still registered
///
/// Returns the number of handles released, or a negative error code. All
/// handle ids become invalid.
#[no_mangle]
pub extern "C" fn arrow_glue_shutdown() -> i64 {
    guard_count(|| Ok(arrow_glue::shutdown()))
}

/// Get the last error message as a C string
///
/// Returns a pointer to the error message string, or NULL if no error.
/// The returned string is valid until the next error occurs on this thread.
///
/// # Safety
/// The returned pointer is valid until the next call to any arrow-glue
/// function that may set an error on this thread.
#[no_mangle]
pub extern "C" fn arrow_glue_get_last_error() -> *const c_char {
    LAST_ERROR.with(|e| {
        if let Some(ref err) = *e.borrow() {
            err.as_ptr()
        } else {
            std::ptr::null()
        }
    })
}

/// Release a handle of any kind
///
/// The underlying Arrow value is freed once nothing else refers to it.
///
/// # Returns
/// * `ARROW_GLUE_SUCCESS` (0) on success
/// * `ARROW_GLUE_ERROR_INVALID_HANDLE` if the handle is unknown or was
///   already released
#[no_mangle]
pub extern "C" fn arrow_glue_handle_release(handle: i64) -> c_int {
    guard_status(|| registry::release(handle))
}

/// Check if a handle is currently registered
#[no_mangle]
pub extern "C" fn arrow_glue_handle_is_valid(handle: i64) -> bool {
    registry::is_valid(handle)
}

/// Kind of a handle: one of the `ARROW_GLUE_KIND_*` constants, or a
/// negative error code
#[no_mangle]
pub extern "C" fn arrow_glue_handle_get_kind(handle: i64) -> c_int {
    match guard(|| registry::kind_of(handle)) {
        Ok(kind) => kind_code(kind),
        Err(code) => code,
    }
}

/// Number of live references to the value behind `handle`
///
/// Counts every holder: other handles, Arrow structures and the handle
/// itself.
#[no_mangle]
pub extern "C" fn arrow_glue_handle_get_ref_count(handle: i64) -> i64 {
    guard_count(|| registry::ref_count(handle))
}

/// Number of handles currently registered
#[no_mangle]
pub extern "C" fn arrow_glue_handle_count() -> i64 {
    guard_count(|| Ok(registry::live_count()))
}

/// Free a string returned by an arrow-glue function
///
/// # Safety
/// `s` must be NULL or a string returned as `char*` by this library, not
/// yet freed.
#[no_mangle]
pub unsafe extern "C" fn arrow_glue_string_free(s: *mut c_char) {
    if !s.is_null() {
        drop(CString::from_raw(s));
    }
}
