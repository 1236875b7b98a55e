//! Array functions
//!
//! Validity vectors are `uint8_t` arrays with one entry per value: nonzero
//! means valid. A NULL validity pointer means every value is valid.

use std::os::raw::{c_char, c_int};

use arrow::ffi::{FFI_ArrowArray, FFI_ArrowSchema};
use arrow_array::types::{
    ArrowPrimitiveType, Float32Type, Float64Type, Int16Type, Int32Type, Int64Type, Int8Type,
    UInt16Type, UInt32Type, UInt64Type, UInt8Type,
};
use arrow_glue::registry;
use arrow_glue::{Array, ArrayHandle, GlueError, Result};

use crate::{
    guard_count, guard_flag, guard_handle, guard_ptr, guard_status, guard_string, index_arg,
    length_arg, slice_arg, str_arg, write_out,
};

unsafe fn validity_arg(validity: *const u8, length: i64) -> Result<Option<Vec<bool>>> {
    if validity.is_null() {
        return Ok(None);
    }
    let flags = slice_arg(validity, length, "validity")?;
    Ok(Some(flags.iter().map(|&flag| flag != 0).collect()))
}

fn with_array<R, F>(array: i64, f: F) -> Result<R>
where
    F: FnOnce(&ArrayHandle) -> R,
{
    registry::with_handle::<dyn Array, _, _>(array, f)
}

unsafe fn primitive_new<P: ArrowPrimitiveType>(
    values: *const P::Native,
    validity: *const u8,
    length: i64,
) -> i64 {
    guard_handle(|| {
        let values = slice_arg(values, length, "values")?;
        let validity = validity_arg(validity, length)?;
        let handle = ArrayHandle::primitive::<P>(values, validity.as_deref())?;
        Ok(registry::register(handle))
    })
}

unsafe fn primitive_get_value<P: ArrowPrimitiveType>(
    array: i64,
    i: i64,
    out: *mut P::Native,
) -> c_int {
    guard_status(|| {
        let i = index_arg(i)?;
        let value = with_array(array, |h| h.value::<P>(i))??;
        write_out(out, value, "out")
    })
}

unsafe fn primitive_get_values<P: ArrowPrimitiveType>(
    array: i64,
    out_length: *mut i64,
) -> *const P::Native {
    guard_ptr(|| {
        let (ptr, len) = with_array(array, |h| {
            h.values::<P>().map(|values| (values.as_ptr(), values.len()))
        })??;
        write_out(out_length, len as i64, "out_length")?;
        Ok(ptr)
    })
}

// ============================================================================
// Primitive arrays
//
// For each type: `_new` copies `length` values, `_get_value` reads one
// bounds-checked value, `_get_values` borrows the value buffer (valid until
// the array handle is released; null slots hold unspecified values).
// ============================================================================

/// # Safety
/// `values` must point to `length` values; `validity` must be NULL or point
/// to `length` flags.
#[no_mangle]
pub unsafe extern "C" fn arrow_glue_int8_array_new(
    values: *const i8,
    validity: *const u8,
    length: i64,
) -> i64 {
    primitive_new::<Int8Type>(values, validity, length)
}

/// # Safety
/// `out` must be valid for writes.
#[no_mangle]
pub unsafe extern "C" fn arrow_glue_int8_array_get_value(array: i64, i: i64, out: *mut i8) -> c_int {
    primitive_get_value::<Int8Type>(array, i, out)
}

/// # Safety
/// `out_length` must be valid for writes.
#[no_mangle]
pub unsafe extern "C" fn arrow_glue_int8_array_get_values(array: i64, out_length: *mut i64) -> *const i8 {
    primitive_get_values::<Int8Type>(array, out_length)
}

/// # Safety
/// `values` must point to `length` values; `validity` must be NULL or point
/// to `length` flags.
#[no_mangle]
pub unsafe extern "C" fn arrow_glue_uint8_array_new(
    values: *const u8,
    validity: *const u8,
    length: i64,
) -> i64 {
    primitive_new::<UInt8Type>(values, validity, length)
}

/// # Safety
/// `out` must be valid for writes.
#[no_mangle]
pub unsafe extern "C" fn arrow_glue_uint8_array_get_value(array: i64, i: i64, out: *mut u8) -> c_int {
    primitive_get_value::<UInt8Type>(array, i, out)
}

/// # Safety
/// `out_length` must be valid for writes.
#[no_mangle]
pub unsafe extern "C" fn arrow_glue_uint8_array_get_values(array: i64, out_length: *mut i64) -> *const u8 {
    primitive_get_values::<UInt8Type>(array, out_length)
}

/// # Safety
/// `values` must point to `length` values; `validity` must be NULL or point
/// to `length` flags.
#[no_mangle]
pub unsafe extern "C" fn arrow_glue_int16_array_new(
    values: *const i16,
    validity: *const u8,
    length: i64,
) -> i64 {
    primitive_new::<Int16Type>(values, validity, length)
}

/// # Safety
/// `out` must be valid for writes.
#[no_mangle]
pub unsafe extern "C" fn arrow_glue_int16_array_get_value(array: i64, i: i64, out: *mut i16) -> c_int {
    primitive_get_value::<Int16Type>(array, i, out)
}

/// # Safety
/// `out_length` must be valid for writes.
#[no_mangle]
pub unsafe extern "C" fn arrow_glue_int16_array_get_values(array: i64, out_length: *mut i64) -> *const i16 {
    primitive_get_values::<Int16Type>(array, out_length)
}

/// # Safety
/// `values` must point to `length` values; `validity` must be NULL or point
/// to `length` flags.
#[no_mangle]
pub unsafe extern "C" fn arrow_glue_uint16_array_new(
    values: *const u16,
    validity: *const u8,
    length: i64,
) -> i64 {
    primitive_new::<UInt16Type>(values, validity, length)
}

/// # Safety
/// `out` must be valid for writes.
#[no_mangle]
pub unsafe extern "C" fn arrow_glue_uint16_array_get_value(array: i64, i: i64, out: *mut u16) -> c_int {
    primitive_get_value::<UInt16Type>(array, i, out)
}

/// # Safety
/// `out_length` must be valid for writes.
#[no_mangle]
pub unsafe extern "C" fn arrow_glue_uint16_array_get_values(array: i64, out_length: *mut i64) -> *const u16 {
    primitive_get_values::<UInt16Type>(array, out_length)
}

/// # Safety
/// `values` must point to `length` values; `validity` must be NULL or point
/// to `length` flags.
#[no_mangle]
pub unsafe extern "C" fn arrow_glue_int32_array_new(
    values: *const i32,
    validity: *const u8,
    length: i64,
) -> i64 {
    primitive_new::<Int32Type>(values, validity, length)
}

/// # Safety
/// `out` must be valid for writes.
#[no_mangle]
pub unsafe extern "C" fn arrow_glue_int32_array_get_value(array: i64, i: i64, out: *mut i32) -> c_int {
    primitive_get_value::<Int32Type>(array, i, out)
}

/// # Safety
/// `out_length` must be valid for writes.
#[no_mangle]
pub unsafe extern "C" fn arrow_glue_int32_array_get_values(array: i64, out_length: *mut i64) -> *const i32 {
    primitive_get_values::<Int32Type>(array, out_length)
}

/// # Safety
/// `values` must point to `length` values; `validity` must be NULL or point
/// to `length` flags.
#[no_mangle]
pub unsafe extern "C" fn arrow_glue_uint32_array_new(
    values: *const u32,
    validity: *const u8,
    length: i64,
) -> i64 {
    primitive_new::<UInt32Type>(values, validity, length)
}

/// # Safety
/// `out` must be valid for writes.
#[no_mangle]
pub unsafe extern "C" fn arrow_glue_uint32_array_get_value(array: i64, i: i64, out: *mut u32) -> c_int {
    primitive_get_value::<UInt32Type>(array, i, out)
}

/// # Safety
/// `out_length` must be valid for writes.
#[no_mangle]
pub unsafe extern "C" fn arrow_glue_uint32_array_get_values(array: i64, out_length: *mut i64) -> *const u32 {
    primitive_get_values::<UInt32Type>(array, out_length)
}

/// # Safety
/// `values` must point to `length` values; `validity` must be NULL or point
/// to `length` flags.
#[no_mangle]
pub unsafe extern "C" fn arrow_glue_int64_array_new(
    values: *const i64,
    validity: *const u8,
    length: i64,
) -> i64 {
    primitive_new::<Int64Type>(values, validity, length)
}

/// # Safety
/// `out` must be valid for writes.
#[no_mangle]
pub unsafe extern "C" fn arrow_glue_int64_array_get_value(array: i64, i: i64, out: *mut i64) -> c_int {
    primitive_get_value::<Int64Type>(array, i, out)
}

/// # Safety
/// `out_length` must be valid for writes.
#[no_mangle]
pub unsafe extern "C" fn arrow_glue_int64_array_get_values(array: i64, out_length: *mut i64) -> *const i64 {
    primitive_get_values::<Int64Type>(array, out_length)
}

/// # Safety
/// `values` must point to `length` values; `validity` must be NULL or point
/// to `length` flags.
#[no_mangle]
pub unsafe extern "C" fn arrow_glue_uint64_array_new(
    values: *const u64,
    validity: *const u8,
    length: i64,
) -> i64 {
    primitive_new::<UInt64Type>(values, validity, length)
}

/// # Safety
/// `out` must be valid for writes.
#[no_mangle]
pub unsafe extern "C" fn arrow_glue_uint64_array_get_value(array: i64, i: i64, out: *mut u64) -> c_int {
    primitive_get_value::<UInt64Type>(array, i, out)
}

/// # Safety
/// `out_length` must be valid for writes.
#[no_mangle]
pub unsafe extern "C" fn arrow_glue_uint64_array_get_values(array: i64, out_length: *mut i64) -> *const u64 {
    primitive_get_values::<UInt64Type>(array, out_length)
}

/// # Safety
/// `values` must point to `length` values; `validity` must be NULL or point
/// to `length` flags.
#[no_mangle]
pub unsafe extern "C" fn arrow_glue_float_array_new(
    values: *const f32,
    validity: *const u8,
    length: i64,
) -> i64 {
    primitive_new::<Float32Type>(values, validity, length)
}

/// # Safety
/// `out` must be valid for writes.
#[no_mangle]
pub unsafe extern "C" fn arrow_glue_float_array_get_value(array: i64, i: i64, out: *mut f32) -> c_int {
    primitive_get_value::<Float32Type>(array, i, out)
}

/// # Safety
/// `out_length` must be valid for writes.
#[no_mangle]
pub unsafe extern "C" fn arrow_glue_float_array_get_values(array: i64, out_length: *mut i64) -> *const f32 {
    primitive_get_values::<Float32Type>(array, out_length)
}

/// # Safety
/// `values` must point to `length` values; `validity` must be NULL or point
/// to `length` flags.
#[no_mangle]
pub unsafe extern "C" fn arrow_glue_double_array_new(
    values: *const f64,
    validity: *const u8,
    length: i64,
) -> i64 {
    primitive_new::<Float64Type>(values, validity, length)
}

/// # Safety
/// `out` must be valid for writes.
#[no_mangle]
pub unsafe extern "C" fn arrow_glue_double_array_get_value(array: i64, i: i64, out: *mut f64) -> c_int {
    primitive_get_value::<Float64Type>(array, i, out)
}

/// # Safety
/// `out_length` must be valid for writes.
#[no_mangle]
pub unsafe extern "C" fn arrow_glue_double_array_get_values(array: i64, out_length: *mut i64) -> *const f64 {
    primitive_get_values::<Float64Type>(array, out_length)
}

// ============================================================================
// Boolean, string, binary and null arrays
// ============================================================================

/// Create a boolean array
///
/// # Safety
/// `values` must point to `length` values; `validity` must be NULL or point
/// to `length` flags.
#[no_mangle]
pub unsafe extern "C" fn arrow_glue_boolean_array_new(
    values: *const bool,
    validity: *const u8,
    length: i64,
) -> i64 {
    guard_handle(|| {
        let values = slice_arg(values, length, "values")?;
        let validity = validity_arg(validity, length)?;
        let handle = ArrayHandle::boolean(values, validity.as_deref())?;
        Ok(registry::register(handle))
    })
}

/// # Safety
/// `out` must be valid for writes.
#[no_mangle]
pub unsafe extern "C" fn arrow_glue_boolean_array_get_value(
    array: i64,
    i: i64,
    out: *mut bool,
) -> c_int {
    guard_status(|| {
        let i = index_arg(i)?;
        let value = with_array(array, |h| h.bool_value(i))??;
        write_out(out, value, "out")
    })
}

/// Create a UTF-8 string array
///
/// # Arguments
/// * `values` - `length` C strings; a NULL entry is a null slot
/// * `length` - Number of values
///
/// # Safety
/// `values` must point to `length` pointers, each NULL or a valid C string.
#[no_mangle]
pub unsafe extern "C" fn arrow_glue_string_array_new(
    values: *const *const c_char,
    length: i64,
) -> i64 {
    guard_handle(|| {
        let ptrs = slice_arg(values, length, "values")?;
        let values = ptrs
            .iter()
            .map(|&ptr| {
                if ptr.is_null() {
                    Ok(None)
                } else {
                    str_arg(ptr, "value").map(Some)
                }
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(registry::register(ArrayHandle::string(&values)))
    })
}

/// Copy of the `i`-th string
///
/// The caller frees the result with `arrow_glue_string_free()`. Null slots
/// return an empty string; use `arrow_glue_array_is_null()` to tell them
/// apart from real empty strings.
#[no_mangle]
pub extern "C" fn arrow_glue_string_array_get_string(array: i64, i: i64) -> *mut c_char {
    guard_string(|| {
        let i = index_arg(i)?;
        with_array(array, |h| h.str_value(i).map(str::to_string))?
    })
}

/// Create a binary array
///
/// # Arguments
/// * `values` - `length` byte pointers; a NULL entry is a null slot
/// * `lengths` - Byte length of each value
/// * `length` - Number of values
///
/// # Safety
/// `values` and `lengths` must point to `length` entries; each non-NULL
/// value must point to its number of bytes.
#[no_mangle]
pub unsafe extern "C" fn arrow_glue_binary_array_new(
    values: *const *const u8,
    lengths: *const i64,
    length: i64,
) -> i64 {
    guard_handle(|| {
        let ptrs = slice_arg(values, length, "values")?;
        let lengths = slice_arg(lengths, length, "lengths")?;
        let values = ptrs
            .iter()
            .zip(lengths)
            .map(|(&ptr, &len)| {
                if ptr.is_null() {
                    Ok(None)
                } else {
                    slice_arg(ptr, len, "value").map(Some)
                }
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(registry::register(ArrayHandle::binary(&values)))
    })
}

/// Borrow the `i`-th binary value
///
/// The bytes stay valid until `array` is released. Null slots return a
/// zero-length value.
///
/// # Safety
/// `out_length` must be valid for writes.
#[no_mangle]
pub unsafe extern "C" fn arrow_glue_binary_array_get_value(
    array: i64,
    i: i64,
    out_length: *mut i64,
) -> *const u8 {
    guard_ptr(|| {
        let i = index_arg(i)?;
        let (ptr, len) =
            with_array(array, |h| h.binary_value(i).map(|v| (v.as_ptr(), v.len())))??;
        write_out(out_length, len as i64, "out_length")?;
        Ok(ptr)
    })
}

/// Create an array of `length` nulls
#[no_mangle]
pub extern "C" fn arrow_glue_null_array_new(length: i64) -> i64 {
    guard_handle(|| {
        let length = length_arg(length, "length")?;
        Ok(registry::register(ArrayHandle::null(length)))
    })
}

// ============================================================================
// Shared accessors
// ============================================================================

#[no_mangle]
pub extern "C" fn arrow_glue_array_get_length(array: i64) -> i64 {
    guard_count(|| with_array(array, |h| h.len()))
}

#[no_mangle]
pub extern "C" fn arrow_glue_array_get_n_nulls(array: i64) -> i64 {
    guard_count(|| with_array(array, |h| h.n_nulls()))
}

/// 1 if the `i`-th slot is null, 0 if not, negative on error
#[no_mangle]
pub extern "C" fn arrow_glue_array_is_null(array: i64, i: i64) -> c_int {
    guard_flag(|| {
        let i = index_arg(i)?;
        with_array(array, |h| h.is_null(i))?
    })
}

/// 1 if the `i`-th slot holds a value, 0 if not, negative on error
#[no_mangle]
pub extern "C" fn arrow_glue_array_is_valid(array: i64, i: i64) -> c_int {
    guard_flag(|| {
        let i = index_arg(i)?;
        with_array(array, |h| h.is_valid(i))?
    })
}

/// New handle to the array's data type
#[no_mangle]
pub extern "C" fn arrow_glue_array_get_data_type(array: i64) -> i64 {
    guard_handle(|| {
        let data_type = with_array(array, |h| h.data_type())?;
        Ok(registry::register(data_type))
    })
}

/// Zero-copy view of `length` values starting at `offset`
///
/// # Returns
/// Handle to the slice, or 0 if the range is out of bounds
#[no_mangle]
pub extern "C" fn arrow_glue_array_slice(array: i64, offset: i64, length: i64) -> i64 {
    guard_handle(|| {
        let offset = length_arg(offset, "offset")?;
        let length = length_arg(length, "length")?;
        let slice = with_array(array, |h| h.slice(offset, length))??;
        Ok(registry::register(slice))
    })
}

/// Logical equality: 1 if equal, 0 if not, negative on error
#[no_mangle]
pub extern "C" fn arrow_glue_array_equal(array: i64, other: i64) -> c_int {
    guard_flag(|| {
        let other = registry::get::<dyn Array>(other)?;
        with_array(array, |h| h.equal(&other))
    })
}

/// Render the values, e.g. "[1, null, 3]"
///
/// The caller frees the result with `arrow_glue_string_free()`.
#[no_mangle]
pub extern "C" fn arrow_glue_array_to_string(array: i64) -> *mut c_char {
    guard_string(|| with_array(array, |h| h.format_values())?)
}

// ============================================================================
// Arrow C Data Interface
// ============================================================================

/// Export an array through the Arrow C Data Interface
///
/// The array keeps its handle; the exported structs hold their own
/// reference and must be released by the consumer.
///
/// # Arguments
/// * `array` - Array handle
/// * `out_array` - Uninitialized `struct ArrowArray` to fill
/// * `out_schema` - Uninitialized `struct ArrowSchema` to fill
///
/// # Safety
/// `out_array` and `out_schema` must be valid for writes. Their previous
/// contents are overwritten without being released.
#[no_mangle]
pub unsafe extern "C" fn arrow_glue_array_export(
    array: i64,
    out_array: *mut FFI_ArrowArray,
    out_schema: *mut FFI_ArrowSchema,
) -> c_int {
    guard_status(|| {
        if out_array.is_null() || out_schema.is_null() {
            return Err(GlueError::NullPointer("export target".to_string()));
        }
        let (ffi_array, ffi_schema) = with_array(array, |h| h.export())??;
        std::ptr::write(out_array, ffi_array);
        std::ptr::write(out_schema, ffi_schema);
        Ok(())
    })
}

/// Import an array through the Arrow C Data Interface
///
/// Takes ownership of `array`: on return it is marked released and must not
/// be released again. `schema` stays owned by the caller.
///
/// # Returns
/// Array handle, or 0 on error
///
/// # Safety
/// `array` and `schema` must be valid, initialized C Data Interface structs.
#[no_mangle]
pub unsafe extern "C" fn arrow_glue_array_import(
    array: *mut FFI_ArrowArray,
    schema: *const FFI_ArrowSchema,
) -> i64 {
    guard_handle(|| {
        if array.is_null() || schema.is_null() {
            return Err(GlueError::NullPointer("import source".to_string()));
        }
        let ffi_array = FFI_ArrowArray::from_raw(array);
        let handle = ArrayHandle::import(ffi_array, &*schema)?;
        Ok(registry::register(handle))
    })
}
