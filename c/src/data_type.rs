//! Data type functions

use std::os::raw::{c_char, c_int};

use arrow_glue::registry;
use arrow_glue::{DataType, DataTypeHandle, GlueError, TypeId};

use crate::{guard, guard_flag, guard_handle, guard_string};

/// Type id returned for Arrow types outside the leaf set
pub const ARROW_GLUE_TYPE_UNSUPPORTED: c_int = 255;

fn new_data_type(handle: DataTypeHandle) -> i64 {
    guard_handle(|| Ok(registry::register(handle)))
}

// ============================================================================
// Leaf constructors
// ============================================================================

#[no_mangle]
pub extern "C" fn arrow_glue_null_data_type_new() -> i64 {
    new_data_type(DataTypeHandle::null())
}

#[no_mangle]
pub extern "C" fn arrow_glue_boolean_data_type_new() -> i64 {
    new_data_type(DataTypeHandle::boolean())
}

#[no_mangle]
pub extern "C" fn arrow_glue_int8_data_type_new() -> i64 {
    new_data_type(DataTypeHandle::int8())
}

#[no_mangle]
pub extern "C" fn arrow_glue_uint8_data_type_new() -> i64 {
    new_data_type(DataTypeHandle::uint8())
}

#[no_mangle]
pub extern "C" fn arrow_glue_int16_data_type_new() -> i64 {
    new_data_type(DataTypeHandle::int16())
}

#[no_mangle]
pub extern "C" fn arrow_glue_uint16_data_type_new() -> i64 {
    new_data_type(DataTypeHandle::uint16())
}

#[no_mangle]
pub extern "C" fn arrow_glue_int32_data_type_new() -> i64 {
    new_data_type(DataTypeHandle::int32())
}

#[no_mangle]
pub extern "C" fn arrow_glue_uint32_data_type_new() -> i64 {
    new_data_type(DataTypeHandle::uint32())
}

#[no_mangle]
pub extern "C" fn arrow_glue_int64_data_type_new() -> i64 {
    new_data_type(DataTypeHandle::int64())
}

#[no_mangle]
pub extern "C" fn arrow_glue_uint64_data_type_new() -> i64 {
    new_data_type(DataTypeHandle::uint64())
}

#[no_mangle]
pub extern "C" fn arrow_glue_float_data_type_new() -> i64 {
    new_data_type(DataTypeHandle::float())
}

#[no_mangle]
pub extern "C" fn arrow_glue_double_data_type_new() -> i64 {
    new_data_type(DataTypeHandle::double())
}

#[no_mangle]
pub extern "C" fn arrow_glue_binary_data_type_new() -> i64 {
    new_data_type(DataTypeHandle::binary())
}

#[no_mangle]
pub extern "C" fn arrow_glue_string_data_type_new() -> i64 {
    new_data_type(DataTypeHandle::string())
}

/// Create a leaf data type from its type id
///
/// # Returns
/// Handle to the data type, or 0 if `type_id` is not a leaf type id
#[no_mangle]
pub extern "C" fn arrow_glue_data_type_new(type_id: c_int) -> i64 {
    guard_handle(|| {
        let handle = TypeId::from_i32(type_id)
            .and_then(DataTypeHandle::from_type_id)
            .ok_or_else(|| GlueError::InvalidArgument(format!("unknown type id: {}", type_id)))?;
        Ok(registry::register(handle))
    })
}

// ============================================================================
// Accessors
// ============================================================================

/// Type id of a data type
///
/// # Returns
/// A type id (`ARROW_GLUE_TYPE_UNSUPPORTED` for non-leaf types) or a
/// negative error code
#[no_mangle]
pub extern "C" fn arrow_glue_data_type_get_id(data_type: i64) -> c_int {
    match guard(|| registry::with_handle::<DataType, _, _>(data_type, |h| h.type_id())) {
        Ok(id) => id as c_int,
        Err(code) => code,
    }
}

/// Render a data type, e.g. "Int32"
///
/// The caller frees the result with `arrow_glue_string_free()`.
#[no_mangle]
pub extern "C" fn arrow_glue_data_type_to_string(data_type: i64) -> *mut c_char {
    guard_string(|| registry::with_handle::<DataType, _, _>(data_type, |h| h.to_string()))
}

/// Structural equality: 1 if equal, 0 if not, negative on error
#[no_mangle]
pub extern "C" fn arrow_glue_data_type_equal(data_type: i64, other: i64) -> c_int {
    guard_flag(|| {
        let other = registry::get::<DataType>(other)?;
        registry::with_handle::<DataType, _, _>(data_type, |h| h.equal(&other))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util::*;
    use crate::*;

    fn leaf_data_types() -> Vec<(i64, &'static str)> {
        vec![
            (arrow_glue_null_data_type_new(), "Null"),
            (arrow_glue_boolean_data_type_new(), "Boolean"),
            (arrow_glue_int8_data_type_new(), "Int8"),
            (arrow_glue_uint8_data_type_new(), "UInt8"),
            (arrow_glue_int16_data_type_new(), "Int16"),
            (arrow_glue_uint16_data_type_new(), "UInt16"),
            (arrow_glue_int32_data_type_new(), "Int32"),
            (arrow_glue_uint32_data_type_new(), "UInt32"),
            (arrow_glue_int64_data_type_new(), "Int64"),
            (arrow_glue_uint64_data_type_new(), "UInt64"),
            (arrow_glue_float_data_type_new(), "Float32"),
            (arrow_glue_double_data_type_new(), "Float64"),
            (arrow_glue_binary_data_type_new(), "Binary"),
            (arrow_glue_string_data_type_new(), "Utf8"),
        ]
    }

    #[test]
    fn test_leaf_constructors() {
        for (handle, expected) in leaf_data_types() {
            assert!(handle > 0);
            assert_eq!(take_string(arrow_glue_data_type_to_string(handle)), expected);

            let id = arrow_glue_data_type_get_id(handle);
            assert!((0..=13).contains(&id));

            let same = arrow_glue_data_type_new(id);
            assert_eq!(arrow_glue_data_type_equal(handle, same), 1);

            assert_eq!(arrow_glue_handle_release(same), ARROW_GLUE_SUCCESS);
            assert_eq!(arrow_glue_handle_release(handle), ARROW_GLUE_SUCCESS);
        }
    }

    #[test]
    fn test_data_type_new_unknown_id() {
        assert_eq!(arrow_glue_data_type_new(ARROW_GLUE_TYPE_UNSUPPORTED), 0);
        assert!(last_error().contains("unknown type id"));
        assert_eq!(arrow_glue_data_type_new(-1), 0);
    }

    #[test]
    fn test_data_type_equal() {
        let a = arrow_glue_int8_data_type_new();
        let b = arrow_glue_uint8_data_type_new();

        assert_eq!(arrow_glue_data_type_equal(a, b), 0);
        assert_eq!(arrow_glue_data_type_equal(a, a), 1);

        arrow_glue_handle_release(b);
        assert_eq!(
            arrow_glue_data_type_equal(a, b),
            ARROW_GLUE_ERROR_INVALID_HANDLE
        );
        arrow_glue_handle_release(a);
    }

    #[test]
    fn test_data_type_kind_mismatch() {
        let ids = [1i64];
        let schema = unsafe { arrow_glue_schema_new(ids.as_ptr(), 0) };
        assert_eq!(
            arrow_glue_data_type_get_id(schema),
            ARROW_GLUE_ERROR_KIND_MISMATCH
        );
        assert!(arrow_glue_data_type_to_string(schema).is_null());
        arrow_glue_handle_release(schema);
    }
}
