//! Field and schema functions

use std::os::raw::{c_char, c_int};

use arrow_glue::registry;
use arrow_glue::{DataType, Field, FieldHandle, GlueError, Schema, SchemaHandle};

use crate::{
    guard_count, guard_flag, guard_handle, guard_ptr, guard_string, index_arg, slice_arg,
    str_arg,
};

// ============================================================================
// Field
// ============================================================================

/// Create a field
///
/// # Arguments
/// * `name` - Field name (UTF-8, NUL-terminated)
/// * `data_type` - Data type handle; the field keeps its own reference
/// * `nullable` - Whether the field accepts nulls
///
/// # Returns
/// Field handle, or 0 on error
///
/// # Safety
/// `name` must be NULL or a valid C string.
#[no_mangle]
pub unsafe extern "C" fn arrow_glue_field_new(
    name: *const c_char,
    data_type: i64,
    nullable: bool,
) -> i64 {
    guard_handle(|| {
        let name = str_arg(name, "name")?;
        let data_type = registry::get::<DataType>(data_type)?;
        Ok(registry::register(FieldHandle::create(name, &data_type, nullable)))
    })
}

/// Field name
///
/// The string is borrowed: it stays valid until `field` is released.
#[no_mangle]
pub extern "C" fn arrow_glue_field_get_name(field: i64) -> *const c_char {
    guard_ptr(|| {
        registry::with_handle::<Field, _, _>(field, |h| h.c_name().map(|name| name.as_ptr()))?
    })
}

/// New handle to the field's data type
#[no_mangle]
pub extern "C" fn arrow_glue_field_get_data_type(field: i64) -> i64 {
    guard_handle(|| {
        let data_type = registry::with_handle::<Field, _, _>(field, |h| h.data_type())?;
        Ok(registry::register(data_type))
    })
}

/// 1 if nullable, 0 if not, negative on error
#[no_mangle]
pub extern "C" fn arrow_glue_field_is_nullable(field: i64) -> c_int {
    guard_flag(|| registry::with_handle::<Field, _, _>(field, |h| h.is_nullable()))
}

/// Render a field, e.g. "a: Int32 not null"
///
/// The caller frees the result with `arrow_glue_string_free()`.
#[no_mangle]
pub extern "C" fn arrow_glue_field_to_string(field: i64) -> *mut c_char {
    guard_string(|| registry::with_handle::<Field, _, _>(field, |h| h.to_string()))
}

/// Structural equality: 1 if equal, 0 if not, negative on error
#[no_mangle]
pub extern "C" fn arrow_glue_field_equal(field: i64, other: i64) -> c_int {
    guard_flag(|| {
        let other = registry::get::<Field>(other)?;
        registry::with_handle::<Field, _, _>(field, |h| h.equal(&other))
    })
}

// ============================================================================
// Schema
// ============================================================================

/// Create a schema from field handles
///
/// # Arguments
/// * `fields` - Array of `n_fields` field handles (may be NULL when empty)
/// * `n_fields` - Number of fields
///
/// # Returns
/// Schema handle, or 0 on error. The caller still owns the field handles.
///
/// # Safety
/// `fields` must point to `n_fields` handle ids.
#[no_mangle]
pub unsafe extern "C" fn arrow_glue_schema_new(fields: *const i64, n_fields: i64) -> i64 {
    guard_handle(|| {
        let ids = slice_arg(fields, n_fields, "fields")?;
        let fields = ids
            .iter()
            .map(|&id| registry::get::<Field>(id))
            .collect::<Result<Vec<_>, GlueError>>()?;
        let refs: Vec<&FieldHandle> = fields.iter().collect();
        Ok(registry::register(SchemaHandle::create(&refs)))
    })
}

/// New handle to the `i`-th field
///
/// # Returns
/// Field handle, or 0 if `i` is out of bounds
#[no_mangle]
pub extern "C" fn arrow_glue_schema_get_field(schema: i64, i: i64) -> i64 {
    guard_handle(|| {
        let i = index_arg(i)?;
        let field = registry::with_handle::<Schema, _, _>(schema, |h| h.field(i))??;
        Ok(registry::register(field))
    })
}

/// New handle to the field called `name`
///
/// # Returns
/// Field handle, or 0 if there is no such field
///
/// # Safety
/// `name` must be NULL or a valid C string.
#[no_mangle]
pub unsafe extern "C" fn arrow_glue_schema_get_field_by_name(
    schema: i64,
    name: *const c_char,
) -> i64 {
    guard_handle(|| {
        let name = str_arg(name, "name")?;
        let field = registry::with_handle::<Schema, _, _>(schema, |h| h.field_by_name(name))?
            .ok_or_else(|| GlueError::InvalidArgument(format!("no field named {:?}", name)))?;
        Ok(registry::register(field))
    })
}

#[no_mangle]
pub extern "C" fn arrow_glue_schema_n_fields(schema: i64) -> i64 {
    guard_count(|| registry::with_handle::<Schema, _, _>(schema, |h| h.n_fields()))
}

/// Render a schema, one field per line
///
/// The caller frees the result with `arrow_glue_string_free()`.
#[no_mangle]
pub extern "C" fn arrow_glue_schema_to_string(schema: i64) -> *mut c_char {
    guard_string(|| registry::with_handle::<Schema, _, _>(schema, |h| h.to_string()))
}

/// Structural equality: 1 if equal, 0 if not, negative on error
#[no_mangle]
pub extern "C" fn arrow_glue_schema_equal(schema: i64, other: i64) -> c_int {
    guard_flag(|| {
        let other = registry::get::<Schema>(other)?;
        registry::with_handle::<Schema, _, _>(schema, |h| h.equal(&other))
    })
}
