//! Column and table functions

use std::os::raw::c_char;

use arrow_glue::registry;
use arrow_glue::{Array, Column, ColumnHandle, Field, GlueError, Schema, Table, TableHandle};

use crate::{guard_count, guard_handle, guard_ptr, index_arg, slice_arg, str_arg};

// ============================================================================
// Column
// ============================================================================

/// Create a column from a field and its data
///
/// # Returns
/// Column handle, or 0 if the data's type does not match the field's
#[no_mangle]
pub extern "C" fn arrow_glue_column_new(field: i64, data: i64) -> i64 {
    guard_handle(|| {
        let field = registry::get::<Field>(field)?;
        let data = registry::get::<dyn Array>(data)?;
        Ok(registry::register(ColumnHandle::create(&field, &data)?))
    })
}

/// Column name, borrowed until `column` is released
#[no_mangle]
pub extern "C" fn arrow_glue_column_get_name(column: i64) -> *const c_char {
    guard_ptr(|| {
        registry::with_handle::<Column, _, _>(column, |h| h.c_name().map(|name| name.as_ptr()))?
    })
}

/// New handle to the column's field
#[no_mangle]
pub extern "C" fn arrow_glue_column_get_field(column: i64) -> i64 {
    guard_handle(|| {
        let field = registry::with_handle::<Column, _, _>(column, |h| h.field())?;
        Ok(registry::register(field))
    })
}

/// New handle to the column's data type
#[no_mangle]
pub extern "C" fn arrow_glue_column_get_data_type(column: i64) -> i64 {
    guard_handle(|| {
        let data_type = registry::with_handle::<Column, _, _>(column, |h| h.data_type())?;
        Ok(registry::register(data_type))
    })
}

#[no_mangle]
pub extern "C" fn arrow_glue_column_get_length(column: i64) -> i64 {
    guard_count(|| registry::with_handle::<Column, _, _>(column, |h| h.len()))
}

#[no_mangle]
pub extern "C" fn arrow_glue_column_get_n_nulls(column: i64) -> i64 {
    guard_count(|| registry::with_handle::<Column, _, _>(column, |h| h.n_nulls()))
}

/// New handle to the column's array
#[no_mangle]
pub extern "C" fn arrow_glue_column_get_data(column: i64) -> i64 {
    guard_handle(|| {
        let data = registry::with_handle::<Column, _, _>(column, |h| h.data())?;
        Ok(registry::register(data))
    })
}

// ============================================================================
// Table
// ============================================================================

/// Create a named table
///
/// # Arguments
/// * `name` - Table name (UTF-8, NUL-terminated)
/// * `schema` - Schema handle
/// * `columns` - Array of `n_columns` column handles, in schema order (may
///   be NULL when empty)
/// * `n_columns` - Number of columns
///
/// # Returns
/// Table handle, or 0 on error, including a column whose field (name, type
/// or nullability) differs from the schema field at its position. The
/// caller still owns the schema and column handles.
///
/// # Safety
/// `name` must be NULL or a valid C string; `columns` must point to
/// `n_columns` handle ids.
#[no_mangle]
pub unsafe extern "C" fn arrow_glue_table_new(
    name: *const c_char,
    schema: i64,
    columns: *const i64,
    n_columns: i64,
) -> i64 {
    guard_handle(|| {
        let name = str_arg(name, "name")?;
        let schema = registry::get::<Schema>(schema)?;
        let ids = slice_arg(columns, n_columns, "columns")?;
        let columns = ids
            .iter()
            .map(|&id| registry::get::<Column>(id))
            .collect::<Result<Vec<_>, GlueError>>()?;
        let refs: Vec<&ColumnHandle> = columns.iter().collect();
        Ok(registry::register(TableHandle::create(name, &schema, &refs)?))
    })
}

/// Table name, borrowed until `table` is released
#[no_mangle]
pub extern "C" fn arrow_glue_table_get_name(table: i64) -> *const c_char {
    guard_ptr(|| {
        registry::with_handle::<Table, _, _>(table, |h| h.c_name().map(|name| name.as_ptr()))?
    })
}

/// New handle to the table's schema
#[no_mangle]
pub extern "C" fn arrow_glue_table_get_schema(table: i64) -> i64 {
    guard_handle(|| {
        let schema = registry::with_handle::<Table, _, _>(table, |h| h.schema())?;
        Ok(registry::register(schema))
    })
}

/// New handle to the `i`-th column
///
/// # Returns
/// Column handle, or 0 if `i` is out of bounds
#[no_mangle]
pub extern "C" fn arrow_glue_table_get_column(table: i64, i: i64) -> i64 {
    guard_handle(|| {
        let i = index_arg(i)?;
        let column = registry::with_handle::<Table, _, _>(table, |h| h.column(i))??;
        Ok(registry::register(column))
    })
}

#[no_mangle]
pub extern "C" fn arrow_glue_table_get_n_columns(table: i64) -> i64 {
    guard_count(|| registry::with_handle::<Table, _, _>(table, |h| h.n_columns()))
}

#[no_mangle]
pub extern "C" fn arrow_glue_table_get_n_rows(table: i64) -> i64 {
    guard_count(|| registry::with_handle::<Table, _, _>(table, |h| h.n_rows()))
}
