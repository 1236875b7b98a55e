//! Shutdown through the C surface
//!
//! Kept in its own test binary: shutdown releases every handle in the
//! process, which would race with tests running in parallel.

use std::ffi::CString;

use arrow_glue_c::*;

#[test]
fn test_shutdown_releases_everything() {
    assert_eq!(arrow_glue_init(), ARROW_GLUE_SUCCESS);
    assert_eq!(arrow_glue_handle_count(), 0);

    let name = CString::new("a").unwrap();
    let data_type = arrow_glue_int32_data_type_new();
    let field = unsafe { arrow_glue_field_new(name.as_ptr(), data_type, true) };
    let schema = unsafe { arrow_glue_schema_new(&field, 1) };
    assert_eq!(arrow_glue_handle_count(), 3);

    // The schema holds the field, the handle holds the schema
    assert_eq!(arrow_glue_handle_get_ref_count(field), 2);
    assert_eq!(arrow_glue_handle_get_kind(schema), ARROW_GLUE_KIND_SCHEMA);

    assert_eq!(arrow_glue_handle_release(data_type), ARROW_GLUE_SUCCESS);
    assert_eq!(arrow_glue_shutdown(), 2);

    for handle in [data_type, field, schema] {
        assert!(!arrow_glue_handle_is_valid(handle));
        assert_eq!(
            arrow_glue_handle_release(handle),
            ARROW_GLUE_ERROR_INVALID_HANDLE
        );
    }
    assert_eq!(arrow_glue_shutdown(), 0);

    // Usable again after a fresh init
    assert_eq!(arrow_glue_init(), ARROW_GLUE_SUCCESS);
    let again = arrow_glue_null_data_type_new();
    assert!(again > schema);
    assert_eq!(arrow_glue_handle_release(again), ARROW_GLUE_SUCCESS);
}
