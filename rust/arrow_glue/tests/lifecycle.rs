//! Process-wide init/shutdown
//!
//! Kept in its own test binary with a single test: `shutdown` drains the
//! global registry, which would race with any other test touching it.

use arrow_array::types::Int8Type;
use arrow_glue::registry;
use arrow_glue::{ArrayHandle, DataTypeHandle, HandleKind, SchemaHandle};

#[test]
fn test_init_register_shutdown() {
    assert!(!registry::is_initialized());
    arrow_glue::init();
    arrow_glue::init();
    assert!(registry::is_initialized());

    let data_type = DataTypeHandle::int8();
    let weak = std::sync::Arc::downgrade(data_type.raw());

    let type_id = registry::register(data_type);
    let array_id = registry::register(ArrayHandle::primitive::<Int8Type>(&[1, 2, 3], None).unwrap());
    let schema_id = registry::register(SchemaHandle::create(&[]));

    assert_eq!(registry::live_count(), 3);
    assert_eq!(registry::live_count_of(HandleKind::DataType), 1);
    assert_eq!(registry::live_count_of(HandleKind::Array), 1);

    registry::release(schema_id).unwrap();
    assert_eq!(registry::live_count(), 2);

    // Two handles were never released
    assert_eq!(arrow_glue::shutdown(), 2);
    assert_eq!(weak.strong_count(), 0);
    assert!(!registry::is_valid(type_id));
    assert!(!registry::is_valid(array_id));
    assert_eq!(registry::live_count(), 0);
    assert!(!registry::is_initialized());

    // Nothing left to release, and the registry is usable again after init
    assert_eq!(arrow_glue::shutdown(), 0);
    arrow_glue::init();
    assert!(registry::is_initialized());
    let id = registry::register(DataTypeHandle::double());
    assert!(id > array_id);
    registry::release(id).unwrap();
}
