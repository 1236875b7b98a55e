//! Arrow Glue - Reference-counted handles over Arrow values
//!
//! This crate wraps Arrow data types, fields, schemas, arrays, columns and
//! tables in [`Handle`]s that can be passed across a C boundary. It is
//! designed to be used directly from Rust applications or through the C FFI
//! layer in `arrow-glue-c`.
//!
//! # Features
//!
//! - One constructor per leaf data type and array type
//! - Typed, bounds-checked accessors
//! - Shared ownership of the underlying Arrow values
//! - Thread-safe, id-based handle registry for the C interface
//!
//! # Example
//!
//! ```ignore
//! use arrow_glue::{ArrayHandle, ColumnHandle, DataTypeHandle, FieldHandle, SchemaHandle, TableHandle};
//! use arrow_array::types::Int32Type;
//!
//! let field = FieldHandle::create("a", &DataTypeHandle::int32(), true);
//! let schema = SchemaHandle::create(&[&field]);
//! let data = ArrayHandle::primitive::<Int32Type>(&[], None)?;
//! let column = ColumnHandle::create(&field, &data)?;
//!
//! let table = TableHandle::create("t", &schema, &[&column])?;
//! assert_eq!(table.name(), "t");
//! assert_eq!(table.n_columns(), 1);
//! assert_eq!(table.n_rows(), 0);
//! assert_eq!(table.column(0)?.name(), "a");
//! # Ok::<(), arrow_glue::GlueError>(())
//! ```
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────┐
//! │        Foreign runtime (C, GObject, ...)        │
//! └─────────────────────────────────────────────────┘
//!                      │
//!                      │ handle ids
//!                      ▼
//! ┌─────────────────────────────────────────────────┐
//! │              arrow-glue-c (C ABI)               │
//! └─────────────────────────────────────────────────┘
//!                      │
//!                      ▼
//! ┌─────────────────────────────────────────────────┐
//! │            arrow-glue (this crate)              │
//! │       Handle, registry, config, logging         │
//! └─────────────────────────────────────────────────┘
//!                      │
//!                      ▼
//! ┌─────────────────────────────────────────────────┐
//! │                    arrow-rs                     │
//! └─────────────────────────────────────────────────┘
//! ```

// Declare modules
pub mod array;
pub mod config;
pub mod data_type;
pub mod error;
pub mod handle;
pub mod logging;
pub mod registry;
pub mod schema;
pub mod table;

// Re-exports for convenience
pub use array::ArrayHandle;
pub use config::GlueConfig;
pub use data_type::{DataTypeHandle, TypeId};
pub use error::{GlueError, Result};
pub use handle::{AnyHandle, Handle, HandleKind, Native};
pub use registry::HandleId;
pub use schema::{FieldHandle, SchemaHandle};
pub use table::{Column, ColumnHandle, Table, TableHandle};

// Re-export commonly used Arrow types
pub use arrow_array::{Array, ArrayRef, RecordBatch};
pub use arrow_schema::{DataType, Field, Schema};

/// Process-wide setup: logging, then the registry's initialized flag
///
/// Safe to call more than once and from any thread. Handle kinds need no
/// setup; the set is closed at compile time by [`Native`].
pub fn init() {
    let config = GlueConfig::global();
    logging::init(config);
    if registry::mark_initialized() {
        log::info!("arrow-glue initialized");
    }
}

/// Single teardown point: releases every handle still registered
///
/// Returns the number of handles that were still live. Every id issued
/// before the call becomes invalid.
pub fn shutdown() -> usize {
    let leaked = registry::drain(GlueConfig::global().leak_check);
    log::info!("arrow-glue shut down, {} handle(s) released", leaked);
    leaked
}
