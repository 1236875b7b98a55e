//! Reference-counted handles over Arrow values
//!
//! A [`Handle`] owns one `Arc` reference to a native Arrow value. The value
//! may be shared with other handles or with Arrow's own structures; it lives
//! as long as its longest holder. Handles have no setters: the value is
//! fixed when the handle is built and released exactly once when the handle
//! is dropped.
//!
//! The set of values a handle can hold is closed. Each one implements the
//! sealed [`Native`] trait, which tags it with a [`HandleKind`] and lets the
//! registry store it in the [`AnyHandle`] enum.

use std::ffi::{CStr, CString};
use std::fmt;
use std::sync::Arc;

use arrow_array::Array;
use arrow_schema::{DataType, Field, Schema};
use once_cell::sync::OnceCell;

use crate::error::{GlueError, Result};
use crate::table::{Column, Table};

/// Kind of native value behind a handle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HandleKind {
    DataType,
    Field,
    Schema,
    Array,
    Column,
    Table,
}

impl HandleKind {
    /// Every kind, in declaration order
    pub const ALL: [HandleKind; 6] = [
        HandleKind::DataType,
        HandleKind::Field,
        HandleKind::Schema,
        HandleKind::Array,
        HandleKind::Column,
        HandleKind::Table,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            HandleKind::DataType => "data-type",
            HandleKind::Field => "field",
            HandleKind::Schema => "schema",
            HandleKind::Array => "array",
            HandleKind::Column => "column",
            HandleKind::Table => "table",
        }
    }
}

impl fmt::Display for HandleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

mod sealed {
    pub trait Sealed {}
}

/// A native value that can sit behind a [`Handle`]
///
/// Implemented for `DataType`, `Field`, `Schema`, `dyn Array`, [`Column`]
/// and [`Table`]; the trait is sealed.
pub trait Native: sealed::Sealed + Send + Sync + 'static {
    const KIND: HandleKind;

    #[doc(hidden)]
    fn into_any(handle: Handle<Self>) -> AnyHandle;

    #[doc(hidden)]
    fn from_any(any: &AnyHandle) -> Option<&Handle<Self>>;

    /// Name of the value, for kinds that carry one
    fn native_name(&self) -> Option<&str> {
        None
    }
}

/// Owner of one reference to a native Arrow value
pub struct Handle<T: ?Sized> {
    value: Arc<T>,
    c_name: OnceCell<CString>,
}

impl<T: Native> Handle<T> {
    /// Build a handle around a freshly created value
    pub fn new(value: T) -> Self {
        Self::wrap(Arc::new(value))
    }
}

impl<T: Native + ?Sized> Handle<T> {
    /// Wrap a value produced on the native side
    ///
    /// Takes ownership of the passed reference.
    pub(crate) fn wrap(value: Arc<T>) -> Self {
        Handle {
            value,
            c_name: OnceCell::new(),
        }
    }

    /// New handle holding another reference to the same value
    pub(crate) fn share(&self) -> Self {
        Self::wrap(Arc::clone(&self.value))
    }

    /// The wrapped native value
    pub fn raw(&self) -> &Arc<T> {
        &self.value
    }

    pub fn kind(&self) -> HandleKind {
        T::KIND
    }

    /// Number of live references to the native value, this one included
    pub fn ref_count(&self) -> usize {
        Arc::strong_count(&self.value)
    }

    /// Whether both handles refer to the very same native value
    pub fn same_value(&self, other: &Handle<T>) -> bool {
        Arc::ptr_eq(&self.value, &other.value)
    }

    /// NUL-terminated copy of the value's name
    ///
    /// Built on first use and kept until the handle is dropped.
    pub fn c_name(&self) -> Result<&CStr> {
        let name = self.value.native_name().ok_or_else(|| {
            GlueError::InvalidArgument(format!("{} values have no name", T::KIND))
        })?;
        let c_name = self.c_name.get_or_try_init(|| {
            CString::new(name).map_err(|_| {
                GlueError::InvalidArgument(format!("name {:?} contains a NUL byte", name))
            })
        })?;
        Ok(c_name.as_c_str())
    }
}

impl<T: Native + ?Sized + fmt::Debug> fmt::Debug for Handle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Handle")
            .field("kind", &T::KIND)
            .field("value", &self.value)
            .finish()
    }
}

/// A handle of any kind, as stored by the registry
pub enum AnyHandle {
    DataType(Handle<DataType>),
    Field(Handle<Field>),
    Schema(Handle<Schema>),
    Array(Handle<dyn Array>),
    Column(Handle<Column>),
    Table(Handle<Table>),
}

impl AnyHandle {
    pub fn kind(&self) -> HandleKind {
        match self {
            AnyHandle::DataType(_) => HandleKind::DataType,
            AnyHandle::Field(_) => HandleKind::Field,
            AnyHandle::Schema(_) => HandleKind::Schema,
            AnyHandle::Array(_) => HandleKind::Array,
            AnyHandle::Column(_) => HandleKind::Column,
            AnyHandle::Table(_) => HandleKind::Table,
        }
    }

    pub fn ref_count(&self) -> usize {
        match self {
            AnyHandle::DataType(h) => h.ref_count(),
            AnyHandle::Field(h) => h.ref_count(),
            AnyHandle::Schema(h) => h.ref_count(),
            AnyHandle::Array(h) => h.ref_count(),
            AnyHandle::Column(h) => h.ref_count(),
            AnyHandle::Table(h) => h.ref_count(),
        }
    }
}

impl<T: Native + ?Sized> From<Handle<T>> for AnyHandle {
    fn from(handle: Handle<T>) -> Self {
        T::into_any(handle)
    }
}

macro_rules! impl_native {
    ($ty:ty, $variant:ident $(, |$v:ident| $name:expr)?) => {
        impl sealed::Sealed for $ty {}

        impl Native for $ty {
            const KIND: HandleKind = HandleKind::$variant;

            fn into_any(handle: Handle<Self>) -> AnyHandle {
                AnyHandle::$variant(handle)
            }

            fn from_any(any: &AnyHandle) -> Option<&Handle<Self>> {
                match any {
                    AnyHandle::$variant(handle) => Some(handle),
                    _ => None,
                }
            }

            $(
                fn native_name(&self) -> Option<&str> {
                    let $v = self;
                    Some($name)
                }
            )?
        }
    };
}

impl_native!(DataType, DataType);
impl_native!(Field, Field, |f| f.name().as_str());
impl_native!(Schema, Schema);
impl_native!(dyn Array, Array);
impl_native!(Column, Column, |c| c.name());
impl_native!(Table, Table, |t| t.name());

#[cfg(test)]
mod tests {
    use super::*;
    use arrow_array::Int32Array;

    // ==========================================================================
    // Lifetime Tests
    // ==========================================================================

    #[test]
    fn test_new_then_drop_releases_once() {
        let handle = Handle::new(DataType::Int8);
        let weak = Arc::downgrade(handle.raw());
        assert_eq!(weak.strong_count(), 1);

        drop(handle);
        assert_eq!(weak.strong_count(), 0);
        assert!(weak.upgrade().is_none());
    }

    #[test]
    fn test_wrap_counts_one_per_wrap() {
        let value = Arc::new(Schema::empty());
        assert_eq!(Arc::strong_count(&value), 1);

        let first = Handle::wrap(Arc::clone(&value));
        assert_eq!(Arc::strong_count(&value), 2);

        let second = Handle::wrap(Arc::clone(&value));
        assert_eq!(Arc::strong_count(&value), 3);

        drop(first);
        assert_eq!(Arc::strong_count(&value), 2);
        drop(second);
        assert_eq!(Arc::strong_count(&value), 1);
    }

    #[test]
    fn test_share_points_at_same_value() {
        let handle = Handle::new(Field::new("a", DataType::Int32, true));
        let shared = handle.share();

        assert!(handle.same_value(&shared));
        assert_eq!(handle.ref_count(), 2);
        drop(shared);
        assert_eq!(handle.ref_count(), 1);
    }

    #[test]
    fn test_dyn_array_handle() {
        let array: Arc<dyn Array> = Arc::new(Int32Array::from(vec![1, 2, 3]));
        let handle = Handle::wrap(Arc::clone(&array));

        assert_eq!(handle.kind(), HandleKind::Array);
        assert_eq!(handle.raw().len(), 3);
        assert_eq!(Arc::strong_count(&array), 2);
    }

    // ==========================================================================
    // Name Tests
    // ==========================================================================

    #[test]
    fn test_c_name_matches_native_name() {
        let handle = Handle::new(Field::new("price", DataType::Float64, false));
        let c_name = handle.c_name().unwrap();
        assert_eq!(c_name.to_bytes(), b"price");

        // Same allocation on repeated calls
        let again = handle.c_name().unwrap();
        assert_eq!(c_name.as_ptr(), again.as_ptr());
    }

    #[test]
    fn test_c_name_unnamed_kind() {
        let handle = Handle::new(DataType::Utf8);
        assert!(matches!(
            handle.c_name(),
            Err(GlueError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_c_name_with_interior_nul() {
        let handle = Handle::new(Field::new("a\0b", DataType::Int8, true));
        assert!(handle.c_name().is_err());
    }

    // ==========================================================================
    // AnyHandle Tests
    // ==========================================================================

    #[test]
    fn test_any_handle_round_trip_kind() {
        let any: AnyHandle = Handle::new(DataType::Boolean).into();
        assert_eq!(any.kind(), HandleKind::DataType);
        assert!(DataType::from_any(&any).is_some());
        assert!(Schema::from_any(&any).is_none());
    }

    #[test]
    fn test_kind_names_unique() {
        let mut names: Vec<_> = HandleKind::ALL.iter().map(|k| k.name()).collect();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), HandleKind::ALL.len());
    }
}
