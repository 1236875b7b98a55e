//! Array handles
//!
//! Arrays are built from plain value slices with an optional validity
//! vector (`true` = valid). Every index-based accessor is bounds-checked and
//! every typed accessor checks the array's type first.

use std::sync::Arc;

use arrow::ffi::{FFI_ArrowArray, FFI_ArrowSchema};
use arrow::util::display::{ArrayFormatter, FormatOptions};
use arrow_array::cast::AsArray;
use arrow_array::types::ArrowPrimitiveType;
use arrow_array::{
    make_array, Array, ArrayRef, BinaryArray, BooleanArray, NullArray, PrimitiveArray,
    StringArray,
};
use arrow_schema::DataType;

use crate::error::{check_index, GlueError, Result};
use crate::handle::Handle;

/// Handle over an Arrow array of any type
pub type ArrayHandle = Handle<dyn Array>;

fn check_validity(validity: Option<&[bool]>, len: usize) -> Result<()> {
    match validity {
        Some(validity) if validity.len() != len => Err(GlueError::InvalidArgument(format!(
            "validity has {} entries for {} values",
            validity.len(),
            len
        ))),
        _ => Ok(()),
    }
}

fn with_validity<T: Copy>(values: &[T], validity: Option<&[bool]>) -> Vec<Option<T>> {
    match validity {
        Some(validity) => values
            .iter()
            .zip(validity)
            .map(|(value, valid)| valid.then_some(*value))
            .collect(),
        None => values.iter().copied().map(Some).collect(),
    }
}

impl Handle<dyn Array> {
    /// Wrap a freshly built Arrow array
    pub fn from_array<A: Array + 'static>(array: A) -> Self {
        let array: ArrayRef = Arc::new(array);
        Handle::wrap(array)
    }

    pub(crate) fn from_array_ref(array: ArrayRef) -> Self {
        Handle::wrap(array)
    }

    /// Build a primitive array, e.g. `ArrayHandle::primitive::<Int8Type>(..)`
    pub fn primitive<P: ArrowPrimitiveType>(
        values: &[P::Native],
        validity: Option<&[bool]>,
    ) -> Result<Self> {
        check_validity(validity, values.len())?;
        let array: PrimitiveArray<P> = match validity {
            Some(_) => with_validity(values, validity).into_iter().collect(),
            None => PrimitiveArray::from_iter_values(values.iter().copied()),
        };
        Ok(Self::from_array(array))
    }

    pub fn boolean(values: &[bool], validity: Option<&[bool]>) -> Result<Self> {
        check_validity(validity, values.len())?;
        Ok(Self::from_array(BooleanArray::from(with_validity(
            values, validity,
        ))))
    }

    /// Build a UTF-8 string array; `None` entries are null
    pub fn string(values: &[Option<&str>]) -> Self {
        Self::from_array(StringArray::from(values.to_vec()))
    }

    /// Build a binary array; `None` entries are null
    pub fn binary(values: &[Option<&[u8]>]) -> Self {
        Self::from_array(BinaryArray::from(values.to_vec()))
    }

    /// Build an array of `len` nulls
    pub fn null(len: usize) -> Self {
        Self::from_array(NullArray::new(len))
    }

    pub fn len(&self) -> usize {
        self.raw().len()
    }

    pub fn is_empty(&self) -> bool {
        self.raw().is_empty()
    }

    pub fn n_nulls(&self) -> usize {
        self.raw().logical_null_count()
    }

    pub fn is_null(&self, i: usize) -> Result<bool> {
        check_index(i, self.len())?;
        Ok(self
            .raw()
            .logical_nulls()
            .is_some_and(|nulls| nulls.is_null(i)))
    }

    pub fn is_valid(&self, i: usize) -> Result<bool> {
        self.is_null(i).map(|null| !null)
    }

    /// Returns a new handle to the array's data type
    pub fn data_type(&self) -> Handle<DataType> {
        Handle::new(self.raw().data_type().clone())
    }

    /// Zero-copy slice as a new handle
    pub fn slice(&self, offset: usize, length: usize) -> Result<Self> {
        let len = self.len();
        match offset.checked_add(length) {
            Some(end) if end <= len => Ok(Self::from_array_ref(self.raw().slice(offset, length))),
            _ => Err(GlueError::IndexOutOfBounds {
                index: offset.saturating_add(length),
                len,
            }),
        }
    }

    pub fn equal(&self, other: &Handle<dyn Array>) -> bool {
        self.raw().to_data() == other.raw().to_data()
    }

    /// Element `i` of a primitive array of type `P`
    pub fn value<P: ArrowPrimitiveType>(&self, i: usize) -> Result<P::Native> {
        let array = self.primitive_array::<P>()?;
        check_index(i, array.len())?;
        Ok(array.value(i))
    }

    /// Borrowed view of all values of a primitive array of type `P`
    ///
    /// Null slots hold unspecified values.
    pub fn values<P: ArrowPrimitiveType>(&self) -> Result<&[P::Native]> {
        Ok(&self.primitive_array::<P>()?.values()[..])
    }

    pub fn bool_value(&self, i: usize) -> Result<bool> {
        let array = self
            .raw()
            .as_boolean_opt()
            .ok_or_else(|| self.type_mismatch(&DataType::Boolean))?;
        check_index(i, array.len())?;
        Ok(array.value(i))
    }

    /// Borrowed string at `i`, valid as long as this handle
    pub fn str_value(&self, i: usize) -> Result<&str> {
        let array = self
            .raw()
            .as_string_opt::<i32>()
            .ok_or_else(|| self.type_mismatch(&DataType::Utf8))?;
        check_index(i, array.len())?;
        Ok(array.value(i))
    }

    /// Borrowed bytes at `i`, valid as long as this handle
    pub fn binary_value(&self, i: usize) -> Result<&[u8]> {
        let array = self
            .raw()
            .as_binary_opt::<i32>()
            .ok_or_else(|| self.type_mismatch(&DataType::Binary))?;
        check_index(i, array.len())?;
        Ok(array.value(i))
    }

    /// Render the values as `[1, null, 3]`
    pub fn format_values(&self) -> Result<String> {
        let options = FormatOptions::default().with_null("null");
        let formatter = ArrayFormatter::try_new(self.raw().as_ref(), &options)?;
        let values: Vec<String> = (0..self.len())
            .map(|i| formatter.value(i).to_string())
            .collect();
        Ok(format!("[{}]", values.join(", ")))
    }

    /// Export through the Arrow C Data Interface
    pub fn export(&self) -> Result<(FFI_ArrowArray, FFI_ArrowSchema)> {
        Ok(arrow::ffi::to_ffi(&self.raw().to_data())?)
    }

    /// Import through the Arrow C Data Interface, taking ownership of `array`
    ///
    /// # Safety
    /// `array` and `schema` must be valid, initialized C Data Interface structs
    /// describing the same array.
    pub unsafe fn import(array: FFI_ArrowArray, schema: &FFI_ArrowSchema) -> Result<Self> {
        let data = arrow::ffi::from_ffi(array, schema)?;
        Ok(Self::from_array_ref(make_array(data)))
    }

    fn primitive_array<P: ArrowPrimitiveType>(&self) -> Result<&PrimitiveArray<P>> {
        self.raw()
            .as_primitive_opt::<P>()
            .ok_or_else(|| self.type_mismatch(&P::DATA_TYPE))
    }

    fn type_mismatch(&self, expected: &DataType) -> GlueError {
        GlueError::TypeMismatch(format!(
            "expected {} array, found {}",
            expected,
            self.raw().data_type()
        ))
    }
}
