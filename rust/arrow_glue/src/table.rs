//! Column and table handles
//!
//! A [`Column`] pairs a field with the array holding its data. A [`Table`]
//! is a name plus a `RecordBatch`; Arrow checks the columns against the
//! schema when the batch is built.

use std::sync::Arc;

use arrow_array::{Array, ArrayRef, RecordBatch, RecordBatchOptions};
use arrow_schema::{ArrowError, DataType, Field, FieldRef, Schema};

use crate::array::ArrayHandle;
use crate::error::{check_index, Result};
use crate::handle::Handle;
use crate::schema::{FieldHandle, SchemaHandle};

/// Handle over a column
pub type ColumnHandle = Handle<Column>;

/// Handle over a named table
pub type TableHandle = Handle<Table>;

/// A field and its data
#[derive(Debug, Clone)]
pub struct Column {
    field: FieldRef,
    data: ArrayRef,
}

impl Column {
    /// Create a column; the array type must match the field type
    pub fn try_new(field: FieldRef, data: ArrayRef) -> Result<Self> {
        if field.data_type() != data.data_type() {
            return Err(ArrowError::InvalidArgumentError(format!(
                "column '{}' is declared {} but its data is {}",
                field.name(),
                field.data_type(),
                data.data_type()
            ))
            .into());
        }
        Ok(Column { field, data })
    }

    pub fn name(&self) -> &str {
        self.field.name()
    }

    pub fn field(&self) -> &FieldRef {
        &self.field
    }

    pub fn data(&self) -> &ArrayRef {
        &self.data
    }
}

/// A named record batch
#[derive(Debug, Clone)]
pub struct Table {
    name: String,
    batch: RecordBatch,
}

impl Table {
    /// Create a table; Arrow validates the columns against the schema
    ///
    /// A table without columns has zero rows.
    pub fn try_new(name: &str, schema: Arc<Schema>, columns: Vec<ArrayRef>) -> Result<Self> {
        let row_count = columns.first().map(|c| c.len()).unwrap_or(0);
        let options = RecordBatchOptions::new().with_row_count(Some(row_count));
        let batch = RecordBatch::try_new_with_options(schema, columns, &options)?;
        Ok(Table {
            name: name.to_string(),
            batch,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn batch(&self) -> &RecordBatch {
        &self.batch
    }
}

impl Handle<Column> {
    /// Create a column from a field and an array; both values are shared
    pub fn create(field: &Handle<Field>, data: &Handle<dyn Array>) -> Result<Self> {
        let column = Column::try_new(Arc::clone(field.raw()), Arc::clone(data.raw()))?;
        Ok(Handle::new(column))
    }

    pub fn name(&self) -> &str {
        self.raw().name()
    }

    /// Returns a new handle to the column's field
    pub fn field(&self) -> Handle<Field> {
        FieldHandle::from_field_ref(Arc::clone(self.raw().field()))
    }

    /// Returns a new handle to the column's data type
    pub fn data_type(&self) -> Handle<DataType> {
        Handle::new(self.raw().field().data_type().clone())
    }

    pub fn len(&self) -> usize {
        self.raw().data().len()
    }

    pub fn is_empty(&self) -> bool {
        self.raw().data().is_empty()
    }

    pub fn n_nulls(&self) -> usize {
        self.raw().data().logical_null_count()
    }

    /// Returns a new handle to the column's data
    pub fn data(&self) -> Handle<dyn Array> {
        ArrayHandle::from_array_ref(Arc::clone(self.raw().data()))
    }
}

/// Each column's own field must equal the schema field at its position
fn check_column_fields(schema: &Schema, columns: &[&Handle<Column>]) -> Result<()> {
    for (i, (column, expected)) in columns.iter().zip(schema.fields().iter()).enumerate() {
        let actual = column.raw().field();
        if actual != expected {
            return Err(ArrowError::InvalidArgumentError(format!(
                "column {} field '{}: {}' (nullable: {}) does not match schema field '{}: {}' (nullable: {})",
                i,
                actual.name(),
                actual.data_type(),
                actual.is_nullable(),
                expected.name(),
                expected.data_type(),
                expected.is_nullable()
            ))
            .into());
        }
    }
    Ok(())
}

impl Handle<Table> {
    /// Create a table from a schema and columns, in schema order
    ///
    /// Every column's field must equal the schema's field at the same
    /// position, so the columns read back unchanged.
    pub fn create(name: &str, schema: &Handle<Schema>, columns: &[&Handle<Column>]) -> Result<Self> {
        check_column_fields(schema.raw(), columns)?;
        let arrays = columns
            .iter()
            .map(|column| Arc::clone(column.raw().data()))
            .collect();
        let table = Table::try_new(name, Arc::clone(schema.raw()), arrays)?;
        Ok(Handle::new(table))
    }

    pub fn name(&self) -> &str {
        self.raw().name()
    }

    /// Returns a new handle to the table's schema
    pub fn schema(&self) -> Handle<Schema> {
        SchemaHandle::from_schema_ref(self.raw().batch().schema())
    }

    /// Returns a new handle to the `i`-th column
    pub fn column(&self, i: usize) -> Result<Handle<Column>> {
        let batch = self.raw().batch();
        check_index(i, batch.num_columns())?;
        let field = Arc::clone(&batch.schema_ref().fields()[i]);
        let column = Column::try_new(field, Arc::clone(batch.column(i)))?;
        Ok(Handle::new(column))
    }

    pub fn n_columns(&self) -> usize {
        self.raw().batch().num_columns()
    }

    pub fn n_rows(&self) -> usize {
        self.raw().batch().num_rows()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_type::DataTypeHandle;
    use crate::error::GlueError;
    use arrow_array::types::Int32Type;
    use arrow_array::Int32Array;

    fn int_column(name: &str, values: &[i32]) -> ColumnHandle {
        let field = FieldHandle::create(name, &DataTypeHandle::int32(), true);
        let data = ArrayHandle::primitive::<Int32Type>(values, None).unwrap();
        ColumnHandle::create(&field, &data).unwrap()
    }

    fn table_with(n: usize) -> TableHandle {
        let columns: Vec<ColumnHandle> = (0..n)
            .map(|i| int_column(&format!("c{}", i), &[1, 2, 3]))
            .collect();
        let fields: Vec<FieldHandle> = columns.iter().map(|c| c.field()).collect();
        let schema = SchemaHandle::create(&fields.iter().collect::<Vec<_>>());
        TableHandle::create("many", &schema, &columns.iter().collect::<Vec<_>>()).unwrap()
    }

    // ==========================================================================
    // Column Tests
    // ==========================================================================

    #[test]
    fn test_column_accessors() {
        let column = int_column("a", &[4, 5]);

        assert_eq!(column.name(), "a");
        assert_eq!(column.len(), 2);
        assert_eq!(column.n_nulls(), 0);
        assert_eq!(column.data_type().raw().as_ref(), &DataType::Int32);
        assert_eq!(column.field().name(), "a");
        assert_eq!(column.data().value::<Int32Type>(1).unwrap(), 5);
    }

    #[test]
    fn test_column_type_mismatch() {
        let field = FieldHandle::create("a", &DataTypeHandle::int64(), true);
        let data = ArrayHandle::primitive::<Int32Type>(&[1], None).unwrap();

        assert!(matches!(
            ColumnHandle::create(&field, &data),
            Err(GlueError::ArrowError(_))
        ));
    }

    #[test]
    fn test_column_shares_data() {
        let data = ArrayHandle::from_array(Int32Array::from(vec![1, 2]));
        let field = FieldHandle::create("a", &DataTypeHandle::int32(), true);
        let column = ColumnHandle::create(&field, &data).unwrap();

        assert_eq!(data.ref_count(), 2);
        assert!(column.data().same_value(&data));
    }

    // ==========================================================================
    // Table Tests
    // ==========================================================================

    #[test]
    fn test_single_empty_column_table() {
        let field = FieldHandle::create("a", &DataTypeHandle::int32(), true);
        let schema = SchemaHandle::create(&[&field]);
        let column = int_column("a", &[]);
        let table = TableHandle::create("t", &schema, &[&column]).unwrap();

        assert_eq!(table.name(), "t");
        assert_eq!(table.n_columns(), 1);
        assert_eq!(table.n_rows(), 0);
        assert_eq!(table.column(0).unwrap().name(), "a");
        assert!(table.schema().equal(&schema));
    }

    #[test]
    fn test_column_count_matches_input() {
        for n in [0, 1, 17] {
            let table = table_with(n);
            assert_eq!(table.n_columns(), n);
        }
    }

    #[test]
    fn test_zero_column_table_has_no_rows() {
        assert_eq!(table_with(0).n_rows(), 0);
        assert_eq!(table_with(2).n_rows(), 3);
    }

    #[test]
    fn test_column_out_of_bounds() {
        let table = table_with(2);
        assert!(matches!(
            table.column(2),
            Err(GlueError::IndexOutOfBounds { index: 2, len: 2 })
        ));
    }

    #[test]
    fn test_table_rejects_column_count_mismatch() {
        let field = FieldHandle::create("a", &DataTypeHandle::int32(), true);
        let schema = SchemaHandle::create(&[&field]);

        assert!(TableHandle::create("t", &schema, &[]).is_err());
    }

    #[test]
    fn test_table_rejects_uneven_lengths() {
        let a = int_column("a", &[1, 2]);
        let b = int_column("b", &[1]);
        let schema = SchemaHandle::create(&[&a.field(), &b.field()]);

        assert!(TableHandle::create("t", &schema, &[&a, &b]).is_err());
    }

    #[test]
    fn test_table_rejects_column_name_mismatch() {
        let field = FieldHandle::create("a", &DataTypeHandle::int32(), true);
        let schema = SchemaHandle::create(&[&field]);
        let column = int_column("b", &[1]);

        match TableHandle::create("t", &schema, &[&column]) {
            Err(GlueError::ArrowError(msg)) => {
                assert!(msg.contains("'b: Int32'"));
                assert!(msg.contains("'a: Int32'"));
            }
            other => panic!("Expected ArrowError, got {:?}", other),
        }
    }

    #[test]
    fn test_table_rejects_column_nullability_mismatch() {
        let field = FieldHandle::create("a", &DataTypeHandle::int32(), false);
        let schema = SchemaHandle::create(&[&field]);
        let column = int_column("a", &[1]);

        assert!(matches!(
            TableHandle::create("t", &schema, &[&column]),
            Err(GlueError::ArrowError(_))
        ));
    }

    #[test]
    fn test_table_columns_read_back_unchanged() {
        let a = int_column("a", &[1, 2]);
        let b = FieldHandle::create("b", &DataTypeHandle::int32(), false);
        let b = ColumnHandle::create(&b, &ArrayHandle::primitive::<Int32Type>(&[3, 4], None).unwrap())
            .unwrap();
        let schema = SchemaHandle::create(&[&a.field(), &b.field()]);
        let table = TableHandle::create("t", &schema, &[&a, &b]).unwrap();

        for (i, column) in [&a, &b].into_iter().enumerate() {
            let back = table.column(i).unwrap();
            assert_eq!(back.name(), column.name());
            assert!(back.field().equal(&column.field()));
            assert!(back.data().same_value(&column.data()));
        }
    }

    #[test]
    fn test_table_accessors_match_batch() {
        let table = table_with(3);
        let batch = table.raw().batch();

        assert_eq!(table.n_rows(), batch.num_rows());
        assert_eq!(table.n_columns(), batch.num_columns());
        for i in 0..batch.num_columns() {
            let column = table.column(i).unwrap();
            assert_eq!(column.name(), batch.schema().field(i).name());
            assert!(Arc::ptr_eq(column.data().raw(), batch.column(i)));
        }
    }

    #[test]
    fn test_table_name_c_string() {
        let table = table_with(1);
        assert_eq!(table.c_name().unwrap().to_bytes(), b"many");
    }
}
