//! Field and schema handles

use std::fmt;
use std::sync::Arc;

use arrow_schema::{DataType, Field, FieldRef, Schema};

use crate::error::{check_index, Result};
use crate::handle::Handle;

/// Handle over a named, typed field
pub type FieldHandle = Handle<Field>;

/// Handle over an ordered set of fields
pub type SchemaHandle = Handle<Schema>;

impl Handle<Field> {
    /// Create a field. The data type handle is shared, not consumed.
    pub fn create(name: &str, data_type: &Handle<DataType>, nullable: bool) -> Self {
        Handle::new(Field::new(name, data_type.raw().as_ref().clone(), nullable))
    }

    pub(crate) fn from_field_ref(field: FieldRef) -> Self {
        Handle::wrap(field)
    }

    pub fn name(&self) -> &str {
        self.raw().name()
    }

    /// Returns a new handle to the field's data type
    pub fn data_type(&self) -> Handle<DataType> {
        Handle::new(self.raw().data_type().clone())
    }

    pub fn is_nullable(&self) -> bool {
        self.raw().is_nullable()
    }

    pub fn equal(&self, other: &Handle<Field>) -> bool {
        self.raw() == other.raw()
    }
}

impl fmt::Display for Handle<Field> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_field(f, self.raw())
    }
}

fn write_field(f: &mut fmt::Formatter<'_>, field: &Field) -> fmt::Result {
    write!(f, "{}: {}", field.name(), field.data_type())?;
    if !field.is_nullable() {
        f.write_str(" not null")?;
    }
    Ok(())
}

impl Handle<Schema> {
    /// Create a schema from field handles, in order
    pub fn create(fields: &[&Handle<Field>]) -> Self {
        let fields: Vec<FieldRef> = fields.iter().map(|f| Arc::clone(f.raw())).collect();
        Handle::new(Schema::new(fields))
    }

    pub(crate) fn from_schema_ref(schema: Arc<Schema>) -> Self {
        Handle::wrap(schema)
    }

    /// Returns a new handle to the `i`-th field
    pub fn field(&self, i: usize) -> Result<Handle<Field>> {
        let fields = self.raw().fields();
        check_index(i, fields.len())?;
        Ok(FieldHandle::from_field_ref(Arc::clone(&fields[i])))
    }

    /// Returns a new handle to the field called `name`, if any
    pub fn field_by_name(&self, name: &str) -> Option<Handle<Field>> {
        self.raw()
            .fields()
            .find(name)
            .map(|(_, field)| FieldHandle::from_field_ref(Arc::clone(field)))
    }

    pub fn n_fields(&self) -> usize {
        self.raw().fields().len()
    }

    /// New handles to every field, in order
    pub fn fields(&self) -> Vec<Handle<Field>> {
        self.raw()
            .fields()
            .iter()
            .map(|field| FieldHandle::from_field_ref(Arc::clone(field)))
            .collect()
    }

    pub fn equal(&self, other: &Handle<Schema>) -> bool {
        self.raw() == other.raw()
    }
}

impl fmt::Display for Handle<Schema> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, field) in self.raw().fields().iter().enumerate() {
            if i > 0 {
                f.write_str("\n")?;
            }
            write_field(f, field)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_type::DataTypeHandle;
    use crate::error::GlueError;

    fn sample_schema() -> SchemaHandle {
        let id = FieldHandle::create("id", &DataTypeHandle::int64(), false);
        let name = FieldHandle::create("name", &DataTypeHandle::string(), true);
        SchemaHandle::create(&[&id, &name])
    }

    // ==========================================================================
    // Field Tests
    // ==========================================================================

    #[test]
    fn test_field_accessors() {
        let field = FieldHandle::create("score", &DataTypeHandle::double(), true);

        assert_eq!(field.name(), "score");
        assert!(field.is_nullable());
        assert_eq!(field.data_type().raw().as_ref(), &DataType::Float64);
    }

    #[test]
    fn test_field_accessors_match_arrow() {
        let field = FieldHandle::create("flag", &DataTypeHandle::boolean(), false);
        let native = field.raw();

        assert_eq!(field.name(), native.name());
        assert_eq!(field.is_nullable(), native.is_nullable());
        assert_eq!(field.data_type().raw().as_ref(), native.data_type());
    }

    #[test]
    fn test_field_does_not_consume_data_type() {
        let data_type = DataTypeHandle::int32();
        let _field = FieldHandle::create("a", &data_type, true);
        assert_eq!(data_type.ref_count(), 1);
    }

    #[test]
    fn test_field_display() {
        let field = FieldHandle::create("a", &DataTypeHandle::int32(), false);
        assert_eq!(field.to_string(), "a: Int32 not null");

        let field = FieldHandle::create("b", &DataTypeHandle::string(), true);
        assert_eq!(field.to_string(), "b: Utf8");
    }

    #[test]
    fn test_field_equal() {
        let a = FieldHandle::create("a", &DataTypeHandle::int32(), true);
        let b = FieldHandle::create("a", &DataTypeHandle::int32(), true);
        let c = FieldHandle::create("a", &DataTypeHandle::int64(), true);
        assert!(a.equal(&b));
        assert!(!a.equal(&c));
    }

    // ==========================================================================
    // Schema Tests
    // ==========================================================================

    #[test]
    fn test_schema_fields() {
        let schema = sample_schema();

        assert_eq!(schema.n_fields(), 2);
        assert_eq!(schema.field(0).unwrap().name(), "id");
        assert_eq!(schema.field(1).unwrap().name(), "name");

        let names: Vec<_> = schema.fields().iter().map(|f| f.name().to_string()).collect();
        assert_eq!(names, vec!["id", "name"]);
    }

    #[test]
    fn test_schema_shares_field_values() {
        let field = FieldHandle::create("a", &DataTypeHandle::int8(), true);
        let schema = SchemaHandle::create(&[&field]);

        // One reference from the handle, one from the schema
        assert_eq!(field.ref_count(), 2);

        let from_schema = schema.field(0).unwrap();
        assert!(from_schema.same_value(&field));
        assert_eq!(field.ref_count(), 3);
    }

    #[test]
    fn test_schema_field_out_of_bounds() {
        let schema = sample_schema();
        match schema.field(2) {
            Err(GlueError::IndexOutOfBounds { index, len }) => {
                assert_eq!(index, 2);
                assert_eq!(len, 2);
            }
            _ => panic!("Expected IndexOutOfBounds"),
        }
    }

    #[test]
    fn test_schema_field_by_name() {
        let schema = sample_schema();
        let field = schema.field_by_name("name").unwrap();
        assert_eq!(field.raw().data_type(), &DataType::Utf8);
        assert!(schema.field_by_name("missing").is_none());
    }

    #[test]
    fn test_empty_schema() {
        let schema = SchemaHandle::create(&[]);
        assert_eq!(schema.n_fields(), 0);
        assert!(schema.field(0).is_err());
        assert_eq!(schema.to_string(), "");
    }

    #[test]
    fn test_schema_display() {
        assert_eq!(sample_schema().to_string(), "id: Int64 not null\nname: Utf8");
    }

    #[test]
    fn test_schema_equal() {
        assert!(sample_schema().equal(&sample_schema()));
        assert!(!sample_schema().equal(&SchemaHandle::create(&[])));
    }
}
