//! Data type handles
//!
//! One constructor per leaf data type, plus the accessors every data type
//! shares.

use std::fmt;

use arrow_schema::DataType;

use crate::handle::Handle;

/// Handle over an Arrow data type descriptor
pub type DataTypeHandle = Handle<DataType>;

/// Data types known to the C interface
///
/// Values are stable and non-negative; they are part of the C ABI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum TypeId {
    Null = 0,
    Boolean = 1,
    UInt8 = 2,
    Int8 = 3,
    UInt16 = 4,
    Int16 = 5,
    UInt32 = 6,
    Int32 = 7,
    UInt64 = 8,
    Int64 = 9,
    Float = 10,
    Double = 11,
    String = 12,
    Binary = 13,
    /// Any other Arrow type, e.g. one that arrived through the C Data Interface
    Unsupported = 255,
}

impl From<&DataType> for TypeId {
    fn from(data_type: &DataType) -> Self {
        match data_type {
            DataType::Null => TypeId::Null,
            DataType::Boolean => TypeId::Boolean,
            DataType::UInt8 => TypeId::UInt8,
            DataType::Int8 => TypeId::Int8,
            DataType::UInt16 => TypeId::UInt16,
            DataType::Int16 => TypeId::Int16,
            DataType::UInt32 => TypeId::UInt32,
            DataType::Int32 => TypeId::Int32,
            DataType::UInt64 => TypeId::UInt64,
            DataType::Int64 => TypeId::Int64,
            DataType::Float32 => TypeId::Float,
            DataType::Float64 => TypeId::Double,
            DataType::Utf8 => TypeId::String,
            DataType::Binary => TypeId::Binary,
            _ => TypeId::Unsupported,
        }
    }
}

impl TypeId {
    /// The leaf data type for this id, if there is one
    pub fn to_data_type(self) -> Option<DataType> {
        let data_type = match self {
            TypeId::Null => DataType::Null,
            TypeId::Boolean => DataType::Boolean,
            TypeId::UInt8 => DataType::UInt8,
            TypeId::Int8 => DataType::Int8,
            TypeId::UInt16 => DataType::UInt16,
            TypeId::Int16 => DataType::Int16,
            TypeId::UInt32 => DataType::UInt32,
            TypeId::Int32 => DataType::Int32,
            TypeId::UInt64 => DataType::UInt64,
            TypeId::Int64 => DataType::Int64,
            TypeId::Float => DataType::Float32,
            TypeId::Double => DataType::Float64,
            TypeId::String => DataType::Utf8,
            TypeId::Binary => DataType::Binary,
            TypeId::Unsupported => return None,
        };
        Some(data_type)
    }

    /// Parse the C representation
    pub fn from_i32(value: i32) -> Option<Self> {
        let id = match value {
            0 => TypeId::Null,
            1 => TypeId::Boolean,
            2 => TypeId::UInt8,
            3 => TypeId::Int8,
            4 => TypeId::UInt16,
            5 => TypeId::Int16,
            6 => TypeId::UInt32,
            7 => TypeId::Int32,
            8 => TypeId::UInt64,
            9 => TypeId::Int64,
            10 => TypeId::Float,
            11 => TypeId::Double,
            12 => TypeId::String,
            13 => TypeId::Binary,
            _ => return None,
        };
        Some(id)
    }
}

macro_rules! leaf_constructors {
    ($($(#[$doc:meta])* $name:ident => $data_type:expr;)*) => {
        impl Handle<DataType> {
            $(
                $(#[$doc])*
                pub fn $name() -> Self {
                    Handle::new($data_type)
                }
            )*
        }
    };
}

leaf_constructors! {
    /// Null data type
    null => DataType::Null;
    /// Boolean data type
    boolean => DataType::Boolean;
    /// 8-bit integer data type
    int8 => DataType::Int8;
    /// 8-bit unsigned integer data type
    uint8 => DataType::UInt8;
    /// 16-bit integer data type
    int16 => DataType::Int16;
    /// 16-bit unsigned integer data type
    uint16 => DataType::UInt16;
    /// 32-bit integer data type
    int32 => DataType::Int32;
    /// 32-bit unsigned integer data type
    uint32 => DataType::UInt32;
    /// 64-bit integer data type
    int64 => DataType::Int64;
    /// 64-bit unsigned integer data type
    uint64 => DataType::UInt64;
    /// 32-bit floating point data type
    float => DataType::Float32;
    /// 64-bit floating point data type
    double => DataType::Float64;
    /// Binary data type
    binary => DataType::Binary;
    /// UTF-8 encoded string data type
    string => DataType::Utf8;
}

impl Handle<DataType> {
    /// Build the leaf data type named by `id`
    pub fn from_type_id(id: TypeId) -> Option<Self> {
        id.to_data_type().map(Handle::new)
    }

    pub fn type_id(&self) -> TypeId {
        TypeId::from(self.raw().as_ref())
    }

    pub fn equal(&self, other: &Handle<DataType>) -> bool {
        self.raw() == other.raw()
    }
}

impl fmt::Display for Handle<DataType> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self.raw().as_ref(), f)
    }
}
