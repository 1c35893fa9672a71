pub mod error;
pub mod ids;
pub mod record;
pub mod value;

pub use error::{FieldIdError, TypesError};
pub use ids::{ColumnName, FieldId, RawFieldName};
pub use record::{DataSet, TabularRecord};
pub use value::Value;
