use thiserror::Error;

/// Errors produced when turning a raw delimited token into a [`crate::FieldId`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FieldIdError {
    #[error("raw field name '{raw}' is too short to carry delimiters")]
    TooShort { raw: String },

    #[error("raw field name '{raw}' is not enclosed in '(' and ')'; was it already stripped?")]
    MissingDelimiters { raw: String },
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TypesError {
    #[error("row index {index} is out of range for a data set of {len} rows")]
    RowOutOfRange { index: usize, len: usize },

    #[error("unknown column '{0}'")]
    UnknownColumn(String),
}
