use formfill_types::FieldIdError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AcroFormError {
    #[error("PDF error: {0}")]
    Pdf(#[from] lopdf::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid field name: {0}")]
    FieldName(#[from] FieldIdError),

    #[error("Malformed form structure: {0}")]
    Malformed(String),
}
