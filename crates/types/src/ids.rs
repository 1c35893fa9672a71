//! Newtype wrappers for field and column identifiers.
//!
//! Field names and column names are both plain strings in the source formats,
//! but mixing them up is exactly the class of bug these types exist to prevent:
//! a column only binds onto a field after an explicit lookup by name.

use crate::error::FieldIdError;
use std::borrow::Borrow;
use std::fmt;
use std::sync::Arc;

/// Opening delimiter of a raw field-name token.
pub const OPEN_DELIMITER: char = '(';
/// Closing delimiter of a raw field-name token.
pub const CLOSE_DELIMITER: char = ')';

/// The identifier of one fillable field, with its boundary delimiters removed.
///
/// A `FieldId` can only be produced from a [`RawFieldName`] by stripping, or
/// constructed directly from an already-clean name. A `FieldId` cannot be
/// stripped again.
#[derive(Debug, Clone, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct FieldId(Arc<str>);

impl FieldId {
    /// Creates a new FieldId from an already-stripped name
    pub fn new(id: impl Into<Arc<str>>) -> Self {
        Self(id.into())
    }

    /// Returns the string representation of this field ID
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Re-wraps this identifier in its delimiters, producing the raw token
    /// that the template format stores.
    pub fn to_raw(&self) -> RawFieldName {
        RawFieldName::enclose(self)
    }
}

impl From<String> for FieldId {
    fn from(s: String) -> Self {
        Self(s.into())
    }
}

impl From<&str> for FieldId {
    fn from(s: &str) -> Self {
        Self(s.into())
    }
}

impl AsRef<str> for FieldId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for FieldId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FieldId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A raw, delimited field-name token such as `(Name)`.
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub struct RawFieldName(String);

impl RawFieldName {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn enclose(id: &FieldId) -> Self {
        Self(format!("{OPEN_DELIMITER}{}{CLOSE_DELIMITER}", id.as_str()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Removes the first and last character, which must be the delimiter pair.
    ///
    /// A token whose boundaries are not `(`/`)` is rejected rather than
    /// trimmed, so feeding an already-stripped name back in fails loudly.
    pub fn strip(&self) -> Result<FieldId, FieldIdError> {
        let raw = self.0.as_str();
        if raw.chars().count() < 2 {
            return Err(FieldIdError::TooShort { raw: raw.to_string() });
        }
        let inner = raw
            .strip_prefix(OPEN_DELIMITER)
            .and_then(|rest| rest.strip_suffix(CLOSE_DELIMITER))
            .ok_or_else(|| FieldIdError::MissingDelimiters { raw: raw.to_string() })?;
        Ok(FieldId::new(inner))
    }
}

impl fmt::Display for RawFieldName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The name of one column of a tabular data source.
#[derive(Debug, Clone, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct ColumnName(Arc<str>);

impl ColumnName {
    pub fn new(name: impl Into<Arc<str>>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for ColumnName {
    fn from(s: String) -> Self {
        Self(s.into())
    }
}

impl From<&str> for ColumnName {
    fn from(s: &str) -> Self {
        Self(s.into())
    }
}

impl From<&FieldId> for ColumnName {
    fn from(id: &FieldId) -> Self {
        Self(id.0.clone())
    }
}

impl AsRef<str> for ColumnName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for ColumnName {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ColumnName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
