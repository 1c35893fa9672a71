//! Field catalog extraction and appearance capture.

use crate::error::AcroFormError;
use crate::widgets::{self, collect_widgets};
use formfill_types::FieldId;
use lopdf::{Dictionary, Document, Object};
use std::collections::HashMap;
use std::fmt;
use std::io::Write;

/// The ordered list of field identifiers declared by a template's `/AcroForm`.
///
/// Duplicates are kept in first-seen order; nothing here deduplicates.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FieldCatalog {
    fields: Vec<FieldId>,
}

impl FieldCatalog {
    pub fn new(fields: Vec<FieldId>) -> Self {
        Self { fields }
    }

    pub fn fields(&self) -> &[FieldId] {
        &self.fields
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldId> {
        self.fields.iter()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Writes one identifier per line, in catalog order.
    pub fn write_listing<W: Write>(&self, mut out: W) -> std::io::Result<()> {
        for field in &self.fields {
            writeln!(out, "{field}")?;
        }
        Ok(())
    }
}

/// Result of reading a template's field catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogOutcome {
    Fields(FieldCatalog),
    /// The template has no `/AcroForm`, no `/Fields`, or an empty `/Fields`.
    NoFormFields,
}

impl CatalogOutcome {
    /// The catalog, empty when the template has no form fields.
    pub fn into_catalog(self) -> FieldCatalog {
        match self {
            CatalogOutcome::Fields(catalog) => catalog,
            CatalogOutcome::NoFormFields => FieldCatalog::default(),
        }
    }
}

/// An opaque default-appearance (`/DA`) string, kept byte-for-byte.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AppearanceString(Vec<u8>);

impl AppearanceString {
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Display for AppearanceString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", String::from_utf8_lossy(&self.0))
    }
}

/// Per-field appearance strings, captured once per template and only read afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppearanceProperties {
    by_field: HashMap<FieldId, AppearanceString>,
}

impl AppearanceProperties {
    pub fn get(&self, field: &str) -> Option<&AppearanceString> {
        self.by_field.get(field)
    }

    pub fn len(&self) -> usize {
        self.by_field.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_field.is_empty()
    }
}

impl FromIterator<(FieldId, AppearanceString)> for AppearanceProperties {
    fn from_iter<T: IntoIterator<Item = (FieldId, AppearanceString)>>(iter: T) -> Self {
        Self { by_field: iter.into_iter().collect() }
    }
}

/// Returns the `/AcroForm` dictionary, following a reference if needed.
pub(crate) fn form_dict(doc: &Document) -> Result<Option<&Dictionary>, AcroFormError> {
    let root = doc.catalog()?;
    let form = match root.get(b"AcroForm") {
        Ok(Object::Reference(id)) => doc.get_dictionary(*id)?,
        Ok(Object::Dictionary(dict)) => dict,
        Ok(other) => {
            return Err(AcroFormError::Malformed(format!(
                "/AcroForm is a {}, expected a dictionary",
                other.enum_variant()
            )));
        }
        Err(_) => return Ok(None),
    };
    Ok(Some(form))
}

/// Reads the field catalog from `/AcroForm /Fields`, in document order.
pub fn extract_catalog(doc: &Document) -> Result<CatalogOutcome, AcroFormError> {
    let Some(form) = form_dict(doc)? else {
        log::info!("Template has no /AcroForm");
        return Ok(CatalogOutcome::NoFormFields);
    };
    let entries = match form.get(b"Fields") {
        Ok(Object::Reference(id)) => doc.get_object(*id)?.as_array()?,
        Ok(Object::Array(entries)) => entries,
        Ok(other) => {
            return Err(AcroFormError::Malformed(format!(
                "/Fields is a {}, expected an array",
                other.enum_variant()
            )));
        }
        Err(_) => return Ok(CatalogOutcome::NoFormFields),
    };

    let mut fields = Vec::with_capacity(entries.len());
    for (index, entry) in entries.iter().enumerate() {
        let field = match entry {
            Object::Reference(id) => doc.get_dictionary(*id)?,
            Object::Dictionary(dict) => dict,
            other => {
                log::warn!("/Fields entry {} is a {}, skipping", index, other.enum_variant());
                continue;
            }
        };
        match field.get(b"T") {
            Ok(name) => fields.push(widgets::field_id(name)?),
            Err(_) => log::warn!("/Fields entry {} has no /T, skipping", index),
        }
    }

    if fields.is_empty() {
        return Ok(CatalogOutcome::NoFormFields);
    }
    log::debug!("Extracted {} form fields", fields.len());
    Ok(CatalogOutcome::Fields(FieldCatalog::new(fields)))
}

/// Records the `/DA` string of every named widget on every page.
///
/// The annotation's own `/DA` is preferred over its field dictionary's. When a
/// field appears more than once, the last occurrence in page order wins.
pub fn capture_appearances(doc: &Document) -> Result<AppearanceProperties, AcroFormError> {
    let mut by_field = HashMap::new();
    for widget in collect_widgets(doc)? {
        let annotation = widgets::dict(doc, widget.annotation)?;
        let da = match annotation.get(b"DA") {
            Ok(da) => Some(da),
            Err(_) => widgets::dict(doc, widget.field)?.get(b"DA").ok(),
        };
        if let Some(Object::String(bytes, _)) = da {
            by_field.insert(widget.name, AppearanceString::new(bytes.clone()));
        }
    }
    Ok(AppearanceProperties { by_field })
}
