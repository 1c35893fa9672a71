//! Walks the page tree and resolves every field widget to the dictionary that
//! owns its name.
//!
//! Annotations live in a page's `/Annots` array, which may be inline or an
//! indirect object, and each entry may itself be inline or a reference. A
//! [`DictLocation`] records where a dictionary lives so that the same walk can
//! be replayed against a mutable borrow of the document.

use crate::error::AcroFormError;
use crate::text;
use formfill_types::FieldId;
use lopdf::{Dictionary, Document, Object, ObjectId};

/// Where a dictionary lives inside a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DictLocation {
    /// An indirect object.
    Object(ObjectId),
    /// Entry `index` of an inline `/Annots` array on the page `page_id`.
    PageAnnots { page_id: ObjectId, index: usize },
    /// Entry `index` of an indirect `/Annots` array object.
    AnnotsArray { array_id: ObjectId, index: usize },
}

/// One widget annotation together with the field dictionary holding its `/T`.
///
/// For merged field/widget dictionaries `annotation == field`.
#[derive(Debug, Clone, PartialEq)]
pub struct Widget {
    pub page: u32,
    pub annotation: DictLocation,
    pub field: DictLocation,
    pub name: FieldId,
}

/// Collects every named widget in page order, then annotation order.
pub fn collect_widgets(doc: &Document) -> Result<Vec<Widget>, AcroFormError> {
    let mut widgets = Vec::new();

    for (page_number, page_id) in doc.get_pages() {
        let page = doc.get_dictionary(page_id)?;
        let Ok(annots) = page.get(b"Annots") else {
            continue;
        };

        let (entries, array_id) = match annots {
            Object::Array(entries) => (entries, None),
            Object::Reference(id) => (doc.get_object(*id)?.as_array()?, Some(*id)),
            other => {
                log::warn!(
                    "Page {} has an /Annots entry of type {}, skipping",
                    page_number,
                    other.enum_variant()
                );
                continue;
            }
        };

        for (index, entry) in entries.iter().enumerate() {
            let (annotation, location) = match entry {
                Object::Reference(id) => match doc.get_dictionary(*id) {
                    Ok(dict) => (dict, DictLocation::Object(*id)),
                    Err(e) => {
                        log::debug!("Skipping annotation {:?} on page {}: {}", id, page_number, e);
                        continue;
                    }
                },
                Object::Dictionary(dict) => {
                    let location = match array_id {
                        Some(array_id) => DictLocation::AnnotsArray { array_id, index },
                        None => DictLocation::PageAnnots { page_id, index },
                    };
                    (dict, location)
                }
                _ => continue,
            };

            match resolve_field(doc, annotation, location)? {
                Some((field, name)) => widgets.push(Widget {
                    page: page_number,
                    annotation: location,
                    field,
                    name,
                }),
                None => log::debug!("Annotation {} on page {} has no field name", index, page_number),
            }
        }
    }

    Ok(widgets)
}

/// Finds the dictionary carrying `/T`: the annotation itself, or its `/Parent`.
fn resolve_field(
    doc: &Document,
    annotation: &Dictionary,
    location: DictLocation,
) -> Result<Option<(DictLocation, FieldId)>, AcroFormError> {
    if let Ok(name) = annotation.get(b"T") {
        return Ok(Some((location, field_id(name)?)));
    }
    let Ok(parent_id) = annotation.get(b"Parent").and_then(Object::as_reference) else {
        return Ok(None);
    };
    let parent = doc.get_dictionary(parent_id)?;
    match parent.get(b"T") {
        Ok(name) => Ok(Some((DictLocation::Object(parent_id), field_id(name)?))),
        Err(_) => Ok(None),
    }
}

pub(crate) fn field_id(name: &Object) -> Result<FieldId, AcroFormError> {
    Ok(text::raw_field_name(name)?.strip()?)
}

/// Resolves a location to its dictionary.
pub fn dict(doc: &Document, location: DictLocation) -> Result<&Dictionary, AcroFormError> {
    let dict = match location {
        DictLocation::Object(id) => doc.get_dictionary(id)?,
        DictLocation::PageAnnots { page_id, index } => {
            let annots = doc.get_dictionary(page_id)?.get(b"Annots")?.as_array()?;
            entry(annots, index)?.as_dict()?
        }
        DictLocation::AnnotsArray { array_id, index } => {
            entry(doc.get_object(array_id)?.as_array()?, index)?.as_dict()?
        }
    };
    Ok(dict)
}

/// Resolves a location to its dictionary for in-place mutation.
pub fn dict_mut(doc: &mut Document, location: DictLocation) -> Result<&mut Dictionary, AcroFormError> {
    let dict = match location {
        DictLocation::Object(id) => doc.get_dictionary_mut(id)?,
        DictLocation::PageAnnots { page_id, index } => {
            let annots = doc.get_dictionary_mut(page_id)?.get_mut(b"Annots")?.as_array_mut()?;
            entry_mut(annots, index)?.as_dict_mut()?
        }
        DictLocation::AnnotsArray { array_id, index } => {
            entry_mut(doc.get_object_mut(array_id)?.as_array_mut()?, index)?.as_dict_mut()?
        }
    };
    Ok(dict)
}

fn entry(array: &[Object], index: usize) -> Result<&Object, AcroFormError> {
    array
        .get(index)
        .ok_or_else(|| AcroFormError::Malformed(format!("annotation index {index} out of range")))
}

fn entry_mut(array: &mut [Object], index: usize) -> Result<&mut Object, AcroFormError> {
    array
        .get_mut(index)
        .ok_or_else(|| AcroFormError::Malformed(format!("annotation index {index} out of range")))
}
