//! In-place mutations of a form: the regenerate-appearances flag, field
//! renaming and value binding.
//!
//! Every function here mutates the `Document` it is given. Callers that render
//! many records must hand each call its own copy of the template.

use crate::catalog::AppearanceProperties;
use crate::error::AcroFormError;
use crate::text;
use crate::widgets::{self, collect_widgets, DictLocation};
use formfill_types::{FieldId, TabularRecord};
use lopdf::{Document, Object};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// What to do with a field whose record value is missing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MissingValuePolicy {
    /// Overwrite the field with an empty value so no stale content survives.
    #[default]
    Blank,
    /// Leave whatever value the template already carries.
    LeaveUntouched,
}

/// Counters describing what a bind changed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BindStats {
    /// Widgets that received a value.
    pub filled: usize,
    /// Widgets blanked because their value was missing.
    pub blanked: usize,
    /// Widgets whose field had no column in the record.
    pub unmatched: usize,
}

/// Sets `/NeedAppearances true` on the form so viewers rebuild field glyphs.
///
/// Returns `false` when the document has no `/AcroForm`.
pub fn set_need_appearances(doc: &mut Document) -> Result<bool, AcroFormError> {
    let root_id = doc.trailer.get(b"Root")?.as_reference()?;
    let form_id = match doc.get_dictionary(root_id)?.get(b"AcroForm") {
        Ok(Object::Reference(id)) => Some(*id),
        Ok(Object::Dictionary(_)) => None,
        _ => return Ok(false),
    };
    let form = match form_id {
        Some(id) => doc.get_dictionary_mut(id)?,
        None => doc
            .get_dictionary_mut(root_id)?
            .get_mut(b"AcroForm")?
            .as_dict_mut()?,
    };
    form.set("NeedAppearances", Object::Boolean(true));
    Ok(true)
}

/// Rewrites `/T` of every field dictionary whose name is a key of `renames`.
///
/// Field dictionaries reachable from both `/Fields` and a page are visited
/// once, and all names are read before any is written, so swaps such as
/// `A -> B, B -> A` come out right. Returns the number of dictionaries changed.
pub fn rename_fields(
    doc: &mut Document,
    renames: &HashMap<FieldId, FieldId>,
) -> Result<usize, AcroFormError> {
    let mut seen = HashSet::new();
    let mut targets: Vec<(DictLocation, FieldId)> = Vec::new();

    for location in form_field_locations(doc)? {
        if let Ok(name) = widgets::dict(doc, location)?.get(b"T") {
            let name = widgets::field_id(name)?;
            if seen.insert(location) {
                targets.push((location, name));
            }
        }
    }
    for widget in collect_widgets(doc)? {
        if seen.insert(widget.field) {
            targets.push((widget.field, widget.name));
        }
    }

    let mut changed = 0;
    for (location, name) in targets {
        let Some(new_name) = renames.get(&name) else {
            continue;
        };
        if *new_name == name {
            continue;
        }
        log::debug!("Renaming field '{}' to '{}'", name, new_name);
        widgets::dict_mut(doc, location)?.set("T", text::encode_text(new_name.as_str()));
        changed += 1;
    }
    Ok(changed)
}

/// Indirect field dictionaries listed in `/AcroForm /Fields`.
fn form_field_locations(doc: &Document) -> Result<Vec<DictLocation>, AcroFormError> {
    let Some(form) = crate::catalog::form_dict(doc)? else {
        return Ok(Vec::new());
    };
    let entries = match form.get(b"Fields") {
        Ok(Object::Reference(id)) => doc.get_object(*id)?.as_array()?,
        Ok(Object::Array(entries)) => entries,
        _ => return Ok(Vec::new()),
    };
    Ok(entries
        .iter()
        .filter_map(|entry| entry.as_reference().ok())
        .map(DictLocation::Object)
        .collect())
}

/// Binds one record onto the form.
///
/// Every widget whose field name is a column of `record` is updated: a present
/// value is written to the field's `/V` and the captured appearance string, if
/// any, is copied onto the widget's `/DA`. A missing value is handled according
/// to `policy`. Widgets without a matching column are not touched.
pub fn bind_record(
    doc: &mut Document,
    record: &TabularRecord,
    appearances: &AppearanceProperties,
    policy: MissingValuePolicy,
) -> Result<BindStats, AcroFormError> {
    let mut stats = BindStats::default();

    for widget in collect_widgets(doc)? {
        let Some(value) = record.get(widget.name.as_str()) else {
            stats.unmatched += 1;
            continue;
        };
        let is_button = is_button_field(doc, widget.field)?;

        match value.as_text() {
            Some(rendered) => {
                if is_button {
                    let state = button_state(doc, widget.annotation, &rendered)?;
                    widgets::dict_mut(doc, widget.field)?.set("V", Object::Name(rendered.into_bytes()));
                    widgets::dict_mut(doc, widget.annotation)?.set("AS", Object::Name(state));
                } else {
                    widgets::dict_mut(doc, widget.field)?.set("V", text::encode_text(&rendered));
                }
                if let Some(da) = appearances.get(widget.name.as_str()) {
                    widgets::dict_mut(doc, widget.annotation)?.set(
                        "DA",
                        Object::String(da.as_bytes().to_vec(), lopdf::StringFormat::Literal),
                    );
                }
                stats.filled += 1;
            }
            None => match policy {
                MissingValuePolicy::Blank => {
                    if is_button {
                        widgets::dict_mut(doc, widget.field)?.set("V", Object::Name(OFF.to_vec()));
                        widgets::dict_mut(doc, widget.annotation)?.set("AS", Object::Name(OFF.to_vec()));
                    } else {
                        widgets::dict_mut(doc, widget.field)?.set("V", text::encode_text(""));
                    }
                    stats.blanked += 1;
                }
                MissingValuePolicy::LeaveUntouched => {}
            },
        }
    }

    log::debug!(
        "Bound record: {} filled, {} blanked, {} unmatched",
        stats.filled,
        stats.blanked,
        stats.unmatched
    );
    Ok(stats)
}

const OFF: &[u8] = b"Off";

fn is_button_field(doc: &Document, field: DictLocation) -> Result<bool, AcroFormError> {
    let dict = widgets::dict(doc, field)?;
    Ok(matches!(dict.get(b"FT").and_then(Object::as_name), Ok(b"Btn")))
}

/// The `/AS` a button widget should show for `value`: the value itself when the
/// widget has an "on" appearance of that name (or declares no appearances),
/// otherwise `Off`. This keeps only the matching member of a radio group on.
fn button_state(doc: &Document, annotation: DictLocation, value: &str) -> Result<Vec<u8>, AcroFormError> {
    let dict = widgets::dict(doc, annotation)?;
    let Ok(ap) = dict.get(b"AP") else {
        return Ok(value.as_bytes().to_vec());
    };
    let (_, ap) = doc.dereference(ap)?;
    let normal = match ap.as_dict().and_then(|ap| ap.get(b"N")) {
        Ok(normal) => doc.dereference(normal)?.1,
        Err(_) => return Ok(value.as_bytes().to_vec()),
    };
    match normal.as_dict() {
        Ok(states) if states.has(value.as_bytes()) => Ok(value.as_bytes().to_vec()),
        Ok(_) => Ok(OFF.to_vec()),
        Err(_) => Ok(value.as_bytes().to_vec()),
    }
}
