use formfill_acroform::text::decode_text;
use formfill_acroform::widgets::{self, collect_widgets};
use lopdf::{Document, Object};
use std::collections::BTreeMap;
use std::path::Path;

pub fn load(path: &Path) -> Document {
    let bytes = std::fs::read(path).unwrap_or_else(|e| panic!("{} should exist: {e}", path.display()));
    Document::load_mem(&bytes).unwrap_or_else(|e| panic!("{} should parse: {e}", path.display()))
}

/// Field name to `/V` for every widget, read through its owning field dictionary.
pub fn field_values(doc: &Document) -> BTreeMap<String, String> {
    let mut values = BTreeMap::new();
    for widget in collect_widgets(doc).expect("widgets should resolve") {
        let field = widgets::dict(doc, widget.field).expect("field should resolve");
        let value = match field.get(b"V") {
            Ok(Object::String(bytes, _)) => decode_text(bytes),
            Ok(Object::Name(name)) => String::from_utf8_lossy(name).into_owned(),
            _ => continue,
        };
        values.insert(widget.name.to_string(), value);
    }
    values
}

pub fn field_value(doc: &Document, name: &str) -> Option<String> {
    field_values(doc).remove(name)
}

/// Every widget's `/DA`, in page order.
pub fn appearances(doc: &Document, name: &str) -> Vec<String> {
    collect_widgets(doc)
        .expect("widgets should resolve")
        .into_iter()
        .filter(|w| w.name.as_str() == name)
        .filter_map(|w| {
            let annotation = widgets::dict(doc, w.annotation).ok()?;
            match annotation.get(b"DA").ok()? {
                Object::String(bytes, _) => Some(String::from_utf8_lossy(bytes).into_owned()),
                _ => None,
            }
        })
        .collect()
}

pub fn need_appearances(doc: &Document) -> bool {
    let Ok(catalog) = doc.catalog() else {
        return false;
    };
    let form = match catalog.get(b"AcroForm") {
        Ok(Object::Reference(id)) => doc.get_dictionary(*id).ok(),
        Ok(Object::Dictionary(dict)) => Some(dict),
        _ => None,
    };
    form.and_then(|f| f.get(b"NeedAppearances").ok())
        .and_then(|v| v.as_bool().ok())
        .unwrap_or(false)
}

/// Sorted file names in `dir`.
pub fn file_names(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .expect("directory should be readable")
        .filter_map(Result::ok)
        .map(|e| e.file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}
