use lopdf::{dictionary, Dictionary, Document, Object};
use std::path::{Path, PathBuf};

pub const DEFAULT_APPEARANCE: &str = "/Helv 10 Tf 0 g";

/// A merged field/widget dictionary for a text field.
pub fn text_widget(name: &str) -> Dictionary {
    dictionary! {
        "Type" => "Annot",
        "Subtype" => "Widget",
        "FT" => "Tx",
        "T" => Object::string_literal(name),
        "Rect" => vec![50.0.into(), 700.0.into(), 250.0.into(), 720.0.into()],
        "DA" => Object::string_literal(DEFAULT_APPEARANCE),
    }
}

/// A text widget that already carries a value.
pub fn prefilled_widget(name: &str, value: &str) -> Dictionary {
    let mut widget = text_widget(name);
    widget.set("V", Object::string_literal(value));
    widget
}

/// A one-page form whose `/AcroForm /Fields` lists `widgets` in order.
pub fn form_document(widgets: Vec<Dictionary>) -> Document {
    let mut doc = Document::with_version("1.7");
    let pages_id = doc.new_object_id();
    let annots: Vec<Object> = widgets
        .into_iter()
        .map(|w| Object::Reference(doc.add_object(w)))
        .collect();
    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "MediaBox" => vec![0.0.into(), 0.0.into(), 612.0.into(), 792.0.into()],
        "Annots" => annots.clone(),
    });
    doc.objects.insert(
        pages_id,
        dictionary! { "Type" => "Pages", "Kids" => vec![page_id.into()], "Count" => 1_i64 }.into(),
    );
    let form_id = doc.add_object(dictionary! { "Fields" => annots });
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
        "AcroForm" => form_id,
    });
    doc.trailer.set("Root", catalog_id);
    doc
}

/// A form with one parent field whose two kid widgets sit on separate pages.
pub fn form_with_kids(name: &str) -> Document {
    let mut doc = Document::with_version("1.7");
    let pages_id = doc.new_object_id();
    let parent_id = doc.add_object(dictionary! {
        "FT" => "Tx",
        "T" => Object::string_literal(name),
        "DA" => Object::string_literal(DEFAULT_APPEARANCE),
    });
    let mut kids = Vec::new();
    let mut pages = Vec::new();
    for _ in 0..2 {
        let kid_id = doc.add_object(dictionary! {
            "Type" => "Annot",
            "Subtype" => "Widget",
            "Parent" => parent_id,
            "Rect" => vec![50.0.into(), 700.0.into(), 250.0.into(), 720.0.into()],
        });
        kids.push(Object::Reference(kid_id));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "MediaBox" => vec![0.0.into(), 0.0.into(), 612.0.into(), 792.0.into()],
            "Annots" => vec![Object::Reference(kid_id)],
        });
        pages.push(Object::Reference(page_id));
    }
    if let Ok(parent) = doc.get_dictionary_mut(parent_id) {
        parent.set("Kids", kids);
    }
    doc.objects.insert(
        pages_id,
        dictionary! { "Type" => "Pages", "Kids" => pages, "Count" => 2_i64 }.into(),
    );
    let form_id = doc.add_object(dictionary! { "Fields" => vec![Object::Reference(parent_id)] });
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
        "AcroForm" => form_id,
    });
    doc.trailer.set("Root", catalog_id);
    doc
}

/// A one-page document with no `/AcroForm` at all.
pub fn plain_document() -> Document {
    let mut doc = Document::with_version("1.7");
    let pages_id = doc.new_object_id();
    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "MediaBox" => vec![0.0.into(), 0.0.into(), 612.0.into(), 792.0.into()],
    });
    doc.objects.insert(
        pages_id,
        dictionary! { "Type" => "Pages", "Kids" => vec![page_id.into()], "Count" => 1_i64 }.into(),
    );
    let catalog_id = doc.add_object(dictionary! { "Type" => "Catalog", "Pages" => pages_id });
    doc.trailer.set("Root", catalog_id);
    doc
}

pub fn text_form(fields: &[&str]) -> Document {
    form_document(fields.iter().map(|f| text_widget(f)).collect())
}

/// Saves `doc` as `<dir>/<name>`.
pub fn write_pdf(dir: &Path, name: &str, mut doc: Document) -> PathBuf {
    let path = dir.join(name);
    let mut bytes = Vec::new();
    doc.save_to(&mut bytes).expect("test document should serialize");
    std::fs::write(&path, bytes).expect("test document should be written");
    path
}

pub fn write_csv(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, contents).expect("test CSV should be written");
    path
}
