//! AcroForm utilities for filling PDF templates.
//!
//! This crate provides the low-level form manipulation using lopdf:
//! - Field catalog extraction from `/AcroForm /Fields`
//! - Appearance-string capture across every page's annotations
//! - Field renaming and per-record value binding
//!
//! Nothing here clones documents; isolation between renders is the caller's job.

mod catalog;
mod error;
mod fill;
pub mod text;
pub mod widgets;

pub use catalog::{
    AppearanceProperties, AppearanceString, CatalogOutcome, FieldCatalog, capture_appearances,
    extract_catalog,
};
pub use error::AcroFormError;
pub use fill::{BindStats, MissingValuePolicy, bind_record, rename_fields, set_need_appearances};

use lopdf::Document;
use std::path::Path;

/// Parses a template from disk.
pub fn load_template<P: AsRef<Path>>(path: P) -> Result<Document, AcroFormError> {
    let path = path.as_ref();
    log::debug!("Loading template from {}", path.display());
    let bytes = std::fs::read(path)?;
    load_template_mem(&bytes)
}

/// Parses a template from memory.
pub fn load_template_mem(bytes: &[u8]) -> Result<Document, AcroFormError> {
    Ok(Document::load_mem(bytes)?)
}
