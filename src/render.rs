//! Templates and the per-record renderer.
//!
//! A [`FormTemplate`] holds the serialized template bytes plus everything read
//! from them once: the field catalog and the appearance strings. Every render
//! parses its own `Document` from those bytes, so no value bound for one record
//! can be seen by another, and renders may run on any thread.

use crate::error::PipelineError;
use crate::rename::{apply_mapping, CatalogDiff, FieldMapping};
use formfill_acroform::{
    bind_record, capture_appearances, extract_catalog, load_template_mem, set_need_appearances,
    AcroFormError, AppearanceProperties, BindStats, CatalogOutcome, FieldCatalog, MissingValuePolicy,
};
use formfill_types::TabularRecord;
use lopdf::Document;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::NamedTempFile;

/// An immutable, cheaply cloneable form template.
#[derive(Debug, Clone)]
pub struct FormTemplate {
    source: PathBuf,
    bytes: Arc<[u8]>,
    catalog: Arc<FieldCatalog>,
    appearances: Arc<AppearanceProperties>,
    has_form_fields: bool,
}

impl FormTemplate {
    /// Reads and parses a template. Any failure is `TemplateUnreadable`.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, PipelineError> {
        let path = path.as_ref();
        let unreadable = |source: AcroFormError| PipelineError::TemplateUnreadable {
            path: path.to_path_buf(),
            source,
        };
        let bytes = fs::read(path).map_err(|e| unreadable(e.into()))?;
        let template = Self::from_bytes(bytes).map_err(unreadable)?;
        log::info!(
            "Loaded template {} with {} fields",
            path.display(),
            template.catalog.len()
        );
        Ok(Self { source: path.to_path_buf(), ..template })
    }

    /// Parses a template held in memory.
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self, AcroFormError> {
        let doc = load_template_mem(&bytes)?;
        Self::analyse(&doc, bytes.into())
    }

    /// Serializes `doc` and takes it as the template.
    pub fn from_document(mut doc: Document) -> Result<Self, AcroFormError> {
        let bytes = serialize(&mut doc)?;
        Self::analyse(&doc, bytes.into())
    }

    fn analyse(doc: &Document, bytes: Arc<[u8]>) -> Result<Self, AcroFormError> {
        let (catalog, has_form_fields) = match extract_catalog(doc)? {
            CatalogOutcome::Fields(catalog) => (catalog, true),
            CatalogOutcome::NoFormFields => (FieldCatalog::default(), false),
        };
        let appearances = capture_appearances(doc)?;
        log::debug!("Captured {} appearance strings", appearances.len());
        Ok(Self {
            source: PathBuf::new(),
            bytes,
            catalog: Arc::new(catalog),
            appearances: Arc::new(appearances),
            has_form_fields,
        })
    }

    /// The path the template was loaded from; empty for in-memory templates.
    pub fn source(&self) -> &Path {
        &self.source
    }

    pub fn catalog(&self) -> &FieldCatalog {
        &self.catalog
    }

    pub fn appearances(&self) -> &AppearanceProperties {
        &self.appearances
    }

    /// False when the template has no form-field container or it is empty.
    pub fn has_form_fields(&self) -> bool {
        self.has_form_fields
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Parses a fresh, independent document from the template bytes.
    pub fn instantiate(&self) -> Result<Document, AcroFormError> {
        load_template_mem(&self.bytes)
    }

    /// Applies a finalized mapping and returns the renamed template with the
    /// diff between the old and new catalog listings.
    pub fn rename(&self, mapping: &FieldMapping) -> Result<(FormTemplate, CatalogDiff), PipelineError> {
        let mut doc = self.instantiate()?;
        apply_mapping(&mut doc, mapping)?;
        let renamed = FormTemplate::from_document(doc)?;
        let diff = CatalogDiff::between(self.catalog.fields(), renamed.catalog.fields());
        Ok((renamed, diff))
    }

    /// Writes the template bytes to `path` through a temporary file.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), PipelineError> {
        let path = path.as_ref();
        write_atomically(path, &self.bytes).map_err(|source| PipelineError::SaveFailure {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// A document with one record bound onto it.
#[derive(Debug)]
pub struct RenderedDocument {
    document: Document,
    stats: BindStats,
}

impl RenderedDocument {
    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn stats(&self) -> BindStats {
        self.stats
    }

    /// Serializes the document in memory.
    pub fn to_bytes(&mut self) -> io::Result<Vec<u8>> {
        serialize(&mut self.document).map_err(|e| io::Error::other(e.to_string()))
    }
}

/// Binds records onto independent copies of a template.
#[derive(Debug, Clone)]
pub struct DocumentRenderer {
    template: FormTemplate,
    policy: MissingValuePolicy,
}

impl DocumentRenderer {
    pub fn new(template: FormTemplate) -> Self {
        Self { template, policy: MissingValuePolicy::default() }
    }

    pub fn with_missing_policy(mut self, policy: MissingValuePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn template(&self) -> &FormTemplate {
        &self.template
    }

    /// Renders one record onto a fresh copy of the template.
    pub fn render(&self, record: &TabularRecord) -> Result<RenderedDocument, PipelineError> {
        let mut document = self.template.instantiate()?;
        if !set_need_appearances(&mut document)? {
            log::debug!("Template has no /AcroForm, NeedAppearances not set");
        }
        let stats = bind_record(&mut document, record, self.template.appearances(), self.policy)?;
        Ok(RenderedDocument { document, stats })
    }

    /// Renders record `index` and writes it to `path`.
    ///
    /// The file at `path` is either the complete new document or untouched.
    pub fn render_to_file(
        &self,
        index: usize,
        record: &TabularRecord,
        path: &Path,
    ) -> Result<BindStats, PipelineError> {
        let mut rendered = self.render(record)?;
        let write_failure = |source| PipelineError::WriteFailure {
            index,
            path: path.to_path_buf(),
            source,
        };
        let bytes = rendered.to_bytes().map_err(write_failure)?;
        write_atomically(path, &bytes).map_err(write_failure)?;
        log::debug!("Wrote record {} to {}", index, path.display());
        Ok(rendered.stats())
    }
}

fn serialize(doc: &mut Document) -> Result<Vec<u8>, AcroFormError> {
    let mut bytes = Vec::new();
    doc.save_to(&mut bytes)
        .map_err(|e| AcroFormError::Malformed(format!("serialization failed: {e}")))?;
    Ok(bytes)
}

/// Writes `bytes` to a temporary file next to `path`, then renames it over `path`.
pub fn write_atomically(path: &Path, bytes: &[u8]) -> io::Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut file = NamedTempFile::new_in(dir)?;
    file.write_all(bytes)?;
    file.as_file().sync_all()?;
    file.persist(path).map_err(|e| e.error)?;
    Ok(())
}
