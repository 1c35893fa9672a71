//! Catalog export as CSV with a `Field name` header.

use crate::error::PipelineError;
use crate::render::write_atomically;
use formfill_acroform::FieldCatalog;
use formfill_types::FieldId;
use std::io::Write;
use std::path::Path;

pub const LISTING_HEADER: &str = "Field name";

/// Writes the catalog as a one-column CSV, in catalog order.
pub fn write_catalog_csv<W: Write>(catalog: &FieldCatalog, out: W) -> Result<(), PipelineError> {
    let mut writer = csv::Writer::from_writer(out);
    writer.write_record([LISTING_HEADER])?;
    for field in catalog.iter() {
        writer.write_record([field.as_str()])?;
    }
    writer.flush()?;
    Ok(())
}

/// Writes the catalog CSV to `path` through a temporary file.
pub fn save_catalog_csv(catalog: &FieldCatalog, path: &Path) -> Result<(), PipelineError> {
    let mut bytes = Vec::new();
    write_catalog_csv(catalog, &mut bytes)?;
    write_atomically(path, &bytes).map_err(|source| PipelineError::SaveFailure {
        path: path.to_path_buf(),
        source,
    })?;
    log::info!("Wrote {} field names to {}", catalog.len(), path.display());
    Ok(())
}

/// Reads a listing written by [`write_catalog_csv`] back into a catalog.
pub fn read_catalog_csv<R: std::io::Read>(input: R) -> Result<FieldCatalog, PipelineError> {
    let mut reader = csv::Reader::from_reader(input);
    let header = reader.headers()?;
    if header.get(0) != Some(LISTING_HEADER) {
        return Err(PipelineError::Config(format!(
            "listing must start with a '{LISTING_HEADER}' column"
        )));
    }
    let mut fields = Vec::new();
    for row in reader.records() {
        if let Some(name) = row?.get(0) {
            fields.push(FieldId::new(name));
        }
    }
    Ok(FieldCatalog::new(fields))
}
