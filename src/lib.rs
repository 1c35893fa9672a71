//! Fills PDF form templates from tabular data.
//!
//! The crate reads a template's field catalog, merges one or more record sets
//! (cross-product or index-aligned), and renders one filled document per
//! merged record. Fields can be renamed in the template first, through a
//! reviewed [`FieldMapping`].
//!
//! Low-level document work lives in `formfill-acroform`; record sources in
//! `formfill-source`; scheduling in `formfill-executor`.

pub mod error;
pub mod filename;
pub mod listing;
pub mod merge;
pub mod pipeline;
pub mod prompt;
pub mod render;
pub mod rename;
pub mod split;

pub use error::PipelineError;
pub use filename::{parse_column_selection, FilenameComposer};
pub use merge::{concat_align, cross_product, merge, MergeMode};
pub use pipeline::{
    BatchReport, CancelFlag, ExecutorKind, FillOutcome, FillPipeline, FillPipelineBuilder, JobConfig,
    OpenHook, RecordOutcome, RecordStatus,
};
pub use prompt::{LinePrompter, Prompter};
pub use render::{DocumentRenderer, FormTemplate, RenderedDocument};
pub use rename::{CatalogDiff, FieldMapping, RenameCommand, RenameSession, RenameState};

pub use formfill_acroform::{AppearanceProperties, BindStats, CatalogOutcome, FieldCatalog, MissingValuePolicy};
pub use formfill_source::{CsvRecordSource, RecordSource, RowSelection, VecRecordSource};
pub use formfill_types::{ColumnName, DataSet, FieldId, RawFieldName, TabularRecord, Value};
