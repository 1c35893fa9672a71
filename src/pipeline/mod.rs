//! Batch fill orchestration.
//!
//! - [`FillPipelineBuilder`]: Fluent builder for configuring a fill job
//! - [`FillPipeline`]: Merges the sources and renders one document per record
//! - [`JobConfig`]: The same configuration, read from JSON
//!
//! # Example
//!
//! ```ignore
//! use formfill::{FillPipelineBuilder, MergeMode};
//! use formfill_source::{CsvRecordSource, RowSelection};
//!
//! let pipeline = FillPipelineBuilder::new()
//!     .with_template_file("form.pdf")?
//!     .with_source(CsvRecordSource::from_path("people.csv")?, &RowSelection::All)?
//!     .with_source(CsvRecordSource::from_path("dates.csv")?, &RowSelection::All)?
//!     .with_merge_mode(MergeMode::CrossProduct)
//!     .with_name_columns(["Name", "Date"])
//!     .with_output_dir("out")
//!     .build()?;
//!
//! let report = pipeline.run()?;
//! ```

mod builder;
pub mod config;
mod orchestrator;

pub use builder::FillPipelineBuilder;
pub use config::{ExecutorKind, JobConfig, MergeMode, SourceConfig};
pub use orchestrator::{
    BatchReport, CancelFlag, FillOutcome, FillPipeline, OpenHook, RecordOutcome, RecordStatus,
};
