use super::builder::FillPipelineBuilder;
use crate::error::PipelineError;
pub use crate::merge::MergeMode;
use formfill_acroform::MissingValuePolicy;
use formfill_executor::{ExecutorImpl, SyncExecutor};
use formfill_source::{CsvRecordSource, RowSelection};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Selects how records are scheduled for rendering.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ExecutorKind {
    /// One record after another on the calling thread.
    Sync,
    /// Records rendered concurrently on the rayon pool. Falls back to `Sync`
    /// when the crate is built without the `rayon-executor` feature.
    ///
    /// When two records compose the same file name, which one survives is
    /// arbitrary here; under `Sync` the later record wins.
    #[default]
    Rayon,
}

impl ExecutorKind {
    pub fn into_executor(self) -> ExecutorImpl {
        match self {
            ExecutorKind::Sync => ExecutorImpl::Sync(SyncExecutor::new()),
            #[cfg(feature = "rayon-executor")]
            ExecutorKind::Rayon => ExecutorImpl::Rayon(formfill_executor::RayonExecutor::new()),
            #[cfg(not(feature = "rayon-executor"))]
            ExecutorKind::Rayon => {
                log::warn!("Built without rayon support, rendering sequentially");
                ExecutorImpl::Sync(SyncExecutor::new())
            }
        }
    }
}

/// One tabular input of a job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SourceConfig {
    pub path: PathBuf,
    /// `"all"` or a list of 0-based row indices such as `"0, 2"`.
    #[serde(default)]
    pub rows: Option<String>,
}

/// A complete fill job, as read from a JSON file.
///
/// ```json
/// {
///   "template": "form.pdf",
///   "sources": [{ "path": "people.csv" }, { "path": "dates.csv", "rows": "0 2" }],
///   "merge": "cross-product",
///   "name_columns": ["Name", "Date"],
///   "output_dir": "out",
///   "rename": { "Name": "FullName" },
///   "missing": "blank",
///   "parallel": true
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct JobConfig {
    pub template: PathBuf,
    pub sources: Vec<SourceConfig>,
    #[serde(default)]
    pub merge: MergeMode,
    #[serde(default)]
    pub name_columns: Vec<String>,
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
    /// Field renames applied to the template before filling, `old -> new`.
    #[serde(default)]
    pub rename: BTreeMap<String, String>,
    #[serde(default)]
    pub missing: MissingValuePolicy,
    #[serde(default = "default_parallel")]
    pub parallel: bool,
}

fn default_output_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_parallel() -> bool {
    true
}

impl JobConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, PipelineError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| PipelineError::JobFileUnreadable {
            path: path.to_path_buf(),
            source,
        })?;
        let config: JobConfig =
            serde_json::from_str(&text).map_err(|source| PipelineError::JobFileInvalid {
                path: path.to_path_buf(),
                source,
            })?;
        log::debug!("Loaded job configuration from {}", path.display());
        Ok(config)
    }

    /// Relative paths in the job are resolved against `base`.
    pub fn resolve_paths(mut self, base: &Path) -> Self {
        let resolve = |p: &mut PathBuf| {
            if p.is_relative() {
                *p = base.join(&*p);
            }
        };
        resolve(&mut self.template);
        resolve(&mut self.output_dir);
        for source in &mut self.sources {
            resolve(&mut source.path);
        }
        self
    }

    /// Loads the template and every source and returns a builder ready for `build()`.
    pub fn into_builder(self) -> Result<FillPipelineBuilder, PipelineError> {
        let mut builder = FillPipelineBuilder::new()
            .with_template_file(&self.template)?
            .with_merge_mode(self.merge)
            .with_output_dir(&self.output_dir)
            .with_missing_policy(self.missing)
            .with_executor(if self.parallel { ExecutorKind::Rayon } else { ExecutorKind::Sync })
            .with_name_columns(self.name_columns.iter().map(String::as_str));

        for source in &self.sources {
            let selection = match &source.rows {
                Some(rows) => RowSelection::parse(rows).map_err(|e| {
                    PipelineError::from_selection(&source.path.display().to_string(), e)
                })?,
                None => RowSelection::All,
            };
            builder = builder.with_source(CsvRecordSource::from_path(&source.path)?, &selection)?;
        }

        if !self.rename.is_empty() {
            builder = builder.with_rename_pairs(self.rename);
        }
        Ok(builder)
    }
}
