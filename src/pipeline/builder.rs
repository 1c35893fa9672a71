use super::config::{ExecutorKind, MergeMode};
use super::orchestrator::{CancelFlag, FillPipeline, OpenHook};
use crate::error::PipelineError;
use crate::filename::FilenameComposer;
use crate::render::{DocumentRenderer, FormTemplate};
use crate::rename::FieldMapping;
use formfill_acroform::MissingValuePolicy;
use formfill_source::{RecordSource, RowSelection};
use formfill_types::{ColumnName, DataSet};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// A builder for creating a `FillPipeline`.
pub struct FillPipelineBuilder {
    template: Option<FormTemplate>,
    sources: Vec<DataSet>,
    merge_mode: MergeMode,
    name_columns: Vec<ColumnName>,
    output_dir: PathBuf,
    missing_policy: MissingValuePolicy,
    executor: ExecutorKind,
    rename: Option<FieldMapping>,
    rename_pairs: Vec<(String, String)>,
    cancel: CancelFlag,
    open_hook: Option<Arc<dyn OpenHook>>,
}

impl Default for FillPipelineBuilder {
    fn default() -> Self {
        Self {
            template: None,
            sources: Vec::new(),
            merge_mode: MergeMode::default(),
            name_columns: Vec::new(),
            output_dir: PathBuf::from("."),
            missing_policy: MissingValuePolicy::default(),
            executor: ExecutorKind::default(),
            rename: None,
            rename_pairs: Vec::new(),
            cancel: CancelFlag::new(),
            open_hook: None,
        }
    }
}

impl FillPipelineBuilder {
    pub fn new() -> Self {
        Default::default()
    }

    /// Loads the template from disk. Fails with `TemplateUnreadable`.
    pub fn with_template_file<P: AsRef<Path>>(mut self, path: P) -> Result<Self, PipelineError> {
        self.template = Some(FormTemplate::load(path)?);
        Ok(self)
    }

    /// Uses an already loaded template.
    pub fn with_template(mut self, template: FormTemplate) -> Self {
        self.template = Some(template);
        self
    }

    /// Drains `source` and keeps the selected rows as one merge input.
    pub fn with_source<S: RecordSource>(
        mut self,
        mut source: S,
        selection: &RowSelection,
    ) -> Result<Self, PipelineError> {
        let name = source.name().to_string();
        let data = source.read_all()?;
        let data = selection
            .apply(&data)
            .map_err(|e| PipelineError::from_selection(&name, e))?;
        log::info!("Source '{}': {} records, {} columns", name, data.len(), data.columns().len());
        self.sources.push(data);
        Ok(self)
    }

    /// Adds a merge input that is already in memory.
    pub fn with_data_set(mut self, data: DataSet) -> Self {
        self.sources.push(data);
        self
    }

    pub fn with_merge_mode(mut self, mode: MergeMode) -> Self {
        self.merge_mode = mode;
        self
    }

    /// The columns, in order, whose values make up each output file name.
    pub fn with_name_columns<I, C>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = C>,
        C: Into<ColumnName>,
    {
        self.name_columns = columns.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_output_dir<P: AsRef<Path>>(mut self, dir: P) -> Self {
        self.output_dir = dir.as_ref().to_path_buf();
        self
    }

    pub fn with_missing_policy(mut self, policy: MissingValuePolicy) -> Self {
        self.missing_policy = policy;
        self
    }

    pub fn with_executor(mut self, executor: ExecutorKind) -> Self {
        self.executor = executor;
        self
    }

    /// Renames template fields before filling. The mapping must be finalized.
    pub fn with_rename_mapping(mut self, mapping: FieldMapping) -> Self {
        self.rename = Some(mapping);
        self
    }

    /// Renames template fields from `old -> new` pairs, resolved against the
    /// template's catalog at `build()`.
    pub fn with_rename_pairs<I>(mut self, pairs: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        self.rename_pairs.extend(pairs);
        self
    }

    /// Shares a flag that stops the batch before the next record when raised.
    pub fn with_cancel_flag(mut self, flag: CancelFlag) -> Self {
        self.cancel = flag;
        self
    }

    /// Called for every written file. Its failures are logged and ignored.
    pub fn with_open_hook(mut self, hook: Arc<dyn OpenHook>) -> Self {
        self.open_hook = Some(hook);
        self
    }

    /// Consumes the builder and creates the `FillPipeline`.
    pub fn build(mut self) -> Result<FillPipeline, PipelineError> {
        let mut template = self.template.take().ok_or_else(|| {
            PipelineError::Config(
                "No template has been configured. Use `with_template_file` or `with_template`."
                    .to_string(),
            )
        })?;
        if self.sources.is_empty() {
            return Err(PipelineError::Config(
                "No data sources have been configured. Use `with_source` or `with_data_set`."
                    .to_string(),
            ));
        }

        let composer = FilenameComposer::new(std::mem::take(&mut self.name_columns))?;
        if let Some(unknown) = composer
            .columns()
            .iter()
            .find(|c| !self.sources.iter().any(|s| s.columns().contains(*c)))
        {
            return Err(PipelineError::UnknownColumn(unknown.to_string()));
        }

        let mapping = match self.rename.take() {
            Some(mapping) => Some(mapping),
            None if !self.rename_pairs.is_empty() => {
                let pairs = self.rename_pairs.iter().map(|(o, n)| (o.as_str(), n.as_str()));
                Some(FieldMapping::from_pairs(template.catalog(), pairs)?.finalize())
            }
            None => None,
        };
        if let Some(mapping) = mapping {
            let (renamed, diff) = template.rename(&mapping)?;
            log::info!("Renamed template fields:\n{}", diff);
            template = renamed;
        }

        let renderer = DocumentRenderer::new(template).with_missing_policy(self.missing_policy);
        Ok(FillPipeline::new(
            renderer,
            self.sources,
            self.merge_mode,
            composer,
            self.output_dir,
            self.executor.into_executor(),
            self.cancel,
            self.open_hook,
        ))
    }
}
