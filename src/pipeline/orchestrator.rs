use super::config::MergeMode;
use crate::error::PipelineError;
use crate::filename::FilenameComposer;
use crate::merge::merge;
use crate::render::DocumentRenderer;
use formfill_acroform::BindStats;
use formfill_executor::{Executor, ExecutorImpl};
use formfill_types::{DataSet, TabularRecord};
use log::{info, warn};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

/// A shared stop signal, checked before each record is rendered.
///
/// Records already written when the flag is raised stay on disk untouched.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Something to do with each file after it is written, such as showing it.
pub trait OpenHook: Send + Sync {
    fn open(&self, path: &Path) -> io::Result<()>;
}

/// How the batch as a whole ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FillOutcome {
    /// Every record was attempted, or skipped because of cancellation.
    Completed,
    /// The template has no form fields; nothing was rendered.
    NoFormFields,
}

#[derive(Debug)]
pub enum RecordStatus {
    Written { stats: BindStats },
    Failed(PipelineError),
    Cancelled,
}

/// The result for one merged record.
#[derive(Debug)]
pub struct RecordOutcome {
    pub index: usize,
    /// Where the record was, or would have been, written.
    pub path: Option<PathBuf>,
    pub status: RecordStatus,
}

/// Per-record results of a run, in record order.
#[derive(Debug)]
pub struct BatchReport {
    pub outcome: FillOutcome,
    pub records: Vec<RecordOutcome>,
}

impl BatchReport {
    fn no_form_fields() -> Self {
        Self { outcome: FillOutcome::NoFormFields, records: Vec::new() }
    }

    pub fn written(&self) -> impl Iterator<Item = &Path> {
        self.records.iter().filter_map(|r| match r.status {
            RecordStatus::Written { .. } => r.path.as_deref(),
            _ => None,
        })
    }

    pub fn failures(&self) -> impl Iterator<Item = (usize, &PipelineError)> {
        self.records.iter().filter_map(|r| match &r.status {
            RecordStatus::Failed(e) => Some((r.index, e)),
            _ => None,
        })
    }

    pub fn cancelled(&self) -> usize {
        self.records.iter().filter(|r| matches!(r.status, RecordStatus::Cancelled)).count()
    }

    /// True when no record failed. Cancelled records do not count as failures.
    pub fn is_success(&self) -> bool {
        self.failures().next().is_none()
    }
}

/// Everything one record job needs, cloned into each executor task.
#[derive(Clone)]
struct RecordJob {
    renderer: DocumentRenderer,
    composer: FilenameComposer,
    output_dir: PathBuf,
    cancel: CancelFlag,
    open_hook: Option<Arc<dyn OpenHook>>,
}

impl RecordJob {
    fn run(&self, index: usize, record: TabularRecord) -> RecordOutcome {
        if self.cancel.is_cancelled() {
            return RecordOutcome { index, path: None, status: RecordStatus::Cancelled };
        }
        let Some(name) = self.composer.compose(&record) else {
            warn!("Record {} has no value in any naming column", index);
            return RecordOutcome {
                index,
                path: None,
                status: RecordStatus::Failed(PipelineError::EmptyFilename { index }),
            };
        };
        let path = self.output_dir.join(name);

        let status = match self.renderer.render_to_file(index, &record, &path) {
            Ok(stats) => {
                if let Some(hook) = &self.open_hook {
                    if let Err(e) = hook.open(&path) {
                        warn!("Could not open {}: {}", path.display(), e);
                    }
                }
                RecordStatus::Written { stats }
            }
            Err(e) => {
                warn!("Record {} failed: {}", index, e);
                RecordStatus::Failed(e)
            }
        };
        RecordOutcome { index, path: Some(path), status }
    }
}

/// The batch fill pipeline: merge the sources, then render one document per record.
pub struct FillPipeline {
    renderer: DocumentRenderer,
    sources: Vec<DataSet>,
    merge_mode: MergeMode,
    composer: FilenameComposer,
    output_dir: PathBuf,
    executor: ExecutorImpl,
    cancel: CancelFlag,
    open_hook: Option<Arc<dyn OpenHook>>,
}

impl FillPipeline {
    #[allow(clippy::too_many_arguments)]
    pub(super) fn new(
        renderer: DocumentRenderer,
        sources: Vec<DataSet>,
        merge_mode: MergeMode,
        composer: FilenameComposer,
        output_dir: PathBuf,
        executor: ExecutorImpl,
        cancel: CancelFlag,
        open_hook: Option<Arc<dyn OpenHook>>,
    ) -> Self {
        Self { renderer, sources, merge_mode, composer, output_dir, executor, cancel, open_hook }
    }

    /// Merges the sources under the configured mode without rendering anything.
    pub fn merged_records(&self) -> Result<DataSet, PipelineError> {
        merge(&self.sources, self.merge_mode)
    }

    /// Runs the batch.
    ///
    /// Fails as a whole only for `EmptyMergeResult` or an unusable output
    /// directory. Per-record failures, including `WriteFailure`, are reported in
    /// the returned `BatchReport` and never stop the other records.
    pub fn run(&self) -> Result<BatchReport, PipelineError> {
        if !self.renderer.template().has_form_fields() {
            info!("Template has no form fields, nothing to fill");
            return Ok(BatchReport::no_form_fields());
        }

        let merged = self.merged_records()?;
        std::fs::create_dir_all(&self.output_dir).map_err(|source| PipelineError::OutputDirUnusable {
            path: self.output_dir.clone(),
            source,
        })?;

        let start = Instant::now();
        let job = RecordJob {
            renderer: self.renderer.clone(),
            composer: self.composer.clone(),
            output_dir: self.output_dir.clone(),
            cancel: self.cancel.clone(),
            open_hook: self.open_hook.clone(),
        };
        let items: Vec<(usize, TabularRecord)> = merged.into_records().into_iter().enumerate().collect();
        info!(
            "Rendering {} records with {} ({} workers) into {}",
            items.len(),
            self.executor.name(),
            self.executor.parallelism(),
            self.output_dir.display()
        );

        let records = self
            .executor
            .execute_all(items, move |(index, record)| job.run(index, record));
        let report = BatchReport { outcome: FillOutcome::Completed, records };

        info!(
            "Batch finished in {:.2?}: {} written, {} failed, {} cancelled",
            start.elapsed(),
            report.written().count(),
            report.failures().count(),
            report.cancelled()
        );
        Ok(report)
    }
}
