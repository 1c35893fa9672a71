//! Command-line front end for formfill.
//!
//! ```bash
//! # List the fields of a template
//! formfill fields form.pdf --csv fields.csv
//!
//! # One document per combination of people and dates
//! formfill fill form.pdf -s people.csv -s dates.csv --name-columns Name,Date -o out
//!
//! # Run a job file
//! formfill fill --config job.json
//!
//! # Rename fields interactively, or with --map old=new
//! formfill rename form.pdf renamed.pdf
//!
//! # Split a CSV into column groups
//! formfill split all.csv parts --group people=Name,City --group dates=Date
//! ```

use clap::{Parser, Subcommand, ValueEnum};
use formfill::prompt::{prompt_name_columns, prompt_row_selection, run_rename_session};
use formfill::split::ColumnSplitter;
use formfill::{
    listing, BatchReport, ColumnName, CsvRecordSource, DataSet, ExecutorKind, FieldMapping,
    FillOutcome, FillPipelineBuilder, FormTemplate, JobConfig, LinePrompter, MergeMode, Prompter,
    MissingValuePolicy, PipelineError, RecordSource, RecordStatus, RowSelection, VecRecordSource,
};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "formfill")]
#[command(about = "Fill PDF form templates from CSV data")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the form fields of a template
    Fields {
        template: PathBuf,

        /// Also write the listing as CSV
        #[arg(long)]
        csv: Option<PathBuf>,
    },

    /// Render one filled document per merged record
    Fill {
        /// Template to fill (not needed with --config)
        template: Option<PathBuf>,

        /// Read the whole job from a JSON file
        #[arg(long, conflicts_with = "template")]
        config: Option<PathBuf>,

        /// CSV data source; repeat for several
        #[arg(short, long = "source")]
        sources: Vec<PathBuf>,

        /// Row selection per source, in source order; asked for when absent
        #[arg(long)]
        rows: Vec<String>,

        #[arg(long, value_enum, default_value_t = MergeArg::CrossProduct)]
        merge: MergeArg,

        /// Columns naming each output file; asked for when absent
        #[arg(long, value_delimiter = ',')]
        name_columns: Vec<String>,

        #[arg(short, long, default_value = ".")]
        out: PathBuf,

        /// Rename a field before filling
        #[arg(long = "rename", value_parser = parse_pair)]
        renames: Vec<(String, String)>,

        /// Keep template values for missing cells instead of blanking them
        #[arg(long)]
        keep_missing: bool,

        /// Render on the calling thread only
        #[arg(long)]
        sequential: bool,
    },

    /// Rename template fields and write the renamed template
    Rename {
        template: PathBuf,
        output: PathBuf,

        /// old=new; without any, fields are renamed interactively
        #[arg(long = "map", value_parser = parse_pair)]
        map: Vec<(String, String)>,
    },

    /// Split a CSV into several CSVs by column groups
    Split {
        input: PathBuf,
        out_dir: PathBuf,

        /// name=col1,col2
        #[arg(long = "group", value_parser = parse_group, required = true)]
        groups: Vec<(String, Vec<String>)>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum MergeArg {
    CrossProduct,
    ConcatAlign,
}

impl From<MergeArg> for MergeMode {
    fn from(arg: MergeArg) -> Self {
        match arg {
            MergeArg::CrossProduct => MergeMode::CrossProduct,
            MergeArg::ConcatAlign => MergeMode::ConcatAlign,
        }
    }
}

fn parse_pair(s: &str) -> Result<(String, String), String> {
    let (old, new) = s.split_once('=').ok_or_else(|| format!("expected old=new, got '{s}'"))?;
    Ok((old.trim().to_string(), new.trim().to_string()))
}

fn parse_group(s: &str) -> Result<(String, Vec<String>), String> {
    let (name, columns) = s.split_once('=').ok_or_else(|| format!("expected name=col,..., got '{s}'"))?;
    let columns = columns.split(',').map(|c| c.trim().to_string()).filter(|c| !c.is_empty()).collect();
    Ok((name.trim().to_string(), columns))
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("formfill=info")).init();

    let stdin = io::stdin();
    let mut prompter = LinePrompter::new(stdin.lock(), io::stdout());
    match run(Cli::parse(), &mut prompter) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

/// Returns `Ok(false)` when the command ran but some records failed.
fn run<P: Prompter>(cli: Cli, prompter: &mut P) -> Result<bool, PipelineError> {
    match cli.command {
        Commands::Fields { template, csv } => {
            let template = FormTemplate::load(&template)?;
            if !template.has_form_fields() {
                println!("{} has no form fields", template.source().display());
                return Ok(true);
            }
            template.catalog().write_listing(io::stdout().lock())?;
            if let Some(csv) = csv {
                listing::save_catalog_csv(template.catalog(), &csv)?;
            }
            Ok(true)
        }

        Commands::Fill { config: Some(config), .. } => {
            let base = config.parent().map(Path::to_path_buf).unwrap_or_default();
            let job = JobConfig::from_file(&config)?.resolve_paths(&base);
            let report = job.into_builder()?.build()?.run()?;
            Ok(summarize(&report))
        }

        Commands::Fill {
            template,
            config: None,
            sources,
            rows,
            merge,
            name_columns,
            out,
            renames,
            keep_missing,
            sequential,
        } => {
            let template = template.ok_or_else(|| {
                PipelineError::Config("a template path or --config is required".to_string())
            })?;
            if sources.is_empty() {
                return Err(PipelineError::Config("at least one --source is required".to_string()));
            }

            let template = FormTemplate::load(&template)?;
            if !template.has_form_fields() {
                println!("{} has no form fields; nothing to fill.", template.source().display());
                return Ok(true);
            }

            let mut builder = FillPipelineBuilder::new()
                .with_template(template)
                .with_merge_mode(merge.into())
                .with_output_dir(&out)
                .with_rename_pairs(renames)
                .with_missing_policy(if keep_missing {
                    MissingValuePolicy::LeaveUntouched
                } else {
                    MissingValuePolicy::Blank
                })
                .with_executor(if sequential { ExecutorKind::Sync } else { ExecutorKind::Rayon });

            let mut columns: Vec<ColumnName> = Vec::new();
            for (i, path) in sources.iter().enumerate() {
                let data = read_source(path, rows.get(i).map(String::as_str), prompter)?;
                for column in data.columns() {
                    if !columns.contains(column) {
                        columns.push(column.clone());
                    }
                }
                let source = VecRecordSource::new(path.display().to_string(), data);
                builder = builder.with_source(source, &RowSelection::All)?;
            }

            let name_columns = if name_columns.is_empty() {
                prompt_name_columns(prompter, &columns)?
            } else {
                name_columns.into_iter().map(ColumnName::from).collect()
            };

            let report = builder.with_name_columns(name_columns).build()?.run()?;
            Ok(summarize(&report))
        }

        Commands::Rename { template, output, map } => {
            let template = FormTemplate::load(&template)?;
            if !template.has_form_fields() {
                println!("{} has no form fields", template.source().display());
                return Ok(true);
            }
            let mapping = if map.is_empty() {
                run_rename_session(prompter, template.catalog())?
            } else {
                let pairs = map.iter().map(|(o, n)| (o.as_str(), n.as_str()));
                FieldMapping::from_pairs(template.catalog(), pairs)?.finalize()
            };
            let (renamed, diff) = template.rename(&mapping)?;
            renamed.save(&output)?;
            print!("{diff}");
            io::stdout().flush()?;
            Ok(true)
        }

        Commands::Split { input, out_dir, groups } => {
            let data = CsvRecordSource::from_path(&input)?
                .with_number_inference(false)
                .read_all()?;
            std::fs::create_dir_all(&out_dir)?;
            let mut splitter = ColumnSplitter::new(data);
            for (name, columns) in groups {
                let columns: Vec<ColumnName> = columns.into_iter().map(ColumnName::from).collect();
                let path = splitter.write_group(&out_dir, &name, &columns)?;
                println!("Wrote {}", path.display());
            }
            if !splitter.is_done() {
                let left: Vec<String> = splitter.remaining().iter().map(ToString::to_string).collect();
                println!("Columns not written: {}", left.join(", "));
            }
            Ok(true)
        }
    }
}

fn read_source<P: Prompter>(
    path: &Path,
    rows: Option<&str>,
    prompter: &mut P,
) -> Result<DataSet, PipelineError> {
    let mut source = CsvRecordSource::from_path(path)?;
    let name = source.name().to_string();
    let data = source.read_all()?;
    match rows {
        Some(rows) => RowSelection::parse(rows)
            .and_then(|selection| selection.apply(&data))
            .map_err(|e| PipelineError::from_selection(&name, e)),
        None => prompt_row_selection(prompter, &name, &data),
    }
}

fn summarize(report: &BatchReport) -> bool {
    if report.outcome == FillOutcome::NoFormFields {
        println!("Template has no form fields; nothing was rendered.");
        return true;
    }
    for record in &report.records {
        match (&record.status, &record.path) {
            (RecordStatus::Written { .. }, Some(path)) => println!("Wrote {}", path.display()),
            (RecordStatus::Failed(e), _) => eprintln!("Record {}: {}", record.index, e),
            (RecordStatus::Cancelled, _) => eprintln!("Record {}: cancelled", record.index),
            (RecordStatus::Written { .. }, None) => {}
        }
    }
    report.is_success()
}
