//! Interactive selection, driven through the [`Prompter`] trait.
//!
//! The helpers here own the retry loops: recoverable errors are shown to the
//! user and the question is asked again, everything else is returned.
//! [`LinePrompter`] answers the questions from any line-oriented reader.

use crate::error::PipelineError;
use crate::filename::parse_column_selection;
use crate::rename::{FieldMapping, RenameCommand, RenameSession, RenameState};
use formfill_acroform::FieldCatalog;
use formfill_source::RowSelection;
use formfill_types::{ColumnName, DataSet};
use std::io::{BufRead, Write};

/// The questions the pipeline may need answered. `None` means the user gave up.
pub trait Prompter {
    /// Rows to use from `source_name`: `all` or 0-based indices.
    fn select_rows(&mut self, source_name: &str, data: &DataSet) -> Option<String>;

    /// 1-based numbers of the columns that name each output file.
    fn select_name_columns(&mut self, columns: &[ColumnName]) -> Option<String>;

    /// The next rename command, given the session as it stands.
    fn next_rename_command(&mut self, session: &RenameSession) -> Option<String>;

    /// Shows an error the user can correct.
    fn report_invalid(&mut self, error: &PipelineError);
}

/// Asks for a row selection until one applies cleanly to `data`.
pub fn prompt_row_selection<P: Prompter + ?Sized>(
    prompter: &mut P,
    source_name: &str,
    data: &DataSet,
) -> Result<DataSet, PipelineError> {
    loop {
        let input = prompter.select_rows(source_name, data).ok_or(PipelineError::Aborted)?;
        let selected = RowSelection::parse(&input)
            .and_then(|selection| selection.apply(data))
            .map_err(|e| PipelineError::from_selection(source_name, e));
        match selected {
            Ok(rows) => return Ok(rows),
            Err(e) if e.is_recoverable() => prompter.report_invalid(&e),
            Err(e) => return Err(e),
        }
    }
}

/// Asks for the file-naming columns. An empty answer is `NoColumnsSelected`.
pub fn prompt_name_columns<P: Prompter + ?Sized>(
    prompter: &mut P,
    columns: &[ColumnName],
) -> Result<Vec<ColumnName>, PipelineError> {
    loop {
        let input = prompter.select_name_columns(columns).ok_or(PipelineError::Aborted)?;
        match parse_column_selection(&input, columns) {
            Ok(selected) => return Ok(selected),
            Err(e) if e.is_recoverable() => prompter.report_invalid(&e),
            Err(e) => return Err(e),
        }
    }
}

/// Parses one line of rename input.
///
/// `<index> <new name>` renames, `done` finishes editing, `y`/`yes` accepts
/// the reviewed diff and `n`/`no` goes back to editing.
pub fn parse_rename_command(input: &str) -> Option<RenameCommand> {
    let input = input.trim();
    match input.to_ascii_lowercase().as_str() {
        "done" | "finish" => return Some(RenameCommand::Finish),
        "y" | "yes" | "accept" => return Some(RenameCommand::Accept),
        "n" | "no" | "reject" => return Some(RenameCommand::Reject),
        _ => {}
    }
    let (index, new_name) = input.split_once(char::is_whitespace)?;
    let index = index.parse().ok()?;
    Some(RenameCommand::Rename { index, new_name: new_name.trim().to_string() })
}

/// Runs a rename session to completion and returns the finalized mapping.
pub fn run_rename_session<P: Prompter + ?Sized>(
    prompter: &mut P,
    catalog: &FieldCatalog,
) -> Result<FieldMapping, PipelineError> {
    let mut session = RenameSession::new(catalog);
    while session.state() != RenameState::Finalized {
        let input = prompter.next_rename_command(&session).ok_or(PipelineError::Aborted)?;
        let Some(command) = parse_rename_command(&input) else {
            prompter.report_invalid(&PipelineError::InvalidRenameCommand {
                state: session.state(),
                command: input.trim().to_string(),
            });
            continue;
        };
        if let Err(e) = session.apply(command) {
            prompter.report_invalid(&e);
        }
    }
    Ok(session.into_mapping())
}

/// A prompter reading answers line by line and writing questions to `output`.
pub struct LinePrompter<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> LinePrompter<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    fn ask(&mut self, question: &str) -> Option<String> {
        write!(self.output, "{question}").ok()?;
        self.output.flush().ok()?;
        let mut line = String::new();
        match self.input.read_line(&mut line) {
            Ok(0) | Err(_) => None,
            Ok(_) => Some(line.trim_end_matches(['\r', '\n']).to_string()),
        }
    }

    fn say(&mut self, text: &str) {
        if let Err(e) = writeln!(self.output, "{text}") {
            log::debug!("Prompt output failed: {}", e);
        }
    }
}

impl<R: BufRead, W: Write> Prompter for LinePrompter<R, W> {
    fn select_rows(&mut self, source_name: &str, data: &DataSet) -> Option<String> {
        self.say(&format!("{source_name}: {} rows", data.len()));
        for (index, record) in data.records().iter().enumerate() {
            let cells: Vec<String> = record.iter().map(|(c, v)| format!("{c}={v}")).collect();
            self.say(&format!("  [{index}] {}", cells.join(", ")));
        }
        self.ask("Rows to use (\"all\" or indices): ")
    }

    fn select_name_columns(&mut self, columns: &[ColumnName]) -> Option<String> {
        for (i, column) in columns.iter().enumerate() {
            self.say(&format!("  {}. {column}", i + 1));
        }
        self.ask("Columns for the file name (numbers, in order): ")
    }

    fn next_rename_command(&mut self, session: &RenameSession) -> Option<String> {
        match session.state() {
            RenameState::Reviewing => {
                self.say(&session.diff().to_string());
                self.ask("Accept these names? [y/n]: ")
            }
            _ => {
                for (index, name) in session.mapping().targets().iter().enumerate() {
                    self.say(&format!("  [{index}] {name}"));
                }
                self.ask("Rename (\"<index> <new name>\", or \"done\"): ")
            }
        }
    }

    fn report_invalid(&mut self, error: &PipelineError) {
        self.say(&format!("{error}. Please try again."));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use formfill_types::FieldId;
    use std::io::Cursor;

    fn prompter(script: &str) -> LinePrompter<Cursor<Vec<u8>>, Vec<u8>> {
        LinePrompter::new(Cursor::new(script.as_bytes().to_vec()), Vec::new())
    }

    fn names(values: &[&str]) -> DataSet {
        DataSet::from_records(values.iter().map(|v| [("Name", *v)].into_iter().collect()).collect())
    }

    #[test]
    fn test_row_selection_reprompts_on_bad_input() {
        let mut p = prompter("x\n7\n1 0\n");
        let picked = prompt_row_selection(&mut p, "people.csv", &names(&["Alice", "Bob"])).unwrap();
        assert_eq!(picked.len(), 2);
        assert_eq!(picked.records()[0].get("Name").unwrap().to_string(), "Bob");

        let shown = String::from_utf8(p.output).unwrap();
        assert_eq!(shown.matches("Please try again").count(), 2);
    }

    #[test]
    fn test_row_selection_aborts_at_end_of_input() {
        let mut p = prompter("");
        let err = prompt_row_selection(&mut p, "people.csv", &names(&["Alice"])).unwrap_err();
        assert!(matches!(err, PipelineError::Aborted));
    }

    #[test]
    fn test_name_columns() {
        let columns = vec![ColumnName::new("Name"), ColumnName::new("Date")];
        let mut p = prompter("one\n2 1\n");
        let picked = prompt_name_columns(&mut p, &columns).unwrap();
        assert_eq!(picked, vec![ColumnName::new("Date"), ColumnName::new("Name")]);

        let mut p = prompter("\n");
        assert!(matches!(prompt_name_columns(&mut p, &columns), Err(PipelineError::NoColumnsSelected)));
    }

    #[test]
    fn test_parse_rename_command() {
        assert_eq!(parse_rename_command("DONE"), Some(RenameCommand::Finish));
        assert_eq!(parse_rename_command("y"), Some(RenameCommand::Accept));
        assert_eq!(parse_rename_command("no"), Some(RenameCommand::Reject));
        assert_eq!(
            parse_rename_command("2  Full Name "),
            Some(RenameCommand::Rename { index: 2, new_name: "Full Name".to_string() })
        );
        assert_eq!(parse_rename_command("abc def"), None);
        assert_eq!(parse_rename_command("3"), None);
    }

    #[test]
    fn test_rename_session_with_rejection() {
        let catalog = FieldCatalog::new(vec![FieldId::new("Name"), FieldId::new("Date")]);
        let script = "0 Who\ndone\nn\nbogus\n1 When\ndone\ny\n";
        let mut p = prompter(script);
        let mapping = run_rename_session(&mut p, &catalog).unwrap();

        assert!(mapping.is_finalized());
        let targets: Vec<_> = mapping.targets().iter().map(FieldId::as_str).collect();
        assert_eq!(targets, vec!["Who", "When"]);
        let shown = String::from_utf8(p.output).unwrap();
        assert!(shown.contains("0: Name -> Who"));
        assert_eq!(shown.matches("Please try again").count(), 1);
    }
}
