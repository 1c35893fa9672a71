mod common;

use common::fixtures::{form_with_kids, text_form, write_pdf};
use common::pdf_assertions::field_value;
use common::TestResult;
use formfill::prompt::run_rename_session;
use formfill::{
    DocumentRenderer, FieldId, FieldMapping, FormTemplate, LinePrompter, PipelineError, RenameCommand,
    RenameSession, TabularRecord,
};
use std::io::Cursor;

fn names(template: &FormTemplate) -> Vec<String> {
    template.catalog().iter().map(FieldId::to_string).collect()
}

#[test]
fn test_identity_rename_twice_has_no_diff() -> TestResult {
    let template = FormTemplate::from_document(text_form(&["Name", "Date"]))?;
    let identity = FieldMapping::identity(template.catalog()).finalize();

    let (once, diff) = template.rename(&identity)?;
    assert!(diff.is_empty());
    let (twice, diff) = once.rename(&FieldMapping::identity(once.catalog()).finalize())?;
    assert!(diff.is_empty());
    assert_eq!(diff.to_string(), "no changes\n");
    assert_eq!(names(&twice), vec!["Name", "Date"]);
    Ok(())
}

#[test]
fn test_session_rename_writes_renamed_template() -> TestResult {
    let dir = tempfile::tempdir()?;
    let path = write_pdf(dir.path(), "form.pdf", text_form(&["Name", "Date"]));
    let template = FormTemplate::load(&path)?;

    let mut session = RenameSession::new(template.catalog());
    session.apply(RenameCommand::Rename { index: 1, new_name: "Signed on".to_string() })?;
    session.apply(RenameCommand::Finish)?;
    assert_eq!(session.diff().to_string(), "1: Date -> Signed on\n");
    session.apply(RenameCommand::Accept)?;

    let (renamed, diff) = template.rename(session.mapping())?;
    assert_eq!(diff.to_string(), "1: Date -> Signed on\n");

    let output = dir.path().join("renamed.pdf");
    renamed.save(&output)?;
    let reloaded = FormTemplate::load(&output)?;
    assert_eq!(names(&reloaded), vec!["Name", "Signed on"]);

    // The source template on disk is untouched.
    assert_eq!(names(&FormTemplate::load(&path)?), vec!["Name", "Date"]);
    Ok(())
}

#[test]
fn test_unfinalized_mapping_is_refused() -> TestResult {
    let template = FormTemplate::from_document(text_form(&["Name"]))?;
    let mut session = RenameSession::new(template.catalog());
    session.apply(RenameCommand::Rename { index: 0, new_name: "Who".to_string() })?;

    let result = template.rename(session.mapping());
    assert!(matches!(result, Err(PipelineError::MappingNotFinalized)));
    Ok(())
}

#[test]
fn test_kid_widgets_follow_parent_rename() -> TestResult {
    let template = FormTemplate::from_document(form_with_kids("Total"))?;
    assert_eq!(names(&template), vec!["Total"]);

    let mapping = FieldMapping::from_pairs(template.catalog(), [("Total", "Sum")])?.finalize();
    let (renamed, _) = template.rename(&mapping)?;
    assert_eq!(names(&renamed), vec!["Sum"]);

    let record: TabularRecord = [("Sum", "42")].into_iter().collect();
    let rendered = DocumentRenderer::new(renamed).render(&record)?;
    assert_eq!(field_value(rendered.document(), "Sum").as_deref(), Some("42"));
    assert_eq!(rendered.stats().filled, 2);
    Ok(())
}

#[test]
fn test_interactive_session_end_to_end() -> TestResult {
    let dir = tempfile::tempdir()?;
    let path = write_pdf(dir.path(), "form.pdf", text_form(&["A", "B"]));
    let template = FormTemplate::load(&path)?;

    let script = "0 B\n1 A\ndone\ny\n";
    let mut prompter = LinePrompter::new(Cursor::new(script.as_bytes().to_vec()), Vec::new());
    let mapping = run_rename_session(&mut prompter, template.catalog())?;

    let (renamed, diff) = template.rename(&mapping)?;
    assert_eq!(diff.entries().len(), 2);
    let output = dir.path().join("swapped.pdf");
    renamed.save(&output)?;
    assert_eq!(names(&FormTemplate::load(&output)?), vec!["B", "A"]);
    Ok(())
}

#[test]
fn test_save_failure_names_path_without_record() -> TestResult {
    let dir = tempfile::tempdir()?;
    let template = FormTemplate::from_document(text_form(&["Name"]))?;
    let target = dir.path().join("absent").join("renamed.pdf");

    let err = template.save(&target).err().ok_or("save should fail")?;
    assert!(matches!(err, PipelineError::SaveFailure { ref path, .. } if *path == target));
    assert!(err.to_string().contains("renamed.pdf"));
    assert!(!err.to_string().contains("record"));
    Ok(())
}
