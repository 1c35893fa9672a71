//! Field renaming: an edit/review/finalize workflow over a [`FieldMapping`] and
//! a positional diff of the resulting catalog.
//!
//! The workflow is a plain state machine driven by [`RenameCommand`]s, so it
//! can be exercised without any terminal. Only a finalized mapping may be
//! written into a template.

use crate::error::PipelineError;
use formfill_acroform::{rename_fields, FieldCatalog};
use formfill_types::FieldId;
use lopdf::Document;
use std::collections::HashMap;
use std::fmt;

/// Where a [`RenameSession`] currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenameState {
    Editing,
    Reviewing,
    Finalized,
}

impl fmt::Display for RenameState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            RenameState::Editing => "editing",
            RenameState::Reviewing => "reviewing",
            RenameState::Finalized => "finalized",
        };
        f.write_str(label)
    }
}

/// A discrete input to the rename workflow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenameCommand {
    /// Give the field at catalog position `index` a new name.
    Rename { index: usize, new_name: String },
    /// Stop editing and review the diff.
    Finish,
    Accept,
    /// Go back to editing.
    Reject,
}

impl RenameCommand {
    fn label(&self) -> String {
        match self {
            RenameCommand::Rename { index, new_name } => format!("rename {index} to '{new_name}'"),
            RenameCommand::Finish => "finish".to_string(),
            RenameCommand::Accept => "accept".to_string(),
            RenameCommand::Reject => "reject".to_string(),
        }
    }
}

/// Old-to-new field names, kept alongside the catalog order they came from.
///
/// Renaming one position renames every position that carries the same
/// original identifier, since the document rewrite works by name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldMapping {
    original: Vec<FieldId>,
    targets: Vec<FieldId>,
    finalized: bool,
}

impl FieldMapping {
    /// The mapping that renames nothing.
    pub fn identity(catalog: &FieldCatalog) -> Self {
        Self {
            original: catalog.fields().to_vec(),
            targets: catalog.fields().to_vec(),
            finalized: false,
        }
    }

    /// Builds a mapping from `old -> new` pairs. Every key must name a catalog field.
    pub fn from_pairs<'a, I>(catalog: &FieldCatalog, pairs: I) -> Result<Self, PipelineError>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut mapping = Self::identity(catalog);
        for (old, new) in pairs {
            let index = catalog
                .iter()
                .position(|f| f.as_str() == old)
                .ok_or_else(|| PipelineError::UnknownField(old.to_string()))?;
            mapping.set(index, new)?;
        }
        Ok(mapping)
    }

    /// Renames the field at `index`, and every other occurrence of the same
    /// original identifier, to `new_name`.
    pub fn set(&mut self, index: usize, new_name: &str) -> Result<(), PipelineError> {
        let new_name = new_name.trim();
        if new_name.is_empty() {
            return Err(PipelineError::InvalidFieldName(new_name.to_string()));
        }
        let old = self
            .original
            .get(index)
            .cloned()
            .ok_or(PipelineError::InvalidFieldIndex { index, len: self.original.len() })?;
        let new = FieldId::new(new_name);
        for (original, target) in self.original.iter().zip(self.targets.iter_mut()) {
            if *original == old {
                *target = new.clone();
            }
        }
        self.finalized = false;
        Ok(())
    }

    pub fn original(&self) -> &[FieldId] {
        &self.original
    }

    /// Target names in catalog order.
    pub fn targets(&self) -> &[FieldId] {
        &self.targets
    }

    pub fn is_finalized(&self) -> bool {
        self.finalized
    }

    /// Only pairs that actually change a name.
    pub fn renames(&self) -> HashMap<FieldId, FieldId> {
        self.original
            .iter()
            .zip(&self.targets)
            .filter(|(old, new)| old != new)
            .map(|(old, new)| (old.clone(), new.clone()))
            .collect()
    }

    pub fn diff(&self) -> CatalogDiff {
        CatalogDiff::between(&self.original, &self.targets)
    }

    /// Marks the mapping as reviewed. Used by [`RenameSession`] and by callers
    /// that take a mapping from configuration rather than interactively.
    pub fn finalize(mut self) -> Self {
        self.finalized = true;
        self
    }
}

/// One changed catalog position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiffEntry {
    pub index: usize,
    pub old: Option<FieldId>,
    pub new: Option<FieldId>,
}

/// Position-by-position comparison of two catalog listings.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CatalogDiff {
    entries: Vec<DiffEntry>,
}

impl CatalogDiff {
    /// Compares two listings position by position. A reordering is a change
    /// even when both listings hold the same names.
    pub fn between(before: &[FieldId], after: &[FieldId]) -> Self {
        let len = before.len().max(after.len());
        let entries = (0..len)
            .filter_map(|index| {
                let old = before.get(index);
                let new = after.get(index);
                (old != new).then(|| DiffEntry { index, old: old.cloned(), new: new.cloned() })
            })
            .collect();
        Self { entries }
    }

    pub fn entries(&self) -> &[DiffEntry] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl fmt::Display for CatalogDiff {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.entries.is_empty() {
            return writeln!(f, "no changes");
        }
        let show = |id: &Option<FieldId>| id.as_ref().map_or("<none>".to_string(), |id| id.to_string());
        for entry in &self.entries {
            writeln!(f, "{}: {} -> {}", entry.index, show(&entry.old), show(&entry.new))?;
        }
        Ok(())
    }
}

/// The rename workflow: `Editing -> Reviewing -> Finalized`, with `Reject`
/// returning from review to editing.
#[derive(Debug, Clone)]
pub struct RenameSession {
    state: RenameState,
    mapping: FieldMapping,
}

impl RenameSession {
    pub fn new(catalog: &FieldCatalog) -> Self {
        Self { state: RenameState::Editing, mapping: FieldMapping::identity(catalog) }
    }

    pub fn state(&self) -> RenameState {
        self.state
    }

    pub fn mapping(&self) -> &FieldMapping {
        &self.mapping
    }

    /// The diff the user is asked to review.
    pub fn diff(&self) -> CatalogDiff {
        self.mapping.diff()
    }

    /// Applies one command and returns the new state.
    ///
    /// A command that is not valid in the current state fails with
    /// `InvalidRenameCommand` and leaves the session unchanged.
    pub fn apply(&mut self, command: RenameCommand) -> Result<RenameState, PipelineError> {
        let next = match (self.state, &command) {
            (RenameState::Editing, RenameCommand::Rename { index, new_name }) => {
                self.mapping.set(*index, new_name)?;
                RenameState::Editing
            }
            (RenameState::Editing, RenameCommand::Finish) => RenameState::Reviewing,
            (RenameState::Reviewing, RenameCommand::Accept) => {
                self.mapping.finalized = true;
                RenameState::Finalized
            }
            (RenameState::Reviewing, RenameCommand::Reject) => RenameState::Editing,
            (state, command) => {
                return Err(PipelineError::InvalidRenameCommand { state, command: command.label() });
            }
        };
        log::debug!("Rename session: {} -> {}", self.state, next);
        self.state = next;
        Ok(next)
    }

    /// Hands back the mapping. It is finalized only if the session was.
    pub fn into_mapping(self) -> FieldMapping {
        self.mapping
    }
}

/// Writes a finalized mapping into `doc`'s field names.
///
/// Returns the number of field dictionaries renamed.
pub fn apply_mapping(doc: &mut Document, mapping: &FieldMapping) -> Result<usize, PipelineError> {
    if !mapping.is_finalized() {
        return Err(PipelineError::MappingNotFinalized);
    }
    let renamed = rename_fields(doc, &mapping.renames())?;
    log::info!("Renamed {} field dictionaries", renamed);
    Ok(renamed)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog(names: &[&str]) -> FieldCatalog {
        FieldCatalog::new(names.iter().map(|n| FieldId::new(*n)).collect())
    }

    fn rename(index: usize, name: &str) -> RenameCommand {
        RenameCommand::Rename { index, new_name: name.to_string() }
    }

    #[test]
    fn test_session_happy_path() {
        let mut session = RenameSession::new(&catalog(&["Name", "Date"]));
        assert_eq!(session.apply(rename(0, "FullName")).unwrap(), RenameState::Editing);
        assert_eq!(session.apply(RenameCommand::Finish).unwrap(), RenameState::Reviewing);
        assert_eq!(session.apply(RenameCommand::Accept).unwrap(), RenameState::Finalized);

        let mapping = session.into_mapping();
        assert!(mapping.is_finalized());
        assert_eq!(mapping.renames().get("Name").map(FieldId::as_str), Some("FullName"));
        assert_eq!(mapping.renames().len(), 1);
    }

    #[test]
    fn test_reject_returns_to_editing() {
        let mut session = RenameSession::new(&catalog(&["Name"]));
        session.apply(RenameCommand::Finish).unwrap();
        assert_eq!(session.apply(RenameCommand::Reject).unwrap(), RenameState::Editing);
        session.apply(rename(0, "Other")).unwrap();
        assert!(!session.mapping().is_finalized());
    }

    #[test]
    fn test_commands_outside_their_state_are_rejected() {
        let mut session = RenameSession::new(&catalog(&["Name"]));
        let err = session.apply(RenameCommand::Accept).unwrap_err();
        assert!(matches!(err, PipelineError::InvalidRenameCommand { state: RenameState::Editing, .. }));

        session.apply(RenameCommand::Finish).unwrap();
        assert!(session.apply(rename(0, "X")).is_err());
        assert_eq!(session.state(), RenameState::Reviewing);

        session.apply(RenameCommand::Accept).unwrap();
        assert!(session.apply(RenameCommand::Reject).is_err());
        assert_eq!(session.state(), RenameState::Finalized);
    }

    #[test]
    fn test_invalid_index_and_empty_name() {
        let mut session = RenameSession::new(&catalog(&["Name"]));
        assert!(matches!(
            session.apply(rename(3, "X")),
            Err(PipelineError::InvalidFieldIndex { index: 3, len: 1 })
        ));
        assert!(matches!(session.apply(rename(0, "  ")), Err(PipelineError::InvalidFieldName(_))));
        assert_eq!(session.state(), RenameState::Editing);
    }

    #[test]
    fn test_duplicates_are_renamed_together() {
        let mut mapping = FieldMapping::identity(&catalog(&["Name", "Date", "Name"]));
        mapping.set(2, "Who").unwrap();
        let targets: Vec<_> = mapping.targets().iter().map(FieldId::as_str).collect();
        assert_eq!(targets, vec!["Who", "Date", "Who"]);
    }

    #[test]
    fn test_diff_is_positional() {
        let before = [FieldId::new("A"), FieldId::new("B")];
        let after = [FieldId::new("B"), FieldId::new("A")];
        let diff = CatalogDiff::between(&before, &after);
        assert_eq!(diff.entries().len(), 2);
        assert_eq!(diff.to_string(), "0: A -> B\n1: B -> A\n");
    }

    #[test]
    fn test_diff_of_unequal_lengths() {
        let diff = CatalogDiff::between(&[FieldId::new("A")], &[FieldId::new("A"), FieldId::new("B")]);
        assert_eq!(diff.to_string(), "1: <none> -> B\n");
    }

    #[test]
    fn test_identity_mapping_has_no_diff() {
        let mapping = FieldMapping::identity(&catalog(&["Name", "Date"]));
        assert!(mapping.diff().is_empty());
        assert_eq!(mapping.diff().to_string(), "no changes\n");
        assert!(mapping.renames().is_empty());
    }

    #[test]
    fn test_from_pairs_rejects_unknown_fields() {
        let cat = catalog(&["Name"]);
        let mapping = FieldMapping::from_pairs(&cat, [("Name", "FullName")]).unwrap();
        assert_eq!(mapping.targets()[0].as_str(), "FullName");
        assert!(!mapping.is_finalized());

        let err = FieldMapping::from_pairs(&cat, [("Nope", "X")]).unwrap_err();
        assert!(matches!(err, PipelineError::UnknownField(ref f) if f == "Nope"));
    }

    #[test]
    fn test_unfinalized_mapping_cannot_be_applied() {
        let mut doc = Document::with_version("1.7");
        let mapping = FieldMapping::identity(&catalog(&["Name"]));
        assert!(matches!(apply_mapping(&mut doc, &mapping), Err(PipelineError::MappingNotFinalized)));
    }
}
