//! Command system for document editing

use crate::Result;
use doc_core::Document;

/// Result of applying a command
#[derive(Debug)]
pub struct CommandResult {
    /// The document after the command
    pub document: Document,
    /// The command that takes the new document back to the old one
    pub inverse: Box<dyn Command>,
}

/// Trait for all editing commands
pub trait Command: std::fmt::Debug + Send + Sync {
    /// Apply this command to a copy of `document`
    fn apply(&self, document: &Document) -> Result<CommandResult>;

    /// Get a display name for this command
    fn display_name(&self) -> &str;

    /// Clone this command into a box
    fn clone_box(&self) -> Box<dyn Command>;
}

impl Clone for Box<dyn Command> {
    fn clone(&self) -> Self {
        self.clone_box()
    }
}

/// Inverse of edits that have no cheaper undo: puts back a whole document.
///
/// Node handles stay valid across the restore because the snapshot is a
/// copy of the same arena.
#[derive(Debug, Clone)]
pub struct RestoreSnapshot {
    snapshot: Box<Document>,
    label: String,
}

impl RestoreSnapshot {
    pub fn new(snapshot: Document, label: impl Into<String>) -> Self {
        Self {
            snapshot: Box::new(snapshot),
            label: label.into(),
        }
    }
}

impl Command for RestoreSnapshot {
    fn apply(&self, document: &Document) -> Result<CommandResult> {
        Ok(CommandResult {
            document: (*self.snapshot).clone(),
            inverse: Box::new(RestoreSnapshot::new(document.clone(), self.label.clone())),
        })
    }

    fn display_name(&self) -> &str {
        &self.label
    }

    fn clone_box(&self) -> Box<dyn Command> {
        Box::new(self.clone())
    }
}

/// Apply `edit` to a copy of `document`, pairing the result with a snapshot
/// inverse labelled `label`.
pub(crate) fn apply_with_snapshot(
    document: &Document,
    label: &str,
    edit: impl FnOnce(&mut Document) -> Result<()>,
) -> Result<CommandResult> {
    let mut new_document = document.clone();
    edit(&mut new_document)?;
    Ok(CommandResult {
        document: new_document,
        inverse: Box::new(RestoreSnapshot::new(document.clone(), format!("Undo {}", label))),
    })
}
