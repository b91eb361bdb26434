//! Bookmark commands for inserting, renaming, and deleting bookmarks

use crate::command::apply_with_snapshot;
use crate::{Command, CommandResult, EditError, Result};
use doc_core::{Document, NodeId};
use serde::{Deserialize, Serialize};

/// Insert a bookmark spanning from before `first` to after `last`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InsertBookmark {
    pub name: String,
    pub first: NodeId,
    pub last: NodeId,
}

impl InsertBookmark {
    pub fn new(name: impl Into<String>, first: NodeId, last: NodeId) -> Self {
        Self {
            name: name.into(),
            first,
            last,
        }
    }
}

impl Command for InsertBookmark {
    fn apply(&self, document: &Document) -> Result<CommandResult> {
        apply_with_snapshot(document, self.display_name(), |doc| {
            doc.bookmarks_mut().insert(&self.name, self.first, self.last)?;
            Ok(())
        })
    }

    fn display_name(&self) -> &str {
        "Insert Bookmark"
    }

    fn clone_box(&self) -> Box<dyn Command> {
        Box::new(self.clone())
    }
}

/// Delete a bookmark's markers, keeping its content
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteBookmark {
    pub name: String,
}

impl DeleteBookmark {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl Command for DeleteBookmark {
    fn apply(&self, document: &Document) -> Result<CommandResult> {
        apply_with_snapshot(document, self.display_name(), |doc| {
            doc.bookmarks_mut().remove(&self.name)?;
            Ok(())
        })
    }

    fn display_name(&self) -> &str {
        "Delete Bookmark"
    }

    fn clone_box(&self) -> Box<dyn Command> {
        Box::new(self.clone())
    }
}

/// Rename a bookmark
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenameBookmark {
    pub old_name: String,
    pub new_name: String,
}

impl RenameBookmark {
    pub fn new(old_name: impl Into<String>, new_name: impl Into<String>) -> Self {
        Self {
            old_name: old_name.into(),
            new_name: new_name.into(),
        }
    }
}

impl Command for RenameBookmark {
    fn apply(&self, document: &Document) -> Result<CommandResult> {
        let mut new_document = document.clone();
        new_document
            .bookmarks_mut()
            .rename(&self.old_name, &self.new_name)?;

        Ok(CommandResult {
            document: new_document,
            inverse: Box::new(RenameBookmark::new(
                self.new_name.clone(),
                self.old_name.clone(),
            )),
        })
    }

    fn display_name(&self) -> &str {
        "Rename Bookmark"
    }

    fn clone_box(&self) -> Box<dyn Command> {
        Box::new(self.clone())
    }
}

/// Replace the text inside a single-paragraph bookmark
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SetBookmarkText {
    pub name: String,
    pub text: String,
}

impl SetBookmarkText {
    pub fn new(name: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            text: text.into(),
        }
    }
}

impl Command for SetBookmarkText {
    fn apply(&self, document: &Document) -> Result<CommandResult> {
        apply_with_snapshot(document, self.display_name(), |doc| {
            doc.bookmarks_mut().set_text(&self.name, &self.text)?;
            Ok(())
        })
    }

    fn display_name(&self) -> &str {
        "Set Bookmark Text"
    }

    fn clone_box(&self) -> Box<dyn Command> {
        Box::new(self.clone())
    }
}

/// Remove every bookmark in the document
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClearBookmarks;

impl Command for ClearBookmarks {
    fn apply(&self, document: &Document) -> Result<CommandResult> {
        apply_with_snapshot(document, self.display_name(), |doc| {
            if doc.bookmarks_mut().clear() == 0 {
                return Err(EditError::InvalidCommand(
                    "document has no bookmarks to clear".to_string(),
                ));
            }
            Ok(())
        })
    }

    fn display_name(&self) -> &str {
        "Clear Bookmarks"
    }

    fn clone_box(&self) -> Box<dyn Command> {
        Box::new(self.clone())
    }
}
