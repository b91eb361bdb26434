//! Structural node commands: inserting text runs and clones, removing nodes,
//! and replacing run text
//!
//! Commands that allocate nodes undo by restoring a snapshot. The restored
//! arena is identical to the one the command first ran on, so a redo hands
//! out the same node IDs and later history entries stay valid.

use crate::command::apply_with_snapshot;
use crate::{Command, CommandResult, EditError, Result};
use doc_core::{Document, NodeId};
use serde::{Deserialize, Serialize};

/// Insert a new run with text into a paragraph
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InsertRun {
    pub paragraph: NodeId,
    /// Child index; `None` appends
    pub index: Option<usize>,
    pub text: String,
}

impl InsertRun {
    pub fn new(paragraph: NodeId, index: Option<usize>, text: impl Into<String>) -> Self {
        Self {
            paragraph,
            index,
            text: text.into(),
        }
    }
}

impl Command for InsertRun {
    fn apply(&self, document: &Document) -> Result<CommandResult> {
        apply_with_snapshot(document, self.display_name(), |doc| {
            let run = doc.create_run(self.text.clone());
            let index = self.index.unwrap_or_else(|| doc.children(self.paragraph).len());
            doc.insert_child(self.paragraph, index, run)?;
            Ok(())
        })
    }

    fn display_name(&self) -> &str {
        "Insert Run"
    }

    fn clone_box(&self) -> Box<dyn Command> {
        Box::new(self.clone())
    }
}

/// Clone a node (deep or shallow) and insert the copy under a parent
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InsertClone {
    pub source: NodeId,
    pub parent: NodeId,
    /// Child index; `None` appends
    pub index: Option<usize>,
    pub deep: bool,
}

impl InsertClone {
    pub fn new(source: NodeId, parent: NodeId, index: Option<usize>, deep: bool) -> Self {
        Self {
            source,
            parent,
            index,
            deep,
        }
    }
}

impl Command for InsertClone {
    fn apply(&self, document: &Document) -> Result<CommandResult> {
        apply_with_snapshot(document, self.display_name(), |doc| {
            let copy = doc.clone_node(self.source, self.deep)?;
            let index = self.index.unwrap_or_else(|| doc.children(self.parent).len());
            doc.insert_child(self.parent, index, copy)?;
            Ok(())
        })
    }

    fn display_name(&self) -> &str {
        "Insert Copy"
    }

    fn clone_box(&self) -> Box<dyn Command> {
        Box::new(self.clone())
    }
}

/// Remove a node and its subtree
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoveNode {
    pub node: NodeId,
}

impl RemoveNode {
    pub fn new(node: NodeId) -> Self {
        Self { node }
    }
}

impl Command for RemoveNode {
    fn apply(&self, document: &Document) -> Result<CommandResult> {
        apply_with_snapshot(document, self.display_name(), |doc| {
            doc.remove(self.node)?;
            Ok(())
        })
    }

    fn display_name(&self) -> &str {
        "Remove"
    }

    fn clone_box(&self) -> Box<dyn Command> {
        Box::new(self.clone())
    }
}

/// Replace the text of a run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SetRunText {
    pub run: NodeId,
    pub text: String,
}

impl SetRunText {
    pub fn new(run: NodeId, text: impl Into<String>) -> Self {
        Self {
            run,
            text: text.into(),
        }
    }
}

impl Command for SetRunText {
    fn apply(&self, document: &Document) -> Result<CommandResult> {
        let old_text = document
            .node(self.run)?
            .text()
            .ok_or_else(|| EditError::InvalidCommand(format!("node {} is not a run", self.run)))?
            .to_string();

        let mut new_document = document.clone();
        new_document.set_run_text(self.run, self.text.clone())?;

        Ok(CommandResult {
            document: new_document,
            inverse: Box::new(SetRunText::new(self.run, old_text)),
        })
    }

    fn display_name(&self) -> &str {
        "Edit Text"
    }

    fn clone_box(&self) -> Box<dyn Command> {
        Box::new(self.clone())
    }
}
