//! Undo/redo history

use crate::{Command, EditError, Result};

/// An entry in the undo stack
#[derive(Debug)]
struct UndoEntry {
    /// The original command (re-applied on redo)
    command: Box<dyn Command>,
    /// The inverse command (applied on undo)
    inverse: Box<dyn Command>,
}

/// Manages undo and redo stacks
#[derive(Debug)]
pub struct UndoManager {
    undo_stack: Vec<UndoEntry>,
    redo_stack: Vec<Box<dyn Command>>,
    /// Maximum number of undo entries
    max_entries: usize,
}

impl UndoManager {
    /// Create a new undo manager
    pub fn new() -> Self {
        Self::with_limit(100)
    }

    /// Create with a custom history limit (at least one entry is kept)
    pub fn with_limit(max_entries: usize) -> Self {
        Self {
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
            max_entries: max_entries.max(1),
        }
    }

    /// Record a freshly executed command; clears the redo stack
    pub fn push(&mut self, command: Box<dyn Command>, inverse: Box<dyn Command>) {
        self.redo_stack.clear();
        self.push_entry(command, inverse);
    }

    /// Record a redone command without touching the redo stack
    pub fn push_redone(&mut self, command: Box<dyn Command>, inverse: Box<dyn Command>) {
        self.push_entry(command, inverse);
    }

    fn push_entry(&mut self, command: Box<dyn Command>, inverse: Box<dyn Command>) {
        self.undo_stack.push(UndoEntry { command, inverse });

        // Enforce max entries
        if self.undo_stack.len() > self.max_entries {
            let excess = self.undo_stack.len() - self.max_entries;
            self.undo_stack.drain(..excess);
        }
    }

    /// Pop the last entry for undo, returning its inverse
    pub fn pop_undo(&mut self) -> Result<Box<dyn Command>> {
        let entry = self.undo_stack.pop().ok_or(EditError::UndoStackEmpty)?;
        self.redo_stack.push(entry.command);
        Ok(entry.inverse)
    }

    /// Put an undone entry back (used when applying its inverse failed)
    pub fn restore_undo(&mut self, inverse: Box<dyn Command>) {
        if let Some(command) = self.redo_stack.pop() {
            self.undo_stack.push(UndoEntry { command, inverse });
        }
    }

    /// Pop a command for redo
    pub fn pop_redo(&mut self) -> Result<Box<dyn Command>> {
        self.redo_stack.pop().ok_or(EditError::RedoStackEmpty)
    }

    /// Return a command to the redo stack (used when re-applying it failed)
    pub fn restore_redo(&mut self, command: Box<dyn Command>) {
        self.redo_stack.push(command);
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn undo_count(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn redo_count(&self) -> usize {
        self.redo_stack.len()
    }

    /// Display name of the command the next undo reverts
    pub fn undo_name(&self) -> Option<&str> {
        self.undo_stack.last().map(|e| e.command.display_name())
    }

    /// Display name of the command the next redo re-applies
    pub fn redo_name(&self) -> Option<&str> {
        self.redo_stack.last().map(|c| c.display_name())
    }

    /// Clear all undo/redo history
    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
    }
}

impl Default for UndoManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ClearBookmarks;

    fn boxed() -> Box<dyn Command> {
        Box::new(ClearBookmarks)
    }

    #[test]
    fn test_push_and_pop() {
        let mut manager = UndoManager::new();
        assert!(!manager.can_undo());
        assert!(matches!(manager.pop_undo(), Err(EditError::UndoStackEmpty)));

        manager.push(boxed(), boxed());
        assert_eq!(manager.undo_name(), Some("Clear Bookmarks"));
        manager.pop_undo().unwrap();
        assert!(manager.can_redo());
        assert_eq!(manager.redo_name(), Some("Clear Bookmarks"));

        manager.pop_redo().unwrap();
        assert!(matches!(manager.pop_redo(), Err(EditError::RedoStackEmpty)));
    }

    #[test]
    fn test_new_command_clears_redo() {
        let mut manager = UndoManager::new();
        manager.push(boxed(), boxed());
        manager.pop_undo().unwrap();
        assert_eq!(manager.redo_count(), 1);

        manager.push(boxed(), boxed());
        assert_eq!(manager.redo_count(), 0);
    }

    #[test]
    fn test_limit_drops_oldest() {
        let mut manager = UndoManager::with_limit(3);
        for _ in 0..5 {
            manager.push(boxed(), boxed());
        }
        assert_eq!(manager.undo_count(), 3);
    }

    #[test]
    fn test_restore_after_failed_undo() {
        let mut manager = UndoManager::new();
        manager.push(boxed(), boxed());
        let inverse = manager.pop_undo().unwrap();
        manager.restore_undo(inverse);
        assert_eq!((manager.undo_count(), manager.redo_count()), (1, 0));
    }
}
