//! Command execution engine

use crate::{Command, EngineSettings, Result, UndoManager};
use doc_core::Document;

/// The main editing engine that manages document state and command execution
#[derive(Debug)]
pub struct EditingEngine {
    /// Current document
    document: Document,
    /// Undo manager
    undo_manager: UndoManager,
    settings: EngineSettings,
}

impl EditingEngine {
    /// Create a new editing engine with a document holding one empty paragraph
    pub fn new() -> Self {
        Self::with_settings(EngineSettings::default())
    }

    /// Create an engine whose new document uses the given settings
    pub fn with_settings(settings: EngineSettings) -> Self {
        let mut document = Document::with_empty_paragraph();
        if let Err(e) = document.set_config(settings.model.clone()) {
            tracing::warn!("Ignoring invalid model settings: {}", e);
        }
        Self {
            document,
            undo_manager: UndoManager::with_limit(settings.max_undo_entries),
            settings,
        }
    }

    /// Create an editing engine around an existing document
    pub fn with_document(document: Document) -> Self {
        let settings = EngineSettings {
            model: document.config().clone(),
            ..Default::default()
        };
        Self {
            document,
            undo_manager: UndoManager::with_limit(settings.max_undo_entries),
            settings,
        }
    }

    /// Get the current document
    pub fn document(&self) -> &Document {
        &self.document
    }

    /// Take the current document, dropping the history
    pub fn into_document(self) -> Document {
        self.document
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    /// Execute a command
    pub fn execute(&mut self, command: Box<dyn Command>) -> Result<()> {
        let result = command.apply(&self.document)?;
        tracing::debug!("Executed {}", command.display_name());

        // Record for undo
        self.undo_manager.push(command, result.inverse);
        self.document = result.document;

        Ok(())
    }

    /// Undo the last command
    pub fn undo(&mut self) -> Result<()> {
        let inverse = self.undo_manager.pop_undo()?;
        match inverse.apply(&self.document) {
            Ok(result) => {
                tracing::debug!("Undid via {}", inverse.display_name());
                self.document = result.document;
                Ok(())
            }
            Err(e) => {
                self.undo_manager.restore_undo(inverse);
                Err(e)
            }
        }
    }

    /// Redo the last undone command
    pub fn redo(&mut self) -> Result<()> {
        let command = self.undo_manager.pop_redo()?;
        match command.apply(&self.document) {
            Ok(result) => {
                tracing::debug!("Redid {}", command.display_name());
                self.undo_manager.push_redone(command, result.inverse);
                self.document = result.document;
                Ok(())
            }
            Err(e) => {
                self.undo_manager.restore_redo(command);
                Err(e)
            }
        }
    }

    /// Check if undo is available
    pub fn can_undo(&self) -> bool {
        self.undo_manager.can_undo()
    }

    /// Check if redo is available
    pub fn can_redo(&self) -> bool {
        self.undo_manager.can_redo()
    }

    /// Name of the command the next undo reverts
    pub fn undo_name(&self) -> Option<&str> {
        self.undo_manager.undo_name()
    }

    /// Name of the command the next redo re-applies
    pub fn redo_name(&self) -> Option<&str> {
        self.undo_manager.redo_name()
    }

    pub fn clear_history(&mut self) {
        self.undo_manager.clear();
    }
}

impl Default for EditingEngine {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{EditError, InsertRun, SetRunText};

    #[test]
    fn test_execute_undo_redo() {
        let mut engine = EditingEngine::new();
        let para = engine.document().paragraphs()[0];

        engine.execute(Box::new(InsertRun::new(para, None, "one"))).unwrap();
        assert_eq!(engine.undo_name(), Some("Insert Run"));

        engine.undo().unwrap();
        assert_eq!(engine.document().text(para).unwrap(), "\r");
        assert_eq!(engine.redo_name(), Some("Insert Run"));

        engine.redo().unwrap();
        assert_eq!(engine.document().text(para).unwrap(), "one\r");
        assert!(engine.can_undo());
        assert!(!engine.can_redo());
    }

    #[test]
    fn test_failed_command_leaves_state() {
        let mut engine = EditingEngine::new();
        let para = engine.document().paragraphs()[0];
        let err = engine.execute(Box::new(SetRunText::new(para, "x"))).unwrap_err();
        assert!(matches!(err, EditError::InvalidCommand(_)));
        assert!(!engine.can_undo());
    }

    #[test]
    fn test_settings_apply_to_new_document() {
        let mut settings = EngineSettings::default();
        settings.model.bookmarks.strict_names = true;
        settings.max_undo_entries = 2;
        let mut engine = EditingEngine::with_settings(settings);
        assert!(engine.document().config().bookmarks.strict_names);

        let para = engine.document().paragraphs()[0];
        for text in ["a", "b", "c"] {
            engine.execute(Box::new(InsertRun::new(para, None, text))).unwrap();
        }
        engine.undo().unwrap();
        engine.undo().unwrap();
        assert!(matches!(engine.undo(), Err(EditError::UndoStackEmpty)));
        assert_eq!(engine.document().text(para).unwrap(), "a\r");
    }

    #[test]
    fn test_clear_history() {
        let mut engine = EditingEngine::new();
        let para = engine.document().paragraphs()[0];
        engine.execute(Box::new(InsertRun::new(para, None, "x"))).unwrap();
        engine.clear_history();
        assert!(!engine.can_undo());
        assert_eq!(engine.into_document().text(para).unwrap(), "x\r");
    }
}
