//! Edit Engine - undoable commands over a document
//!
//! Commands never mutate the document they are given: each one applies to a
//! copy and returns the new document together with the command that undoes
//! it. The [`EditingEngine`] keeps the current document and the undo/redo
//! history.

mod error;
mod command;
mod bookmark_commands;
mod table_commands;
mod node_commands;
mod undo;
mod executor;
pub mod settings;

pub use error::*;
pub use command::*;
pub use bookmark_commands::*;
pub use table_commands::*;
pub use node_commands::*;
pub use undo::*;
pub use executor::*;
pub use settings::*;
