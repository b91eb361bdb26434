//! Document Core - arena-backed document tree with bookmarks and table grids
//!
//! This crate provides a typed node tree owned by a [`Document`] arena,
//! a bookmark index resolving named marker pairs to content ranges, and a
//! resolver that turns table rows into a logical grid honouring width spans
//! and merge flags.

mod node_id;
mod error;
pub mod config;
mod node;
mod document;
mod bookmark;
pub mod table;
mod grid;
mod visitor;
pub mod text;

pub use node_id::*;
pub use error::*;
pub use config::*;
pub use node::*;
pub use document::*;
pub use bookmark::*;
pub use table::*;
pub use grid::*;
pub use visitor::*;
pub use text::*;
