//! Editing sessions for arboard.
//!
//! [`Editor`] wraps a [`arboard_core::GraphStore`] with the state an
//! interactive front end needs: selection, undo history, and autosave to an
//! `.arb` file.

mod editor;
pub mod file_io;
mod history;

pub use editor::Editor;
pub use file_io::{
    default_file_name, default_storage_path, load_snapshot, save_snapshot, ARB_EXTENSION, SVG_EXTENSION,
};
pub use history::History;
