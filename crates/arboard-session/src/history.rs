//! Undo/redo manager using store snapshots.
//!
//! Each entry is a full [`Snapshot`]; boards are small, and restoring a whole
//! snapshot cannot leave the store half-applied.

use std::collections::VecDeque;

use arboard_core::{GraphStore, Snapshot};

/// Manages undo/redo with store snapshots
#[derive(Debug, Clone)]
pub struct History {
    undo_stack: VecDeque<Snapshot>,
    redo_stack: Vec<Snapshot>,
    max_history: usize,
}

impl History {
    pub fn new(max_history: usize) -> Self {
        Self {
            undo_stack: VecDeque::new(),
            redo_stack: Vec::new(),
            max_history,
        }
    }

    /// Record the state from before a mutation
    pub fn record(&mut self, before: Snapshot) {
        self.undo_stack.push_back(before);
        self.redo_stack.clear();

        while self.undo_stack.len() > self.max_history {
            self.undo_stack.pop_front();
        }
    }

    /// Step back, returning the state to restore
    pub fn undo(&mut self, current: &GraphStore) -> Option<Snapshot> {
        let previous = self.undo_stack.pop_back()?;
        self.redo_stack.push(current.export_data());
        Some(previous)
    }

    /// Step forward again after an undo
    pub fn redo(&mut self, current: &GraphStore) -> Option<Snapshot> {
        let next = self.redo_stack.pop()?;
        self.undo_stack.push_back(current.export_data());
        Some(next)
    }

    pub fn undo_count(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn redo_count(&self) -> usize {
        self.redo_stack.len()
    }
}

impl Default for History {
    fn default() -> Self {
        Self::new(100)
    }
}
