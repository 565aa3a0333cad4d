//! Editing session: a store plus selection, undo history and autosave.
//!
//! Every mutation goes through [`Editor`] so that it can:
//! - record an undo checkpoint when the store actually changed
//! - drop a selection that no longer points at anything
//! - autosave to the storage path, if one is set

use std::path::{Path, PathBuf};

use anyhow::Result;
use arboard_core::{
    BoardId, ConnectionId, ConnectionType, ConnectionUpdate, GraphStore, Metadata, NodeId, Selection, Snapshot,
};
use arboard_export::{render, RenderConfig, RenderPlan};
use tracing::warn;

use crate::file_io::{load_snapshot, save_snapshot};
use crate::history::History;

#[derive(Debug, Clone)]
pub struct Editor {
    store: GraphStore,
    selection: Option<Selection>,
    history: History,
    /// Where the session autosaves (if anywhere)
    storage_path: Option<PathBuf>,
    /// Whether there are unsaved changes
    dirty: bool,
}

impl Editor {
    pub fn new() -> Self {
        Self::from_store(GraphStore::new())
    }

    pub fn from_store(store: GraphStore) -> Self {
        Self {
            store,
            selection: None,
            history: History::default(),
            storage_path: None,
            dirty: false,
        }
    }

    /// Open a board file; later mutations autosave back to it
    pub fn load(path: &Path) -> Result<Self> {
        let snapshot = load_snapshot(path)?;
        let mut editor = Self::from_store(GraphStore::from_snapshot(snapshot));
        editor.storage_path = Some(path.to_path_buf());
        Ok(editor)
    }

    /// Open `path` if it exists, otherwise start fresh and autosave there
    pub fn open_or_new(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            let mut editor = Self::new();
            editor.storage_path = Some(path.to_path_buf());
            Ok(editor)
        }
    }

    /// Save to the storage path (no-op without one)
    pub fn save(&mut self) -> Result<()> {
        if let Some(path) = &self.storage_path {
            save_snapshot(&self.store.export_data(), path)?;
            self.dirty = false;
        }
        Ok(())
    }

    /// Save to a specific path and make it the storage path
    pub fn save_to(&mut self, path: &Path) -> Result<()> {
        save_snapshot(&self.store.export_data(), path)?;
        self.storage_path = Some(path.to_path_buf());
        self.dirty = false;
        Ok(())
    }

    pub fn store(&self) -> &GraphStore {
        &self.store
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn storage_path(&self) -> Option<&Path> {
        self.storage_path.as_deref()
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    /// Render the current board with the current selection
    pub fn render(&self, config: &RenderConfig) -> RenderPlan {
        render(self.store.current_board(), self.selection.as_ref(), config)
    }

    // --- Selection ---

    pub fn selection(&self) -> Option<&Selection> {
        self.selection.as_ref()
    }

    /// Select a node or connection on the current board.
    ///
    /// Returns false (and leaves the selection alone) if it does not exist.
    pub fn select(&mut self, selection: Selection) -> bool {
        if !self.resolves(&selection) {
            return false;
        }
        self.selection = Some(selection);
        true
    }

    pub fn clear_selection(&mut self) {
        self.selection = None;
    }

    fn resolves(&self, selection: &Selection) -> bool {
        match selection {
            Selection::Node(id) => self.store.node(id).is_some(),
            Selection::Connection(id) => self.store.connection(id).is_some(),
        }
    }

    // --- Mutations ---

    /// Finish a mutation that changed the store
    fn commit(&mut self, before: Snapshot) {
        self.history.record(before);
        self.dirty = true;
        if self.selection.as_ref().is_some_and(|s| !self.resolves(s)) {
            self.selection = None;
        }
        self.autosave();
    }

    fn autosave(&mut self) {
        if self.storage_path.is_none() {
            return;
        }
        if let Err(e) = self.save() {
            warn!("autosave failed: {e:#}");
        }
    }

    pub fn create_board(&mut self, name: &str) -> BoardId {
        let before = self.store.export_data();
        let id = self.store.create_board(name).id.clone();
        self.selection = None;
        self.commit(before);
        id
    }

    /// Switch boards; a successful switch clears the selection
    pub fn switch_board(&mut self, id: &BoardId) -> bool {
        if self.store.current_board_id() == id {
            self.selection = None;
            return true;
        }
        let before = self.store.export_data();
        if !self.store.switch_board(id) {
            return false;
        }
        self.selection = None;
        self.commit(before);
        true
    }

    pub fn delete_board(&mut self, id: &BoardId) -> bool {
        let before = self.store.export_data();
        let was_current = self.store.current_board_id() == id;
        if !self.store.delete_board(id) {
            return false;
        }
        if was_current {
            self.selection = None;
        }
        self.commit(before);
        true
    }

    pub fn rename_board(&mut self, id: &BoardId, name: &str) -> arboard_core::Result<bool> {
        let before = self.store.export_data();
        let renamed = self.store.rename_board(id, name)?;
        if renamed {
            self.commit(before);
        }
        Ok(renamed)
    }

    pub fn add_node(&mut self, name: &str, x: f64, y: f64, metadata: Metadata) -> arboard_core::Result<NodeId> {
        let before = self.store.export_data();
        let id = self.store.add_node(name, x, y, metadata)?.id.clone();
        self.commit(before);
        Ok(id)
    }

    pub fn move_node(&mut self, id: &NodeId, x: f64, y: f64) -> bool {
        let before = self.store.export_data();
        let moved = self.store.update_node_position(id, x, y);
        if moved {
            self.commit(before);
        }
        moved
    }

    pub fn rename_node(&mut self, id: &NodeId, name: &str) -> arboard_core::Result<bool> {
        let before = self.store.export_data();
        let renamed = self.store.rename_node(id, name)?;
        if renamed {
            self.commit(before);
        }
        Ok(renamed)
    }

    pub fn set_node_notes(&mut self, id: &NodeId, notes: &str) -> bool {
        let before = self.store.export_data();
        let changed = self.store.set_node_notes(id, notes);
        if changed {
            self.commit(before);
        }
        changed
    }

    /// Delete a node and its connections; clears the selection if it pointed
    /// at any of them
    pub fn delete_node(&mut self, id: &NodeId) -> bool {
        let before = self.store.export_data();
        let deleted = self.store.delete_node(id);
        if deleted {
            self.commit(before);
        }
        deleted
    }

    pub fn add_connection(
        &mut self,
        source: &NodeId,
        target: &NodeId,
        label: &str,
        metadata: Metadata,
        connection_type: ConnectionType,
    ) -> arboard_core::Result<ConnectionId> {
        let before = self.store.export_data();
        let id = self
            .store
            .add_connection(source, target, label, metadata, connection_type)?
            .id
            .clone();
        self.commit(before);
        Ok(id)
    }

    pub fn update_connection(&mut self, id: &ConnectionId, update: ConnectionUpdate) -> bool {
        let before = self.store.export_data();
        let changed = self.store.update_connection(id, update);
        if changed {
            self.commit(before);
        }
        changed
    }

    pub fn delete_connection(&mut self, id: &ConnectionId) -> bool {
        let before = self.store.export_data();
        let deleted = self.store.delete_connection(id);
        if deleted {
            self.commit(before);
        }
        deleted
    }

    /// Replace every board with the snapshot's contents
    pub fn import_snapshot(&mut self, snapshot: Snapshot) {
        let before = self.store.export_data();
        self.store.import_data(snapshot);
        self.selection = None;
        self.commit(before);
    }

    /// Import `.arb` JSON text; on error nothing changes
    pub fn import_json(&mut self, text: &str) -> arboard_core::Result<()> {
        let snapshot = Snapshot::from_json_str(text)?;
        self.import_snapshot(snapshot);
        Ok(())
    }

    pub fn undo(&mut self) -> bool {
        match self.history.undo(&self.store) {
            Some(previous) => {
                self.restore(previous);
                true
            }
            None => false,
        }
    }

    pub fn redo(&mut self) -> bool {
        match self.history.redo(&self.store) {
            Some(next) => {
                self.restore(next);
                true
            }
            None => false,
        }
    }

    fn restore(&mut self, snapshot: Snapshot) {
        self.store = GraphStore::from_snapshot(snapshot);
        self.dirty = true;
        if self.selection.as_ref().is_some_and(|s| !self.resolves(s)) {
            self.selection = None;
        }
        self.autosave();
    }
}

impl Default for Editor {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arboard_core::BoardError;
    use proptest::prelude::*;

    fn editor_with_pair() -> (Editor, NodeId, NodeId) {
        let mut editor = Editor::new();
        let alice = editor.add_node("Alice", 50.0, 50.0, Metadata::default()).unwrap();
        let bob = editor.add_node("Bob", 150.0, 50.0, Metadata::default()).unwrap();
        (editor, alice, bob)
    }

    #[test]
    fn switching_boards_clears_selection() {
        let (mut editor, alice, _) = editor_with_pair();
        let first = editor.store().current_board_id().clone();
        assert!(editor.select(Selection::Node(alice)));

        let second = editor.create_board("Second");
        assert!(editor.selection().is_none());

        assert!(editor.switch_board(&first));
        assert!(editor.selection().is_none());
        assert!(!editor.switch_board(&BoardId::from("missing")));
        assert_ne!(editor.store().current_board_id(), &second);
    }

    #[test]
    fn cannot_select_missing_entities() {
        let (mut editor, _, _) = editor_with_pair();
        assert!(!editor.select(Selection::Node(NodeId::from("ghost"))));
        assert!(!editor.select(Selection::Connection(ConnectionId::from("ghost"))));
        assert!(editor.selection().is_none());
    }

    #[test]
    fn deleting_node_clears_selection_of_its_connections() {
        let (mut editor, alice, bob) = editor_with_pair();
        let conn = editor
            .add_connection(&alice, &bob, "Friend", Metadata::default(), ConnectionType::Unidirectional)
            .unwrap();
        assert!(editor.select(Selection::Connection(conn)));

        assert!(editor.delete_node(&bob));
        assert!(editor.selection().is_none());
        assert!(editor.store().current_board().connections.is_empty());
    }

    #[test]
    fn unrelated_deletion_keeps_selection() {
        let (mut editor, alice, bob) = editor_with_pair();
        assert!(editor.select(Selection::Node(alice.clone())));
        assert!(editor.delete_node(&bob));
        assert_eq!(editor.selection(), Some(&Selection::Node(alice)));
    }

    #[test]
    fn duplicate_connection_records_no_history() {
        let (mut editor, alice, bob) = editor_with_pair();
        editor
            .add_connection(&alice, &bob, "Friend", Metadata::default(), ConnectionType::default())
            .unwrap();
        let depth = editor.history().undo_count();

        let err = editor
            .add_connection(&bob, &alice, "Friend", Metadata::default(), ConnectionType::default())
            .unwrap_err();
        assert!(matches!(err, BoardError::DuplicateConnection { .. }));
        assert_eq!(editor.history().undo_count(), depth);
    }

    #[test]
    fn undo_and_redo_restore_states() {
        let (mut editor, alice, _) = editor_with_pair();
        assert!(editor.move_node(&alice, 0.0, 0.0));

        assert!(editor.undo());
        let node = editor.store().node(&alice).unwrap();
        assert_eq!((node.x, node.y), (50.0, 50.0));

        assert!(editor.redo());
        let node = editor.store().node(&alice).unwrap();
        assert_eq!((node.x, node.y), (0.0, 0.0));
        assert!(!editor.redo());
    }

    #[test]
    fn undo_drops_selection_of_removed_node() {
        let mut editor = Editor::new();
        let alice = editor.add_node("Alice", 0.0, 0.0, Metadata::default()).unwrap();
        assert!(editor.select(Selection::Node(alice)));
        assert!(editor.undo());
        assert!(editor.selection().is_none());
    }

    #[test]
    fn render_reflects_selection() {
        let (mut editor, alice, _) = editor_with_pair();
        editor.select(Selection::Node(alice.clone()));
        let plan = editor.render(&RenderConfig::default());
        assert!(plan.nodes().any(|n| n.id == alice && n.highlighted));
    }

    #[test]
    fn mutations_autosave_to_storage_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("autosave.arb");

        let mut editor = Editor::open_or_new(&path).unwrap();
        assert!(!path.exists());
        editor.add_node("Alice", 1.0, 2.0, Metadata::default()).unwrap();
        assert!(path.exists());
        assert!(!editor.is_dirty());

        let reopened = Editor::load(&path).unwrap();
        assert_eq!(reopened.store(), editor.store());
    }

    #[test]
    fn autosave_failure_does_not_fail_the_mutation() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("not-a-dir");
        std::fs::write(&blocker, "plain file").unwrap();
        let path = blocker.join("autosave.arb");

        let mut editor = Editor::open_or_new(&path).unwrap();
        let alice = editor.add_node("Alice", 1.0, 2.0, Metadata::default()).unwrap();

        assert!(editor.store().node(&alice).is_some());
        assert!(editor.is_dirty());
        assert!(!path.exists());
        assert!(editor.undo());
    }

    #[test]
    fn save_to_moves_the_storage_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("copy.arb");
        let (mut editor, _, _) = editor_with_pair();
        assert!(editor.storage_path().is_none());

        editor.save_to(&path).unwrap();
        assert_eq!(editor.storage_path(), Some(path.as_path()));
        assert!(!editor.is_dirty());
        assert_eq!(Editor::load(&path).unwrap().store(), editor.store());
    }

    #[test]
    fn failed_import_leaves_everything_alone() {
        let (mut editor, _, _) = editor_with_pair();
        let before = editor.store().clone();
        let depth = editor.history().undo_count();
        assert!(editor.import_json(r#"{"boards": 3}"#).is_err());
        assert_eq!(editor.store(), &before);
        assert_eq!(editor.history().undo_count(), depth);
    }

    #[test]
    fn import_is_undoable() {
        let (mut editor, _, _) = editor_with_pair();
        let before = editor.store().clone();
        editor.import_json(r#"{"boards": []}"#).unwrap();
        assert_eq!(editor.store().current_board().nodes.len(), 0);
        assert!(editor.undo());
        assert_eq!(editor.store(), &before);
    }

    proptest! {
        #[test]
        fn undoing_everything_returns_to_the_start(
            moves in proptest::collection::vec((-100.0f64..100.0, -100.0f64..100.0), 1..20)
        ) {
            let mut editor = Editor::new();
            let start = editor.store().clone();
            let id = editor.add_node("Walker", 0.0, 0.0, Metadata::default()).unwrap();
            for (x, y) in &moves {
                editor.move_node(&id, *x, *y);
            }
            while editor.undo() {}
            prop_assert_eq!(editor.store(), &start);
        }
    }
}
