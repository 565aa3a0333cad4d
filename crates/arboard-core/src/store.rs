//! The graph store - THE owner of all boards.
//!
//! Every edit goes through [`GraphStore`]. It enforces:
//! - at least one board exists, and one of them is current
//! - connections only join live nodes of the same board
//! - at most one connection per unordered node pair
//!
//! Operations that name a stale id are no-ops reported as `false`.

use tracing::{debug, info};

use crate::error::{BoardError, Result};
use crate::ids::{BoardId, ConnectionId, NodeId};
use crate::model::{Board, Connection, ConnectionType, ConnectionUpdate, Metadata, Node};
use crate::snapshot::Snapshot;

/// Name given to the board created when none exist
pub const DEFAULT_BOARD_NAME: &str = "My First Board";

/// In-memory set of boards plus the current-board pointer
#[derive(Debug, Clone, PartialEq)]
pub struct GraphStore {
    boards: Vec<Board>,
    /// Index into `boards`; always in range
    current: usize,
}

impl GraphStore {
    /// Create a store holding a single empty default board
    pub fn new() -> Self {
        Self {
            boards: vec![Board::new(DEFAULT_BOARD_NAME)],
            current: 0,
        }
    }

    /// Build a store from a snapshot (normalized on the way in)
    pub fn from_snapshot(snapshot: Snapshot) -> Self {
        let (boards, current) = snapshot.into_normalized();
        Self { boards, current }
    }

    // --- Boards ---

    pub fn boards(&self) -> &[Board] {
        &self.boards
    }

    pub fn board(&self, id: &BoardId) -> Option<&Board> {
        self.boards.iter().find(|b| &b.id == id)
    }

    pub fn current_board(&self) -> &Board {
        &self.boards[self.current]
    }

    pub fn current_board_id(&self) -> &BoardId {
        &self.current_board().id
    }

    fn current_board_mut(&mut self) -> &mut Board {
        &mut self.boards[self.current]
    }

    fn board_index(&self, id: &BoardId) -> Option<usize> {
        self.boards.iter().position(|b| &b.id == id)
    }

    /// Append a new empty board and make it current.
    ///
    /// The name is trimmed; a blank name becomes [`DEFAULT_BOARD_NAME`].
    pub fn create_board(&mut self, name: &str) -> &Board {
        let board = Board::new(board_name(name));
        info!(board = %board.id, name = %board.name, "created board");
        self.boards.push(board);
        self.current = self.boards.len() - 1;
        &self.boards[self.current]
    }

    /// Make `id` the current board. Returns false (and changes nothing) if it
    /// does not exist.
    pub fn switch_board(&mut self, id: &BoardId) -> bool {
        match self.board_index(id) {
            Some(index) => {
                self.current = index;
                true
            }
            None => {
                debug!(board = %id, "switch to unknown board ignored");
                false
            }
        }
    }

    /// Remove a board.
    ///
    /// If it was current, the first remaining board becomes current. Removing
    /// the last board replaces it with a fresh default board.
    pub fn delete_board(&mut self, id: &BoardId) -> bool {
        let Some(index) = self.board_index(id) else {
            debug!(board = %id, "delete of unknown board ignored");
            return false;
        };

        self.boards.remove(index);
        info!(board = %id, "deleted board");

        if self.boards.is_empty() {
            self.create_board(DEFAULT_BOARD_NAME);
        } else if index == self.current {
            self.current = 0;
        } else if index < self.current {
            self.current -= 1;
        }
        true
    }

    /// Rename a board. The name is trimmed and must not end up empty.
    pub fn rename_board(&mut self, id: &BoardId, name: &str) -> Result<bool> {
        let name = non_empty_name(name)?;
        match self.board_index(id) {
            Some(index) => {
                self.boards[index].name = name;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    // --- Nodes ---

    /// Look up a node on the current board
    pub fn node(&self, id: &NodeId) -> Option<&Node> {
        self.current_board().node(id)
    }

    /// Add a node to the current board
    pub fn add_node(&mut self, name: &str, x: f64, y: f64, metadata: Metadata) -> Result<&Node> {
        let name = non_empty_name(name)?;
        check_position(x, y)?;

        let board = self.current_board_mut();
        board.nodes.push(Node {
            id: NodeId::new(),
            name,
            x,
            y,
            metadata,
        });
        let node = &board.nodes[board.nodes.len() - 1];
        debug!(node = %node.id, board = %board.id, "added node");
        Ok(node)
    }

    /// Move a node. Connections store no coordinates, so nothing else changes.
    ///
    /// Non-finite coordinates are rejected as a no-op.
    pub fn update_node_position(&mut self, id: &NodeId, x: f64, y: f64) -> bool {
        if check_position(x, y).is_err() {
            debug!(node = %id, x, y, "non-finite position ignored");
            return false;
        }
        match self.current_board_mut().node_mut(id) {
            Some(node) => {
                node.x = x;
                node.y = y;
                true
            }
            None => {
                debug!(node = %id, "move of unknown node ignored");
                false
            }
        }
    }

    /// Rename a node, with the same non-empty rule as creation
    pub fn rename_node(&mut self, id: &NodeId, name: &str) -> Result<bool> {
        let name = non_empty_name(name)?;
        Ok(match self.current_board_mut().node_mut(id) {
            Some(node) => {
                node.name = name;
                true
            }
            None => false,
        })
    }

    pub fn set_node_notes(&mut self, id: &NodeId, notes: impl Into<String>) -> bool {
        match self.current_board_mut().node_mut(id) {
            Some(node) => {
                node.metadata.notes = notes.into();
                true
            }
            None => false,
        }
    }

    /// Remove a node together with every connection that references it
    pub fn delete_node(&mut self, id: &NodeId) -> bool {
        let board = self.current_board_mut();
        let Some(index) = board.nodes.iter().position(|n| &n.id == id) else {
            debug!(node = %id, "delete of unknown node ignored");
            return false;
        };

        board.nodes.remove(index);
        let before = board.connections.len();
        board.connections.retain(|c| !c.touches(id));
        debug!(
            node = %id,
            removed_connections = before - board.connections.len(),
            "deleted node"
        );
        true
    }

    // --- Connections ---

    /// Look up a connection on the current board
    pub fn connection(&self, id: &ConnectionId) -> Option<&Connection> {
        self.current_board().connection(id)
    }

    /// Connect two nodes of the current board.
    ///
    /// Fails without mutating if either node is missing, if they are the same
    /// node, or if a connection already joins them in either direction.
    pub fn add_connection(
        &mut self,
        source: &NodeId,
        target: &NodeId,
        label: &str,
        metadata: Metadata,
        connection_type: ConnectionType,
    ) -> Result<&Connection> {
        let board = self.current_board_mut();

        for endpoint in [source, target] {
            if board.node(endpoint).is_none() {
                return Err(BoardError::InvalidReference(endpoint.to_string()));
            }
        }
        if source == target {
            return Err(BoardError::SelfConnection(source.clone()));
        }
        if board.connection_between(source, target).is_some() {
            return Err(BoardError::DuplicateConnection {
                from: source.clone(),
                to: target.clone(),
            });
        }

        board.connections.push(Connection {
            id: ConnectionId::new(),
            source: source.clone(),
            target: target.clone(),
            label: label.to_string(),
            connection_type,
            metadata,
        });
        let connection = &board.connections[board.connections.len() - 1];
        debug!(connection = %connection.id, %source, %target, "added connection");
        Ok(connection)
    }

    /// Edit a connection's label, type or notes
    pub fn update_connection(&mut self, id: &ConnectionId, update: ConnectionUpdate) -> bool {
        let Some(connection) = self.current_board_mut().connection_mut(id) else {
            debug!(connection = %id, "update of unknown connection ignored");
            return false;
        };
        if let Some(label) = update.label {
            connection.label = label;
        }
        if let Some(connection_type) = update.connection_type {
            connection.connection_type = connection_type;
        }
        if let Some(notes) = update.notes {
            connection.metadata.notes = notes;
        }
        true
    }

    pub fn delete_connection(&mut self, id: &ConnectionId) -> bool {
        let board = self.current_board_mut();
        match board.connections.iter().position(|c| &c.id == id) {
            Some(index) => {
                board.connections.remove(index);
                true
            }
            None => {
                debug!(connection = %id, "delete of unknown connection ignored");
                false
            }
        }
    }

    // --- Snapshots ---

    /// Deep copy of every board plus the current-board pointer
    pub fn export_data(&self) -> Snapshot {
        Snapshot::from_store(self)
    }

    /// Replace all boards with the contents of `snapshot`
    pub fn import_data(&mut self, snapshot: Snapshot) {
        let (boards, current) = snapshot.into_normalized();
        info!(boards = boards.len(), "imported snapshot");
        self.boards = boards;
        self.current = current;
    }

    /// Parse, validate and apply `.arb` JSON text. The store is untouched on error.
    pub fn import_json(&mut self, text: &str) -> Result<()> {
        let snapshot = Snapshot::from_json_str(text)?;
        self.import_data(snapshot);
        Ok(())
    }
}

impl Default for GraphStore {
    fn default() -> Self {
        Self::new()
    }
}

/// Trimmed board name, or the default name when nothing is left
pub(crate) fn board_name(name: &str) -> String {
    match name.trim() {
        "" => DEFAULT_BOARD_NAME.to_string(),
        trimmed => trimmed.to_string(),
    }
}

fn non_empty_name(name: &str) -> Result<String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(BoardError::EmptyName);
    }
    Ok(trimmed.to_string())
}

fn check_position(x: f64, y: f64) -> Result<()> {
    if x.is_finite() && y.is_finite() {
        Ok(())
    } else {
        Err(BoardError::InvalidPosition { x, y })
    }
}
