//! Versioned snapshot of a whole store, as stored in `.arb` files.
//!
//! Import is two-stage:
//! 1. [`Snapshot::from_value`] checks the structural shape and rejects
//!    payloads without a `boards` array.
//! 2. [`Snapshot::into_normalized`] repairs everything else: duplicate ids,
//!    connections to missing nodes, self-connections and duplicate edges.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::{BoardError, Result};
use crate::ids::{BoardId, ConnectionId, NodeId};
use crate::model::Board;
use crate::store::{board_name, GraphStore, DEFAULT_BOARD_NAME};

/// Format version written by this crate
pub const SNAPSHOT_VERSION: &str = "1.0";

/// Serialized form of the entire store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    #[serde(default)]
    pub version: Option<String>,
    pub boards: Vec<Board>,
    #[serde(default)]
    pub current_board_id: Option<BoardId>,
}

impl Snapshot {
    /// Copy every board out of `store`
    pub fn from_store(store: &GraphStore) -> Self {
        Self {
            version: Some(SNAPSHOT_VERSION.to_string()),
            boards: store.boards().to_vec(),
            current_board_id: Some(store.current_board_id().clone()),
        }
    }

    /// Validate and decode a parsed JSON payload
    pub fn from_value(value: Value) -> Result<Self> {
        let Some(object) = value.as_object() else {
            return Err(BoardError::MalformedSnapshot(
                "expected a JSON object at the top level".into(),
            ));
        };
        match object.get("boards") {
            Some(Value::Array(_)) => {}
            Some(_) => {
                return Err(BoardError::MalformedSnapshot("`boards` must be an array".into()));
            }
            None => {
                return Err(BoardError::MalformedSnapshot("missing `boards` array".into()));
            }
        }

        let snapshot: Snapshot = serde_json::from_value(value)
            .map_err(|e| BoardError::MalformedSnapshot(e.to_string()))?;
        match snapshot.version.as_deref() {
            Some(SNAPSHOT_VERSION) => {}
            version => debug!(?version, "reading snapshot with unfamiliar version"),
        }
        Ok(snapshot)
    }

    /// Parse `.arb` JSON text
    pub fn from_json_str(text: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(text)?;
        Self::from_value(value)
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Repair the snapshot's boards and resolve the current board index.
    ///
    /// The result always holds at least one board.
    pub fn into_normalized(self) -> (Vec<Board>, usize) {
        let mut boards = normalize_boards(self.boards);
        if boards.is_empty() {
            warn!("snapshot has no boards, starting with a default board");
            boards.push(Board::new(DEFAULT_BOARD_NAME));
        }

        let current = self
            .current_board_id
            .as_ref()
            .and_then(|id| boards.iter().position(|b| &b.id == id))
            .unwrap_or(0);
        (boards, current)
    }
}

/// Ids seen so far across the whole snapshot
#[derive(Default)]
struct SeenIds {
    boards: HashSet<BoardId>,
    nodes: HashSet<NodeId>,
    connections: HashSet<ConnectionId>,
}

fn normalize_boards(boards: Vec<Board>) -> Vec<Board> {
    let mut seen = SeenIds::default();
    boards
        .into_iter()
        .map(|mut board| {
            if !seen.boards.insert(board.id.clone()) {
                let fresh = BoardId::new();
                warn!(board = %board.id, new_id = %fresh, "duplicate board id, reassigning");
                board.id = fresh.clone();
                seen.boards.insert(fresh);
            }
            let name = board_name(&board.name);
            if name != board.name {
                warn!(board = %board.id, name = %name, "normalizing board name");
                board.name = name;
            }
            normalize_board(&mut board, &mut seen);
            board
        })
        .collect()
}

fn normalize_board(board: &mut Board, seen: &mut SeenIds) {
    // Within one board a repeated node id is ambiguous, so the later node goes.
    // A node id already used by an earlier board gets a fresh id, and this
    // board's connections follow the rename.
    let board_id = board.id.clone();
    let mut local_nodes = HashSet::new();
    let mut renamed: HashMap<NodeId, NodeId> = HashMap::new();
    board.nodes.retain_mut(|node| {
        if !local_nodes.insert(node.id.clone()) {
            warn!(board = %board_id, node = %node.id, "dropping duplicate node");
            return false;
        }
        if !seen.nodes.insert(node.id.clone()) {
            let fresh = NodeId::new();
            warn!(node = %node.id, new_id = %fresh, "node id used by another board, reassigning");
            renamed.insert(node.id.clone(), fresh.clone());
            node.id = fresh.clone();
            seen.nodes.insert(fresh);
        }
        true
    });

    let live: HashSet<NodeId> = board.nodes.iter().map(|n| n.id.clone()).collect();
    let mut local_connections = HashSet::new();
    let mut pairs = HashSet::new();

    board.connections.retain_mut(|conn| {
        if let Some(fresh) = renamed.get(&conn.source) {
            conn.source = fresh.clone();
        }
        if let Some(fresh) = renamed.get(&conn.target) {
            conn.target = fresh.clone();
        }

        if !local_connections.insert(conn.id.clone()) {
            warn!(board = %board_id, connection = %conn.id, "dropping duplicate connection");
            return false;
        }
        if !live.contains(&conn.source) || !live.contains(&conn.target) {
            warn!(board = %board_id, connection = %conn.id, "dropping connection to missing node");
            return false;
        }
        if conn.source == conn.target {
            warn!(board = %board_id, connection = %conn.id, "dropping self-connection");
            return false;
        }
        let pair = if conn.source <= conn.target {
            (conn.source.clone(), conn.target.clone())
        } else {
            (conn.target.clone(), conn.source.clone())
        };
        if !pairs.insert(pair) {
            warn!(board = %board_id, connection = %conn.id, "dropping duplicate edge");
            return false;
        }
        if !seen.connections.insert(conn.id.clone()) {
            let fresh = ConnectionId::new();
            warn!(connection = %conn.id, new_id = %fresh, "connection id used by another board, reassigning");
            conn.id = fresh.clone();
            seen.connections.insert(fresh);
        }
        true
    });
}
