//! Core types for arboard: boards, nodes, connections and the snapshot format.
//!
//! [`GraphStore`] is the single owner of all board data. Every mutation goes
//! through it, which is what keeps connections pointing at live nodes and
//! rules out duplicate edges.

mod error;
mod ids;
mod model;
mod selection;
pub mod snapshot;
mod store;

pub use error::{BoardError, Result};
pub use ids::{BoardId, ConnectionId, NodeId};
pub use model::{Board, Connection, ConnectionType, ConnectionUpdate, Metadata, Node};
pub use selection::Selection;
pub use snapshot::{Snapshot, SNAPSHOT_VERSION};
pub use store::{GraphStore, DEFAULT_BOARD_NAME};
