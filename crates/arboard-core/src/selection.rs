use serde::{Deserialize, Serialize};

use crate::ids::{ConnectionId, NodeId};

/// What the user currently has selected on the active board.
///
/// Selection is presentation state: it is never persisted and never mutates
/// the store. Absence of a selection is `Option::None`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", content = "id", rename_all = "lowercase")]
pub enum Selection {
    Node(NodeId),
    Connection(ConnectionId),
}

impl Selection {
    pub fn is_node(&self, id: &NodeId) -> bool {
        matches!(self, Selection::Node(selected) if selected == id)
    }

    pub fn is_connection(&self, id: &ConnectionId) -> bool {
        matches!(self, Selection::Connection(selected) if selected == id)
    }
}
