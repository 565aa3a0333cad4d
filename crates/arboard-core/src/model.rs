//! Board, node and connection data.
//!
//! Field names and shapes match the `.arb` snapshot format. Deserialization is
//! lenient about optional data: missing or `null` names, labels, notes and
//! connection types fall back to their defaults.

use serde::{Deserialize, Deserializer, Serialize};

use crate::ids::{BoardId, ConnectionId, NodeId};

/// Treat a missing or `null` value as `T::default()`
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}

/// Free-form annotations attached to nodes and connections
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metadata {
    #[serde(default, deserialize_with = "null_as_default", skip_serializing_if = "String::is_empty")]
    pub notes: String,
}

impl Metadata {
    pub fn with_notes(notes: impl Into<String>) -> Self {
        Self { notes: notes.into() }
    }
}

/// Direction of a relationship
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionType {
    #[default]
    Unidirectional,
    Bidirectional,
}

impl ConnectionType {
    pub fn name(self) -> &'static str {
        match self {
            ConnectionType::Unidirectional => "unidirectional",
            ConnectionType::Bidirectional => "bidirectional",
        }
    }

    pub fn is_bidirectional(self) -> bool {
        self == ConnectionType::Bidirectional
    }
}

// Anything other than "bidirectional" (including null) reads as unidirectional.
impl<'de> Deserialize<'de> for ConnectionType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Option::<String>::deserialize(deserializer)?;
        Ok(match raw.as_deref() {
            Some("bidirectional") => ConnectionType::Bidirectional,
            _ => ConnectionType::Unidirectional,
        })
    }
}

/// A named entity with a canvas position
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub id: NodeId,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    pub x: f64,
    pub y: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub metadata: Metadata,
}

/// A labeled relationship between two nodes of the same board
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Connection {
    pub id: ConnectionId,
    pub source: NodeId,
    pub target: NodeId,
    #[serde(default, deserialize_with = "null_as_default")]
    pub label: String,
    #[serde(default)]
    pub connection_type: ConnectionType,
    #[serde(default, deserialize_with = "null_as_default")]
    pub metadata: Metadata,
}

impl Connection {
    pub fn touches(&self, node: &NodeId) -> bool {
        &self.source == node || &self.target == node
    }

    /// True if this connection joins `a` and `b`, in either direction
    pub fn joins(&self, a: &NodeId, b: &NodeId) -> bool {
        (&self.source == a && &self.target == b) || (&self.source == b && &self.target == a)
    }
}

/// Partial edit of a connection; `None` fields are left unchanged
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConnectionUpdate {
    pub label: Option<String>,
    pub connection_type: Option<ConnectionType>,
    pub notes: Option<String>,
}

/// An independent diagram with its own nodes and connections
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Board {
    pub id: BoardId,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub nodes: Vec<Node>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub connections: Vec<Connection>,
}

impl Board {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: BoardId::new(),
            name: name.into(),
            nodes: Vec::new(),
            connections: Vec::new(),
        }
    }

    pub fn node(&self, id: &NodeId) -> Option<&Node> {
        self.nodes.iter().find(|n| &n.id == id)
    }

    pub fn connection(&self, id: &ConnectionId) -> Option<&Connection> {
        self.connections.iter().find(|c| &c.id == id)
    }

    pub(crate) fn node_mut(&mut self, id: &NodeId) -> Option<&mut Node> {
        self.nodes.iter_mut().find(|n| &n.id == id)
    }

    pub(crate) fn connection_mut(&mut self, id: &ConnectionId) -> Option<&mut Connection> {
        self.connections.iter_mut().find(|c| &c.id == id)
    }

    /// Find the connection between `a` and `b` regardless of direction
    pub fn connection_between(&self, a: &NodeId, b: &NodeId) -> Option<&Connection> {
        self.connections.iter().find(|c| c.joins(a, b))
    }

    /// Connections with `node` as source or target
    pub fn connections_of<'a>(&'a self, node: &'a NodeId) -> impl Iterator<Item = &'a Connection> + 'a {
        self.connections.iter().filter(move |c| c.touches(node))
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.connections.is_empty()
    }
}
