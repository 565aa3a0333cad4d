use crate::ids::NodeId;

/// Errors reported by board mutations and snapshot import
#[derive(thiserror::Error, Debug)]
pub enum BoardError {
    #[error("Connection already exists between {from} and {to}")]
    DuplicateConnection { from: NodeId, to: NodeId },

    #[error("Cannot connect node {0} to itself")]
    SelfConnection(NodeId),

    #[error("No such node or connection on the current board: {0}")]
    InvalidReference(String),

    #[error("Name must not be empty")]
    EmptyName,

    #[error("Coordinates must be finite, got ({x}, {y})")]
    InvalidPosition { x: f64, y: f64 },

    #[error("Invalid board file: {0}")]
    MalformedSnapshot(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, BoardError>;
