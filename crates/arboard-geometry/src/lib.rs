//! Geometry for arboard diagrams.
//!
//! Everything in this crate is a pure function of its inputs:
//! - connector clipping so lines touch node circles instead of their centers
//! - label anchoring and background boxes
//! - character-based text truncation with an ellipsis marker

mod connector;
mod label;
mod point;

pub use connector::{edge_points, midpoint};
pub use label::{label_box, text_baseline, truncate, LabelBox, Truncated, ELLIPSIS};
pub use point::Point;

/// Default node circle radius in canvas units
pub const DEFAULT_NODE_RADIUS: f64 = 30.0;

/// Default maximum display length of a node name
pub const DEFAULT_NODE_NAME_MAX: usize = 10;

/// Default maximum display length of a connection label
pub const DEFAULT_LABEL_MAX: usize = 15;
