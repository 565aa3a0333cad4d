//! Rendering for arboard boards.
//!
//! [`render`] projects a board and the current selection onto an ordered
//! list of drawable primitives. [`export_svg`] turns that list into an SVG
//! document; other surfaces can consume the [`RenderPlan`] directly.

mod render;
mod svg;

pub use render::{
    render, ArrowStyle, ConnectionLabel, ConnectionPrimitive, NodePrimitive, Primitive, RenderConfig,
    RenderPlan,
};
pub use svg::{export_svg, save_svg};
