//! SVG export of a render plan
//!
//! Mirrors the structure of the interactive canvas:
//! - a `connections-group` followed by a `nodes-group`
//! - arrowhead markers defined once in `<defs>`
//! - dashed strokes for bidirectional connections
//! - `<title>` tooltips carrying untruncated text

use std::fmt::{self, Write};
use std::path::Path;

use anyhow::{Context, Result};
use arboard_geometry::Point;

use crate::render::{ConnectionPrimitive, NodePrimitive, Primitive, RenderPlan};

/// Blank space around the drawing
const MARGIN: f64 = 20.0;
/// Canvas size used when the board is empty
const EMPTY_SIZE: f64 = 200.0;

const LINE_COLOR: &str = "#95A5A6";
const SELECTED_COLOR: &str = "#E74C3C";
const NODE_FILL: &str = "#3498DB";
const NODE_STROKE: &str = "#2C3E50";
const TEXT_COLOR: &str = "#FFFFFF";
const LABEL_TEXT_COLOR: &str = "#2C3E50";

/// Export a render plan to an SVG string
pub fn export_svg(plan: &RenderPlan) -> String {
    let mut output = String::new();
    // Writing into a String cannot fail.
    let _ = write_document(&mut output, plan);
    output
}

/// Save a render plan as an SVG file
pub fn save_svg(plan: &RenderPlan, path: &Path) -> Result<()> {
    let svg = export_svg(plan);
    std::fs::write(path, svg).with_context(|| format!("Failed to save SVG to {:?}", path))?;
    Ok(())
}

fn write_document(output: &mut String, plan: &RenderPlan) -> fmt::Result {
    let (min, max) = plan
        .bounds()
        .unwrap_or((Point::new(0.0, 0.0), Point::new(EMPTY_SIZE, EMPTY_SIZE)));
    let x = min.x - MARGIN;
    let y = min.y - MARGIN;
    let width = max.x - min.x + 2.0 * MARGIN;
    let height = max.y - min.y + 2.0 * MARGIN;

    writeln!(
        output,
        r#"<?xml version="1.0" encoding="UTF-8"?>
<svg xmlns="http://www.w3.org/2000/svg"
     width="{w}" height="{h}"
     viewBox="{x} {y} {w} {h}"
     style="background-color: white;">"#,
        w = num(width),
        h = num(height),
        x = num(x),
        y = num(y),
    )?;

    // The start marker reverses so that both heads point away from the line.
    writeln!(
        output,
        r#"  <defs>
    <marker id="arrow-end" markerWidth="10" markerHeight="10" refX="9" refY="3"
            orient="auto" markerUnits="strokeWidth">
      <path d="M0,0 L0,6 L9,3 z" fill="{c}"/>
    </marker>
    <marker id="arrow-start" markerWidth="10" markerHeight="10" refX="9" refY="3"
            orient="auto-start-reverse" markerUnits="strokeWidth">
      <path d="M0,0 L0,6 L9,3 z" fill="{c}"/>
    </marker>
  </defs>"#,
        c = LINE_COLOR
    )?;

    writeln!(output, r#"  <g class="connections-group">"#)?;
    for primitive in plan.iter() {
        if let Primitive::Connection(c) = primitive {
            write_connection(output, c)?;
        }
    }
    writeln!(output, "  </g>")?;

    writeln!(output, r#"  <g class="nodes-group">"#)?;
    for primitive in plan.iter() {
        if let Primitive::Node(n) = primitive {
            write_node(output, n)?;
        }
    }
    writeln!(output, "  </g>")?;

    writeln!(output, "</svg>")
}

fn write_connection(output: &mut String, c: &ConnectionPrimitive) -> fmt::Result {
    let class = if c.highlighted { "connection selected" } else { "connection" };
    let stroke = if c.highlighted { SELECTED_COLOR } else { LINE_COLOR };
    writeln!(
        output,
        r#"    <g class="{}" data-connection-id="{}">"#,
        class,
        escape_xml(c.id.as_str())
    )?;

    let dash = if c.dashed { r#" stroke-dasharray="5,5""# } else { "" };
    let start_marker = if c.arrows.at_start() {
        r#" marker-start="url(#arrow-start)""#
    } else {
        ""
    };
    writeln!(
        output,
        r#"      <line class="connection-line" x1="{}" y1="{}" x2="{}" y2="{}" stroke="{}" stroke-width="2"{}{} marker-end="url(#arrow-end)"/>"#,
        num(c.start.x),
        num(c.start.y),
        num(c.end.x),
        num(c.end.y),
        stroke,
        dash,
        start_marker
    )?;

    if let Some(label) = &c.label {
        let b = label.background;
        writeln!(
            output,
            r#"      <rect x="{}" y="{}" width="{}" height="{}" rx="3" fill="white" stroke="{}" stroke-width="1"/>"#,
            num(b.origin.x),
            num(b.origin.y),
            num(b.width),
            num(b.height),
            LINE_COLOR
        )?;
        writeln!(
            output,
            r#"      <text class="connection-label" x="{}" y="{}" text-anchor="middle" font-family="sans-serif" font-size="12" fill="{}">{}</text>"#,
            num(b.text_anchor.x),
            num(b.text_anchor.y),
            LABEL_TEXT_COLOR,
            escape_xml(&label.text.display)
        )?;
        if let Some(full) = label.text.tooltip() {
            writeln!(output, "      <title>{}</title>", escape_xml(full))?;
        }
    }

    writeln!(output, "    </g>")
}

fn write_node(output: &mut String, n: &NodePrimitive) -> fmt::Result {
    let class = if n.highlighted { "node selected" } else { "node" };
    let stroke = if n.highlighted { SELECTED_COLOR } else { NODE_STROKE };
    let stroke_width = if n.highlighted { 3 } else { 2 };
    writeln!(
        output,
        r#"    <g class="{}" data-node-id="{}">"#,
        class,
        escape_xml(n.id.as_str())
    )?;
    if let Some(full) = n.name.tooltip() {
        writeln!(output, "      <title>{}</title>", escape_xml(full))?;
    }
    writeln!(
        output,
        r#"      <circle class="node-circle" cx="{}" cy="{}" r="{}" fill="{}" stroke="{}" stroke-width="{}"/>"#,
        num(n.center.x),
        num(n.center.y),
        num(n.radius),
        NODE_FILL,
        stroke,
        stroke_width
    )?;
    writeln!(
        output,
        r#"      <text class="node-text" x="{}" y="{}" text-anchor="middle" font-family="sans-serif" font-size="12" fill="{}">{}</text>"#,
        num(n.name_anchor.x),
        num(n.name_anchor.y),
        TEXT_COLOR,
        escape_xml(&n.name.display)
    )?;
    writeln!(output, "    </g>")
}

/// Format a coordinate with at most two decimals
fn num(v: f64) -> String {
    let rounded = (v * 100.0).round() / 100.0;
    // Adding 0.0 turns -0.0 into 0.0
    format!("{}", rounded + 0.0)
}

/// Escape special XML characters
fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}
