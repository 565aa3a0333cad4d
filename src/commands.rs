//! Subcommand handlers.
//!
//! Entities are named on the command line by full id, unique id prefix, or
//! (for boards and nodes) exact name.

use std::fmt::Write;
use std::path::PathBuf;

use anyhow::{bail, Result};
use arboard_core::{Board, BoardId, ConnectionId, ConnectionType, ConnectionUpdate, Metadata, NodeId, Selection};
use arboard_export::{save_svg, RenderConfig};
use arboard_session::{default_file_name, load_snapshot, Editor, ARB_EXTENSION, SVG_EXTENSION};

use crate::Command;

/// Length of the id prefix shown in listings
const SHORT_ID: usize = 8;

pub(crate) fn run(editor: &mut Editor, command: Command, config: &RenderConfig) -> Result<String> {
    let mut out = String::new();
    match command {
        Command::Boards => {
            let current = editor.store().current_board_id();
            for board in editor.store().boards() {
                let marker = if &board.id == current { '*' } else { ' ' };
                writeln!(
                    out,
                    "{} {}  {}  ({} nodes, {} connections)",
                    marker,
                    short(board.id.as_str()),
                    board.name,
                    board.nodes.len(),
                    board.connections.len()
                )?;
            }
        }
        Command::BoardNew { name } => {
            let id = editor.create_board(&name);
            write!(out, "{}", id)?;
        }
        Command::BoardSwitch { board } => {
            let id = resolve_board(editor, &board)?;
            editor.switch_board(&id);
        }
        Command::BoardRename { board, name } => {
            let id = resolve_board(editor, &board)?;
            editor.rename_board(&id, &name)?;
        }
        Command::BoardDelete { board } => {
            let id = resolve_board(editor, &board)?;
            editor.delete_board(&id);
        }
        Command::Show => describe_board(&mut out, editor.store().current_board())?,
        Command::NodeAdd { name, x, y, notes } => {
            let metadata = Metadata::with_notes(notes.unwrap_or_default());
            let id = editor.add_node(&name, x, y, metadata)?;
            write!(out, "{}", id)?;
        }
        Command::NodeMove { node, x, y } => {
            let id = resolve_node(editor.store().current_board(), &node)?;
            if !editor.move_node(&id, x, y) {
                bail!("Coordinates must be finite");
            }
        }
        Command::NodeRename { node, name } => {
            let id = resolve_node(editor.store().current_board(), &node)?;
            editor.rename_node(&id, &name)?;
        }
        Command::NodeNotes { node, notes } => {
            let id = resolve_node(editor.store().current_board(), &node)?;
            editor.set_node_notes(&id, &notes);
        }
        Command::NodeDelete { node } => {
            let id = resolve_node(editor.store().current_board(), &node)?;
            editor.delete_node(&id);
        }
        Command::Connect {
            source,
            target,
            label,
            bidirectional,
            notes,
        } => {
            let board = editor.store().current_board();
            let source = resolve_node(board, &source)?;
            let target = resolve_node(board, &target)?;
            let connection_type = if bidirectional {
                ConnectionType::Bidirectional
            } else {
                ConnectionType::Unidirectional
            };
            let metadata = Metadata::with_notes(notes.unwrap_or_default());
            let id = editor.add_connection(&source, &target, &label, metadata, connection_type)?;
            write!(out, "{}", id)?;
        }
        Command::ConnectionEdit {
            connection,
            label,
            bidirectional,
            unidirectional,
            notes,
        } => {
            let id = resolve_connection(editor.store().current_board(), &connection)?;
            let connection_type = match (bidirectional, unidirectional) {
                (true, _) => Some(ConnectionType::Bidirectional),
                (_, true) => Some(ConnectionType::Unidirectional),
                _ => None,
            };
            editor.update_connection(
                &id,
                ConnectionUpdate {
                    label,
                    connection_type,
                    notes,
                },
            );
        }
        Command::Disconnect { connection } => {
            let id = resolve_connection(editor.store().current_board(), &connection)?;
            editor.delete_connection(&id);
        }
        Command::ExportSvg { output, select } => {
            apply_selection(editor, select.as_deref())?;
            let plan = editor.render(config);
            let output = output.unwrap_or_else(|| default_output(editor, SVG_EXTENSION));
            save_svg(&plan, &output)?;
            write!(out, "{}", output.display())?;
        }
        Command::Render { select } => {
            apply_selection(editor, select.as_deref())?;
            let plan = editor.render(config);
            out.push_str(&serde_json::to_string_pretty(&plan)?);
        }
        Command::Import { input } => {
            let snapshot = load_snapshot(&input)?;
            editor.import_snapshot(snapshot);
        }
        Command::SaveAs { output } => {
            let output = output.unwrap_or_else(|| default_output(editor, ARB_EXTENSION));
            editor.save_to(&output)?;
            write!(out, "{}", output.display())?;
        }
    }
    Ok(out.trim_end().to_string())
}

/// Build the render settings, falling back to defaults for unset values
pub(crate) fn render_config(
    radius: Option<f64>,
    name_max: Option<usize>,
    label_max: Option<usize>,
) -> Result<RenderConfig> {
    let defaults = RenderConfig::default();
    let node_radius = radius.unwrap_or(defaults.node_radius);
    if !node_radius.is_finite() || node_radius < 0.0 {
        bail!("Node radius must be a finite, non-negative number, got {}", node_radius);
    }
    Ok(RenderConfig {
        node_radius,
        node_name_max: name_max.unwrap_or(defaults.node_name_max),
        label_max: label_max.unwrap_or(defaults.label_max),
    })
}

/// `<current board name>.<extension>` in the working directory
fn default_output(editor: &Editor, extension: &str) -> PathBuf {
    PathBuf::from(default_file_name(&editor.store().current_board().name, extension))
}

fn short(id: &str) -> &str {
    match id.char_indices().nth(SHORT_ID) {
        Some((end, _)) => &id[..end],
        None => id,
    }
}

fn describe_board(out: &mut String, board: &Board) -> std::fmt::Result {
    writeln!(out, "{} ({})", board.name, board.id)?;

    writeln!(out, "Nodes:")?;
    for node in &board.nodes {
        write!(out, "  {}  {}  ({}, {})", short(node.id.as_str()), node.name, node.x, node.y)?;
        if !node.metadata.notes.is_empty() {
            write!(out, "  # {}", node.metadata.notes)?;
        }
        writeln!(out)?;
    }

    writeln!(out, "Connections:")?;
    for conn in &board.connections {
        let arrow = match conn.connection_type {
            ConnectionType::Unidirectional => "→",
            ConnectionType::Bidirectional => "↔",
        };
        write!(
            out,
            "  {}  {} {} {}",
            short(conn.id.as_str()),
            display_name(board, &conn.source),
            arrow,
            display_name(board, &conn.target)
        )?;
        if !conn.label.is_empty() {
            write!(out, "  \"{}\"", conn.label)?;
        }
        if !conn.metadata.notes.is_empty() {
            write!(out, "  # {}", conn.metadata.notes)?;
        }
        writeln!(out)?;
    }
    Ok(())
}

fn display_name<'a>(board: &'a Board, id: &'a NodeId) -> &'a str {
    board.node(id).map_or(id.as_str(), |n| n.name.as_str())
}

/// Find the single item whose id equals `key`, or else whose id starts with
/// `key` or whose name equals `key`
fn find_unique<'a, T>(
    items: &'a [T],
    key: &str,
    what: &str,
    id_of: impl Fn(&T) -> &str,
    name_of: impl Fn(&T) -> Option<&str>,
) -> Result<&'a T> {
    if let Some(exact) = items.iter().find(|item| id_of(item) == key) {
        return Ok(exact);
    }
    let matches: Vec<&T> = items
        .iter()
        .filter(|item| id_of(item).starts_with(key) || name_of(item) == Some(key))
        .collect();
    match matches.as_slice() {
        [one] => Ok(*one),
        [] => bail!("No {} matches {:?}", what, key),
        _ => bail!("{:?} matches more than one {}", key, what),
    }
}

fn resolve_board(editor: &Editor, key: &str) -> Result<BoardId> {
    let board = find_unique(
        editor.store().boards(),
        key,
        "board",
        |b| b.id.as_str(),
        |b| Some(b.name.as_str()),
    )?;
    Ok(board.id.clone())
}

fn resolve_node(board: &Board, key: &str) -> Result<NodeId> {
    let node = find_unique(&board.nodes, key, "node", |n| n.id.as_str(), |n| Some(n.name.as_str()))?;
    Ok(node.id.clone())
}

fn resolve_connection(board: &Board, key: &str) -> Result<ConnectionId> {
    let conn = find_unique(&board.connections, key, "connection", |c| c.id.as_str(), |_| None)?;
    Ok(conn.id.clone())
}

fn apply_selection(editor: &mut Editor, key: Option<&str>) -> Result<()> {
    let Some(key) = key else {
        return Ok(());
    };
    let board = editor.store().current_board();
    let selection = match resolve_node(board, key) {
        Ok(id) => Selection::Node(id),
        Err(_) => Selection::Connection(resolve_connection(board, key)?),
    };
    editor.select(selection);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run_ok(editor: &mut Editor, command: Command) -> String {
        run(editor, command, &RenderConfig::default()).unwrap()
    }

    #[test]
    fn nodes_resolve_by_name_or_prefix() {
        let mut editor = Editor::new();
        let alice = editor.add_node("Alice", 0.0, 0.0, Metadata::default()).unwrap();
        let board = editor.store().current_board();

        assert_eq!(resolve_node(board, "Alice").unwrap(), alice);
        assert_eq!(resolve_node(board, &alice.as_str()[..6]).unwrap(), alice);
        assert!(resolve_node(board, "Zed").is_err());
    }

    #[test]
    fn ambiguous_names_are_rejected() {
        let mut editor = Editor::new();
        editor.add_node("Sam", 0.0, 0.0, Metadata::default()).unwrap();
        editor.add_node("Sam", 100.0, 0.0, Metadata::default()).unwrap();
        let err = resolve_node(editor.store().current_board(), "Sam").unwrap_err();
        assert!(err.to_string().contains("more than one"));
    }

    #[test]
    fn connect_and_show() {
        let mut editor = Editor::new();
        run_ok(
            &mut editor,
            Command::NodeAdd { name: "Alice".into(), x: 50.0, y: 50.0, notes: None },
        );
        run_ok(
            &mut editor,
            Command::NodeAdd { name: "Bob".into(), x: 150.0, y: 50.0, notes: Some("neighbour".into()) },
        );
        run_ok(
            &mut editor,
            Command::Connect {
                source: "Alice".into(),
                target: "Bob".into(),
                label: "Friend".into(),
                bidirectional: true,
                notes: None,
            },
        );

        let shown = run_ok(&mut editor, Command::Show);
        assert!(shown.contains("Alice ↔ Bob  \"Friend\""));
        assert!(shown.contains("# neighbour"));

        let duplicate = run(
            &mut editor,
            Command::Connect {
                source: "Bob".into(),
                target: "Alice".into(),
                label: String::new(),
                bidirectional: false,
                notes: None,
            },
            &RenderConfig::default(),
        );
        assert!(duplicate.is_err());
    }

    #[test]
    fn render_prints_plan_json() {
        let mut editor = Editor::new();
        run_ok(
            &mut editor,
            Command::NodeAdd { name: "Alice".into(), x: 0.0, y: 0.0, notes: None },
        );
        let json = run_ok(&mut editor, Command::Render { select: Some("Alice".into()) });
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["primitives"][0]["kind"], "node");
        assert_eq!(value["primitives"][0]["highlighted"], true);
    }

    #[test]
    fn render_config_rejects_unusable_radii() {
        for radius in [f64::NAN, f64::INFINITY, -1.0] {
            assert!(render_config(Some(radius), None, None).is_err());
        }
        let config = render_config(Some(12.5), Some(4), None).unwrap();
        assert_eq!(config.node_radius, 12.5);
        assert_eq!(config.node_name_max, 4);
        assert_eq!(config.label_max, RenderConfig::default().label_max);
    }

    #[test]
    fn export_and_save_as_write_the_given_paths() {
        let dir = tempfile::tempdir().unwrap();
        let svg = dir.path().join("board.svg");
        let arb = dir.path().join("copy.arb");
        let mut editor = Editor::new();
        run_ok(
            &mut editor,
            Command::NodeAdd { name: "Alice".into(), x: 0.0, y: 0.0, notes: None },
        );

        let printed = run_ok(&mut editor, Command::ExportSvg { output: Some(svg.clone()), select: None });
        assert_eq!(printed, svg.display().to_string());
        assert!(std::fs::read_to_string(&svg).unwrap().contains("nodes-group"));

        run_ok(&mut editor, Command::SaveAs { output: Some(arb.clone()) });
        assert_eq!(editor.storage_path(), Some(arb.as_path()));
        assert!(load_snapshot(&arb).is_ok());
    }

    #[test]
    fn default_output_is_named_after_the_board() {
        let mut editor = Editor::new();
        editor.create_board("Work: Q3");
        assert_eq!(default_output(&editor, SVG_EXTENSION), PathBuf::from("Work- Q3.svg"));
    }

    #[test]
    fn short_ids_are_prefixes() {
        assert_eq!(short("0123456789abcdef"), "01234567");
        assert_eq!(short("id_1"), "id_1");
    }
}
