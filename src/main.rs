mod commands;

use std::path::PathBuf;

use anyhow::Result;
use arboard_session::{default_storage_path, Editor};
use clap::{Parser, Subcommand};
use tracing::debug;
use tracing_subscriber::EnvFilter;

/// Relationship board editor working on .arb snapshot files
#[derive(Parser, Debug)]
#[command(name = "arboard")]
#[command(version, about, long_about = None)]
struct Args {
    /// Board file to edit (defaults to the autosave file)
    #[arg(long, short, value_name = "FILE", global = true)]
    file: Option<PathBuf>,

    /// Node circle radius used for rendering
    #[arg(long, value_name = "R", global = true, allow_negative_numbers = true)]
    radius: Option<f64>,

    /// Maximum displayed node name length
    #[arg(long, value_name = "N", global = true)]
    name_max: Option<usize>,

    /// Maximum displayed connection label length
    #[arg(long, value_name = "N", global = true)]
    label_max: Option<usize>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List boards (current board marked with *)
    Boards,
    /// Create a board and make it current
    BoardNew { name: String },
    /// Make a board current
    BoardSwitch { board: String },
    /// Rename a board
    BoardRename { board: String, name: String },
    /// Delete a board
    BoardDelete { board: String },
    /// Print the nodes and connections of the current board
    Show,
    /// Add a node to the current board
    NodeAdd {
        name: String,
        #[arg(allow_negative_numbers = true)]
        x: f64,
        #[arg(allow_negative_numbers = true)]
        y: f64,
        #[arg(long)]
        notes: Option<String>,
    },
    /// Move a node
    NodeMove {
        node: String,
        #[arg(allow_negative_numbers = true)]
        x: f64,
        #[arg(allow_negative_numbers = true)]
        y: f64,
    },
    /// Rename a node
    NodeRename { node: String, name: String },
    /// Set the notes of a node
    NodeNotes { node: String, notes: String },
    /// Delete a node and its connections
    NodeDelete { node: String },
    /// Connect two nodes
    Connect {
        source: String,
        target: String,
        #[arg(long, default_value = "")]
        label: String,
        /// Relationship goes both ways
        #[arg(long)]
        bidirectional: bool,
        #[arg(long)]
        notes: Option<String>,
    },
    /// Edit a connection
    ConnectionEdit {
        connection: String,
        #[arg(long)]
        label: Option<String>,
        #[arg(long, conflicts_with = "unidirectional")]
        bidirectional: bool,
        #[arg(long)]
        unidirectional: bool,
        #[arg(long)]
        notes: Option<String>,
    },
    /// Delete a connection
    Disconnect { connection: String },
    /// Write the current board as SVG (defaults to `<board name>.svg`)
    ExportSvg {
        output: Option<PathBuf>,
        /// Node or connection to highlight
        #[arg(long)]
        select: Option<String>,
    },
    /// Print the render plan of the current board as JSON
    Render {
        #[arg(long)]
        select: Option<String>,
    },
    /// Replace all boards with the contents of another .arb file
    Import { input: PathBuf },
    /// Save all boards to another .arb file (defaults to `<board name>.arb`)
    SaveAs { output: Option<PathBuf> },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let path = args.file.clone().unwrap_or_else(default_storage_path);
    debug!(path = %path.display(), "opening board file");
    let config = commands::render_config(args.radius, args.name_max, args.label_max)?;
    let mut editor = Editor::open_or_new(&path)?;

    let output = commands::run(&mut editor, args.command, &config)?;
    if !output.is_empty() {
        println!("{}", output);
    }
    Ok(())
}
