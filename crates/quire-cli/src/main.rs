//! Quire CLI
//!
//! Command-line interface for Quire - block pages and canvas graph views.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

use quire_core::canvas::Axis;
use quire_core::{Config, PageStore, StorageError};

mod commands;
mod output;

use output::{Output, OutputFormat};

#[derive(Parser)]
#[command(name = "quire")]
#[command(about = "Quire - block pages and canvas graph views")]
#[command(version)]
#[command(propagate_version = true)]
struct Cli {
    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Quiet mode - minimal output
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Use this config file instead of the default
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage pages
    Page {
        #[command(subcommand)]
        command: PageCommands,
    },
    /// Replay an input script against a page
    Edit {
        /// Page ID (full UUID or prefix)
        id: String,
        /// Script file (reads stdin if omitted)
        #[arg(short, long)]
        script: Option<PathBuf>,
    },
    /// Collapse or expand the blocks nested under a block
    Toggle {
        /// Page ID (full UUID or prefix)
        id: String,
        /// Index of the top-level block
        block: usize,
    },
    /// Manage canvas graph views
    Graph {
        #[command(subcommand)]
        command: GraphCommands,
    },
    /// Show or set configuration
    Config {
        #[command(subcommand)]
        command: Option<ConfigCommands>,
    },
}

#[derive(Subcommand)]
enum PageCommands {
    /// Create an empty page
    #[command(alias = "add")]
    New {
        /// Page title
        title: String,
    },
    /// List all pages
    #[command(alias = "ls")]
    List,
    /// Show a page
    Show {
        /// Page ID (full UUID or prefix)
        id: String,
        /// Body format
        #[arg(short, long, value_enum, default_value_t = BodyFormat::Text)]
        format: BodyFormat,
    },
    /// Create a page from a .json, .html or text file
    Import {
        /// File to import
        file: PathBuf,
        /// Page title (defaults to the file name)
        #[arg(short = 'T', long)]
        title: Option<String>,
    },
    /// Delete a page
    #[command(alias = "rm")]
    Delete {
        /// Page ID (full UUID or prefix)
        id: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum BodyFormat {
    Text,
    Html,
    Json,
}

#[derive(Subcommand)]
enum GraphCommands {
    /// Create an empty graph view
    #[command(alias = "add")]
    New {
        /// Graph view title
        title: String,
    },
    /// List all graph views
    #[command(alias = "ls")]
    List,
    /// Show nodes and edges
    Show {
        /// Graph view ID (full UUID or prefix)
        id: String,
    },
    /// Add a node at a scene position
    AddNode {
        /// Graph view ID (full UUID or prefix)
        id: String,
        #[arg(long, allow_hyphen_values = true)]
        x: f64,
        #[arg(long, allow_hyphen_values = true)]
        y: f64,
    },
    /// Connect two nodes
    Connect {
        /// Graph view ID (full UUID or prefix)
        id: String,
        /// Source node ID (full UUID or prefix)
        source: String,
        /// Target node ID (full UUID or prefix)
        target: String,
        /// Edge kind
        #[arg(long, value_enum, default_value_t = EdgeKindArg::Directed)]
        kind: EdgeKindArg,
    },
    /// Spread nodes evenly along an axis
    LineUp {
        /// Graph view ID (full UUID or prefix)
        id: String,
        /// Axis to line up on
        #[arg(value_enum)]
        axis: AxisArg,
        /// Node IDs (full UUID or prefix); all nodes when omitted
        nodes: Vec<String>,
    },
    /// List the nodes a rubber band from (x1, y1) to (x2, y2) would select
    Select {
        /// Graph view ID (full UUID or prefix)
        id: String,
        #[arg(allow_hyphen_values = true)]
        x1: f64,
        #[arg(allow_hyphen_values = true)]
        y1: f64,
        #[arg(allow_hyphen_values = true)]
        x2: f64,
        #[arg(allow_hyphen_values = true)]
        y2: f64,
    },
    /// Remove nodes (and their edges)
    #[command(alias = "rm")]
    Remove {
        /// Graph view ID (full UUID or prefix)
        id: String,
        /// Node IDs (full UUID or prefix)
        #[arg(required = true)]
        nodes: Vec<String>,
    },
    /// Add nodes to a collection node
    Collect {
        /// Graph view ID (full UUID or prefix)
        id: String,
        /// Collection node ID (full UUID or prefix)
        collection: String,
        /// Node IDs (full UUID or prefix)
        #[arg(required = true)]
        nodes: Vec<String>,
    },
    /// Delete a graph view
    Delete {
        /// Graph view ID (full UUID or prefix)
        id: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum EdgeKindArg {
    Directed,
    Undirected,
    Suggested,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum AxisArg {
    Horizontal,
    Vertical,
}

impl From<AxisArg> for Axis {
    fn from(axis: AxisArg) -> Self {
        match axis {
            AxisArg::Horizontal => Axis::Horizontal,
            AxisArg::Vertical => Axis::Vertical,
        }
    }
}

#[derive(Subcommand, Clone)]
enum ConfigCommands {
    /// Show current configuration
    Show,
    /// Set a configuration value
    Set {
        /// Configuration key (data_dir, log_level, canvas.stage_width, canvas.stage_height)
        key: String,
        /// Configuration value
        value: String,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let output = Output::new(OutputFormat::from_flags(cli.json, cli.quiet));
    let config_path = cli.config.as_ref();

    if let Commands::Config { command } = &cli.command {
        return match command {
            Some(ConfigCommands::Show) | None => commands::config::show(config_path, &output),
            Some(ConfigCommands::Set { key, value }) => {
                commands::config::set(key, value, config_path, &output)
            }
        };
    }

    let config =
        Config::load_with_cli_override(config_path).context("Failed to load configuration")?;
    init_logging(&config);
    let store = PageStore::new(&config);

    let result = match cli.command {
        Commands::Page { command } => handle_page_command(command, &store, &output),
        Commands::Edit { id, script } => commands::edit::run(&store, &id, script, &output),
        Commands::Toggle { id, block } => commands::page::toggle(&store, &id, block, &output),
        Commands::Graph { command } => handle_graph_command(command, &store, &config, &output),
        Commands::Config { .. } => Ok(()),
    };

    if let Err(err) = &result {
        let hint = err
            .chain()
            .find_map(|cause| cause.downcast_ref::<StorageError>())
            .and_then(StorageError::recovery_suggestion);
        if let Some(hint) = hint {
            eprintln!("hint: {}", hint);
        }
    }
    result
}

fn handle_page_command(command: PageCommands, store: &PageStore, output: &Output) -> Result<()> {
    match command {
        PageCommands::New { title } => commands::page::create(store, title, output),
        PageCommands::List => commands::page::list(store, output),
        PageCommands::Show { id, format } => commands::page::show(store, &id, format, output),
        PageCommands::Import { file, title } => commands::page::import(store, &file, title, output),
        PageCommands::Delete { id } => commands::page::delete(store, &id, output),
    }
}

fn handle_graph_command(
    command: GraphCommands,
    store: &PageStore,
    config: &Config,
    output: &Output,
) -> Result<()> {
    use commands::graph;

    match command {
        GraphCommands::New { title } => graph::create(store, title, output),
        GraphCommands::List => graph::list(store, output),
        GraphCommands::Show { id } => graph::show(store, config, &id, output),
        GraphCommands::AddNode { id, x, y } => graph::add_node(store, &id, x, y, output),
        GraphCommands::Connect {
            id,
            source,
            target,
            kind,
        } => graph::connect(store, &id, &source, &target, kind, output),
        GraphCommands::LineUp { id, axis, nodes } => {
            graph::line_up(store, config, &id, axis.into(), &nodes, output)
        }
        GraphCommands::Select { id, x1, y1, x2, y2 } => {
            graph::select(store, config, &id, (x1, y1), (x2, y2), output)
        }
        GraphCommands::Remove { id, nodes } => graph::remove(store, config, &id, &nodes, output),
        GraphCommands::Collect {
            id,
            collection,
            nodes,
        } => graph::collect(store, config, &id, &collection, &nodes, output),
        GraphCommands::Delete { id } => graph::delete(store, &id, output),
    }
}

/// Log to stderr; `QUIRE_LOG` overrides the configured level
fn init_logging(config: &Config) {
    let env_filter = EnvFilter::try_from_env("QUIRE_LOG").unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "quire_core={0},quire_cli={0}",
            config.log_level
        ))
    });

    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
