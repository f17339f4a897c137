//! Output formatting for CLI
//!
//! Provides consistent output formatting across all commands:
//! - Human-readable default output
//! - JSON output (--json flag)
//! - Quiet mode for scripting (--quiet flag)

use serde::Serialize;

use quire_core::canvas::Canvas;
use quire_core::{GraphView, Page};

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable output (default)
    Human,
    /// JSON output
    Json,
    /// Quiet mode - minimal output
    Quiet,
}

impl OutputFormat {
    /// Create format from CLI flags
    pub fn from_flags(json: bool, quiet: bool) -> Self {
        if quiet {
            OutputFormat::Quiet
        } else if json {
            OutputFormat::Json
        } else {
            OutputFormat::Human
        }
    }
}

/// Output helper for consistent formatting
pub struct Output {
    /// The output format
    pub format: OutputFormat,
}

impl Output {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Check if output is in quiet mode
    pub fn is_quiet(&self) -> bool {
        matches!(self.format, OutputFormat::Quiet)
    }

    pub fn is_json(&self) -> bool {
        matches!(self.format, OutputFormat::Json)
    }

    /// Print a page header and its text
    pub fn print_page(&self, page: &Page) {
        match self.format {
            OutputFormat::Human => {
                println!("ID:       {}", page.id);
                println!("Title:    {}", page.title);
                println!("Blocks:   {}", page.json_body.children().len());
                println!("Created:  {}", page.created_at.format("%Y-%m-%d %H:%M"));
                println!("Updated:  {}", page.updated_at.format("%Y-%m-%d %H:%M"));
                if !page.text_body.is_empty() {
                    println!();
                    println!("{}", page.text_body);
                }
            }
            OutputFormat::Json => print_json(page),
            OutputFormat::Quiet => println!("{}", page.id),
        }
    }

    /// Print a list of pages
    pub fn print_pages(&self, pages: &[Page]) {
        match self.format {
            OutputFormat::Human => {
                if pages.is_empty() {
                    println!("No pages found.");
                    return;
                }
                for page in pages {
                    println!(
                        "{} | {} | {}",
                        &page.id.to_string()[..8],
                        truncate(&page.title, 35),
                        truncate_line(&page.text_body, 45)
                    );
                }
                println!("\n{} page(s)", pages.len());
            }
            OutputFormat::Json => print_json(&pages),
            OutputFormat::Quiet => {
                for page in pages {
                    println!("{}", page.id);
                }
            }
        }
    }

    /// Print a graph view with its edges' drawn endpoints
    pub fn print_graph_view(&self, view: &GraphView, canvas: &Canvas) {
        match self.format {
            OutputFormat::Human => {
                println!("ID:       {}", view.id);
                println!("Title:    {}", view.title);
                println!("Updated:  {}", view.updated_at.format("%Y-%m-%d %H:%M"));
                println!();
                println!("── Nodes ({}) ──", view.graph.nodes().len());
                for node in view.graph.nodes() {
                    println!(
                        "{}  ({:.1}, {:.1})  {}x{}",
                        &node.id.to_string()[..8],
                        node.x,
                        node.y,
                        node.width(),
                        node.height()
                    );
                }
                println!();
                println!("── Edges ({}) ──", view.graph.edges().len());
                for edge in view.graph.edges() {
                    let line = canvas
                        .edge_endpoints(edge)
                        .map(|(from, to)| {
                            format!("({:.1}, {:.1}) -> ({:.1}, {:.1})", from.x, from.y, to.x, to.y)
                        })
                        .unwrap_or_default();
                    println!(
                        "{} -> {}  {:?}  {}",
                        &edge.source.to_string()[..8],
                        &edge.target.to_string()[..8],
                        edge.kind,
                        line
                    );
                }
            }
            OutputFormat::Json => print_json(view),
            OutputFormat::Quiet => println!("{}", view.id),
        }
    }

    /// Print a list of graph views
    pub fn print_graph_views(&self, views: &[GraphView]) {
        match self.format {
            OutputFormat::Human => {
                if views.is_empty() {
                    println!("No graph views found.");
                    return;
                }
                for view in views {
                    println!(
                        "{} | {} | {} node(s), {} edge(s)",
                        &view.id.to_string()[..8],
                        truncate(&view.title, 35),
                        view.graph.nodes().len(),
                        view.graph.edges().len()
                    );
                }
                println!("\n{} graph view(s)", views.len());
            }
            OutputFormat::Json => print_json(&views),
            OutputFormat::Quiet => {
                for view in views {
                    println!("{}", view.id);
                }
            }
        }
    }

    /// Print any serializable result; human mode uses the given text
    pub fn print_value<T: Serialize>(&self, value: &T, human: &str) {
        match self.format {
            OutputFormat::Human => println!("{}", human),
            OutputFormat::Json => print_json(value),
            OutputFormat::Quiet => {}
        }
    }

    /// Print a success message
    pub fn success(&self, message: &str) {
        match self.format {
            OutputFormat::Human => println!("✓ {}", message),
            OutputFormat::Json => {
                println!(
                    "{}",
                    serde_json::json!({"status": "success", "message": message})
                );
            }
            OutputFormat::Quiet => {}
        }
    }

    /// Print an informational message
    pub fn message(&self, msg: &str) {
        match self.format {
            OutputFormat::Human => println!("{}", msg),
            OutputFormat::Json => {
                println!("{}", serde_json::json!({"message": msg}));
            }
            OutputFormat::Quiet => {}
        }
    }
}

fn print_json<T: Serialize + ?Sized>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{}", json),
        Err(e) => eprintln!("Failed to encode output: {}", e),
    }
}

/// Truncate a string to max characters, adding "..." if truncated
fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len - 3).collect();
        format!("{}...", kept)
    }
}

/// Truncate to first line and max length
fn truncate_line(s: &str, max_len: usize) -> String {
    let first_line = s.lines().next().unwrap_or("");
    truncate(first_line, max_len)
}
