//! Command handlers

pub mod config;
pub mod edit;
pub mod graph;
pub mod page;

use anyhow::{bail, Result};
use uuid::Uuid;

/// Pick the one item whose id is `key` or starts with it
fn resolve_id<T>(
    key: &str,
    kind: &str,
    items: Vec<T>,
    id_of: impl Fn(&T) -> Uuid,
    label_of: impl Fn(&T) -> String,
) -> Result<T> {
    if let Ok(uuid) = Uuid::parse_str(key) {
        if let Some(item) = items.into_iter().find(|i| id_of(i) == uuid) {
            return Ok(item);
        }
        bail!("No {} found matching: {}", kind, key);
    }

    let mut matches: Vec<T> = items
        .into_iter()
        .filter(|i| id_of(i).to_string().starts_with(key))
        .collect();

    match matches.len() {
        0 => bail!("No {} found matching: {}", kind, key),
        1 => Ok(matches.remove(0)),
        _ => {
            eprintln!("Multiple {}s match '{}':", kind, key);
            for item in &matches {
                eprintln!("  {} - {}", id_of(item), label_of(item));
            }
            bail!("Ambiguous ID. Please provide more characters.");
        }
    }
}
