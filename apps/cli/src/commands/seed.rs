//! Seed command implementation.

use super::GlobalArgs;
use anyhow::{Context, Result};
use beacon_store::{generate, SyntheticConfig};
use colored::Colorize;
use std::path::Path;

/// Write a synthetic snapshot. History is generated relative to the
/// configured `as_of`, or now.
pub fn execute(global: &GlobalArgs, out: &Path, contacts: usize, seed: u64) -> Result<()> {
    let config = global.scoring_config()?;
    let snapshot = generate(&SyntheticConfig {
        seed,
        contacts,
        as_of: config.as_of_or_now(),
        ..SyntheticConfig::default()
    });
    snapshot
        .save_json(out)
        .with_context(|| format!("Failed to write snapshot to {}", out.display()))?;

    println!("{}", "Synthetic history generated".bold().green());
    println!("  Contacts:      {}", snapshot.contacts.len());
    println!("  Conversations: {}", snapshot.conversations.len());
    println!("  Messages:      {}", snapshot.messages.len());
    println!("  Leads:         {}", snapshot.leads.len());
    println!("  Written to:    {}", out.display().to_string().cyan());
    Ok(())
}
