//! Status command implementation.

use super::GlobalArgs;
use anyhow::{Context, Result};
use beacon_scoring::MIN_TRAINING_EXAMPLES;
use colored::Colorize;
use serde_json::json;
use std::path::Path;

/// Gate status and model presence for every kind.
pub fn execute(global: &GlobalArgs, data: &Path, json_output: bool) -> Result<()> {
    let ctx = global.pipeline(data)?;
    let gates = ctx.gate().check_all().context("Failed to count training examples")?;

    if json_output {
        let out: serde_json::Map<String, serde_json::Value> = gates
            .iter()
            .map(|gate| {
                let name = gate.kind.name();
                let value = json!({
                    "ready": gate.is_ready,
                    "example_count": gate.example_count,
                    "required": MIN_TRAINING_EXAMPLES,
                    "model_present": ctx.registry.exists(name),
                    "artifact_path": ctx.registry.locate(name),
                });
                (name.to_string(), value)
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    println!("{}", "Beacon Status".bold().cyan());
    println!();
    println!("  Data:   {}", data.display().to_string().green());
    println!("  Models: {}", ctx.config.model_dir.display().to_string().green());
    println!();
    println!("{:<14} {:>9} {:<7} {}", "Kind", "Examples", "Ready", "Model");
    println!("{}", "─".repeat(44));
    for gate in &gates {
        let ready = if gate.is_ready { "yes".green() } else { "no".yellow() };
        let model = if ctx.registry.exists(gate.kind.name()) { "trained".green() } else { "none".dimmed() };
        println!("{:<14} {:>9} {:<7} {}", gate.kind.name(), gate.example_count, ready, model);
    }
    if gates.iter().any(|g| !g.is_ready) {
        println!();
        println!(
            "  {}",
            format!("Kinds need {MIN_TRAINING_EXAMPLES} labeled examples before they can be trained.").dimmed()
        );
    }
    if gates.iter().all(|g| !ctx.registry.exists(g.kind.name())) {
        println!("  {}", "Train with: beacon train --data <snapshot.json>".dimmed());
    }
    Ok(())
}
