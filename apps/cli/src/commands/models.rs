//! Models command implementation.

use super::GlobalArgs;
use anyhow::Result;
use beacon_scoring::{ModelKind, ModelRegistry};
use colored::Colorize;
use serde_json::json;

/// List the artifact slot of every kind.
pub fn execute(global: &GlobalArgs, json_output: bool) -> Result<()> {
    let config = global.scoring_config()?;
    let registry = global.registry(&config);

    let entries: Vec<_> = ModelKind::ALL
        .into_iter()
        .filter(|kind| registry.exists(kind.name()))
        .map(|kind| (kind, registry.load(kind.name())))
        .collect();

    if json_output {
        let out: Vec<_> = entries
            .iter()
            .map(|(kind, loaded)| match loaded {
                Ok(artifact) => json!({
                    "name": kind.name(),
                    "path": registry.locate(kind.name()),
                    "algorithm": artifact.algorithm().name(),
                    "created_at": artifact.created_at(),
                    "dataset_id": artifact.dataset_id().0,
                    "seed": artifact.seed(),
                    "metrics": artifact.metrics(),
                }),
                Err(e) => json!({
                    "name": kind.name(),
                    "path": registry.locate(kind.name()),
                    "error": e.to_string(),
                }),
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    println!();
    println!("{}", format!("Trained Models ({})", entries.len()).bold().cyan());
    println!("  {}", config.model_dir.display().to_string().dimmed());
    println!();

    if entries.is_empty() {
        println!("  {}", "No trained models found.".dimmed());
        println!("  {}", "Tip: run `beacon train --data <snapshot.json>` first.".dimmed());
        return Ok(());
    }

    println!("{:<14} {:<28} {:<22} {}", "Name", "Algorithm", "Created", "Metrics");
    println!("{}", "─".repeat(100));
    for (kind, loaded) in &entries {
        match loaded {
            Ok(artifact) => println!(
                "{:<14} {:<28} {:<22} {}",
                kind.name().cyan(),
                artifact.algorithm().name(),
                artifact.created_at().format("%Y-%m-%d %H:%M:%S").to_string().dimmed(),
                artifact.metrics().scores.summary()
            ),
            Err(e) => println!("{:<14} {}", kind.name().cyan(), e.to_string().red()),
        }
    }
    println!();
    Ok(())
}
