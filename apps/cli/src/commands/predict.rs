//! Predict command implementation.

use super::GlobalArgs;
use anyhow::{Context, Result};
use beacon_scoring::ModelKind;
use colored::Colorize;
use std::path::Path;

pub fn execute(global: &GlobalArgs, kind: ModelKind, entity_id: &str, data: &Path, json_output: bool) -> Result<()> {
    let ctx = global.pipeline(data)?;
    let result = ctx
        .predictor()
        .predict(kind, entity_id)
        .with_context(|| format!("Failed to score {entity_id} with the {kind} model"))?;

    if json_output {
        println!("{}", serde_json::to_string_pretty(&result)?);
        return Ok(());
    }

    let score = match result.probability {
        Some(p) => format!("{:.1}%", p * 100.0),
        None => format!("{:.1}", result.raw_score),
    };
    println!("{} {}", kind.name().bold().cyan(), entity_id.dimmed());
    println!("  Score:      {}", score.bold());
    println!("  Label:      {}", result.label.to_string().bold());
    println!("  Confidence: {:.2}", result.confidence);
    println!("  Actions:");
    for (i, action) in result.recommended_actions.iter().enumerate() {
        if i == 0 {
            println!("    {} {}", "→".green(), action.green());
        } else {
            println!("    - {action}");
        }
    }
    Ok(())
}
