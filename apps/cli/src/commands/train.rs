//! Train command implementation.

use super::GlobalArgs;
use crate::progress::ConsoleProgressSink;
use anyhow::{bail, Result};
use beacon_scoring::{
    KindOutcome, ModelKind, NullProgressSink, ProgressSink, TrainingOrchestrator, TrainingSummary,
};
use colored::Colorize;
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

pub async fn execute(global: &GlobalArgs, data: &Path, kinds: Vec<ModelKind>, json_output: bool) -> Result<()> {
    let ctx = global.pipeline(data)?;
    let control = ctx.control();
    let orchestrator = if kinds.is_empty() {
        TrainingOrchestrator::new(ctx)
    } else {
        TrainingOrchestrator::new(ctx).with_kinds(kinds)
    };
    let sink: Arc<dyn ProgressSink> =
        if json_output { Arc::new(NullProgressSink) } else { Arc::new(ConsoleProgressSink) };

    // Training is CPU-bound; keep it off the async workers.
    let summary = tokio::task::spawn_blocking(move || orchestrator.run(sink.as_ref(), &control)).await?;
    debug!(passed = summary.passed(), total = summary.total(), "Train command finished");

    if json_output {
        println!("{}", serde_json::to_string_pretty(&summary.report())?);
    } else {
        print_summary(&summary);
    }

    if summary.passed() == 0 {
        bail!("no model kind was trained");
    }
    Ok(())
}

fn print_summary(summary: &TrainingSummary) {
    println!();
    println!("{:<14} {:<8} {}", "Kind", "Result", "Details");
    println!("{}", "─".repeat(72));
    for run in &summary.runs {
        let name = run.kind.name();
        match &run.outcome {
            KindOutcome::Trained { metrics, artifact } => {
                println!("{:<14} {:<8} {}", name, "trained".green(), metrics.scores.summary());
                println!("{:<14} {:<8} {}", "", "", artifact.path.display().to_string().dimmed());
            }
            KindOutcome::Skipped { reason } => println!("{:<14} {:<8} {}", name, "skipped".yellow(), reason),
            KindOutcome::Failed { stage, error } => {
                println!("{:<14} {:<8} {} ({stage})", name, "failed".red(), error);
            }
        }
    }
    println!();
}
