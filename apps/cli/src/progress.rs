//! Human-oriented rendering of pipeline progress.

use beacon_scoring::{ProgressEvent, ProgressSink, StepStatus};
use colored::Colorize;

#[derive(Debug, Default)]
pub struct ConsoleProgressSink;

impl ProgressSink for ConsoleProgressSink {
    fn on_event(&self, event: ProgressEvent) {
        match event {
            ProgressEvent::RunStarted { kinds } => {
                println!("{}", format!("Training {} model kind(s)", kinds.len()).bold().cyan());
            }
            ProgressEvent::Step { kind, step, status } => {
                let prefix = format!("[{kind}:{step}]");
                match status {
                    StepStatus::Started => {}
                    StepStatus::Done { detail } => println!("  {} {}", prefix.dimmed(), detail),
                    StepStatus::Skipped { reason } => println!("  {} {}", prefix.yellow(), reason.yellow()),
                    StepStatus::Failed { error } => println!("  {} {}", prefix.red(), error.red()),
                }
            }
            ProgressEvent::RunFinished { passed, total } => {
                let line = format!("{passed}/{total} model kind(s) trained");
                if passed == total {
                    println!("{}", line.bold().green());
                } else if passed > 0 {
                    println!("{}", line.bold().yellow());
                } else {
                    println!("{}", line.bold().red());
                }
            }
        }
    }
}
