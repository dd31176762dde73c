use crate::kind::ModelKind;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineStep {
    Gate,
    Extract,
    Train,
    Save,
}

impl fmt::Display for PipelineStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Gate => "gate",
            Self::Extract => "extract",
            Self::Train => "train",
            Self::Save => "save",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum StepStatus {
    Started,
    Done { detail: String },
    Skipped { reason: String },
    Failed { error: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ProgressEvent {
    RunStarted { kinds: Vec<ModelKind> },
    Step { kind: ModelKind, step: PipelineStep, status: StepStatus },
    RunFinished { passed: usize, total: usize },
}

/// Receives pipeline progress. The pipeline itself never prints.
pub trait ProgressSink: Send + Sync {
    fn on_event(&self, event: ProgressEvent);

    fn on_step(&self, kind: ModelKind, step: PipelineStep, status: StepStatus) {
        self.on_event(ProgressEvent::Step { kind, step, status });
    }
}

#[derive(Debug, Default)]
pub struct NullProgressSink;

impl ProgressSink for NullProgressSink {
    fn on_event(&self, _event: ProgressEvent) {}
}

/// Forwards progress into the tracing subscriber.
#[derive(Debug, Default)]
pub struct TracingProgressSink;

impl ProgressSink for TracingProgressSink {
    fn on_event(&self, event: ProgressEvent) {
        match event {
            ProgressEvent::RunStarted { kinds } => info!(kinds = ?kinds, "Training run started"),
            ProgressEvent::Step { kind, step, status } => match status {
                StepStatus::Started => info!(kind = %kind, step = %step, "Step started"),
                StepStatus::Done { detail } => info!(kind = %kind, step = %step, %detail, "Step done"),
                StepStatus::Skipped { reason } => warn!(kind = %kind, step = %step, %reason, "Step skipped"),
                StepStatus::Failed { error } => warn!(kind = %kind, step = %step, %error, "Step failed"),
            },
            ProgressEvent::RunFinished { passed, total } => info!(passed, total, "Training run finished"),
        }
    }
}
