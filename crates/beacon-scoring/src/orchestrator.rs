//! Per-kind training runs with partial-failure semantics.

use crate::config::ScoringConfig;
use crate::error::ScoringError;
use crate::features::extractor_for;
use crate::gate::{DataSufficiencyGate, GateStatus};
use crate::kind::ModelKind;
use crate::metrics::TrainingMetrics;
use crate::predictor::Predictor;
use crate::progress::{PipelineStep, ProgressEvent, ProgressSink, StepStatus};
use crate::registry::{ModelRegistry, SavedArtifact};
use crate::trainer::{ModelTrainer, TrainControl};
use beacon_store::EntityStore;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{info, warn};

/// Everything a pipeline needs, passed in explicitly.
#[derive(Clone)]
pub struct PipelineContext {
    pub store: Arc<dyn EntityStore>,
    pub registry: Arc<dyn ModelRegistry>,
    pub config: ScoringConfig,
    as_of: DateTime<Utc>,
}

impl PipelineContext {
    /// Resolves `config.as_of` once so every step of a run shares the same clock.
    pub fn new(store: Arc<dyn EntityStore>, registry: Arc<dyn ModelRegistry>, config: ScoringConfig) -> Self {
        let as_of = config.as_of_or_now();
        Self { store, registry, config, as_of }
    }

    pub fn as_of(&self) -> DateTime<Utc> {
        self.as_of
    }

    pub fn gate(&self) -> DataSufficiencyGate<'_> {
        DataSufficiencyGate::new(self.store.as_ref(), self.as_of)
    }

    pub fn predictor(&self) -> Predictor {
        Predictor::new(Arc::clone(&self.store), Arc::clone(&self.registry), self.as_of)
    }

    /// A control carrying the configured deadline, starting now.
    pub fn control(&self) -> TrainControl {
        match self.config.training_deadline() {
            Some(budget) => TrainControl::new().with_deadline(budget),
            None => TrainControl::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum KindOutcome {
    Trained { metrics: TrainingMetrics, artifact: SavedArtifact },
    Skipped { reason: String },
    Failed { stage: PipelineStep, error: String },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KindRun {
    pub kind: ModelKind,
    /// `None` when the gate itself could not be evaluated.
    pub gate: Option<GateStatus>,
    pub outcome: KindOutcome,
}

impl KindRun {
    pub fn is_trained(&self) -> bool {
        matches!(self.outcome, KindOutcome::Trained { .. })
    }
}

/// Reporting shape of one kind.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KindReport {
    pub ready: bool,
    pub example_count: usize,
    pub trained: bool,
    pub metrics: Option<TrainingMetrics>,
    pub artifact_path: Option<String>,
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrainingSummary {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub runs: Vec<KindRun>,
}

impl TrainingSummary {
    /// Kinds that produced and persisted a new artifact.
    pub fn passed(&self) -> usize {
        self.runs.iter().filter(|r| r.is_trained()).count()
    }

    pub fn total(&self) -> usize {
        self.runs.len()
    }

    pub fn run(&self, kind: ModelKind) -> Option<&KindRun> {
        self.runs.iter().find(|r| r.kind == kind)
    }

    pub fn report(&self) -> BTreeMap<String, KindReport> {
        self.runs
            .iter()
            .map(|run| {
                let (metrics, artifact_path, error) = match &run.outcome {
                    KindOutcome::Trained { metrics, artifact } => {
                        (Some(*metrics), Some(artifact.path.display().to_string()), None)
                    }
                    KindOutcome::Skipped { reason } => (None, None, Some(reason.clone())),
                    KindOutcome::Failed { error, .. } => (None, None, Some(error.clone())),
                };
                let report = KindReport {
                    ready: run.gate.is_some_and(|g| g.is_ready),
                    example_count: run.gate.map_or(0, |g| g.example_count),
                    trained: run.is_trained(),
                    metrics,
                    artifact_path,
                    error,
                };
                (run.kind.name().to_string(), report)
            })
            .collect()
    }
}

/// Gate, extract, train, save and verify each kind in turn. A failure in one
/// kind is recorded and the next kind still runs.
pub struct TrainingOrchestrator {
    context: PipelineContext,
    kinds: Vec<ModelKind>,
}

impl TrainingOrchestrator {
    #[must_use]
    pub fn new(context: PipelineContext) -> Self {
        Self { context, kinds: ModelKind::ALL.to_vec() }
    }

    /// Restrict the run to `kinds`, in the given order.
    #[must_use]
    pub fn with_kinds(mut self, kinds: Vec<ModelKind>) -> Self {
        self.kinds = kinds;
        self
    }

    pub fn context(&self) -> &PipelineContext {
        &self.context
    }

    pub fn run(&self, sink: &dyn ProgressSink, control: &TrainControl) -> TrainingSummary {
        let started_at = Utc::now();
        sink.on_event(ProgressEvent::RunStarted { kinds: self.kinds.clone() });

        let runs: Vec<KindRun> = self.kinds.iter().map(|&kind| self.run_kind(kind, sink, control)).collect();

        let summary = TrainingSummary { started_at, finished_at: Utc::now(), runs };
        sink.on_event(ProgressEvent::RunFinished { passed: summary.passed(), total: summary.total() });
        info!(passed = summary.passed(), total = summary.total(), "Training pipeline complete");
        summary
    }

    fn run_kind(&self, kind: ModelKind, sink: &dyn ProgressSink, control: &TrainControl) -> KindRun {
        let ctx = &self.context;
        let failed = |gate: Option<GateStatus>, stage: PipelineStep, err: ScoringError| {
            warn!(kind = %kind, stage = %stage, error = %err, "Model kind failed");
            sink.on_step(kind, stage, StepStatus::Failed { error: err.to_string() });
            KindRun { kind, gate, outcome: KindOutcome::Failed { stage, error: err.to_string() } }
        };

        sink.on_step(kind, PipelineStep::Gate, StepStatus::Started);
        let gate = match ctx.gate().check(kind) {
            Ok(gate) => gate,
            Err(err) => return failed(None, PipelineStep::Gate, err),
        };
        let skipped = |gate: GateStatus, stage: PipelineStep, err: ScoringError| {
            let reason = err.to_string();
            info!(kind = %kind, examples = gate.example_count, "Skipping training: not enough data");
            sink.on_step(kind, stage, StepStatus::Skipped { reason: reason.clone() });
            KindRun { kind, gate: Some(gate), outcome: KindOutcome::Skipped { reason } }
        };
        if let Err(err) = gate.require() {
            return skipped(gate, PipelineStep::Gate, err);
        }
        sink.on_step(
            kind,
            PipelineStep::Gate,
            StepStatus::Done { detail: format!("{} labeled examples", gate.example_count) },
        );

        sink.on_step(kind, PipelineStep::Extract, StepStatus::Started);
        let examples = match extractor_for(kind, ctx.as_of).training_examples(ctx.store.as_ref(), ctx.config.page_size)
        {
            Ok(examples) => examples,
            Err(err) => return failed(Some(gate), PipelineStep::Extract, err),
        };
        sink.on_step(
            kind,
            PipelineStep::Extract,
            StepStatus::Done { detail: format!("{} training examples", examples.len()) },
        );
        // The trainer only ever sees a set that clears the threshold on its own.
        let gate = GateStatus::from_count(kind, examples.len());
        if let Err(err) = gate.require() {
            return skipped(gate, PipelineStep::Extract, err);
        }

        sink.on_step(kind, PipelineStep::Train, StepStatus::Started);
        let artifact = match ModelTrainer::new(ctx.config.seed).train(kind, &examples, control) {
            Ok(artifact) => artifact,
            Err(err) => return failed(Some(gate), PipelineStep::Train, err),
        };
        let metrics = *artifact.metrics();
        sink.on_step(kind, PipelineStep::Train, StepStatus::Done { detail: metrics.scores.summary() });

        sink.on_step(kind, PipelineStep::Save, StepStatus::Started);
        let saved = match ctx.registry.save(kind.name(), &artifact) {
            Ok(saved) => saved,
            Err(err) => return failed(Some(gate), PipelineStep::Save, err.into()),
        };
        if !ctx.registry.exists(kind.name()) {
            let err = ScoringError::Persistence(format!("artifact '{}' missing after save", kind.name()));
            return failed(Some(gate), PipelineStep::Save, err);
        }
        sink.on_step(kind, PipelineStep::Save, StepStatus::Done { detail: saved.path.display().to_string() });

        KindRun { kind, gate: Some(gate), outcome: KindOutcome::Trained { metrics, artifact: saved } }
    }
}
