//! Beacon Scoring
//!
//! Predictive scoring over communication-platform history:
//! - Feature extraction for lead scoring, churn and message engagement
//! - A data-sufficiency gate in front of training
//! - Seeded, deterministic model training with validation metrics
//! - A named artifact registry with atomic overwrite
//! - Prediction plus fixed band interpretation
//! - A training orchestrator with progress reporting and background jobs

pub mod artifacts;
pub mod config;
pub mod dataset;
pub mod error;
pub mod features;
pub mod gate;
pub mod interpret;
pub mod job;
pub mod kind;
pub mod layout;
pub mod metrics;
pub mod model;
pub mod orchestrator;
pub mod predictor;
pub mod progress;
pub mod registry;
pub mod trainer;

pub use artifacts::{ModelArtifact, ARTIFACT_FORMAT_VERSION};
pub use config::ScoringConfig;
pub use dataset::{DatasetId, Label, TrainingExample};
pub use error::{ScoringError, ScoringResult};
pub use features::{extractor_for, feature_names, FeatureExtractor, FeatureVector};
pub use gate::{DataSufficiencyGate, GateStatus, MIN_TRAINING_EXAMPLES};
pub use interpret::{interpret, EngagementLevel, LeadTier, RiskLevel, ScoreLabel};
pub use job::{BackgroundTrainer, JobStatus, TrainingJobId, RETAINED_FINISHED_JOBS};
pub use kind::{ModelKind, Target};
pub use layout::ModelLayout;
pub use metrics::{ClassificationMetrics, RegressionMetrics, Scores, TrainingMetrics};
pub use orchestrator::{KindOutcome, KindReport, KindRun, PipelineContext, TrainingOrchestrator, TrainingSummary};
pub use predictor::{score_with, PredictionResult, Predictor};
pub use progress::{NullProgressSink, PipelineStep, ProgressEvent, ProgressSink, StepStatus, TracingProgressSink};
pub use registry::{FsModelRegistry, MemoryModelRegistry, ModelRegistry, RegistryError, RegistryResult, SavedArtifact};
pub use trainer::{ModelTrainer, TrainControl};
