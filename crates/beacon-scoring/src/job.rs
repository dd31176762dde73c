//! Background training jobs.
//!
//! Training is CPU-bound, so each job runs the orchestrator on tokio's
//! blocking pool. Callers poll [`BackgroundTrainer::status`], subscribe to a
//! watch channel, or await [`BackgroundTrainer::wait`]. Only the newest
//! [`RETAINED_FINISHED_JOBS`] finished jobs stay queryable.

use crate::orchestrator::{PipelineContext, TrainingOrchestrator, TrainingSummary};
use crate::progress::{ProgressSink, TracingProgressSink};
use crate::trainer::TrainControl;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::{watch, RwLock};
use tracing::{debug, error, info};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TrainingJobId(pub String);

impl TrainingJobId {
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }
}

impl Default for TrainingJobId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for TrainingJobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum JobStatus {
    Queued,
    Running,
    /// The run completed; individual kinds may still have failed.
    Finished(TrainingSummary),
    /// Cancelled while running; kinds not yet trained are recorded as failed.
    Cancelled(TrainingSummary),
    /// The worker itself died.
    Failed(String),
}

impl JobStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Finished(_) | Self::Cancelled(_) | Self::Failed(_))
    }

    pub fn summary(&self) -> Option<&TrainingSummary> {
        match self {
            Self::Finished(s) | Self::Cancelled(s) => Some(s),
            _ => None,
        }
    }
}

/// Finished jobs kept for `status`/`wait` before the oldest are evicted.
pub const RETAINED_FINISHED_JOBS: usize = 32;

struct JobEntry {
    seq: u64,
    status: watch::Receiver<JobStatus>,
    control: TrainControl,
}

/// Drop the oldest terminal jobs beyond the retention limit.
fn evict_finished(jobs: &mut HashMap<TrainingJobId, JobEntry>) {
    let mut finished: Vec<(u64, TrainingJobId)> = jobs
        .iter()
        .filter(|(_, entry)| entry.status.borrow().is_terminal())
        .map(|(id, entry)| (entry.seq, id.clone()))
        .collect();
    if finished.len() <= RETAINED_FINISHED_JOBS {
        return;
    }
    finished.sort_unstable();
    let excess = finished.len() - RETAINED_FINISHED_JOBS;
    for (_, id) in finished.into_iter().take(excess) {
        debug!(job_id = %id, "Evicting finished training job");
        jobs.remove(&id);
    }
}

/// Runs training pipelines off the caller's thread.
#[derive(Clone)]
pub struct BackgroundTrainer {
    context: PipelineContext,
    jobs: Arc<RwLock<HashMap<TrainingJobId, JobEntry>>>,
    next_seq: Arc<AtomicU64>,
}

impl BackgroundTrainer {
    #[must_use]
    pub fn new(context: PipelineContext) -> Self {
        Self { context, jobs: Arc::new(RwLock::new(HashMap::new())), next_seq: Arc::new(AtomicU64::new(0)) }
    }

    /// Start a full training run, reporting progress to tracing.
    pub async fn submit(&self) -> TrainingJobId {
        self.submit_with(Arc::new(TracingProgressSink)).await
    }

    /// Start a full training run. Must be called from within a tokio runtime.
    pub async fn submit_with(&self, sink: Arc<dyn ProgressSink>) -> TrainingJobId {
        let job_id = TrainingJobId::new();
        let control = self.context.control();
        let (tx, rx) = watch::channel(JobStatus::Queued);

        {
            let mut jobs = self.jobs.write().await;
            evict_finished(&mut jobs);
            let seq = self.next_seq.fetch_add(1, Ordering::Relaxed);
            jobs.insert(job_id.clone(), JobEntry { seq, status: rx, control: control.clone() });
        }

        let orchestrator = TrainingOrchestrator::new(self.context.clone());
        let id = job_id.clone();
        tokio::spawn(async move {
            info!(job_id = %id, "Training job started");
            let _ = tx.send(JobStatus::Running);

            let worker_control = control.clone();
            let outcome =
                tokio::task::spawn_blocking(move || orchestrator.run(sink.as_ref(), &worker_control)).await;

            let status = match outcome {
                Ok(summary) if control.is_cancelled() => JobStatus::Cancelled(summary),
                Ok(summary) => JobStatus::Finished(summary),
                Err(e) => {
                    error!(job_id = %id, error = %e, "Training worker failed");
                    JobStatus::Failed(e.to_string())
                }
            };
            info!(job_id = %id, "Training job finished");
            let _ = tx.send(status);
        });

        job_id
    }

    pub async fn status(&self, job_id: &TrainingJobId) -> Option<JobStatus> {
        self.jobs.read().await.get(job_id).map(|entry| entry.status.borrow().clone())
    }

    /// Change notifications for a job.
    pub async fn subscribe(&self, job_id: &TrainingJobId) -> Option<watch::Receiver<JobStatus>> {
        self.jobs.read().await.get(job_id).map(|entry| entry.status.clone())
    }

    /// Wait until the job reaches a terminal state.
    pub async fn wait(&self, job_id: &TrainingJobId) -> Option<JobStatus> {
        let mut rx = self.subscribe(job_id).await?;
        // The sender is dropped only after the terminal status is sent.
        let terminal = rx.wait_for(JobStatus::is_terminal).await.map(|status| status.clone());
        match terminal {
            Ok(status) => Some(status),
            Err(_) => Some(rx.borrow().clone()),
        }
    }

    /// Request cancellation. Returns `false` for unknown or already finished jobs.
    pub async fn cancel(&self, job_id: &TrainingJobId) -> bool {
        let jobs = self.jobs.read().await;
        let Some(entry) = jobs.get(job_id) else {
            return false;
        };
        if entry.status.borrow().is_terminal() {
            return false;
        }
        info!(job_id = %job_id, "Cancelling training job");
        entry.control.cancel();
        true
    }
}
