//! Background training jobs.

mod common;

use beacon_scoring::{
    BackgroundTrainer, JobStatus, KindOutcome, MemoryModelRegistry, ModelKind, ModelRegistry, NullProgressSink,
    PipelineContext, ScoringConfig, TrainingJobId,
};
use beacon_store::MemoryStore;
use std::sync::Arc;
use std::time::Duration;

fn trainer(contacts: usize, deadline_secs: Option<u64>) -> (BackgroundTrainer, Arc<MemoryModelRegistry>) {
    let registry = Arc::new(MemoryModelRegistry::new());
    let config = ScoringConfig {
        as_of: Some(common::as_of()),
        training_deadline_secs: deadline_secs,
        ..ScoringConfig::default()
    };
    let ctx = PipelineContext::new(
        Arc::new(MemoryStore::new(common::synthetic(7, contacts))),
        registry.clone(),
        config,
    );
    (BackgroundTrainer::new(ctx), registry)
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_submitted_job_finishes_with_summary() {
    let (jobs, registry) = trainer(400, None);

    let id = jobs.submit_with(Arc::new(NullProgressSink)).await;
    assert!(jobs.status(&id).await.is_some());

    let status = tokio::time::timeout(Duration::from_secs(120), jobs.wait(&id)).await.unwrap().unwrap();
    let JobStatus::Finished(summary) = status else {
        panic!("expected a finished job, got {status:?}");
    };
    assert_eq!(summary.passed(), 3);
    for kind in ModelKind::ALL {
        assert!(registry.exists(kind.name()));
    }

    // Polling after completion reports the same terminal state.
    assert!(jobs.status(&id).await.unwrap().is_terminal());
    assert!(!jobs.cancel(&id).await);
}

#[tokio::test]
async fn test_subscribers_see_the_terminal_state() {
    let (jobs, _) = trainer(30, None);
    let id = jobs.submit().await;
    let mut rx = jobs.subscribe(&id).await.unwrap();

    let status = rx.wait_for(JobStatus::is_terminal).await.unwrap().clone();
    let summary = status.summary().unwrap();
    assert_eq!(summary.total(), 3);
    // 30 contacts cannot carry 100 labeled contacts or leads.
    for kind in [ModelKind::LeadScoring, ModelKind::Churn] {
        assert!(matches!(summary.run(kind).unwrap().outcome, KindOutcome::Skipped { .. }));
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_cancelled_job_trains_nothing_further() {
    let (jobs, _) = trainer(400, None);
    let id = jobs.submit_with(Arc::new(NullProgressSink)).await;
    let cancelled = jobs.cancel(&id).await;

    let status = jobs.wait(&id).await.unwrap();
    if cancelled {
        let JobStatus::Cancelled(summary) = &status else {
            panic!("expected a cancelled job, got {status:?}");
        };
        for run in &summary.runs {
            if let KindOutcome::Failed { error, .. } = &run.outcome {
                assert!(error.contains("cancelled"), "{error}");
            }
        }
    } else {
        assert!(matches!(status, JobStatus::Finished(_)));
    }
}

#[tokio::test]
async fn test_unknown_job_ids() {
    let (jobs, _) = trainer(10, None);
    let id = TrainingJobId::new();
    assert!(jobs.status(&id).await.is_none());
    assert!(jobs.wait(&id).await.is_none());
    assert!(!jobs.cancel(&id).await);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_deadline_fails_training() {
    let (jobs, _) = trainer(400, Some(1));
    let id = jobs.submit_with(Arc::new(NullProgressSink)).await;
    let status = jobs.wait(&id).await.unwrap();
    let summary = status.summary().unwrap();
    // Each kind either beat the one second budget or failed with the deadline.
    for run in &summary.runs {
        match &run.outcome {
            KindOutcome::Trained { .. } => {}
            KindOutcome::Failed { error, .. } => assert!(error.contains("deadline"), "{error}"),
            other => panic!("unexpected outcome {other:?}"),
        }
    }
}
