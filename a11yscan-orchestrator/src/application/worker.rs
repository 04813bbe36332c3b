//! Worker pool: claims job batches from the queue and runs the audit
//! pipeline (fetch, semantic analysis, combine, persist).

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use a11yscan_core::application::ResultCombiner;
use a11yscan_core::config::{QueueConfig, StoreConfig, WorkerConfig};
use a11yscan_fetch::{FetchCoordinator, FetchError};
use a11yscan_semantic::CheckedAnalyzer;

use crate::domain::{AuditRecord, JobStatus, JobTransitionError};
use crate::infrastructure::{JobQueue, QueueMessage, ReportStore, StoreError};

/// Shared dependencies required by the audit workers.
#[derive(Clone)]
pub struct WorkerContext {
    pub queue: Arc<dyn JobQueue>,
    pub store: Arc<dyn ReportStore>,
    pub coordinator: Arc<FetchCoordinator>,
    /// `None` disables the semantic stage globally.
    pub analyzer: Option<Arc<CheckedAnalyzer>>,
    pub combiner: Arc<ResultCombiner>,
    pub worker: WorkerConfig,
    pub visibility: Duration,
    pub max_deliveries: u32,
    pub record_ttl: Duration,
}

impl WorkerContext {
    pub fn new(
        queue: Arc<dyn JobQueue>,
        store: Arc<dyn ReportStore>,
        coordinator: Arc<FetchCoordinator>,
        analyzer: Option<Arc<CheckedAnalyzer>>,
        worker: &WorkerConfig,
        queue_config: &QueueConfig,
        store_config: &StoreConfig,
    ) -> Self {
        Self {
            queue,
            store,
            coordinator,
            analyzer,
            combiner: Arc::new(ResultCombiner::new()),
            worker: worker.clone(),
            visibility: Duration::from_secs(queue_config.visibility_timeout_seconds),
            max_deliveries: queue_config.max_deliveries,
            record_ttl: Duration::from_secs(store_config.record_ttl_hours * 3600),
        }
    }
}

/// Per-batch result: message ids acknowledged vs. left for redelivery.
#[derive(Debug, Default, Serialize)]
pub struct BatchOutcome {
    pub succeeded: Vec<Uuid>,
    pub failed: Vec<Uuid>,
}

#[derive(Debug, thiserror::Error)]
enum ProcessError {
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Transition(#[from] JobTransitionError),
}

/// Fixed-size worker pool consuming the job queue until closed.
pub struct WorkerPool {
    shutdown: CancellationToken,
    handles: Vec<JoinHandle<()>>,
    coordinator: Arc<FetchCoordinator>,
}

impl WorkerPool {
    pub fn spawn(context: WorkerContext) -> Self {
        let shutdown = CancellationToken::new();
        let pool_size = context.worker.pool_size.max(1);
        info!(pool_size, "Audit worker pool started");

        let coordinator = context.coordinator.clone();
        let handles = (0..pool_size)
            .map(|worker_id| {
                tokio::spawn(worker_loop(
                    context.clone(),
                    worker_id,
                    shutdown.child_token(),
                ))
            })
            .collect();

        Self {
            shutdown,
            handles,
            coordinator,
        }
    }

    /// Stop claiming new work and release the shared render engine.
    ///
    /// Unacknowledged in-flight messages are deliberately untouched:
    /// their visibility windows lapse and another consumer picks them
    /// up, which is exactly the at-least-once contract.
    pub async fn close(self) {
        self.shutdown.cancel();
        for handle in self.handles {
            let _ = handle.await;
        }
        self.coordinator.close().await;
        info!("Audit worker pool stopped");
    }
}

async fn worker_loop(context: WorkerContext, worker_id: usize, shutdown: CancellationToken) {
    let poll_interval = Duration::from_millis(context.worker.poll_interval_ms);
    let batch_size = context.worker.batch_size as usize;

    loop {
        tokio::select! {
            _ = shutdown.cancelled() => {
                debug!(worker_id, "Worker shutting down");
                break;
            }
            received = context.queue.receive(batch_size, context.visibility) => {
                match received {
                    Ok(messages) if messages.is_empty() => {
                        tokio::time::sleep(poll_interval).await;
                    }
                    Ok(messages) => {
                        let outcome = process_batch(&context, messages).await;
                        if outcome.failed.is_empty() {
                            debug!(worker_id, succeeded = outcome.succeeded.len(), "Batch finished");
                        } else {
                            warn!(
                                worker_id,
                                succeeded = outcome.succeeded.len(),
                                failed = outcome.failed.len(),
                                "Batch finished with failures"
                            );
                        }
                    }
                    Err(e) => {
                        error!(worker_id, error = %e, "Failed to poll job queue");
                        tokio::time::sleep(poll_interval).await;
                    }
                }
            }
        }
    }
}

/// Process one claimed batch with per-message failure isolation.
///
/// A failed message is left unacknowledged so the queue redelivers it;
/// only on its final delivery is a terminal `Failed` record persisted.
/// If the shared render engine is down, nothing in the batch can
/// succeed, so the whole batch is reported failed without burning a
/// fetch attempt per message.
pub async fn process_batch(context: &WorkerContext, messages: Vec<QueueMessage>) -> BatchOutcome {
    let mut outcome = BatchOutcome::default();
    if messages.is_empty() {
        return outcome;
    }

    if let Err(e) = context.coordinator.health_check().await {
        error!(
            batch = messages.len(),
            error = %e,
            "Render engine unavailable, failing entire batch"
        );
        // An outage batch still consumes a delivery per message, so a
        // job on its final delivery must reach a terminal record here
        // too, not only on the per-message path.
        let cause = ProcessError::Fetch(e);
        for message in &messages {
            if message.delivery_count >= context.max_deliveries
                && let Err(persist_error) = persist_terminal_failure(context, message, &cause).await
            {
                error!(
                    job_id = %message.job.job_id,
                    error = %persist_error,
                    "Failed to persist terminal failure"
                );
            }
        }
        outcome.failed = messages.iter().map(|m| m.message_id).collect();
        return outcome;
    }

    for message in messages {
        match process_message(context, &message).await {
            Ok(()) => match context.queue.delete(message.receipt).await {
                Ok(()) => outcome.succeeded.push(message.message_id),
                Err(e) => {
                    // Receipt lapsed mid-run; the job will be redelivered
                    // and its completed record makes the rerun a no-op.
                    warn!(
                        job_id = %message.job.job_id,
                        error = %e,
                        "Could not acknowledge finished job"
                    );
                    outcome.failed.push(message.message_id);
                }
            },
            Err(e) => {
                warn!(
                    job_id = %message.job.job_id,
                    url = %message.job.url,
                    delivery_count = message.delivery_count,
                    error = %e,
                    "Audit job attempt failed"
                );
                if message.delivery_count >= context.max_deliveries
                    && let Err(persist_error) = persist_terminal_failure(context, &message, &e).await
                {
                    error!(
                        job_id = %message.job.job_id,
                        error = %persist_error,
                        "Failed to persist terminal failure"
                    );
                }
                outcome.failed.push(message.message_id);
            }
        }
    }

    outcome
}

/// Run the full pipeline for one delivered job.
async fn process_message(
    context: &WorkerContext,
    message: &QueueMessage,
) -> Result<(), ProcessError> {
    let job = &message.job;

    let mut record = match context.store.get(job.job_id).await? {
        Some(record) => record,
        // Expired or evicted while the message sat in the queue.
        None => AuditRecord::pending(job, context.record_ttl),
    };

    if record.status.is_terminal() {
        debug!(job_id = %job.job_id, "Duplicate delivery of a finished job, acknowledging");
        return Ok(());
    }
    if record.status == JobStatus::Pending {
        record.transition(JobStatus::Queued, "Claimed from queue")?;
    }
    record.transition(
        JobStatus::Running,
        format!("Delivery {} of {}", message.delivery_count, context.max_deliveries),
    )?;
    context.store.put(record.clone()).await?;

    let started = Instant::now();
    let fetched = context.coordinator.fetch(&job.url).await?;

    let semantic_violations = match (&context.analyzer, job.options.skip_semantic_check) {
        (Some(analyzer), false) => analyzer.analyze_or_empty(&fetched.content_digest).await,
        _ => Vec::new(),
    };

    let report = context
        .combiner
        .combine(&fetched.rule_violations, &semantic_violations);
    let duration_seconds = started.elapsed().as_secs_f64();

    record.complete(report, duration_seconds)?;
    context.store.put(record).await?;

    info!(
        job_id = %job.job_id,
        url = %job.url,
        duration_seconds,
        "Audit job completed"
    );
    Ok(())
}

/// Persist a terminal `Failed` record once the delivery budget is spent.
async fn persist_terminal_failure(
    context: &WorkerContext,
    message: &QueueMessage,
    cause: &ProcessError,
) -> Result<(), ProcessError> {
    let job = &message.job;
    let mut record = match context.store.get(job.job_id).await? {
        Some(record) => record,
        None => AuditRecord::pending(job, context.record_ttl),
    };

    if record.status.is_terminal() {
        return Ok(());
    }
    if record.status == JobStatus::Pending {
        record.transition(JobStatus::Queued, "Claimed from queue")?;
    }
    if record.status == JobStatus::Queued {
        record.transition(JobStatus::Running, "Final delivery")?;
    }
    record.fail(cause.to_string())?;
    context.store.put(record).await?;

    warn!(
        job_id = %job.job_id,
        url = %job.url,
        delivery_count = message.delivery_count,
        "Audit job failed permanently"
    );
    Ok(())
}
