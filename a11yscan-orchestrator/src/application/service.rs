//! Submission API: validates URLs, persists pending records, and
//! enqueues audit jobs.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info};
use url::Url;
use uuid::Uuid;

use a11yscan_core::config::{QueueConfig, StoreConfig, SubmissionConfig};

use crate::domain::{AuditJob, AuditOptions, AuditRecord, JobStatus, JobTransitionError, Priority};
use crate::infrastructure::{JobQueue, QueueError, QueueStats, ReportStore, StoreError};

/// Errors surfaced to submitters.
#[derive(Debug, thiserror::Error)]
pub enum SubmitError {
    #[error("Invalid URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },
    #[error("Batch contains no URLs")]
    EmptyBatch,
    #[error("Batch of {size} URLs exceeds the maximum of {max}")]
    BatchTooLarge { size: usize, max: usize },
    #[error(transparent)]
    Queue(#[from] QueueError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Transition(#[from] JobTransitionError),
}

/// Accepts audit submissions and resolves job ids to records.
///
/// The pending record is persisted before the job is enqueued, so any
/// job id handed to a caller can be looked up immediately, even if a
/// worker has not touched the job yet.
pub struct AuditService {
    queue: Arc<dyn JobQueue>,
    store: Arc<dyn ReportStore>,
    record_ttl: Duration,
    low_priority_delay: Duration,
    max_batch_size: usize,
    batch_pacing: Duration,
}

impl AuditService {
    pub fn new(
        queue: Arc<dyn JobQueue>,
        store: Arc<dyn ReportStore>,
        queue_config: &QueueConfig,
        store_config: &StoreConfig,
        submission: &SubmissionConfig,
    ) -> Self {
        Self {
            queue,
            store,
            record_ttl: Duration::from_secs(store_config.record_ttl_hours * 3600),
            low_priority_delay: Duration::from_secs(queue_config.low_priority_delay_seconds),
            max_batch_size: submission.max_batch_size,
            batch_pacing: Duration::from_millis(submission.batch_pacing_ms),
        }
    }

    /// Validate, persist a pending record, and enqueue one audit job.
    pub async fn submit_audit(
        &self,
        url: &str,
        options: AuditOptions,
    ) -> Result<Uuid, SubmitError> {
        validate_url(url)?;

        let job = AuditJob::new(url.to_string(), options);
        let mut record = AuditRecord::pending(&job, self.record_ttl);
        record.transition(JobStatus::Queued, "Accepted for processing")?;

        // The record is written exactly once, before the enqueue: a
        // worker may claim the message the moment `send` returns, and a
        // store write landing after that could clobber its progress.
        self.store.put(record).await?;
        let delay = self.initial_delay(job.options.priority);
        self.queue.send(job.clone(), delay).await?;

        info!(
            job_id = %job.job_id,
            url,
            priority = %job.options.priority,
            delay_ms = delay.as_millis() as u64,
            "Audit job submitted"
        );
        Ok(job.job_id)
    }

    /// Submit a bounded batch of URLs with the same options.
    ///
    /// Validation is all-or-nothing: one bad URL rejects the batch
    /// before anything is persisted or enqueued. Enqueues are paced to
    /// avoid hammering the queue backend.
    pub async fn submit_batch(
        &self,
        urls: &[String],
        options: &AuditOptions,
    ) -> Result<Vec<Uuid>, SubmitError> {
        if urls.is_empty() {
            return Err(SubmitError::EmptyBatch);
        }
        if urls.len() > self.max_batch_size {
            return Err(SubmitError::BatchTooLarge {
                size: urls.len(),
                max: self.max_batch_size,
            });
        }
        for url in urls {
            validate_url(url)?;
        }

        let mut job_ids = Vec::with_capacity(urls.len());
        for (index, url) in urls.iter().enumerate() {
            if index > 0 && !self.batch_pacing.is_zero() {
                tokio::time::sleep(self.batch_pacing).await;
            }
            job_ids.push(self.submit_audit(url, options.clone()).await?);
        }

        debug!(count = job_ids.len(), "Batch submission accepted");
        Ok(job_ids)
    }

    pub async fn get_report(&self, job_id: Uuid) -> Result<Option<AuditRecord>, StoreError> {
        self.store.get(job_id).await
    }

    pub async fn reports_for_url(
        &self,
        url: &str,
        limit: usize,
    ) -> Result<Vec<AuditRecord>, StoreError> {
        self.store.query_by_url(url, limit).await
    }

    pub async fn list_recent(&self, limit: usize) -> Result<Vec<AuditRecord>, StoreError> {
        self.store.scan_recent(limit).await
    }

    pub async fn queue_stats(&self) -> Result<QueueStats, QueueError> {
        self.queue.stats().await
    }

    fn initial_delay(&self, priority: Priority) -> Duration {
        match priority {
            Priority::Low => self.low_priority_delay,
            Priority::High | Priority::Normal => Duration::ZERO,
        }
    }
}

fn validate_url(url: &str) -> Result<(), SubmitError> {
    let parsed = Url::parse(url).map_err(|e| SubmitError::InvalidUrl {
        url: url.to_string(),
        reason: e.to_string(),
    })?;

    if parsed.scheme() != "http" && parsed.scheme() != "https" {
        return Err(SubmitError::InvalidUrl {
            url: url.to_string(),
            reason: format!("unsupported scheme '{}'", parsed.scheme()),
        });
    }
    if parsed.host_str().is_none() {
        return Err(SubmitError::InvalidUrl {
            url: url.to_string(),
            reason: "missing host".to_string(),
        });
    }

    Ok(())
}
