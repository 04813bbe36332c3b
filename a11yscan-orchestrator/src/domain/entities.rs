//! Dispatcher domain entities

use chrono::{DateTime, Duration as ChronoDuration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use a11yscan_core::domain::CombinedReport;

use super::value_objects::{JobStatus, JobTransition, JobTransitionError, Priority};

/// Per-job options captured at submission time.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AuditOptions {
    /// Skip the semantic analysis stage entirely for this job.
    #[serde(default)]
    pub skip_semantic_check: bool,
    #[serde(default)]
    pub priority: Priority,
    /// URL notified when the job reaches a terminal state.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub callback_url: Option<String>,
}

/// Audit job tracking one URL through the pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditJob {
    pub job_id: Uuid,
    pub url: String,
    pub options: AuditOptions,
    pub submitted_at: DateTime<Utc>,
    /// Times this job has been handed to a worker, maintained by the
    /// queue on every receive.
    #[serde(default)]
    pub delivery_count: u32,
}

impl AuditJob {
    pub fn new(url: String, options: AuditOptions) -> Self {
        Self {
            job_id: Uuid::new_v4(),
            url,
            options,
            submitted_at: Utc::now(),
            delivery_count: 0,
        }
    }
}

/// Persisted outcome of an audit job: the combined report plus job
/// lifecycle metadata. Written as `Pending` before the job is enqueued
/// so a caller can always resolve a job id it was handed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditRecord {
    pub job_id: Uuid,
    pub url: String,
    pub status: JobStatus,
    pub submitted_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scanned_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_seconds: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub report: Option<CombinedReport>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// State transition audit trail, oldest first.
    #[serde(default)]
    pub transitions: Vec<JobTransition>,
    pub expires_at: DateTime<Utc>,
}

impl AuditRecord {
    /// A fresh `Pending` record for a just-submitted job.
    pub fn pending(job: &AuditJob, ttl: std::time::Duration) -> Self {
        let ttl = ChronoDuration::from_std(ttl).unwrap_or_else(|_| ChronoDuration::hours(24));
        Self {
            job_id: job.job_id,
            url: job.url.clone(),
            status: JobStatus::Pending,
            submitted_at: job.submitted_at,
            scanned_at: None,
            duration_seconds: None,
            report: None,
            error: None,
            transitions: Vec::new(),
            expires_at: Utc::now() + ttl,
        }
    }

    /// Move the record to `target`, appending to the audit trail.
    pub fn transition(
        &mut self,
        target: JobStatus,
        reason: impl Into<String>,
    ) -> Result<(), JobTransitionError> {
        if !self.status.can_transition_to(&target) {
            return Err(JobTransitionError {
                from: self.status.clone(),
                to: target,
            });
        }

        self.transitions.push(JobTransition {
            from: self.status.clone(),
            to: target.clone(),
            timestamp: Utc::now(),
            reason: Some(reason.into()),
        });
        self.status = target;
        Ok(())
    }

    /// Record a successful run. Overwrites any previous outcome, which
    /// makes duplicate deliveries of a completed job harmless.
    pub fn complete(
        &mut self,
        report: CombinedReport,
        duration_seconds: f64,
    ) -> Result<(), JobTransitionError> {
        self.transition(JobStatus::Completed, "Audit finished")?;
        self.scanned_at = Some(Utc::now());
        self.duration_seconds = Some(duration_seconds);
        self.report = Some(report);
        self.error = None;
        Ok(())
    }

    /// Record a terminal failure after the delivery budget is spent.
    pub fn fail(&mut self, error: impl Into<String>) -> Result<(), JobTransitionError> {
        self.transition(JobStatus::Failed, "Delivery budget exhausted")?;
        self.scanned_at = Some(Utc::now());
        self.error = Some(error.into());
        Ok(())
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}
