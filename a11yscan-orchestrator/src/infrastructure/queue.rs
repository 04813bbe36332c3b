//! Job queue with at-least-once delivery semantics.
//!
//! Messages claimed by a worker stay invisible for a visibility window;
//! deleting a message inside that window acknowledges it. A message
//! whose window lapses without acknowledgement becomes claimable again,
//! and one that exhausts its delivery budget is parked on a dead-letter
//! buffer instead of being redelivered forever.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::Instant;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::domain::AuditJob;

/// Queue backend errors.
#[derive(Debug, thiserror::Error)]
pub enum QueueError {
    #[error("Unknown or expired receipt handle: {0}")]
    UnknownReceipt(Uuid),
    #[error("Queue backend failure: {0}")]
    Backend(String),
}

/// One delivery of a job to a worker.
///
/// `receipt` is valid only for the visibility window of this delivery;
/// a redelivery issues a fresh receipt and invalidates this one.
#[derive(Debug, Clone)]
pub struct QueueMessage {
    pub message_id: Uuid,
    pub receipt: Uuid,
    pub job: AuditJob,
    pub delivery_count: u32,
}

/// Gauge snapshot of queue occupancy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct QueueStats {
    /// Claimable right now.
    pub visible: usize,
    /// Claimed and inside a visibility window.
    pub in_flight: usize,
    /// Waiting out an initial delivery delay.
    pub delayed: usize,
    /// Parked after exhausting the delivery budget.
    pub dead_letter: usize,
}

/// Job queue interface.
#[async_trait]
pub trait JobQueue: Send + Sync {
    /// Enqueue a job, invisible for `delay` before its first delivery.
    async fn send(&self, job: AuditJob, delay: Duration) -> Result<Uuid, QueueError>;

    /// Claim up to `max_messages` visible messages, each invisible to
    /// other consumers for `visibility` from now.
    async fn receive(
        &self,
        max_messages: usize,
        visibility: Duration,
    ) -> Result<Vec<QueueMessage>, QueueError>;

    /// Acknowledge a delivery, removing the message permanently.
    async fn delete(&self, receipt: Uuid) -> Result<(), QueueError>;

    /// Drain the dead-letter buffer for inspection or resubmission.
    async fn drain_dead_letters(&self) -> Result<Vec<AuditJob>, QueueError>;

    async fn stats(&self) -> Result<QueueStats, QueueError>;
}

struct Lease {
    receipt: Uuid,
    deadline: Instant,
}

struct Entry {
    message_id: Uuid,
    job: AuditJob,
    visible_at: Instant,
    delivery_count: u32,
    lease: Option<Lease>,
}

#[derive(Default)]
struct QueueState {
    entries: VecDeque<Entry>,
    dead_letters: Vec<AuditJob>,
}

/// Mutex-guarded in-memory backend. Deployments that outgrow a single
/// process swap in an SQS-style backend behind the same trait.
pub struct InMemoryJobQueue {
    max_deliveries: u32,
    state: Mutex<QueueState>,
}

impl InMemoryJobQueue {
    pub fn new(max_deliveries: u32) -> Self {
        Self {
            max_deliveries: max_deliveries.max(1),
            state: Mutex::new(QueueState::default()),
        }
    }

    /// Release lapsed leases and park budget-exhausted messages.
    fn sweep(&self, state: &mut QueueState, now: Instant) {
        let mut index = 0;
        while index < state.entries.len() {
            {
                let entry = &mut state.entries[index];
                if let Some(lease) = &entry.lease
                    && lease.deadline <= now
                {
                    debug!(
                        message_id = %entry.message_id,
                        job_id = %entry.job.job_id,
                        delivery_count = entry.delivery_count,
                        "Visibility window lapsed, message claimable again"
                    );
                    entry.lease = None;
                }
            }

            let exhausted = state.entries[index].lease.is_none()
                && state.entries[index].delivery_count >= self.max_deliveries;
            if exhausted && let Some(entry) = state.entries.remove(index) {
                warn!(
                    message_id = %entry.message_id,
                    job_id = %entry.job.job_id,
                    delivery_count = entry.delivery_count,
                    "Delivery budget exhausted, moving message to dead-letter buffer"
                );
                state.dead_letters.push(entry.job);
            } else {
                index += 1;
            }
        }
    }

    fn locked(&self) -> Result<std::sync::MutexGuard<'_, QueueState>, QueueError> {
        self.state
            .lock()
            .map_err(|_| QueueError::Backend("queue state poisoned".into()))
    }
}

#[async_trait]
impl JobQueue for InMemoryJobQueue {
    async fn send(&self, job: AuditJob, delay: Duration) -> Result<Uuid, QueueError> {
        let message_id = Uuid::new_v4();
        let mut state = self.locked()?;

        debug!(
            message_id = %message_id,
            job_id = %job.job_id,
            delay_ms = delay.as_millis() as u64,
            "Enqueued audit job"
        );
        state.entries.push_back(Entry {
            message_id,
            job,
            visible_at: Instant::now() + delay,
            delivery_count: 0,
            lease: None,
        });

        Ok(message_id)
    }

    async fn receive(
        &self,
        max_messages: usize,
        visibility: Duration,
    ) -> Result<Vec<QueueMessage>, QueueError> {
        let now = Instant::now();
        let mut state = self.locked()?;
        self.sweep(&mut state, now);

        let mut claimed = Vec::new();
        for entry in state.entries.iter_mut() {
            if claimed.len() >= max_messages {
                break;
            }
            if entry.lease.is_some() || entry.visible_at > now {
                continue;
            }

            entry.delivery_count += 1;
            let receipt = Uuid::new_v4();
            entry.lease = Some(Lease {
                receipt,
                deadline: now + visibility,
            });

            let mut job = entry.job.clone();
            job.delivery_count = entry.delivery_count;
            claimed.push(QueueMessage {
                message_id: entry.message_id,
                receipt,
                job,
                delivery_count: entry.delivery_count,
            });
        }

        Ok(claimed)
    }

    async fn delete(&self, receipt: Uuid) -> Result<(), QueueError> {
        let now = Instant::now();
        let mut state = self.locked()?;
        // A receipt is only good for its visibility window; sweeping
        // first voids leases that lapsed since the last receive.
        self.sweep(&mut state, now);

        let position = state.entries.iter().position(|entry| {
            entry
                .lease
                .as_ref()
                .is_some_and(|lease| lease.receipt == receipt)
        });

        match position {
            Some(index) => {
                state.entries.remove(index);
                Ok(())
            }
            None => Err(QueueError::UnknownReceipt(receipt)),
        }
    }

    async fn drain_dead_letters(&self) -> Result<Vec<AuditJob>, QueueError> {
        let mut state = self.locked()?;
        Ok(std::mem::take(&mut state.dead_letters))
    }

    async fn stats(&self) -> Result<QueueStats, QueueError> {
        let now = Instant::now();
        let mut state = self.locked()?;
        self.sweep(&mut state, now);

        let mut stats = QueueStats {
            dead_letter: state.dead_letters.len(),
            ..QueueStats::default()
        };
        for entry in &state.entries {
            if entry.lease.is_some() {
                stats.in_flight += 1;
            } else if entry.visible_at > now {
                stats.delayed += 1;
            } else {
                stats.visible += 1;
            }
        }

        Ok(stats)
    }
}
