//! Audit record persistence with TTL expiry and bounded capacity.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;
use tracing::debug;
use uuid::Uuid;

use crate::domain::AuditRecord;

/// Record persistence errors.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Store backend failure: {0}")]
    Backend(String),
}

/// Audit record storage interface.
///
/// `put` upserts by job id, so re-running a delivered job simply
/// overwrites its previous outcome.
#[async_trait]
pub trait ReportStore: Send + Sync {
    async fn put(&self, record: AuditRecord) -> Result<(), StoreError>;
    async fn get(&self, job_id: Uuid) -> Result<Option<AuditRecord>, StoreError>;
    /// Records for one URL, most recently written first.
    async fn query_by_url(&self, url: &str, limit: usize) -> Result<Vec<AuditRecord>, StoreError>;
    /// Most recently written records across all URLs.
    async fn scan_recent(&self, limit: usize) -> Result<Vec<AuditRecord>, StoreError>;
}

#[derive(Default)]
struct StoreState {
    records: HashMap<Uuid, AuditRecord>,
    /// Job ids, most recently written at the front.
    order: VecDeque<Uuid>,
}

/// In-memory backend bounded to `max_records`; the oldest record is
/// evicted first. Expired records are dropped lazily on read.
pub struct InMemoryReportStore {
    max_records: usize,
    state: Mutex<StoreState>,
}

impl InMemoryReportStore {
    pub fn new(max_records: usize) -> Self {
        Self {
            max_records: max_records.max(1),
            state: Mutex::new(StoreState::default()),
        }
    }

    fn locked(&self) -> Result<std::sync::MutexGuard<'_, StoreState>, StoreError> {
        self.state
            .lock()
            .map_err(|_| StoreError::Backend("store state poisoned".into()))
    }

    fn evict_expired(state: &mut StoreState) {
        let now = Utc::now();
        let expired: Vec<Uuid> = state
            .records
            .iter()
            .filter(|(_, record)| record.is_expired(now))
            .map(|(id, _)| *id)
            .collect();

        for id in expired {
            debug!(job_id = %id, "Evicting expired audit record");
            state.records.remove(&id);
            state.order.retain(|candidate| *candidate != id);
        }
    }
}

#[async_trait]
impl ReportStore for InMemoryReportStore {
    async fn put(&self, record: AuditRecord) -> Result<(), StoreError> {
        let mut state = self.locked()?;
        let job_id = record.job_id;

        // An overwrite refreshes recency.
        state.order.retain(|candidate| *candidate != job_id);
        state.order.push_front(job_id);
        state.records.insert(job_id, record);

        while state.order.len() > self.max_records {
            if let Some(evicted) = state.order.pop_back() {
                debug!(job_id = %evicted, "Evicting oldest audit record, store at capacity");
                state.records.remove(&evicted);
            }
        }

        Ok(())
    }

    async fn get(&self, job_id: Uuid) -> Result<Option<AuditRecord>, StoreError> {
        let mut state = self.locked()?;
        Self::evict_expired(&mut state);
        Ok(state.records.get(&job_id).cloned())
    }

    async fn query_by_url(&self, url: &str, limit: usize) -> Result<Vec<AuditRecord>, StoreError> {
        let mut state = self.locked()?;
        Self::evict_expired(&mut state);

        let records = state
            .order
            .iter()
            .filter_map(|id| state.records.get(id))
            .filter(|record| record.url == url)
            .take(limit)
            .cloned()
            .collect();
        Ok(records)
    }

    async fn scan_recent(&self, limit: usize) -> Result<Vec<AuditRecord>, StoreError> {
        let mut state = self.locked()?;
        Self::evict_expired(&mut state);

        let records = state
            .order
            .iter()
            .filter_map(|id| state.records.get(id))
            .take(limit)
            .cloned()
            .collect();
        Ok(records)
    }
}
