//! Queue and persistence backends

pub mod queue;
pub mod store;

pub use queue::{InMemoryJobQueue, JobQueue, QueueError, QueueMessage, QueueStats};
pub use store::{InMemoryReportStore, ReportStore, StoreError};
