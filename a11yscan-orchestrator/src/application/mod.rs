//! Dispatcher application services

pub mod service;
pub mod worker;

pub use service::{AuditService, SubmitError};
pub use worker::{BatchOutcome, WorkerContext, WorkerPool, process_batch};
