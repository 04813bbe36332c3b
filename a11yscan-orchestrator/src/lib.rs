//! a11yscan Orchestrator - Asynchronous audit job dispatch
//!
//! Accepts audit submissions, persists their lifecycle records, and
//! drives a worker pool through the fetch → semantic → combine
//! pipeline with at-least-once delivery semantics.
//!
//! # Modules
//!
//! - [`domain`] — jobs, records, and the status state machine
//! - [`infrastructure`] — queue and store traits with in-memory backends
//! - [`application`] — the submission service and the worker pool
//!
//! # Delivery semantics
//!
//! A claimed message stays invisible for a visibility window. Workers
//! acknowledge (delete) on success and simply walk away on failure, so
//! the window lapses and the message is redelivered; a message that
//! exhausts its delivery budget is parked on a dead-letter buffer and
//! its record marked `Failed`. Completed records are idempotent under
//! duplicate delivery: a rerun observes the terminal record and
//! acknowledges without re-auditing.

pub mod application;
pub mod domain;
pub mod infrastructure;

pub use application::{AuditService, BatchOutcome, SubmitError, WorkerContext, WorkerPool};
pub use domain::{AuditJob, AuditOptions, AuditRecord, JobStatus, Priority};
pub use infrastructure::{InMemoryJobQueue, InMemoryReportStore, JobQueue, ReportStore};
