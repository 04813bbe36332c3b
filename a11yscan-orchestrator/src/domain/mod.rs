//! Domain model for the job dispatcher

pub mod entities;
pub mod value_objects;

pub use entities::{AuditJob, AuditOptions, AuditRecord};
pub use value_objects::{JobStatus, JobTransition, JobTransitionError, Priority};
