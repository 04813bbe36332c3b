//! a11yscan Core - Foundation crate for the a11yscan audit platform
//!
//! This crate provides the shared functionality used across the audit
//! pipeline crates:
//!
//! # Modules
//!
//! - [`config`] — Strongly-typed configuration with TOML and environment variable support
//! - [`domain`] — Violations, severity model, WCAG criterion tables, combined reports
//! - [`application`] — The result combiner that merges rule and semantic findings
//! - [`infrastructure`] — Retry/backoff primitives shared by the fetch and semantic layers
//! - [`logging`] — Structured logging with tracing
//!
//! # Configuration
//!
//! Load configuration from files and environment:
//!
//! ```rust,ignore
//! use a11yscan_core::Config;
//!
//! let config = Config::load()?;
//! ```
//!
//! Environment variables use the `A11YSCAN__` prefix with double underscore separators:
//!
//! ```bash
//! A11YSCAN__WORKER__POOL_SIZE=4
//! A11YSCAN__QUEUE__VISIBILITY_TIMEOUT_SECONDS=300
//! ```
//!
//! # Logging
//!
//! Initialize structured logging:
//!
//! ```rust,ignore
//! use a11yscan_core::init_tracing;
//!
//! init_tracing(&config.logging)?;
//! ```

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod logging;

pub use config::Config;
pub use logging::init_tracing;
