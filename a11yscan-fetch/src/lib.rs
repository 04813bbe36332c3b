//! a11yscan Fetch - Fault-tolerant page fetch coordination
//!
//! Wraps an external render + rule-evaluation capability with retry,
//! capped exponential backoff, and egress-proxy rotation. The render
//! engine itself is a trait ([`RenderEngine`]); this crate owns the
//! session lifecycle and the transient-failure policy, not the browser.
//!
//! ```rust,ignore
//! use a11yscan_fetch::{FetchCoordinator, FetchCoordinatorConfig};
//!
//! let coordinator = FetchCoordinator::new(engine, FetchCoordinatorConfig::default());
//! let result = coordinator.fetch("https://example.com").await?;
//! println!("{} rule violations", result.rule_violations.len());
//! ```

pub mod coordinator;
pub mod engine;
pub mod error;
pub mod proxy;

pub use coordinator::{FetchCoordinator, FetchCoordinatorConfig};
pub use engine::{EgressDescriptor, FetchResult, RenderEngine, RenderSession};
pub use error::FetchError;
pub use proxy::ProxyRotation;
