//! a11yscan Semantic - Language/context accessibility analysis
//!
//! Sends a bounded page content digest to an external language model and
//! turns its findings into [`SemanticViolation`]s. The adapter never
//! fails the audit pipeline: [`CheckedAnalyzer`] degrades every analyzer
//! error to an empty finding list.
//!
//! # Modules
//!
//! - [`domain`] — the [`SemanticAnalyzer`] trait and error taxonomy
//! - [`infrastructure`] — HTTP provider, response parsing, retry wrapper
//!
//! [`SemanticViolation`]: a11yscan_core::domain::SemanticViolation
//! [`SemanticAnalyzer`]: domain::SemanticAnalyzer
//! [`CheckedAnalyzer`]: infrastructure::CheckedAnalyzer

pub mod domain;
pub mod infrastructure;

pub use domain::{SemanticAnalyzer, SemanticError};
pub use infrastructure::{CheckedAnalyzer, HttpAnalyzer, ResponseParser};
