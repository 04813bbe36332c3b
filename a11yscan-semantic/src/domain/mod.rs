//! Semantic analysis domain: analyzer trait and error taxonomy

pub mod analyzer;
pub mod error;

pub use analyzer::SemanticAnalyzer;
pub use error::SemanticError;
