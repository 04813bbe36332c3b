//! Shared infrastructure primitives

pub mod resilience;
