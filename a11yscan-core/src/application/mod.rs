//! Shared application services

pub mod combiner;

pub use combiner::ResultCombiner;
