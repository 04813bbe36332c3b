//! Configuration validation module

use crate::config::{
    Config, FetchConfig, QueueConfig, RetryConfigSerializable, SemanticConfig, StoreConfig,
    SubmissionConfig, WorkerConfig,
};

/// Trait for validating configuration sections
pub trait Validate {
    fn validate(&self) -> Result<(), ValidationError>;
}

/// Configuration validation error
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("Fetch configuration error: {message}")]
    Fetch { message: String },

    #[error("Semantic configuration error: {message}")]
    Semantic { message: String },

    #[error("Queue configuration error: {message}")]
    Queue { message: String },

    #[error("Store configuration error: {message}")]
    Store { message: String },

    #[error("Worker configuration error: {message}")]
    Worker { message: String },

    #[error("Submission configuration error: {message}")]
    Submission { message: String },
}

impl ValidationError {
    pub fn fetch(message: impl Into<String>) -> Self {
        Self::Fetch {
            message: message.into(),
        }
    }

    pub fn semantic(message: impl Into<String>) -> Self {
        Self::Semantic {
            message: message.into(),
        }
    }

    pub fn queue(message: impl Into<String>) -> Self {
        Self::Queue {
            message: message.into(),
        }
    }

    pub fn store(message: impl Into<String>) -> Self {
        Self::Store {
            message: message.into(),
        }
    }

    pub fn worker(message: impl Into<String>) -> Self {
        Self::Worker {
            message: message.into(),
        }
    }

    pub fn submission(message: impl Into<String>) -> Self {
        Self::Submission {
            message: message.into(),
        }
    }
}

fn check_retry(retry: &RetryConfigSerializable, section: &str) -> Result<(), String> {
    if retry.max_attempts == 0 {
        return Err(format!("{section}.retry.max_attempts must be at least 1"));
    }
    if retry.backoff_multiplier < 1.0 {
        return Err(format!(
            "{section}.retry.backoff_multiplier must be at least 1.0"
        ));
    }
    if retry.max_delay_ms < retry.initial_delay_ms {
        return Err(format!(
            "{section}.retry.max_delay_ms must not be below initial_delay_ms"
        ));
    }
    Ok(())
}

impl Validate for FetchConfig {
    fn validate(&self) -> Result<(), ValidationError> {
        check_retry(&self.retry, "fetch").map_err(ValidationError::fetch)?;
        if self.navigation_timeout_seconds == 0 {
            return Err(ValidationError::fetch(
                "navigation_timeout_seconds must be positive",
            ));
        }
        Ok(())
    }
}

impl Validate for SemanticConfig {
    fn validate(&self) -> Result<(), ValidationError> {
        check_retry(&self.retry, "semantic").map_err(ValidationError::semantic)?;
        if self.max_digest_bytes == 0 {
            return Err(ValidationError::semantic(
                "max_digest_bytes must be positive",
            ));
        }
        if self.enabled && self.base_url.is_empty() {
            return Err(ValidationError::semantic(
                "base_url is required when the semantic check is enabled",
            ));
        }
        Ok(())
    }
}

impl Validate for QueueConfig {
    fn validate(&self) -> Result<(), ValidationError> {
        if self.visibility_timeout_seconds == 0 {
            return Err(ValidationError::queue(
                "visibility_timeout_seconds must be positive",
            ));
        }
        if self.max_deliveries == 0 {
            return Err(ValidationError::queue("max_deliveries must be at least 1"));
        }
        Ok(())
    }
}

impl Validate for StoreConfig {
    fn validate(&self) -> Result<(), ValidationError> {
        if self.record_ttl_hours == 0 {
            return Err(ValidationError::store("record_ttl_hours must be positive"));
        }
        if self.max_records == 0 {
            return Err(ValidationError::store("max_records must be positive"));
        }
        Ok(())
    }
}

impl Validate for WorkerConfig {
    fn validate(&self) -> Result<(), ValidationError> {
        if self.pool_size == 0 {
            return Err(ValidationError::worker("pool_size must be at least 1"));
        }
        if self.batch_size == 0 {
            return Err(ValidationError::worker("batch_size must be at least 1"));
        }
        Ok(())
    }
}

impl Validate for SubmissionConfig {
    fn validate(&self) -> Result<(), ValidationError> {
        if self.max_batch_size == 0 {
            return Err(ValidationError::submission(
                "max_batch_size must be at least 1",
            ));
        }
        Ok(())
    }
}

impl Validate for Config {
    fn validate(&self) -> Result<(), ValidationError> {
        self.fetch.validate()?;
        self.semantic.validate()?;
        self.queue.validate()?;
        self.store.validate()?;
        self.worker.validate()?;
        self.submission.validate()?;
        Ok(())
    }
}
