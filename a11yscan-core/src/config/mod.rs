//! Configuration management

pub mod validation;

pub use validation::{Validate, ValidationError};

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Retry configuration (serializable version)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfigSerializable {
    /// Maximum number of attempts (first try included)
    pub max_attempts: u32,
    /// Initial delay between retries (in milliseconds)
    pub initial_delay_ms: u64,
    /// Maximum delay between retries (in milliseconds)
    pub max_delay_ms: u64,
    /// Multiplier for exponential backoff
    pub backoff_multiplier: f64,
}

impl Default for RetryConfigSerializable {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_delay_ms: 1000,
            max_delay_ms: 10_000,
            backoff_multiplier: 2.0,
        }
    }
}

impl RetryConfigSerializable {
    /// Convert to the runtime RetryConfig
    pub fn to_retry_config(&self) -> crate::infrastructure::resilience::RetryConfig {
        crate::infrastructure::resilience::RetryConfig {
            max_attempts: self.max_attempts,
            initial_delay: Duration::from_millis(self.initial_delay_ms),
            max_delay: Duration::from_millis(self.max_delay_ms),
            backoff_multiplier: self.backoff_multiplier,
        }
    }
}

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub fetch: FetchConfig,
    pub semantic: SemanticConfig,
    pub queue: QueueConfig,
    pub store: StoreConfig,
    pub worker: WorkerConfig,
    pub submission: SubmissionConfig,
    pub logging: LoggingConfig,
}

/// Page fetch configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    /// Retry behaviour for transient network failures
    pub retry: RetryConfigSerializable,
    /// Navigation timeout for a single render attempt (in seconds)
    pub navigation_timeout_seconds: u64,
    /// Egress proxy pool, rotated round-robin between retries.
    /// Empty means direct egress only.
    pub proxies: Vec<String>,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            retry: RetryConfigSerializable::default(),
            navigation_timeout_seconds: 30,
            proxies: Vec::new(),
        }
    }
}

/// Semantic analysis configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SemanticConfig {
    /// Whether the semantic check runs at all
    pub enabled: bool,
    /// Base URL of the chat-completions endpoint
    pub base_url: String,
    /// API key, usually injected via A11YSCAN__SEMANTIC__API_KEY
    pub api_key: String,
    /// Model identifier sent to the provider
    pub model: String,
    /// Request timeout (in seconds)
    pub request_timeout_seconds: u64,
    /// Maximum bytes of page text included in the analysis prompt
    pub max_digest_bytes: usize,
    /// Cooperative delay between consecutive analyzer calls (in milliseconds)
    pub pacing_delay_ms: u64,
    /// Retry behaviour for retryable provider errors
    pub retry: RetryConfigSerializable,
}

impl Default for SemanticConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            base_url: "https://api.openai.com/v1".to_string(),
            api_key: String::new(),
            model: "gpt-4o-mini".to_string(),
            request_timeout_seconds: 60,
            max_digest_bytes: 12_000,
            pacing_delay_ms: 500,
            retry: RetryConfigSerializable {
                max_attempts: 2,
                initial_delay_ms: 500,
                max_delay_ms: 5_000,
                backoff_multiplier: 2.0,
            },
        }
    }
}

/// Queue backend selection
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum QueueBackend {
    /// In-process queue (single instance, development and tests)
    #[default]
    Memory,
}

/// Job queue configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct QueueConfig {
    pub backend: QueueBackend,
    /// How long a claimed message stays invisible to other workers (in seconds)
    pub visibility_timeout_seconds: u64,
    /// Deliveries after which a message moves to the dead-letter buffer
    pub max_deliveries: u32,
    /// Initial delay applied to low-priority jobs (in seconds)
    pub low_priority_delay_seconds: u64,
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            backend: QueueBackend::Memory,
            visibility_timeout_seconds: 300,
            max_deliveries: 5,
            low_priority_delay_seconds: 30,
        }
    }
}

/// Report store backend selection
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum StoreBackend {
    /// In-process store (single instance, development and tests)
    #[default]
    Memory,
}

/// Report store configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub backend: StoreBackend,
    /// Time-to-live for persisted audit records (in hours)
    pub record_ttl_hours: u64,
    /// Upper bound on records retained by the in-memory backend
    pub max_records: usize,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: StoreBackend::Memory,
            record_ttl_hours: 24,
            max_records: 1000,
        }
    }
}

/// Worker pool configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkerConfig {
    /// Number of concurrent workers pulling from the queue
    pub pool_size: usize,
    /// Messages claimed per receive call
    pub batch_size: u32,
    /// Idle delay between empty polls (in milliseconds)
    pub poll_interval_ms: u64,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            pool_size: 2,
            batch_size: 5,
            poll_interval_ms: 1000,
        }
    }
}

/// Submission endpoint limits and pacing
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SubmissionConfig {
    /// Maximum URLs accepted in one batch submission
    pub max_batch_size: usize,
    /// Cooperative delay between enqueues in a batch (in milliseconds)
    pub batch_pacing_ms: u64,
}

impl Default for SubmissionConfig {
    fn default() -> Self {
        Self {
            max_batch_size: 25,
            batch_pacing_ms: 500,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "json".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from files and environment.
    ///
    /// Sources, lowest priority first: `config/default`, `config/{ENV}`,
    /// `config/local`, then `A11YSCAN__*` environment variables with `__`
    /// as the section separator.
    pub fn load() -> Result<Self, ConfigLoadError> {
        let mut builder = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false));

        if let Ok(env) = std::env::var("ENV") {
            builder = builder
                .add_source(config::File::with_name(&format!("config/{}", env)).required(false));
        }

        builder = builder
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(config::Environment::with_prefix("A11YSCAN").separator("__"));

        let config: Config = builder.build()?.try_deserialize()?;

        config.validate()?;

        Ok(config)
    }
}

/// Error type for configuration loading
#[derive(Debug, thiserror::Error)]
pub enum ConfigLoadError {
    #[error("Configuration file error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Configuration validation error: {0}")]
    Validation(#[from] ValidationError),
}
