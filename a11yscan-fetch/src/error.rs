//! Fetch error taxonomy and retryability classification

/// Errors raised while fetching and evaluating a page.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// Connection reset by the remote end
    #[error("Connection reset: {0}")]
    ConnectionReset(String),

    /// Connection refused
    #[error("Connection refused: {0}")]
    ConnectionRefused(String),

    /// Connection attempt timed out
    #[error("Connection timed out: {0}")]
    ConnectionTimeout(String),

    /// Name resolution failed
    #[error("DNS resolution failed for {0}")]
    DnsFailure(String),

    /// Page navigation exceeded the configured timeout
    #[error("Navigation timed out after {seconds}s")]
    NavigationTimeout { seconds: u64 },

    /// Transport-protocol level failure (TLS, HTTP/2, ...)
    #[error("Transport protocol error: {0}")]
    Protocol(String),

    /// The rule-evaluation capability failed to initialize on a loaded
    /// page. This is a logic bug, not transient network state, and is
    /// never retried.
    #[error("Rule engine failed to initialize: {0}")]
    EngineNotReady(String),

    /// Any other engine failure, treated as non-retryable
    #[error("Render engine error: {0}")]
    Engine(String),

    /// All attempts exhausted; carries the last observed error
    #[error("Fetch failed after {attempts} attempts: {last}")]
    RetriesExhausted {
        attempts: u32,
        #[source]
        last: Box<FetchError>,
    },
}

impl FetchError {
    /// Whether the error matches one of the transient network
    /// signatures worth retrying.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::ConnectionReset(_)
                | Self::ConnectionRefused(_)
                | Self::ConnectionTimeout(_)
                | Self::DnsFailure(_)
                | Self::NavigationTimeout { .. }
                | Self::Protocol(_)
        )
    }
}
