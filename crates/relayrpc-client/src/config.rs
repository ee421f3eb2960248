use relayrpc_common::protocol::error::{RelayError, Result};
use std::time::Duration;

/// Failover policy applied when a node cannot be reached.
///
/// After each connectivity failure the client switches to the next node. The
/// first `immediate_retries` failovers are attempted straight away; later ones
/// wait `backoff_unit * attempt` first. Once more than `max_failovers`
/// consecutive failures have been seen, the original connectivity error is
/// returned to the caller.
///
/// # Default Configuration
///
/// - `immediate_retries`: 2
/// - `max_failovers`: 10
/// - `backoff_unit`: 5 seconds
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Failovers attempted without delay
    pub immediate_retries: u32,
    /// Consecutive connectivity failures tolerated before giving up
    pub max_failovers: u32,
    /// Linear backoff step
    pub backoff_unit: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            immediate_retries: 2,
            max_failovers: 10,
            backoff_unit: Duration::from_secs(5),
        }
    }
}

impl RetryPolicy {
    /// Creates a validated policy.
    ///
    /// # Errors
    ///
    /// Returns [`RelayError::Config`] if `immediate_retries` exceeds `max_failovers`.
    pub fn new(immediate_retries: u32, max_failovers: u32, backoff_unit: Duration) -> Result<Self> {
        if immediate_retries > max_failovers {
            return Err(RelayError::Config(format!(
                "immediate_retries ({}) cannot exceed max_failovers ({})",
                immediate_retries, max_failovers
            )));
        }

        Ok(Self {
            immediate_retries,
            max_failovers,
            backoff_unit,
        })
    }

    /// Delay before re-sending after the `attempt`-th consecutive failure.
    ///
    /// Saturates at `Duration::MAX`.
    pub fn delay_for(&self, attempt: u32) -> Option<Duration> {
        if attempt > self.immediate_retries {
            Some(self.backoff_unit.checked_mul(attempt).unwrap_or(Duration::MAX))
        } else {
            None
        }
    }

    /// Whether the `attempt`-th consecutive failure ends the call.
    pub fn is_exhausted(&self, attempt: u32) -> bool {
        attempt > self.max_failovers
    }
}

/// Settings handed to the HTTP transport.
///
/// # Default Configuration
///
/// - `num_pools`: 10
/// - `max_pool_size`: 10
/// - `timeout`: 30 seconds
/// - `retries`: 10
/// - `pool_blocking`: false
/// - `keep_alive`: true
#[derive(Debug, Clone)]
pub struct TransportConfig {
    /// Number of hosts whose request permits are tracked when `pool_blocking` is set
    pub num_pools: usize,
    /// Connections kept per host; also the in-flight limit per host when blocking
    pub max_pool_size: usize,
    /// Deadline for a single POST, including reading the body
    pub timeout: Duration,
    /// Connection-level retries against the same node before reporting it unreachable
    pub retries: u32,
    /// Wait for a free connection slot instead of opening extra connections
    pub pool_blocking: bool,
    /// Enable TCP keep-alive probes
    pub keep_alive: bool,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            num_pools: 10,
            max_pool_size: 10,
            timeout: Duration::from_secs(30),
            retries: 10,
            pool_blocking: false,
            keep_alive: true,
        }
    }
}

/// Client configuration.
///
/// # Example
///
/// ```rust
/// use relayrpc_client::{ClientConfig, RetryPolicy};
/// use std::time::Duration;
///
/// let config = ClientConfig::new(vec![
///     "https://node-a.example.com".to_string(),
///     "https://node-b.example.com".to_string(),
/// ])
/// .with_timeout(Duration::from_secs(10))
/// .with_max_workers(8)
/// .with_re_raise(true)
/// .with_retry(RetryPolicy::new(2, 10, Duration::from_secs(1)).unwrap());
///
/// assert_eq!(config.endpoints.len(), 2);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Node URLs, tried in order and then cyclically
    pub endpoints: Vec<String>,
    pub transport: TransportConfig,
    pub retry: RetryPolicy,
    /// Worker limit for concurrent batches (`None`: one worker per call)
    pub max_workers: Option<usize>,
    /// Attach the call arguments to each [`Reply`](crate::Reply)
    pub return_with_args: bool,
    /// Propagate non-connectivity transport errors instead of suppressing them
    pub re_raise: bool,
    /// Propagate unreadable response bodies instead of suppressing them
    pub strict_responses: bool,
}

impl ClientConfig {
    pub fn new(endpoints: Vec<String>) -> Self {
        Self {
            endpoints,
            transport: TransportConfig::default(),
            retry: RetryPolicy::default(),
            max_workers: None,
            return_with_args: false,
            re_raise: false,
            strict_responses: false,
        }
    }

    pub fn with_transport(mut self, transport: TransportConfig) -> Self {
        self.transport = transport;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.transport.timeout = timeout;
        self
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_max_workers(mut self, max_workers: usize) -> Self {
        self.max_workers = Some(max_workers);
        self
    }

    pub fn with_return_with_args(mut self, return_with_args: bool) -> Self {
        self.return_with_args = return_with_args;
        self
    }

    pub fn with_re_raise(mut self, re_raise: bool) -> Self {
        self.re_raise = re_raise;
        self
    }

    pub fn with_strict_responses(mut self, strict: bool) -> Self {
        self.strict_responses = strict;
        self
    }

    /// Checks settings that cannot be expressed in the types.
    pub fn validate(&self) -> Result<()> {
        if self.endpoints.is_empty() {
            return Err(RelayError::Config(
                "at least one endpoint is required".to_string(),
            ));
        }
        if self.max_workers == Some(0) {
            return Err(RelayError::Config("max_workers must be at least 1".to_string()));
        }
        if self.transport.max_pool_size == 0 {
            return Err(RelayError::Config("max_pool_size must be at least 1".to_string()));
        }
        if self.retry.immediate_retries > self.retry.max_failovers {
            return Err(RelayError::Config(
                "immediate_retries cannot exceed max_failovers".to_string(),
            ));
        }
        Ok(())
    }
}
