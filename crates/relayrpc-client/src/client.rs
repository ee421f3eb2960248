use hyper::body::Bytes;
use relayrpc_common::protocol::error::{RelayError, Result};
use relayrpc_common::protocol::{is_expected_status, parse_response, RpcArgs, RpcRequest};
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{error, info, warn};

use crate::config::ClientConfig;
use crate::endpoint::Endpoint;
use crate::rotator::NodeRotator;
use crate::transport::{HttpTransport, Transport, TransportResponse};

/// Result of a call that did not fail fatally.
#[derive(Debug)]
pub enum CallOutcome {
    /// The node returned a result. `Value::Null` is a legitimate result.
    Success(Value),
    /// The call failed in a way the client was configured to tolerate
    /// (a non-connectivity transport error, or an unreadable response body).
    Suppressed(RelayError),
}

impl CallOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, CallOutcome::Success(_))
    }

    pub fn value(&self) -> Option<&Value> {
        match self {
            CallOutcome::Success(value) => Some(value),
            CallOutcome::Suppressed(_) => None,
        }
    }

    pub fn into_value(self) -> Option<Value> {
        match self {
            CallOutcome::Success(value) => Some(value),
            CallOutcome::Suppressed(_) => None,
        }
    }

    pub fn suppressed_error(&self) -> Option<&RelayError> {
        match self {
            CallOutcome::Success(_) => None,
            CallOutcome::Suppressed(e) => Some(e),
        }
    }
}

/// Outcome of [`RpcClient::execute`], optionally paired with the call arguments.
#[derive(Debug)]
pub struct Reply {
    pub outcome: CallOutcome,
    /// Present when `return_with_args` is in effect for the call
    pub args: Option<RpcArgs>,
}

/// Per-call overrides of [`ClientConfig`] flags.
#[derive(Debug, Clone, Copy, Default)]
pub struct CallOptions {
    pub re_raise: Option<bool>,
    pub return_with_args: Option<bool>,
}

impl CallOptions {
    pub fn re_raise(mut self, re_raise: bool) -> Self {
        self.re_raise = Some(re_raise);
        self
    }

    pub fn return_with_args(mut self, return_with_args: bool) -> Self {
        self.return_with_args = Some(return_with_args);
        self
    }
}

/// JSON-RPC client that fails over between nodes.
///
/// Every call is sent to the active node. When a node cannot be reached the
/// client moves on to the next one, first immediately and then with a linear
/// backoff, until [`RetryPolicy::max_failovers`](crate::RetryPolicy) is
/// exceeded. Errors reported by a node are returned as-is and never retried.
///
/// The client is cheap to clone; clones share the connection pool and the
/// active node.
///
/// # Example
///
/// ```rust,no_run
/// use relayrpc_client::RpcClient;
/// use serde_json::json;
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let client = RpcClient::new(vec![
///     "https://node-a.example.com".to_string(),
///     "https://node-b.example.com".to_string(),
/// ])?;
///
/// let followers = client
///     .exec_api("follow_api", "get_followers", vec![json!("alice"), json!(""), json!("blog"), json!(10)])
///     .await?;
/// println!("{:?}", followers.value());
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct RpcClient {
    inner: Arc<ClientInner>,
}

struct ClientInner {
    transport: Arc<dyn Transport>,
    rotator: RwLock<NodeRotator>,
    config: ClientConfig,
}

impl RpcClient {
    /// Creates a client over the given node URLs with default settings.
    pub fn new(endpoints: Vec<String>) -> Result<Self> {
        Self::with_config(ClientConfig::new(endpoints))
    }

    /// Creates a client with an [`HttpTransport`] built from `config.transport`.
    pub fn with_config(config: ClientConfig) -> Result<Self> {
        config.validate()?;
        let transport = HttpTransport::new(config.transport.clone())?;
        Self::with_transport(config, Arc::new(transport))
    }

    /// Creates a client that sends through a caller-supplied transport.
    ///
    /// `config.transport` is ignored; the transport is used as given.
    pub fn with_transport(config: ClientConfig, transport: Arc<dyn Transport>) -> Result<Self> {
        config.validate()?;
        let rotator = NodeRotator::from_urls(&config.endpoints)?;

        info!(
            "RPC client initialized with {} node(s), starting at {}",
            rotator.len(),
            rotator.current()
        );

        Ok(Self {
            inner: Arc::new(ClientInner {
                transport,
                rotator: RwLock::new(rotator),
                config,
            }),
        })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.inner.config
    }

    /// The node calls are currently sent to.
    pub async fn active_endpoint(&self) -> Endpoint {
        self.inner.rotator.read().await.current().clone()
    }

    /// Host name of the active node.
    pub async fn hostname(&self) -> Option<String> {
        self.inner
            .rotator
            .read()
            .await
            .current()
            .hostname()
            .map(str::to_string)
    }

    /// Switches to the next node.
    ///
    /// Meant for callers that notice failures the client cannot see, such as
    /// a node serving stale data.
    pub async fn change_node(&self) -> Endpoint {
        let mut rotator = self.inner.rotator.write().await;
        let next = rotator.advance().clone();
        info!("Switched to node {}", next);
        next
    }

    /// Moves past `failed` unless another call already did.
    async fn fail_over_from(&self, failed: &Endpoint) -> Endpoint {
        let mut rotator = self.inner.rotator.write().await;
        if rotator.current() == failed {
            rotator.advance().clone()
        } else {
            rotator.current().clone()
        }
    }

    /// Calls `method` with positional `args`.
    pub async fn exec(&self, method: impl Into<String>, args: RpcArgs) -> Result<CallOutcome> {
        let reply = self
            .execute(RpcRequest::new(method, args), CallOptions::default())
            .await?;
        Ok(reply.outcome)
    }

    /// Calls `method` inside the API `namespace`, sent as `call(namespace, method, args)`.
    pub async fn exec_api(
        &self,
        namespace: impl Into<String>,
        method: impl Into<String>,
        args: RpcArgs,
    ) -> Result<CallOutcome> {
        let request = RpcRequest::new(method, args).with_namespace(namespace);
        let reply = self.execute(request, CallOptions::default()).await?;
        Ok(reply.outcome)
    }

    /// Executes one logical call.
    ///
    /// # Returns
    ///
    /// - `Ok(Reply)` with [`CallOutcome::Success`] when the node returned a result
    /// - `Ok(Reply)` with [`CallOutcome::Suppressed`] for a non-connectivity
    ///   transport error (unless `re_raise`) or an unreadable body (unless
    ///   `strict_responses`)
    /// - `Err(RelayError::Rpc)` whenever the node reported an error
    /// - `Err(RelayError::Connectivity)` once failover is exhausted
    /// - `Err(RelayError::Serialization)` if the request cannot be encoded
    pub async fn execute(&self, request: RpcRequest, options: CallOptions) -> Result<Reply> {
        let config = &self.inner.config;
        let re_raise = options.re_raise.unwrap_or(config.re_raise);
        let return_with_args = options.return_with_args.unwrap_or(config.return_with_args);

        let body = Bytes::from(request.to_bytes()?);

        let outcome = match self.send_with_failover(body).await {
            Ok((endpoint, response)) => self.interpret(&endpoint, response)?,
            Err(e) if e.is_retryable() || re_raise => return Err(e),
            Err(e) => {
                info!(method = %request.method, "Request error: {}", e);
                CallOutcome::Suppressed(e)
            }
        };

        Ok(Reply {
            outcome,
            args: return_with_args.then_some(request.args),
        })
    }

    /// Posts `body`, rotating nodes on connectivity failures.
    async fn send_with_failover(&self, body: Bytes) -> Result<(Endpoint, TransportResponse)> {
        let policy = &self.inner.config.retry;
        let mut attempt: u32 = 0;

        loop {
            let endpoint = self.active_endpoint().await;

            let error = match self.inner.transport.post(&endpoint, body.clone()).await {
                Ok(response) => return Ok((endpoint, response)),
                Err(e) if e.is_retryable() => e,
                Err(e) => return Err(e),
            };

            attempt += 1;
            let next = self.fail_over_from(&endpoint).await;

            if policy.is_exhausted(attempt) {
                error!(
                    "Giving up after {} consecutive connection failures: {}",
                    attempt, error
                );
                return Err(error);
            }

            match policy.delay_for(attempt) {
                Some(delay) => {
                    warn!(
                        "Node {} failed (attempt {}): {}, switching to {} in {}ms",
                        endpoint,
                        attempt,
                        error,
                        next,
                        delay.as_millis()
                    );
                    tokio::time::sleep(delay).await;
                }
                None => {
                    warn!(
                        "Node {} failed (attempt {}): {}, switching to {}",
                        endpoint, attempt, error, next
                    );
                }
            }
        }
    }

    /// Turns a raw node answer into an outcome.
    fn interpret(&self, endpoint: &Endpoint, response: TransportResponse) -> Result<CallOutcome> {
        if !is_expected_status(response.status) {
            warn!(endpoint = %endpoint, "Non-200 response: {}", response.status);
        }

        match parse_response(&response.body) {
            Ok(parsed) => parsed.into_result().map(CallOutcome::Success),
            Err(e) if self.inner.config.strict_responses => Err(e),
            Err(e) => {
                info!(endpoint = %endpoint, "Failed to load response: {}", e);
                Ok(CallOutcome::Suppressed(e))
            }
        }
    }
}
