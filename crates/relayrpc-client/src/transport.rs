//! Transport layer.
//!
//! The client only needs one capability from the network: POST a body to a
//! node and get back a status code and the response bytes. [`Transport`] is
//! that seam; [`HttpTransport`] implements it over a pooled hyper client with
//! rustls.
//!
//! # Error classes
//!
//! - [`RelayError::Connectivity`]: the node could not be reached or the
//!   exchange broke off (refused, DNS, TLS, reset, timeout). The client fails
//!   over to another node.
//! - [`RelayError::Transport`]: anything else, e.g. a request that could not be
//!   assembled. Not retried.

use async_trait::async_trait;
use http_body_util::{BodyExt, Full};
use hyper::body::Bytes;
use hyper::header::CONTENT_TYPE;
use hyper::Request;
use hyper_rustls::{HttpsConnector, HttpsConnectorBuilder};
use hyper_util::client::legacy::connect::HttpConnector;
use hyper_util::client::legacy::Client;
use hyper_util::rt::TokioExecutor;
use relayrpc_common::protocol::error::{RelayError, Result};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};

use crate::config::TransportConfig;
use crate::endpoint::Endpoint;

/// Interval between TCP keep-alive probes when keep-alive is enabled
const TCP_KEEPALIVE: Duration = Duration::from_secs(60);

/// Raw answer from a node.
#[derive(Debug, Clone)]
pub struct TransportResponse {
    pub status: u16,
    pub body: Bytes,
}

/// Sends request bodies to nodes.
///
/// Implementations must be safe to share between concurrent calls.
#[async_trait]
pub trait Transport: Send + Sync {
    /// POSTs `body` to `endpoint`.
    async fn post(&self, endpoint: &Endpoint, body: Bytes) -> Result<TransportResponse>;
}

/// HTTP(S) transport backed by hyper's pooled client.
///
/// # Pooling
///
/// Idle connections are kept per host, up to `max_pool_size`. With
/// `pool_blocking` set, at most `max_pool_size` requests per host are in
/// flight; further requests wait for a slot, and that wait counts against
/// `timeout`. Slot tables are kept for up to
/// `num_pools` hosts, idle tables are dropped first when a new host shows up.
///
/// # Example
///
/// ```rust,no_run
/// use relayrpc_client::{Endpoint, HttpTransport, Transport, TransportConfig};
/// use hyper::body::Bytes;
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let transport = HttpTransport::new(TransportConfig::default())?;
/// let endpoint = Endpoint::parse("https://api.example.com")?;
///
/// let body = Bytes::from_static(br#"{"jsonrpc":"2.0","id":0,"method":"get_config","params":[]}"#);
/// let response = transport.post(&endpoint, body).await?;
/// println!("{} {:?}", response.status, response.body);
/// # Ok(())
/// # }
/// ```
pub struct HttpTransport {
    client: Client<HttpsConnector<HttpConnector>, Full<Bytes>>,
    config: TransportConfig,
    permits: Mutex<HashMap<String, Arc<Semaphore>>>,
}

impl HttpTransport {
    /// Creates a transport with its own connection pool.
    pub fn new(config: TransportConfig) -> Result<Self> {
        if config.max_pool_size == 0 {
            return Err(RelayError::Config(
                "max_pool_size must be at least 1".to_string(),
            ));
        }

        let mut http = HttpConnector::new();
        http.enforce_http(false);
        http.set_connect_timeout(Some(config.timeout));
        http.set_keepalive(config.keep_alive.then_some(TCP_KEEPALIVE));

        let https = HttpsConnectorBuilder::new()
            .with_webpki_roots()
            .https_or_http()
            .enable_http1()
            .wrap_connector(http);

        let client = Client::builder(TokioExecutor::new())
            .pool_max_idle_per_host(config.max_pool_size)
            .build(https);

        Ok(Self {
            client,
            config,
            permits: Mutex::new(HashMap::new()),
        })
    }

    pub fn config(&self) -> &TransportConfig {
        &self.config
    }

    /// Waits for a request slot on the endpoint's host when blocking is enabled.
    async fn acquire_slot(&self, endpoint: &Endpoint) -> Result<Option<OwnedSemaphorePermit>> {
        if !self.config.pool_blocking {
            return Ok(None);
        }

        let semaphore = {
            let max = self.config.max_pool_size;
            let key = endpoint.authority_key();
            let mut permits = self.permits.lock().unwrap_or_else(PoisonError::into_inner);

            if !permits.contains_key(&key) && permits.len() >= self.config.num_pools {
                permits.retain(|_, slots| slots.available_permits() < max);
            }

            permits
                .entry(key)
                .or_insert_with(|| Arc::new(Semaphore::new(max)))
                .clone()
        };

        semaphore
            .acquire_owned()
            .await
            .map(Some)
            .map_err(|e| RelayError::Transport(format!("Connection pool closed: {}", e)))
    }

    /// One request/response exchange, no retries.
    async fn send_once(&self, endpoint: &Endpoint, body: Bytes) -> std::result::Result<TransportResponse, SendFailure> {
        let request = Request::builder()
            .method("POST")
            .uri(endpoint.uri().clone())
            .header(CONTENT_TYPE, "application/json")
            .body(Full::new(body))
            .map_err(|e| {
                SendFailure::Other(RelayError::Transport(format!("Failed to build request: {}", e)))
            })?;

        let response = self.client.request(request).await.map_err(|e| {
            let error = RelayError::connectivity(endpoint.as_str(), format!("HTTP request failed: {}", e));
            if e.is_connect() {
                SendFailure::Connect(error)
            } else {
                SendFailure::Other(error)
            }
        })?;

        let status = response.status().as_u16();
        let body = response
            .into_body()
            .collect()
            .await
            .map_err(|e| {
                SendFailure::Other(RelayError::connectivity(
                    endpoint.as_str(),
                    format!("Failed to read response: {}", e),
                ))
            })?
            .to_bytes();

        Ok(TransportResponse { status, body })
    }
}

/// Outcome of a failed exchange; only `Connect` is retried against the same node.
enum SendFailure {
    Connect(RelayError),
    Other(RelayError),
}

#[async_trait]
impl Transport for HttpTransport {
    async fn post(&self, endpoint: &Endpoint, body: Bytes) -> Result<TransportResponse> {
        let timeout = self.config.timeout;
        let _slot = tokio::time::timeout(timeout, self.acquire_slot(endpoint))
            .await
            .map_err(|_| {
                RelayError::connectivity(
                    endpoint.as_str(),
                    format!("Timed out after {}ms waiting for a connection slot", timeout.as_millis()),
                )
            })??;
        let mut attempt = 0;

        loop {
            let exchange = tokio::time::timeout(timeout, self.send_once(endpoint, body.clone()));
            let error = match exchange.await {
                Ok(Ok(response)) => return Ok(response),
                Ok(Err(SendFailure::Connect(e))) if attempt < self.config.retries => e,
                Ok(Err(SendFailure::Connect(e))) | Ok(Err(SendFailure::Other(e))) => return Err(e),
                Err(_) => {
                    return Err(RelayError::connectivity(
                        endpoint.as_str(),
                        format!("Request timeout after {}ms", timeout.as_millis()),
                    ))
                }
            };

            attempt += 1;
            tracing::debug!(
                endpoint = %endpoint,
                attempt,
                "Connection failed, retrying same node: {}",
                error
            );
        }
    }
}
