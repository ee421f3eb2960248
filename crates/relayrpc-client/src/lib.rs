//! RelayRPC client.
//!
//! A JSON-RPC 2.0 client for a set of interchangeable nodes. Calls go to one
//! active node; when it cannot be reached the client fails over to the next,
//! with a bounded number of attempts and a linear backoff.
//!
//! # Example
//!
//! ```rust,no_run
//! use futures::StreamExt;
//! use relayrpc_client::RpcClient;
//! use serde_json::json;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let client = RpcClient::new(vec!["https://api.example.com".to_string()])?;
//!
//! let props = client.exec("get_dynamic_global_properties", vec![]).await?;
//! println!("{:?}", props.value());
//!
//! let mut blocks = client.exec_multi_concurrent("get_block", (1..=10).map(|n| vec![json!(n)]), Some(4));
//! while let Some((outcome, args)) = blocks.next().await {
//!     println!("{:?} -> {:?}", args, outcome?.value());
//! }
//! # Ok(())
//! # }
//! ```

pub mod batch;
pub mod client;
pub mod config;
pub mod endpoint;
pub mod rotator;
pub mod transport;

pub use batch::BatchItem;
pub use client::{CallOptions, CallOutcome, Reply, RpcClient};
pub use config::{ClientConfig, RetryPolicy, TransportConfig};
pub use endpoint::Endpoint;
pub use rotator::NodeRotator;
pub use transport::{HttpTransport, Transport, TransportResponse};

pub use relayrpc_common::protocol::{RelayError, Result, RpcArgs, RpcRequest};
