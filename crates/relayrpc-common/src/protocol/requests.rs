//! RPC request construction.
//!
//! An [`RpcRequest`] describes one logical call. Building it into a JSON-RPC
//! envelope is pure: the same request always yields the same bytes.

use serde::Serialize;
use serde_json::Value;

use super::error::Result;
use super::jsonrpc::{JsonRpcRequest, JSONRPC_VERSION};

pub type RpcArgs = Vec<Value>;

/// Umbrella method used to reach a method inside a named API.
pub const NAMESPACED_METHOD: &str = "call";

/// One logical RPC call.
///
/// When `namespace` is set the call is addressed through the umbrella
/// [`NAMESPACED_METHOD`] with params `[namespace, method, args]`; otherwise
/// `method` is sent as-is with `args` as the params array.
///
/// # Example
///
/// ```
/// use relayrpc_common::protocol::RpcRequest;
/// use serde_json::json;
///
/// let request = RpcRequest::new("get_followers", vec![json!("alice"), json!(10)])
///     .with_namespace("follow_api");
/// let envelope = request.to_value().unwrap();
/// assert_eq!(envelope["method"], "call");
/// assert_eq!(envelope["params"], json!(["follow_api", "get_followers", ["alice", 10]]));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct RpcRequest {
    pub method: String,
    pub args: RpcArgs,
    pub namespace: Option<String>,
    /// Caller-chosen correlation id; not made unique by the client.
    pub id: u64,
}

impl RpcRequest {
    pub fn new(method: impl Into<String>, args: RpcArgs) -> Self {
        RpcRequest {
            method: method.into(),
            args,
            namespace: None,
            id: 0,
        }
    }

    /// Encodes typed arguments, keeping their order.
    ///
    /// Fails with [`RelayError::Serialization`](super::RelayError::Serialization)
    /// if any argument cannot be represented as JSON.
    pub fn from_serializable<T: Serialize>(method: impl Into<String>, args: &[T]) -> Result<Self> {
        let args = args
            .iter()
            .map(serde_json::to_value)
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(Self::new(method, args))
    }

    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = Some(namespace.into());
        self
    }

    pub fn with_id(mut self, id: u64) -> Self {
        self.id = id;
        self
    }

    /// Method name as written on the wire.
    pub fn wire_method(&self) -> &str {
        match self.namespace {
            Some(_) => NAMESPACED_METHOD,
            None => &self.method,
        }
    }

    /// Builds the JSON-RPC envelope.
    pub fn to_jsonrpc(&self) -> JsonRpcRequest {
        let params = match &self.namespace {
            Some(namespace) => Value::Array(vec![
                Value::String(namespace.clone()),
                Value::String(self.method.clone()),
                Value::Array(self.args.clone()),
            ]),
            None => Value::Array(self.args.clone()),
        };

        JsonRpcRequest {
            jsonrpc: JSONRPC_VERSION.into(),
            id: Value::from(self.id),
            method: self.wire_method().to_string(),
            params,
        }
    }

    /// Envelope as a JSON value.
    pub fn to_value(&self) -> Result<Value> {
        Ok(serde_json::to_value(self.to_jsonrpc())?)
    }

    /// Envelope as UTF-8 bytes ready to POST. Non-ASCII text is not escaped.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec(&self.to_jsonrpc())?)
    }
}
