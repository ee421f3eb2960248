//! JSON-RPC 2.0 Protocol Types
//!
//! Wire envelopes exchanged with remote nodes.
//!
//! - Request format: `{"jsonrpc": "2.0", "id": ..., "method": "...", "params": ...}`
//! - Response format: `{"jsonrpc": "2.0", "result": ..., "error": ..., "id": ...}`
//! - Error format: `{"code": ..., "message": "...", "data": ...}`
//!
//! The client never deserializes responses into [`JsonRpcResponse`] directly:
//! serde maps `"result": null` onto `None`, which would erase the difference
//! between a null result and a missing one. See [`crate::protocol::responses`].
//!
//! # Example
//!
//! ```
//! use relayrpc_common::protocol::jsonrpc::{JsonRpcResponse, JsonRpcError};
//! use serde_json::json;
//!
//! let response = JsonRpcResponse::success(json!(1), json!({"head_block_number": 42}));
//! let error_response = JsonRpcResponse::error(json!(1), JsonRpcError::server_error("node is syncing"));
//! ```

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// JSON-RPC protocol version sent with every request
pub const JSONRPC_VERSION: &str = "2.0";

/// JSON-RPC 2.0 request
///
/// Field order matches the order the envelope is written on the wire.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct JsonRpcRequest {
    /// JSON-RPC version (must be "2.0")
    pub jsonrpc: String,
    /// Request identifier
    pub id: Value,
    /// Name of the method to invoke
    pub method: String,
    /// Parameter values
    pub params: Value,
}

/// JSON-RPC 2.0 response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcResponse {
    /// JSON-RPC version (must be "2.0")
    pub jsonrpc: String,
    /// Result value on success
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    /// Error object on failure
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<JsonRpcError>,
    /// Request identifier (must match the request id)
    pub id: Value,
}

/// JSON-RPC 2.0 error
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct JsonRpcError {
    /// Error code (standard codes are negative integers)
    pub code: i64,
    /// Short description of the error
    pub message: String,
    /// Additional data (optional)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

/// Generic application-defined server error
pub const SERVER_ERROR: i64 = -32000;

impl JsonRpcError {
    /// Create a server error (-32000)
    pub fn server_error(msg: &str) -> Self {
        Self {
            code: SERVER_ERROR,
            message: msg.into(),
            data: None,
        }
    }
}

impl JsonRpcResponse {
    /// Create a success response
    pub fn success(id: Value, result: Value) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.into(),
            result: Some(result),
            error: None,
            id,
        }
    }

    /// Create an error response
    pub fn error(id: Value, error: JsonRpcError) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.into(),
            result: None,
            error: Some(error),
            id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_jsonrpc_request_field_order() {
        let req = JsonRpcRequest {
            jsonrpc: JSONRPC_VERSION.into(),
            id: json!(0),
            method: "get_block".into(),
            params: json!([1]),
        };
        let serialized = serde_json::to_string(&req).unwrap();
        assert_eq!(
            serialized,
            r#"{"jsonrpc":"2.0","id":0,"method":"get_block","params":[1]}"#
        );
    }

    #[test]
    fn test_jsonrpc_response_success() {
        let res = JsonRpcResponse::success(json!(1), json!({"result": 42}));
        assert_eq!(res.result, Some(json!({"result": 42})));
        assert_eq!(res.error, None);
        assert_eq!(res.jsonrpc, "2.0");
        assert_eq!(res.id, json!(1));
    }

    #[test]
    fn test_jsonrpc_success_with_null_result_keeps_field() {
        let res = JsonRpcResponse::success(json!(1), Value::Null);
        let serialized = serde_json::to_string(&res).unwrap();
        assert!(serialized.contains(r#""result":null"#));
        assert!(!serialized.contains("error"));
    }

    #[test]
    fn test_jsonrpc_response_error() {
        let res = JsonRpcResponse::error(json!(1), JsonRpcError::server_error("boom"));
        let serialized = serde_json::to_string(&res).unwrap();
        assert!(serialized.contains(r#""code":-32000"#));
        assert!(serialized.contains(r#""message":"boom""#));
        assert!(!serialized.contains("result"));
    }

    #[test]
    fn test_server_error() {
        let error = JsonRpcError::server_error("node is syncing");
        assert_eq!(error.code, SERVER_ERROR);
        assert_eq!(error.message, "node is syncing");
        assert!(error.data.is_none());
    }

    #[test]
    fn test_jsonrpc_request_deserialization() {
        let json = r#"{"jsonrpc":"2.0","method":"call","params":["follow_api","get_followers",[]],"id":7}"#;
        let req: JsonRpcRequest = serde_json::from_str(json).unwrap();
        assert_eq!(req.method, "call");
        assert_eq!(req.params, json!(["follow_api", "get_followers", []]));
        assert_eq!(req.id, json!(7));
    }
}
