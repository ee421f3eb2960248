//! Response parsing.
//!
//! Turns a raw response body into an [`RpcResponse`], separating "the server
//! answered with an error envelope" from "the body could not be understood".

use serde_json::{Map, Value};

use super::error::{RelayError, Result};

/// RPC method result (JSON value)
pub type RpcResult = Value;

/// A well-formed answer from a node.
#[derive(Debug, Clone, PartialEq)]
pub enum RpcResponse {
    /// `result` was present. `Value::Null` is a valid result.
    Success(RpcResult),
    /// `error` was present.
    Failure { message: String, code: Option<i64> },
}

impl RpcResponse {
    /// Converts a failure into the protocol error surfaced to callers.
    pub fn into_result(self) -> Result<RpcResult> {
        match self {
            RpcResponse::Success(value) => Ok(value),
            RpcResponse::Failure { message, code } => Err(RelayError::Rpc { message, code }),
        }
    }
}

/// Parses a JSON-RPC response body.
///
/// # Errors
///
/// Returns [`RelayError::MalformedResponse`] when the body is not JSON, is not
/// a JSON object, or carries neither `error` nor `result`.
///
/// # Example
///
/// ```
/// use relayrpc_common::protocol::{parse_response, RpcResponse};
/// use serde_json::Value;
///
/// let parsed = parse_response(br#"{"jsonrpc":"2.0","id":0,"result":null}"#).unwrap();
/// assert_eq!(parsed, RpcResponse::Success(Value::Null));
///
/// let parsed = parse_response(br#"{"error":{"message":"x","detail":"y"}}"#).unwrap();
/// assert!(matches!(parsed, RpcResponse::Failure { message, .. } if message == "y"));
/// ```
pub fn parse_response(body: &[u8]) -> Result<RpcResponse> {
    let value: Value = serde_json::from_slice(body)
        .map_err(|e| RelayError::MalformedResponse(format!("body is not valid JSON: {}", e)))?;

    let Value::Object(mut envelope) = value else {
        return Err(RelayError::MalformedResponse(
            "body is not a JSON object".to_string(),
        ));
    };

    if let Some(error) = envelope.remove("error") {
        // Some servers send `"error": null` next to a result.
        if !error.is_null() {
            return Ok(failure_from(error));
        }
    }

    match envelope.remove("result") {
        Some(result) => Ok(RpcResponse::Success(result)),
        None => Err(RelayError::MalformedResponse(
            "response carries neither result nor error".to_string(),
        )),
    }
}

fn failure_from(error: Value) -> RpcResponse {
    match error {
        Value::Object(fields) => RpcResponse::Failure {
            message: error_message(&fields),
            code: fields.get("code").and_then(Value::as_i64),
        },
        Value::String(message) => RpcResponse::Failure { message, code: None },
        other => RpcResponse::Failure {
            message: other.to_string(),
            code: None,
        },
    }
}

/// `detail` wins over `message`; an error object with neither is rendered whole.
fn error_message(fields: &Map<String, Value>) -> String {
    fields
        .get("detail")
        .or_else(|| fields.get("message"))
        .map(|v| match v {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        })
        .unwrap_or_else(|| Value::Object(fields.clone()).to_string())
}

/// Statuses accepted without a warning: 200 and redirects.
pub fn is_expected_status(status: u16) -> bool {
    status == 200 || (300..400).contains(&status)
}
