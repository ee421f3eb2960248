//! RelayRPC Common Types
//!
//! Protocol definitions shared by the RelayRPC client and CLI.
//!
//! # Overview
//!
//! RelayRPC is a JSON-RPC 2.0 client that spreads its calls over a rotating
//! list of nodes exposing the same API. This crate holds the pieces that do
//! not touch the network:
//!
//! - **Request building**: [`RpcRequest`] encodes a method, its positional
//!   arguments and an optional API namespace into a JSON-RPC envelope
//! - **Response parsing**: [`parse_response`] tells a result (possibly `null`)
//!   apart from a server-reported error and from an unreadable body
//! - **Errors**: [`RelayError`], the error taxonomy used across the workspace
//!
//! # Example
//!
//! ```
//! use relayrpc_common::{parse_response, RpcRequest, RpcResponse};
//! use serde_json::json;
//!
//! let body = RpcRequest::new("get_dynamic_global_properties", vec![])
//!     .to_bytes()
//!     .unwrap();
//! assert_eq!(
//!     body,
//!     br#"{"jsonrpc":"2.0","id":0,"method":"get_dynamic_global_properties","params":[]}"#
//! );
//!
//! let response = parse_response(br#"{"jsonrpc":"2.0","id":0,"result":{"head_block_number":42}}"#).unwrap();
//! assert_eq!(response, RpcResponse::Success(json!({"head_block_number": 42})));
//! ```

pub mod protocol;

pub use protocol::*;
