pub mod error;
pub mod jsonrpc;
pub mod requests;
pub mod responses;


pub use error::{RelayError, Result};
pub use jsonrpc::{JsonRpcError, JsonRpcRequest, JsonRpcResponse};
pub use requests::{RpcArgs, RpcRequest, NAMESPACED_METHOD};
pub use responses::{is_expected_status, parse_response, RpcResponse, RpcResult};
