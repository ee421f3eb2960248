// Copyright 2025 RelayRPC Authors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! # RelayRPC CLI
//!
//! Command-line front end for `relayrpc-client`.
//!
//! ## Key Commands
//!
//! - `relayrpc call`: Make one RPC call (outputs raw JSON for scripting)
//! - `relayrpc multi`: Run one method over many argument lists, one JSON line per call
//!
//! This library half holds the pieces of the binary that are worth testing on
//! their own: URL validation, node list resolution, argument parsing and
//! output rendering.

use anyhow::{anyhow, Result};
use relayrpc_client::{BatchItem, CallOutcome, RpcArgs};
use serde_json::{json, Value};

/// Environment variable consulted when no `--node` flag is given
pub const NODES_ENV: &str = "RELAYRPC_NODES";

/// Validates that a URL string starts with http:// or https://
///
/// `description` names what the URL is for in the error message (e.g. "node address").
pub fn validate_http_url(url: &str, description: &str) -> Result<()> {
    if url.starts_with("http://") || url.starts_with("https://") {
        Ok(())
    } else {
        Err(anyhow!(
            "Invalid {}: '{}' must start with http:// or https://",
            description,
            url
        ))
    }
}

/// Picks the node list: `--node` flags win, then the comma-separated
/// `RELAYRPC_NODES` value. Every URL is validated.
pub fn resolve_nodes(flags: Vec<String>, env: Option<String>) -> Result<Vec<String>> {
    let nodes: Vec<String> = if flags.is_empty() {
        env.unwrap_or_default()
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect()
    } else {
        flags
    };

    if nodes.is_empty() {
        return Err(anyhow!(
            "No nodes given; use --node <url> or set {}",
            NODES_ENV
        ));
    }

    for node in &nodes {
        validate_http_url(node, "node address")?;
    }

    Ok(nodes)
}

/// Parses a JSON array of positional arguments.
pub fn parse_args(raw: &str) -> Result<RpcArgs> {
    let value: Value =
        serde_json::from_str(raw).map_err(|e| anyhow!("Invalid JSON in args: {}", e))?;

    match value {
        Value::Array(args) => Ok(args),
        other => Err(anyhow!(
            "Arguments must be a JSON array, e.g. '[\"alice\", 10]', got: {}",
            other
        )),
    }
}

/// The value printed for a call: the result, or `null` when the failure was suppressed.
pub fn render_outcome(outcome: CallOutcome) -> Value {
    match outcome {
        CallOutcome::Success(value) => value,
        CallOutcome::Suppressed(e) => {
            tracing::warn!("Call failed: {}", e);
            Value::Null
        }
    }
}

/// One output line for `multi`.
pub fn render_batch_item((outcome, args): BatchItem) -> Value {
    match outcome {
        Ok(outcome) => json!({ "args": args, "result": render_outcome(outcome) }),
        Err(e) => json!({ "args": args, "error": e.to_string() }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use relayrpc_client::RelayError;

    #[test]
    fn test_validate_http_url() {
        assert!(validate_http_url("http://127.0.0.1:8090", "node address").is_ok());
        assert!(validate_http_url("https://api.example.com", "node address").is_ok());

        let err = validate_http_url("127.0.0.1:8090", "node address").unwrap_err();
        assert!(err.to_string().contains("node address"));
    }

    #[test]
    fn test_resolve_nodes_prefers_flags() {
        let nodes = resolve_nodes(
            vec!["http://a".to_string()],
            Some("http://b,http://c".to_string()),
        )
        .unwrap();
        assert_eq!(nodes, vec!["http://a".to_string()]);
    }

    #[test]
    fn test_resolve_nodes_from_env() {
        let nodes = resolve_nodes(vec![], Some(" http://b , http://c,".to_string())).unwrap();
        assert_eq!(nodes, vec!["http://b".to_string(), "http://c".to_string()]);
    }

    #[test]
    fn test_resolve_nodes_requires_some() {
        assert!(resolve_nodes(vec![], None).is_err());
        assert!(resolve_nodes(vec![], Some(",".to_string())).is_err());
    }

    #[test]
    fn test_resolve_nodes_validates() {
        let result = resolve_nodes(vec!["node1:8090".to_string()], None);
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_args() {
        assert_eq!(parse_args("[]").unwrap(), Vec::<Value>::new());
        assert_eq!(
            parse_args(r#"["alice", 10, {"x": null}]"#).unwrap(),
            vec![json!("alice"), json!(10), json!({"x": null})]
        );
    }

    #[test]
    fn test_parse_args_rejects_non_arrays() {
        assert!(parse_args(r#"{"account": "alice"}"#).is_err());
        assert!(parse_args("alice").is_err());
    }

    #[test]
    fn test_render_outcome() {
        assert_eq!(render_outcome(CallOutcome::Success(json!(5))), json!(5));
        assert_eq!(
            render_outcome(CallOutcome::Suppressed(RelayError::MalformedResponse(
                "eof".to_string()
            ))),
            Value::Null
        );
    }

    #[test]
    fn test_render_batch_item() {
        let ok = render_batch_item((Ok(CallOutcome::Success(json!("b1"))), vec![json!(1)]));
        assert_eq!(ok, json!({"args": [1], "result": "b1"}));

        let failed = render_batch_item((
            Err(RelayError::Rpc {
                message: "unknown block".to_string(),
                code: None,
            }),
            vec![json!(2)],
        ));
        assert_eq!(failed["args"], json!([2]));
        assert_eq!(failed["error"], "RPC error: unknown block");
    }
}
