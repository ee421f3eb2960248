//! # RelayRPC CLI Entry Point
//!
//! ## Usage
//!
//! ```bash
//! # One call, failing over between two nodes
//! relayrpc call -n https://node-a.example.com -n https://node-b.example.com get_block -a '[1]'
//!
//! # A namespaced call
//! relayrpc call -n https://node-a.example.com --api follow_api get_followers -a '["alice", "", "blog", 10]'
//!
//! # Many calls, four at a time, one JSON line each
//! export RELAYRPC_NODES=https://node-a.example.com,https://node-b.example.com
//! relayrpc multi get_block -p '[1]' -p '[2]' -p '[3]' --concurrent --workers 4
//! ```
//!
//! Results go to stdout as raw JSON; logs go to stderr.

use anyhow::Result;
use argh::FromArgs;
use futures::StreamExt;
use relayrpc_cli::{parse_args, render_batch_item, render_outcome, resolve_nodes, NODES_ENV};
use relayrpc_client::{CallOptions, ClientConfig, RpcClient, RpcRequest};
use serde_json::json;
use std::time::Duration;

#[derive(FromArgs)]
/// RelayRPC - JSON-RPC client with node failover
struct Cli {
    #[argh(subcommand)]
    command: Commands,
}

#[derive(FromArgs)]
#[argh(subcommand)]
enum Commands {
    Call(CallArgs),
    Multi(MultiArgs),
}

/// Arguments for making a single RPC call.
///
/// Prints the result as raw JSON, or `null` when the call failed in a way the
/// client tolerates. Node errors and exhausted failover exit non-zero.
#[derive(FromArgs)]
#[argh(subcommand, name = "call")]
/// call an RPC method
struct CallArgs {
    /// node URL; repeat for failover (falls back to RELAYRPC_NODES)
    #[argh(option, short = 'n', long = "node")]
    nodes: Vec<String>,

    /// name of the RPC method to call
    #[argh(positional)]
    method: String,

    /// JSON array of positional arguments
    #[argh(option, short = 'a', long = "args", default = "\"[]\".into()")]
    args: String,

    /// API namespace; sends the call as call(namespace, method, args)
    #[argh(option, long = "api")]
    api: Option<String>,

    /// fail on transport errors instead of printing null
    #[argh(switch, long = "raise")]
    raise: bool,

    /// fail on unreadable responses instead of printing null
    #[argh(switch, long = "strict")]
    strict: bool,

    /// print {"args":..,"result":..} instead of the bare result
    #[argh(switch, long = "with-args")]
    with_args: bool,

    /// request timeout in seconds
    #[argh(option, long = "timeout")]
    timeout: Option<u64>,
}

/// Arguments for running one method over many argument lists.
///
/// Prints one JSON line per call, `{"args":..,"result":..}` or
/// `{"args":..,"error":".."}`. Without `--concurrent` lines come in input
/// order; with it, in completion order.
#[derive(FromArgs)]
#[argh(subcommand, name = "multi")]
/// call an RPC method once per argument list
struct MultiArgs {
    /// node URL; repeat for failover (falls back to RELAYRPC_NODES)
    #[argh(option, short = 'n', long = "node")]
    nodes: Vec<String>,

    /// name of the RPC method to call
    #[argh(positional)]
    method: String,

    /// JSON array of arguments for one call; repeat per call
    #[argh(option, short = 'p', long = "params")]
    params: Vec<String>,

    /// run calls in parallel
    #[argh(switch, long = "concurrent")]
    concurrent: bool,

    /// maximum calls in flight with --concurrent (default: all)
    #[argh(option, long = "workers")]
    workers: Option<usize>,

    /// request timeout in seconds
    #[argh(option, long = "timeout")]
    timeout: Option<u64>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli: Cli = argh::from_env();

    // Logs go to stderr so stdout stays pipeable
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Call(args) => run_call(args).await,
        Commands::Multi(args) => run_multi(args).await,
    }
}

fn build_config(nodes: Vec<String>, timeout: Option<u64>) -> Result<ClientConfig> {
    let nodes = resolve_nodes(nodes, std::env::var(NODES_ENV).ok())?;
    let mut config = ClientConfig::new(nodes);
    if let Some(secs) = timeout {
        config = config.with_timeout(Duration::from_secs(secs));
    }
    Ok(config)
}

/// Executes the `call` subcommand.
async fn run_call(args: CallArgs) -> Result<()> {
    let config = build_config(args.nodes, args.timeout)?
        .with_re_raise(args.raise)
        .with_strict_responses(args.strict)
        .with_return_with_args(args.with_args);
    let client = RpcClient::with_config(config)?;

    let mut request = RpcRequest::new(args.method, parse_args(&args.args)?);
    if let Some(namespace) = args.api {
        request = request.with_namespace(namespace);
    }

    let reply = client.execute(request, CallOptions::default()).await?;
    let result = render_outcome(reply.outcome);

    let output = match reply.args {
        Some(call_args) => json!({ "args": call_args, "result": result }),
        None => result,
    };
    println!("{}", serde_json::to_string(&output)?);

    Ok(())
}

/// Executes the `multi` subcommand.
async fn run_multi(args: MultiArgs) -> Result<()> {
    let config = build_config(args.nodes, args.timeout)?;
    let client = RpcClient::with_config(config)?;

    let params = args
        .params
        .iter()
        .map(|raw| parse_args(raw))
        .collect::<Result<Vec<_>>>()?;

    tracing::info!("Running {} calls of {}", params.len(), args.method);

    let mut items = if args.concurrent {
        client.exec_multi_concurrent(args.method, params, args.workers)
    } else {
        client.exec_multi(args.method, params)
    };

    while let Some(item) = items.next().await {
        println!("{}", serde_json::to_string(&render_batch_item(item))?);
    }

    Ok(())
}

/// CLI argument parsing tests.
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parse_call() {
        let args: Cli = Cli::from_args(&["relayrpc"], &["call", "-n", "http://127.0.0.1:8090", "get_config"]).unwrap();
        match args.command {
            Commands::Call(CallArgs { nodes, method, args, api, raise, strict, with_args, timeout }) => {
                assert_eq!(nodes, vec!["http://127.0.0.1:8090".to_string()]);
                assert_eq!(method, "get_config");
                assert_eq!(args, "[]"); // default
                assert!(api.is_none());
                assert!(!raise);
                assert!(!strict);
                assert!(!with_args);
                assert!(timeout.is_none());
            }
            _ => panic!("Expected Call command"),
        }
    }

    #[test]
    fn test_cli_parse_call_with_options() {
        let args: Cli = Cli::from_args(&["relayrpc"], &[
            "call",
            "--node", "http://node1",
            "--node", "http://node2",
            "--api", "follow_api",
            "-a", "[\"alice\", 10]",
            "--raise",
            "--with-args",
            "--timeout", "5",
            "get_followers",
        ]).unwrap();
        match args.command {
            Commands::Call(CallArgs { nodes, method, args, api, raise, with_args, timeout, .. }) => {
                assert_eq!(nodes.len(), 2);
                assert_eq!(method, "get_followers");
                assert_eq!(args, "[\"alice\", 10]");
                assert_eq!(api, Some("follow_api".to_string()));
                assert!(raise);
                assert!(with_args);
                assert_eq!(timeout, Some(5));
            }
            _ => panic!("Expected Call command"),
        }
    }

    #[test]
    fn test_cli_parse_call_without_nodes() {
        let args: Cli = Cli::from_args(&["relayrpc"], &["call", "get_config"]).unwrap();
        match args.command {
            Commands::Call(CallArgs { nodes, .. }) => assert!(nodes.is_empty()),
            _ => panic!("Expected Call command"),
        }
    }

    #[test]
    fn test_cli_parse_call_requires_method() {
        assert!(Cli::from_args(&["relayrpc"], &["call", "-n", "http://node1"]).is_err());
    }

    #[test]
    fn test_cli_parse_multi() {
        let args: Cli = Cli::from_args(&["relayrpc"], &[
            "multi",
            "-n", "http://node1",
            "-p", "[1]",
            "-p", "[2]",
            "--concurrent",
            "--workers", "4",
            "get_block",
        ]).unwrap();
        match args.command {
            Commands::Multi(MultiArgs { nodes, method, params, concurrent, workers, timeout }) => {
                assert_eq!(nodes, vec!["http://node1".to_string()]);
                assert_eq!(method, "get_block");
                assert_eq!(params, vec!["[1]".to_string(), "[2]".to_string()]);
                assert!(concurrent);
                assert_eq!(workers, Some(4));
                assert!(timeout.is_none());
            }
            _ => panic!("Expected Multi command"),
        }
    }

    #[test]
    fn test_cli_parse_multi_sequential_by_default() {
        let args: Cli = Cli::from_args(&["relayrpc"], &["multi", "get_block", "-p", "[1]"]).unwrap();
        match args.command {
            Commands::Multi(MultiArgs { concurrent, workers, .. }) => {
                assert!(!concurrent);
                assert!(workers.is_none());
            }
            _ => panic!("Expected Multi command"),
        }
    }

    #[test]
    fn test_build_config_timeout() {
        let config = build_config(vec!["http://node1".to_string()], Some(7)).unwrap();
        assert_eq!(config.transport.timeout, Duration::from_secs(7));
        assert_eq!(config.endpoints, vec!["http://node1".to_string()]);
    }
}
