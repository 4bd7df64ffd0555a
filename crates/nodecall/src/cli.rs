use std::path::PathBuf;

use bitcoin::Network;
use clap::Parser;

/// Invoke a JSON-RPC method on a Bitcoin Core compatible node.
#[derive(Parser)]
#[command(version, about)]
pub struct Cli {
    /// Node RPC host.
    #[arg(long, default_value = "127.0.0.1", env = "NODECALL_RPC_HOST")]
    pub rpc_host: String,

    /// Node RPC port (defaults to the port of `--chain`).
    #[arg(long, env = "NODECALL_RPC_PORT")]
    pub rpc_port: Option<u16>,

    /// Chain the node runs: main, test, testnet4, signet or regtest.
    #[arg(long, default_value = "main", value_parser = parse_chain, env = "NODECALL_CHAIN")]
    pub chain: Network,

    /// RPC username.
    #[arg(long, env = "NODECALL_RPC_USER")]
    pub rpc_user: Option<String>,

    /// RPC password.
    #[arg(long, env = "NODECALL_RPC_PASS", hide_env_values = true)]
    pub rpc_pass: Option<String>,

    /// Cookie file with `username:password`, used when user/pass are not given.
    #[arg(long, env = "NODECALL_RPC_COOKIE_FILE")]
    pub rpc_cookie_file: Option<PathBuf>,

    /// Keep one connection open and reuse it for every call.
    #[arg(long)]
    pub keepalive: bool,

    /// Invoke the same call this many times over one client.
    #[arg(long, default_value = "1", value_parser = clap::value_parser!(u32).range(1..))]
    pub repeat: u32,

    /// Per-request timeout in seconds.
    #[arg(long, default_value = "30")]
    pub timeout_secs: u64,

    /// RPC method name.
    pub method: String,

    /// Positional parameters; each is parsed as JSON, falling back to a string.
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    pub params: Vec<String>,
}

fn parse_chain(value: &str) -> Result<Network, String> {
    Network::from_core_arg(value).map_err(|e| e.to_string())
}
