mod cli;

use std::time::Duration;

use clap::Parser;
use eyre::{eyre, WrapErr};
use serde_json::Value;

use nodecall_core::config::{default_rpc_port, resolve_credentials};
use nodecall_core::{ClientConfig, RpcClient, RpcError};

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

#[tokio::main]
async fn main() -> eyre::Result<()> {
    let args = cli::Cli::parse();

    // Stdout carries the result; logs go to stderr.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .with_file(true)
        .with_line_number(true)
        .with_level(true)
        .init();

    let credentials = resolve_credentials(
        args.rpc_user.as_deref(),
        args.rpc_pass.as_deref(),
        args.rpc_cookie_file.as_deref(),
    )
    .context("resolve RPC credentials")?;

    let config = ClientConfig::with_credentials(credentials)
        .with_host(&args.rpc_host)
        .with_port(args.rpc_port.unwrap_or_else(|| default_rpc_port(args.chain)))
        .with_keepalive(args.keepalive)
        .with_timeouts(CONNECT_TIMEOUT, Duration::from_secs(args.timeout_secs));
    let rpc = RpcClient::new(config).context("build RPC client")?;

    tracing::info!(
        url = rpc.url(),
        chain = %args.chain,
        keepalive = rpc.is_keepalive(),
        "calling {}",
        args.method
    );

    let params: Vec<Value> = args.params.iter().map(|raw| parse_param(raw)).collect();
    for round in 0..args.repeat {
        let result = rpc
            .call(&args.method, params.clone())
            .await
            .map_err(|err| describe_failure(rpc.url(), err))?;
        tracing::debug!(round, "call finished");
        println!("{}", render_result(&result));
    }

    rpc.close();
    Ok(())
}

/// Parse a command-line parameter the way `bitcoin-cli` does: JSON when it
/// parses, a plain string otherwise.
fn parse_param(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_owned()))
}

fn render_result(result: &Value) -> String {
    match result {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => serde_json::to_string_pretty(other).unwrap_or_else(|_| other.to_string()),
    }
}

fn describe_failure(url: &str, err: RpcError) -> eyre::Report {
    match err {
        RpcError::Server(server) => {
            let code = server
                .code()
                .map(|c| c.to_string())
                .unwrap_or_else(|| "unknown".to_owned());
            let message = server
                .message()
                .map(str::to_owned)
                .unwrap_or_else(|| server.payload().to_string());
            eyre!("error code: {code}\nerror message:\n{message}")
        }
        other => eyre!(format_rpc_connect_error(url, &error_chain(&other)))
            .wrap_err("while calling the node RPC endpoint"),
    }
}

/// Render an error with its sources, skipping causes already in the text.
fn error_chain(err: &dyn std::error::Error) -> String {
    let mut text = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        let cause_text = cause.to_string();
        if !text.contains(&cause_text) {
            text.push_str(": ");
            text.push_str(&cause_text);
        }
        source = cause.source();
    }
    text
}

fn format_rpc_connect_error(rpc_url: &str, source_error: &str) -> String {
    let mut lines = vec![
        format!("could not complete call to RPC endpoint `{rpc_url}`"),
        format!("cause: {source_error}"),
    ];

    if source_error.contains("dns error") || source_error.contains("failed to lookup address") {
        lines.push(
            "hint: hostname resolution failed; verify --rpc-host and your DNS/network".into(),
        );
    } else if source_error.contains("HTTP status 401") || source_error.contains("HTTP status 403")
    {
        lines.push(
            "hint: authentication failed; verify --rpc-user/--rpc-pass or --rpc-cookie-file"
                .into(),
        );
    } else if source_error.to_ascii_lowercase().contains("connection refused") {
        lines.push(
            "hint: nothing is listening; verify the node runs with -server and the port matches --chain"
                .into(),
        );
    } else if source_error.contains("HTTP status 404") {
        lines.push("hint: the endpoint path is invalid; the node serves RPC at `/`".into());
    }

    lines.join("\n")
}
