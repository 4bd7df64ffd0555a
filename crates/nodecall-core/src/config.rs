//! Connection parameters for [`RpcClient`](crate::rpc::RpcClient).
//!
//! Holds credentials, endpoint, keep-alive selection and transport timeouts.
//! Nothing here is validated against the network: a bad host or port only
//! shows up as a transport failure on the first call.

use std::fmt;
use std::path::Path;
use std::time::Duration;

use bitcoin::Network;

use crate::error::RpcError;

pub const DEFAULT_HOST: &str = "127.0.0.1";

/// Bitcoin Core's mainnet RPC port.
pub const DEFAULT_PORT: u16 = 8332;

const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

// ==============================================================================
// Credentials
// ==============================================================================

/// HTTP basic-auth credentials for the node's RPC interface.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    user: String,
    password: String,
}

impl Credentials {
    pub fn new(user: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            user: user.into(),
            password: password.into(),
        }
    }

    pub fn user(&self) -> &str {
        &self.user
    }

    pub fn password(&self) -> &str {
        &self.password
    }

    /// Read a `username:password` pair from the first line of a cookie file,
    /// such as the `.cookie` Bitcoin Core writes into its data directory.
    pub fn from_cookie_file(path: &Path) -> Result<Self, RpcError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            RpcError::Config(format!(
                "failed to read rpc cookie file {}: {e}",
                path.display()
            ))
        })?;
        let line = content
            .lines()
            .next()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .ok_or_else(|| {
                RpcError::Config(format!("rpc cookie file {} is empty", path.display()))
            })?;

        let (user, password) = line.split_once(':').ok_or_else(|| {
            RpcError::Config(format!(
                "rpc cookie file {} must contain `username:password`",
                path.display()
            ))
        })?;
        if user.is_empty() || password.is_empty() {
            return Err(RpcError::Config(format!(
                "rpc cookie file {} must contain non-empty `username:password`",
                path.display()
            )));
        }

        Ok(Self::new(user, password))
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Pick credentials from explicit flags or a cookie file.
///
/// Precedence:
/// 1. explicit `user` + `pass`
/// 2. cookie file (`username:password`)
///
/// Supplying only one of `user`/`pass`, or nothing at all, is an error.
pub fn resolve_credentials(
    user: Option<&str>,
    pass: Option<&str>,
    cookie_file: Option<&Path>,
) -> Result<Credentials, RpcError> {
    match (user, pass) {
        (Some(u), Some(p)) => return Ok(Credentials::new(u, p)),
        (Some(_), None) | (None, Some(_)) => {
            return Err(RpcError::Config(
                "both rpc user and rpc pass must be set together".to_owned(),
            ));
        }
        (None, None) => {}
    }

    match cookie_file {
        Some(path) => Credentials::from_cookie_file(path),
        None => Err(RpcError::Config(
            "no rpc credentials: set rpc user and pass, or a cookie file".to_owned(),
        )),
    }
}

// ==============================================================================
// Chain Defaults
// ==============================================================================

/// Default RPC port Bitcoin Core listens on for `network`.
pub fn default_rpc_port(network: Network) -> u16 {
    match network.to_core_arg() {
        "test" => 18332,
        "testnet4" => 48332,
        "signet" => 38332,
        "regtest" => 18443,
        _ => DEFAULT_PORT,
    }
}

// ==============================================================================
// Client Config
// ==============================================================================

#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub credentials: Credentials,
    pub host: String,
    pub port: u16,
    /// Reuse one persistent connection for every call instead of dialing anew.
    pub keepalive: bool,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
}

impl ClientConfig {
    /// Config for a local mainnet node without keep-alive.
    pub fn new(user: impl Into<String>, password: impl Into<String>) -> Self {
        Self::with_credentials(Credentials::new(user, password))
    }

    pub fn with_credentials(credentials: Credentials) -> Self {
        Self {
            credentials,
            host: DEFAULT_HOST.to_owned(),
            port: DEFAULT_PORT,
            keepalive: false,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }

    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Use the default RPC port of `network`.
    pub fn with_network(self, network: Network) -> Self {
        self.with_port(default_rpc_port(network))
    }

    pub fn with_keepalive(mut self, keepalive: bool) -> Self {
        self.keepalive = keepalive;
        self
    }

    pub fn with_timeouts(mut self, connect: Duration, request: Duration) -> Self {
        self.connect_timeout = connect;
        self.request_timeout = request;
        self
    }

    /// Endpoint URL, always plain HTTP at the root path.
    pub fn url(&self) -> String {
        // Bare IPv6 literals need brackets inside a URL authority.
        if self.host.contains(':') && !self.host.starts_with('[') {
            format!("http://[{}]:{}/", self.host, self.port)
        } else {
            format!("http://{}:{}/", self.host, self.port)
        }
    }
}
