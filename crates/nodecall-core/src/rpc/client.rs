use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio::sync::Mutex;
use tracing::{debug, trace};

use crate::config::{ClientConfig, Credentials};
use crate::error::RpcError;
use crate::transport::{HttpTransport, ReqwestTransport, Session};

use super::protocol::{decode_reply, encode_request};

/// JSON-RPC 2.0 client for a single Bitcoin Core compatible node.
///
/// Without keep-alive every [`call`](Self::call) dials a fresh connection and
/// authenticates that request alone. With keep-alive one [`Session`] is opened
/// at construction and reused by every call; it sits behind a mutex, so calls
/// sharing a client queue up rather than overlap on the connection. The
/// session is released when the client is closed or dropped.
pub struct RpcClient {
    url: String,
    credentials: Credentials,
    transport: Arc<dyn HttpTransport>,
    session: Option<Mutex<Box<dyn Session>>>,
    next_id: AtomicU64,
}

impl RpcClient {
    /// Build a client over the default `reqwest` transport.
    pub fn new(config: ClientConfig) -> Result<Self, RpcError> {
        let transport = ReqwestTransport::new(config.connect_timeout, config.request_timeout)?;
        Self::with_transport(config, Arc::new(transport))
    }

    pub fn with_transport(
        config: ClientConfig,
        transport: Arc<dyn HttpTransport>,
    ) -> Result<Self, RpcError> {
        let url = config.url();
        let session = if config.keepalive {
            Some(Mutex::new(transport.open_session(&config.credentials)?))
        } else {
            None
        };
        debug!(url = %url, keepalive = config.keepalive, "rpc client ready");

        Ok(Self {
            url,
            credentials: config.credentials,
            transport,
            session,
            next_id: AtomicU64::new(initial_request_id()),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn is_keepalive(&self) -> bool {
        self.session.is_some()
    }

    /// Invoke `method` with positional `params` and return its `result`.
    ///
    /// Fails with [`RpcError::HttpStatus`] on a 4xx/5xx reply,
    /// [`RpcError::Server`] when the node reports an error, and
    /// [`RpcError::Transport`] when no reply arrives at all.
    pub async fn call(&self, method: &str, params: Vec<Value>) -> Result<Value, RpcError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        debug!(
            rpc.id = id,
            rpc.method = method,
            rpc.params = params.len(),
            "rpc call"
        );
        let body = encode_request(id, method, &params)?;

        let reply = match &self.session {
            Some(session) => session.lock().await.post(&self.url, body).await?,
            None => {
                self.transport
                    .post(&self.url, &self.credentials, body)
                    .await?
            }
        };
        debug!(
            rpc.id = id,
            rpc.method = method,
            status = reply.status,
            body_len = reply.body.len(),
            "rpc response"
        );
        trace!(rpc.id = id, rpc.method = method, body = %reply.body, "rpc response body");

        decode_reply(id, reply)
    }

    /// Like [`call`](Self::call), deserializing the result into `T`.
    pub async fn call_typed<T: DeserializeOwned>(
        &self,
        method: &str,
        params: Vec<Value>,
    ) -> Result<T, RpcError> {
        let raw = self.call(method, params).await?;
        serde_json::from_value(raw)
            .map_err(|e| RpcError::InvalidResponse(format!("unexpected `{method}` result: {e}")))
    }

    /// Release the client and its keep-alive session, if any.
    pub fn close(self) {
        if self.session.is_some() {
            debug!(url = %self.url, "closing keep-alive session");
        }
    }
}

impl fmt::Debug for RpcClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RpcClient")
            .field("url", &self.url)
            .field("credentials", &self.credentials)
            .field("keepalive", &self.session.is_some())
            .finish()
    }
}

// Seeding from the clock keeps ids from repeating across client instances
// talking to the same node. Milliseconds keep ids below 2^53, so peers that
// store JSON numbers as doubles echo them back unchanged.
fn initial_request_id() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(1)
}
