//! HTTP transport seam used by [`RpcClient`](crate::rpc::RpcClient).
//!
//! The client only needs two primitives from the HTTP layer: a one-shot POST
//! that dials a fresh connection and attaches credentials to that single
//! request, and a [`Session`] that keeps one connection alive across calls
//! with credentials attached once. [`ReqwestTransport`] is the production
//! implementation; tests substitute their own.

mod http;

pub use http::ReqwestTransport;

use async_trait::async_trait;

use crate::config::Credentials;
use crate::error::RpcError;

/// Raw HTTP response: status code and body text, not yet interpreted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpReply {
    pub status: u16,
    pub body: String,
}

impl HttpReply {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// True for 4xx and 5xx statuses.
    pub fn is_error(&self) -> bool {
        (400..600).contains(&self.status)
    }
}

#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// POST `body` as JSON on a new connection, authenticating this request only.
    async fn post(
        &self,
        url: &str,
        credentials: &Credentials,
        body: String,
    ) -> Result<HttpReply, RpcError>;

    /// Open a persistent handle that remembers `credentials` and reuses its
    /// connection for every [`Session::post`].
    fn open_session(&self, credentials: &Credentials) -> Result<Box<dyn Session>, RpcError>;
}

/// A persistent connection handle. Callers must not overlap requests on one
/// session, hence `&mut self`.
#[async_trait]
pub trait Session: Send {
    async fn post(&mut self, url: &str, body: String) -> Result<HttpReply, RpcError>;
}
