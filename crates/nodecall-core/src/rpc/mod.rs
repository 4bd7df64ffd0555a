//! JSON-RPC 2.0 client.
//!
//! [`RpcClient`] builds one request per call, posts it through an
//! [`HttpTransport`](crate::transport::HttpTransport) and turns the reply into
//! a result or an [`RpcError`](crate::error::RpcError). A scripted transport
//! for tests lives in `fake`.

mod client;
#[cfg(test)]
pub mod fake;
mod protocol;

pub use client::RpcClient;
