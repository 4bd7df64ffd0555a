use std::time::Duration;

use async_trait::async_trait;
use reqwest::header;
use tracing::debug;

use crate::config::Credentials;
use crate::error::RpcError;

use super::{HttpReply, HttpTransport, Session};

/// `reqwest`-backed transport.
///
/// One-shot posts go through a client with connection pooling disabled, so
/// every call dials a new connection. Each [`Session`] owns its own pooled
/// client holding at most one idle connection, which is what gives keep-alive
/// reuse across calls.
pub struct ReqwestTransport {
    one_shot: reqwest::Client,
    connect_timeout: Duration,
    request_timeout: Duration,
}

impl ReqwestTransport {
    pub fn new(connect_timeout: Duration, request_timeout: Duration) -> Result<Self, RpcError> {
        let one_shot = base_builder(connect_timeout, request_timeout)
            .pool_max_idle_per_host(0)
            .build()
            .map_err(|e| RpcError::Config(format!("build HTTP client: {e}")))?;

        Ok(Self {
            one_shot,
            connect_timeout,
            request_timeout,
        })
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn post(
        &self,
        url: &str,
        credentials: &Credentials,
        body: String,
    ) -> Result<HttpReply, RpcError> {
        let builder = self
            .one_shot
            .post(url)
            .header(header::CONTENT_TYPE, "application/json")
            .basic_auth(credentials.user(), Some(credentials.password()))
            .body(body);
        send(builder).await
    }

    fn open_session(&self, credentials: &Credentials) -> Result<Box<dyn Session>, RpcError> {
        let client = base_builder(self.connect_timeout, self.request_timeout)
            .pool_max_idle_per_host(1)
            .build()
            .map_err(|e| RpcError::Config(format!("build HTTP session client: {e}")))?;
        debug!(user = credentials.user(), "opened keep-alive session");

        Ok(Box::new(ReqwestSession {
            client,
            credentials: credentials.clone(),
        }))
    }
}

struct ReqwestSession {
    client: reqwest::Client,
    credentials: Credentials,
}

#[async_trait]
impl Session for ReqwestSession {
    async fn post(&mut self, url: &str, body: String) -> Result<HttpReply, RpcError> {
        let builder = self
            .client
            .post(url)
            .header(header::CONTENT_TYPE, "application/json")
            .basic_auth(self.credentials.user(), Some(self.credentials.password()))
            .body(body);
        send(builder).await
    }
}

fn base_builder(connect_timeout: Duration, request_timeout: Duration) -> reqwest::ClientBuilder {
    reqwest::Client::builder()
        .connect_timeout(connect_timeout)
        .timeout(request_timeout)
        .tcp_nodelay(true)
}

async fn send(builder: reqwest::RequestBuilder) -> Result<HttpReply, RpcError> {
    let response = builder.send().await.map_err(RpcError::transport)?;
    let status = response.status().as_u16();
    let body = match response.text().await {
        Ok(body) => body,
        // An error status is reported on its own; the body is only diagnostic.
        Err(_) if status >= 400 => String::new(),
        Err(e) => return Err(RpcError::transport(e)),
    };
    Ok(HttpReply { status, body })
}
