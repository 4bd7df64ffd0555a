use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::Value;

use crate::config::Credentials;
use crate::error::RpcError;
use crate::transport::{HttpReply, HttpTransport, Session};

/// A scripted reply: either an HTTP response or a transport failure.
enum Scripted {
    Reply(HttpReply),
    Refused,
}

#[derive(Default)]
struct State {
    replies: VecDeque<Scripted>,
    one_shot_connections: usize,
    sessions_opened: usize,
    requests: Vec<Value>,
    auth_seen: Vec<Credentials>,
}

/// In-memory transport for client tests. Replies are served in FIFO order;
/// a reply whose body contains `"id": "$ID"` gets the request id spliced in
/// so scripted responses pass id verification.
#[derive(Clone, Default)]
pub struct FakeTransport {
    state: Arc<Mutex<State>>,
}

impl FakeTransport {
    pub fn builder() -> FakeTransportBuilder {
        FakeTransportBuilder {
            replies: VecDeque::new(),
        }
    }

    pub fn one_shot_connections(&self) -> usize {
        self.state.lock().unwrap().one_shot_connections
    }

    pub fn sessions_opened(&self) -> usize {
        self.state.lock().unwrap().sessions_opened
    }

    /// Every request body received so far, parsed as JSON.
    pub fn requests(&self) -> Vec<Value> {
        self.state.lock().unwrap().requests.clone()
    }

    /// Credentials attached to each one-shot post or session opening.
    pub fn auth_seen(&self) -> Vec<Credentials> {
        self.state.lock().unwrap().auth_seen.clone()
    }

    fn serve(&self, body: String) -> Result<HttpReply, RpcError> {
        let request: Value = serde_json::from_str(&body).expect("client must send JSON");
        let id = request["id"].clone();

        let mut state = self.state.lock().unwrap();
        state.requests.push(request);
        match state.replies.pop_front() {
            Some(Scripted::Reply(reply)) => Ok(HttpReply {
                status: reply.status,
                body: reply.body.replace("\"$ID\"", &id.to_string()),
            }),
            Some(Scripted::Refused) => Err(RpcError::transport(std::io::Error::new(
                std::io::ErrorKind::ConnectionRefused,
                "connection refused",
            ))),
            None => panic!("fake transport ran out of scripted replies"),
        }
    }
}

pub struct FakeTransportBuilder {
    replies: VecDeque<Scripted>,
}

impl FakeTransportBuilder {
    pub fn with_reply(mut self, status: u16, body: impl Into<String>) -> Self {
        self.replies
            .push_back(Scripted::Reply(HttpReply::new(status, body)));
        self
    }

    /// A `200` reply carrying `result` with the request's id echoed back.
    pub fn with_result(self, result: Value) -> Self {
        let body = format!(r#"{{"result": {result}, "error": null, "id": "$ID"}}"#);
        self.with_reply(200, body)
    }

    pub fn with_refused(mut self) -> Self {
        self.replies.push_back(Scripted::Refused);
        self
    }

    pub fn build(self) -> FakeTransport {
        FakeTransport {
            state: Arc::new(Mutex::new(State {
                replies: self.replies,
                ..State::default()
            })),
        }
    }
}

#[async_trait]
impl HttpTransport for FakeTransport {
    async fn post(
        &self,
        _url: &str,
        credentials: &Credentials,
        body: String,
    ) -> Result<HttpReply, RpcError> {
        {
            let mut state = self.state.lock().unwrap();
            state.one_shot_connections += 1;
            state.auth_seen.push(credentials.clone());
        }
        self.serve(body)
    }

    fn open_session(&self, credentials: &Credentials) -> Result<Box<dyn Session>, RpcError> {
        let mut state = self.state.lock().unwrap();
        state.sessions_opened += 1;
        state.auth_seen.push(credentials.clone());
        Ok(Box::new(FakeSession {
            transport: self.clone(),
        }))
    }
}

struct FakeSession {
    transport: FakeTransport,
}

#[async_trait]
impl Session for FakeSession {
    async fn post(&mut self, _url: &str, body: String) -> Result<HttpReply, RpcError> {
        self.transport.serve(body)
    }
}
