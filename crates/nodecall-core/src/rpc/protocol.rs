use serde_json::Value;

use crate::error::{RpcError, ServerError};
use crate::transport::HttpReply;

#[derive(serde::Serialize)]
pub(super) struct JsonRpcRequest<'a> {
    pub(super) jsonrpc: &'static str,
    pub(super) id: u64,
    pub(super) method: &'a str,
    pub(super) params: &'a [Value],
}

#[derive(serde::Deserialize)]
pub(super) struct JsonRpcResponse {
    #[serde(default)]
    pub(super) id: Option<Value>,
    #[serde(default)]
    pub(super) result: Option<Value>,
    #[serde(default)]
    pub(super) error: Option<Value>,
}

pub(super) fn encode_request(id: u64, method: &str, params: &[Value]) -> Result<String, RpcError> {
    let req = JsonRpcRequest {
        jsonrpc: "2.0",
        id,
        method,
        params,
    };
    serde_json::to_string(&req).map_err(RpcError::Encode)
}

/// Turn a raw HTTP reply into the call's result.
///
/// Order matters: the status is checked before the body is looked at, then
/// the id, then the `error` member. A null `error` counts as absent and a
/// missing `result` is returned as `null`.
pub(super) fn decode_reply(id: u64, reply: HttpReply) -> Result<Value, RpcError> {
    if reply.is_error() {
        return Err(RpcError::HttpStatus {
            status: reply.status,
            body: reply.body,
        });
    }

    let raw: Value = serde_json::from_str(&reply.body).map_err(|e| {
        RpcError::InvalidResponse(format!(
            "decode JSON-RPC response: {e}; body={}",
            reply.body
        ))
    })?;
    // Checked up front: serde would happily fill the struct from an array.
    if !raw.is_object() {
        return Err(RpcError::InvalidResponse(format!(
            "expected a JSON object; body={}",
            reply.body
        )));
    }
    let decoded: JsonRpcResponse = serde_json::from_value(raw)
        .map_err(|e| RpcError::InvalidResponse(format!("decode JSON-RPC response: {e}")))?;

    if let Some(actual) = decoded.id {
        if parse_response_id(&actual) != Some(id) {
            return Err(RpcError::IdMismatch {
                expected: id,
                actual,
            });
        }
    }

    if let Some(err) = decoded.error {
        return Err(RpcError::Server(ServerError::new(err)));
    }

    Ok(decoded.result.unwrap_or(Value::Null))
}

/// Largest integer a double represents exactly (2^53).
pub(super) const MAX_EXACT_DOUBLE_ID: u64 = 1 << 53;

/// Response ids come back as numbers, but some peers echo them as doubles
/// and some proxies stringify them.
fn parse_response_id(id: &Value) -> Option<u64> {
    if let Some(n) = id.as_u64() {
        return Some(n);
    }
    if let Some(f) = id.as_f64() {
        let in_range = (0.0..=MAX_EXACT_DOUBLE_ID as f64).contains(&f);
        return (in_range && f.fract() == 0.0).then_some(f as u64);
    }
    id.as_str().and_then(|s| s.parse::<u64>().ok())
}
