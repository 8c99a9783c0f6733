use serde_json::Value;

use crate::error::{AppError, Result};
use crate::mcp::types::{RequestEnvelope, ResponseEnvelope};

/// Parse a raw request body.
///
/// `method` is mandatory. `params` passes through untouched. A missing or
/// non-integer `id` becomes `0`.
pub fn decode(body: &[u8]) -> Result<RequestEnvelope> {
    let payload: Value = serde_json::from_slice(body).map_err(AppError::Parse)?;
    let Value::Object(mut fields) = payload else {
        return Err(AppError::InvalidEnvelope(
            "request body must be a JSON object".to_string(),
        ));
    };

    let method = match fields.remove("method") {
        Some(Value::String(method)) => method,
        _ => return Err(AppError::MissingMethod),
    };

    let id = fields.get("id").and_then(Value::as_i64).unwrap_or(0);

    Ok(RequestEnvelope {
        method,
        params: fields.remove("params"),
        id,
    })
}

/// Read just the id from a body that may not decode fully, so faults can
/// still be correlated.
pub fn peek_id(body: &[u8]) -> Option<i64> {
    serde_json::from_slice::<Value>(body)
        .ok()?
        .get("id")
        .and_then(Value::as_i64)
}

pub fn encode(id: i64, result: Value) -> Result<Vec<u8>> {
    Ok(serde_json::to_vec(&ResponseEnvelope::new(id, result))?)
}

pub fn decode_response(body: &[u8]) -> Result<ResponseEnvelope> {
    serde_json::from_slice(body).map_err(AppError::Parse)
}
