use axum::{
    body::Bytes,
    extract::State,
    http::{header::CONTENT_TYPE, StatusCode},
    response::{IntoResponse, Response},
};

use crate::api::routes::AppState;
use crate::error::Fault;
use crate::mcp::codec;

/// `POST /mcp`. Soft errors come back as 200 with the message in `result`;
/// hard faults become a JSON-RPC error object with a non-2xx status.
pub async fn rpc_handler(State(server): State<AppState>, body: Bytes) -> Response {
    let request = match codec::decode(&body) {
        Ok(request) => request,
        Err(error) => return Fault::new(codec::peek_id(&body), error).into_response(),
    };

    let outcome = match server.handle(&request).await {
        Ok(outcome) => outcome,
        Err(error) => return Fault::new(Some(request.id), error).into_response(),
    };

    match codec::encode(request.id, outcome.into_result()) {
        Ok(bytes) => (StatusCode::OK, [(CONTENT_TYPE, "application/json")], bytes).into_response(),
        Err(error) => Fault::new(Some(request.id), error).into_response(),
    }
}

pub async fn rpc_get() -> StatusCode {
    StatusCode::METHOD_NOT_ALLOWED
}
