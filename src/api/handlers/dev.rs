//! Development-only probes.

use crate::types::{AppError, EchoRequest, EchoResponse};
use axum::{extract::rejection::JsonRejection, Json};

/// Prefix of the echo reply when the payload carried a `test` value.
pub const ECHO_FOUND: &str = "Se ha podido recuperar la data correctamente";
/// Echo reply when `test` is missing or null.
pub const ECHO_MISSING: &str = "No se ha podido recuperar la data";

/// Echo the `test` field back to the caller.
#[utoipa::path(
    post,
    path = "/test",
    request_body = EchoRequest,
    responses(
        (status = 200, description = "Echoed payload", body = EchoResponse),
        (status = 400, description = "Malformed JSON")
    ),
    tag = "dev"
)]
pub async fn echo(
    payload: Result<Json<EchoRequest>, JsonRejection>,
) -> Result<Json<EchoResponse>, AppError> {
    let Json(payload) = payload?;

    let response = match payload.test {
        Some(text) => format!("{}: {}", ECHO_FOUND, text),
        None => ECHO_MISSING.to_string(),
    };

    Ok(Json(EchoResponse { response }))
}
