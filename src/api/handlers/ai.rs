use crate::{
    types::{QueryRequest, QueryResponse, Result},
    AppState,
};
use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};

/// Ask the model directly, without document retrieval.
#[utoipa::path(
    post,
    path = "/ai",
    request_body = QueryRequest,
    responses(
        (status = 200, description = "Model answer", body = QueryResponse),
        (status = 400, description = "Empty or malformed query"),
        (status = 502, description = "Language model unavailable")
    ),
    tag = "ai"
)]
pub async fn query(
    State(state): State<AppState>,
    payload: std::result::Result<Json<QueryRequest>, JsonRejection>,
) -> Result<Json<QueryResponse>> {
    let Json(payload) = payload?;
    tracing::debug!(query = %payload.query, "Direct query");

    let answer = state.rag.query(&payload.query).await?;

    Ok(Json(QueryResponse { answer }))
}
