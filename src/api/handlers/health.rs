use crate::{
    types::{HealthResponse, Result},
    AppState,
};
use axum::{extract::State, Json};

/// Liveness plus a summary of what the server is wired to.
#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Server is up", body = HealthResponse)
    ),
    tag = "health"
)]
pub async fn health(State(state): State<AppState>) -> Result<Json<HealthResponse>> {
    let config = state.config_manager.config();

    Ok(Json(HealthResponse {
        status: "ok".to_string(),
        stage: config.server.stage.as_str().to_string(),
        model: state.rag.llm().model_name().to_string(),
        vector_store: state.rag.store().provider_name().to_string(),
        documents: state.rag.document_count().await?,
    }))
}
