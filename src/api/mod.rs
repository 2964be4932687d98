//! HTTP API Handlers and Routes
//!
//! # Module Structure
//!
//! - [`api::endpoint`](crate::api::endpoint) - Route/method value object and per-route logging
//! - [`api::handlers`](crate::api::handlers) - Request handlers for each endpoint
//! - [`api::routes`](crate::api::routes) - Router configuration
//!
//! # API Endpoints
//!
//! Every API route is mounted under the stage prefix (`/dev` or `/prod`):
//!
//! - `POST {prefix}/test` - Echo probe (dev stage only)
//! - `POST {prefix}/ai` - Ask the model directly
//! - `POST {prefix}/pdf` - Upload a PDF (`multipart/form-data`, field `file`)
//! - `POST {prefix}/ask_pdf` - Ask a question over uploaded PDFs
//!
//! Unprefixed:
//!
//! - `GET /health` - Health check
//! - `GET /api-docs/openapi.json` - OpenAPI document
//!
//! # OpenAPI Documentation
//!
//! When the `swagger-ui` feature is enabled, interactive API documentation
//! is available at `/swagger-ui/`.

pub mod endpoint;
/// Request and response handlers for all API endpoints.
pub mod handlers;
/// Router configuration and route definitions.
pub mod routes;

use crate::types::{
    AskResponse, EchoRequest, EchoResponse, HealthResponse, QueryRequest, QueryResponse, Source,
    UploadResponse,
};
use crate::utils::toml_config::Stage;
use utoipa::OpenApi;

/// Where the OpenAPI document is served.
pub const OPENAPI_PATH: &str = "/api-docs/openapi.json";

#[derive(OpenApi)]
#[openapi(
    info(title = "PDF RAG Server", description = "Question answering over uploaded PDFs"),
    paths(
        handlers::dev::echo,
        handlers::ai::query,
        handlers::pdf::upload,
        handlers::pdf::ask,
        handlers::health::health,
    ),
    components(schemas(
        EchoRequest,
        EchoResponse,
        QueryRequest,
        QueryResponse,
        UploadResponse,
        AskResponse,
        Source,
        HealthResponse,
    )),
    tags(
        (name = "dev", description = "Development probes"),
        (name = "ai", description = "Direct model queries"),
        (name = "pdf", description = "Document upload and retrieval-augmented answers"),
        (name = "health", description = "Service health"),
    )
)]
pub struct ApiDoc;

/// OpenAPI document with API paths under the stage prefix.
pub fn openapi_for(stage: Stage) -> utoipa::openapi::OpenApi {
    let mut doc = ApiDoc::openapi();

    let paths = std::mem::take(&mut doc.paths.paths);
    doc.paths.paths = paths
        .into_iter()
        .filter(|(path, _)| stage == Stage::Dev || path != "/test")
        .map(|(path, item)| {
            if path == "/health" {
                (path, item)
            } else {
                (format!("{}{}", stage.prefix(), path), item)
            }
        })
        .collect();

    doc
}
