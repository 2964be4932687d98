use crate::api::endpoint::{log_endpoint, Endpoint};
use crate::api::handlers;
use crate::types::Result;
use crate::utils::toml_config::Stage;
use crate::AppState;
use axum::{
    extract::DefaultBodyLimit,
    handler::Handler,
    http::Method,
    middleware,
    routing::{get, on},
    Router,
};
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

/// Mount `handler` at the endpoint's route for the endpoint's methods.
fn mount<H, T>(router: Router<AppState>, endpoint: Endpoint, handler: H) -> Result<Router<AppState>>
where
    H: Handler<T, AppState>,
    T: 'static,
{
    let filter = endpoint.method_filter()?;
    let route = endpoint.route().to_string();
    let endpoint = Arc::new(endpoint);

    Ok(router.route(
        &route,
        on(filter, handler).layer(middleware::from_fn_with_state(endpoint, log_endpoint)),
    ))
}

/// Stage-relative API routes. `/test` only exists in the dev stage.
pub fn create_router(stage: Stage, max_upload_bytes: usize) -> Result<Router<AppState>> {
    let mut router = Router::new();

    if stage == Stage::Dev {
        router = mount(
            router,
            Endpoint::new("/test", vec![Method::POST]),
            handlers::dev::echo,
        )?;
    }

    router = mount(
        router,
        Endpoint::new("/ai", vec![Method::POST]),
        handlers::ai::query,
    )?;
    router = mount(
        router,
        Endpoint::new("/pdf", vec![Method::POST]),
        handlers::pdf::upload,
    )?;
    router = mount(
        router,
        Endpoint::new("/ask_pdf", vec![Method::POST]),
        handlers::pdf::ask,
    )?;

    Ok(router.layer(DefaultBodyLimit::max(max_upload_bytes)))
}

/// Full application: stage-prefixed API, health, OpenAPI document and tracing.
pub fn create_app(state: AppState) -> Result<Router> {
    let config = state.config_manager.config();
    let stage = config.server.stage;

    let api = create_router(stage, config.server.max_upload_bytes())?;
    let openapi = crate::api::openapi_for(stage);

    let router = Router::new()
        .nest(stage.prefix(), api)
        .route("/health", get(handlers::health::health));

    #[cfg(feature = "swagger-ui")]
    let router = router.merge(
        utoipa_swagger_ui::SwaggerUi::new("/swagger-ui").url(crate::api::OPENAPI_PATH, openapi),
    );

    #[cfg(not(feature = "swagger-ui"))]
    let router = router.route(
        crate::api::OPENAPI_PATH,
        get(move || async move { axum::Json(openapi) }),
    );

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Ok(router
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state))
}
