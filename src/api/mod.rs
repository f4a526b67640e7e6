use std::sync::Arc;

use anyhow::Context;
use axum::{
    extract::Extension,
    http::{header, HeaderValue, Method, StatusCode},
    Json, Router,
};
use tower_http::{
    cors::{AllowHeaders, AllowMethods, AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};

use self::rest::router as rest_router;

pub mod graphql;
pub mod rest;

use crate::infrastructure::{config::CorsConfig, state::AppState};

pub fn build_router(state: Arc<AppState>) -> anyhow::Result<Router> {
    state.config.validate()?;
    let cors = cors_layer(&state.config.app.cors)?;

    Ok(Router::new()
        .nest("/api", rest_router())
        .merge(graphql::router(Arc::clone(&state)))
        .fallback(not_found)
        .layer(Extension(state))
        .layer(TraceLayer::new_for_http())
        .layer(cors))
}

pub async fn not_found() -> (StatusCode, Json<serde_json::Value>) {
    (
        StatusCode::NOT_FOUND,
        Json(serde_json::json!({"error": "not_found"})),
    )
}

pub fn cors_layer(config: &CorsConfig) -> anyhow::Result<CorsLayer> {
    if config.permissive {
        // `*` cannot be combined with credentials, so mirror the request instead.
        if config.allow_credentials {
            return Ok(CorsLayer::new()
                .allow_origin(AllowOrigin::mirror_request())
                .allow_methods(AllowMethods::mirror_request())
                .allow_headers(AllowHeaders::mirror_request())
                .allow_credentials(true));
        }
        return Ok(CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any));
    }

    let origins = config
        .origins
        .iter()
        .map(|origin| {
            HeaderValue::from_str(origin)
                .with_context(|| format!("invalid CORS origin: {origin}"))
        })
        .collect::<anyhow::Result<Vec<_>>>()?;

    Ok(CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
        .allow_credentials(config.allow_credentials))
}
