use std::sync::Arc;

use anyhow::{anyhow, Result};
use axum::{routing::get, Router};
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use super::handlers::{graphql, health};
use crate::app_context::AppContext;
use crate::graphql::{build_schema, GraphQLSchema};

#[derive(Clone)]
pub struct AppState {
    pub app: Arc<AppContext>,
    pub graphql_schema: GraphQLSchema,
}

pub fn create_app(app: Arc<AppContext>, cors_origin: Option<&str>) -> Result<Router> {
    let state = AppState {
        graphql_schema: build_schema(Arc::clone(&app)),
        app,
    };

    let cors = match cors_origin {
        Some(origin) => CorsLayer::new().allow_origin(
            origin
                .parse::<axum::http::HeaderValue>()
                .map_err(|e| anyhow!("Invalid CORS origin: {}", e))?,
        ),
        None => CorsLayer::new().allow_origin(Any),
    }
    .allow_methods([
        axum::http::Method::GET,
        axum::http::Method::POST,
        axum::http::Method::OPTIONS,
    ])
    .allow_headers(Any)
    .allow_credentials(false);

    let app = Router::new()
        .route("/health", get(health::health_check))
        .route(
            "/graphql",
            get(graphql::graphql_playground)
                .post(graphql::graphql_handler)
                .options(|| async { axum::http::StatusCode::OK }),
        )
        .route("/graphql/ws", get(graphql::graphql_ws_handler))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .with_state(state);

    Ok(app)
}
