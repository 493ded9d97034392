use std::sync::Arc;

use async_graphql::http::{GraphQLPlaygroundConfig, ALL_WEBSOCKET_PROTOCOLS};
use async_graphql::{Data, Pos, Response};
use async_graphql_axum::{GraphQLProtocol, GraphQLRequest, GraphQLResponse, GraphQLWebSocket};
use axum::extract::{State, WebSocketUpgrade};
use axum::http::header::AUTHORIZATION;
use axum::http::HeaderMap;
use axum::response::{Html, IntoResponse};
use serde::Deserialize;
use tracing::{debug, warn};

use crate::app_context::AppContext;
use crate::graphql::errors::core_error_to_graphql_error;
use crate::graphql::RequestIdentity;
use crate::server::app::AppState;

pub const MUTATOR_ID_HEADER: &str = "x-mutator-id";

/// `connection_init` payload sent by websocket clients.
#[derive(Deserialize, Default, Debug)]
#[serde(rename_all = "camelCase")]
struct ConnectionParams {
    auth_token: Option<String>,
    mutator_id: Option<String>,
}

pub async fn graphql_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    request: GraphQLRequest,
) -> GraphQLResponse {
    let authorization = headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok());
    let actor = match state.app.authenticate(authorization) {
        Ok(actor) => actor,
        Err(e) => {
            warn!("Rejected request with bad token: {}", e.message());
            let error = core_error_to_graphql_error(e).into_server_error(Pos::default());
            return Response::from_errors(vec![error]).into();
        }
    };
    let mutator_id = headers
        .get(MUTATOR_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string);

    let context = Arc::new(state.app.request_context(actor, mutator_id));
    debug!("GraphQL request {}", context.operation_id());
    state
        .graphql_schema
        .execute(request.into_inner().data(context))
        .await
        .into()
}

pub async fn graphql_playground() -> impl IntoResponse {
    Html(async_graphql::http::playground_source(
        GraphQLPlaygroundConfig::new("/graphql").subscription_endpoint("/graphql/ws"),
    ))
}

pub async fn graphql_ws_handler(
    State(state): State<AppState>,
    protocol: GraphQLProtocol,
    ws: WebSocketUpgrade,
) -> impl IntoResponse {
    ws.protocols(ALL_WEBSOCKET_PROTOCOLS)
        .on_upgrade(move |socket| {
            let app = Arc::clone(&state.app);
            GraphQLWebSocket::new(socket, state.graphql_schema, protocol)
                .on_connection_init(move |params| on_connection_init(app, params))
                .serve()
        })
}

/// Identify the socket once; every subscription on it runs as this caller.
async fn on_connection_init(
    app: Arc<AppContext>,
    params: serde_json::Value,
) -> async_graphql::Result<Data> {
    let params: ConnectionParams = serde_json::from_value(params).unwrap_or_default();
    let actor = app
        .authenticate(params.auth_token.as_deref())
        .map_err(core_error_to_graphql_error)?;
    debug!(
        "Websocket connected for {}",
        actor.user_id.as_deref().unwrap_or("anonymous")
    );

    let mut data = Data::default();
    data.insert(RequestIdentity {
        actor,
        mutator_id: params.mutator_id,
    });
    Ok(data)
}
