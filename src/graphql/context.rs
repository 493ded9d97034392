use std::sync::Arc;

use async_graphql::Context;

use crate::app_context::AppContext;
use crate::auth::Actor;
use crate::request_context::RequestContext;

#[derive(Clone)]
pub struct GraphQLContext {
    pub app: Arc<AppContext>,
}

impl GraphQLContext {
    pub fn new(app: Arc<AppContext>) -> Self {
        Self { app }
    }
}

/// Caller identity established by the transport: HTTP headers for queries and
/// mutations, the `connection_init` payload for websocket subscriptions.
#[derive(Clone, Debug)]
pub struct RequestIdentity {
    pub actor: Actor,
    pub mutator_id: Option<String>,
}

impl Default for RequestIdentity {
    fn default() -> Self {
        Self {
            actor: Actor::anonymous(),
            mutator_id: None,
        }
    }
}

/// The request context attached to this operation.
///
/// HTTP requests carry one built by the handler. Websocket operations only
/// carry the connection identity, so each gets a fresh context and loader.
pub fn request_context(ctx: &Context<'_>) -> async_graphql::Result<Arc<RequestContext>> {
    if let Some(request) = ctx.data_opt::<Arc<RequestContext>>() {
        return Ok(Arc::clone(request));
    }
    let context = ctx.data::<GraphQLContext>()?;
    let identity = ctx
        .data_opt::<RequestIdentity>()
        .cloned()
        .unwrap_or_default();
    Ok(Arc::new(
        context
            .app
            .request_context(identity.actor, identity.mutator_id),
    ))
}
