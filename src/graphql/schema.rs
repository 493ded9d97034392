use std::sync::Arc;

use async_graphql::*;

use crate::app_context::AppContext;
use crate::graphql::context::GraphQLContext;
use crate::graphql::mutations::Mutation;
use crate::graphql::queries::Query;
use crate::graphql::subscriptions::Subscription;

pub type GraphQLSchema = Schema<Query, Mutation, Subscription>;

pub fn build_schema(app: Arc<AppContext>) -> GraphQLSchema {
    Schema::build(Query, Mutation::default(), Subscription)
        .data(GraphQLContext::new(app))
        .finish()
}
