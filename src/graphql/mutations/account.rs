use async_graphql::*;

use crate::graphql::context::{request_context, GraphQLContext};
use crate::graphql::types::{respond, AuthPayload, CreateOrganizationPayload, Organization, User};

#[derive(Default)]
pub struct AccountMutation;

#[Object]
impl AccountMutation {
    /// Register a user and sign them in
    async fn create_account(
        &self,
        ctx: &Context<'_>,
        email: String,
        password: String,
        preferred_name: Option<String>,
    ) -> Result<AuthPayload> {
        let context = ctx.data::<GraphQLContext>()?;
        let result = context
            .app
            .accounts()
            .create_account(&email, &password, preferred_name.as_deref().unwrap_or(""))
            .await;

        respond(result, |authenticated| AuthPayload {
            auth_token: Some(authenticated.auth_token),
            user: Some(User::from(authenticated.user)),
            ..Default::default()
        })
    }

    async fn login(&self, ctx: &Context<'_>, email: String, password: String) -> Result<AuthPayload> {
        let context = ctx.data::<GraphQLContext>()?;
        let result = context.app.accounts().login(&email, &password).await;

        respond(result, |authenticated| AuthPayload {
            auth_token: Some(authenticated.auth_token),
            user: Some(User::from(authenticated.user)),
            ..Default::default()
        })
    }

    /// Create an organization led by the caller
    async fn create_organization(
        &self,
        ctx: &Context<'_>,
        name: String,
    ) -> Result<CreateOrganizationPayload> {
        let context = ctx.data::<GraphQLContext>()?;
        let request = request_context(ctx)?;
        let result = context
            .app
            .accounts()
            .create_organization(&request, &name)
            .await;

        respond(result, |organization| CreateOrganizationPayload {
            organization: Some(Organization::from(organization)),
            ..Default::default()
        })
    }
}
