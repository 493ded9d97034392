use async_graphql::*;

use crate::graphql::context::{request_context, GraphQLContext};
use crate::graphql::types::{respond, Project, ProjectPayload};

#[derive(Default)]
pub struct ProjectMutation;

#[Object]
impl ProjectMutation {
    async fn create_project(
        &self,
        ctx: &Context<'_>,
        team_id: String,
        content: String,
    ) -> Result<ProjectPayload> {
        let context = ctx.data::<GraphQLContext>()?;
        let request = request_context(ctx)?;
        let result = context
            .app
            .projects()
            .create_project(&request, &team_id, &content)
            .await;

        respond(result, |project| ProjectPayload {
            project: Some(Project::from(project)),
            ..Default::default()
        })
    }

    async fn delete_project(&self, ctx: &Context<'_>, project_id: String) -> Result<ProjectPayload> {
        let context = ctx.data::<GraphQLContext>()?;
        let request = request_context(ctx)?;
        let result = context
            .app
            .projects()
            .delete_project(&request, &project_id)
            .await;

        respond(result, |project| ProjectPayload {
            project: Some(Project::from(project)),
            ..Default::default()
        })
    }
}
