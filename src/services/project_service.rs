use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, ModelTrait, QueryFilter,
    QueryOrder,
};
use tracing::debug;

use crate::database::entities::{projects, Projects, Teams};
use crate::database::ids::team_member_id;
use crate::errors::{CoreError, CoreResult};
use crate::pubsub::{LiveUpdate, Topic};
use crate::request_context::RequestContext;
use crate::services::ValidationService;

#[derive(Clone)]
pub struct ProjectService {
    db: DatabaseConnection,
}

impl ProjectService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn create_project(
        &self,
        ctx: &RequestContext,
        team_id: &str,
        content: &str,
    ) -> CoreResult<projects::Model> {
        let user_id = ctx.authorization().require_team_member(team_id).await?;
        let content = ValidationService::validate_project_content(content)?;

        let team = Teams::find_by_id(team_id.to_string())
            .one(&self.db)
            .await?
            .ok_or_else(|| CoreError::not_found("Team", team_id))?;
        if team.is_archived {
            return Err(CoreError::validation("Team is archived"));
        }

        let project = projects::ActiveModel::new(team_id, &team_member_id(user_id, team_id), &content)
            .insert(&self.db)
            .await
            .map_err(|e| CoreError::database("create project", e))?;
        debug!("Project {} created on team {}", project.id, team_id);

        ctx.publish(
            Topic::project(team_id),
            LiveUpdate::ProjectCreated {
                project: project.clone(),
            },
        )
        .await;
        Ok(project)
    }

    pub async fn delete_project(
        &self,
        ctx: &RequestContext,
        project_id: &str,
    ) -> CoreResult<projects::Model> {
        ctx.authorization().require_authenticated()?;
        let project = Projects::find_by_id(project_id.to_string())
            .one(&self.db)
            .await?
            .ok_or_else(|| CoreError::not_found("Project", project_id))?;
        ctx.authorization()
            .require_team_member(&project.team_id)
            .await?;

        project
            .clone()
            .delete(&self.db)
            .await
            .map_err(|e| CoreError::database("delete project", e))?;

        ctx.publish(
            Topic::project(&project.team_id),
            LiveUpdate::ProjectDeleted {
                project: project.clone(),
            },
        )
        .await;
        Ok(project)
    }

    pub async fn list_projects(
        &self,
        ctx: &RequestContext,
        team_id: &str,
    ) -> CoreResult<Vec<projects::Model>> {
        ctx.authorization().require_team_member(team_id).await?;
        Ok(Projects::find()
            .filter(projects::Column::TeamId.eq(team_id))
            .order_by_asc(projects::Column::CreatedAt)
            .all(&self.db)
            .await?)
    }
}
