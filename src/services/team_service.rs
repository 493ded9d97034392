use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, TransactionTrait,
};
use serde_json::json;
use tracing::{debug, info};

use crate::database::entities::notifications::NotificationKind;
use crate::database::entities::{
    notifications, projects, team_invitations, team_members, teams, users, Projects, TeamInvitations,
    TeamMembers, Teams, Users,
};
use crate::errors::{CoreError, CoreResult};
use crate::pubsub::{LiveUpdate, Topic};
use crate::request_context::RequestContext;
use crate::services::ValidationService;

/// Result of [`TeamService::archive_team`].
#[derive(Debug, Clone)]
pub struct ArchivedTeam {
    pub team: teams::Model,
    /// The team had no projects and a single member, so its rows are gone
    pub hard_deleted: bool,
    pub notifications: Vec<notifications::Model>,
}

impl ArchivedTeam {
    pub fn user_ids(&self) -> Vec<String> {
        self.notifications.iter().map(|n| n.user_id.clone()).collect()
    }
}

#[derive(Clone)]
pub struct TeamService {
    db: DatabaseConnection,
}

impl TeamService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Create a team in `org_id` with the caller as its lead.
    pub async fn add_team(
        &self,
        ctx: &RequestContext,
        org_id: &str,
        name: &str,
    ) -> CoreResult<(teams::Model, team_members::Model)> {
        let user_id = ctx.authorization().require_org_member(org_id).await?;
        let name = ValidationService::validate_team_name(name)?;

        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| CoreError::database("begin transaction", e))?;

        let user = Users::find_by_id(user_id.to_string())
            .one(&txn)
            .await?
            .ok_or_else(|| CoreError::not_found("User", user_id))?;
        let team = teams::ActiveModel::new(org_id, &name).insert(&txn).await?;
        let lead = team_members::ActiveModel::new(&team.id, &user, true)
            .insert(&txn)
            .await?;
        if let Some(update) = user.join_tms(&team.id) {
            update.update(&txn).await?;
        }

        txn.commit()
            .await
            .map_err(|e| CoreError::database("add team", e))?;
        ctx.loader.users().clear(user_id);

        info!("User {} created team {} in org {}", user_id, team.id, org_id);
        ctx.publish(
            Topic::team_member(user_id),
            LiveUpdate::TeamAdded {
                team: team.clone(),
                team_member: lead.clone(),
            },
        )
        .await;

        Ok((team, lead))
    }

    pub async fn update_team_name(
        &self,
        ctx: &RequestContext,
        team_id: &str,
        name: &str,
    ) -> CoreResult<teams::Model> {
        ctx.authorization().require_team_member(team_id).await?;
        let name = ValidationService::validate_team_name(name)?;

        let team = self.find_team(team_id).await?;
        if team.is_archived {
            return Err(CoreError::validation("Team is archived"));
        }

        let active: teams::ActiveModel = team.into();
        let team = active
            .rename(&name)
            .update(&self.db)
            .await
            .map_err(|e| CoreError::database("rename team", e))?;
        ctx.loader.teams().clear(team_id);

        ctx.publish(
            Topic::team(team_id),
            LiveUpdate::TeamUpdated { team: team.clone() },
        )
        .await;

        Ok(team)
    }

    /// Archive a team.
    ///
    /// Whether the team is hard-deleted (no projects, one active member) or
    /// flagged `is_archived` is decided inside the same transaction that
    /// performs the writes, so membership changes cannot slip in between
    /// the check and the write. Every active member loses the team from
    /// `tms` and gets one notification; events go out after commit.
    pub async fn archive_team(&self, ctx: &RequestContext, team_id: &str) -> CoreResult<ArchivedTeam> {
        let user_id = ctx.authorization().require_team_lead(team_id).await?;

        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| CoreError::database("begin transaction", e))?;

        let team = Teams::find_by_id(team_id.to_string())
            .one(&txn)
            .await?
            .ok_or_else(|| CoreError::not_found("Team", team_id))?;
        if team.is_archived {
            return Err(CoreError::validation("Team is already archived"));
        }

        let members = TeamMembers::find()
            .filter(team_members::Column::TeamId.eq(team_id))
            .filter(team_members::Column::IsNotRemoved.eq(true))
            .order_by_asc(team_members::Column::CreatedAt)
            .all(&txn)
            .await?;
        let project_count = Projects::find()
            .filter(projects::Column::TeamId.eq(team_id))
            .count(&txn)
            .await?;
        let hard_deleted = project_count == 0 && members.len() == 1;

        let team = if hard_deleted {
            TeamMembers::delete_many()
                .filter(team_members::Column::TeamId.eq(team_id))
                .exec(&txn)
                .await?;
            TeamInvitations::delete_many()
                .filter(team_invitations::Column::TeamId.eq(team_id))
                .exec(&txn)
                .await?;
            Teams::delete_by_id(team_id.to_string()).exec(&txn).await?;
            teams::Model {
                is_archived: true,
                updated_at: chrono::Utc::now(),
                ..team
            }
        } else {
            let active: teams::ActiveModel = team.into();
            active.archive().update(&txn).await?
        };

        let member_user_ids: Vec<String> = members.iter().map(|m| m.user_id.clone()).collect();
        let users = Users::find()
            .filter(users::Column::Id.is_in(member_user_ids.clone()))
            .all(&txn)
            .await?;
        for user in &users {
            if let Some(update) = user.leave_tms(team_id) {
                update.update(&txn).await?;
            }
        }

        let mut created = Vec::with_capacity(members.len());
        for member in &members {
            let notification = notifications::ActiveModel::new(
                &member.user_id,
                NotificationKind::TeamArchived,
                Some(team_id),
                json!({
                    "teamId": team_id,
                    "teamName": team.name,
                    "archivedBy": user_id,
                }),
            )
            .insert(&txn)
            .await?;
            created.push(notification);
        }

        txn.commit()
            .await
            .map_err(|e| CoreError::database("archive team", e))?;

        ctx.loader.teams().clear(team_id);
        for member in &members {
            ctx.loader.team_members().clear(&member.id);
            ctx.loader.users().clear(&member.user_id);
        }

        info!(
            "Team {} archived by {} (hard delete: {}, {} members notified)",
            team_id,
            user_id,
            hard_deleted,
            created.len()
        );

        for notification in &created {
            ctx.publish_notification(notification).await;
        }
        ctx.publish(
            Topic::team(team_id),
            LiveUpdate::TeamArchived {
                team: team.clone(),
                hard_deleted,
                user_ids: member_user_ids,
            },
        )
        .await;

        Ok(ArchivedTeam {
            team,
            hard_deleted,
            notifications: created,
        })
    }

    pub async fn get_team(&self, ctx: &RequestContext, team_id: &str) -> CoreResult<teams::Model> {
        ctx.authorization()
            .require_org_leader_or_team_member(team_id)
            .await?;
        let team = ctx
            .loader
            .teams()
            .load(team_id)
            .await?
            .ok_or_else(|| CoreError::not_found("Team", team_id))?;
        Ok(team.as_ref().clone())
    }

    /// The caller's teams, excluding archived ones and removed memberships.
    pub async fn list_teams(&self, ctx: &RequestContext) -> CoreResult<Vec<teams::Model>> {
        let user_id = ctx.actor.require_user_id()?;
        let team_ids: Vec<String> = TeamMembers::find()
            .filter(team_members::Column::UserId.eq(user_id))
            .filter(team_members::Column::IsNotRemoved.eq(true))
            .all(&self.db)
            .await?
            .into_iter()
            .map(|m| m.team_id)
            .collect();
        debug!("User {} is on {} teams", user_id, team_ids.len());

        let teams = Teams::find()
            .filter(teams::Column::Id.is_in(team_ids))
            .filter(teams::Column::IsArchived.eq(false))
            .order_by_asc(teams::Column::Name)
            .all(&self.db)
            .await?;
        Ok(teams)
    }

    /// Active members of a team, lead first.
    pub async fn team_members(
        &self,
        ctx: &RequestContext,
        team_id: &str,
    ) -> CoreResult<Vec<team_members::Model>> {
        ctx.authorization()
            .require_org_leader_or_team_member(team_id)
            .await?;
        let members = TeamMembers::find()
            .filter(team_members::Column::TeamId.eq(team_id))
            .filter(team_members::Column::IsNotRemoved.eq(true))
            .order_by_desc(team_members::Column::IsLead)
            .order_by_asc(team_members::Column::PreferredName)
            .all(&self.db)
            .await?;
        for member in &members {
            ctx.loader.team_members().prime(member.clone());
        }
        Ok(members)
    }

    pub async fn find_team(&self, team_id: &str) -> CoreResult<teams::Model> {
        Teams::find_by_id(team_id.to_string())
            .one(&self.db)
            .await
            .map_err(|e| CoreError::database("find team", e))?
            .ok_or_else(|| CoreError::not_found("Team", team_id))
    }
}
