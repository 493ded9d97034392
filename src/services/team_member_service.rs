use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, TransactionTrait,
};
use serde_json::json;
use tracing::{debug, info};

use crate::database::entities::notifications::NotificationKind;
use crate::database::entities::{
    notifications, projects, team_invitations, team_members, teams, users, Projects,
    TeamInvitations, TeamMembers, Teams, Users,
};
use crate::database::ids::{split_team_member_id, team_member_id};
use crate::errors::{CoreError, CoreResult};
use crate::pubsub::{LiveUpdate, Topic};
use crate::request_context::RequestContext;
use crate::services::ValidationService;

#[derive(Debug, Clone)]
pub struct TeamInvite {
    /// Pending invitation; `None` when a removed member was let straight back in
    pub invitation: Option<team_invitations::Model>,
    /// Present when the invitee already has an account
    pub notification: Option<notifications::Model>,
    /// The reactivated membership of a previously removed member
    pub rejoined: Option<team_members::Model>,
}

#[derive(Debug, Clone)]
pub struct AcceptedInvitation {
    pub team: teams::Model,
    pub team_member: team_members::Model,
    /// The membership existed and was reactivated rather than created
    pub rejoined: bool,
    pub notification: notifications::Model,
}

#[derive(Debug, Clone)]
pub struct RemovedTeamMember {
    pub team_member: team_members::Model,
    pub reassigned_project_ids: Vec<String>,
    /// Sent when someone other than the member did the removing
    pub notification: Option<notifications::Model>,
}

#[derive(Debug, Clone)]
pub struct PromotedTeamMember {
    pub old_lead: Option<team_members::Model>,
    pub new_lead: team_members::Model,
    pub notification: notifications::Model,
}

#[derive(Clone)]
pub struct TeamMemberService {
    db: DatabaseConnection,
}

impl TeamMemberService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    fn parse_team_member_id(team_member_id: &str) -> CoreResult<(&str, &str)> {
        split_team_member_id(team_member_id).ok_or_else(|| {
            CoreError::validation(format!("Invalid team member id: {}", team_member_id))
        })
    }

    async fn find_active_team(&self, team_id: &str) -> CoreResult<teams::Model> {
        let team = Teams::find_by_id(team_id.to_string())
            .one(&self.db)
            .await
            .map_err(|e| CoreError::database("find team", e))?
            .ok_or_else(|| CoreError::not_found("Team", team_id))?;
        if team.is_archived {
            return Err(CoreError::validation("Team is archived"));
        }
        Ok(team)
    }

    pub async fn invite_to_team(
        &self,
        ctx: &RequestContext,
        team_id: &str,
        email: &str,
    ) -> CoreResult<TeamInvite> {
        let inviter_id = ctx.authorization().require_team_member(team_id).await?;
        let email = ValidationService::normalize_email(email)?;
        let team = self.find_active_team(team_id).await?;

        let already_member = TeamMembers::find()
            .filter(team_members::Column::TeamId.eq(team_id))
            .filter(team_members::Column::Email.eq(email.as_str()))
            .filter(team_members::Column::IsNotRemoved.eq(true))
            .one(&self.db)
            .await?;
        if already_member.is_some() {
            return Err(CoreError::conflict(format!("{} is already on the team", email)));
        }

        let invitee = Users::find()
            .filter(users::Column::Email.eq(email.as_str()))
            .one(&self.db)
            .await?;
        let pending = TeamInvitations::find()
            .filter(team_invitations::Column::TeamId.eq(team_id))
            .filter(team_invitations::Column::Email.eq(email.as_str()))
            .filter(team_invitations::Column::AcceptedAt.is_null())
            .one(&self.db)
            .await?;

        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| CoreError::database("begin transaction", e))?;

        // A removed member comes straight back without a pending invitation
        if let Some(invitee) = &invitee {
            let previous = TeamMembers::find_by_id(team_member_id(&invitee.id, team_id))
                .one(&txn)
                .await?;
            if let Some(member) = previous {
                if member.is_active() {
                    return Err(CoreError::conflict(format!("{} is already on the team", email)));
                }
                let active: team_members::ActiveModel = member.into();
                let team_member = active.reactivate().update(&txn).await?;
                if let Some(update) = invitee.join_tms(team_id) {
                    update.update(&txn).await?;
                }
                if let Some(stale) = pending {
                    let accepted: team_invitations::ActiveModel = stale.into();
                    accepted.accept().update(&txn).await?;
                }
                let notification = notifications::ActiveModel::new(
                    &invitee.id,
                    NotificationKind::RejoinedTeam,
                    Some(team_id),
                    json!({
                        "teamId": team_id,
                        "teamName": team.name,
                        "teamMemberId": team_member.id,
                        "invitedBy": inviter_id,
                    }),
                )
                .insert(&txn)
                .await?;
                txn.commit()
                    .await
                    .map_err(|e| CoreError::database("invite to team", e))?;
                ctx.loader.users().clear(&invitee.id);
                ctx.loader.team_members().prime(team_member.clone());

                info!("User {} brought {} back to team {}", inviter_id, email, team_id);
                Self::announce_member(ctx, &team, &team_member, true).await;
                ctx.publish_notification(&notification).await;

                return Ok(TeamInvite {
                    invitation: None,
                    notification: Some(notification),
                    rejoined: Some(team_member),
                });
            }
        }

        let invitation = match pending {
            Some(invitation) => invitation,
            None => {
                team_invitations::ActiveModel::new(team_id, &email, inviter_id)
                    .insert(&txn)
                    .await?
            }
        };
        let notification = match &invitee {
            Some(user) => Some(
                notifications::ActiveModel::new(
                    &user.id,
                    NotificationKind::TeamInvitation,
                    Some(team_id),
                    json!({
                        "invitationId": invitation.id,
                        "teamId": team_id,
                        "teamName": team.name,
                        "invitedBy": inviter_id,
                    }),
                )
                .insert(&txn)
                .await?,
            ),
            None => None,
        };
        txn.commit()
            .await
            .map_err(|e| CoreError::database("invite to team", e))?;

        info!("User {} invited {} to team {}", inviter_id, email, team_id);
        if let Some(notification) = &notification {
            ctx.publish_notification(notification).await;
        }

        Ok(TeamInvite {
            invitation: Some(invitation),
            notification,
            rejoined: None,
        })
    }

    /// Tell the team and the member's own channel that the member is in.
    async fn announce_member(
        ctx: &RequestContext,
        team: &teams::Model,
        team_member: &team_members::Model,
        rejoined: bool,
    ) {
        ctx.publish(
            Topic::team(&team.id),
            LiveUpdate::TeamMemberAdded {
                team_member: team_member.clone(),
                rejoined,
            },
        )
        .await;
        ctx.publish(
            Topic::team_member(&team_member.user_id),
            LiveUpdate::TeamAdded {
                team: team.clone(),
                team_member: team_member.clone(),
            },
        )
        .await;
    }

    /// Join the invitation's team, reactivating an earlier membership when
    /// one exists so a user never has two rows for the same team.
    pub async fn accept_team_invitation(
        &self,
        ctx: &RequestContext,
        invitation_id: &str,
    ) -> CoreResult<AcceptedInvitation> {
        let user_id = ctx.actor.require_user_id()?;
        let user = ctx
            .loader
            .users()
            .load(user_id)
            .await?
            .ok_or_else(|| CoreError::not_found("User", user_id))?;

        let invitation = TeamInvitations::find_by_id(invitation_id.to_string())
            .one(&self.db)
            .await?
            .ok_or_else(|| CoreError::not_found("Invitation", invitation_id))?;
        if invitation.email != user.email.to_lowercase() {
            return Err(CoreError::forbidden("Invitation was sent to another user"));
        }
        if !invitation.is_pending() {
            return Err(CoreError::validation("Invitation has already been accepted"));
        }
        let team = self.find_active_team(&invitation.team_id).await?;
        let team_id = team.id.clone();

        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| CoreError::database("begin transaction", e))?;

        let user = Users::find_by_id(user_id.to_string())
            .one(&txn)
            .await?
            .ok_or_else(|| CoreError::not_found("User", user_id))?;
        let existing = TeamMembers::find_by_id(team_member_id(user_id, &team_id))
            .one(&txn)
            .await?;
        let (team_member, rejoined) = match existing {
            Some(member) if member.is_active() => {
                return Err(CoreError::conflict("Already on team"));
            }
            Some(member) => {
                let active: team_members::ActiveModel = member.into();
                (active.reactivate().update(&txn).await?, true)
            }
            None => {
                let member = team_members::ActiveModel::new(&team_id, &user, false)
                    .insert(&txn)
                    .await?;
                (member, false)
            }
        };
        if let Some(update) = user.join_tms(&team_id) {
            update.update(&txn).await?;
        }
        let accepted: team_invitations::ActiveModel = invitation.into();
        accepted.accept().update(&txn).await?;

        let kind = if rejoined {
            NotificationKind::RejoinedTeam
        } else {
            NotificationKind::AddedToTeam
        };
        let notification = notifications::ActiveModel::new(
            user_id,
            kind,
            Some(&team_id),
            json!({
                "teamId": team_id,
                "teamName": team.name,
                "teamMemberId": team_member.id,
            }),
        )
        .insert(&txn)
        .await?;

        txn.commit()
            .await
            .map_err(|e| CoreError::database("accept team invitation", e))?;
        ctx.loader.users().clear(user_id);
        ctx.loader.team_members().prime(team_member.clone());

        info!(
            "User {} {} team {}",
            user_id,
            if rejoined { "rejoined" } else { "joined" },
            team_id
        );

        Self::announce_member(ctx, &team, &team_member, rejoined).await;
        ctx.publish_notification(&notification).await;

        Ok(AcceptedInvitation {
            team,
            team_member,
            rejoined,
            notification,
        })
    }

    /// Remove a member from a team. Leads may remove anyone else; any
    /// member may remove themselves. The member's projects move to the
    /// team lead.
    pub async fn remove_team_member(
        &self,
        ctx: &RequestContext,
        team_member_id: &str,
    ) -> CoreResult<RemovedTeamMember> {
        let (target_user_id, team_id) = Self::parse_team_member_id(team_member_id)?;
        let auth = ctx.authorization();
        let actor_id = auth.require_authenticated()?;
        let self_removal = actor_id == target_user_id;
        if self_removal {
            auth.require_team_member(team_id).await?;
        } else {
            auth.require_team_lead(team_id).await?;
        }

        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| CoreError::database("begin transaction", e))?;

        let target = TeamMembers::find_by_id(team_member_id.to_string())
            .one(&txn)
            .await?
            .filter(|m| m.is_active())
            .ok_or_else(|| CoreError::not_found("TeamMember", team_member_id))?;
        if target.is_lead {
            return Err(CoreError::validation(
                "Promote another member to team lead first",
            ));
        }
        let team = Teams::find_by_id(team_id.to_string())
            .one(&txn)
            .await?
            .ok_or_else(|| CoreError::not_found("Team", team_id))?;
        if team.is_archived {
            return Err(CoreError::validation("Team is archived"));
        }

        let active: team_members::ActiveModel = target.into();
        let team_member = active.remove().update(&txn).await?;

        if let Some(user) = Users::find_by_id(target_user_id.to_string())
            .one(&txn)
            .await?
        {
            if let Some(update) = user.leave_tms(team_id) {
                update.update(&txn).await?;
            }
        }

        let lead = TeamMembers::find()
            .filter(team_members::Column::TeamId.eq(team_id))
            .filter(team_members::Column::IsLead.eq(true))
            .filter(team_members::Column::IsNotRemoved.eq(true))
            .one(&txn)
            .await?;
        let mut reassigned_project_ids = Vec::new();
        if let Some(lead) = &lead {
            let owned = Projects::find()
                .filter(projects::Column::TeamMemberId.eq(team_member_id))
                .all(&txn)
                .await?;
            for project in owned {
                reassigned_project_ids.push(project.id.clone());
                let active: projects::ActiveModel = project.into();
                active.reassign(&lead.id).update(&txn).await?;
            }
        }

        let notification = if self_removal {
            None
        } else {
            Some(
                notifications::ActiveModel::new(
                    target_user_id,
                    NotificationKind::KickedOut,
                    Some(team_id),
                    json!({
                        "teamId": team_id,
                        "teamName": team.name,
                        "evictorUserId": actor_id,
                    }),
                )
                .insert(&txn)
                .await?,
            )
        };

        txn.commit()
            .await
            .map_err(|e| CoreError::database("remove team member", e))?;
        ctx.loader.team_members().clear(team_member_id);
        ctx.loader.users().clear(target_user_id);

        debug!(
            "Reassigned {} projects from {}",
            reassigned_project_ids.len(),
            team_member_id
        );
        info!("Team member {} removed by {}", team_member_id, actor_id);

        ctx.publish(
            Topic::team(team_id),
            LiveUpdate::TeamMemberRemoved {
                team_member: team_member.clone(),
                reassigned_project_ids: reassigned_project_ids.clone(),
            },
        )
        .await;
        if let Some(notification) = &notification {
            ctx.publish_notification(notification).await;
        }

        Ok(RemovedTeamMember {
            team_member,
            reassigned_project_ids,
            notification,
        })
    }

    pub async fn promote_to_team_lead(
        &self,
        ctx: &RequestContext,
        team_member_id: &str,
    ) -> CoreResult<PromotedTeamMember> {
        let (user_id, team_id) = Self::parse_team_member_id(team_member_id)?;
        let actor_id = ctx.authorization().require_team_lead(team_id).await?;
        self.find_active_team(team_id).await?;

        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| CoreError::database("begin transaction", e))?;

        let target = TeamMembers::find_by_id(team_member_id.to_string())
            .one(&txn)
            .await?
            .filter(|m| m.is_active())
            .ok_or_else(|| CoreError::not_found("TeamMember", team_member_id))?;
        if target.is_lead {
            return Err(CoreError::validation("Already team lead"));
        }

        let current_leads = TeamMembers::find()
            .filter(team_members::Column::TeamId.eq(team_id))
            .filter(team_members::Column::IsLead.eq(true))
            .all(&txn)
            .await?;
        let mut old_lead = None;
        for lead in current_leads {
            let active: team_members::ActiveModel = lead.into();
            old_lead = Some(active.set_lead(false).update(&txn).await?);
        }
        let active: team_members::ActiveModel = target.into();
        let new_lead = active.set_lead(true).update(&txn).await?;

        let notification = notifications::ActiveModel::new(
            user_id,
            NotificationKind::PromotedToLead,
            Some(team_id),
            json!({
                "teamId": team_id,
                "promotedBy": actor_id,
            }),
        )
        .insert(&txn)
        .await?;

        txn.commit()
            .await
            .map_err(|e| CoreError::database("promote to team lead", e))?;
        if let Some(old) = &old_lead {
            ctx.loader.team_members().clear(&old.id);
        }
        ctx.loader.team_members().clear(team_member_id);

        info!("{} promoted to lead of team {}", user_id, team_id);
        ctx.publish(
            Topic::team(team_id),
            LiveUpdate::TeamLeadChanged {
                old_lead: old_lead.clone(),
                new_lead: new_lead.clone(),
            },
        )
        .await;
        ctx.publish_notification(&notification).await;

        Ok(PromotedTeamMember {
            old_lead,
            new_lead,
            notification,
        })
    }
}
