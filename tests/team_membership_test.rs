mod common;

use anyhow::Result;
use sea_orm::{ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter};

use common::TestApp;
use huddle::database::entities::{
    team_invitations, team_members, teams, users, Projects, TeamInvitations, TeamMembers, Users,
};
use huddle::database::ids::team_member_id;
use huddle::errors::CoreErrorKind;
use huddle::pubsub::{LiveUpdate, Topic};

#[tokio::test]
async fn first_acceptance_creates_the_membership() -> Result<()> {
    let t = TestApp::new().await;
    let lead = t.user("Lead").await;
    let ana = t.user("Ana").await;
    let team = t.team(&lead).await;

    let invite = t
        .app
        .team_members()
        .invite_to_team(&t.ctx(&lead), &team.id, "ANA@example.com")
        .await?;
    assert_eq!(invite.invitation.as_ref().unwrap().email, "ana@example.com");
    assert_eq!(invite.notification.as_ref().map(|n| n.kind.as_str()), Some("TEAM_INVITATION"));

    t.bus.clear();
    let accepted = t
        .app
        .team_members()
        .accept_team_invitation(&t.ctx(&ana), &invite.invitation.as_ref().unwrap().id)
        .await?;

    assert!(!accepted.rejoined);
    assert_eq!(accepted.team_member.id, team_member_id(&ana.id, &team.id));
    assert_eq!(accepted.notification.kind, "ADDED_TO_TEAM");
    let stored = Users::find_by_id(ana.id.clone()).one(&t.db).await?.unwrap();
    assert!(stored.is_on_team(&team.id));

    assert_eq!(t.bus.published_on(&Topic::team(&team.id)).len(), 1);
    assert_eq!(t.bus.published_on(&Topic::team_member(&ana.id)).len(), 1);
    assert_eq!(t.bus.published_on(&Topic::notification(&ana.id)).len(), 1);
    Ok(())
}

#[tokio::test]
async fn reinviting_a_removed_member_reactivates_the_same_row() -> Result<()> {
    let t = TestApp::new().await;
    let lead = t.user("Lead").await;
    let ana = t.user("Ana").await;
    let team = t.team(&lead).await;
    let first = t.join(&team, &lead, &ana).await;

    t.app
        .team_members()
        .remove_team_member(&t.ctx(&lead), &first.id)
        .await?;

    t.bus.clear();
    let invite = t
        .app
        .team_members()
        .invite_to_team(&t.ctx(&lead), &team.id, &ana.email)
        .await?;

    assert!(invite.invitation.is_none());
    let member = invite.rejoined.expect("removed member is reactivated");
    assert_eq!(member.id, first.id);
    assert!(member.is_not_removed);
    let notification = invite.notification.expect("rejoin is announced");
    assert_eq!(notification.kind, "REJOINED_TEAM");
    assert_eq!(notification.user_id, ana.id);

    let stored = TeamMembers::find_by_id(first.id.clone()).one(&t.db).await?.unwrap();
    assert!(stored.is_not_removed);
    let rows = TeamMembers::find()
        .filter(team_members::Column::TeamId.eq(team.id.as_str()))
        .filter(team_members::Column::UserId.eq(ana.id.as_str()))
        .count(&t.db)
        .await?;
    assert_eq!(rows, 1);
    let pending = TeamInvitations::find()
        .filter(team_invitations::Column::TeamId.eq(team.id.as_str()))
        .filter(team_invitations::Column::AcceptedAt.is_null())
        .count(&t.db)
        .await?;
    assert_eq!(pending, 0);
    let stored = Users::find_by_id(ana.id.clone()).one(&t.db).await?.unwrap();
    assert!(stored.is_on_team(&team.id));

    let events = t.bus.published_on(&Topic::team(&team.id));
    assert_eq!(events.len(), 1);
    assert!(matches!(
        events[0].live_update(),
        Some(LiveUpdate::TeamMemberAdded { rejoined: true, .. })
    ));
    let added = t.bus.published_on(&Topic::team_member(&ana.id));
    assert!(matches!(added[0].live_update(), Some(LiveUpdate::TeamAdded { .. })));
    assert_eq!(t.bus.published_on(&Topic::notification(&ana.id)).len(), 1);

    // Back on the team, so a further invite conflicts
    let err = t
        .app
        .team_members()
        .invite_to_team(&t.ctx(&lead), &team.id, &ana.email)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), CoreErrorKind::Conflict);
    Ok(())
}

#[tokio::test]
async fn accepting_twice_is_rejected() -> Result<()> {
    let t = TestApp::new().await;
    let lead = t.user("Lead").await;
    let ana = t.user("Ana").await;
    let team = t.team(&lead).await;
    let invite = t
        .app
        .team_members()
        .invite_to_team(&t.ctx(&lead), &team.id, &ana.email)
        .await?;
    t.app
        .team_members()
        .accept_team_invitation(&t.ctx(&ana), &invite.invitation.as_ref().unwrap().id)
        .await?;

    let err = t
        .app
        .team_members()
        .accept_team_invitation(&t.ctx(&ana), &invite.invitation.as_ref().unwrap().id)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), CoreErrorKind::Validation);
    Ok(())
}

#[tokio::test]
async fn invitations_only_work_for_their_addressee() -> Result<()> {
    let t = TestApp::new().await;
    let lead = t.user("Lead").await;
    let ana = t.user("Ana").await;
    let mallory = t.user("Mallory").await;
    let team = t.team(&lead).await;
    let invite = t
        .app
        .team_members()
        .invite_to_team(&t.ctx(&lead), &team.id, &ana.email)
        .await?;

    t.bus.clear();
    let err = t
        .app
        .team_members()
        .accept_team_invitation(&t.ctx(&mallory), &invite.invitation.as_ref().unwrap().id)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), CoreErrorKind::Forbidden);
    assert!(t.bus.is_empty());
    Ok(())
}

#[tokio::test]
async fn inviting_a_current_member_conflicts() -> Result<()> {
    let t = TestApp::new().await;
    let lead = t.user("Lead").await;
    let ana = t.user("Ana").await;
    let team = t.team(&lead).await;
    t.join(&team, &lead, &ana).await;

    let err = t
        .app
        .team_members()
        .invite_to_team(&t.ctx(&lead), &team.id, &ana.email)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), CoreErrorKind::Conflict);
    Ok(())
}

#[tokio::test]
async fn removed_members_hand_their_projects_to_the_lead() -> Result<()> {
    let t = TestApp::new().await;
    let lead = t.user("Lead").await;
    let ana = t.user("Ana").await;
    let team = t.team(&lead).await;
    let member = t.join(&team, &lead, &ana).await;
    let project = t
        .app
        .projects()
        .create_project(&t.ctx(&ana), &team.id, "Write the docs")
        .await?;
    assert_eq!(project.team_member_id, member.id);

    let removed = t
        .app
        .team_members()
        .remove_team_member(&t.ctx(&lead), &member.id)
        .await?;

    assert!(!removed.team_member.is_not_removed);
    assert_eq!(removed.reassigned_project_ids, vec![project.id.clone()]);
    let kicked = removed.notification.expect("evicted member is notified");
    assert_eq!(kicked.kind, "KICKED_OUT");
    assert_eq!(kicked.user_id, ana.id);

    let stored = Projects::find_by_id(project.id.clone()).one(&t.db).await?.unwrap();
    assert_eq!(stored.team_member_id, team_member_id(&lead.id, &team.id));
    let stored = Users::find_by_id(ana.id.clone()).one(&t.db).await?.unwrap();
    assert!(!stored.is_on_team(&team.id));
    Ok(())
}

#[tokio::test]
async fn leaving_a_team_sends_no_notification() -> Result<()> {
    let t = TestApp::new().await;
    let lead = t.user("Lead").await;
    let ana = t.user("Ana").await;
    let team = t.team(&lead).await;
    let member = t.join(&team, &lead, &ana).await;
    t.bus.clear();

    let removed = t
        .app
        .team_members()
        .remove_team_member(&t.ctx(&ana), &member.id)
        .await?;

    assert!(removed.notification.is_none());
    assert_eq!(t.bus.published_on(&Topic::team(&team.id)).len(), 1);
    assert!(t.bus.published_on(&Topic::notification(&ana.id)).is_empty());
    Ok(())
}

#[tokio::test]
async fn the_lead_must_hand_over_before_leaving() -> Result<()> {
    let t = TestApp::new().await;
    let lead = t.user("Lead").await;
    let team = t.team(&lead).await;

    let err = t
        .app
        .team_members()
        .remove_team_member(&t.ctx(&lead), &team_member_id(&lead.id, &team.id))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), CoreErrorKind::Validation);
    Ok(())
}

#[tokio::test]
async fn promotion_moves_the_lead_role() -> Result<()> {
    let t = TestApp::new().await;
    let lead = t.user("Lead").await;
    let ana = t.user("Ana").await;
    let team = t.team(&lead).await;
    let member = t.join(&team, &lead, &ana).await;
    t.bus.clear();

    let promoted = t
        .app
        .team_members()
        .promote_to_team_lead(&t.ctx(&lead), &member.id)
        .await?;

    assert!(promoted.new_lead.is_lead);
    let old_lead = promoted.old_lead.expect("previous lead is demoted");
    assert_eq!(old_lead.user_id, lead.id);
    assert!(!old_lead.is_lead);
    assert_eq!(promoted.notification.kind, "PROMOTED_TO_LEAD");
    assert_eq!(t.bus.published_on(&Topic::team(&team.id)).len(), 1);
    assert_eq!(t.bus.published_on(&Topic::notification(&ana.id)).len(), 1);

    // The former lead can no longer archive
    let err = t
        .app
        .teams()
        .archive_team(&t.ctx(&lead), &team.id)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), CoreErrorKind::Forbidden);
    Ok(())
}

async fn archived_team_with_two_members(
    t: &TestApp,
) -> (users::Model, users::Model, teams::Model, team_members::Model) {
    let lead = t.user("Lead").await;
    let ana = t.user("Ana").await;
    let team = t.team(&lead).await;
    let member = t.join(&team, &lead, &ana).await;
    let archived = t
        .app
        .teams()
        .archive_team(&t.ctx(&lead), &team.id)
        .await
        .unwrap();
    assert!(!archived.hard_deleted);
    t.bus.clear();
    (lead, ana, team, member)
}

#[tokio::test]
async fn members_of_an_archived_team_cannot_be_removed() -> Result<()> {
    let t = TestApp::new().await;
    let (lead, _ana, _team, member) = archived_team_with_two_members(&t).await;

    let err = t
        .app
        .team_members()
        .remove_team_member(&t.ctx(&lead), &member.id)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), CoreErrorKind::Validation);
    assert_eq!(err.message(), "Team is archived");

    let stored = TeamMembers::find_by_id(member.id.clone()).one(&t.db).await?.unwrap();
    assert!(stored.is_not_removed);
    assert!(t.bus.is_empty());
    Ok(())
}

#[tokio::test]
async fn archived_teams_keep_their_lead() -> Result<()> {
    let t = TestApp::new().await;
    let (lead, _ana, team, member) = archived_team_with_two_members(&t).await;

    let err = t
        .app
        .team_members()
        .promote_to_team_lead(&t.ctx(&lead), &member.id)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), CoreErrorKind::Validation);
    assert_eq!(err.message(), "Team is archived");

    let stored = TeamMembers::find_by_id(team_member_id(&lead.id, &team.id))
        .one(&t.db)
        .await?
        .unwrap();
    assert!(stored.is_lead);
    assert!(t.bus.is_empty());
    Ok(())
}
