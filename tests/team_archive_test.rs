mod common;

use std::collections::HashSet;

use anyhow::Result;
use sea_orm::{ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter};

use common::{TestApp, MUTATOR_ID};
use huddle::database::entities::{
    notifications, team_members, Notifications, TeamMembers, Teams, Users,
};
use huddle::errors::CoreErrorKind;
use huddle::pubsub::{LiveUpdate, Topic, TopicKind};

#[tokio::test]
async fn archiving_a_shared_team_notifies_every_member() -> Result<()> {
    let t = TestApp::new().await;
    let lead = t.user("Lead").await;
    let ana = t.user("Ana").await;
    let bo = t.user("Bo").await;
    let team = t.team(&lead).await;
    t.join(&team, &lead, &ana).await;
    t.join(&team, &lead, &bo).await;
    t.bus.clear();

    let archived = t.app.teams().archive_team(&t.ctx(&lead), &team.id).await?;

    assert!(!archived.hard_deleted);
    assert!(archived.team.is_archived);
    assert_eq!(archived.notifications.len(), 3);
    let notified: HashSet<String> = archived.user_ids().into_iter().collect();
    let expected: HashSet<String> = [&lead, &ana, &bo].iter().map(|u| u.id.clone()).collect();
    assert_eq!(notified, expected);
    for notification in &archived.notifications {
        assert_eq!(notification.kind, "TEAM_ARCHIVED");
        assert_eq!(notification.team_id.as_deref(), Some(team.id.as_str()));
    }

    let stored = Teams::find_by_id(team.id.clone()).one(&t.db).await?.unwrap();
    assert!(stored.is_archived);
    let rows = TeamMembers::find()
        .filter(team_members::Column::TeamId.eq(team.id.as_str()))
        .count(&t.db)
        .await?;
    assert_eq!(rows, 3);
    for user in [&lead, &ana, &bo] {
        let user = Users::find_by_id(user.id.clone()).one(&t.db).await?.unwrap();
        assert!(!user.is_on_team(&team.id));
    }

    assert_eq!(t.bus.count_kind(TopicKind::Notification), 3);
    for user in [&lead, &ana, &bo] {
        assert_eq!(t.bus.published_on(&Topic::notification(&user.id)).len(), 1);
    }
    let team_events = t.bus.published_on(&Topic::team(&team.id));
    assert_eq!(team_events.len(), 1);
    match team_events[0].live_update() {
        Some(LiveUpdate::TeamArchived {
            hard_deleted,
            user_ids,
            ..
        }) => {
            assert!(!hard_deleted);
            assert_eq!(user_ids.len(), 3);
        }
        other => panic!("unexpected update: {:?}", other),
    }
    Ok(())
}

#[tokio::test]
async fn every_event_of_an_archive_shares_one_operation() -> Result<()> {
    let t = TestApp::new().await;
    let lead = t.user("Lead").await;
    let ana = t.user("Ana").await;
    let team = t.team(&lead).await;
    t.join(&team, &lead, &ana).await;
    t.bus.clear();

    let ctx = t.ctx(&lead);
    t.app.teams().archive_team(&ctx, &team.id).await?;

    let published = t.bus.published();
    assert_eq!(published.len(), 3);
    for (_, event) in &published {
        assert_eq!(event.operation_id(), Some(ctx.operation_id()));
        assert_eq!(event.mutator_id(), Some(MUTATOR_ID));
    }
    Ok(())
}

#[tokio::test]
async fn sole_member_without_projects_is_hard_deleted() -> Result<()> {
    let t = TestApp::new().await;
    let lead = t.user("Lead").await;
    let team = t.team(&lead).await;
    t.bus.clear();

    let archived = t.app.teams().archive_team(&t.ctx(&lead), &team.id).await?;

    assert!(archived.hard_deleted);
    assert_eq!(archived.notifications.len(), 1);
    assert!(Teams::find_by_id(team.id.clone()).one(&t.db).await?.is_none());
    let rows = TeamMembers::find()
        .filter(team_members::Column::TeamId.eq(team.id.as_str()))
        .count(&t.db)
        .await?;
    assert_eq!(rows, 0);
    let stored = Notifications::find()
        .filter(notifications::Column::UserId.eq(lead.id.as_str()))
        .filter(notifications::Column::Kind.eq("TEAM_ARCHIVED"))
        .count(&t.db)
        .await?;
    assert_eq!(stored, 1);

    assert_eq!(t.bus.count_kind(TopicKind::Notification), 1);
    assert_eq!(t.bus.published_on(&Topic::team(&team.id)).len(), 1);
    Ok(())
}

#[tokio::test]
async fn sole_member_with_a_project_is_soft_archived() -> Result<()> {
    let t = TestApp::new().await;
    let lead = t.user("Lead").await;
    let team = t.team(&lead).await;
    t.app
        .projects()
        .create_project(&t.ctx(&lead), &team.id, "Ship the beta")
        .await?;

    let archived = t.app.teams().archive_team(&t.ctx(&lead), &team.id).await?;

    assert!(!archived.hard_deleted);
    let stored = Teams::find_by_id(team.id.clone()).one(&t.db).await?.unwrap();
    assert!(stored.is_archived);
    Ok(())
}

#[tokio::test]
async fn archived_teams_leave_the_team_list_and_cannot_be_archived_again() -> Result<()> {
    let t = TestApp::new().await;
    let lead = t.user("Lead").await;
    let ana = t.user("Ana").await;
    let team = t.team(&lead).await;
    t.join(&team, &lead, &ana).await;

    t.app.teams().archive_team(&t.ctx(&lead), &team.id).await?;

    let teams = t.app.teams().list_teams(&t.ctx(&ana)).await?;
    assert!(teams.is_empty());

    t.bus.clear();
    let err = t
        .app
        .teams()
        .archive_team(&t.ctx(&lead), &team.id)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), CoreErrorKind::Validation);
    assert!(t.bus.is_empty());
    Ok(())
}
