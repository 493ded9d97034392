mod common;

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use async_graphql::Request;
use futures_util::StreamExt;
use serde_json::Value;

use common::{TestApp, MUTATOR_ID};
use huddle::auth::Actor;
use huddle::database::entities::users;
use huddle::graphql::{build_schema, GraphQLSchema, RequestIdentity};

async fn run(schema: &GraphQLSchema, t: &TestApp, user: Option<&users::Model>, query: String) -> Value {
    let request = match user {
        Some(user) => Request::new(query).data(Arc::new(t.ctx(user))),
        None => Request::new(query),
    };
    let response = schema.execute(request).await;
    assert!(response.errors.is_empty(), "{:?}", response.errors);
    response.data.into_json().unwrap()
}

#[tokio::test]
async fn created_accounts_can_authenticate() -> Result<()> {
    let t = TestApp::new().await;
    let schema = build_schema(t.app.clone());

    let data = run(
        &schema,
        &t,
        None,
        r#"mutation {
            createAccount(email: "Ana@Example.com", password: "correct horse", preferredName: "Ana") {
                error { code message }
                authToken
                user { id email preferredName }
            }
        }"#
        .to_string(),
    )
    .await;

    let payload = &data["createAccount"];
    assert!(payload["error"].is_null());
    assert_eq!(payload["user"]["email"], "ana@example.com");
    let token = payload["authToken"].as_str().unwrap();
    let actor = t.app.authenticate(Some(&format!("Bearer {}", token)))?;
    assert_eq!(actor.user_id.as_deref(), payload["user"]["id"].as_str());
    Ok(())
}

#[tokio::test]
async fn refused_mutations_report_in_the_payload() -> Result<()> {
    let t = TestApp::new().await;
    let schema = build_schema(t.app.clone());

    let data = run(
        &schema,
        &t,
        None,
        r#"mutation {
            createAccount(email: "ana@example.com", password: "short") {
                error { code }
                authToken
            }
        }"#
        .to_string(),
    )
    .await;
    assert_eq!(data["createAccount"]["error"]["code"], "VALIDATION_FAILED");
    assert!(data["createAccount"]["authToken"].is_null());

    let lead = t.user("Lead").await;
    let ana = t.user("Ana").await;
    let team = t.team(&lead).await;
    t.join(&team, &lead, &ana).await;
    t.bus.clear();

    let data = run(
        &schema,
        &t,
        Some(&ana),
        format!(
            r#"mutation {{ archiveTeam(teamId: "{}") {{ error {{ code message }} team {{ id }} }} }}"#,
            team.id
        ),
    )
    .await;
    assert_eq!(data["archiveTeam"]["error"]["code"], "FORBIDDEN");
    assert!(data["archiveTeam"]["team"].is_null());
    assert!(t.bus.is_empty());
    Ok(())
}

#[tokio::test]
async fn archive_team_returns_the_team_and_notifications() -> Result<()> {
    let t = TestApp::new().await;
    let schema = build_schema(t.app.clone());
    let lead = t.user("Lead").await;
    let ana = t.user("Ana").await;
    let team = t.team(&lead).await;
    t.join(&team, &lead, &ana).await;

    let data = run(
        &schema,
        &t,
        Some(&lead),
        format!(
            r#"mutation {{
                archiveTeam(teamId: "{}") {{
                    error {{ code }}
                    team {{ id isArchived }}
                    hardDeleted
                    notifications {{ userId kind }}
                }}
            }}"#,
            team.id
        ),
    )
    .await;

    let payload = &data["archiveTeam"];
    assert!(payload["error"].is_null());
    assert_eq!(payload["team"]["isArchived"], true);
    assert_eq!(payload["hardDeleted"], false);
    let notifications = payload["notifications"].as_array().unwrap();
    assert_eq!(notifications.len(), 2);
    assert!(notifications.iter().all(|n| n["kind"] == "TEAM_ARCHIVED"));
    Ok(())
}

#[tokio::test]
async fn queries_fail_with_a_code() -> Result<()> {
    let t = TestApp::new().await;
    let schema = build_schema(t.app.clone());
    let lead = t.user("Lead").await;
    let outsider = t.user("Outsider").await;
    let team = t.team(&lead).await;

    let response = schema.execute(Request::new("{ teams { id } }")).await;
    let error = &response.errors[0];
    let code = error.extensions.as_ref().and_then(|ext| ext.get("code"));
    assert_eq!(code, Some(&async_graphql::Value::from("UNAUTHORIZED")));

    let request = Request::new(format!(r#"{{ team(teamId: "{}") {{ id }} }}"#, team.id))
        .data(Arc::new(t.ctx(&outsider)));
    let response = schema.execute(request).await;
    let code = response.errors[0]
        .extensions
        .as_ref()
        .and_then(|ext| ext.get("code"));
    assert_eq!(code, Some(&async_graphql::Value::from("FORBIDDEN")));

    let data = run(
        &schema,
        &t,
        Some(&lead),
        format!(
            r#"{{ team(teamId: "{}") {{ name teamMembers {{ isLead user {{ email }} }} }} }}"#,
            team.id
        ),
    )
    .await;
    assert_eq!(data["team"]["name"], "Core");
    assert_eq!(data["team"]["teamMembers"][0]["isLead"], true);
    assert_eq!(data["team"]["teamMembers"][0]["user"]["email"], "lead@example.com");
    Ok(())
}

#[tokio::test]
async fn project_subscribers_receive_live_updates() -> Result<()> {
    let t = TestApp::new().await;
    let schema = build_schema(t.app.clone());
    let lead = t.user("Lead").await;
    let team = t.team(&lead).await;

    let identity = RequestIdentity {
        actor: Actor::user(lead.id.clone()),
        mutator_id: None,
    };
    let request = Request::new(format!(
        r#"subscription {{ projectEvents(teamId: "{}") }}"#,
        team.id
    ))
    .data(identity);
    let mut stream = Box::pin(schema.execute_stream(request));

    // Nothing is published yet; polling registers the subscription
    let idle = tokio::time::timeout(Duration::from_millis(200), stream.next()).await;
    assert!(idle.is_err());

    let ctx = t.ctx(&lead);
    let project = t
        .app
        .projects()
        .create_project(&ctx, &team.id, "Plan the offsite")
        .await?;

    let response = tokio::time::timeout(Duration::from_secs(5), stream.next())
        .await?
        .unwrap();
    assert!(response.errors.is_empty(), "{:?}", response.errors);
    let data = response.data.into_json()?;
    let envelope = &data["projectEvents"];
    assert_eq!(envelope["data"]["__typename"], "ProjectCreated");
    assert_eq!(envelope["data"]["project"]["id"], project.id.as_str());
    assert_eq!(envelope["operationId"], ctx.operation_id());
    assert_eq!(envelope["mutatorId"], MUTATOR_ID);
    Ok(())
}

#[tokio::test]
async fn subscriptions_require_membership() -> Result<()> {
    let t = TestApp::new().await;
    let schema = build_schema(t.app.clone());
    let lead = t.user("Lead").await;
    let outsider = t.user("Outsider").await;
    let team = t.team(&lead).await;

    let request = Request::new(format!(
        r#"subscription {{ projectEvents(teamId: "{}") }}"#,
        team.id
    ))
    .data(RequestIdentity {
        actor: Actor::user(outsider.id.clone()),
        mutator_id: None,
    });
    let mut stream = Box::pin(schema.execute_stream(request));

    let response = tokio::time::timeout(Duration::from_secs(5), stream.next())
        .await?
        .unwrap();
    let code = response.errors[0]
        .extensions
        .as_ref()
        .and_then(|ext| ext.get("code"));
    assert_eq!(code, Some(&async_graphql::Value::from("FORBIDDEN")));
    Ok(())
}

#[tokio::test]
async fn removed_members_stop_receiving_team_events() -> Result<()> {
    let t = TestApp::new().await;
    let schema = build_schema(t.app.clone());
    let lead = t.user("Lead").await;
    let ana = t.user("Ana").await;
    let team = t.team(&lead).await;
    let member = t.join(&team, &lead, &ana).await;

    let request = Request::new(format!(
        r#"subscription {{ teamEvents(teamId: "{}") }}"#,
        team.id
    ))
    .data(RequestIdentity {
        actor: Actor::user(ana.id.clone()),
        mutator_id: None,
    });
    let mut stream = Box::pin(schema.execute_stream(request));
    let idle = tokio::time::timeout(Duration::from_millis(200), stream.next()).await;
    assert!(idle.is_err());

    t.app
        .team_members()
        .remove_team_member(&t.ctx(&lead), &member.id)
        .await?;

    let response = tokio::time::timeout(Duration::from_secs(5), stream.next())
        .await?
        .unwrap();
    assert!(response.errors.is_empty(), "{:?}", response.errors);
    let data = response.data.into_json()?;
    assert_eq!(data["teamEvents"]["data"]["__typename"], "TeamMemberRemoved");
    assert_eq!(data["teamEvents"]["data"]["teamMember"]["id"], member.id.as_str());

    let closed = tokio::time::timeout(Duration::from_secs(5), stream.next()).await?;
    assert!(closed.is_none());
    Ok(())
}
