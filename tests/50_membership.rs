mod common;

use anyhow::Result;
use reqwest::{Client, StatusCode};
use serde_json::{json, Value};

#[tokio::test]
async fn owner_cannot_be_removed() -> Result<()> {
    let server = common::ensure_server().await?;
    if !common::database_ready(server).await? {
        return Ok(());
    }
    let owner = common::register_and_login(server, "owner", "developer").await?;
    let project_id = common::create_project(server, &owner).await?;

    let res = Client::new()
        .delete(server.url(&format!("/projects/{}/members/{}", project_id, owner.user_id)))
        .bearer_auth(&owner.access_token)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
    Ok(())
}

#[tokio::test]
async fn member_add_and_remove_rules() -> Result<()> {
    let server = common::ensure_server().await?;
    if !common::database_ready(server).await? {
        return Ok(());
    }
    let owner = common::register_and_login(server, "owner", "developer").await?;
    let dev = common::register_and_login(server, "dev", "developer").await?;
    let project_id = common::create_project(server, &owner).await?;

    let res = common::add_member(server, &owner, project_id, dev.user_id, "member").await?;
    assert_eq!(res.status(), StatusCode::CREATED);

    let res = common::add_member(server, &owner, project_id, dev.user_id, "admin").await?;
    assert_eq!(res.status(), StatusCode::CONFLICT);

    // The owner is implicitly a member
    let res = common::add_member(server, &owner, project_id, owner.user_id, "member").await?;
    assert_eq!(res.status(), StatusCode::CONFLICT);

    let res = common::add_member(server, &owner, project_id, i64::from(i32::MAX), "member").await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    // Plain members cannot manage membership
    let res = common::add_member(server, &dev, project_id, owner.user_id, "viewer").await?;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    let client = Client::new();
    let res = client
        .delete(server.url(&format!("/projects/{}/members/{}", project_id, dev.user_id)))
        .bearer_auth(&owner.access_token)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::NO_CONTENT);

    let res = client
        .delete(server.url(&format!("/projects/{}/members/{}", project_id, dev.user_id)))
        .bearer_auth(&owner.access_token)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn project_viewer_is_read_only() -> Result<()> {
    let server = common::ensure_server().await?;
    if !common::database_ready(server).await? {
        return Ok(());
    }
    let owner = common::register_and_login(server, "owner", "developer").await?;
    let viewer = common::register_and_login(server, "viewer", "developer").await?;
    let project_id = common::create_project(server, &owner).await?;
    let issue_id = common::create_issue(server, &owner, project_id).await?;

    let res = common::add_member(server, &owner, project_id, viewer.user_id, "viewer").await?;
    assert_eq!(res.status(), StatusCode::CREATED);

    let client = Client::new();

    // Reads are allowed
    let res = client
        .get(server.url(&format!("/issues/{}", issue_id)))
        .bearer_auth(&viewer.access_token)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);

    let res = client
        .post(server.url(&format!("/projects/{}/issues", project_id)))
        .bearer_auth(&viewer.access_token)
        .json(&json!({ "title": "Viewer bug" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    let res = client
        .post(server.url(&format!("/issues/{}/comments", issue_id)))
        .bearer_auth(&viewer.access_token)
        .json(&json!({ "content": "me too" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
    Ok(())
}

#[tokio::test]
async fn owner_filter_does_not_widen_visibility() -> Result<()> {
    let server = common::ensure_server().await?;
    if !common::database_ready(server).await? {
        return Ok(());
    }
    let owner = common::register_and_login(server, "owner", "developer").await?;
    let outsider = common::register_and_login(server, "outsider", "developer").await?;
    common::create_project(server, &owner).await?;

    let client = Client::new();
    let res = client
        .get(server.url(&format!("/projects?owner_id={}", owner.user_id)))
        .bearer_auth(&outsider.access_token)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await?;
    assert_eq!(body["meta"]["total"], 0);
    assert_eq!(body["data"].as_array().map(Vec::len), Some(0));

    let res = client
        .get(server.url(&format!("/projects?owner_id={}", owner.user_id)))
        .bearer_auth(&owner.access_token)
        .send()
        .await?;
    let body: Value = res.json().await?;
    assert_eq!(body["meta"]["total"], 1);
    Ok(())
}
