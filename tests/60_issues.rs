mod common;

use anyhow::{Context, Result};
use reqwest::{Client, StatusCode};
use serde_json::{json, Value};

#[tokio::test]
async fn unassigning_a_non_assignee_is_404() -> Result<()> {
    let server = common::ensure_server().await?;
    if !common::database_ready(server).await? {
        return Ok(());
    }
    let owner = common::register_and_login(server, "owner", "developer").await?;
    let dev = common::register_and_login(server, "dev", "developer").await?;
    let project_id = common::create_project(server, &owner).await?;
    let issue_id = common::create_issue(server, &owner, project_id).await?;
    common::add_member(server, &owner, project_id, dev.user_id, "member").await?;

    let client = Client::new();
    let res = client
        .delete(server.url(&format!("/issues/{}/assign/{}", issue_id, dev.user_id)))
        .bearer_auth(&owner.access_token)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let res = client
        .post(server.url(&format!("/issues/{}/assign", issue_id)))
        .bearer_auth(&owner.access_token)
        .json(&json!({ "user_id": dev.user_id }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::CREATED);

    let res = client
        .post(server.url(&format!("/issues/{}/assign", issue_id)))
        .bearer_auth(&owner.access_token)
        .json(&json!({ "user_id": dev.user_id }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::CONFLICT);

    let res = client
        .delete(server.url(&format!("/issues/{}/assign/{}", issue_id, dev.user_id)))
        .bearer_auth(&owner.access_token)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::NO_CONTENT);
    Ok(())
}

#[tokio::test]
async fn issue_label_links() -> Result<()> {
    let server = common::ensure_server().await?;
    if !common::database_ready(server).await? {
        return Ok(());
    }
    let admin = common::register_and_login(server, "admin", "admin").await?;
    let owner = common::register_and_login(server, "owner", "developer").await?;
    let project_id = common::create_project(server, &owner).await?;
    let issue_id = common::create_issue(server, &owner, project_id).await?;

    let client = Client::new();
    let res = client
        .post(server.url("/labels"))
        .bearer_auth(&admin.access_token)
        .json(&json!({ "name": common::unique("lbl") }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::CREATED);
    let body: Value = res.json().await?;
    let label_id = body["data"]["id"].as_i64().context("label id")?;
    assert_eq!(body["data"]["color"], "#808080");

    let labels_url = server.url(&format!("/issues/{}/labels", issue_id));
    let label_url = server.url(&format!("/issues/{}/labels/{}", issue_id, label_id));

    // Not linked yet
    let res = client.delete(&label_url).bearer_auth(&owner.access_token).send().await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let res = client
        .post(&labels_url)
        .bearer_auth(&owner.access_token)
        .json(&json!({ "label_id": label_id }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::CREATED);

    let res = client
        .post(&labels_url)
        .bearer_auth(&owner.access_token)
        .json(&json!({ "label_id": label_id }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::CONFLICT);

    let res = client
        .post(&labels_url)
        .bearer_auth(&owner.access_token)
        .json(&json!({ "label_id": i64::from(i32::MAX) }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let res = client.delete(&label_url).bearer_auth(&owner.access_token).send().await?;
    assert_eq!(res.status(), StatusCode::NO_CONTENT);
    Ok(())
}

#[tokio::test]
async fn comment_edits_limited_to_author_and_managers() -> Result<()> {
    let server = common::ensure_server().await?;
    if !common::database_ready(server).await? {
        return Ok(());
    }
    let owner = common::register_and_login(server, "owner", "developer").await?;
    let author = common::register_and_login(server, "author", "developer").await?;
    let other = common::register_and_login(server, "other", "developer").await?;
    let project_id = common::create_project(server, &owner).await?;
    let issue_id = common::create_issue(server, &owner, project_id).await?;
    common::add_member(server, &owner, project_id, author.user_id, "member").await?;
    common::add_member(server, &owner, project_id, other.user_id, "member").await?;

    let client = Client::new();
    let res = client
        .post(server.url(&format!("/issues/{}/comments", issue_id)))
        .bearer_auth(&author.access_token)
        .json(&json!({ "content": "Reproduced on main" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::CREATED);
    let body: Value = res.json().await?;
    let comment_url = server.url(&format!(
        "/comments/{}",
        body["data"]["id"].as_i64().context("comment id")?
    ));

    // Another plain member may neither edit nor delete it
    let res = client
        .put(&comment_url)
        .bearer_auth(&other.access_token)
        .json(&json!({ "content": "Hijacked" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    let res = client.delete(&comment_url).bearer_auth(&other.access_token).send().await?;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    // The author may edit
    let res = client
        .put(&comment_url)
        .bearer_auth(&author.access_token)
        .json(&json!({ "content": "Reproduced on main and 1.2" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await?;
    assert_eq!(body["data"]["content"], "Reproduced on main and 1.2");

    // The project owner may delete
    let res = client.delete(&comment_url).bearer_auth(&owner.access_token).send().await?;
    assert_eq!(res.status(), StatusCode::NO_CONTENT);
    Ok(())
}
