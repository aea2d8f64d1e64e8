#![allow(dead_code)]

use std::process::{Child, Command, Stdio};
use std::sync::OnceLock;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use issue_tracker::config::AppConfig;
use reqwest::{Client, StatusCode};
use serde_json::{json, Value};

static SERVER: OnceLock<TestServer> = OnceLock::new();

/// Set to make database-backed tests fail instead of skipping when Postgres is unreachable
const REQUIRE_DATABASE_ENV: &str = "ISSUES_TEST_REQUIRE_DATABASE";

pub struct TestServer {
    pub port: u16,
    pub base_url: String,
    child: Child,
}

impl TestServer {
    fn spawn(extra_env: &[(&str, &str)]) -> Result<Self> {
        // Pick an unused port for isolation
        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let base_url = format!("http://127.0.0.1:{}", port);

        // Cargo builds the server binary for integration tests and tells us where it is
        let mut cmd = Command::new(env!("CARGO_BIN_EXE_issue-tracker"));
        cmd.env("APP_ENV", "testing")
            .env("HOST", "127.0.0.1")
            .env("PORT", port.to_string())
            .env("DATABASE_AUTO_MIGRATE", "true")
            // Pin the secret so tests can mint tokens the server accepts
            .env("JWT_SECRET_KEY", jwt_secret())
            .envs(extra_env.iter().copied())
            .stdin(Stdio::null())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit());

        // Inherit environment so the server can see DATABASE_URL from .env (loaded by the server)
        let child = cmd.spawn().context("failed to spawn server binary")?;

        Ok(Self { port, base_url, child })
    }

    async fn wait_ready(&self, timeout: Duration) -> Result<()> {
        let client = Client::new();
        let deadline = Instant::now() + timeout;
        loop {
            if Instant::now() > deadline {
                break;
            }
            if let Ok(resp) = client.get(self.url("/health")).send().await {
                // Degraded (no database) still means the HTTP layer is up
                if resp.status() == StatusCode::OK || resp.status() == StatusCode::SERVICE_UNAVAILABLE {
                    return Ok(());
                }
            }
            tokio::time::sleep(Duration::from_millis(150)).await;
        }
        anyhow::bail!("server did not become ready on {} within {:?}", self.base_url, timeout)
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}/api/v1{}", self.base_url, path)
    }

    /// True when the server reports a reachable database
    pub async fn has_database(&self) -> Result<bool> {
        let resp = Client::new().get(self.url("/health")).send().await?;
        Ok(resp.status() == StatusCode::OK)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        let _ = self.child.kill();
    }
}

/// Shared server for the whole test binary
pub async fn ensure_server() -> Result<&'static TestServer> {
    let server = SERVER.get_or_init(|| TestServer::spawn(&[]).expect("failed to spawn server binary"));
    server.wait_ready(Duration::from_secs(20)).await?;
    Ok(server)
}

/// Dedicated server with extra environment; killed when dropped
pub async fn spawn_server_with(extra_env: &[(&str, &str)]) -> Result<TestServer> {
    let server = TestServer::spawn(extra_env)?;
    server.wait_ready(Duration::from_secs(20)).await?;
    Ok(server)
}

pub fn jwt_secret() -> String {
    AppConfig::testing().security.jwt_secret
}

/// Whether a database-backed test should run. Without Postgres the test is
/// skipped, unless ISSUES_TEST_REQUIRE_DATABASE is set.
pub async fn database_ready(server: &TestServer) -> Result<bool> {
    if server.has_database().await? {
        return Ok(true);
    }
    if std::env::var_os(REQUIRE_DATABASE_ENV).is_some() {
        anyhow::bail!("database unavailable and {} is set", REQUIRE_DATABASE_ENV);
    }
    eprintln!("skipping: database unavailable (set {} to fail instead)", REQUIRE_DATABASE_ENV);
    Ok(false)
}

/// Unique suffix so repeated runs against one database do not collide
pub fn unique(prefix: &str) -> String {
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.subsec_nanos())
        .unwrap_or_default();
    format!("{}_{}_{}", prefix, std::process::id(), nanos)
}

pub async fn error_code(resp: reqwest::Response) -> Result<String> {
    let body: Value = resp.json().await?;
    Ok(body["error"]["code"].as_str().unwrap_or_default().to_string())
}

pub const PASSWORD: &str = "Secret123";

/// A registered, logged-in user
pub struct Session {
    pub user_id: i64,
    pub username: String,
    pub access_token: String,
    pub refresh_token: String,
}

pub async fn register_and_login(server: &TestServer, prefix: &str, role: &str) -> Result<Session> {
    let client = Client::new();
    let username = unique(prefix);

    let res = client
        .post(server.url("/auth/register"))
        .json(&json!({
            "username": username,
            "email": format!("{}@example.com", username),
            "password": PASSWORD,
            "role": role,
        }))
        .send()
        .await?;
    anyhow::ensure!(res.status() == StatusCode::CREATED, "register failed: {}", res.status());
    let body: Value = res.json().await?;
    let user_id = body["data"]["id"].as_i64().context("user id")?;

    let res = client
        .post(server.url("/auth/login"))
        .json(&json!({ "username": username, "password": PASSWORD }))
        .send()
        .await?;
    anyhow::ensure!(res.status() == StatusCode::OK, "login failed: {}", res.status());
    let body: Value = res.json().await?;

    Ok(Session {
        user_id,
        username,
        access_token: body["data"]["access_token"].as_str().context("access token")?.to_string(),
        refresh_token: body["data"]["refresh_token"].as_str().context("refresh token")?.to_string(),
    })
}

/// Create a project owned by `owner` and return its id
pub async fn create_project(server: &TestServer, owner: &Session) -> Result<i64> {
    let res = Client::new()
        .post(server.url("/projects"))
        .bearer_auth(&owner.access_token)
        .json(&json!({ "name": unique("proj") }))
        .send()
        .await?;
    anyhow::ensure!(res.status() == StatusCode::CREATED, "project create failed: {}", res.status());
    let body: Value = res.json().await?;
    body["data"]["id"].as_i64().context("project id")
}

pub async fn add_member(
    server: &TestServer,
    manager: &Session,
    project_id: i64,
    user_id: i64,
    role: &str,
) -> Result<reqwest::Response> {
    Ok(Client::new()
        .post(server.url(&format!("/projects/{}/members", project_id)))
        .bearer_auth(&manager.access_token)
        .json(&json!({ "user_id": user_id, "role": role }))
        .send()
        .await?)
}

/// File an issue as `reporter` and return its id
pub async fn create_issue(server: &TestServer, reporter: &Session, project_id: i64) -> Result<i64> {
    let res = Client::new()
        .post(server.url(&format!("/projects/{}/issues", project_id)))
        .bearer_auth(&reporter.access_token)
        .json(&json!({ "title": "Crash on save" }))
        .send()
        .await?;
    anyhow::ensure!(res.status() == StatusCode::CREATED, "issue create failed: {}", res.status());
    let body: Value = res.json().await?;
    body["data"]["id"].as_i64().context("issue id")
}
