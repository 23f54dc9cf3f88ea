//! Test server management.
//!
//! Spawns relayd instances for integration testing and wraps the HTTP
//! directory API.

use super::client::TestClient;
use serde_json::{Value, json};
use std::path::PathBuf;
use std::process::{Child, Command, Stdio};
use std::time::Duration;
use tokio::time::{Instant, sleep};

/// A test server instance.
pub struct TestServer {
    child: Child,
    port: u16,
    data_dir: PathBuf,
    http: reqwest::Client,
}

impl TestServer {
    /// Spawn a relay with the default test configuration.
    pub async fn spawn(port: u16) -> anyhow::Result<Self> {
        Self::spawn_with(port, "").await
    }

    /// Spawn a relay, appending `extra` TOML sections to the test config.
    pub async fn spawn_with(port: u16, extra: &str) -> anyhow::Result<Self> {
        let data_dir = std::env::temp_dir().join(format!("relayd-test-{port}"));
        std::fs::create_dir_all(&data_dir)?;

        let config_path = data_dir.join("config.toml");
        let config_content = format!(
            r#"
[server]
name = "relay.test"
metrics_port = 0

[listen]
address = "127.0.0.1:{port}"

[log]
level = "warn"

{extra}
"#
        );
        std::fs::write(&config_path, config_content)?;

        let child = Command::new(env!("CARGO_BIN_EXE_relayd"))
            .arg(&config_path)
            .stdout(Stdio::null())
            .spawn()?;

        let server = Self {
            child,
            port,
            data_dir,
            http: reqwest::Client::new(),
        };
        server.wait_until_ready().await?;
        Ok(server)
    }

    /// Wait until the server is accepting connections.
    async fn wait_until_ready(&self) -> anyhow::Result<()> {
        for _ in 0..50 {
            if tokio::net::TcpStream::connect(("127.0.0.1", self.port))
                .await
                .is_ok()
            {
                return Ok(());
            }
            sleep(Duration::from_millis(100)).await;
        }
        anyhow::bail!("Server failed to start within 5 seconds")
    }

    /// Get the server address.
    pub fn address(&self) -> String {
        format!("127.0.0.1:{}", self.port)
    }

    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.address(), path)
    }

    pub fn ws_url(&self, group: &str, user: &str) -> String {
        format!("ws://{}/groups/{}/ws?userId={}", self.address(), group, user)
    }

    /// Open a session for `user` in `group`.
    pub async fn connect(&self, group: &str, user: &str) -> anyhow::Result<TestClient> {
        TestClient::connect(&self.ws_url(group, user)).await
    }

    /// POST a JSON body, returning status and decoded response body.
    pub async fn post_json(&self, path: &str, body: Value) -> anyhow::Result<(u16, Value)> {
        let resp = self.http.post(self.url(path)).json(&body).send().await?;
        let status = resp.status().as_u16();
        Ok((status, resp.json().await?))
    }

    /// POST a raw body with a JSON content type.
    pub async fn post_raw(&self, path: &str, body: &'static str) -> anyhow::Result<(u16, Value)> {
        let resp = self
            .http
            .post(self.url(path))
            .header("content-type", "application/json")
            .body(body)
            .send()
            .await?;
        let status = resp.status().as_u16();
        Ok((status, resp.json().await?))
    }

    /// POST with no body.
    pub async fn post(&self, path: &str) -> anyhow::Result<(u16, Value)> {
        let resp = self.http.post(self.url(path)).send().await?;
        let status = resp.status().as_u16();
        Ok((status, resp.json().await?))
    }

    pub async fn get(&self, path: &str) -> anyhow::Result<(u16, Value)> {
        let resp = self.http.get(self.url(path)).send().await?;
        let status = resp.status().as_u16();
        Ok((status, resp.json().await?))
    }

    pub async fn create_group(&self, id: &str, name: &str) -> anyhow::Result<()> {
        let (status, body) = self.post_json("/groups", json!({"id": id, "name": name})).await?;
        anyhow::ensure!(status == 201, "create_group {id}: {status} {body}");
        Ok(())
    }

    pub async fn register_user(&self, id: &str, name: &str) -> anyhow::Result<()> {
        let (status, body) = self.post_json("/users", json!({"id": id, "name": name})).await?;
        anyhow::ensure!(status == 201, "register_user {id}: {status} {body}");
        Ok(())
    }

    pub async fn add_member(&self, group: &str, user: &str) -> anyhow::Result<()> {
        let (status, body) = self.post(&format!("/groups/{group}/users/{user}")).await?;
        anyhow::ensure!(status == 200, "add_member {group}/{user}: {status} {body}");
        Ok(())
    }

    /// Create a group, register each user, and add them all as members.
    pub async fn seed(&self, group: &str, users: &[&str]) -> anyhow::Result<()> {
        self.create_group(group, group).await?;
        for user in users {
            self.register_user(user, user).await?;
            self.add_member(group, user).await?;
        }
        Ok(())
    }

    /// User ids with a live session in `group`, sorted.
    pub async fn sessions(&self, group: &str) -> anyhow::Result<Vec<String>> {
        let (status, body) = self.get(&format!("/groups/{group}")).await?;
        anyhow::ensure!(status == 200, "get_group {group}: {status} {body}");
        Ok(serde_json::from_value(body["sessions"].clone())?)
    }

    /// Poll until the live sessions of `group` are exactly `expected`.
    ///
    /// Registration happens after the upgrade response, so a client can be
    /// connected before the relay has attached it.
    pub async fn wait_for_sessions(&self, group: &str, expected: &[&str]) -> anyhow::Result<()> {
        self.wait_for_sessions_within(group, expected, Duration::from_secs(5))
            .await
    }

    pub async fn wait_for_sessions_within(
        &self,
        group: &str,
        expected: &[&str],
        limit: Duration,
    ) -> anyhow::Result<()> {
        let deadline = Instant::now() + limit;
        loop {
            let live = self.sessions(group).await?;
            if live == expected {
                return Ok(());
            }
            if Instant::now() >= deadline {
                anyhow::bail!("sessions in {group}: expected {expected:?}, got {live:?}");
            }
            sleep(Duration::from_millis(25)).await;
        }
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
        let _ = std::fs::remove_dir_all(&self.data_dir);
    }
}
