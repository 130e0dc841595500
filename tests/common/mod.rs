#![allow(dead_code)]

use std::process::{Child, Command, Stdio};
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use reqwest::{header, StatusCode};
use serde_json::Value;

pub const TEST_SECRET: &str = "integration-secret";

/// Server binary on its own port, killed on drop.
pub struct TestServer {
    pub port: u16,
    pub base_url: String,
    pub client: reqwest::Client,
    child: Child,
}

impl TestServer {
    fn spawn() -> Result<Self> {
        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let base_url = format!("http://127.0.0.1:{}", port);

        // DATABASE_URL is inherited from the test environment
        let child = Command::new(env!("CARGO_BIN_EXE_srh-restaurant-api"))
            .env("PORT", port.to_string())
            .env("JWT_SECRET", TEST_SECRET)
            .env("GATE_FOOD_DETAIL", "true")
            .stdin(Stdio::null())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .spawn()
            .context("failed to spawn server binary")?;

        Ok(Self {
            port,
            base_url,
            client: reqwest::Client::new(),
            child,
        })
    }

    async fn wait_ready(&self, timeout: Duration) -> Result<()> {
        let deadline = Instant::now() + timeout;
        while Instant::now() < deadline {
            if let Ok(resp) = self.client.get(self.url("/health")).send().await {
                if resp.status() == StatusCode::OK {
                    return Ok(());
                }
            }
            tokio::time::sleep(Duration::from_millis(150)).await;
        }
        anyhow::bail!("server did not become ready on {} within {:?}", self.base_url, timeout)
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Obtains a token cookie for `email` through the public endpoint.
    pub async fn login(&self, email: &str) -> Result<String> {
        let res = self
            .client
            .post(self.url("/api/v1/create-token"))
            .json(&serde_json::json!({ "email": email }))
            .send()
            .await?;
        anyhow::ensure!(res.status() == StatusCode::OK, "create-token returned {}", res.status());

        let set_cookie = res
            .headers()
            .get(header::SET_COOKIE)
            .context("missing Set-Cookie")?
            .to_str()?;
        let pair = set_cookie.split(';').next().context("empty Set-Cookie")?;
        Ok(pair.to_string())
    }

    pub async fn post_json(&self, path: &str, body: &Value) -> Result<Value> {
        let res = self.client.post(self.url(path)).json(body).send().await?;
        anyhow::ensure!(res.status() == StatusCode::OK, "POST {} returned {}", path, res.status());
        Ok(res.json().await?)
    }

    pub async fn get_json(&self, path: &str, cookie: Option<&str>) -> Result<(StatusCode, Value)> {
        let mut req = self.client.get(self.url(path));
        if let Some(cookie) = cookie {
            req = req.header(header::COOKIE, cookie);
        }
        let res = req.send().await?;
        let status = res.status();
        Ok((status, res.json().await?))
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

/// Starts a server, or returns `None` when no database is configured.
pub async fn server() -> Result<Option<TestServer>> {
    if std::env::var("DATABASE_URL").map(|v| v.trim().is_empty()).unwrap_or(true) {
        eprintln!("DATABASE_URL not set; skipping integration test");
        return Ok(None);
    }
    let server = TestServer::spawn()?;
    server.wait_ready(Duration::from_secs(15)).await?;
    Ok(Some(server))
}

/// Short unique suffix so concurrent tests do not see each other's rows.
pub fn unique(prefix: &str) -> String {
    format!("{}-{}", prefix, &uuid::Uuid::new_v4().simple().to_string()[..8])
}
