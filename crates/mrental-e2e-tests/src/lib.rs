use std::{path::Path, time::Duration};

use anyhow::{Result, anyhow};
use mrental_server::config::{Parser, ServerConfig};
use rand::Rng as _;
use reqwest::{
    Url,
    header::{AUTHORIZATION, HeaderMap, HeaderValue},
};
use serde_json::json;
use tempfile::TempDir;
use tracing::{debug, info};

pub mod rest;

pub const TEST_PASSWORD: &str = "Secret#123";

fn random_port() -> Result<u16> {
    let mut rng = rand::rng();

    let mut retries = 3;
    while retries > 0 {
        let port: u16 = rng.random_range(3030..4030);
        let addr: std::net::SocketAddr = format!("127.0.0.1:{}", port).parse()?;
        match std::net::TcpStream::connect_timeout(&addr, std::time::Duration::from_millis(100)) {
            Err(e) if e.kind() == std::io::ErrorKind::ConnectionRefused => return Ok(port),
            Err(_) => retries -= 1,
            Ok(_) => retries -= 1,
        }
    }

    Err(anyhow!("Could not find a free port"))
}

pub struct ConfigGuard {
    #[allow(dead_code)]
    data_dir: TempDir,
}

pub fn test_config(test_name: &str, base_dir: &Path) -> Result<(ServerConfig, ConfigGuard)> {
    let tmp_data_dir = TempDir::with_prefix_in(format!("{}_", test_name), base_dir)?;
    let data_dir = tmp_data_dir.path().to_string_lossy().to_string();
    let port = random_port()?;
    let port = port.to_string();
    let args = &[
        "mrental-e2e-tests",
        "--data-dir",
        &data_dir,
        "--port",
        &port,
        "--token-hours",
        "0.5",
    ];
    let config = ServerConfig::try_parse_from(args)?;
    Ok((
        config,
        ConfigGuard {
            data_dir: tmp_data_dir,
        },
    ))
}

/// Config in fresh temporary data directory, removed when guard is dropped
pub async fn prepare_env(test_name: &str) -> Result<(ServerConfig, ConfigGuard)> {
    let base_dir = std::env::temp_dir();
    test_config(test_name, &base_dir)
}

pub fn base_url(config: &ServerConfig) -> Result<Url> {
    let url = Url::parse(&format!("http://127.0.0.1:{}/", config.port))?;
    Ok(url)
}

/// Starts server in background task and waits until it answers health check
pub async fn spawn_server(args: ServerConfig) -> Result<()> {
    let health_url = base_url(&args)?.join("health")?;
    let state = mrental_server::build_state(&args).await?;
    tokio::spawn(async move {
        if let Err(e) =
            mrental_server::run_graceful_with_state(args, state, futures::future::pending()).await
        {
            tracing::error!("Server failed: {e}");
        }
    });

    let client = reqwest::Client::new();
    for _ in 0..50 {
        match client.get(health_url.clone()).send().await {
            Ok(response) if response.status().is_success() => {
                info!("Server is up at {health_url}");
                return Ok(());
            }
            Ok(response) => debug!("Health check returned {}", response.status()),
            Err(e) => debug!("Server not ready yet: {e}"),
        }
        tokio::time::sleep(Duration::from_millis(100)).await;
    }
    Err(anyhow!("Server did not start in time"))
}

/// Registers new account and returns its bearer token
pub async fn register_user(base_url: &Url, email: &str, password: &str) -> Result<String> {
    let url = base_url.join("api/v1/autorizacao/registrar")?;
    let response = reqwest::Client::new()
        .post(url)
        .json(&json!({"email": email, "password": password}))
        .send()
        .await?;
    if !response.status().is_success() {
        return Err(anyhow!("Registration failed: {}", response.status()));
    }
    let envelope: serde_json::Value = response.json().await?;
    envelope["token"]
        .as_str()
        .map(|t| t.to_string())
        .ok_or_else(|| anyhow!("No token in response"))
}

pub fn authenticated_client(token: &str) -> Result<reqwest::Client> {
    let mut headers = HeaderMap::new();
    headers.insert(AUTHORIZATION, HeaderValue::from_str(&format!("Bearer {token}"))?);
    let client = reqwest::Client::builder().default_headers(headers).build()?;
    Ok(client)
}

/// Server running with registered user, returns base url, authorized client and config guard
pub async fn launch_env(test_name: &str) -> Result<(Url, reqwest::Client, ConfigGuard)> {
    let (args, config_guard) = prepare_env(test_name).await?;
    let base_url = base_url(&args)?;
    spawn_server(args).await?;
    let token = register_user(&base_url, "admin@example.com", TEST_PASSWORD).await?;
    let client = authenticated_client(&token)?;
    Ok((base_url, client, config_guard))
}
