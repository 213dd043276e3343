pub mod rest;

use anyhow::{Result, anyhow};
use mms_server::config::{Parser, ServerConfig};
use rand::Rng as _;
use reqwest::Url;
use tempfile::TempDir;

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

pub fn prepare_env(test_name: &str) -> Result<(ServerConfig, Url, ConfigGuard)> {
    let tmp_data_dir = TempDir::with_prefix(format!("{}_", test_name))?;
    let data_dir = tmp_data_dir.path().to_string_lossy().to_string();
    let port = random_port()?;
    let port_arg = port.to_string();
    let args = &[
        "mms-e2e-tests",
        "--data-dir",
        &data_dir,
        "--port",
        &port_arg,
    ];
    let config = ServerConfig::try_parse_from(args)?;
    let base_url = Url::parse(&format!("http://localhost:{}/", port))?;
    Ok((
        config,
        base_url,
        ConfigGuard {
            data_dir: tmp_data_dir,
        },
    ))
}

/// Starts the server on a background task and waits until its health
/// endpoint answers.
pub async fn launch_env(args: ServerConfig, base_url: &Url) -> Result<reqwest::Client> {
    let state = mms_server::build_state(&args).await?;
    tokio::spawn(async move {
        if let Err(e) = mms_server::run::run_with_state(args, state).await {
            tracing::error!("Server failed: {e}");
        }
    });

    let client = reqwest::Client::new();
    let health_url = base_url.join("health")?;
    for _ in 0..50 {
        if let Ok(response) = client.get(health_url.clone()).send().await {
            if response.status().is_success() {
                return Ok(client);
            }
        }
        tokio::time::sleep(std::time::Duration::from_millis(100)).await;
    }

    Err(anyhow!("Server did not become healthy"))
}

pub fn extend_url(url: &Url, id: i64) -> Url {
    let mut url = url.clone();
    url.path_segments_mut()
        .expect("URL cannot be a base")
        .push(&id.to_string());
    url
}
