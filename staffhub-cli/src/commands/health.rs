use anyhow::{Context, Result};
use client::ApiClient;
use shared::config::ClientConfig;

/// Probe `GET /health` without requiring a session.
pub async fn run(config: &ClientConfig) -> Result<()> {
    let api = ApiClient::new(config).context("failed to build HTTP client")?;
    let status = api
        .health_check()
        .await
        .with_context(|| format!("API at {} is not healthy", config.api_url))?;
    println!("API at {} is healthy ({status})", config.api_url);
    Ok(())
}
