//! `actloop gateway`: start the HTTP API server.

use actloop_config::AppConfig;

pub async fn run(port_override: Option<u16>) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;

    if let Some(port) = port_override {
        config.gateway.port = port;
    }

    if !config.has_api_key() {
        return Err("No API key found. Set ACTLOOP_API_KEY or run `actloop onboard`.".into());
    }

    println!("actloop gateway");
    println!("   Listening: http://{}:{}", config.gateway.host, config.gateway.port);
    println!("   Workspace: {}", config.tools.workspace.display());

    actloop_gateway::start(config).await?;

    Ok(())
}
