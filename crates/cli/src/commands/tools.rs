//! `actloop tools`: print the capability listing.

use actloop_config::AppConfig;

pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;
    let registry = actloop_tools::default_registry(&config.tools)?;

    println!("{}", registry.describe());
    Ok(())
}
