use std::fs::File;
use std::io::Read as _;
use std::time::Duration;

use anyhow::{Context as _, Result};
use btleplug::api::Manager as _;
use btleplug::platform::Manager;
use clap::Parser;
use log::info;

mod beacon;
mod config;
mod manager;
mod mqtt;
mod presenter;

#[derive(Parser, Debug)]
#[command(version, about = "Ranges a single beacon region and publishes its presentation state")]
struct Args {
    /// Path to the TOML config file
    #[arg(short, long, default_value = "config.toml")]
    config: std::path::PathBuf,
}

#[tokio::main]
async fn main() -> Result<()> {
    pretty_env_logger::init();
    let args = Args::parse();

    let mut file = File::open(&args.config)
        .with_context(|| format!("opening config file {}", args.config.display()))?;
    let mut config_contents = String::new();
    file.read_to_string(&mut config_contents)?;

    let config: config::AppConfig = toml::de::from_str(&config_contents)?;
    info!("Beacon region: {:?}", config.beacon);

    let (mqtt_client, eventloop) = mqtt::MqttClient::new(&config.mqtt);

    let bt_manager = Manager::new().await?;

    // get the first bluetooth adapter
    let adapters = bt_manager.adapters().await?;
    let central = adapters
        .into_iter()
        .next()
        .context("no bluetooth adapter available")?;

    let core = manager::Manager::new(
        central,
        config.beacon,
        config.environment_factor(),
        Duration::from_secs(config.ranging_interval_seconds()),
        mqtt_client,
        eventloop,
    );
    core.run_loop().await?;

    Ok(())
}
