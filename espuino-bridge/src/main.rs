use anyhow::{Context, Result};
use clap::Parser;
use rumqttc::AsyncClient;
use tracing::info;

use espuino_bridge::{init_logging_from_env, Args, Bridge, BridgeConfig};

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    init_logging_from_env().context("Failed to initialize logging")?;

    let config = BridgeConfig::try_from(args).context("Invalid configuration")?;
    info!(
        "Connecting to {}:{} as {}",
        config.mqtt_host, config.mqtt_port, config.mqtt_client_id
    );

    let (client, eventloop) = AsyncClient::new(config.mqtt_options(), config.channel_capacity);
    let bridge = Bridge::new(&config, client);

    bridge
        .run(eventloop, config.reconnect_delay)
        .await
        .context("Bridge stopped with an error")?;

    Ok(())
}
