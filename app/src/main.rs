mod config;
mod inbound;
mod mqtt_client;
mod outbound;

use std::{env, sync::Arc};

use anyhow::Result;
use config::app_config::AppConfig;
use inbound::mqtt::{MqttConsumer, MqttSubscriber};
use internal::service::{message_dispatcher::MessageDispatcher, session_registry::SessionRegistry};
use log::{error, info};
use mqtt_client::MqttClient;
use outbound::magic_home::MagicHomeConnector;
use tokio::signal::unix::{SignalKind, signal};

const DEFAULT_CONFIG_PATH: &str = "config.toml";

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let config_path = env::args().nth(1).unwrap_or_else(|| DEFAULT_CONFIG_PATH.into());
    let conf = AppConfig::load(&config_path).inspect_err(|e| error!("{e:#}"))?;
    info!("broker: {}:{}", conf.mqtt.host, conf.mqtt.port);

    let mqtt = MqttClient {
        client_config: conf.mqtt.clone(),
    };
    let (client, event_loop) = mqtt
        .connect(conf.controllers.len())
        .await
        .inspect_err(|e| error!("{e:#}"))?;

    let identities = conf.identities();
    for identity in &identities {
        info!("   magic home controller: {identity}");
    }
    let connector = Arc::new(MagicHomeConnector::new(&conf.devices));
    let subscriber = MqttSubscriber::new(client.clone());
    let registry = SessionRegistry::start(identities, connector, &subscriber)
        .await
        .inspect_err(|e| error!("{e}"))?;
    let dispatcher = MessageDispatcher::new(registry);

    info!("BEGIN");
    let mut consumer = MqttConsumer::new(event_loop);
    let mut terminate = signal(SignalKind::terminate())?;
    consumer
        .run(&dispatcher, async {
            tokio::select! {
                _ = tokio::signal::ctrl_c() => info!("Got signal: interrupt"),
                _ = terminate.recv() => info!("Got signal: terminated"),
            }
        })
        .await;
    info!("END");

    dispatcher.shutdown().await;
    mqtt.disconnect(client, consumer.into_event_loop()).await;
    Ok(())
}
