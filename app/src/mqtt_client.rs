use anyhow::{Context, Result, bail};
use log::{debug, info, warn};
use rumqttc::{AsyncClient, ConnectReturnCode, Event, EventLoop, Outgoing, Packet};
use tokio::time::{Instant, timeout_at};

use crate::config::mqtt_config::MqttConfig;

/// Requests the client can queue before the event loop drains them.
const BASE_CAPACITY: usize = 10;

pub struct MqttClient {
    pub client_config: MqttConfig,
}

impl MqttClient {
    /// Connects and waits for the broker to accept the session.
    ///
    /// `subscriptions` sizes the request queue so that every device filter can
    /// be queued before the event loop is polled again.
    pub async fn connect(&self, subscriptions: usize) -> Result<(AsyncClient, EventLoop)> {
        let (client, mut event_loop) = AsyncClient::new(self.client_config.options(), BASE_CAPACITY + subscriptions);
        loop {
            let event = event_loop.poll().await.with_context(|| {
                format!(
                    "Cannot connect to mqtt broker {}:{}",
                    self.client_config.host, self.client_config.port
                )
            })?;
            match event {
                Event::Incoming(Packet::ConnAck(ack)) if ack.code == ConnectReturnCode::Success => {
                    info!("Connected");
                    return Ok((client, event_loop));
                }
                Event::Incoming(Packet::ConnAck(ack)) => bail!("Broker refused the connection: {:?}", ack.code),
                other => debug!("Waiting for CONNACK, got {other:?}"),
            }
        }
    }

    /// Sends DISCONNECT and drives the event loop until it is flushed or the grace period ends.
    pub async fn disconnect(&self, client: AsyncClient, mut event_loop: EventLoop) {
        if let Err(e) = client.disconnect().await {
            warn!("Unable to request broker disconnect: {e}");
            return;
        }
        let deadline = Instant::now() + self.client_config.disconnect_grace();
        loop {
            match timeout_at(deadline, event_loop.poll()).await {
                Ok(Ok(Event::Outgoing(Outgoing::Disconnect))) => {
                    info!("Disconnected from broker");
                    return;
                }
                Ok(Ok(_)) => continue,
                Ok(Err(e)) => {
                    debug!("Event loop stopped while disconnecting: {e}");
                    return;
                }
                Err(_) => {
                    warn!("Broker disconnect did not complete within the grace period");
                    return;
                }
            }
        }
    }
}
