use std::time::Duration;

use anyhow::Context;
use internal::{
    domain::message::InboundMessage,
    port::{
        broker::TopicSubscriberDrivenPort,
        dispatch::{Dispatch, MessageDispatcherDriverPort},
    },
};
use log::{debug, error, info, trace, warn};
use rumqttc::{AsyncClient, Event, EventLoop, Packet, Publish, QoS};

const RETRY_DELAY: Duration = Duration::from_secs(1);

pub struct MqttSubscriber {
    client: AsyncClient,
}

impl MqttSubscriber {
    pub fn new(client: AsyncClient) -> Self {
        MqttSubscriber { client }
    }
}

impl TopicSubscriberDrivenPort for MqttSubscriber {
    fn subscribe(&self, filter: String) -> anyhow::Result<()> {
        self.client
            .try_subscribe(filter.as_str(), QoS::AtLeastOnce)
            .with_context(|| format!("Unable to queue subscription to {filter}"))
    }
}

/// Polls the broker connection and hands every PUBLISH to the dispatcher.
pub struct MqttConsumer {
    event_loop: EventLoop,
}

impl MqttConsumer {
    pub fn new(event_loop: EventLoop) -> Self {
        MqttConsumer { event_loop }
    }

    /// Runs until `shutdown` resolves. Broker errors are logged, the event
    /// loop reconnects on the next poll.
    pub async fn run(&mut self, dispatcher: &impl MessageDispatcherDriverPort, shutdown: impl Future<Output = ()>) {
        tokio::pin!(shutdown);
        loop {
            tokio::select! {
                _ = &mut shutdown => return,
                event = self.event_loop.poll() => match event {
                    Ok(Event::Incoming(Packet::Publish(publish))) => Self::forward(dispatcher, publish).await,
                    Ok(Event::Incoming(Packet::ConnAck(_))) => info!("Connected"),
                    Ok(Event::Incoming(Packet::Disconnect)) => warn!("Broker closed the connection"),
                    Ok(event) => trace!("{event:?}"),
                    Err(e) => {
                        warn!("Connect lost: {e}");
                        tokio::time::sleep(RETRY_DELAY).await;
                    }
                },
            }
        }
    }

    pub fn into_event_loop(self) -> EventLoop {
        self.event_loop
    }

    async fn forward(dispatcher: &impl MessageDispatcherDriverPort, publish: Publish) {
        let message = Self::to_message(publish);
        debug!("Received message: {message:?}");
        match dispatcher.dispatch(message).await {
            Ok(Dispatch::Queued { device }) => trace!("Queued for {device}"),
            Ok(Dispatch::Ignored) => {}
            Err(e) => error!("{e}"),
        }
    }

    fn to_message(publish: Publish) -> InboundMessage {
        InboundMessage::new(publish.topic, publish.payload.to_vec())
    }
}
