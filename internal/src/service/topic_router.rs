use log::{debug, warn};

use crate::{
    domain::{
        command::DeviceCommand,
        error::{RegistryError, RouteError, SessionError},
        message::{InboundMessage, TopicPath},
    },
    port::{broker::TopicSubscriberDrivenPort, device::DeviceConnectorDrivenPort},
    service::{device_session::DeviceSession, translator},
};

#[derive(Debug, PartialEq, Eq)]
pub enum Routed {
    Applied(DeviceCommand),
    /// Applied on a fresh connection after the first attempt lost the link.
    Recovered(DeviceCommand),
    Ignored,
}

/// Binds the `light/<name>/#` namespace of one device to its session.
pub struct TopicRouter<C: DeviceConnectorDrivenPort> {
    device_name: String,
    session: DeviceSession<C>,
}

impl<C: DeviceConnectorDrivenPort> TopicRouter<C> {
    pub fn bind(
        device_name: &str, session: DeviceSession<C>, subscriber: &impl TopicSubscriberDrivenPort,
    ) -> Result<Self, RegistryError> {
        let filter = TopicPath::subscription_filter(device_name);
        subscriber
            .subscribe(filter.clone())
            .map_err(|err| RegistryError::Subscribe {
                filter: filter.clone(),
                reason: format!("{:#}", err),
            })?;
        debug!("Subscribed {filter} for {}", session.identity());
        Ok(TopicRouter {
            device_name: device_name.into(),
            session,
        })
    }

    pub async fn route(&mut self, message: &InboundMessage) -> Result<Routed, RouteError> {
        if message.path().is_none_or(|path| path.device_name != self.device_name) {
            return Ok(Routed::Ignored);
        }
        let command = translator::translate(&message.topic, &message.payload)?;
        if command == DeviceCommand::NoMatch {
            return Ok(Routed::Ignored);
        }
        match self.session.apply(&command).await {
            Ok(()) => Ok(Routed::Applied(command)),
            Err(SessionError::ConnectionLost { reason, .. }) => {
                warn!("{} failed on {}: {reason}", command.name(), self.device_name);
                self.session.reconnect().await?;
                self.session.apply(&command).await?;
                Ok(Routed::Recovered(command))
            }
            Err(e) => Err(e.into()),
        }
    }

    pub fn device_name(&self) -> &str {
        &self.device_name
    }

    pub async fn close(self) {
        self.session.close().await
    }
}
