use log::trace;
use tokio::sync::mpsc::error::TrySendError;

use crate::{
    domain::{error::DispatchError, message::InboundMessage},
    port::dispatch::{Dispatch, MessageDispatcherDriverPort},
    service::session_registry::SessionRegistry,
};

/// Entry point for every message delivered by the broker.
///
/// Hand-off never waits on a device worker: a device whose queue is full
/// loses the message instead of holding up the broker connection.
pub struct MessageDispatcher {
    registry: SessionRegistry,
}

impl MessageDispatcherDriverPort for MessageDispatcher {
    async fn dispatch(&self, message: InboundMessage) -> Result<Dispatch, DispatchError> {
        let Some(device) = message.path().map(|path| path.device_name.to_owned()) else {
            trace!("{} is outside of the light namespace", message.topic);
            return Ok(Dispatch::Ignored);
        };
        let Some(queue) = self.registry.queue(&device) else {
            trace!("No device named {device}, {} ignored", message.topic);
            return Ok(Dispatch::Ignored);
        };
        match queue.try_send(message) {
            Ok(()) => Ok(Dispatch::Queued { device }),
            Err(TrySendError::Full(_)) => Err(DispatchError::QueueFull(device)),
            Err(TrySendError::Closed(_)) => Err(DispatchError::WorkerGone(device)),
        }
    }
}

impl MessageDispatcher {
    pub fn new(registry: SessionRegistry) -> Self {
        MessageDispatcher { registry }
    }

    pub async fn shutdown(self) {
        self.registry.shutdown().await
    }
}
