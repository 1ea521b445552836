use crate::domain::device::{Color, DeviceIdentity};

/// Opens connections to physical controllers.
pub trait DeviceConnectorDrivenPort {
    type Connection: DeviceConnectionDrivenPort + Send + 'static;

    fn open(&self, identity: &DeviceIdentity) -> impl Future<Output = anyhow::Result<Self::Connection>> + Send;
}

/// One live connection. Every call is a single attempt, errors mean the link is unusable.
pub trait DeviceConnectionDrivenPort {
    fn set_power(&mut self, on: bool) -> impl Future<Output = anyhow::Result<()>> + Send;
    fn set_color(&mut self, color: Color) -> impl Future<Output = anyhow::Result<()>> + Send;
    fn close(self) -> impl Future<Output = anyhow::Result<()>> + Send;
}
