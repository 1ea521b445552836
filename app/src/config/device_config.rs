use std::{net::IpAddr, time::Duration};

use internal::domain::device::{DEFAULT_DEVICE_PORT, DeviceIdentity};
use serde::Deserialize;

#[derive(Deserialize, Debug, Clone)]
pub struct ControllerConfig {
    pub name: String,
    pub address: IpAddr,
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_port() -> u16 {
    DEFAULT_DEVICE_PORT
}

impl ControllerConfig {
    pub fn identity(&self) -> DeviceIdentity {
        DeviceIdentity::new(self.name.clone(), self.address, self.port)
    }
}

/// Timeouts applied to every controller connection.
#[derive(Deserialize, Debug, Default, Clone)]
pub struct DeviceConfig {
    connect_timeout_ms: Option<u64>,
    write_timeout_ms: Option<u64>,
}

impl DeviceConfig {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms.unwrap_or(3000))
    }

    pub fn write_timeout(&self) -> Duration {
        Duration::from_millis(self.write_timeout_ms.unwrap_or(3000))
    }
}
