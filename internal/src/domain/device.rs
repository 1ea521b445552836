use std::{
    fmt::{Display, Formatter},
    net::{IpAddr, SocketAddr},
};

pub const DEFAULT_DEVICE_PORT: u16 = 5577;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceIdentity {
    pub name: String,
    pub address: IpAddr,
    pub port: u16,
}

impl DeviceIdentity {
    pub fn new(name: impl Into<String>, address: IpAddr, port: u16) -> Self {
        DeviceIdentity {
            name: name.into(),
            address,
            port,
        }
    }

    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.address, self.port)
    }
}

impl Display for DeviceIdentity {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.name, self.socket_addr())
    }
}

/// Channel values sent to a controller. `w` is the dedicated white channel.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub w: u8,
}

impl Color {
    pub fn new(r: u8, g: u8, b: u8, w: u8) -> Self {
        Color { r, g, b, w }
    }

    /// Monochrome brightness: every colour channel at `level`, white off.
    pub fn monochrome(level: u8) -> Self {
        Color::new(level, level, level, 0)
    }
}
