use std::time::Duration;

use anyhow::{Context, Result};
use internal::{
    domain::device::{Color, DeviceIdentity},
    port::device::{DeviceConnectionDrivenPort, DeviceConnectorDrivenPort},
};
use log::debug;
use tokio::{io::AsyncWriteExt, net::TcpStream, time::timeout};

use crate::config::device_config::DeviceConfig;

const POWER_ON: [u8; 3] = [0x71, 0x23, 0x0f];
const POWER_OFF: [u8; 3] = [0x71, 0x24, 0x0f];
const SET_COLOR: u8 = 0x31;
const PERSIST: [u8; 2] = [0x00, 0x0f];

/// Opens TCP connections to Magic Home (LEDENET) controllers.
pub struct MagicHomeConnector {
    connect_timeout: Duration,
    write_timeout: Duration,
}

impl MagicHomeConnector {
    pub fn new(config: &DeviceConfig) -> Self {
        MagicHomeConnector {
            connect_timeout: config.connect_timeout(),
            write_timeout: config.write_timeout(),
        }
    }
}

impl DeviceConnectorDrivenPort for MagicHomeConnector {
    type Connection = MagicHomeConnection;

    async fn open(&self, identity: &DeviceIdentity) -> Result<MagicHomeConnection> {
        let address = identity.socket_addr();
        let stream = timeout(self.connect_timeout, TcpStream::connect(address))
            .await
            .with_context(|| format!("Timed out connecting to {address}"))?
            .with_context(|| format!("Unable to connect to {address}"))?;
        stream.set_nodelay(true)?;
        debug!("Connected to magic home controller {identity}");
        Ok(MagicHomeConnection {
            stream,
            write_timeout: self.write_timeout,
        })
    }
}

pub struct MagicHomeConnection {
    stream: TcpStream,
    write_timeout: Duration,
}

impl MagicHomeConnection {
    async fn send(&mut self, frame: Vec<u8>) -> Result<()> {
        timeout(self.write_timeout, self.stream.write_all(&frame))
            .await
            .context("Timed out writing to controller")?
            .context("Unable to write to controller")
    }
}

impl DeviceConnectionDrivenPort for MagicHomeConnection {
    async fn set_power(&mut self, on: bool) -> Result<()> {
        self.send(power_frame(on)).await
    }

    async fn set_color(&mut self, color: Color) -> Result<()> {
        self.send(color_frame(color)).await
    }

    async fn close(mut self) -> Result<()> {
        self.stream.shutdown().await.context("Unable to close controller connection")
    }
}

pub fn power_frame(on: bool) -> Vec<u8> {
    with_checksum(if on { &POWER_ON } else { &POWER_OFF })
}

pub fn color_frame(color: Color) -> Vec<u8> {
    let mut body = vec![SET_COLOR, color.r, color.g, color.b, color.w];
    body.extend_from_slice(&PERSIST);
    with_checksum(&body)
}

// Frames end with the sum of their bytes, truncated to one byte.
fn with_checksum(body: &[u8]) -> Vec<u8> {
    let checksum = body.iter().fold(0u8, |sum, byte| sum.wrapping_add(*byte));
    let mut frame = body.to_vec();
    frame.push(checksum);
    frame
}
