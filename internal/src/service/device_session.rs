use std::sync::Arc;

use log::{debug, info, warn};

use crate::{
    domain::{
        command::{DeviceAction, DeviceCommand},
        device::{Color, DeviceIdentity},
        error::SessionError,
    },
    port::device::{DeviceConnectionDrivenPort, DeviceConnectorDrivenPort},
};

/// Exclusive owner of the connection to one controller.
///
/// Setters make a single attempt and report `ConnectionLost` on failure,
/// recovering is left to the caller through [`DeviceSession::reconnect`].
pub struct DeviceSession<C: DeviceConnectorDrivenPort> {
    identity: DeviceIdentity,
    connector: Arc<C>,
    connection: C::Connection,
    last_error: Option<SessionError>,
}

impl<C: DeviceConnectorDrivenPort> DeviceSession<C> {
    pub async fn open(identity: DeviceIdentity, connector: Arc<C>) -> Result<Self, SessionError> {
        let connection = Self::connect(&identity, &connector).await?;
        info!("Session opened for {identity}");
        Ok(DeviceSession {
            identity,
            connector,
            connection,
            last_error: None,
        })
    }

    pub async fn set_power(&mut self, on: bool) -> Result<(), SessionError> {
        let result = self.connection.set_power(on).await;
        self.record(result)
    }

    pub async fn set_color(&mut self, color: Color) -> Result<(), SessionError> {
        let result = self.connection.set_color(color).await;
        self.record(result)
    }

    /// Applies a translated command once. `NoMatch` never reaches the device.
    pub async fn apply(&mut self, command: &DeviceCommand) -> Result<(), SessionError> {
        match command.action() {
            Some(DeviceAction::SetPower(on)) => self.set_power(on).await,
            Some(DeviceAction::SetColor(color)) => self.set_color(color).await,
            None => Ok(()),
        }
    }

    /// Opens a fresh connection, then closes and replaces the old one.
    /// The old handle is kept when the new connection cannot be opened.
    pub async fn reconnect(&mut self) -> Result<(), SessionError> {
        warn!("Connection to {} lost. Reconnecting ...", self.identity);
        let fresh = match Self::connect(&self.identity, &self.connector).await {
            Ok(connection) => connection,
            Err(e) => {
                self.last_error = Some(e.clone());
                return Err(e);
            }
        };
        let stale = std::mem::replace(&mut self.connection, fresh);
        if let Err(e) = stale.close().await {
            debug!("Closing stale connection to {} failed: {e}", self.identity);
        }
        info!("Reconnected to {}", self.identity);
        Ok(())
    }

    pub async fn close(self) {
        match self.connection.close().await {
            Ok(()) => info!("Session closed for {}", self.identity),
            Err(e) => warn!("Unable to close session for {}: {e}", self.identity),
        }
    }

    pub fn identity(&self) -> &DeviceIdentity {
        &self.identity
    }

    pub fn last_error(&self) -> Option<&SessionError> {
        self.last_error.as_ref()
    }

    async fn connect(identity: &DeviceIdentity, connector: &C) -> Result<C::Connection, SessionError> {
        connector
            .open(identity)
            .await
            .map_err(|err| SessionError::DeviceConnect {
                device: identity.name.clone(),
                reason: format!("{:#}", err),
            })
    }

    fn record(&mut self, result: anyhow::Result<()>) -> Result<(), SessionError> {
        result.map_err(|err| {
            let err = SessionError::ConnectionLost {
                device: self.identity.name.clone(),
                reason: format!("{:#}", err),
            };
            self.last_error = Some(err.clone());
            err
        })
    }
}
