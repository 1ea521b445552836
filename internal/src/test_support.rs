use std::{
    net::{IpAddr, Ipv4Addr},
    sync::{Arc, Mutex},
};

use anyhow::bail;

use crate::{
    domain::device::{Color, DeviceIdentity},
    port::device::{DeviceConnectionDrivenPort, DeviceConnectorDrivenPort},
};

pub fn identity(name: &str) -> DeviceIdentity {
    DeviceIdentity::new(name, IpAddr::V4(Ipv4Addr::new(10, 0, 0, 5)), 5577)
}

/// A device call, tagged with the id of the connection it went through.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeviceCall {
    Power(usize, bool),
    Color(usize, Color),
}

#[derive(Default)]
struct FakeState {
    open_attempts: usize,
    connections: usize,
    refused_opens: usize,
    unreachable: Vec<String>,
    stalled: Vec<String>,
    failing_commands: usize,
    panicking_commands: usize,
    calls: Vec<(String, DeviceCall)>,
    closed: Vec<usize>,
}

/// In-memory controller recording every call made through its connections.
#[derive(Default, Clone)]
pub struct FakeConnector {
    state: Arc<Mutex<FakeState>>,
}

impl FakeConnector {
    pub fn refuse_opens(&self, count: usize) {
        self.state.lock().unwrap().refused_opens = count;
    }

    pub fn make_unreachable(&self, device: &str) {
        self.state.lock().unwrap().unreachable.push(device.into());
    }

    /// Commands sent to `device` never complete.
    pub fn stall(&self, device: &str) {
        self.state.lock().unwrap().stalled.push(device.into());
    }

    pub fn fail_commands(&self, count: usize) {
        self.state.lock().unwrap().failing_commands = count;
    }

    pub fn panic_on_commands(&self, count: usize) {
        self.state.lock().unwrap().panicking_commands = count;
    }

    pub fn opens(&self) -> usize {
        self.state.lock().unwrap().open_attempts
    }

    pub fn calls(&self) -> Vec<DeviceCall> {
        self.state.lock().unwrap().calls.iter().map(|(_, call)| call.clone()).collect()
    }

    pub fn calls_for(&self, device: &str) -> Vec<DeviceCall> {
        self.state
            .lock()
            .unwrap()
            .calls
            .iter()
            .filter(|(name, _)| name == device)
            .map(|(_, call)| call.clone())
            .collect()
    }

    pub fn closed(&self) -> Vec<usize> {
        self.state.lock().unwrap().closed.clone()
    }
}

impl DeviceConnectorDrivenPort for FakeConnector {
    type Connection = FakeConnection;

    async fn open(&self, identity: &DeviceIdentity) -> anyhow::Result<FakeConnection> {
        let mut state = self.state.lock().unwrap();
        state.open_attempts += 1;
        if state.unreachable.contains(&identity.name) {
            bail!("no route to {}", identity.socket_addr());
        }
        if state.refused_opens > 0 {
            state.refused_opens -= 1;
            bail!("connection refused by {}", identity.socket_addr());
        }
        let id = state.connections;
        state.connections += 1;
        Ok(FakeConnection {
            id,
            device: identity.name.clone(),
            state: self.state.clone(),
        })
    }
}

pub struct FakeConnection {
    id: usize,
    device: String,
    state: Arc<Mutex<FakeState>>,
}

impl FakeConnection {
    fn record(&self, call: DeviceCall) -> anyhow::Result<()> {
        let panicking = {
            let mut state = self.state.lock().unwrap();
            if state.stalled.contains(&self.device) {
                state.calls.push((self.device.clone(), call));
                return Ok(());
            }
            state.calls.push((self.device.clone(), call));
            if state.failing_commands > 0 {
                state.failing_commands -= 1;
                bail!("broken pipe");
            }
            if state.panicking_commands > 0 {
                state.panicking_commands -= 1;
                true
            } else {
                false
            }
        };
        // the lock is released first so a panic does not poison it
        if panicking {
            panic!("controller firmware crashed");
        }
        Ok(())
    }
}

impl FakeConnection {
    async fn hang_if_stalled(&self) {
        let stalled = self.state.lock().unwrap().stalled.contains(&self.device);
        if stalled {
            std::future::pending::<()>().await;
        }
    }
}

impl DeviceConnectionDrivenPort for FakeConnection {
    async fn set_power(&mut self, on: bool) -> anyhow::Result<()> {
        self.record(DeviceCall::Power(self.id, on))?;
        self.hang_if_stalled().await;
        Ok(())
    }

    async fn set_color(&mut self, color: Color) -> anyhow::Result<()> {
        self.record(DeviceCall::Color(self.id, color))?;
        self.hang_if_stalled().await;
        Ok(())
    }

    async fn close(self) -> anyhow::Result<()> {
        self.state.lock().unwrap().closed.push(self.id);
        Ok(())
    }
}
