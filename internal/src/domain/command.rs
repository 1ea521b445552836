use super::device::Color;

pub const POWER_SUFFIX: &str = "on";
pub const BRIGHTNESS_SUFFIX: &str = "value";
/// Only this exact payload switches a controller on.
pub const POWER_ON_PAYLOAD: &[u8] = b"True";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceCommand {
    Power { on: bool },
    Brightness { level: u8 },
    NoMatch,
}

impl DeviceCommand {
    pub fn name(&self) -> &'static str {
        match self {
            DeviceCommand::Power { .. } => "Power",
            DeviceCommand::Brightness { .. } => "Brightness",
            DeviceCommand::NoMatch => "NoMatch",
        }
    }
}

/// What a command turns into on the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceAction {
    SetPower(bool),
    SetColor(Color),
}

impl DeviceCommand {
    pub fn action(&self) -> Option<DeviceAction> {
        match self {
            DeviceCommand::Power { on } => Some(DeviceAction::SetPower(*on)),
            DeviceCommand::Brightness { level } => Some(DeviceAction::SetColor(Color::monochrome(*level))),
            DeviceCommand::NoMatch => None,
        }
    }
}
