use std::{collections::HashSet, fs, path::Path};

use anyhow::{Context, Result, anyhow, bail, ensure};
use internal::domain::{device::DeviceIdentity, message::TopicPath};
use serde::Deserialize;

use super::{
    device_config::{ControllerConfig, DeviceConfig},
    mqtt_config::MqttConfig,
};

#[derive(Deserialize, Debug)]
pub struct AppConfig {
    pub mqtt: MqttConfig,
    #[serde(default)]
    pub devices: DeviceConfig,
    pub controllers: Vec<ControllerConfig>,
}

impl AppConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<AppConfig> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .map_err(|err| anyhow!("Could not read config file {}: {:?}", path.display(), err))?;
        Self::parse(&content).with_context(|| format!("Wrong format {}", path.display()))
    }

    pub fn parse(content: &str) -> Result<AppConfig> {
        let config: AppConfig = toml::from_str(content).map_err(|err| anyhow!("Could not parse TOML config: {err}"))?;
        config.validate()?;
        Ok(config)
    }

    pub fn identities(&self) -> Vec<DeviceIdentity> {
        self.controllers.iter().map(ControllerConfig::identity).collect()
    }

    fn validate(&self) -> Result<()> {
        ensure!(!self.mqtt.host.trim().is_empty(), "mqtt.host must not be empty");
        ensure!(!self.controllers.is_empty(), "at least one controller must be configured");
        let mut names = HashSet::new();
        for controller in &self.controllers {
            if !TopicPath::is_valid_device_name(&controller.name) {
                bail!("controller name {:?} must be a single topic segment", controller.name);
            }
            if !names.insert(controller.name.as_str()) {
                bail!("controller {} is configured more than once", controller.name);
            }
        }
        Ok(())
    }
}
