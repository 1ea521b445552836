use std::time::Duration;

use rumqttc::MqttOptions;
use serde::Deserialize;
use uuid::Uuid;

const CLIENT_ID_PREFIX: &str = "lightbridge";

#[derive(Deserialize, Debug, Default, Clone)]
pub struct MqttConfig {
    pub host: String,
    pub port: u16,
    pub username: Option<String>,
    pub password: Option<String>,
    pub client_id: Option<String>,
    keep_alive_secs: Option<u64>,
    disconnect_grace_ms: Option<u64>,
}

impl MqttConfig {
    pub fn options(&self) -> MqttOptions {
        let mut options = MqttOptions::new(self.client_id(), &self.host, self.port);
        options.set_keep_alive(self.keep_alive());
        if let Some(username) = &self.username {
            options.set_credentials(username, self.password.as_deref().unwrap_or_default());
        }
        options
    }

    pub fn client_id(&self) -> String {
        self.client_id
            .clone()
            .unwrap_or_else(|| format!("{CLIENT_ID_PREFIX}-{}", Uuid::new_v4().simple()))
    }

    pub fn keep_alive(&self) -> Duration {
        Duration::from_secs(self.keep_alive_secs.unwrap_or(30))
    }

    pub fn disconnect_grace(&self) -> Duration {
        Duration::from_millis(self.disconnect_grace_ms.unwrap_or(250))
    }
}
