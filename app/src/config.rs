pub mod app_config;
pub mod device_config;
pub mod mqtt_config;
