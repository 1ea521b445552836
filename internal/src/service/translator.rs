use crate::domain::{
    command::{BRIGHTNESS_SUFFIX, DeviceCommand, POWER_ON_PAYLOAD, POWER_SUFFIX},
    error::DecodeError,
    message::TopicPath,
};

/// Turns a `light/<name>/.../<kind>` message into a device command, the
/// kind being the last segment of the topic.
///
/// The device name is not inspected here, routing to the right session is
/// done by the router bound to that name.
pub fn translate(topic: &str, payload: &[u8]) -> Result<DeviceCommand, DecodeError> {
    let Some(path) = TopicPath::parse(topic) else {
        return Ok(DeviceCommand::NoMatch);
    };
    match path.suffix.rsplit('/').next() {
        Some(POWER_SUFFIX) => Ok(DeviceCommand::Power {
            on: payload == POWER_ON_PAYLOAD,
        }),
        Some(BRIGHTNESS_SUFFIX) => parse_level(topic, payload).map(|level| DeviceCommand::Brightness { level }),
        _ => Ok(DeviceCommand::NoMatch),
    }
}

// Narrowing keeps the low byte: 256 becomes 0 and -1 becomes 255.
fn parse_level(topic: &str, payload: &[u8]) -> Result<u8, DecodeError> {
    let text = std::str::from_utf8(payload).map_err(|_| DecodeError::NotUtf8 { topic: topic.into() })?;
    text.parse::<i64>()
        .map(|value| value as u8)
        .map_err(|e| DecodeError::NotAnInteger {
            topic: topic.into(),
            payload: text.into(),
            reason: e.to_string(),
        })
}
