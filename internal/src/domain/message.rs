use std::fmt::{Debug, Formatter};

pub const TOPIC_ROOT: &str = "light";
const TOPIC_SEPARATOR: char = '/';
const WILDCARDS: [char; 2] = ['+', '#'];

#[derive(Clone, PartialEq, Eq)]
pub struct InboundMessage {
    pub topic: String,
    pub payload: Vec<u8>,
}

impl InboundMessage {
    pub fn new(topic: impl Into<String>, payload: impl Into<Vec<u8>>) -> Self {
        InboundMessage {
            topic: topic.into(),
            payload: payload.into(),
        }
    }

    pub fn path(&self) -> Option<TopicPath<'_>> {
        TopicPath::parse(&self.topic)
    }
}

impl Debug for InboundMessage {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InboundMessage")
            .field("topic", &self.topic)
            .field("payload", &String::from_utf8_lossy(&self.payload))
            .finish()
    }
}

/// A topic split as `light/<device_name>/<suffix>`.
///
/// `suffix` keeps every remaining segment, separators included, so
/// `light/a/b/on` has the suffix `b/on`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TopicPath<'a> {
    pub device_name: &'a str,
    pub suffix: &'a str,
}

impl<'a> TopicPath<'a> {
    pub fn parse(topic: &'a str) -> Option<Self> {
        let mut segments = topic.splitn(3, TOPIC_SEPARATOR);
        match (segments.next(), segments.next(), segments.next()) {
            (Some(TOPIC_ROOT), Some(device_name), Some(suffix)) if !device_name.is_empty() => {
                Some(TopicPath { device_name, suffix })
            }
            _ => None,
        }
    }

    pub fn subscription_filter(device_name: &str) -> String {
        format!("{TOPIC_ROOT}{TOPIC_SEPARATOR}{device_name}{TOPIC_SEPARATOR}#")
    }

    /// A device name has to fit in exactly one topic segment.
    pub fn is_valid_device_name(device_name: &str) -> bool {
        !device_name.is_empty() && !device_name.contains(TOPIC_SEPARATOR) && !device_name.contains(WILDCARDS)
    }
}
