use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("Payload of {topic} is not valid UTF-8")]
    NotUtf8 { topic: String },
    #[error("Payload {payload:?} of {topic} is not a base-10 integer: {reason}")]
    NotAnInteger {
        topic: String,
        payload: String,
        reason: String,
    },
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    #[error("Connection to {device} lost: {reason}")]
    ConnectionLost { device: String, reason: String },
    #[error("Unable to connect to {device}: {reason}")]
    DeviceConnect { device: String, reason: String },
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum RouteError {
    #[error("Message dropped: {0}")]
    Decode(#[from] DecodeError),
    #[error("Message dropped after reconnect attempt: {0}")]
    Device(#[from] SessionError),
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum DispatchError {
    #[error("Worker of {0} is not running anymore")]
    WorkerGone(String),
    #[error("Queue of {0} is full, message dropped")]
    QueueFull(String),
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum RegistryError {
    #[error("Device name {0:?} cannot be used as a topic segment")]
    InvalidName(String),
    #[error("Device {0} is configured more than once")]
    DuplicateName(String),
    #[error("Unable to open device session: {0}")]
    Open(#[from] SessionError),
    #[error("Unable to subscribe to {filter}: {reason}")]
    Subscribe { filter: String, reason: String },
}
