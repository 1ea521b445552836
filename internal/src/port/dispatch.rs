use crate::domain::{error::DispatchError, message::InboundMessage};

pub trait MessageDispatcherDriverPort {
    fn dispatch(&self, message: InboundMessage) -> impl Future<Output = Result<Dispatch, DispatchError>> + Send;
}

#[derive(Debug, PartialEq, Eq)]
pub enum Dispatch {
    Queued { device: String },
    Ignored,
}
