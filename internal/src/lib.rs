pub mod domain {
    pub mod command;
    pub mod device;
    pub mod error;
    pub mod message;
}

pub mod port {
    pub mod broker;
    pub mod device;
    pub mod dispatch;
}

pub mod service {
    pub mod device_session;
    pub mod message_dispatcher;
    pub mod session_registry;
    pub mod topic_router;
    pub mod translator;
}

#[cfg(test)]
pub(crate) mod test_support;
