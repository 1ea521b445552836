#[cfg_attr(test, mockall::automock)]
pub trait TopicSubscriberDrivenPort {
    fn subscribe(&self, filter: String) -> anyhow::Result<()>;
}
