use std::{
    collections::{HashMap, HashSet},
    panic::AssertUnwindSafe,
    sync::Arc,
};

use futures::{FutureExt, future::join_all};
use log::{debug, error, info, trace, warn};
use tokio::{sync::mpsc, task::JoinHandle};

use crate::{
    domain::{
        device::DeviceIdentity,
        error::{RegistryError, RouteError},
        message::{InboundMessage, TopicPath},
    },
    port::{broker::TopicSubscriberDrivenPort, device::DeviceConnectorDrivenPort},
    service::{
        device_session::DeviceSession,
        topic_router::{Routed, TopicRouter},
    },
};

const QUEUE_CAPACITY: usize = 32;

struct RouteHandle {
    queue: mpsc::Sender<InboundMessage>,
    worker: JoinHandle<()>,
}

/// Every configured device, each served by its own worker task.
///
/// The worker owns the device's router and session, so commands for one
/// device run strictly one after another while devices progress
/// independently. The map is never modified after [`SessionRegistry::start`].
pub struct SessionRegistry {
    routes: HashMap<String, RouteHandle>,
}

impl SessionRegistry {
    pub async fn start<C>(
        identities: Vec<DeviceIdentity>, connector: Arc<C>, subscriber: &impl TopicSubscriberDrivenPort,
    ) -> Result<Self, RegistryError>
    where
        C: DeviceConnectorDrivenPort + Send + Sync + 'static,
    {
        Self::validate(&identities)?;
        let mut registry = SessionRegistry { routes: HashMap::new() };
        for identity in identities {
            let name = identity.name.clone();
            let router = match Self::bind(identity, connector.clone(), subscriber).await {
                Ok(router) => router,
                Err(e) => {
                    registry.shutdown().await;
                    return Err(e);
                }
            };
            let (queue, inbox) = mpsc::channel(QUEUE_CAPACITY);
            let worker = tokio::spawn(Self::serve(router, inbox));
            registry.routes.insert(name, RouteHandle { queue, worker });
        }
        info!("{} device session(s) started", registry.routes.len());
        Ok(registry)
    }

    pub fn queue(&self, device_name: &str) -> Option<&mpsc::Sender<InboundMessage>> {
        self.routes.get(device_name).map(|route| &route.queue)
    }

    /// Closes every queue, lets each worker drain it and close its session.
    pub async fn shutdown(self) {
        let workers: Vec<_> = self
            .routes
            .into_iter()
            .map(|(name, route)| {
                drop(route.queue);
                route.worker.map(move |joined| (name, joined))
            })
            .collect();
        for (name, joined) in join_all(workers).await {
            if let Err(e) = joined {
                error!("Worker of {name} ended abnormally: {e}");
            }
        }
    }

    fn validate(identities: &[DeviceIdentity]) -> Result<(), RegistryError> {
        let mut seen = HashSet::new();
        identities.iter().try_for_each(|identity| {
            if !TopicPath::is_valid_device_name(&identity.name) {
                return Err(RegistryError::InvalidName(identity.name.clone()));
            }
            if !seen.insert(identity.name.as_str()) {
                return Err(RegistryError::DuplicateName(identity.name.clone()));
            }
            Ok(())
        })
    }

    async fn bind<C>(
        identity: DeviceIdentity, connector: Arc<C>, subscriber: &impl TopicSubscriberDrivenPort,
    ) -> Result<TopicRouter<C>, RegistryError>
    where
        C: DeviceConnectorDrivenPort,
    {
        let name = identity.name.clone();
        let session = DeviceSession::open(identity, connector).await?;
        TopicRouter::bind(&name, session, subscriber)
    }

    async fn serve<C>(mut router: TopicRouter<C>, mut inbox: mpsc::Receiver<InboundMessage>)
    where
        C: DeviceConnectorDrivenPort + Send + Sync + 'static,
    {
        while let Some(message) = inbox.recv().await {
            let outcome = AssertUnwindSafe(router.route(&message)).catch_unwind().await;
            match outcome {
                Ok(Ok(Routed::Applied(command))) => debug!("{command:?} applied on {}", router.device_name()),
                Ok(Ok(Routed::Recovered(command))) => {
                    info!("{command:?} applied on {} after reconnect", router.device_name())
                }
                Ok(Ok(Routed::Ignored)) => trace!("Nothing to do for {}", message.topic),
                Ok(Err(e @ RouteError::Decode(_))) => warn!("{e}"),
                Ok(Err(e @ RouteError::Device(_))) => error!("{e}"),
                Err(_) => error!("Routing {message:?} panicked, message dropped"),
            }
        }
        debug!("Queue of {} closed", router.device_name());
        router.close().await;
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use crate::{
        domain::{
            device::Color,
            error::{RegistryError, SessionError},
            message::InboundMessage,
        },
        port::broker::MockTopicSubscriberDrivenPort,
        test_support::{DeviceCall, FakeConnector, identity},
    };

    use super::SessionRegistry;

    fn subscriber(times: usize) -> MockTopicSubscriberDrivenPort {
        let mut subscriber = MockTopicSubscriberDrivenPort::new();
        subscriber.expect_subscribe().times(times).returning(|_| Ok(()));
        subscriber
    }

    #[tokio::test]
    async fn should_start_one_route_per_device() {
        let connector = Arc::new(FakeConnector::default());
        let registry = SessionRegistry::start(
            vec![identity("kitchen"), identity("desk")],
            connector.clone(),
            &subscriber(2),
        )
        .await
        .unwrap();
        assert_eq!(registry.routes.len(), 2);
        assert!(registry.queue("kitchen").is_some());
        assert!(registry.queue("desk").is_some());
        assert!(registry.queue("bogus").is_none());
        assert_eq!(connector.opens(), 2);
        registry.shutdown().await;
    }

    #[tokio::test]
    async fn should_reject_duplicate_names_before_connecting() {
        let connector = Arc::new(FakeConnector::default());
        let err = SessionRegistry::start(
            vec![identity("kitchen"), identity("kitchen")],
            connector.clone(),
            &subscriber(0),
        )
        .await
        .err()
        .unwrap();
        assert_eq!(err, RegistryError::DuplicateName("kitchen".into()));
        assert_eq!(connector.opens(), 0);
    }

    #[tokio::test]
    async fn should_reject_names_with_wildcards() {
        let connector = Arc::new(FakeConnector::default());
        let err = SessionRegistry::start(vec![identity("hall/#")], connector, &subscriber(0))
            .await
            .err()
            .unwrap();
        assert_eq!(err, RegistryError::InvalidName("hall/#".into()));
    }

    #[tokio::test]
    async fn should_close_opened_sessions_when_a_later_device_is_unreachable() {
        let connector = Arc::new(FakeConnector::default());
        connector.make_unreachable("desk");
        let err = SessionRegistry::start(
            vec![identity("kitchen"), identity("desk")],
            connector.clone(),
            &subscriber(1),
        )
        .await
        .err()
        .unwrap();
        assert!(matches!(
            err,
            RegistryError::Open(SessionError::DeviceConnect { ref device, .. }) if device == "desk"
        ));
        assert_eq!(connector.closed(), vec![0]);
    }

    #[tokio::test]
    async fn should_drain_queue_and_close_sessions_on_shutdown() {
        let connector = Arc::new(FakeConnector::default());
        let registry = SessionRegistry::start(
            vec![identity("kitchen"), identity("desk")],
            connector.clone(),
            &subscriber(2),
        )
        .await
        .unwrap();
        let kitchen = registry.queue("kitchen").unwrap();
        kitchen.send(InboundMessage::new("light/kitchen/on", "True")).await.unwrap();
        kitchen.send(InboundMessage::new("light/kitchen/value", "40")).await.unwrap();
        kitchen.send(InboundMessage::new("light/kitchen/on", "False")).await.unwrap();
        registry.shutdown().await;
        assert_eq!(
            connector.calls_for("kitchen"),
            vec![
                DeviceCall::Power(0, true),
                DeviceCall::Color(0, Color::monochrome(40)),
                DeviceCall::Power(0, false),
            ]
        );
        let mut closed = connector.closed();
        closed.sort();
        assert_eq!(closed, vec![0, 1]);
    }

    #[tokio::test]
    async fn should_keep_serving_after_routing_panics() {
        let connector = Arc::new(FakeConnector::default());
        let registry = SessionRegistry::start(vec![identity("kitchen")], connector.clone(), &subscriber(1))
            .await
            .unwrap();
        connector.panic_on_commands(1);
        let kitchen = registry.queue("kitchen").unwrap();
        kitchen.send(InboundMessage::new("light/kitchen/on", "True")).await.unwrap();
        kitchen.send(InboundMessage::new("light/kitchen/on", "False")).await.unwrap();
        registry.shutdown().await;
        assert_eq!(
            connector.calls(),
            vec![DeviceCall::Power(0, true), DeviceCall::Power(0, false)]
        );
        assert_eq!(connector.closed(), vec![0]);
    }
}
