use std::sync::{
    atomic::{AtomicBool, AtomicU64, Ordering},
    Arc,
};

use futures::future::BoxFuture;
use tokio::sync::{
    broadcast::{self, error::RecvError},
    oneshot,
};
use tracing::{debug, warn};

const DEFAULT_HUB_CAPACITY: usize = 256;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeEvent {
    pub name: String,
    pub content: Option<String>,
}

impl ChangeEvent {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            content: None,
        }
    }

    pub fn with_content(name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            content: Some(content.into()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(pub u64);

pub struct EventHub {
    events: broadcast::Sender<ChangeEvent>,
    next_subscription_id: AtomicU64,
}

impl Default for EventHub {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_HUB_CAPACITY)
    }
}

impl EventHub {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let (events, _) = broadcast::channel(capacity.max(1));
        Self {
            events,
            next_subscription_id: AtomicU64::new(1),
        }
    }

    /// Publishes `event` and returns how many listeners were live to see it.
    pub fn broadcast(&self, event: ChangeEvent) -> usize {
        debug!(topic = %event.name, "hub: broadcast");
        self.events.send(event).unwrap_or(0)
    }

    pub fn subscribe<F>(&self, topic: impl Into<String>, handler: F) -> Subscription
    where
        F: Fn(ChangeEvent) -> BoxFuture<'static, ()> + Send + Sync + 'static,
    {
        let topic = topic.into();
        let id = SubscriptionId(self.next_subscription_id.fetch_add(1, Ordering::Relaxed));
        let mut events = self.events.subscribe();
        let active = Arc::new(AtomicBool::new(true));

        let (stop, mut stopped) = oneshot::channel::<()>();

        let task_active = Arc::clone(&active);
        let task_topic = topic.clone();
        tokio::spawn(async move {
            loop {
                // A handler already running finishes; nothing is received after release.
                let received = tokio::select! {
                    biased;
                    _ = &mut stopped => break,
                    received = events.recv() => received,
                };
                match received {
                    Ok(event) => {
                        if event.name != task_topic {
                            continue;
                        }
                        if !task_active.load(Ordering::Acquire) {
                            break;
                        }
                        handler(event).await;
                    }
                    Err(RecvError::Lagged(skipped)) => {
                        warn!(topic = %task_topic, skipped, "hub: listener lagged behind");
                    }
                    Err(RecvError::Closed) => break,
                }
            }
        });

        debug!(topic = %topic, subscription_id = id.0, "hub: subscribed");
        Subscription {
            id,
            topic,
            active,
            stop: Some(stop),
        }
    }

    pub fn unsubscribe(&self, mut subscription: Subscription) {
        subscription.release();
    }
}

pub struct Subscription {
    id: SubscriptionId,
    topic: String,
    active: Arc<AtomicBool>,
    stop: Option<oneshot::Sender<()>>,
}

impl Subscription {
    pub fn id(&self) -> SubscriptionId {
        self.id
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }

    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::Acquire)
    }

    /// Stops the listener. Calling it again is a no-op.
    pub fn release(&mut self) {
        let Some(stop) = self.stop.take() else {
            return;
        };
        self.active.store(false, Ordering::Release);
        let _ = stop.send(());
        debug!(topic = %self.topic, subscription_id = self.id.0, "hub: unsubscribed");
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.release();
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.id)
            .field("topic", &self.topic)
            .field("active", &self.is_active())
            .finish()
    }
}

#[cfg(test)]
#[path = "tests/hub_tests.rs"]
mod tests;
