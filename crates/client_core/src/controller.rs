use std::sync::Arc;

use futures::future::BoxFuture;
use shared::{
    domain::{CategoryId, ProductCategory},
    protocol::{SearchQuery, PRODUCT_CATEGORY_LIST_MODIFICATION},
};
use tokio::sync::{broadcast, Mutex};
use tracing::{debug, info, warn};

use crate::{
    error::ListError,
    hub::{ChangeEvent, EventHub, Subscription},
    navigation::NavigationContext,
    CategorySource, DeleteConfirmation, DeleteOutcome, MissingDeleteConfirmation,
};

const LIST_EVENT_CAPACITY: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControllerState {
    Idle,
    Active,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    Applied { count: usize },
    /// A later load was issued before this one finished; its response was dropped.
    Superseded,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListEvent {
    ItemsReplaced {
        count: usize,
        search: Option<String>,
    },
    LoadFailed(ListError),
    Deleted {
        id: Option<CategoryId>,
    },
    RequestFailed(ListError),
}

struct ListState {
    items: Option<Vec<ProductCategory>>,
    search_term: String,
    generation: u64,
    last_error: Option<ListError>,
}

impl ListState {
    fn begin_load(&mut self) -> (u64, String) {
        self.generation += 1;
        (self.generation, self.search_term.clone())
    }
}

#[derive(Default)]
struct ChangeListener {
    subscription: Option<Subscription>,
    /// Bumped by every teardown.
    epoch: u64,
}

pub struct CategoryListController {
    source: Arc<dyn CategorySource>,
    hub: Arc<EventHub>,
    delete_confirmation: Arc<dyn DeleteConfirmation>,
    refresh_topic: String,
    inner: Mutex<ListState>,
    listener: Mutex<ChangeListener>,
    events: broadcast::Sender<ListEvent>,
}

impl CategoryListController {
    pub fn new(source: Arc<dyn CategorySource>, hub: Arc<EventHub>) -> Arc<Self> {
        Self::new_with_dependencies(
            source,
            hub,
            Arc::new(MissingDeleteConfirmation),
            PRODUCT_CATEGORY_LIST_MODIFICATION,
        )
    }

    pub fn new_with_delete_confirmation(
        source: Arc<dyn CategorySource>,
        hub: Arc<EventHub>,
        delete_confirmation: Arc<dyn DeleteConfirmation>,
    ) -> Arc<Self> {
        Self::new_with_dependencies(
            source,
            hub,
            delete_confirmation,
            PRODUCT_CATEGORY_LIST_MODIFICATION,
        )
    }

    pub fn new_with_dependencies(
        source: Arc<dyn CategorySource>,
        hub: Arc<EventHub>,
        delete_confirmation: Arc<dyn DeleteConfirmation>,
        refresh_topic: impl Into<String>,
    ) -> Arc<Self> {
        let (events, _) = broadcast::channel(LIST_EVENT_CAPACITY);
        Arc::new(Self {
            source,
            hub,
            delete_confirmation,
            refresh_topic: refresh_topic.into(),
            inner: Mutex::new(ListState {
                items: None,
                search_term: String::new(),
                generation: 0,
                last_error: None,
            }),
            listener: Mutex::new(ChangeListener::default()),
            events,
        })
    }

    pub async fn initialize(
        self: &Arc<Self>,
        navigation: &NavigationContext,
    ) -> Result<LoadOutcome, ListError> {
        let epoch = self.listener.lock().await.epoch;
        let request = {
            let mut guard = self.inner.lock().await;
            guard.search_term = navigation.search_term().unwrap_or_default().to_string();
            guard.begin_load()
        };
        info!(search = %request.1, topic = %self.refresh_topic, "list: initializing");

        let outcome = self.fetch(request).await;
        self.register_change_listener(epoch).await;
        outcome
    }

    pub async fn load(&self) -> Result<LoadOutcome, ListError> {
        let request = self.inner.lock().await.begin_load();
        self.fetch(request).await
    }

    pub async fn search(&self, term: impl Into<String>) -> Result<LoadOutcome, ListError> {
        let request = {
            let mut guard = self.inner.lock().await;
            guard.search_term = term.into();
            guard.begin_load()
        };
        self.fetch(request).await
    }

    /// Re-issues the last load after a failure. Never called automatically.
    pub async fn retry(&self) -> Result<LoadOutcome, ListError> {
        if let Some(error) = self.last_error().await {
            info!(error = %error, "list: retrying after failure");
        }
        self.load().await
    }

    pub async fn teardown(&self) {
        let subscription = {
            let mut listener = self.listener.lock().await;
            listener.epoch += 1;
            listener.subscription.take()
        };
        if let Some(subscription) = subscription {
            self.hub.unsubscribe(subscription);
            info!(topic = %self.refresh_topic, "list: torn down");
        }
    }

    pub fn item_key(item: &ProductCategory) -> Result<CategoryId, ListError> {
        item.id.ok_or(ListError::MissingIdentity)
    }

    pub async fn request_delete(&self, item: &ProductCategory) -> Result<DeleteOutcome, ListError> {
        let outcome = self.delete_confirmation.open(item).await;
        match &outcome {
            DeleteOutcome::Deleted => {
                let _ = self.events.send(ListEvent::Deleted { id: item.id });
                // A failed reload is reported through `last_error` and `ListEvent::LoadFailed`.
                if let Err(err) = self.load().await {
                    debug!(
                        category_id = ?item.id,
                        error = %err,
                        "list: reload after delete failed"
                    );
                }
            }
            DeleteOutcome::Cancelled => {
                debug!(category_id = ?item.id, "list: delete cancelled");
            }
            DeleteOutcome::Failed(reason) => {
                let error = ListError::RequestFailed {
                    operation: "delete",
                    reason: reason.clone(),
                };
                warn!(category_id = ?item.id, error = %error, "list: delete failed");
                self.inner.lock().await.last_error = Some(error.clone());
                let _ = self.events.send(ListEvent::RequestFailed(error.clone()));
                return Err(error);
            }
        }
        Ok(outcome)
    }

    pub async fn items(&self) -> Option<Vec<ProductCategory>> {
        self.inner.lock().await.items.clone()
    }

    pub async fn search_term(&self) -> String {
        self.inner.lock().await.search_term.clone()
    }

    pub async fn last_error(&self) -> Option<ListError> {
        self.inner.lock().await.last_error.clone()
    }

    pub async fn state(&self) -> ControllerState {
        if self.listener.lock().await.subscription.is_some() {
            ControllerState::Active
        } else {
            ControllerState::Idle
        }
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<ListEvent> {
        self.events.subscribe()
    }

    async fn fetch(&self, (generation, search_term): (u64, String)) -> Result<LoadOutcome, ListError> {
        let response = if search_term.is_empty() {
            self.source.query().await
        } else {
            self.source
                .search(&SearchQuery::new(search_term.clone()))
                .await
        };

        let mut guard = self.inner.lock().await;
        if guard.generation != generation {
            debug!(
                generation,
                latest = guard.generation,
                "list: dropping superseded response"
            );
            return Ok(LoadOutcome::Superseded);
        }

        match response {
            Ok(body) => {
                let items = body.unwrap_or_default();
                let count = items.len();
                guard.items = Some(items);
                guard.last_error = None;
                drop(guard);

                debug!(generation, count, search = %search_term, "list: items replaced");
                let _ = self.events.send(ListEvent::ItemsReplaced {
                    count,
                    search: (!search_term.is_empty()).then_some(search_term),
                });
                Ok(LoadOutcome::Applied { count })
            }
            Err(err) => {
                let error = ListError::load_failed(&search_term, &err);
                guard.last_error = Some(error.clone());
                drop(guard);

                warn!(generation, error = %error, "list: load failed");
                let _ = self.events.send(ListEvent::LoadFailed(error.clone()));
                Err(error)
            }
        }
    }

    async fn register_change_listener(self: &Arc<Self>, epoch: u64) {
        let mut listener = self.listener.lock().await;
        if listener.epoch != epoch {
            debug!(topic = %self.refresh_topic, "list: torn down while initializing, not listening");
            return;
        }

        let controller = Arc::downgrade(self);
        let subscription = self.hub.subscribe(
            self.refresh_topic.clone(),
            move |event: ChangeEvent| -> BoxFuture<'static, ()> {
                let controller = controller.clone();
                Box::pin(async move {
                    let Some(controller) = controller.upgrade() else {
                        return;
                    };
                    debug!(topic = %event.name, "list: refresh requested");
                    // Failures are reported through `ListEvent::LoadFailed`.
                    let _ = controller.load().await;
                })
            },
        );

        let previous = listener.subscription.replace(subscription);
        drop(listener);
        if let Some(previous) = previous {
            self.hub.unsubscribe(previous);
        }
    }
}

#[cfg(test)]
#[path = "tests/controller_tests.rs"]
mod tests;
