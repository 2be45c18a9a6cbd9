//! Live change notifications for connected clients.
//!
//! [`NotificationService`] keeps a registry of subscribers, each with its own
//! bounded queue, and fans change events out to every subscriber except the
//! user who caused the change. Delivery is best effort: a subscriber whose
//! queue is full is disconnected instead of slowing down the broadcaster.

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock, Weak};

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use uuid::Uuid;

/// Default number of undelivered events a subscriber may have queued.
pub const DEFAULT_BUFFER: usize = 32;

/// Identifies one connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClientId(Uuid);

impl ClientId {
    /// Creates a new random client ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates a client ID from an existing UUID.
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for ClientId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ClientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// An event pushed to subscribers.
///
/// Serialises as `{"type": "connected"}`, `{"type": "order-change"}` or
/// `{"type": "product-change"}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum NotificationEvent {
    /// Sent once when a subscription opens.
    Connected,
    /// Some order was created, changed or deleted.
    OrderChange,
    /// Some product was created, changed or deleted.
    ProductChange,
}

impl NotificationEvent {
    /// Returns the event type name.
    pub fn event_type(&self) -> &'static str {
        match self {
            NotificationEvent::Connected => "connected",
            NotificationEvent::OrderChange => "order-change",
            NotificationEvent::ProductChange => "product-change",
        }
    }
}

struct Subscriber {
    user_id: String,
    sender: mpsc::Sender<NotificationEvent>,
    token: u64,
}

#[derive(Default)]
struct Registry {
    clients: RwLock<HashMap<ClientId, Subscriber>>,
    next_token: AtomicU64,
}

impl Registry {
    fn remove(&self, client_id: &ClientId, token: u64) {
        let mut clients = self.clients.write().unwrap_or_else(PoisonError::into_inner);
        if clients.get(client_id).is_some_and(|s| s.token == token) {
            clients.remove(client_id);
            metrics::gauge!("notification_clients").set(clients.len() as f64);
            tracing::debug!(client_id = %client_id, "Client disconnected");
        }
    }
}

/// Fan-out hub for change notifications.
///
/// Cloning is cheap and every clone shares the same registry. Construct one
/// at start-up and hand it to everything that publishes or subscribes.
#[derive(Clone)]
pub struct NotificationService {
    registry: Arc<Registry>,
    buffer: usize,
}

impl Default for NotificationService {
    fn default() -> Self {
        Self::new()
    }
}

impl NotificationService {
    /// Creates a service with the default per-subscriber buffer.
    pub fn new() -> Self {
        Self::with_buffer(DEFAULT_BUFFER)
    }

    /// Creates a service whose subscribers can queue up to `buffer` events.
    pub fn with_buffer(buffer: usize) -> Self {
        Self {
            registry: Arc::new(Registry::default()),
            buffer: buffer.max(1),
        }
    }

    /// Registers a client and queues the `connected` event for it.
    ///
    /// The client stays registered until the returned [`Subscription`] is
    /// dropped or it falls too far behind. Registering an id that is already
    /// in use replaces the previous connection.
    pub fn add_client(&self, client_id: ClientId, user_id: impl Into<String>) -> Subscription {
        let user_id = user_id.into();
        let (sender, receiver) = mpsc::channel(self.buffer);
        let token = self.registry.next_token.fetch_add(1, Ordering::Relaxed);

        // Fresh channel with capacity >= 1, cannot fail.
        let _ = sender.try_send(NotificationEvent::Connected);

        let count = {
            let mut clients = self
                .registry
                .clients
                .write()
                .unwrap_or_else(PoisonError::into_inner);
            clients.insert(
                client_id,
                Subscriber {
                    user_id: user_id.clone(),
                    sender,
                    token,
                },
            );
            clients.len()
        };
        metrics::gauge!("notification_clients").set(count as f64);
        tracing::info!(client_id = %client_id, user_id = %user_id, "Client connected");

        Subscription {
            client_id,
            token,
            receiver,
            registry: Arc::downgrade(&self.registry),
        }
    }

    /// Registers a client under a freshly generated id.
    pub fn subscribe(&self, user_id: impl Into<String>) -> Subscription {
        self.add_client(ClientId::new(), user_id)
    }

    /// Tells everyone except `exclude_user_id` that orders changed.
    ///
    /// Returns the number of subscribers the event was queued for.
    pub fn notify_order_change(&self, exclude_user_id: &str) -> usize {
        self.broadcast(NotificationEvent::OrderChange, exclude_user_id)
    }

    /// Tells everyone except `exclude_user_id` that products changed.
    pub fn notify_product_change(&self, exclude_user_id: &str) -> usize {
        self.broadcast(NotificationEvent::ProductChange, exclude_user_id)
    }

    /// Returns the number of registered clients.
    pub fn client_count(&self) -> usize {
        self.registry
            .clients
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Returns true if `client_id` is registered.
    pub fn is_registered(&self, client_id: &ClientId) -> bool {
        self.registry
            .clients
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(client_id)
    }

    /// Disconnects every client. Their streams end once drained.
    pub fn disconnect_all(&self) -> usize {
        let mut clients = self
            .registry
            .clients
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        let count = clients.len();
        clients.clear();
        metrics::gauge!("notification_clients").set(0.0);
        tracing::info!(count, "Disconnected all clients");
        count
    }

    fn broadcast(&self, event: NotificationEvent, exclude_user_id: &str) -> usize {
        // An anonymous originator must not reach everyone.
        if exclude_user_id.is_empty() {
            return 0;
        }

        let mut delivered = 0;
        let mut dropped = Vec::new();
        {
            let clients = self
                .registry
                .clients
                .read()
                .unwrap_or_else(PoisonError::into_inner);
            for (client_id, subscriber) in clients.iter() {
                if subscriber.user_id.is_empty() || subscriber.user_id == exclude_user_id {
                    continue;
                }
                match subscriber.sender.try_send(event) {
                    Ok(()) => delivered += 1,
                    Err(mpsc::error::TrySendError::Full(_)) => {
                        tracing::warn!(client_id = %client_id, "Subscriber queue full, disconnecting");
                        dropped.push((*client_id, subscriber.token));
                    }
                    Err(mpsc::error::TrySendError::Closed(_)) => {
                        dropped.push((*client_id, subscriber.token));
                    }
                }
            }
        }

        for (client_id, token) in dropped {
            self.registry.remove(&client_id, token);
        }

        if delivered > 0 {
            metrics::counter!("notifications_sent_total", "type" => event.event_type())
                .increment(delivered as u64);
        }
        tracing::debug!(event = event.event_type(), delivered, "Notification broadcast");
        delivered
    }
}

/// Receiving end of one client's notifications.
///
/// Dropping it deregisters the client.
pub struct Subscription {
    client_id: ClientId,
    token: u64,
    receiver: mpsc::Receiver<NotificationEvent>,
    registry: Weak<Registry>,
}

impl Subscription {
    /// Returns the ID this subscription is registered under.
    pub fn client_id(&self) -> ClientId {
        self.client_id
    }

    /// Waits for the next event.
    ///
    /// Returns `None` once the client has been disconnected and all queued
    /// events were received.
    pub async fn recv(&mut self) -> Option<NotificationEvent> {
        self.receiver.recv().await
    }

    /// Returns the next queued event without waiting.
    pub fn try_recv(&mut self) -> Option<NotificationEvent> {
        self.receiver.try_recv().ok()
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("client_id", &self.client_id)
            .finish_non_exhaustive()
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(registry) = self.registry.upgrade() {
            registry.remove(&self.client_id, self.token);
        }
    }
}
