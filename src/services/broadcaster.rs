use log::{debug, error};
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use tokio::sync::broadcast;

use crate::models::game::GameState;

const CHANNEL_CAPACITY: usize = 128;

/// Observer callback. Each invocation receives its own copy of the state.
pub type Listener = Arc<dyn Fn(GameState) + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Registry = Mutex<Vec<(SubscriptionId, Listener)>>;

/// Fan-out of state snapshots to callback and channel subscribers.
#[derive(Clone)]
pub struct Broadcaster {
    listeners: Arc<Registry>,
    next_id: Arc<AtomicU64>,
    channel: broadcast::Sender<GameState>,
}

/// Handle returned by [`Broadcaster::subscribe`].
#[derive(Debug)]
pub struct Subscription {
    id: SubscriptionId,
    registry: Weak<Registry>,
}

impl Subscription {
    pub fn id(&self) -> SubscriptionId {
        self.id
    }

    /// Removes the listener. Returns false if it was already gone.
    pub fn unsubscribe(self) -> bool {
        match self.registry.upgrade() {
            Some(registry) => {
                let mut listeners = lock(&registry);
                let before = listeners.len();
                listeners.retain(|(id, _)| *id != self.id);
                listeners.len() != before
            }
            None => false,
        }
    }
}

impl Broadcaster {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(CHANNEL_CAPACITY);
        Broadcaster {
            listeners: Arc::new(Mutex::new(Vec::new())),
            next_id: Arc::new(AtomicU64::new(1)),
            channel: tx,
        }
    }

    /// Registers `listener`. Registering the same `Arc` again returns a handle
    /// to the existing subscription instead of adding a second one.
    pub fn subscribe(&self, listener: Listener) -> Subscription {
        let mut listeners = lock(&self.listeners);

        let id = match listeners.iter().find(|(_, l)| Arc::ptr_eq(l, &listener)) {
            Some((id, _)) => *id,
            None => {
                let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));
                listeners.push((id, listener));
                id
            }
        };

        Subscription {
            id,
            registry: Arc::downgrade(&self.listeners),
        }
    }

    pub fn subscribe_channel(&self) -> broadcast::Receiver<GameState> {
        self.channel.subscribe()
    }

    pub fn listener_count(&self) -> usize {
        lock(&self.listeners).len()
    }

    /// Delivers `snapshot` to every subscriber. A panicking listener is
    /// logged and skipped; the others still receive the snapshot.
    pub fn broadcast(&self, snapshot: &GameState) {
        // listeners may subscribe or unsubscribe from inside the callback
        let listeners: Vec<(SubscriptionId, Listener)> = lock(&self.listeners).clone();

        for (id, listener) in listeners {
            let copy = snapshot.clone();
            if let Err(payload) = panic::catch_unwind(AssertUnwindSafe(|| listener(copy))) {
                error!(
                    "Listener {:?} panicked during broadcast: {}",
                    id,
                    panic_message(payload.as_ref())
                );
            }
        }

        if self.channel.receiver_count() > 0 {
            if let Err(e) = self.channel.send(snapshot.clone()) {
                debug!("No channel subscriber took the snapshot: {}", e);
            }
        }
    }
}

impl Default for Broadcaster {
    fn default() -> Self {
        Self::new()
    }
}

fn lock(registry: &Registry) -> MutexGuard<'_, Vec<(SubscriptionId, Listener)>> {
    registry.lock().unwrap_or_else(PoisonError::into_inner)
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.as_str()
    } else {
        "non-string panic payload"
    }
}
