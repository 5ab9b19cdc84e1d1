//! Named-channel event bus connecting the host runtime to the UI.
//!
//! The host (or the demo feed standing in for it) publishes string payloads
//! on named channels; the UI subscribes to the channel it cares about and
//! drains payloads on its own thread. Delivery within a channel preserves
//! emit order. Nothing here interprets payloads; the bus carries opaque
//! strings.
//!
//! Subscriptions are scoped: dropping a [`Subscription`] unregisters its
//! listener, so a view that is torn down and remounted cannot leak or
//! double-register listeners.
//!
//! ## Example
//!
//! ```
//! use procmon_core::bus::EventBus;
//!
//! let bus = EventBus::new();
//! let mut sub = bus.subscribe("process_log");
//! bus.emit("process_log", r#"{"pid":1}"#);
//! assert_eq!(sub.try_recv().as_deref(), Some(r#"{"pid":1}"#));
//! ```

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use tokio::sync::mpsc;
use tracing::{debug, warn};

/// Per-subscriber buffer size.
///
/// Large enough to absorb a burst from the host's poll cycle; the UI
/// drains every frame, so a full buffer means the UI is gone or wedged.
pub const DEFAULT_CHANNEL_BUFFER: usize = 256;

struct BusListener {
    id: u64,
    tx: mpsc::Sender<String>,
}

#[derive(Default)]
struct BusInner {
    next_id: u64,
    channels: HashMap<String, Vec<BusListener>>,
}

/// A registry of named event channels.
///
/// Cheap to clone; all clones share the same registry.
#[derive(Clone, Default)]
pub struct EventBus {
    inner: Arc<Mutex<BusInner>>,
}

impl EventBus {
    /// Create an empty bus.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, BusInner> {
        // A poisoned registry is still structurally valid (just senders),
        // so recover rather than propagate the panic.
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Register a listener on `channel`.
    ///
    /// The returned [`Subscription`] owns the receiving half; dropping it
    /// unregisters the listener.
    pub fn subscribe(&self, channel: &str) -> Subscription {
        let (tx, rx) = mpsc::channel(DEFAULT_CHANNEL_BUFFER);
        let id = {
            let mut inner = self.lock();
            let id = inner.next_id;
            inner.next_id += 1;
            inner
                .channels
                .entry(channel.to_string())
                .or_default()
                .push(BusListener { id, tx });
            id
        };
        debug!(channel, id, "listener registered");
        Subscription {
            bus: self.clone(),
            channel: channel.to_string(),
            id,
            rx,
        }
    }

    /// Deliver `payload` to every current subscriber of `channel`, in
    /// registration order. Returns the number of listeners reached.
    ///
    /// A listener whose buffer is full misses this delivery (logged);
    /// listeners whose receiving half is gone are pruned.
    pub fn emit(&self, channel: &str, payload: impl Into<String>) -> usize {
        let payload = payload.into();
        let mut inner = self.lock();
        let Some(listeners) = inner.channels.get_mut(channel) else {
            return 0;
        };

        let mut delivered = 0;
        listeners.retain(|listener| match listener.tx.try_send(payload.clone()) {
            Ok(()) => {
                delivered += 1;
                true
            }
            Err(mpsc::error::TrySendError::Full(_)) => {
                warn!(channel, listener = listener.id, "subscriber buffer full, dropping event");
                true
            }
            Err(mpsc::error::TrySendError::Closed(_)) => false,
        });
        delivered
    }

    /// Number of live listeners on `channel`.
    pub fn subscriber_count(&self, channel: &str) -> usize {
        self.lock()
            .channels
            .get(channel)
            .map_or(0, |listeners| listeners.len())
    }

    fn unsubscribe(&self, channel: &str, id: u64) {
        let mut inner = self.lock();
        if let Some(listeners) = inner.channels.get_mut(channel) {
            listeners.retain(|listener| listener.id != id);
            if listeners.is_empty() {
                inner.channels.remove(channel);
            }
        }
        debug!(channel, id, "listener unregistered");
    }
}

/// A registered listener on one bus channel.
///
/// Holds the receiving half of the channel. Unregisters itself on drop.
pub struct Subscription {
    bus: EventBus,
    channel: String,
    id: u64,
    rx: mpsc::Receiver<String>,
}

impl Subscription {
    /// The channel this subscription listens on.
    pub fn channel(&self) -> &str {
        &self.channel
    }

    /// Non-blocking receive for the UI loop. Returns `None` when no
    /// payload is pending.
    pub fn try_recv(&mut self) -> Option<String> {
        self.rx.try_recv().ok()
    }

    /// Await the next payload. Returns `None` if every bus handle is gone.
    pub async fn recv(&mut self) -> Option<String> {
        self.rx.recv().await
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.bus.unsubscribe(&self.channel, self.id);
    }
}
