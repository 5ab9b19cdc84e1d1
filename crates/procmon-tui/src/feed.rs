//! Process event feed.
//!
//! Owns the single `"process_log"` subscription and turns raw payloads
//! into [`ProcessRecord`]s. Malformed payloads are logged and dropped:
//! never retried, never surfaced as a user-facing error, and never allowed
//! to escape past the decode boundary.

use procmon_core::bus::{EventBus, Subscription};
use procmon_core::error::ProcmonError;
use procmon_core::types::{ProcessRecord, PROCESS_LOG_CHANNEL};
use tracing::{debug, warn};

/// Maximum payload length echoed into log lines.
const PAYLOAD_PREVIEW_LEN: usize = 80;

/// The UI's listener on the `"process_log"` channel.
///
/// With no host bus present the feed is inert: [`ProcessFeed::poll`]
/// returns nothing and no listener is registered. The subscription is
/// scoped to the feed; dropping the feed unregisters the listener.
pub struct ProcessFeed {
    subscription: Option<Subscription>,
    dropped: u64,
}

impl ProcessFeed {
    /// Create a feed, registering exactly one listener if a bus exists.
    pub fn new(bus: Option<&EventBus>) -> Self {
        let subscription = match bus {
            Some(bus) => Some(bus.subscribe(PROCESS_LOG_CHANNEL)),
            None => {
                debug!("no host event bus present, process feed disabled");
                None
            }
        };
        Self {
            subscription,
            dropped: 0,
        }
    }

    /// Returns true if a listener is registered.
    pub fn is_connected(&self) -> bool {
        self.subscription.is_some()
    }

    /// Number of payloads dropped due to decode failures.
    pub fn dropped(&self) -> u64 {
        self.dropped
    }

    /// Drain all pending payloads and decode them, in delivery order.
    ///
    /// Invalid payloads are counted, logged, and skipped; draining
    /// continues with the next payload.
    pub fn poll(&mut self) -> Vec<ProcessRecord> {
        let Some(subscription) = self.subscription.as_mut() else {
            return Vec::new();
        };

        let mut records = Vec::new();
        while let Some(payload) = subscription.try_recv() {
            match serde_json::from_str::<ProcessRecord>(&payload) {
                Ok(record) => records.push(record),
                Err(source) => {
                    self.dropped += 1;
                    let err = ProcmonError::payload_decode(PROCESS_LOG_CHANNEL, source);
                    warn!(
                        %err,
                        payload = payload_preview(&payload),
                        dropped = self.dropped,
                        "dropping malformed process event"
                    );
                }
            }
        }
        records
    }
}

fn payload_preview(payload: &str) -> String {
    if payload.chars().count() <= PAYLOAD_PREVIEW_LEN {
        payload.to_string()
    } else {
        let truncated: String = payload.chars().take(PAYLOAD_PREVIEW_LEN).collect();
        format!("{truncated}...")
    }
}
