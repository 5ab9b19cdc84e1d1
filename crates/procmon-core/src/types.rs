//! Shared type definitions used across procmon crates.
//!
//! The central type is [`ProcessRecord`], the wire shape delivered on the
//! `"process_log"` event channel.

use serde::{Deserialize, Serialize};

/// Name of the event channel carrying process records.
pub const PROCESS_LOG_CHANNEL: &str = "process_log";

/// The status string the host uses for a live process.
///
/// Any other status value is rendered in a warning tone.
pub const STATUS_RUNNING: &str = "running";

/// One row of monitored-process status, keyed by process id.
///
/// Decoded from the JSON payload of a `"process_log"` event:
///
/// ```json
/// {"pid": 4821, "name": "nginx", "status": "running", "cpu": 1.5, "description": "web server"}
/// ```
///
/// The host payload may carry additional fields (`memory`, `command`);
/// those are tolerated and ignored. A payload missing any of the fields
/// below fails decoding and is dropped by the feed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessRecord {
    /// Process id, unique key within the session. The host emits `-1`
    /// for poller-error pseudo-records.
    pub pid: i32,
    /// Executable name
    pub name: String,
    /// Free-text status; [`STATUS_RUNNING`] gets the healthy style
    pub status: String,
    /// CPU usage percentage
    pub cpu: f64,
    /// Host-provided description (analysis result, change summary)
    pub description: String,
}

impl ProcessRecord {
    /// Returns true if the host reports this process as running.
    pub fn is_running(&self) -> bool {
        self.status == STATUS_RUNNING
    }

    /// CPU usage formatted for display, one decimal place.
    pub fn cpu_display(&self) -> String {
        format!("{:.1}", self.cpu)
    }
}
