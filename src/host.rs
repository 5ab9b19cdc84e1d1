//! Bridge from a piped host monitor to the event bus.
//!
//! The host process emits one JSON-encoded process event per line on its
//! stdout. When procmon is run downstream of such a process, this bridge
//! forwards each line verbatim onto the `"process_log"` channel. Payload
//! validation happens at the UI's decode boundary, not here; the bus
//! carries opaque strings.

use procmon_core::bus::EventBus;
use procmon_core::types::PROCESS_LOG_CHANNEL;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, info, warn};

/// Read newline-delimited payloads from stdin and publish them until the
/// stream closes.
pub async fn run_stdin_bridge(bus: EventBus) {
    let stdin = tokio::io::stdin();
    let mut lines = BufReader::new(stdin).lines();

    loop {
        match lines.next_line().await {
            Ok(Some(line)) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                let delivered = bus.emit(PROCESS_LOG_CHANNEL, line);
                debug!(delivered, "forwarded host event");
            }
            Ok(None) => {
                info!("host event stream closed");
                break;
            }
            Err(e) => {
                warn!(error = %e, "failed reading host event stream");
                break;
            }
        }
    }
}
