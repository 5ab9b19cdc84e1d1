//! Synthetic host feed for `--demo` mode.
//!
//! Stands in for the external host monitor: publishes process spawn,
//! status-change, and stop events on the `"process_log"` channel in the
//! same shapes the real host emits, plus an occasional malformed payload
//! so the UI's drop-and-report path is visible in the log file.

use std::time::Duration;

use procmon_core::bus::EventBus;
use procmon_core::types::PROCESS_LOG_CHANNEL;
use rand::Rng;
use serde_json::json;
use tracing::debug;

/// Emission cadence, roughly matching a host poll interval.
const EMIT_INTERVAL: Duration = Duration::from_millis(700);

/// Every Nth cycle, one deliberately malformed payload is published.
const MALFORMED_EVERY: u64 = 23;

struct DemoProcess {
    pid: i32,
    name: &'static str,
    status: &'static str,
}

const CAST: [(&str, i32); 8] = [
    ("systemd", 1),
    ("sshd", 707),
    ("nginx", 4821),
    ("postgres", 5210),
    ("redis-server", 5333),
    ("cargo", 1102),
    ("chrome", 9034),
    ("node", 9301),
];

/// Publish synthetic events forever.
pub async fn run(bus: EventBus) {
    let mut interval = tokio::time::interval(EMIT_INTERVAL);
    let mut processes: Vec<DemoProcess> = Vec::new();
    let mut next_spawn = 0usize;
    let mut step: u64 = 0;

    loop {
        interval.tick().await;
        step += 1;

        if step % MALFORMED_EVERY == 0 {
            bus.emit(PROCESS_LOG_CHANNEL, r#"{"pid": "oops", truncated"#);
            continue;
        }

        match step % 6 {
            // Spawn the next cast member until everyone is up
            0 | 1 if next_spawn < CAST.len() => {
                let (name, pid) = CAST[next_spawn];
                next_spawn += 1;
                processes.push(DemoProcess {
                    pid,
                    name,
                    status: "running",
                });
                emit_record(&bus, pid, name, "running", jitter_cpu(), &format!("{name} [Safe]"));
            }
            // Flip a process between running and sleeping
            2 | 3 => {
                if let Some(proc) = pick(&mut processes, step) {
                    let from = proc.status;
                    proc.status = if from == "running" { "sleeping" } else { "running" };
                    let description = format!(
                        "⚠️ Process {} (PID: {}) changed status: {} → {}",
                        proc.name, proc.pid, from, proc.status
                    );
                    emit_record(&bus, proc.pid, proc.name, proc.status, jitter_cpu(), &description);
                }
            }
            // Stop one, then respawn it later through the update path
            4 => {
                if let Some(proc) = pick(&mut processes, step) {
                    proc.status = "stopped";
                    let description =
                        format!("❌ Process Stopped: {} (PID: {})", proc.name, proc.pid);
                    emit_record(&bus, proc.pid, proc.name, "stopped", 0.0, &description);
                }
            }
            // Plain cpu refresh for someone alive
            _ => {
                if let Some(proc) = pick(&mut processes, step) {
                    if proc.status != "stopped" {
                        let description = format!("{} [Safe]", proc.name);
                        emit_record(&bus, proc.pid, proc.name, proc.status, jitter_cpu(), &description);
                    }
                }
            }
        }
    }
}

fn pick(processes: &mut [DemoProcess], step: u64) -> Option<&mut DemoProcess> {
    if processes.is_empty() {
        return None;
    }
    let idx = (step as usize) % processes.len();
    processes.get_mut(idx)
}

fn jitter_cpu() -> f64 {
    let mut rng = rand::rng();
    rng.random_range(0.0..12.0)
}

fn emit_record(bus: &EventBus, pid: i32, name: &str, status: &str, cpu: f64, description: &str) {
    let payload = json!({
        "pid": pid,
        "name": name,
        "status": status,
        "cpu": cpu,
        "description": description,
    });
    let delivered = bus.emit(PROCESS_LOG_CHANNEL, payload.to_string());
    debug!(pid, status, delivered, "demo event published");
}
