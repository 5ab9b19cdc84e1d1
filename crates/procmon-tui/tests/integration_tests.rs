//! End-to-end integration tests for the procmon TUI.
//!
//! These tests drive the full pipeline without a real terminal:
//! - Publish payloads on a host event bus
//! - Drain them through the app's feed
//! - Render with ratatui's TestBackend and assert on the buffer
//! - Exercise view navigation and the settings form via app events

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::backend::TestBackend;
use ratatui::buffer::Buffer;
use ratatui::Terminal;

use procmon_core::bus::EventBus;
use procmon_core::settings::{AiService, SettingsDefaults};
use procmon_core::types::PROCESS_LOG_CHANNEL;
use procmon_tui::app::AppOptions;
use procmon_tui::{App, View};

fn render(app: &mut App, width: u16, height: u16) -> Buffer {
    let backend = TestBackend::new(width, height);
    let mut terminal = Terminal::new(backend).unwrap();
    terminal.draw(|frame| app.draw(frame)).unwrap();
    terminal.backend().buffer().clone()
}

fn buffer_text(buffer: &Buffer) -> String {
    let area = buffer.area;
    let mut text = String::new();
    for y in 0..area.height {
        for x in 0..area.width {
            text.push(buffer[(x, y)].symbol().chars().next().unwrap_or(' '));
        }
        text.push('\n');
    }
    text
}

fn emit_record(bus: &EventBus, pid: i32, name: &str, status: &str, cpu: f64, description: &str) {
    bus.emit(
        PROCESS_LOG_CHANNEL,
        format!(
            r#"{{"pid":{pid},"name":"{name}","status":"{status}","cpu":{cpu},"description":"{description}"}}"#
        ),
    );
}

fn key(app: &mut App, code: KeyCode) {
    app.handle_key_event(KeyEvent::new(code, KeyModifiers::NONE));
}

fn key_with(app: &mut App, code: KeyCode, mods: KeyModifiers) {
    app.handle_key_event(KeyEvent::new(code, mods));
}

// ============================================================
// Full feed-to-render pipeline
// ============================================================

#[test]
fn test_emitted_events_appear_in_rendered_table() {
    let bus = EventBus::new();
    let mut app = App::new(Some(&bus));

    emit_record(&bus, 4821, "nginx", "running", 1.5, "web server [Safe]");
    emit_record(&bus, 4822, "postgres", "sleeping", 0.2, "database");
    app.poll_feed();

    let text = buffer_text(&render(&mut app, 120, 30));
    assert!(text.contains("4821"));
    assert!(text.contains("nginx"));
    assert!(text.contains("running"));
    assert!(text.contains("1.5"));
    assert!(text.contains("postgres"));
    assert!(text.contains("Process Logs (2)"));
}

#[test]
fn test_update_for_known_pid_replaces_row_in_rendered_output() {
    let bus = EventBus::new();
    let mut app = App::new(Some(&bus));

    emit_record(&bus, 1, "worker", "running", 5.0, "busy");
    app.poll_feed();
    emit_record(&bus, 1, "worker", "stopped", 0.0, "done");
    app.poll_feed();

    let text = buffer_text(&render(&mut app, 120, 30));
    assert!(text.contains("stopped"));
    assert!(!text.contains("busy"));
    assert!(text.contains("Process Logs (1)"));
}

#[test]
fn test_malformed_payloads_are_dropped_not_fatal() {
    let bus = EventBus::new();
    let mut app = App::new(Some(&bus));

    bus.emit(PROCESS_LOG_CHANNEL, "not json at all");
    bus.emit(PROCESS_LOG_CHANNEL, r#"{"pid":true}"#);
    emit_record(&bus, 9, "survivor", "running", 0.1, "made it");
    app.poll_feed();

    assert_eq!(app.table().len(), 1);
    let text = buffer_text(&render(&mut app, 120, 30));
    assert!(text.contains("survivor"));
    assert!(text.contains("[2 dropped]"));
}

#[test]
fn test_burst_of_events_reconciles_to_one_row_per_pid() {
    let bus = EventBus::new();
    let mut app = App::new(Some(&bus));

    for round in 0..5 {
        for pid in 0..20 {
            emit_record(&bus, pid, "p", "running", round as f64, "d");
        }
    }
    app.poll_feed();

    assert_eq!(app.table().len(), 20);
    for row in app.table().rows() {
        assert_eq!(row.cpu, 4.0);
    }
}

// ============================================================
// Keyboard-driven navigation
// ============================================================

#[test]
fn test_keyboard_view_switching_round_trip() {
    let mut app = App::new(None);
    assert_eq!(app.current_view(), View::Processes);

    key(&mut app, KeyCode::Char('s'));
    assert_eq!(app.current_view(), View::Settings);

    // Inside the form, Esc goes back to the process table
    key(&mut app, KeyCode::Esc);
    assert_eq!(app.current_view(), View::Processes);

    key(&mut app, KeyCode::Tab);
    assert_eq!(app.current_view(), View::Settings);
}

#[test]
fn test_q_quits_only_outside_the_form() {
    let mut app = App::new(None);
    key(&mut app, KeyCode::Char('s'));

    // 'q' is text while the form captures input
    key(&mut app, KeyCode::Char('q'));
    assert!(!app.should_quit());

    key(&mut app, KeyCode::Esc);
    key(&mut app, KeyCode::Char('q'));
    assert!(app.should_quit());
}

#[test]
fn test_ctrl_c_force_quits_from_the_form() {
    let mut app = App::new(None);
    key(&mut app, KeyCode::Char('s'));
    key_with(&mut app, KeyCode::Char('c'), KeyModifiers::CONTROL);
    assert!(app.should_quit());
}

#[test]
fn test_scroll_pause_and_resume_via_keys() {
    let bus = EventBus::new();
    let mut app = App::new(Some(&bus));

    for pid in 0..80 {
        emit_record(&bus, pid, "p", "running", 0.0, "d");
    }
    app.poll_feed();
    render(&mut app, 100, 24);
    assert!(app.scroll().is_following());

    key(&mut app, KeyCode::Up);
    assert!(!app.scroll().is_following());
    let paused = app.scroll().offset();

    // New events arrive while paused: viewport stays put
    for pid in 80..90 {
        emit_record(&bus, pid, "p", "running", 0.0, "d");
    }
    app.poll_feed();
    assert_eq!(app.scroll().offset(), paused);

    key(&mut app, KeyCode::End);
    assert!(app.scroll().is_following());
}

// ============================================================
// Settings form end to end
// ============================================================

#[test]
fn test_full_settings_flow_with_keyboard() {
    let mut app = App::new(None);
    key(&mut app, KeyCode::Char('s'));

    // Cycle the service selector with arrows: URL follows the service
    key(&mut app, KeyCode::Right);
    assert_eq!(app.form().values().service, AiService::Ollama);
    assert_eq!(
        app.form().values().api_url,
        AiService::Ollama.default_endpoint()
    );

    // Type a credential
    key(&mut app, KeyCode::Tab); // ApiUrl
    key(&mut app, KeyCode::Tab); // ApiKey
    for c in "tok_1234".chars() {
        key(&mut app, KeyCode::Char(c));
    }
    assert_eq!(app.form().values().api_key, "tok_1234");

    // Save from anywhere
    key_with(&mut app, KeyCode::Char('s'), KeyModifiers::CONTROL);
    assert!(app.form().is_submitted());

    let text = buffer_text(&render(&mut app, 120, 34));
    assert!(text.contains("Settings saved"));
}

#[test]
fn test_manual_url_edit_is_clobbered_by_service_selection() {
    let mut app = App::new(None);
    key(&mut app, KeyCode::Char('s'));

    key(&mut app, KeyCode::Tab); // focus ApiUrl
    for c in "/extra".chars() {
        key(&mut app, KeyCode::Char(c));
    }
    assert!(app.form().values().api_url.ends_with("/extra"));

    key(&mut app, KeyCode::BackTab); // back to Service
    key(&mut app, KeyCode::Enter); // cycles service
    assert_eq!(
        app.form().values().api_url,
        AiService::Ollama.default_endpoint()
    );
}

#[test]
fn test_api_key_rendered_masked() {
    let mut app = App::new(None);
    key(&mut app, KeyCode::Char('s'));
    key(&mut app, KeyCode::Tab);
    key(&mut app, KeyCode::Tab); // ApiKey
    for c in "supersecret99".chars() {
        key(&mut app, KeyCode::Char(c));
    }

    let text = buffer_text(&render(&mut app, 120, 34));
    assert!(!text.contains("supersecret99"));
    assert!(text.contains("et99") || text.contains("•"));
}

#[test]
fn test_custom_defaults_seed_the_form() {
    let defaults = SettingsDefaults {
        service: AiService::Ollama,
        ..SettingsDefaults::default()
    };
    let mut app = App::with_options(
        None,
        AppOptions {
            capacity: 16,
            defaults,
        },
    );
    assert_eq!(app.form().values().service, AiService::Ollama);

    let text = buffer_text(&render(&mut app, 120, 34));
    // Sidebar and header render regardless of options
    assert!(text.contains("Process Monitor"));
}

// ============================================================
// Capacity and lifecycle
// ============================================================

#[test]
fn test_capacity_bound_is_honored_end_to_end() {
    let bus = EventBus::new();
    let mut app = App::with_options(
        Some(&bus),
        AppOptions {
            capacity: 5,
            defaults: SettingsDefaults::default(),
        },
    );

    for pid in 0..12 {
        emit_record(&bus, pid, "p", "running", 0.0, "d");
    }
    app.poll_feed();

    assert_eq!(app.table().len(), 5);
    let pids: Vec<i32> = app.table().rows().iter().map(|r| r.pid).collect();
    assert_eq!(pids, vec![7, 8, 9, 10, 11]);
}

#[test]
fn test_dropping_the_app_releases_the_bus_listener() {
    let bus = EventBus::new();
    let app = App::new(Some(&bus));
    assert_eq!(bus.subscriber_count(PROCESS_LOG_CHANNEL), 1);

    drop(app);
    assert_eq!(bus.subscriber_count(PROCESS_LOG_CHANNEL), 0);

    // A remounted view registers exactly one fresh listener
    let second = App::new(Some(&bus));
    assert_eq!(bus.subscriber_count(PROCESS_LOG_CHANNEL), 1);
    drop(second);
}
