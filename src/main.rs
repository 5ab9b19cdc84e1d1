//! procmon - terminal frontend for live process monitoring
//!
//! Renders a live table of host-emitted process events and a settings
//! form for the external AI service.
//!
//! ## Usage
//!
//! ```bash
//! # Render events piped in from a host monitor
//! host-monitor | procmon
//!
//! # Run with a synthetic feed (no host required)
//! procmon --demo
//!
//! # With verbose logging
//! procmon --demo -v
//!
//! # With a custom table bound
//! procmon --demo --capacity 256
//! ```

use std::io::{IsTerminal, Write};
use std::panic;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use procmon_core::settings::SettingsDefaults;
use procmon_core::{init_logging, EventBus, LogGuard};
use procmon_tui::app::AppOptions;
use procmon_tui::process_panel::DEFAULT_TABLE_CAPACITY;
use procmon_tui::App;
use tracing::{error, info};

mod demo;
mod host;

/// procmon process monitor frontend
///
/// A terminal interface showing live process status events from a host
/// monitor, with a settings form for the AI analysis service.
#[derive(Parser, Debug)]
#[command(name = "procmon")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose logging (increases log level)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Directory for log files (defaults to ~/.procmon/logs/)
    #[arg(long)]
    log_dir: Option<PathBuf>,

    /// Publish a synthetic process feed instead of reading one from stdin
    #[arg(long)]
    demo: bool,

    /// Maximum number of process rows retained in the table
    #[arg(long, default_value_t = DEFAULT_TABLE_CAPACITY)]
    capacity: usize,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize logging
    let _guard = match setup_logging(&cli) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Failed to initialize logging: {}", e);
            return ExitCode::from(1);
        }
    };

    // Install panic hook to ensure terminal cleanup
    install_panic_hook();

    info!("Starting procmon");

    // Wire up the host side of the event bus. The runtime owns the feed
    // task and must outlive the UI loop.
    let (bus, _runtime) = match build_feed(&cli) {
        Ok(wiring) => wiring,
        Err(e) => {
            error!("Failed to start event feed: {}", e);
            eprintln!("Error: {}", e);
            return ExitCode::from(1);
        }
    };

    // Run the TUI application
    match run_app(bus, &cli) {
        Ok(()) => {
            info!("procmon exited normally");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("procmon error: {}", e);
            eprintln!("Error: {}", e);
            ExitCode::from(1)
        }
    }
}

/// Install a panic hook that restores the terminal before printing the
/// panic message.
///
/// Even if the application panics in raw mode with the alternate screen
/// enabled, the terminal is restored so the user can read the message.
fn install_panic_hook() {
    let original_hook = panic::take_hook();

    panic::set_hook(Box::new(move |panic_info| {
        let _ = restore_terminal();
        original_hook(panic_info);
    }));
}

/// Restore terminal to its normal state.
fn restore_terminal() -> std::io::Result<()> {
    let mut stdout = std::io::stdout();

    let _ = crossterm::terminal::disable_raw_mode();

    crossterm::execute!(
        stdout,
        crossterm::terminal::LeaveAlternateScreen,
        crossterm::event::DisableMouseCapture
    )?;

    crossterm::execute!(stdout, crossterm::cursor::Show)?;
    stdout.flush()?;

    Ok(())
}

/// Set up logging based on CLI arguments.
fn setup_logging(cli: &Cli) -> procmon_core::Result<LogGuard> {
    let debug = cli.verbose > 0;
    init_logging(cli.log_dir.clone(), debug)
}

/// Build the host-side feed for this invocation.
///
/// `--demo` publishes a synthetic feed; piped stdin bridges the host's
/// newline-delimited JSON stream onto the bus; an interactive stdin with
/// no `--demo` means no host is present and no listener is registered.
fn build_feed(cli: &Cli) -> std::io::Result<(Option<EventBus>, Option<tokio::runtime::Runtime>)> {
    if cli.demo {
        let runtime = tokio::runtime::Runtime::new()?;
        let bus = EventBus::new();
        runtime.spawn(demo::run(bus.clone()));
        info!("demo feed started");
        return Ok((Some(bus), Some(runtime)));
    }

    if !std::io::stdin().is_terminal() {
        let runtime = tokio::runtime::Runtime::new()?;
        let bus = EventBus::new();
        runtime.spawn(host::run_stdin_bridge(bus.clone()));
        info!("bridging host event stream from stdin");
        return Ok((Some(bus), Some(runtime)));
    }

    info!("no host feed present, starting with an empty table");
    Ok((None, None))
}

/// Run the TUI application.
fn run_app(bus: Option<EventBus>, cli: &Cli) -> procmon_tui::AppResult<()> {
    let options = AppOptions {
        capacity: cli.capacity,
        defaults: SettingsDefaults::from_env(),
    };
    let mut app = App::with_options(bus.as_ref(), options);
    app.run()
}
