//! Main application state and loop for the procmon TUI.
//!
//! The `App` struct owns the terminal lifecycle, the process feed, the
//! table and scroll state, the settings form, and view switching. All
//! state transitions run on the single UI thread in response to discrete
//! events: bus payloads drained per tick and crossterm input events.

use std::io;
use std::time::{Duration, Instant};

use crossterm::event::{self, Event, KeyEvent, MouseEvent, MouseEventKind};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame, Terminal,
};

use procmon_core::bus::EventBus;
use procmon_core::settings::SettingsDefaults;

use crate::event::{AppEvent, InputHandler};
use crate::feed::ProcessFeed;
use crate::process_panel::{
    viewport_rows, FollowScroll, ProcessPanel, ProcessTable, DEFAULT_TABLE_CAPACITY,
};
use crate::settings_panel::{SettingsForm, SettingsPanel};
use crate::theme::ThemeManager;
use crate::view::{View, SIDEBAR_WIDTH};

/// Result type for app operations.
pub type AppResult<T> = std::result::Result<T, Box<dyn std::error::Error>>;

/// Target frame rate (60 FPS = ~16.67ms per frame).
const TARGET_FPS: u64 = 60;
const FRAME_DURATION: Duration = Duration::from_millis(1000 / TARGET_FPS);

/// Feed drain interval.
const FEED_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Header timestamp cache duration (update every second).
const TIMESTAMP_CACHE_DURATION: Duration = Duration::from_secs(1);

/// Construction options for [`App`].
#[derive(Debug, Clone)]
pub struct AppOptions {
    /// Bound on retained table rows
    pub capacity: usize,
    /// Initial settings form values
    pub defaults: SettingsDefaults,
}

impl Default for AppOptions {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_TABLE_CAPACITY,
            defaults: SettingsDefaults::default(),
        }
    }
}

/// Main application state.
pub struct App {
    /// Current active view
    current_view: View,
    /// Previous view (for back navigation)
    previous_view: Option<View>,
    /// Input handler for key events
    input_handler: InputHandler,
    /// Whether the app should quit
    should_quit: bool,
    /// Whether to show the help overlay
    show_help: bool,
    /// Status message to display in the footer
    status_message: Option<String>,
    /// Listener on the process_log channel
    feed: ProcessFeed,
    /// Reconciled process rows
    table: ProcessTable,
    /// Viewport scroll state with auto-follow
    scroll: FollowScroll,
    /// Settings form state
    form: SettingsForm,
    /// Theme manager for color themes
    theme_manager: ThemeManager,
    /// Dirty flag - whether UI needs redraw
    dirty: bool,
    /// Cached terminal size for resize detection
    cached_size: Option<Rect>,
    /// Last feed poll time
    last_poll_time: Instant,
    /// Cached timestamp for the header (updated every second)
    cached_timestamp: Option<String>,
    last_timestamp_update: Instant,
    /// Table viewport height from the last draw
    table_viewport: usize,
}

impl App {
    /// Create a new app bound to an optional host event bus.
    pub fn new(bus: Option<&EventBus>) -> Self {
        Self::with_options(bus, AppOptions::default())
    }

    /// Create a new app with explicit options.
    pub fn with_options(bus: Option<&EventBus>, options: AppOptions) -> Self {
        let now = Instant::now();
        Self {
            current_view: View::default(),
            previous_view: None,
            input_handler: InputHandler::new(),
            should_quit: false,
            show_help: false,
            status_message: None,
            feed: ProcessFeed::new(bus),
            table: ProcessTable::new(options.capacity),
            scroll: FollowScroll::default(),
            form: SettingsForm::new(options.defaults),
            theme_manager: ThemeManager::load_config(),
            dirty: true,
            cached_size: None,
            last_poll_time: now,
            cached_timestamp: None,
            last_timestamp_update: now,
            table_viewport: 0,
        }
    }

    /// Returns the current view.
    pub fn current_view(&self) -> View {
        self.current_view
    }

    /// Returns whether the app should quit.
    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    /// Returns whether the help overlay is visible.
    pub fn show_help(&self) -> bool {
        self.show_help
    }

    /// The reconciled process table.
    pub fn table(&self) -> &ProcessTable {
        &self.table
    }

    /// The follow-scroll state.
    pub fn scroll(&self) -> &FollowScroll {
        &self.scroll
    }

    /// The settings form.
    pub fn form(&self) -> &SettingsForm {
        &self.form
    }

    /// Mark the UI as dirty (needs redraw).
    fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    /// Check if UI needs redraw and clear the dirty flag.
    fn take_dirty(&mut self) -> bool {
        if self.dirty {
            self.dirty = false;
            true
        } else {
            false
        }
    }

    /// Get cached timestamp or update if expired.
    fn get_cached_timestamp(&mut self) -> String {
        if self.cached_timestamp.is_none()
            || self.last_timestamp_update.elapsed() >= TIMESTAMP_CACHE_DURATION
        {
            self.cached_timestamp =
                Some(chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string());
            self.last_timestamp_update = Instant::now();
        }
        self.cached_timestamp.clone().unwrap_or_default()
    }

    /// Switch to a specific view.
    ///
    /// View state is retained across switches: the table keeps
    /// accumulating while the settings form is shown, and form edits
    /// survive a trip to the process view.
    pub fn switch_view(&mut self, view: View) {
        if self.current_view != view {
            self.previous_view = Some(self.current_view);
            self.current_view = view;
            self.input_handler.set_form_mode(view == View::Settings);
            self.status_message = Some(view.title().to_string());
            self.mark_dirty();
        }
    }

    /// Go to the next view in the cycle.
    pub fn next_view(&mut self) {
        self.switch_view(self.current_view.next());
    }

    /// Go to the previous view in the cycle.
    pub fn prev_view(&mut self) {
        self.switch_view(self.current_view.prev());
    }

    /// Go back to the previous view (if any).
    pub fn go_back(&mut self) {
        if let Some(prev) = self.previous_view.take() {
            self.switch_view(prev);
        }
    }

    /// Handle a key event.
    pub fn handle_key_event(&mut self, key: KeyEvent) {
        let event = self.input_handler.handle_key(key);
        self.handle_app_event(event);
    }

    /// Handle a mouse event (wheel scrolling over the table).
    pub fn handle_mouse_event(&mut self, mouse: MouseEvent) {
        if self.current_view != View::Processes {
            return;
        }
        match mouse.kind {
            MouseEventKind::ScrollUp => self.handle_app_event(AppEvent::NavigateUp),
            MouseEventKind::ScrollDown => self.handle_app_event(AppEvent::NavigateDown),
            _ => {}
        }
    }

    /// Handle an application event.
    pub fn handle_app_event(&mut self, event: AppEvent) {
        match event {
            AppEvent::SwitchView(view) => self.switch_view(view),
            AppEvent::NextView => self.next_view(),
            AppEvent::PrevView => self.prev_view(),
            AppEvent::ShowHelp => {
                self.show_help = true;
                self.mark_dirty();
            }
            AppEvent::Quit | AppEvent::ForceQuit => self.should_quit = true,
            AppEvent::Cancel => {
                if self.show_help {
                    self.show_help = false;
                } else if self.current_view == View::Settings {
                    self.go_back();
                }
                self.mark_dirty();
            }
            AppEvent::NavigateUp => {
                match self.current_view {
                    View::Processes => {
                        self.scroll.scroll_up(1, self.table.len(), self.table_viewport)
                    }
                    View::Settings => self.form.focus_prev(),
                }
                self.mark_dirty();
            }
            AppEvent::NavigateDown => {
                match self.current_view {
                    View::Processes => {
                        self.scroll.scroll_down(1, self.table.len(), self.table_viewport)
                    }
                    View::Settings => self.form.focus_next(),
                }
                self.mark_dirty();
            }
            AppEvent::PageUp => {
                if self.current_view == View::Processes {
                    let page = self.table_viewport.max(1);
                    self.scroll.scroll_up(page, self.table.len(), self.table_viewport);
                    self.mark_dirty();
                }
            }
            AppEvent::PageDown => {
                if self.current_view == View::Processes {
                    let page = self.table_viewport.max(1);
                    self.scroll.scroll_down(page, self.table.len(), self.table_viewport);
                    self.mark_dirty();
                }
            }
            AppEvent::GoToTop => {
                if self.current_view == View::Processes {
                    self.scroll.jump_to_top(self.table.len(), self.table_viewport);
                    self.mark_dirty();
                }
            }
            AppEvent::GoToBottom => {
                if self.current_view == View::Processes {
                    self.scroll.jump_to_bottom(self.table.len(), self.table_viewport);
                    self.mark_dirty();
                }
            }
            AppEvent::FocusNext => {
                if self.current_view == View::Settings {
                    self.form.focus_next();
                    self.mark_dirty();
                }
            }
            AppEvent::FocusPrev => {
                if self.current_view == View::Settings {
                    self.form.focus_prev();
                    self.mark_dirty();
                }
            }
            AppEvent::OptionPrev => {
                if self.current_view == View::Settings {
                    self.form.cycle_service_prev();
                    self.mark_dirty();
                }
            }
            AppEvent::OptionNext => {
                if self.current_view == View::Settings {
                    self.form.cycle_service_next();
                    self.mark_dirty();
                }
            }
            AppEvent::TextInput(c) => {
                if self.current_view == View::Settings {
                    self.form.input(c);
                    self.mark_dirty();
                }
            }
            AppEvent::Backspace => {
                if self.current_view == View::Settings {
                    self.form.backspace();
                    self.mark_dirty();
                }
            }
            AppEvent::Select => {
                if self.current_view == View::Settings {
                    if let Some(values) = self.form.activate() {
                        self.status_message =
                            Some(format!("Settings saved ({})", values.service.name()));
                    }
                    self.mark_dirty();
                }
            }
            AppEvent::Submit => {
                if self.current_view == View::Settings {
                    let values = self.form.submit();
                    self.status_message =
                        Some(format!("Settings saved ({})", values.service.name()));
                    self.mark_dirty();
                }
            }
            AppEvent::CycleTheme => {
                let new_theme = self.theme_manager.cycle_theme();
                self.status_message = Some(format!("Theme: {}", new_theme.display_name()));
                self.mark_dirty();
            }
            AppEvent::None => {}
        }
    }

    /// Drain the feed and reconcile pending events into the table.
    ///
    /// Returns true if any record was applied.
    pub fn poll_feed(&mut self) -> bool {
        let records = self.feed.poll();
        if records.is_empty() {
            return false;
        }
        for record in records {
            self.table.apply(record);
        }
        self.scroll.after_update(self.table.len(), self.table_viewport);
        self.mark_dirty();
        true
    }

    /// Run the main application loop.
    pub fn run(&mut self) -> AppResult<()> {
        // Setup terminal
        crossterm::terminal::enable_raw_mode()?;
        let mut stdout = io::stdout();
        crossterm::execute!(
            stdout,
            crossterm::terminal::EnterAlternateScreen,
            crossterm::event::EnableMouseCapture
        )?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;

        // Main loop
        let result = self.run_loop(&mut terminal);

        // Restore terminal
        crossterm::terminal::disable_raw_mode()?;
        crossterm::execute!(
            terminal.backend_mut(),
            crossterm::terminal::LeaveAlternateScreen,
            crossterm::event::DisableMouseCapture
        )?;
        terminal.show_cursor()?;

        result
    }

    /// The inner event loop with frame-rate limiting.
    fn run_loop(&mut self, terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> AppResult<()> {
        while !self.should_quit {
            let frame_start = Instant::now();

            // Drain the feed on its own cadence
            if self.last_poll_time.elapsed() >= FEED_POLL_INTERVAL {
                self.poll_feed();
                self.last_poll_time = Instant::now();
            }

            // Only draw if dirty or the header clock needs a tick
            let needs_redraw = self.take_dirty()
                || self.last_timestamp_update.elapsed() >= TIMESTAMP_CACHE_DURATION;

            if needs_redraw {
                terminal.draw(|frame| self.draw(frame))?;
            }

            // Handle input for the remainder of the frame
            let elapsed = frame_start.elapsed();
            let event_timeout = if elapsed < FRAME_DURATION {
                FRAME_DURATION - elapsed
            } else {
                Duration::from_millis(10)
            };

            if event::poll(event_timeout)? {
                match event::read()? {
                    Event::Key(key) => self.handle_key_event(key),
                    Event::Mouse(mouse) => self.handle_mouse_event(mouse),
                    Event::Resize(_, _) => self.mark_dirty(),
                    _ => {}
                }
            }

            // Frame-rate limiting: sleep if the frame was too fast
            let frame_elapsed = frame_start.elapsed();
            if frame_elapsed < FRAME_DURATION {
                std::thread::sleep(FRAME_DURATION - frame_elapsed);
            }
        }
        Ok(())
    }

    /// Draw the UI.
    pub fn draw(&mut self, frame: &mut Frame) {
        let area = frame.area();
        if self.cached_size != Some(area) {
            self.cached_size = Some(area);
        }

        // Main layout: header, content, footer
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // Header
                Constraint::Min(5),    // Content
                Constraint::Length(2), // Footer
            ])
            .split(area);

        self.draw_header(frame, chunks[0]);

        // Shared two-pane layout: fixed navigation + content
        let panes = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Length(SIDEBAR_WIDTH), Constraint::Min(30)])
            .split(chunks[1]);

        self.draw_sidebar(frame, panes[0]);
        self.draw_content(frame, panes[1]);
        self.draw_footer(frame, chunks[2]);

        if self.show_help {
            self.draw_help_overlay(frame, area);
        }
    }

    /// Draw the header bar with clock and feed status.
    fn draw_header(&mut self, frame: &mut Frame, area: Rect) {
        let now = self.get_cached_timestamp();
        let theme = self.theme_manager.current();
        let title = format!(" Process Monitor - {} ", self.current_view.title());
        let title_len = title.len();

        let (status_text, status_color) = if !self.feed.is_connected() {
            ("[no event bus]".to_string(), theme.colors.status_warning)
        } else if self.table.is_empty() {
            ("[waiting for events]".to_string(), theme.colors.text_dim)
        } else {
            (
                format!("[{} processes]", self.table.len()),
                theme.colors.status_healthy,
            )
        };

        let dropped_text = if self.feed.dropped() > 0 {
            format!("[{} dropped]  ", self.feed.dropped())
        } else {
            String::new()
        };

        let right_len = now.len() + 2 + dropped_text.len() + status_text.len();
        let spacing = area
            .width
            .saturating_sub(title_len as u16 + right_len as u16 + 2) as usize;

        let header = Paragraph::new(Line::from(vec![
            Span::styled(
                title,
                Style::default()
                    .fg(theme.colors.header)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::raw(" ".repeat(spacing)),
            Span::styled(now, Style::default().fg(theme.colors.text_dim)),
            Span::raw("  "),
            Span::styled(dropped_text, Style::default().fg(theme.colors.status_error)),
            Span::styled(status_text, Style::default().fg(status_color)),
        ]))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(theme.colors.border_dim)),
        );

        frame.render_widget(header, area);
    }

    /// Draw the fixed navigation sidebar.
    fn draw_sidebar(&self, frame: &mut Frame, area: Rect) {
        let theme = self.theme_manager.current();
        let mut lines = vec![Line::default()];

        for view in View::ALL {
            let active = view == self.current_view;
            let marker = if active { "▸ " } else { "  " };
            let style = if active {
                Style::default()
                    .fg(theme.colors.accent)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(theme.colors.text)
            };
            lines.push(Line::from(vec![
                Span::raw(marker),
                Span::styled(format!("[{}]", view.hotkey()), Style::default().fg(theme.colors.hotkey)),
                Span::styled(format!(" {}", view.title()), style),
            ]));
        }

        let sidebar = Paragraph::new(lines).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(theme.colors.border_dim))
                .title(Span::styled(
                    " procmon ",
                    Style::default().fg(theme.colors.text_dim),
                )),
        );

        frame.render_widget(sidebar, area);
    }

    /// Draw the content pane for the active view.
    fn draw_content(&mut self, frame: &mut Frame, area: Rect) {
        match self.current_view {
            View::Processes => {
                // The real viewport is only known here; keep the follow
                // pin accurate across resizes.
                self.table_viewport = viewport_rows(area);
                if self.scroll.is_following() {
                    self.scroll.after_update(self.table.len(), self.table_viewport);
                }
                let panel = ProcessPanel::new(&self.table, &self.scroll, self.theme_manager.current())
                    .focused(true);
                frame.render_widget(panel, area);
            }
            View::Settings => {
                let panel =
                    SettingsPanel::new(&self.form, self.theme_manager.current()).focused(true);
                frame.render_widget(panel, area);
            }
        }
    }

    /// Draw the footer with hotkey hints and the status message.
    fn draw_footer(&self, frame: &mut Frame, area: Rect) {
        let theme = self.theme_manager.current();
        let hotkey_style = Style::default().fg(theme.colors.hotkey);

        let hints = match self.current_view {
            View::Processes => vec![
                Span::styled("[p]", hotkey_style),
                Span::raw("Processes "),
                Span::styled("[s]", hotkey_style),
                Span::raw("Settings "),
                Span::styled("[↑↓]", hotkey_style),
                Span::raw("Scroll "),
                Span::styled("[G]", hotkey_style),
                Span::raw("Follow "),
                Span::styled("[C]", hotkey_style),
                Span::raw("Theme "),
                Span::styled("[?]", hotkey_style),
                Span::raw("Help "),
                Span::styled("[q]", hotkey_style),
                Span::raw("Quit"),
            ],
            View::Settings => vec![
                Span::styled("[Tab]", hotkey_style),
                Span::raw("Field "),
                Span::styled("[←→]", hotkey_style),
                Span::raw("Service "),
                Span::styled("[Ctrl+S]", hotkey_style),
                Span::raw("Save "),
                Span::styled("[Esc]", hotkey_style),
                Span::raw("Back "),
                Span::styled("[Ctrl+C]", hotkey_style),
                Span::raw("Quit"),
            ],
        };

        let title = self.status_message.clone().unwrap_or_default();

        let footer = Paragraph::new(Line::from(hints))
            .style(Style::default().fg(theme.colors.text_dim))
            .block(
                Block::default()
                    .borders(Borders::TOP)
                    .title(Span::styled(title, Style::default().fg(theme.colors.text_dim)))
                    .title_alignment(ratatui::layout::Alignment::Right),
            );

        frame.render_widget(footer, area);
    }

    /// Draw the help overlay.
    fn draw_help_overlay(&self, frame: &mut Frame, area: Rect) {
        let theme = self.theme_manager.current();
        let overlay_width = 52.min(area.width.saturating_sub(4));
        let overlay_height = 18.min(area.height.saturating_sub(4));
        let overlay_x = (area.width.saturating_sub(overlay_width)) / 2;
        let overlay_y = (area.height.saturating_sub(overlay_height)) / 2;
        let overlay_area = Rect::new(overlay_x, overlay_y, overlay_width, overlay_height);

        frame.render_widget(Clear, overlay_area);

        let help_text = "\
procmon Hotkey Reference

Views:
  p        Process log table
  s        Settings form
  Tab      Cycle views

Process table:
  ↑ k      Scroll up (pauses follow)
  ↓ j      Scroll down
  G  End   Jump to bottom (resumes follow)
  g  Home  Jump to top

General:
  ?  h     Show this help
  C        Cycle theme
  Esc      Cancel / back
  q        Quit
  Ctrl+C   Force quit

Press Esc to close this help.";

        let help = Paragraph::new(help_text)
            .style(Style::default().fg(theme.colors.text))
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(theme.colors.header))
                    .title(Span::styled(
                        " Help ",
                        Style::default()
                            .fg(theme.colors.header)
                            .add_modifier(Modifier::BOLD),
                    )),
            )
            .wrap(Wrap { trim: false });

        frame.render_widget(help, overlay_area);
    }
}
