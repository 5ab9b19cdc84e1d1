//! Event handling for the procmon TUI.
//!
//! Converts raw key events into application events. Two input modes exist:
//! normal mode (view hotkeys and list navigation) and form mode, active
//! while the settings view has focus, where printable keys become text
//! input instead of hotkeys.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::view::View;

/// Application-level events that can trigger state changes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppEvent {
    /// Switch to a specific view
    SwitchView(View),
    /// Cycle to the next view
    NextView,
    /// Cycle to the previous view
    PrevView,
    /// Show help overlay
    ShowHelp,
    /// Request application quit
    Quit,
    /// Force quit (Ctrl+C)
    ForceQuit,
    /// Cancel current operation / go back
    Cancel,
    /// Navigate up (scroll row / previous field)
    NavigateUp,
    /// Navigate down (scroll row / next field)
    NavigateDown,
    /// Page up
    PageUp,
    /// Page down
    PageDown,
    /// Go to top of the list
    GoToTop,
    /// Go to bottom of the list (re-engages follow)
    GoToBottom,
    /// Focus next form field
    FocusNext,
    /// Focus previous form field
    FocusPrev,
    /// Cycle the focused selector backward
    OptionPrev,
    /// Cycle the focused selector forward
    OptionNext,
    /// Text input character
    TextInput(char),
    /// Backspace in text input
    Backspace,
    /// Activate the focused element
    Select,
    /// Submit the settings form (Ctrl+S)
    Submit,
    /// Cycle the color theme
    CycleTheme,
    /// No action needed
    None,
}

/// Input handler for converting key events to app events.
#[derive(Debug, Default)]
pub struct InputHandler {
    /// Whether the settings form currently captures text input
    form_mode: bool,
}

impl InputHandler {
    /// Create a new input handler.
    pub fn new() -> Self {
        Self { form_mode: false }
    }

    /// Set whether form input mode is active.
    pub fn set_form_mode(&mut self, active: bool) {
        self.form_mode = active;
    }

    /// Returns whether form mode is active.
    pub fn is_form_mode(&self) -> bool {
        self.form_mode
    }

    /// Handle a key event and return the corresponding app event.
    pub fn handle_key(&mut self, key: KeyEvent) -> AppEvent {
        // Ctrl+C always force quits
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return AppEvent::ForceQuit;
        }

        // Escape cancels / leaves the form
        if key.code == KeyCode::Esc {
            return AppEvent::Cancel;
        }

        if self.form_mode {
            return self.handle_form_input(key);
        }

        self.handle_normal_mode(key)
    }

    /// Handle input while the settings form captures keys.
    fn handle_form_input(&self, key: KeyEvent) -> AppEvent {
        // Ctrl+S submits from any field
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('s') {
            return AppEvent::Submit;
        }

        match key.code {
            KeyCode::Tab => AppEvent::FocusNext,
            KeyCode::BackTab => AppEvent::FocusPrev,
            KeyCode::Up => AppEvent::NavigateUp,
            KeyCode::Down => AppEvent::NavigateDown,
            KeyCode::Left => AppEvent::OptionPrev,
            KeyCode::Right => AppEvent::OptionNext,
            KeyCode::Enter => AppEvent::Select,
            KeyCode::Backspace => AppEvent::Backspace,
            KeyCode::Char(c) => AppEvent::TextInput(c),
            _ => AppEvent::None,
        }
    }

    /// Handle input in normal navigation mode.
    fn handle_normal_mode(&mut self, key: KeyEvent) -> AppEvent {
        match key.code {
            // Quit
            KeyCode::Char('q') | KeyCode::Char('Q') => AppEvent::Quit,

            // Help
            KeyCode::Char('?') | KeyCode::Char('h') | KeyCode::Char('H') => AppEvent::ShowHelp,

            // View navigation hotkeys
            KeyCode::Char('p') | KeyCode::Char('P') => AppEvent::SwitchView(View::Processes),
            KeyCode::Char('s') | KeyCode::Char('S') => AppEvent::SwitchView(View::Settings),

            // Theme cycling
            KeyCode::Char('C') => AppEvent::CycleTheme,

            // Tab cycling
            KeyCode::Tab => {
                if key.modifiers.contains(KeyModifiers::SHIFT) {
                    AppEvent::PrevView
                } else {
                    AppEvent::NextView
                }
            }
            KeyCode::BackTab => AppEvent::PrevView,

            // List navigation
            KeyCode::Up | KeyCode::Char('k') => AppEvent::NavigateUp,
            KeyCode::Down | KeyCode::Char('j') => AppEvent::NavigateDown,
            KeyCode::PageUp => AppEvent::PageUp,
            KeyCode::PageDown => AppEvent::PageDown,
            KeyCode::Home | KeyCode::Char('g') => AppEvent::GoToTop,
            KeyCode::End | KeyCode::Char('G') => AppEvent::GoToBottom,

            // Selection
            KeyCode::Enter => AppEvent::Select,

            _ => AppEvent::None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key_event(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn key_event_with_mods(code: KeyCode, mods: KeyModifiers) -> KeyEvent {
        KeyEvent::new(code, mods)
    }

    #[test]
    fn test_view_hotkeys() {
        let mut handler = InputHandler::new();

        assert_eq!(
            handler.handle_key(key_event(KeyCode::Char('p'))),
            AppEvent::SwitchView(View::Processes)
        );
        assert_eq!(
            handler.handle_key(key_event(KeyCode::Char('s'))),
            AppEvent::SwitchView(View::Settings)
        );
    }

    #[test]
    fn test_case_insensitive_hotkeys() {
        let mut handler = InputHandler::new();

        assert_eq!(
            handler.handle_key(key_event(KeyCode::Char('S'))),
            AppEvent::SwitchView(View::Settings)
        );
        assert_eq!(
            handler.handle_key(key_event(KeyCode::Char('Q'))),
            AppEvent::Quit
        );
    }

    #[test]
    fn test_form_mode_captures_text() {
        let mut handler = InputHandler::new();
        handler.set_form_mode(true);

        // 'q' types instead of quitting while the form has focus
        assert_eq!(
            handler.handle_key(key_event(KeyCode::Char('q'))),
            AppEvent::TextInput('q')
        );
        assert_eq!(
            handler.handle_key(key_event(KeyCode::Backspace)),
            AppEvent::Backspace
        );
        assert_eq!(
            handler.handle_key(key_event(KeyCode::Enter)),
            AppEvent::Select
        );
    }

    #[test]
    fn test_form_mode_field_navigation() {
        let mut handler = InputHandler::new();
        handler.set_form_mode(true);

        assert_eq!(handler.handle_key(key_event(KeyCode::Tab)), AppEvent::FocusNext);
        assert_eq!(handler.handle_key(key_event(KeyCode::BackTab)), AppEvent::FocusPrev);
        assert_eq!(handler.handle_key(key_event(KeyCode::Up)), AppEvent::NavigateUp);
        assert_eq!(handler.handle_key(key_event(KeyCode::Down)), AppEvent::NavigateDown);
        assert_eq!(handler.handle_key(key_event(KeyCode::Left)), AppEvent::OptionPrev);
        assert_eq!(handler.handle_key(key_event(KeyCode::Right)), AppEvent::OptionNext);
    }

    #[test]
    fn test_form_mode_ctrl_s_submits() {
        let mut handler = InputHandler::new();
        handler.set_form_mode(true);

        assert_eq!(
            handler.handle_key(key_event_with_mods(KeyCode::Char('s'), KeyModifiers::CONTROL)),
            AppEvent::Submit
        );
    }

    #[test]
    fn test_ctrl_c_force_quit_in_both_modes() {
        let mut handler = InputHandler::new();

        assert_eq!(
            handler.handle_key(key_event_with_mods(KeyCode::Char('c'), KeyModifiers::CONTROL)),
            AppEvent::ForceQuit
        );

        handler.set_form_mode(true);
        assert_eq!(
            handler.handle_key(key_event_with_mods(KeyCode::Char('c'), KeyModifiers::CONTROL)),
            AppEvent::ForceQuit
        );
    }

    #[test]
    fn test_tab_cycling() {
        let mut handler = InputHandler::new();

        assert_eq!(handler.handle_key(key_event(KeyCode::Tab)), AppEvent::NextView);
        assert_eq!(
            handler.handle_key(key_event_with_mods(KeyCode::Tab, KeyModifiers::SHIFT)),
            AppEvent::PrevView
        );
        assert_eq!(handler.handle_key(key_event(KeyCode::BackTab)), AppEvent::PrevView);
    }

    #[test]
    fn test_scroll_keys() {
        let mut handler = InputHandler::new();

        assert_eq!(handler.handle_key(key_event(KeyCode::Up)), AppEvent::NavigateUp);
        assert_eq!(handler.handle_key(key_event(KeyCode::Char('j'))), AppEvent::NavigateDown);
        assert_eq!(handler.handle_key(key_event(KeyCode::End)), AppEvent::GoToBottom);
        assert_eq!(handler.handle_key(key_event(KeyCode::Char('G'))), AppEvent::GoToBottom);
        assert_eq!(handler.handle_key(key_event(KeyCode::Home)), AppEvent::GoToTop);
        assert_eq!(handler.handle_key(key_event(KeyCode::PageDown)), AppEvent::PageDown);
    }

    #[test]
    fn test_escape_cancels() {
        let mut handler = InputHandler::new();
        assert_eq!(handler.handle_key(key_event(KeyCode::Esc)), AppEvent::Cancel);

        handler.set_form_mode(true);
        assert_eq!(handler.handle_key(key_event(KeyCode::Esc)), AppEvent::Cancel);
    }
}
