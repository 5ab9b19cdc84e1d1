//! Settings form state and rendering.
//!
//! Four controlled fields (service selector, API URL, API key, model)
//! with one cross-field rule: selecting a service overwrites the URL field
//! with that service's default endpoint. Submission logs the collected
//! values (credential redacted); persistence is the host's concern.

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget},
};
use tracing::info;

use procmon_core::settings::{AiService, SettingsDefaults, SettingsValues};

use crate::theme::Theme;

/// Form fields in focus order, ending at the Save action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SettingsField {
    /// AI service selector
    #[default]
    Service,
    /// Endpoint URL text field
    ApiUrl,
    /// Credential text field (masked)
    ApiKey,
    /// Model identifier text field
    Model,
    /// Save action
    Save,
}

impl SettingsField {
    /// All fields in focus order.
    pub const ALL: [SettingsField; 5] = [
        SettingsField::Service,
        SettingsField::ApiUrl,
        SettingsField::ApiKey,
        SettingsField::Model,
        SettingsField::Save,
    ];

    /// Field label as shown in the form.
    pub fn label(&self) -> &'static str {
        match self {
            SettingsField::Service => "AI Service",
            SettingsField::ApiUrl => "API URL",
            SettingsField::ApiKey => "API Key",
            SettingsField::Model => "Model",
            SettingsField::Save => "Save Settings",
        }
    }

    /// The next field in focus order (wraps).
    pub fn next(&self) -> SettingsField {
        let idx = Self::ALL.iter().position(|f| f == self).unwrap_or(0);
        Self::ALL[(idx + 1) % Self::ALL.len()]
    }

    /// The previous field in focus order (wraps).
    pub fn prev(&self) -> SettingsField {
        let idx = Self::ALL.iter().position(|f| f == self).unwrap_or(0);
        if idx == 0 {
            Self::ALL[Self::ALL.len() - 1]
        } else {
            Self::ALL[idx - 1]
        }
    }

    /// Returns true for fields that accept typed text.
    pub fn is_text(&self) -> bool {
        matches!(
            self,
            SettingsField::ApiUrl | SettingsField::ApiKey | SettingsField::Model
        )
    }
}

/// The settings form: field values, focus cursor, and submit state.
#[derive(Debug, Clone)]
pub struct SettingsForm {
    defaults: SettingsDefaults,
    values: SettingsValues,
    focus: SettingsField,
    submitted: bool,
}

impl SettingsForm {
    /// Create a form seeded from `defaults`.
    pub fn new(defaults: SettingsDefaults) -> Self {
        let values = defaults.initial_values();
        Self {
            defaults,
            values,
            focus: SettingsField::default(),
            submitted: false,
        }
    }

    /// The current field values.
    pub fn values(&self) -> &SettingsValues {
        &self.values
    }

    /// The focused field.
    pub fn focus(&self) -> SettingsField {
        self.focus
    }

    /// Whether the form has been submitted at least once.
    pub fn is_submitted(&self) -> bool {
        self.submitted
    }

    /// Move focus to the next field.
    pub fn focus_next(&mut self) {
        self.focus = self.focus.next();
    }

    /// Move focus to the previous field.
    pub fn focus_prev(&mut self) {
        self.focus = self.focus.prev();
    }

    /// Select a service, applying the derived-URL rule: the URL field is
    /// overwritten with the service's default endpoint, clobbering any
    /// manual edit. Key and model are left alone.
    pub fn select_service(&mut self, service: AiService) {
        self.values.service = service;
        self.values.api_url = self.defaults.endpoint_for(service);
    }

    /// Cycle the service selector forward.
    pub fn cycle_service_next(&mut self) {
        self.select_service(self.values.service.next());
    }

    /// Cycle the service selector backward.
    pub fn cycle_service_prev(&mut self) {
        self.select_service(self.values.service.prev());
    }

    /// Type a character into the focused text field. Ignored on the
    /// selector and the Save action.
    pub fn input(&mut self, c: char) {
        match self.focus {
            SettingsField::ApiUrl => self.values.api_url.push(c),
            SettingsField::ApiKey => self.values.api_key.push(c),
            SettingsField::Model => self.values.model.push(c),
            SettingsField::Service | SettingsField::Save => {}
        }
    }

    /// Delete the last character of the focused text field.
    pub fn backspace(&mut self) {
        match self.focus {
            SettingsField::ApiUrl => {
                self.values.api_url.pop();
            }
            SettingsField::ApiKey => {
                self.values.api_key.pop();
            }
            SettingsField::Model => {
                self.values.model.pop();
            }
            SettingsField::Service | SettingsField::Save => {}
        }
    }

    /// Activate the focused element: cycle the selector, advance past a
    /// text field, or submit on Save. Returns the submitted snapshot when
    /// a submit happened.
    pub fn activate(&mut self) -> Option<SettingsValues> {
        match self.focus {
            SettingsField::Service => {
                self.cycle_service_next();
                None
            }
            SettingsField::ApiUrl | SettingsField::ApiKey | SettingsField::Model => {
                self.focus_next();
                None
            }
            SettingsField::Save => Some(self.submit()),
        }
    }

    /// Submit the form: log the value set (credential redacted) and
    /// return the snapshot for the host. No validation is performed.
    pub fn submit(&mut self) -> SettingsValues {
        self.submitted = true;
        info!(
            service = self.values.service.name(),
            api_url = %self.values.api_url,
            api_key = %self.values.redacted_key(),
            model = %self.values.model,
            "settings saved"
        );
        self.values.clone()
    }

    fn masked_key(&self) -> String {
        self.values.redacted_key()
    }

    fn model_placeholder(&self) -> String {
        self.defaults.model_for(self.values.service)
    }
}

/// The settings form widget.
pub struct SettingsPanel<'a> {
    form: &'a SettingsForm,
    theme: &'a Theme,
    focused: bool,
}

impl<'a> SettingsPanel<'a> {
    /// Create a new panel over the form.
    pub fn new(form: &'a SettingsForm, theme: &'a Theme) -> Self {
        Self {
            form,
            theme,
            focused: false,
        }
    }

    /// Set focus state.
    pub fn focused(mut self, focused: bool) -> Self {
        self.focused = focused;
        self
    }

    fn field_lines(&self) -> Vec<Line<'static>> {
        let colors = &self.theme.colors;
        let label_style = Style::default().fg(colors.text_dim);
        let value_style = Style::default().fg(colors.text);
        let focus_style = Style::default()
            .fg(colors.accent)
            .add_modifier(Modifier::BOLD);

        let mut lines = Vec::new();
        for field in SettingsField::ALL {
            let is_focused = self.form.focus() == field;
            let marker = if is_focused { "▸ " } else { "  " };

            match field {
                SettingsField::Service => {
                    let service = self.form.values().service;
                    lines.push(Line::from(Span::styled(
                        format!("{marker}{}", field.label()),
                        label_style,
                    )));
                    lines.push(Line::from(Span::styled(
                        format!("    ◀ {} ▶", service.name()),
                        if is_focused { focus_style } else { value_style },
                    )));
                }
                SettingsField::ApiUrl => {
                    lines.push(Line::from(Span::styled(
                        format!("{marker}{}", field.label()),
                        label_style,
                    )));
                    lines.push(text_value_line(
                        &self.form.values().api_url,
                        is_focused,
                        value_style,
                        focus_style,
                    ));
                }
                SettingsField::ApiKey => {
                    lines.push(Line::from(Span::styled(
                        format!("{marker}{}", field.label()),
                        label_style,
                    )));
                    let masked = if self.form.values().api_key.is_empty() {
                        String::new()
                    } else {
                        self.form.masked_key()
                    };
                    lines.push(text_value_line(&masked, is_focused, value_style, focus_style));
                }
                SettingsField::Model => {
                    lines.push(Line::from(Span::styled(
                        format!("{marker}{}", field.label()),
                        label_style,
                    )));
                    if self.form.values().model.is_empty() {
                        lines.push(Line::from(Span::styled(
                            format!("    {} (suggested)", self.form.model_placeholder()),
                            Style::default().fg(colors.text_dim),
                        )));
                    } else {
                        lines.push(text_value_line(
                            &self.form.values().model,
                            is_focused,
                            value_style,
                            focus_style,
                        ));
                    }
                }
                SettingsField::Save => {
                    lines.push(Line::default());
                    lines.push(Line::from(Span::styled(
                        format!("{marker}[ {} ]", field.label()),
                        if is_focused { focus_style } else { value_style },
                    )));
                }
            }
            lines.push(Line::default());
        }

        if self.form.is_submitted() {
            lines.push(Line::from(Span::styled(
                "Settings saved. The host applies them on its next analysis call.",
                Style::default().fg(colors.status_healthy),
            )));
        }

        lines
    }
}

fn text_value_line(
    value: &str,
    focused: bool,
    value_style: Style,
    focus_style: Style,
) -> Line<'static> {
    let cursor = if focused { "▌" } else { "" };
    Line::from(Span::styled(
        format!("    {value}{cursor}"),
        if focused { focus_style } else { value_style },
    ))
}

impl Widget for SettingsPanel<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;
        let border_style = if self.focused {
            Style::default().fg(colors.header)
        } else {
            Style::default().fg(colors.border_dim)
        };

        let panel = Paragraph::new(self.field_lines()).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(border_style)
                .title(Span::styled(
                    " Settings ",
                    Style::default().fg(colors.header).add_modifier(Modifier::BOLD),
                )),
        );

        panel.render(area, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use procmon_core::settings::{GROQ_DEFAULT_ENDPOINT, OLLAMA_DEFAULT_ENDPOINT};

    fn form() -> SettingsForm {
        SettingsForm::new(SettingsDefaults::default())
    }

    #[test]
    fn test_initial_state_seeds_groq_defaults() {
        let form = form();
        assert_eq!(form.values().service, AiService::Groq);
        assert_eq!(form.values().api_url, GROQ_DEFAULT_ENDPOINT);
        assert!(form.values().api_key.is_empty());
        assert!(!form.is_submitted());
    }

    #[test]
    fn test_service_selection_overwrites_url() {
        let mut form = form();
        form.select_service(AiService::Ollama);
        assert_eq!(form.values().api_url, OLLAMA_DEFAULT_ENDPOINT);

        form.select_service(AiService::Groq);
        assert_eq!(form.values().api_url, GROQ_DEFAULT_ENDPOINT);
    }

    #[test]
    fn test_service_selection_clobbers_manual_url_edit() {
        let mut form = form();
        form.focus_next(); // ApiUrl
        assert_eq!(form.focus(), SettingsField::ApiUrl);
        for c in "x".chars() {
            form.input(c);
        }
        assert!(form.values().api_url.ends_with('x'));

        form.select_service(AiService::Ollama);
        assert_eq!(form.values().api_url, OLLAMA_DEFAULT_ENDPOINT);
    }

    #[test]
    fn test_service_selection_preserves_key_and_model() {
        let mut form = form();
        form.focus = SettingsField::ApiKey;
        for c in "secret".chars() {
            form.input(c);
        }
        form.focus = SettingsField::Model;
        form.backspace(); // edit the seeded model
        let model_before = form.values().model.clone();

        form.select_service(AiService::Ollama);
        assert_eq!(form.values().api_key, "secret");
        assert_eq!(form.values().model, model_before);
    }

    #[test]
    fn test_cycle_service_wraps_both_ways() {
        let mut form = form();
        form.cycle_service_next();
        assert_eq!(form.values().service, AiService::Ollama);
        form.cycle_service_next();
        assert_eq!(form.values().service, AiService::Groq);
        form.cycle_service_prev();
        assert_eq!(form.values().service, AiService::Ollama);
    }

    #[test]
    fn test_focus_order_wraps() {
        let mut form = form();
        let mut seen = vec![form.focus()];
        for _ in 0..4 {
            form.focus_next();
            seen.push(form.focus());
        }
        assert_eq!(seen, SettingsField::ALL.to_vec());

        form.focus_next();
        assert_eq!(form.focus(), SettingsField::Service);
        form.focus_prev();
        assert_eq!(form.focus(), SettingsField::Save);
    }

    #[test]
    fn test_input_ignored_on_selector_and_save() {
        let mut form = form();
        let url_before = form.values().api_url.clone();
        form.input('z'); // focus is Service
        assert_eq!(form.values().api_url, url_before);

        form.focus = SettingsField::Save;
        form.input('z');
        form.backspace();
        assert_eq!(form.values().api_url, url_before);
    }

    #[test]
    fn test_activate_on_selector_cycles_service() {
        let mut form = form();
        assert!(form.activate().is_none());
        assert_eq!(form.values().service, AiService::Ollama);
        assert_eq!(form.values().api_url, OLLAMA_DEFAULT_ENDPOINT);
    }

    #[test]
    fn test_activate_on_text_field_advances_focus() {
        let mut form = form();
        form.focus = SettingsField::ApiUrl;
        assert!(form.activate().is_none());
        assert_eq!(form.focus(), SettingsField::ApiKey);
    }

    #[test]
    fn test_activate_on_save_submits() {
        let mut form = form();
        form.focus = SettingsField::Save;
        let submitted = form.activate().expect("save should submit");
        assert!(form.is_submitted());
        assert_eq!(submitted.service, AiService::Groq);
        assert_eq!(submitted.api_url, GROQ_DEFAULT_ENDPOINT);
    }

    #[test]
    fn test_submit_returns_full_field_set() {
        let mut form = form();
        form.focus = SettingsField::ApiKey;
        for c in "gsk_secret1234".chars() {
            form.input(c);
        }
        let submitted = form.submit();
        assert_eq!(submitted.api_key, "gsk_secret1234");
        // The redacted rendering never contains the full secret
        assert!(!submitted.redacted_key().contains("gsk_secret"));
        assert!(submitted.redacted_key().ends_with("1234"));
    }
}
