//! Process table state and rendering.
//!
//! [`ProcessTable`] is the reconciler: an ordered list of process records
//! keyed by pid with insert-or-update semantics. [`FollowScroll`] keeps
//! the viewport pinned to the newest row until the user scrolls away from
//! the bottom, and re-engages when they scroll back.

use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Rect},
    style::{Modifier, Style},
    text::Span,
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, Widget},
};

use procmon_core::types::ProcessRecord;

use crate::theme::Theme;

/// Default bound on retained rows.
///
/// The original view grew without bound for the life of the session; the
/// rewrite keeps a capacity and evicts the oldest first-seen row when a
/// new pid arrives at the limit.
pub const DEFAULT_TABLE_CAPACITY: usize = 1024;

/// Rows of slack from the bottom edge still counted as "at the bottom".
///
/// The cell-based analogue of the original's 1-pixel tolerance.
pub const FOLLOW_TOLERANCE_ROWS: usize = 1;

/// Outcome of applying one event to the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyOutcome {
    /// First event for this pid: appended (possibly evicting the oldest row)
    Inserted,
    /// Existing pid: replaced in place, position unchanged
    Updated,
}

/// Ordered list of process records, one per pid.
#[derive(Debug, Clone)]
pub struct ProcessTable {
    rows: Vec<ProcessRecord>,
    capacity: usize,
}

impl Default for ProcessTable {
    fn default() -> Self {
        Self::new(DEFAULT_TABLE_CAPACITY)
    }
}

impl ProcessTable {
    /// Create a table bounded to `capacity` rows (minimum 1).
    pub fn new(capacity: usize) -> Self {
        Self {
            rows: Vec::new(),
            capacity: capacity.max(1),
        }
    }

    /// Apply one incoming record: replace in place when the pid is known,
    /// append otherwise. The whole record is replaced, never field-merged.
    pub fn apply(&mut self, record: ProcessRecord) -> ApplyOutcome {
        if let Some(existing) = self.rows.iter_mut().find(|row| row.pid == record.pid) {
            *existing = record;
            return ApplyOutcome::Updated;
        }

        if self.rows.len() >= self.capacity {
            let evicted = self.rows.remove(0);
            tracing::debug!(pid = evicted.pid, capacity = self.capacity, "evicted oldest row");
        }
        self.rows.push(record);
        ApplyOutcome::Inserted
    }

    /// The rows in first-seen order.
    pub fn rows(&self) -> &[ProcessRecord] {
        &self.rows
    }

    /// Number of retained rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Returns true when no events have been received yet.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// The configured row bound.
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

/// Viewport scroll state with auto-follow.
///
/// `follow` is re-evaluated at every manual scroll action: it is set
/// exactly when the viewport sits at the bottom edge, which lets the user
/// pause auto-follow by scrolling up and resume it by scrolling back down.
/// After a table update, a following viewport snaps to the new bottom and
/// a paused one stays put.
#[derive(Debug, Clone)]
pub struct FollowScroll {
    offset: usize,
    follow: bool,
}

impl Default for FollowScroll {
    fn default() -> Self {
        Self {
            offset: 0,
            follow: true,
        }
    }
}

impl FollowScroll {
    /// Top visible row index.
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Whether the viewport is pinned to the bottom.
    pub fn is_following(&self) -> bool {
        self.follow
    }

    fn max_offset(len: usize, viewport: usize) -> usize {
        len.saturating_sub(viewport.max(1))
    }

    /// Whether the viewport sits at the bottom edge, within
    /// [`FOLLOW_TOLERANCE_ROWS`].
    pub fn at_bottom(&self, len: usize, viewport: usize) -> bool {
        Self::max_offset(len, viewport).saturating_sub(self.offset) < FOLLOW_TOLERANCE_ROWS
    }

    /// Scroll up by `rows` (a manual action: re-evaluates follow).
    pub fn scroll_up(&mut self, rows: usize, len: usize, viewport: usize) {
        self.offset = self.offset.saturating_sub(rows);
        self.follow = self.at_bottom(len, viewport);
    }

    /// Scroll down by `rows` (a manual action: re-evaluates follow).
    pub fn scroll_down(&mut self, rows: usize, len: usize, viewport: usize) {
        self.offset = (self.offset + rows).min(Self::max_offset(len, viewport));
        self.follow = self.at_bottom(len, viewport);
    }

    /// Jump to the top. Disengages follow unless everything fits.
    pub fn jump_to_top(&mut self, len: usize, viewport: usize) {
        self.offset = 0;
        self.follow = self.at_bottom(len, viewport);
    }

    /// Jump to the bottom and re-engage follow.
    pub fn jump_to_bottom(&mut self, len: usize, viewport: usize) {
        self.offset = Self::max_offset(len, viewport);
        self.follow = true;
    }

    /// Reconcile the viewport after the table changed.
    pub fn after_update(&mut self, len: usize, viewport: usize) {
        let max = Self::max_offset(len, viewport);
        if self.follow {
            self.offset = max;
        } else {
            // Eviction can shrink the list underneath a paused viewport
            self.offset = self.offset.min(max);
        }
    }
}

/// Usable table rows inside a bordered panel with a header row.
pub fn viewport_rows(area: Rect) -> usize {
    area.height.saturating_sub(3) as usize
}

/// The process log panel widget.
pub struct ProcessPanel<'a> {
    table: &'a ProcessTable,
    scroll: &'a FollowScroll,
    theme: &'a Theme,
    focused: bool,
}

impl<'a> ProcessPanel<'a> {
    /// Create a new panel over the table and scroll state.
    pub fn new(table: &'a ProcessTable, scroll: &'a FollowScroll, theme: &'a Theme) -> Self {
        Self {
            table,
            scroll,
            theme,
            focused: false,
        }
    }

    /// Set focus state.
    pub fn focused(mut self, focused: bool) -> Self {
        self.focused = focused;
        self
    }

    fn title(&self) -> String {
        let mut title = format!(" Process Logs ({}) ", self.table.len());
        if !self.scroll.is_following() {
            title.push_str("[paused] ");
        }
        title
    }

    fn status_style(&self, record: &ProcessRecord) -> Style {
        if record.is_running() {
            Style::default().fg(self.theme.colors.status_healthy)
        } else {
            Style::default().fg(self.theme.colors.status_warning)
        }
    }
}

impl Widget for ProcessPanel<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;
        let border_style = if self.focused {
            Style::default().fg(colors.header)
        } else {
            Style::default().fg(colors.border_dim)
        };
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(border_style)
            .title(Span::styled(
                self.title(),
                Style::default().fg(colors.header).add_modifier(Modifier::BOLD),
            ));

        if self.table.is_empty() {
            let placeholder = Paragraph::new("No process events yet...")
                .style(Style::default().fg(colors.text_dim))
                .block(block);
            placeholder.render(area, buf);
            return;
        }

        let viewport = viewport_rows(area);
        let start = self.scroll.offset().min(self.table.len().saturating_sub(1));
        let end = (start + viewport).min(self.table.len());

        let header = Row::new(
            ["PID", "Name", "Status", "CPU (%)", "Description"]
                .into_iter()
                .map(|label| Cell::from(Span::styled(label, Style::default().fg(colors.text_dim)))),
        )
        .style(Style::default().add_modifier(Modifier::BOLD));

        let rows = self.table.rows()[start..end].iter().map(|record| {
            Row::new(vec![
                Cell::from(record.pid.to_string()),
                Cell::from(record.name.clone()),
                Cell::from(Span::styled(record.status.clone(), self.status_style(record))),
                Cell::from(record.cpu_display()),
                Cell::from(record.description.clone()),
            ])
            .style(Style::default().fg(colors.text))
        });

        let table = Table::new(
            rows,
            [
                Constraint::Length(8),
                Constraint::Length(20),
                Constraint::Length(10),
                Constraint::Length(8),
                Constraint::Min(20),
            ],
        )
        .header(header)
        .block(block);

        table.render(area, buf);
    }
}
