//! Terminal UI for procmon.
//!
//! This crate provides the Ratatui-based frontend for the process
//! monitor: a live table of host-emitted process events and a settings
//! form for the external AI service, rendered inside a shared
//! sidebar-plus-content layout.
//!
//! ## Hotkeys
//!
//! - `p` - Process log table (default view)
//! - `s` - Settings form
//! - `Tab` - Cycle views
//! - `↑`/`↓` - Scroll the table / move form focus
//! - `G`/`End` - Jump to bottom and resume auto-follow
//! - `Ctrl+S` - Save settings
//! - `?` or `h` - Help
//! - `q` - Quit

pub mod app;
pub mod event;
pub mod feed;
pub mod process_panel;
pub mod settings_panel;
pub mod theme;
pub mod view;

pub use app::{App, AppOptions, AppResult};
pub use feed::ProcessFeed;
pub use process_panel::{FollowScroll, ProcessTable};
pub use settings_panel::SettingsForm;
pub use view::View;
