//! # procmon-core
//!
//! Core types, event bus, and utilities for the procmon frontend.
//!
//! This crate provides:
//! - [`ProcmonError`] - Error types for all procmon operations
//! - [`logging`] - Tracing setup and log management utilities
//! - [`types`] - The process-record wire type and channel constants
//! - [`settings`] - AI service settings model and defaults
//! - [`bus`] - The named-channel event bus and scoped subscriptions
//!
//! ## Example
//!
//! ```no_run
//! use procmon_core::{logging, EventBus, PROCESS_LOG_CHANNEL};
//!
//! fn main() -> procmon_core::Result<()> {
//!     let _guard = logging::init_logging(None, false)?;
//!
//!     let bus = EventBus::new();
//!     bus.emit(PROCESS_LOG_CHANNEL, r#"{"pid":1,"name":"a","status":"running","cpu":0.0,"description":""}"#);
//!     Ok(())
//! }
//! ```

pub mod bus;
pub mod error;
pub mod logging;
pub mod settings;
pub mod types;

// Re-export main types for convenience
pub use bus::{EventBus, Subscription};
pub use error::{ProcmonError, Result};
pub use logging::{init_logging, LogGuard};
pub use settings::{AiService, SettingsDefaults, SettingsValues};
pub use types::{ProcessRecord, PROCESS_LOG_CHANNEL};
