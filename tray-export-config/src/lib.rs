//! Configuration system for the tray-export status menu exporter.
//!
//! This crate provides configuration loading, saving, validation and default
//! values for the exporter. It includes:
//!
//! - Native identifier layout (command id base, notification icon id)
//! - The private window message used for notification icon callbacks
//! - Tooltip limits
//! - Log level selection for hosts that install a logger

pub mod config;
pub mod defaults;
pub mod error;
mod types;

pub use config::ExporterConfig;
pub use error::ConfigError;
pub use types::LogLevel;

/// Largest accepted command id base.
///
/// Command ids travel in the low word of a command message, so
/// `base + child_count` has to stay below `0x1_0000`. Capping the base leaves
/// room for 4096 popup entries.
pub const MAX_ITEM_INDEX_BASE: u32 = 0xF000;

/// First private window message (`WM_USER`).
pub const MIN_CALLBACK_MESSAGE: u32 = 0x0400;

/// Last message in the application-private range.
pub const MAX_CALLBACK_MESSAGE: u32 = 0xBFFF;

/// Tooltip buffer size of the shell notification icon record, minus the terminator.
pub const MAX_TOOLTIP_CHARS: usize = 127;
