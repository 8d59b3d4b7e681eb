//! Default value functions for configuration.
//!
//! Used as `#[serde(default = "crate::defaults::...")]` attributes on
//! `ExporterConfig` fields.

use crate::types::LogLevel;

pub fn item_index_base() -> u32 {
    1000
}

pub fn icon_id() -> u32 {
    0
}

/// `WM_APP + 1`
pub fn callback_message() -> u32 {
    0x8001
}

pub fn tooltip_max_chars() -> usize {
    crate::MAX_TOOLTIP_CHARS
}

pub fn log_level() -> LogLevel {
    LogLevel::Info
}
