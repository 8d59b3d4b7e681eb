//! Typed error types for tray-export.
//!
//! Native call failures are logged and swallowed at component boundaries, so
//! these types mostly travel between internal helpers and the log line that
//! reports them. Ownership violations are not represented here: they panic.

use thiserror::Error;

/// A failed native call, with the decoded platform error code.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message} (native error {code:#010x})")]
pub struct NativeError {
    /// Platform error code (`GetLastError` / `HRESULT` on Windows).
    pub code: u32,
    /// Human-readable description of the code.
    pub message: String,
}

impl NativeError {
    pub fn new(code: u32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

/// Errors raised while exporting a menu tree.
#[derive(Debug, Error)]
pub enum ExportError {
    /// A native menu, icon or popup call failed.
    #[error("{operation} failed: {source}")]
    Native {
        /// Short name of the native operation.
        operation: &'static str,
        /// Decoded native error.
        #[source]
        source: NativeError,
    },

    /// The bound item's icon could not be serialized into a byte stream.
    #[error("Failed to encode status icon: {0}")]
    IconEncode(#[from] image::ImageError),

    /// A child position does not map into the 16-bit command id space.
    #[error("No command id available for position {0}")]
    IdOverflow(usize),

    /// The exporter configuration failed validation.
    #[error("Invalid exporter configuration: {0}")]
    Config(#[from] tray_export_config::ConfigError),

    /// The host window does not expose a Win32 window handle.
    #[error("Window does not expose a Win32 handle; status menu export unavailable")]
    NoWindowHandle,
}

impl ExportError {
    pub(crate) fn native(operation: &'static str, source: NativeError) -> Self {
        ExportError::Native { operation, source }
    }
}
