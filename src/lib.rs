//! Export of application menu trees to the native status area.
//!
//! A [`StatusMenuExporter`] owns, for one native window, a popup menu rebuilt
//! from a logical [`MenuItem`] tree and at most one notification (tray) icon.
//! Native window messages routed back into the exporter become click events on
//! the logical items.
//!
//! # Locking
//!
//! Each exporter guards its native state with a single `parking_lot::Mutex`.
//! The lock is never held while user callbacks run (click handlers, exported
//! flag listeners), and never while a popup menu is being tracked, so both may
//! call back into the exporter.
//!
//! Logging goes through the `log` facade; the crate never installs a logger.

pub mod attach;
pub mod error;
pub mod export;
pub mod menu;
pub mod platform;

pub use attach::{ExportedFlag, StatusMenuAttachment, StatusMenuHost, attach_status_menu};
pub use error::{ExportError, NativeError};
pub use export::{StatusMenuExporter, escape_mnemonic};
pub use menu::{ClickBridge, IconImage, MenuItem, MenuNode, SubscriptionId};
pub use platform::dispatcher::{DispatchPriority, Dispatcher, QueuedDispatcher};
pub use platform::headless::{HeadlessBackend, HeadlessIconLoader};
pub use platform::message::IconInteraction;
pub use platform::{
    IconHandle, IconLoader, MenuHandle, NativeEntry, NotifyIconData, ScreenPoint,
    StatusMenuBackend, TrackMode, WindowHandle,
};
pub use tray_export_config::{ConfigError, ExporterConfig};
