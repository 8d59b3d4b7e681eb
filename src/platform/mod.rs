//! Platform adapter layer.
//!
//! The exporter core only talks to the native shell through the traits in this
//! module:
//! - [`StatusMenuBackend`]: popup menu handles, entries, notification icon
//!   registration, cursor position and popup tracking
//! - [`IconLoader`]: turns an icon byte stream into a native icon handle
//! - [`dispatcher::Dispatcher`]: posts deferred work onto the UI thread
//!
//! Native flag words stay inside the backend implementations. Raw window
//! message decoding lives in [`message`].

pub mod dispatcher;
pub mod headless;
pub mod message;
#[cfg(target_os = "windows")]
pub mod windows;

use crate::error::NativeError;
use raw_window_handle::{HasWindowHandle, RawWindowHandle};

/// Native window that owns the status menu (an `HWND` on Windows).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WindowHandle(pub isize);

impl WindowHandle {
    /// Extract the Win32 window handle from any window exposing a raw handle.
    ///
    /// Returns `None` for other window systems.
    pub fn from_window(window: &impl HasWindowHandle) -> Option<Self> {
        match window.window_handle().ok()?.as_raw() {
            RawWindowHandle::Win32(handle) => Some(Self(handle.hwnd.get())),
            other => {
                log::debug!("Status menu export unavailable for window handle {:?}", other);
                None
            }
        }
    }
}

/// Native popup menu handle (an `HMENU` on Windows).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MenuHandle(pub isize);

/// Native icon handle (an `HICON` on Windows).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct IconHandle(pub isize);

/// Screen coordinates in physical pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ScreenPoint {
    pub x: i32,
    pub y: i32,
}

/// Descriptor for one native popup entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NativeEntry {
    Separator {
        id: u32,
    },
    Text {
        id: u32,
        /// Label with access-key markers already converted to native syntax.
        label: String,
        /// Rendered bold; invoked on icon double-click.
        is_default: bool,
    },
}

impl NativeEntry {
    pub fn id(&self) -> u32 {
        match self {
            NativeEntry::Separator { id } | NativeEntry::Text { id, .. } => *id,
        }
    }
}

/// The identifying record of a notification icon registration.
///
/// The same record is used to add and to delete the icon.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotifyIconData {
    pub window: WindowHandle,
    pub icon_id: u32,
    pub callback_message: u32,
    pub icon: IconHandle,
    pub tooltip: String,
}

/// How a popup menu is tracked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackMode {
    /// Return as soon as the popup is shown; the selection arrives later as a
    /// command message.
    FireAndForget,
    /// Block until the popup is dismissed and return the selected command id
    /// (0 when nothing was selected).
    WaitForResult,
}

/// Native menu and notification-area surface.
///
/// Implementations must be callable from the exporter's lock scope; they must
/// not call back into the exporter.
pub trait StatusMenuBackend: Send + Sync {
    /// Allocate a new, empty popup menu.
    fn create_popup_menu(&self) -> Result<MenuHandle, NativeError>;

    /// Destroy a popup menu. Returns once the handle is released.
    fn destroy_menu(&self, menu: MenuHandle) -> Result<(), NativeError>;

    /// Insert `entry` at `position` in `menu`.
    fn insert_entry(
        &self,
        menu: MenuHandle,
        position: u32,
        entry: &NativeEntry,
    ) -> Result<(), NativeError>;

    /// Register a notification icon.
    fn add_notify_icon(&self, data: &NotifyIconData) -> Result<(), NativeError>;

    /// Remove a notification icon registered with the same record.
    fn delete_notify_icon(&self, data: &NotifyIconData) -> Result<(), NativeError>;

    /// Current cursor position, or `None` if it cannot be read.
    fn cursor_position(&self) -> Option<ScreenPoint>;

    /// Show `menu` at `position`, owned by `owner`.
    ///
    /// In [`TrackMode::FireAndForget`] a successful call yields `Ok(0)`.
    fn track_popup_menu(
        &self,
        menu: MenuHandle,
        owner: WindowHandle,
        position: ScreenPoint,
        mode: TrackMode,
    ) -> Result<u32, NativeError>;
}

/// Loads a native icon from an encoded image byte stream.
pub trait IconLoader: Send + Sync {
    fn load_icon(&self, bytes: &[u8]) -> Option<IconHandle>;
}
