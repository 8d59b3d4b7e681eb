//! Notification (tray) icon registration.

use crate::error::ExportError;
use crate::menu::MenuItem;
use crate::platform::{IconLoader, NotifyIconData, StatusMenuBackend, WindowHandle};
use tray_export_config::ExporterConfig;

/// Owns at most one notification icon registration per window.
#[derive(Debug, Default)]
pub(crate) struct NotifyIconManager {
    registration: Option<NotifyIconData>,
}

impl NotifyIconManager {
    pub fn is_created(&self) -> bool {
        self.registration.is_some()
    }

    pub fn registration(&self) -> Option<&NotifyIconData> {
        self.registration.as_ref()
    }

    /// Register the icon for `menu` unless one is already registered.
    ///
    /// Skipped when the item carries no icon. Failures are logged and the icon
    /// is treated as absent; there is no retry until the next call.
    pub fn ensure_icon(
        &mut self,
        backend: &dyn StatusMenuBackend,
        loader: &dyn IconLoader,
        window: WindowHandle,
        config: &ExporterConfig,
        menu: &MenuItem,
    ) {
        if self.registration.is_some() {
            return;
        }
        let Some(icon) = menu.icon() else {
            log::debug!("Bound status menu has no icon; notification icon not created");
            return;
        };

        let bytes = match icon.to_png_bytes() {
            Ok(bytes) => bytes,
            Err(e) => {
                log::warn!("{}", ExportError::from(e));
                return;
            }
        };
        let Some(icon_handle) = loader.load_icon(&bytes) else {
            log::warn!("Icon loader produced no handle for the status icon");
            return;
        };

        let data = NotifyIconData {
            window,
            icon_id: config.icon_id,
            callback_message: config.callback_message,
            icon: icon_handle,
            tooltip: truncate_tooltip(&menu.header(), config.tooltip_max_chars),
        };
        match backend.add_notify_icon(&data) {
            Ok(()) => {
                log::info!(
                    "Created notification icon {} for window {:?}",
                    data.icon_id,
                    window
                );
                self.registration = Some(data);
            }
            Err(e) => log::error!("{}", ExportError::native("Shell_NotifyIcon(ADD)", e)),
        }
    }

    /// Remove the registered icon, if any. Safe to call repeatedly.
    pub fn teardown(&mut self, backend: &dyn StatusMenuBackend) {
        if let Some(data) = self.registration.take() {
            if let Err(e) = backend.delete_notify_icon(&data) {
                log::warn!("{}", ExportError::native("Shell_NotifyIcon(DELETE)", e));
            } else {
                log::info!("Removed notification icon {}", data.icon_id);
            }
        }
    }
}

/// Cut `text` to at most `max_units` UTF-16 code units without splitting a
/// surrogate pair.
pub(crate) fn truncate_tooltip(text: &str, max_units: usize) -> String {
    let mut units = 0;
    let mut end = 0;
    for (index, c) in text.char_indices() {
        units += c.len_utf16();
        if units > max_units {
            break;
        }
        end = index + c.len_utf8();
    }
    text[..end].to_string()
}
