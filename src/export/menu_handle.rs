//! Ownership of the single native popup menu handle.

use super::translator;
use crate::error::ExportError;
use crate::menu::MenuItem;
use crate::platform::{MenuHandle, StatusMenuBackend};
use tray_export_config::ExporterConfig;

/// Owns at most one native popup menu and rebuilds it wholesale.
#[derive(Debug, Default)]
pub(crate) struct MenuHandleManager {
    handle: Option<MenuHandle>,
    default_item_index: Option<usize>,
}

impl MenuHandleManager {
    pub fn handle(&self) -> Option<MenuHandle> {
        self.handle
    }

    /// Position of the entry a double-click invokes, if any.
    pub fn default_item_index(&self) -> Option<usize> {
        self.default_item_index
    }

    /// Replace the native menu with a fresh one built from `menu`'s children.
    ///
    /// The previous handle is destroyed before the new one is allocated.
    /// Failed insertions are logged and skipped. Returns false if no popup
    /// menu could be allocated.
    pub fn rebuild(
        &mut self,
        backend: &dyn StatusMenuBackend,
        config: &ExporterConfig,
        menu: &MenuItem,
    ) -> bool {
        self.release(backend);

        let handle = match backend.create_popup_menu() {
            Ok(handle) => handle,
            Err(e) => {
                log::error!("{}", ExportError::native("CreatePopupMenu", e));
                return false;
            }
        };
        self.handle = Some(handle);
        self.default_item_index = None;

        let children = menu.children();
        for (position, node) in children.iter().enumerate() {
            // The first child visited becomes the default, whatever its kind.
            if self.default_item_index.is_none() {
                self.default_item_index = Some(position);
            }

            let Some(id) = config.command_id(position) else {
                log::warn!("{}", ExportError::IdOverflow(position));
                continue;
            };
            let Some(entry) = translator::translate(node, position, id, self.default_item_index)
            else {
                continue;
            };

            log::debug!("Adding status menu entry #{}: {:?}", position, entry);
            if let Err(e) = backend.insert_entry(handle, position as u32, &entry) {
                log::warn!(
                    "Failed to insert status menu entry #{}: {}",
                    position,
                    ExportError::native("InsertMenuItem", e)
                );
            }
        }

        log::debug!(
            "Rebuilt status menu {:?} with {} entries",
            handle,
            children.len()
        );
        true
    }

    /// Destroy the current handle, if any.
    pub fn release(&mut self, backend: &dyn StatusMenuBackend) {
        if let Some(handle) = self.handle.take()
            && let Err(e) = backend.destroy_menu(handle)
        {
            log::warn!("{}", ExportError::native("DestroyMenu", e));
        }
    }
}
