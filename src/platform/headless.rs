//! In-memory status menu backend.
//!
//! Records every native call instead of talking to a shell, so exporters can
//! run without a desktop session (tests, CI, hosts without a notification
//! area). Failures and popup results can be scripted.

use super::{
    IconHandle, IconLoader, MenuHandle, NativeEntry, NotifyIconData, ScreenPoint,
    StatusMenuBackend, TrackMode, WindowHandle,
};
use crate::error::NativeError;
use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicIsize, AtomicUsize, Ordering};

/// `ERROR_INVALID_MENU_HANDLE`
const ERROR_INVALID_MENU_HANDLE: u32 = 1401;

/// A popup shown through [`StatusMenuBackend::track_popup_menu`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackedPopup {
    pub menu: MenuHandle,
    pub owner: WindowHandle,
    pub position: ScreenPoint,
    pub mode: TrackMode,
}

#[derive(Default)]
struct HeadlessState {
    next_handle: isize,
    menus: BTreeMap<MenuHandle, Vec<NativeEntry>>,
    menus_created: usize,
    menus_destroyed: Vec<MenuHandle>,
    icons: Vec<NotifyIconData>,
    icon_add_calls: usize,
    icon_delete_calls: usize,
    tracked: Vec<TrackedPopup>,
    cursor: Option<ScreenPoint>,
    popup_result: u32,
    fail_insert_ids: Vec<u32>,
    fail_icon_add: bool,
    fail_create_menu: bool,
}

/// Backend that keeps native state in memory.
pub struct HeadlessBackend {
    state: Mutex<HeadlessState>,
}

impl Default for HeadlessBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl HeadlessBackend {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(HeadlessState {
                next_handle: 0x100,
                cursor: Some(ScreenPoint { x: 0, y: 0 }),
                ..Default::default()
            }),
        }
    }

    // ── Scripting ──────────────────────────────────────────────────────────

    /// Cursor position reported to the exporter; `None` simulates a failed read.
    pub fn set_cursor_position(&self, cursor: Option<ScreenPoint>) {
        self.state.lock().cursor = cursor;
    }

    /// Command id returned by popups tracked in [`TrackMode::WaitForResult`].
    pub fn set_popup_result(&self, command_id: u32) {
        self.state.lock().popup_result = command_id;
    }

    /// Make inserting the entry with `id` fail.
    pub fn fail_insert_for(&self, id: u32) {
        self.state.lock().fail_insert_ids.push(id);
    }

    pub fn set_fail_icon_add(&self, fail: bool) {
        self.state.lock().fail_icon_add = fail;
    }

    pub fn set_fail_create_menu(&self, fail: bool) {
        self.state.lock().fail_create_menu = fail;
    }

    // ── Inspection ─────────────────────────────────────────────────────────

    /// Menus created and not yet destroyed.
    pub fn live_menus(&self) -> Vec<MenuHandle> {
        self.state.lock().menus.keys().copied().collect()
    }

    pub fn menus_created(&self) -> usize {
        self.state.lock().menus_created
    }

    pub fn menus_destroyed(&self) -> Vec<MenuHandle> {
        self.state.lock().menus_destroyed.clone()
    }

    /// Entries of a live menu, in position order.
    pub fn entries(&self, menu: MenuHandle) -> Option<Vec<NativeEntry>> {
        self.state.lock().menus.get(&menu).cloned()
    }

    /// Currently registered notification icons.
    pub fn icons(&self) -> Vec<NotifyIconData> {
        self.state.lock().icons.clone()
    }

    pub fn icon_add_calls(&self) -> usize {
        self.state.lock().icon_add_calls
    }

    pub fn icon_delete_calls(&self) -> usize {
        self.state.lock().icon_delete_calls
    }

    pub fn tracked_popups(&self) -> Vec<TrackedPopup> {
        self.state.lock().tracked.clone()
    }
}

impl StatusMenuBackend for HeadlessBackend {
    fn create_popup_menu(&self) -> Result<MenuHandle, NativeError> {
        let mut state = self.state.lock();
        if state.fail_create_menu {
            return Err(NativeError::new(8, "Not enough memory resources"));
        }
        state.next_handle += 1;
        let handle = MenuHandle(state.next_handle);
        state.menus.insert(handle, Vec::new());
        state.menus_created += 1;
        Ok(handle)
    }

    fn destroy_menu(&self, menu: MenuHandle) -> Result<(), NativeError> {
        let mut state = self.state.lock();
        if state.menus.remove(&menu).is_none() {
            return Err(NativeError::new(
                ERROR_INVALID_MENU_HANDLE,
                "Invalid menu handle",
            ));
        }
        state.menus_destroyed.push(menu);
        Ok(())
    }

    fn insert_entry(
        &self,
        menu: MenuHandle,
        position: u32,
        entry: &NativeEntry,
    ) -> Result<(), NativeError> {
        let mut state = self.state.lock();
        if state.fail_insert_ids.contains(&entry.id()) {
            return Err(NativeError::new(87, "The parameter is incorrect"));
        }
        let entries = state.menus.get_mut(&menu).ok_or_else(|| {
            NativeError::new(ERROR_INVALID_MENU_HANDLE, "Invalid menu handle")
        })?;
        let position = (position as usize).min(entries.len());
        entries.insert(position, entry.clone());
        Ok(())
    }

    fn add_notify_icon(&self, data: &NotifyIconData) -> Result<(), NativeError> {
        let mut state = self.state.lock();
        state.icon_add_calls += 1;
        if state.fail_icon_add {
            return Err(NativeError::new(0x8000_4005, "Unspecified error"));
        }
        state.icons.push(data.clone());
        Ok(())
    }

    fn delete_notify_icon(&self, data: &NotifyIconData) -> Result<(), NativeError> {
        let mut state = self.state.lock();
        state.icon_delete_calls += 1;
        let before = state.icons.len();
        state
            .icons
            .retain(|icon| !(icon.window == data.window && icon.icon_id == data.icon_id));
        if state.icons.len() == before {
            return Err(NativeError::new(0x8000_4005, "Unspecified error"));
        }
        Ok(())
    }

    fn cursor_position(&self) -> Option<ScreenPoint> {
        self.state.lock().cursor
    }

    fn track_popup_menu(
        &self,
        menu: MenuHandle,
        owner: WindowHandle,
        position: ScreenPoint,
        mode: TrackMode,
    ) -> Result<u32, NativeError> {
        let mut state = self.state.lock();
        if !state.menus.contains_key(&menu) {
            return Err(NativeError::new(
                ERROR_INVALID_MENU_HANDLE,
                "Invalid menu handle",
            ));
        }
        state.tracked.push(TrackedPopup {
            menu,
            owner,
            position,
            mode,
        });
        Ok(match mode {
            TrackMode::FireAndForget => 0,
            TrackMode::WaitForResult => state.popup_result,
        })
    }
}

/// Icon loader that accepts any byte stream the `image` crate can decode.
#[derive(Default)]
pub struct HeadlessIconLoader {
    next_handle: AtomicIsize,
    loads: AtomicUsize,
}

impl HeadlessIconLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of icons successfully loaded.
    pub fn loads(&self) -> usize {
        self.loads.load(Ordering::SeqCst)
    }
}

impl IconLoader for HeadlessIconLoader {
    fn load_icon(&self, bytes: &[u8]) -> Option<IconHandle> {
        if let Err(e) = image::load_from_memory(bytes) {
            log::warn!("Headless icon loader rejected icon stream: {}", e);
            return None;
        }
        self.loads.fetch_add(1, Ordering::SeqCst);
        Some(IconHandle(self.next_handle.fetch_add(1, Ordering::SeqCst) + 1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_menu_lifecycle_is_recorded() {
        let backend = HeadlessBackend::new();
        let menu = backend.create_popup_menu().unwrap();
        backend
            .insert_entry(menu, 0, &NativeEntry::Separator { id: 1000 })
            .unwrap();
        assert_eq!(backend.entries(menu).unwrap().len(), 1);

        backend.destroy_menu(menu).unwrap();
        assert!(backend.live_menus().is_empty());
        assert_eq!(backend.menus_destroyed(), vec![menu]);
        assert!(backend.destroy_menu(menu).is_err());
    }

    #[test]
    fn test_scripted_insert_failure() {
        let backend = HeadlessBackend::new();
        backend.fail_insert_for(1001);
        let menu = backend.create_popup_menu().unwrap();
        let err = backend
            .insert_entry(menu, 0, &NativeEntry::Separator { id: 1001 })
            .unwrap_err();
        assert_eq!(err.code, 87);
    }

    #[test]
    fn test_icon_loader_rejects_garbage() {
        let loader = HeadlessIconLoader::new();
        assert!(loader.load_icon(b"not an image").is_none());
        assert_eq!(loader.loads(), 0);
    }
}
