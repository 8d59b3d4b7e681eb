//! Win32 status menu backend.
//!
//! Popup menus are plain `HMENU`s built with `InsertMenuW`; the notification
//! icon is registered through `Shell_NotifyIconW` with version-4 callback
//! semantics. All calls must happen on the thread that owns the window.

use super::{
    IconHandle, IconLoader, MenuHandle, NativeEntry, NotifyIconData, ScreenPoint,
    StatusMenuBackend, TrackMode, WindowHandle,
};
use crate::error::NativeError;
use parking_lot::Mutex;
use std::ffi::c_void;
use windows::Win32::Foundation::{HWND, POINT};
use windows::Win32::UI::Shell::{
    NIF_ICON, NIF_MESSAGE, NIF_SHOWTIP, NIF_TIP, NIM_ADD, NIM_DELETE, NIM_SETVERSION, NIS_HIDDEN,
    NOTIFYICON_VERSION_4, NOTIFYICONDATAW, Shell_NotifyIconW,
};
use windows::Win32::UI::WindowsAndMessaging::{
    CreateIcon, CreatePopupMenu, DestroyIcon, DestroyMenu, GetCursorPos, HICON, HMENU,
    InsertMenuW, MF_BYPOSITION, MF_SEPARATOR, MF_STRING, SetForegroundWindow, SetMenuDefaultItem,
    TPM_LEFTALIGN, TPM_NONOTIFY, TPM_RETURNCMD, TPM_RIGHTALIGN, TrackPopupMenuEx,
};
use windows::core::{Error as WinError, PCWSTR};

fn native_error(error: WinError) -> NativeError {
    NativeError::new(error.code().0 as u32, error.message())
}

/// Error for calls that report failure through `GetLastError`.
fn last_error() -> NativeError {
    native_error(WinError::from_win32())
}

fn hwnd(window: WindowHandle) -> HWND {
    HWND(window.0 as *mut c_void)
}

fn hmenu(menu: MenuHandle) -> HMENU {
    HMENU(menu.0 as *mut c_void)
}

fn wide(text: &str) -> Vec<u16> {
    text.encode_utf16().chain(std::iter::once(0)).collect()
}

fn notify_icon_data(data: &NotifyIconData) -> NOTIFYICONDATAW {
    let mut nid = NOTIFYICONDATAW {
        cbSize: std::mem::size_of::<NOTIFYICONDATAW>() as u32,
        hWnd: hwnd(data.window),
        uID: data.icon_id,
        uFlags: NIF_MESSAGE | NIF_ICON | NIF_TIP | NIF_SHOWTIP,
        uCallbackMessage: data.callback_message,
        hIcon: HICON(data.icon.0 as *mut c_void),
        dwState: NIS_HIDDEN,
        dwStateMask: NIS_HIDDEN,
        ..Default::default()
    };
    for (slot, unit) in nid
        .szTip
        .iter_mut()
        .zip(data.tooltip.encode_utf16().take(127))
    {
        *slot = unit;
    }
    nid.Anonymous.uVersion = NOTIFYICON_VERSION_4;
    nid
}

/// Backend calling the Win32 menu and shell APIs.
#[derive(Debug, Default)]
pub struct Win32Backend;

impl Win32Backend {
    pub fn new() -> Self {
        Self
    }
}

impl StatusMenuBackend for Win32Backend {
    fn create_popup_menu(&self) -> Result<MenuHandle, NativeError> {
        let menu = unsafe { CreatePopupMenu() }.map_err(native_error)?;
        Ok(MenuHandle(menu.0 as isize))
    }

    fn destroy_menu(&self, menu: MenuHandle) -> Result<(), NativeError> {
        unsafe { DestroyMenu(hmenu(menu)) }.map_err(native_error)
    }

    fn insert_entry(
        &self,
        menu: MenuHandle,
        position: u32,
        entry: &NativeEntry,
    ) -> Result<(), NativeError> {
        match entry {
            NativeEntry::Separator { id } => unsafe {
                InsertMenuW(
                    hmenu(menu),
                    position,
                    MF_BYPOSITION | MF_SEPARATOR,
                    *id as usize,
                    PCWSTR::null(),
                )
            }
            .map_err(native_error),
            NativeEntry::Text {
                id,
                label,
                is_default,
            } => {
                let label = wide(label);
                unsafe {
                    InsertMenuW(
                        hmenu(menu),
                        position,
                        MF_BYPOSITION | MF_STRING,
                        *id as usize,
                        PCWSTR(label.as_ptr()),
                    )
                }
                .map_err(native_error)?;
                if *is_default {
                    unsafe { SetMenuDefaultItem(hmenu(menu), *id, 0) }.map_err(native_error)?;
                }
                Ok(())
            }
        }
    }

    fn add_notify_icon(&self, data: &NotifyIconData) -> Result<(), NativeError> {
        let nid = notify_icon_data(data);
        if !unsafe { Shell_NotifyIconW(NIM_ADD, &nid) }.as_bool() {
            return Err(last_error());
        }
        // The version only takes effect through NIM_SETVERSION.
        if !unsafe { Shell_NotifyIconW(NIM_SETVERSION, &nid) }.as_bool() {
            log::warn!(
                "Failed to select version-4 callbacks for notify icon {}",
                data.icon_id
            );
        }
        Ok(())
    }

    fn delete_notify_icon(&self, data: &NotifyIconData) -> Result<(), NativeError> {
        let nid = notify_icon_data(data);
        if !unsafe { Shell_NotifyIconW(NIM_DELETE, &nid) }.as_bool() {
            return Err(last_error());
        }
        Ok(())
    }

    fn cursor_position(&self) -> Option<ScreenPoint> {
        let mut point = POINT::default();
        unsafe { GetCursorPos(&mut point) }.ok()?;
        Some(ScreenPoint {
            x: point.x,
            y: point.y,
        })
    }

    fn track_popup_menu(
        &self,
        menu: MenuHandle,
        owner: WindowHandle,
        position: ScreenPoint,
        mode: TrackMode,
    ) -> Result<u32, NativeError> {
        // Without foreground activation the popup does not close when the user
        // clicks elsewhere.
        let _ = unsafe { SetForegroundWindow(hwnd(owner)) };

        match mode {
            TrackMode::FireAndForget => {
                let flags = TPM_LEFTALIGN | TPM_RIGHTALIGN;
                let shown = unsafe {
                    TrackPopupMenuEx(
                        hmenu(menu),
                        flags.0,
                        position.x,
                        position.y,
                        hwnd(owner),
                        None,
                    )
                };
                if !shown.as_bool() {
                    return Err(last_error());
                }
                Ok(0)
            }
            TrackMode::WaitForResult => {
                let flags = TPM_LEFTALIGN | TPM_RIGHTALIGN | TPM_RETURNCMD | TPM_NONOTIFY;
                let command = unsafe {
                    TrackPopupMenuEx(
                        hmenu(menu),
                        flags.0,
                        position.x,
                        position.y,
                        hwnd(owner),
                        None,
                    )
                };
                Ok(command.0 as u32)
            }
        }
    }
}

/// Icon loader building `HICON`s from encoded image streams.
///
/// Icons stay alive until the loader is dropped.
#[derive(Default)]
pub struct Win32IconLoader {
    icons: Mutex<Vec<isize>>,
}

impl Win32IconLoader {
    pub fn new() -> Self {
        Self::default()
    }
}

impl IconLoader for Win32IconLoader {
    fn load_icon(&self, bytes: &[u8]) -> Option<IconHandle> {
        let mut rgba = match image::load_from_memory(bytes) {
            Ok(image) => image.into_rgba8(),
            Err(e) => {
                log::warn!("Failed to decode status icon stream: {}", e);
                return None;
            }
        };
        let (width, height) = rgba.dimensions();

        // CreateIcon expects BGRA colour bits; alpha drives transparency so the
        // AND mask stays empty. Mask rows are padded to 16-bit boundaries.
        for pixel in rgba.pixels_mut() {
            pixel.0.swap(0, 2);
        }
        let mask_stride = width.div_ceil(16) as usize * 2;
        let and_mask = vec![0u8; mask_stride * height as usize];

        let icon = unsafe {
            CreateIcon(
                None,
                width as i32,
                height as i32,
                1,
                32,
                and_mask.as_ptr(),
                rgba.as_raw().as_ptr(),
            )
        };
        match icon {
            Ok(icon) => {
                let handle = icon.0 as isize;
                self.icons.lock().push(handle);
                Some(IconHandle(handle))
            }
            Err(e) => {
                log::warn!("CreateIcon failed: {}", native_error(e));
                None
            }
        }
    }
}

impl Drop for Win32IconLoader {
    fn drop(&mut self) {
        for handle in self.icons.get_mut().drain(..) {
            if let Err(e) = unsafe { DestroyIcon(HICON(handle as *mut c_void)) } {
                log::warn!("DestroyIcon failed: {}", native_error(e));
            }
        }
    }
}
