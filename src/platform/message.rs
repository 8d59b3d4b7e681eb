//! Decoding of raw window messages into exporter events.
//!
//! The notification icon is registered with version-4 callback semantics, so
//! the interaction code arrives in the low word of `lParam`. Command messages
//! carry the selected id in the low word of `wParam`.

/// `WM_COMMAND`
pub const WM_COMMAND: u32 = 0x0111;

const WM_CONTEXTMENU: u32 = 0x007B;
const WM_MOUSEMOVE: u32 = 0x0200;
const WM_LBUTTONDBLCLK: u32 = 0x0203;
const WM_RBUTTONUP: u32 = 0x0205;

/// A user interaction with the notification icon.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IconInteraction {
    /// Primary button double-click
    DoubleClick,
    /// Context menu requested (keyboard or secondary click)
    ContextMenu,
    /// Secondary button released
    SecondaryButtonUp,
    /// Pointer moved over the icon
    PointerMove,
    /// Anything else, with the raw code
    Other(u32),
}

impl IconInteraction {
    pub fn from_code(code: u32) -> Self {
        match code {
            WM_LBUTTONDBLCLK => IconInteraction::DoubleClick,
            WM_CONTEXTMENU => IconInteraction::ContextMenu,
            WM_RBUTTONUP => IconInteraction::SecondaryButtonUp,
            WM_MOUSEMOVE => IconInteraction::PointerMove,
            other => IconInteraction::Other(other),
        }
    }

    /// Decode the icon-callback `lParam`.
    pub fn from_lparam(lparam: isize) -> Self {
        Self::from_code(low_word(lparam as usize))
    }
}

/// Decode the command id from a command message `wParam`.
pub fn command_id_from_wparam(wparam: usize) -> u32 {
    low_word(wparam)
}

fn low_word(value: usize) -> u32 {
    (value & 0xFFFF) as u32
}
