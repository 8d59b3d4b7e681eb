//! Logical node → native entry translation.

use crate::menu::MenuNode;
use crate::platform::NativeEntry;

/// Convert a header into native menu label syntax.
///
/// Headers mark the access key with `_` (`__` for a literal underscore). The
/// native renderer uses `&` for that, so literal ampersands are doubled and
/// access-key underscores become `&`.
pub fn escape_mnemonic(header: &str) -> String {
    let mut label = String::with_capacity(header.len() + 2);
    let mut chars = header.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '&' => label.push_str("&&"),
            '_' if chars.peek() == Some(&'_') => {
                chars.next();
                label.push('_');
            }
            '_' => label.push('&'),
            other => label.push(other),
        }
    }
    label
}

/// Translate the child at `position` into a native entry with command id `id`.
///
/// Returns `None` (after logging) for nodes the native menu cannot represent.
pub fn translate(
    node: &MenuNode,
    position: usize,
    id: u32,
    default_index: Option<usize>,
) -> Option<NativeEntry> {
    match node {
        MenuNode::Separator => Some(NativeEntry::Separator { id }),
        MenuNode::Item(item) => Some(NativeEntry::Text {
            id,
            label: escape_mnemonic(&item.header()),
            is_default: default_index == Some(position),
        }),
        MenuNode::Unsupported(kind) => {
            log::debug!(
                "Skipping unsupported menu node #{} ({}) in status menu",
                position,
                kind
            );
            None
        }
    }
}
