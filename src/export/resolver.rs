//! Native command id → logical item resolution.

use crate::menu::{MenuItem, MenuNode};
use std::sync::Arc;

/// Find the action item that produced `command_id` in the last build.
///
/// Ids below `base`, positions past the end, and positions that no longer
/// hold an action item all resolve to `None`.
pub(crate) fn resolve(menu: &MenuItem, base: u32, command_id: u32) -> Option<Arc<MenuItem>> {
    let position = command_id.checked_sub(base)? as usize;
    match menu.child(position)? {
        MenuNode::Item(item) => Some(item),
        MenuNode::Separator | MenuNode::Unsupported(_) => None,
    }
}
