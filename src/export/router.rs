//! Mapping of icon interactions to exporter actions.

use crate::platform::message::IconInteraction;

/// What the exporter should do in response to an icon interaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum IconAction {
    /// Dispatch this command id as if it had been selected.
    Invoke(u32),
    /// Show the popup at the cursor without waiting for a result.
    ShowPopup,
    /// Nothing to do
    Ignore,
}

/// Route an interaction. `default_command` is the id of the default entry.
pub(crate) fn route_icon_interaction(
    interaction: IconInteraction,
    default_command: Option<u32>,
) -> IconAction {
    match interaction {
        IconInteraction::DoubleClick => {
            log::debug!("Notification icon double-clicked");
            default_command.map_or(IconAction::Ignore, IconAction::Invoke)
        }
        IconInteraction::ContextMenu | IconInteraction::SecondaryButtonUp => IconAction::ShowPopup,
        IconInteraction::PointerMove => IconAction::Ignore,
        IconInteraction::Other(code) => {
            log::debug!("Unhandled notification icon message {:#06x}", code);
            IconAction::Ignore
        }
    }
}
