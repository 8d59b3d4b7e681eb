//! Status menu exporter.
//!
//! [`StatusMenuExporter`] ties the export components together for one native
//! window:
//! - `translator`: logical node → native entry
//! - `menu_handle`: the single native popup menu, rebuilt wholesale
//! - `notify_icon`: the single notification icon registration
//! - `scheduler`: coalesced deferred rebuilds
//! - `router`: icon interactions → exporter actions
//! - `resolver`: command id → logical item

mod menu_handle;
mod notify_icon;
mod resolver;
mod router;
mod scheduler;
mod translator;

pub use translator::escape_mnemonic;

use crate::attach::ExportedFlag;
use crate::error::ExportError;
use crate::menu::{ClickBridge, MenuItem, SubscriptionId};
use crate::platform::dispatcher::Dispatcher;
use crate::platform::message::{self, IconInteraction};
use crate::platform::{
    IconLoader, MenuHandle, NotifyIconData, StatusMenuBackend, TrackMode, WindowHandle,
};
use menu_handle::MenuHandleManager;
use notify_icon::NotifyIconManager;
use parking_lot::Mutex;
use raw_window_handle::HasWindowHandle;
use router::IconAction;
use scheduler::UpdateScheduler;
use std::sync::{Arc, Weak};
use tray_export_config::ExporterConfig;

/// Native state owned by one exporter, guarded by the session lock.
#[derive(Default)]
struct Session {
    /// The bound item; the caller owns it.
    menu: Option<Weak<MenuItem>>,
    /// Keeps the empty item alive while `set_status_menu(None)` is in effect.
    placeholder: Option<Arc<MenuItem>>,
    subscription: Option<SubscriptionId>,
    menu_handle: MenuHandleManager,
    icon: NotifyIconManager,
    disposed: bool,
}

impl Session {
    /// The bound item, unless none is bound or its owner dropped it.
    fn bound_menu(&self) -> Option<Arc<MenuItem>> {
        self.menu.as_ref()?.upgrade()
    }

    fn unbind(&mut self) {
        let subscription = self.subscription.take();
        if let (Some(menu), Some(id)) = (self.bound_menu(), subscription) {
            menu.unsubscribe_changed(id);
        }
        self.menu = None;
        self.placeholder = None;
    }
}

/// Exports a logical menu to the status area of one native window.
///
/// Created once per window and shared as `Arc`. The window procedure forwards
/// messages through [`StatusMenuExporter::handle_window_message`] (or the two
/// lower-level entry points). Native resources are released by
/// [`StatusMenuExporter::dispose`], which also runs on drop.
pub struct StatusMenuExporter {
    window: WindowHandle,
    config: ExporterConfig,
    backend: Arc<dyn StatusMenuBackend>,
    icon_loader: Arc<dyn IconLoader>,
    scheduler: UpdateScheduler,
    session: Mutex<Session>,
    exported: ExportedFlag,
    this: Weak<StatusMenuExporter>,
}

impl StatusMenuExporter {
    pub fn new(
        window: WindowHandle,
        backend: Arc<dyn StatusMenuBackend>,
        icon_loader: Arc<dyn IconLoader>,
        dispatcher: Arc<dyn Dispatcher>,
        config: ExporterConfig,
    ) -> Result<Arc<Self>, ExportError> {
        config.validate()?;
        let exporter = Arc::new_cyclic(|this| Self {
            window,
            config,
            backend,
            icon_loader,
            scheduler: UpdateScheduler::new(dispatcher),
            session: Mutex::new(Session::default()),
            exported: ExportedFlag::new(),
            this: this.clone(),
        });
        // Nothing is bound yet, so this only clears the pending flag.
        exporter.rebuild(false);
        log::debug!("Created status menu exporter for window {:?}", window);
        Ok(exporter)
    }

    /// Create an exporter for any window exposing a Win32 handle.
    pub fn for_window(
        window: &impl HasWindowHandle,
        backend: Arc<dyn StatusMenuBackend>,
        icon_loader: Arc<dyn IconLoader>,
        dispatcher: Arc<dyn Dispatcher>,
        config: ExporterConfig,
    ) -> Result<Arc<Self>, ExportError> {
        let handle = WindowHandle::from_window(window).ok_or(ExportError::NoWindowHandle)?;
        Self::new(handle, backend, icon_loader, dispatcher, config)
    }

    /// Create an exporter backed by the Win32 shell.
    #[cfg(target_os = "windows")]
    pub fn win32(
        window: &impl HasWindowHandle,
        dispatcher: Arc<dyn Dispatcher>,
        config: ExporterConfig,
    ) -> Result<Arc<Self>, ExportError> {
        use crate::platform::windows::{Win32Backend, Win32IconLoader};
        Self::for_window(
            window,
            Arc::new(Win32Backend::new()),
            Arc::new(Win32IconLoader::new()),
            dispatcher,
            config,
        )
    }

    pub fn window(&self) -> WindowHandle {
        self.window
    }

    pub fn config(&self) -> &ExporterConfig {
        &self.config
    }

    /// True once a native menu has been built at least once (and until disposal).
    pub fn is_status_menu_exported(&self) -> bool {
        self.exported.get()
    }

    /// Register a listener for changes of [`Self::is_status_menu_exported`].
    pub fn on_exported_changed(
        &self,
        listener: impl Fn(bool) + Send + Sync + 'static,
    ) -> SubscriptionId {
        self.exported.subscribe(listener)
    }

    pub fn exported_flag(&self) -> &ExportedFlag {
        &self.exported
    }

    /// Bind `item` (an empty item when `None`) and rebuild immediately.
    ///
    /// Any pending deferred rebuild is superseded. Once this returns the
    /// native menu reflects `item`. The exporter only keeps a weak reference;
    /// once the caller drops the item, nothing is bound.
    pub fn set_status_menu(&self, item: Option<Arc<MenuItem>>) {
        let (item, placeholder) = match item {
            Some(item) => (item, None),
            None => {
                let empty = Arc::new(MenuItem::new(String::new()));
                (empty.clone(), Some(empty))
            }
        };
        {
            let mut session = self.session.lock();
            if session.disposed {
                log::warn!(
                    "Ignoring status menu for disposed exporter (window {:?})",
                    self.window
                );
                return;
            }
            session.unbind();

            let this = self.this.clone();
            let id = item.subscribe_changed(move || {
                if let Some(exporter) = this.upgrade() {
                    exporter.queue_reset();
                }
            });
            log::debug!("Binding status menu {:?}", item.header());
            session.menu = Some(Arc::downgrade(&item));
            session.placeholder = placeholder;
            session.subscription = Some(id);
        }
        self.rebuild(true);
    }

    /// The currently bound item.
    pub fn status_menu(&self) -> Option<Arc<MenuItem>> {
        self.session.lock().bound_menu()
    }

    /// Request a deferred rebuild. Calls made while one is pending collapse into it.
    pub fn queue_reset(&self) {
        let this = self.this.clone();
        let posted = self.scheduler.queue(move || {
            if let Some(exporter) = this.upgrade() {
                exporter.update_if_needed();
            }
        });
        if posted {
            log::trace!("Queued status menu rebuild for window {:?}", self.window);
        }
    }

    /// True while a deferred rebuild is queued and has not run.
    pub fn is_reset_pending(&self) -> bool {
        self.scheduler.is_pending()
    }

    /// Run the pending rebuild now, if there is one.
    pub fn update_if_needed(&self) {
        self.rebuild(false);
    }

    fn rebuild(&self, forced: bool) {
        let changed = {
            let mut session = self.session.lock();
            let pending = self.scheduler.take_pending();
            if !(pending || forced) || session.disposed {
                return;
            }
            let Some(menu) = session.bound_menu() else {
                return;
            };

            let session = &mut *session;
            if !session
                .menu_handle
                .rebuild(self.backend.as_ref(), &self.config, &menu)
            {
                return;
            }
            session.icon.ensure_icon(
                self.backend.as_ref(),
                self.icon_loader.as_ref(),
                self.window,
                &self.config,
                &menu,
            );
            self.exported.store(true)
        };

        // Listeners run without the session lock.
        if changed {
            self.exported.notify(true);
        }
    }

    /// Native handle of the current popup menu.
    pub fn menu_handle(&self) -> Option<MenuHandle> {
        self.session.lock().menu_handle.handle()
    }

    /// Position of the entry invoked by an icon double-click.
    pub fn default_item_index(&self) -> Option<usize> {
        self.session.lock().menu_handle.default_item_index()
    }

    pub fn has_notification_icon(&self) -> bool {
        self.session.lock().icon.is_created()
    }

    /// The registration record of the notification icon, if one exists.
    pub fn notification_icon(&self) -> Option<NotifyIconData> {
        self.session.lock().icon.registration().cloned()
    }

    /// Dispatch a raw window message.
    ///
    /// Claims the icon callback message, and command messages whose id falls
    /// in the range assigned to the current menu. Returns whether the message
    /// was handled.
    pub fn handle_window_message(&self, msg: u32, wparam: usize, lparam: isize) -> bool {
        if msg == self.config.callback_message {
            self.callback_message_received(wparam, lparam);
            return true;
        }
        if msg == message::WM_COMMAND && self.owns_command(message::command_id_from_wparam(wparam))
        {
            self.command_message_received(wparam, lparam);
            return true;
        }
        false
    }

    fn owns_command(&self, command_id: u32) -> bool {
        let Some(menu) = self.session.lock().bound_menu() else {
            return false;
        };
        command_id
            .checked_sub(self.config.item_index_base)
            .is_some_and(|offset| (offset as usize) < menu.child_count())
    }

    /// Entry point for the notification icon callback message.
    pub fn callback_message_received(&self, _wparam: usize, lparam: isize) {
        self.handle_icon_interaction(IconInteraction::from_lparam(lparam));
    }

    /// Entry point for command messages.
    pub fn command_message_received(&self, wparam: usize, _lparam: isize) {
        self.command_selected(message::command_id_from_wparam(wparam));
    }

    pub fn handle_icon_interaction(&self, interaction: IconInteraction) {
        let default_command = self
            .default_item_index()
            .and_then(|index| self.config.command_id(index));
        match router::route_icon_interaction(interaction, default_command) {
            IconAction::Invoke(command_id) => self.command_selected(command_id),
            IconAction::ShowPopup => {
                self.show_menu(TrackMode::FireAndForget);
            }
            IconAction::Ignore => {}
        }
    }

    /// Raise the click event of the item that produced `command_id`.
    ///
    /// Ids that no longer map to an action item are ignored.
    pub fn command_selected(&self, command_id: u32) {
        let Some(menu) = self.session.lock().bound_menu() else {
            return;
        };
        let item = resolver::resolve(&menu, self.config.item_index_base, command_id);
        match item {
            Some(item) => {
                log::debug!("Status menu command {} -> {:?}", command_id, item.header());
                item.raise_clicked();
            }
            None => log::debug!("Ignoring stale status menu command {}", command_id),
        }
    }

    /// Show the popup menu at the cursor.
    ///
    /// Pending rebuilds run first. In [`TrackMode::WaitForResult`] the call
    /// blocks until the popup closes and the selected command is dispatched
    /// directly; its id is returned.
    pub fn show_menu(&self, mode: TrackMode) -> Option<u32> {
        self.update_if_needed();

        let menu = {
            let session = self.session.lock();
            if session.disposed {
                return None;
            }
            session.menu_handle.handle()
        };
        let Some(menu) = menu else {
            log::debug!("No status menu built; nothing to show");
            return None;
        };
        let Some(position) = self.backend.cursor_position() else {
            log::debug!("Cursor position unavailable; status menu not shown");
            return None;
        };

        match self
            .backend
            .track_popup_menu(menu, self.window, position, mode)
        {
            Err(e) => {
                log::warn!("{}", ExportError::native("TrackPopupMenuEx", e));
                None
            }
            Ok(_) if mode == TrackMode::FireAndForget => None,
            Ok(0) => {
                log::debug!("Status menu dismissed without a selection");
                None
            }
            Ok(command_id) => {
                self.command_selected(command_id);
                Some(command_id)
            }
        }
    }

    /// Release the native menu and the notification icon, and unbind the menu.
    ///
    /// Idempotent.
    pub fn dispose(&self) {
        let changed = {
            let mut session = self.session.lock();
            if session.disposed {
                return;
            }
            session.disposed = true;
            session.menu_handle.release(self.backend.as_ref());
            session.icon.teardown(self.backend.as_ref());
            session.unbind();
            self.exported.store(false)
        };
        if changed {
            self.exported.notify(false);
        }
        log::info!("Disposed status menu exporter for window {:?}", self.window);
    }

    pub fn is_disposed(&self) -> bool {
        self.session.lock().disposed
    }
}

impl Drop for StatusMenuExporter {
    fn drop(&mut self) {
        self.dispose();
    }
}

impl std::fmt::Debug for StatusMenuExporter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StatusMenuExporter")
            .field("window", &self.window)
            .field("exported", &self.exported.get())
            .field("reset_pending", &self.scheduler.is_pending())
            .finish()
    }
}
