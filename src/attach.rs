//! Binding of logical menus to host windows.
//!
//! A host window advertises status menu support through [`StatusMenuHost`].
//! Binding an item goes through [`attach_status_menu`], which returns a
//! [`StatusMenuAttachment`] exposing the window's observable "status menu
//! exported" flag. Only the exporter writes that flag.

use crate::export::StatusMenuExporter;
use crate::menu::{MenuItem, SubscriptionId};
use parking_lot::Mutex;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

type Listener = Arc<dyn Fn(bool) + Send + Sync>;

/// Observable "status menu exported" flag of one window.
///
/// Readable by anyone; written only by the owning [`StatusMenuExporter`].
/// Listeners run on every transition, outside any exporter lock.
pub struct ExportedFlag {
    value: AtomicBool,
    listeners: Mutex<Vec<(SubscriptionId, Listener)>>,
    next_subscription: AtomicU64,
}

impl ExportedFlag {
    pub(crate) fn new() -> Self {
        Self {
            value: AtomicBool::new(false),
            listeners: Mutex::new(Vec::new()),
            next_subscription: AtomicU64::new(1),
        }
    }

    pub fn get(&self) -> bool {
        self.value.load(Ordering::Acquire)
    }

    pub fn subscribe(&self, listener: impl Fn(bool) + Send + Sync + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription.fetch_add(1, Ordering::Relaxed));
        self.listeners.lock().push((id, Arc::new(listener)));
        id
    }

    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut listeners = self.listeners.lock();
        let before = listeners.len();
        listeners.retain(|(sid, _)| *sid != id);
        listeners.len() != before
    }

    /// Store `value`, returning whether it changed.
    ///
    /// Called under the exporter's session lock, so the stored value always
    /// follows the order of builds and disposal.
    pub(crate) fn store(&self, value: bool) -> bool {
        self.value.swap(value, Ordering::AcqRel) != value
    }

    /// Run every listener with `value`. Called after the session lock is released.
    pub(crate) fn notify(&self, value: bool) {
        log::debug!("Status menu exported: {}", value);
        let listeners: Vec<Listener> = self
            .listeners
            .lock()
            .iter()
            .map(|(_, listener)| listener.clone())
            .collect();
        for listener in listeners {
            listener(value);
        }
    }
}

impl std::fmt::Debug for ExportedFlag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExportedFlag")
            .field("value", &self.get())
            .field("listeners", &self.listeners.lock().len())
            .finish()
    }
}

/// Capability a host window exposes when it can export a status menu.
pub trait StatusMenuHost {
    /// The window's exporter, or `None` when status menu export is unavailable.
    fn status_menu_exporter(&self) -> Option<Arc<StatusMenuExporter>>;
}

impl StatusMenuHost for Arc<StatusMenuExporter> {
    fn status_menu_exporter(&self) -> Option<Arc<StatusMenuExporter>> {
        Some(self.clone())
    }
}

/// A menu bound to a window's status area.
#[derive(Debug, Clone)]
pub struct StatusMenuAttachment {
    exporter: Arc<StatusMenuExporter>,
}

impl StatusMenuAttachment {
    pub fn exporter(&self) -> &Arc<StatusMenuExporter> {
        &self.exporter
    }

    pub fn is_exported(&self) -> bool {
        self.exporter.exported_flag().get()
    }

    pub fn on_exported_changed(
        &self,
        listener: impl Fn(bool) + Send + Sync + 'static,
    ) -> SubscriptionId {
        self.exporter.exported_flag().subscribe(listener)
    }

    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.exporter.exported_flag().unsubscribe(id)
    }

    /// Bind a different item to the same window.
    pub fn set_menu(&self, item: Option<Arc<MenuItem>>) {
        self.exporter.set_status_menu(item);
    }

    /// Writing the exported flag from outside the exporter is a programming error.
    ///
    /// # Panics
    ///
    /// Always panics.
    #[track_caller]
    pub fn set_is_exported(&self, value: bool) {
        panic!(
            "status menu exported flag of window {:?} is owned by its exporter; refusing external write of {}",
            self.exporter.window(),
            value
        );
    }
}

/// Bind `item` to the status area of `host`.
///
/// Returns `None` when the host cannot export a status menu.
pub fn attach_status_menu(
    host: &impl StatusMenuHost,
    item: Option<Arc<MenuItem>>,
) -> Option<StatusMenuAttachment> {
    let Some(exporter) = host.status_menu_exporter() else {
        log::debug!("Host has no status menu exporter; status menu not exported");
        return None;
    };
    exporter.set_status_menu(item);
    Some(StatusMenuAttachment { exporter })
}
