//! Window attachment and the exported flag.

mod common;

use common::{Harness, clicks, counting_item};
use parking_lot::Mutex;
use std::sync::Arc;
use tray_export::{MenuItem, StatusMenuExporter, StatusMenuHost, attach_status_menu};

struct Window {
    exporter: Option<Arc<StatusMenuExporter>>,
}

impl StatusMenuHost for Window {
    fn status_menu_exporter(&self) -> Option<Arc<StatusMenuExporter>> {
        self.exporter.clone()
    }
}

#[test]
fn test_attach_binds_menu_and_publishes_flag() {
    let h = Harness::new();
    let window = Window {
        exporter: Some(h.exporter.clone()),
    };
    let (quit, quit_clicks) = counting_item("Quit");

    let root = Arc::new(MenuItem::new("Tray").with_child(quit));
    let attachment =
        attach_status_menu(&window, Some(root.clone())).expect("window supports status menus");

    assert!(attachment.is_exported());
    assert_eq!(h.entries().len(), 1);
    attachment.exporter().command_selected(1000);
    assert_eq!(clicks(&quit_clicks), 1);
}

#[test]
fn test_attach_without_capability_is_unavailable() {
    let window = Window { exporter: None };
    assert!(attach_status_menu(&window, Some(Arc::new(MenuItem::new("Tray")))).is_none());
}

#[test]
fn test_attach_listener_sees_export_and_disposal() {
    let h = Harness::new();
    let seen = Arc::new(Mutex::new(Vec::new()));
    let attachment = attach_status_menu(&h.exporter, None).expect("exporter is a host");
    {
        let seen = seen.clone();
        attachment.on_exported_changed(move |value| seen.lock().push(value));
    }

    attachment.set_menu(Some(Arc::new(MenuItem::new("Other"))));
    h.exporter.dispose();
    assert_eq!(*seen.lock(), vec![false]);
    assert!(!attachment.is_exported());
}

#[test]
fn test_attach_listener_may_query_exporter() {
    let h = Harness::new();
    let observed = Arc::new(Mutex::new(None));
    {
        let observed = observed.clone();
        let exporter = Arc::downgrade(&h.exporter);
        h.exporter.on_exported_changed(move |_| {
            if let Some(exporter) = exporter.upgrade() {
                *observed.lock() = Some(exporter.menu_handle().is_some());
            }
        });
    }

    h.exporter.set_status_menu(None);
    assert_eq!(*observed.lock(), Some(true));
}

#[test]
#[should_panic(expected = "owned by its exporter")]
fn test_attach_external_write_panics() {
    let h = Harness::new();
    let attachment = attach_status_menu(&h.exporter, None).expect("exporter is a host");
    attachment.set_is_exported(false);
}
