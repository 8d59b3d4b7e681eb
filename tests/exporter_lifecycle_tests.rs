//! Build, coalescing and teardown behavior of the status menu exporter.

mod common;

use common::{Harness, TEST_WINDOW, clicks, config_file, counting_item, test_icon};
use std::sync::Arc;
use std::thread;
use tray_export::{
    ConfigError, ExportError, ExporterConfig, HeadlessBackend, HeadlessIconLoader, MenuItem,
    MenuNode, NativeEntry, QueuedDispatcher, StatusMenuExporter,
};

fn build(config: ExporterConfig) -> Result<Arc<StatusMenuExporter>, ExportError> {
    StatusMenuExporter::new(
        TEST_WINDOW,
        Arc::new(HeadlessBackend::new()),
        Arc::new(HeadlessIconLoader::new()),
        Arc::new(QueuedDispatcher::new()),
        config,
    )
}

#[test]
fn test_exporter_assigns_ids_from_positions() {
    let h = Harness::new();
    let root = Arc::new(
        MenuItem::new("Tray")
            .with_separator()
            .with_child(MenuItem::new("A"))
            .with_child(MenuItem::new("B")),
    );
    h.exporter.set_status_menu(Some(root));

    let entries = h.entries();
    let ids: Vec<u32> = entries.iter().map(NativeEntry::id).collect();
    assert_eq!(ids, vec![1000, 1001, 1002]);
    // The first child claims the default slot even when it is a separator.
    assert_eq!(h.exporter.default_item_index(), Some(0));
    assert!(matches!(
        &entries[1],
        NativeEntry::Text { label, is_default: false, .. } if label == "A"
    ));
}

#[test]
fn test_exporter_marks_first_item_default() {
    let h = Harness::new();
    h.exporter.set_status_menu(Some(Arc::new(
        MenuItem::new("Tray")
            .with_child(MenuItem::new("_Open"))
            .with_child(MenuItem::new("Quit")),
    )));

    assert_eq!(
        h.entries()[0],
        NativeEntry::Text {
            id: 1000,
            label: "&Open".to_string(),
            is_default: true,
        }
    );
}

#[test]
fn test_exporter_skips_unsupported_nodes() {
    let h = Harness::new();
    h.exporter.set_status_menu(Some(Arc::new(
        MenuItem::new("Tray")
            .with_child(MenuItem::new("A"))
            .with_child(MenuNode::Unsupported("check box".to_string()))
            .with_child(MenuItem::new("B")),
    )));

    let ids: Vec<u32> = h.entries().iter().map(NativeEntry::id).collect();
    assert_eq!(ids, vec![1000, 1002]);
}

#[test]
fn test_exporter_coalesces_queued_resets() {
    let h = Harness::new();
    let root = Arc::new(MenuItem::new("Tray"));
    h.exporter.set_status_menu(Some(root.clone()));
    let built = h.backend.menus_created();

    for i in 0..5 {
        root.add_child(MenuItem::new(format!("Item {i}")));
    }
    h.exporter.queue_reset();
    assert_eq!(h.dispatcher.pending(), 1);
    assert_eq!(h.backend.menus_created(), built);

    assert_eq!(h.dispatcher.run_pending(), 1);
    assert_eq!(h.backend.menus_created(), built + 1);
    assert_eq!(h.entries().len(), 5);
    assert!(!h.exporter.is_reset_pending());
}

#[test]
fn test_exporter_forced_rebuild_supersedes_pending() {
    let h = Harness::new();
    let root = Arc::new(MenuItem::new("Tray"));
    h.exporter.set_status_menu(Some(root.clone()));
    root.add_child(MenuItem::new("A"));
    assert!(h.exporter.is_reset_pending());

    let replacement = Arc::new(MenuItem::new("Other").with_child(MenuItem::new("X")));
    h.exporter.set_status_menu(Some(replacement));
    assert!(!h.exporter.is_reset_pending());
    let built = h.backend.menus_created();

    // The already-posted callback finds nothing pending.
    h.dispatcher.run_pending();
    assert_eq!(h.backend.menus_created(), built);
    assert_eq!(h.backend.live_menus().len(), 1);
}

#[test]
fn test_exporter_keeps_one_live_menu() {
    let h = Harness::new();
    let root = Arc::new(MenuItem::new("Tray"));
    h.exporter.set_status_menu(Some(root.clone()));
    for _ in 0..3 {
        root.add_child(MenuItem::new("More"));
        h.dispatcher.run_pending();
        assert_eq!(h.backend.live_menus().len(), 1);
    }
    assert_eq!(h.backend.menus_destroyed().len(), 3);
}

#[test]
fn test_exporter_registers_icon_once() {
    let h = Harness::new();
    let root = Arc::new(MenuItem::new("My App").with_icon(test_icon()));
    h.exporter.set_status_menu(Some(root.clone()));
    h.exporter.set_status_menu(Some(root.clone()));
    root.set_header("Renamed");
    h.dispatcher.run_pending();

    assert_eq!(h.backend.icon_add_calls(), 1);
    let icons = h.backend.icons();
    assert_eq!(icons.len(), 1);
    assert_eq!(icons[0].window, TEST_WINDOW);
    assert_eq!(icons[0].icon_id, 0);
    assert_eq!(icons[0].tooltip, "My App");
    assert_eq!(h.exporter.notification_icon().as_ref(), icons.first());
}

#[test]
fn test_exporter_without_icon_still_exports() {
    let h = Harness::new();
    h.exporter
        .set_status_menu(Some(Arc::new(MenuItem::new("Tray"))));
    assert!(h.exporter.is_status_menu_exported());
    assert!(!h.exporter.has_notification_icon());
    assert_eq!(h.backend.icon_add_calls(), 0);
}

#[test]
fn test_exporter_icon_registration_failure_is_tolerated() {
    let h = Harness::new();
    h.backend.set_fail_icon_add(true);
    h.exporter.set_status_menu(Some(Arc::new(
        MenuItem::new("Tray")
            .with_icon(test_icon())
            .with_child(MenuItem::new("A")),
    )));

    assert!(h.exporter.is_status_menu_exported());
    assert!(!h.exporter.has_notification_icon());
    assert_eq!(h.entries().len(), 1);
}

#[test]
fn test_exporter_menu_allocation_failure_is_not_exported() {
    let h = Harness::new();
    h.backend.set_fail_create_menu(true);
    h.exporter.set_status_menu(None);

    assert!(!h.exporter.is_status_menu_exported());
    assert!(h.exporter.menu_handle().is_none());
}

#[test]
fn test_exporter_teardown_is_total() {
    let h = Harness::new();
    let root = Arc::new(MenuItem::new("Tray").with_icon(test_icon()));
    h.exporter.set_status_menu(Some(root.clone()));
    assert!(h.exporter.has_notification_icon());

    h.exporter.dispose();
    assert!(h.backend.live_menus().is_empty());
    assert!(h.backend.icons().is_empty());
    assert_eq!(root.change_listener_count(), 0);
    assert!(!h.exporter.is_status_menu_exported());
    assert!(h.exporter.menu_handle().is_none());

    h.exporter.dispose();
    assert_eq!(h.backend.icon_delete_calls(), 1);
    assert_eq!(h.backend.menus_destroyed().len(), 1);
}

#[test]
fn test_exporter_ignores_menu_after_dispose() {
    let h = Harness::new();
    h.exporter.dispose();
    h.exporter
        .set_status_menu(Some(Arc::new(MenuItem::new("Late"))));
    assert_eq!(h.backend.menus_created(), 0);
    assert!(h.exporter.is_disposed());
}

#[test]
fn test_exporter_queued_rebuild_after_drop_is_harmless() {
    let h = Harness::new();
    let (item, _) = counting_item("A");
    let root = Arc::new(MenuItem::new("Tray"));
    h.exporter.set_status_menu(Some(root.clone()));
    root.add_child(item);

    let Harness {
        backend,
        dispatcher,
        exporter,
        ..
    } = h;
    drop(exporter);
    assert_eq!(dispatcher.run_pending(), 1);
    assert!(backend.live_menus().is_empty());
    assert_eq!(root.change_listener_count(), 0);
}

#[test]
fn test_exporter_uses_configured_base() {
    let (_dir, path) = config_file("item_index_base: 2000\ncallback_message: 32773\n");
    let config = ExporterConfig::load_from(&path).expect("config should load");
    let h = Harness::with_config(config);
    h.exporter.set_status_menu(Some(Arc::new(
        MenuItem::new("Tray")
            .with_child(MenuItem::new("A"))
            .with_child(MenuItem::new("B")),
    )));

    let ids: Vec<u32> = h.entries().iter().map(NativeEntry::id).collect();
    assert_eq!(ids, vec![2000, 2001]);
    assert!(h.exporter.handle_window_message(0x8005, 0, 0x0200));
}

#[test]
fn test_exporter_rejects_zero_item_index_base() {
    let config = ExporterConfig {
        item_index_base: 0,
        ..ExporterConfig::default()
    };
    let err = build(config).expect_err("base 0 collides with the dismissed-popup result");
    assert!(matches!(err, ExportError::Config(ConfigError::Validation(_))));
}

#[test]
fn test_exporter_rejects_non_private_callback_message() {
    let config = ExporterConfig {
        callback_message: 0x0111,
        ..ExporterConfig::default()
    };
    let err = build(config).expect_err("WM_COMMAND is not a private message");
    assert!(matches!(err, ExportError::Config(ConfigError::Validation(_))));
    assert!(err.to_string().contains("Invalid exporter configuration"));
}

#[test]
fn test_exporter_does_not_keep_menu_alive() {
    let h = Harness::new();
    let (a, a_clicks) = counting_item("A");
    let root = Arc::new(MenuItem::new("Tray").with_child(a));
    let weak = Arc::downgrade(&root);
    h.exporter.set_status_menu(Some(root));

    assert!(weak.upgrade().is_none());
    assert!(h.exporter.status_menu().is_none());
    h.exporter.command_selected(1000);
    assert_eq!(clicks(&a_clicks), 0);

    // A dropped item leaves the last native menu in place until the next bind.
    assert_eq!(h.backend.live_menus().len(), 1);
    h.exporter.set_status_menu(None);
    assert_eq!(h.backend.live_menus().len(), 1);
    assert!(h.exporter.status_menu().is_some());
}

#[test]
fn test_exporter_dispose_wins_over_concurrent_rebuild() {
    for _ in 0..200 {
        let h = Harness::new();
        let root = Arc::new(MenuItem::new("Tray").with_child(MenuItem::new("A")));
        let exporter = h.exporter.clone();
        let binder = {
            let root = root.clone();
            thread::spawn(move || exporter.set_status_menu(Some(root)))
        };
        h.exporter.dispose();
        binder.join().expect("binder thread panicked");

        assert!(h.exporter.is_disposed());
        assert!(!h.exporter.is_status_menu_exported());
        assert!(h.backend.live_menus().is_empty());
    }
}
