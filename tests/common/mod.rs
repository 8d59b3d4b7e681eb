//! Shared integration test helpers for tray-export.
//!
//! Include with `mod common;` at the top of each test file. The
//! `#[allow(dead_code)]` attribute suppresses warnings when a test file only
//! uses some of the helpers.

#![allow(dead_code)]

use image::{Rgba, RgbaImage};
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tempfile::TempDir;
use tray_export::{
    ExporterConfig, HeadlessBackend, HeadlessIconLoader, IconImage, MenuItem, QueuedDispatcher,
    StatusMenuExporter, WindowHandle,
};

/// Window handle used by every harness.
pub const TEST_WINDOW: WindowHandle = WindowHandle(0x1234);

/// An exporter wired to the in-memory backend and a manually drained dispatcher.
pub struct Harness {
    pub backend: Arc<HeadlessBackend>,
    pub loader: Arc<HeadlessIconLoader>,
    pub dispatcher: Arc<QueuedDispatcher>,
    pub exporter: Arc<StatusMenuExporter>,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_config(ExporterConfig::default())
    }

    pub fn with_config(config: ExporterConfig) -> Self {
        let backend = Arc::new(HeadlessBackend::new());
        let loader = Arc::new(HeadlessIconLoader::new());
        let dispatcher = Arc::new(QueuedDispatcher::new());
        let exporter = StatusMenuExporter::new(
            TEST_WINDOW,
            backend.clone(),
            loader.clone(),
            dispatcher.clone(),
            config,
        )
        .expect("harness config should be valid");
        Self {
            backend,
            loader,
            dispatcher,
            exporter,
        }
    }

    /// Entries of the exporter's current native menu.
    pub fn entries(&self) -> Vec<tray_export::NativeEntry> {
        let handle = self
            .exporter
            .menu_handle()
            .expect("exporter has no native menu");
        self.backend
            .entries(handle)
            .expect("native menu handle is not live")
    }
}

/// A solid 16x16 icon.
pub fn test_icon() -> IconImage {
    IconImage::new(RgbaImage::from_pixel(16, 16, Rgba([0x20, 0x80, 0xF0, 0xFF])))
}

/// An item whose click handler increments the returned counter.
pub fn counting_item(header: &str) -> (Arc<MenuItem>, Arc<AtomicUsize>) {
    let clicks = Arc::new(AtomicUsize::new(0));
    let counter = clicks.clone();
    let item = Arc::new(MenuItem::new(header).with_action(move || {
        counter.fetch_add(1, Ordering::SeqCst);
    }));
    (item, clicks)
}

pub fn clicks(counter: &AtomicUsize) -> usize {
    counter.load(Ordering::SeqCst)
}

/// Write `yaml` to `config.yaml` inside a fresh temp dir.
///
/// Keep the `TempDir` alive until the file has been read.
pub fn config_file(yaml: &str) -> (TempDir, std::path::PathBuf) {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let path = dir.path().join("config.yaml");
    write(&path, yaml);
    (dir, path)
}

fn write(path: &Path, contents: &str) {
    std::fs::write(path, contents).expect("Failed to write config file");
}
