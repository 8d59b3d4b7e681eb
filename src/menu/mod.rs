//! Logical menu model.
//!
//! A [`MenuItem`] is the platform-independent node an application builds and
//! mutates. Its children (separators, nested items, or opaque nodes this crate
//! cannot export) form the popup shown from the status area. Every mutation
//! fires the item's "menu changed" listeners, which the exporter uses to
//! schedule a coalesced rebuild.

mod icon;

pub use icon::IconImage;

use parking_lot::{Mutex, RwLock};
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

type Callback = Arc<dyn Fn() + Send + Sync>;

/// Capability for raising a click on an item from outside the UI layer.
///
/// The exporter resolves a native command back to a logical item and calls
/// [`ClickBridge::raise_clicked`] on it.
pub trait ClickBridge {
    fn raise_clicked(&self);
}

/// Handle returned by [`MenuItem::subscribe_changed`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(pub(crate) u64);

/// One node in a menu tree.
#[derive(Clone)]
pub enum MenuNode {
    /// Horizontal divider line
    Separator,
    /// Action item (text, optional icon, click event, optional children)
    Item(Arc<MenuItem>),
    /// Node type the native exporter cannot represent; carries a description for logs
    Unsupported(String),
}

impl MenuNode {
    pub fn separator() -> Self {
        MenuNode::Separator
    }

    /// The action item, if this node is one.
    pub fn as_item(&self) -> Option<&Arc<MenuItem>> {
        match self {
            MenuNode::Item(item) => Some(item),
            _ => None,
        }
    }

    pub fn is_separator(&self) -> bool {
        matches!(self, MenuNode::Separator)
    }

    /// Short description used in diagnostics.
    pub fn kind_name(&self) -> &str {
        match self {
            MenuNode::Separator => "separator",
            MenuNode::Item(_) => "item",
            MenuNode::Unsupported(kind) => kind,
        }
    }
}

impl From<MenuItem> for MenuNode {
    fn from(item: MenuItem) -> Self {
        MenuNode::Item(Arc::new(item))
    }
}

impl From<Arc<MenuItem>> for MenuNode {
    fn from(item: Arc<MenuItem>) -> Self {
        MenuNode::Item(item)
    }
}

impl fmt::Debug for MenuNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MenuNode::Separator => f.write_str("Separator"),
            MenuNode::Item(item) => f.debug_tuple("Item").field(&item.header()).finish(),
            MenuNode::Unsupported(kind) => f.debug_tuple("Unsupported").field(kind).finish(),
        }
    }
}

#[derive(Default)]
struct ItemState {
    header: String,
    icon: Option<IconImage>,
    children: Vec<MenuNode>,
}

/// A logical menu item.
///
/// Items are shared as `Arc<MenuItem>` between the application and any
/// exporter bound to them; all mutation goes through `&self`.
pub struct MenuItem {
    state: RwLock<ItemState>,
    click_handlers: Mutex<Vec<Callback>>,
    change_listeners: Mutex<Vec<(SubscriptionId, Callback)>>,
    next_subscription: AtomicU64,
}

impl MenuItem {
    /// Create an item with the given header text.
    ///
    /// Use `_` before a character to mark it as the access key.
    pub fn new(header: impl Into<String>) -> Self {
        Self {
            state: RwLock::new(ItemState {
                header: header.into(),
                ..Default::default()
            }),
            click_handlers: Mutex::new(Vec::new()),
            change_listeners: Mutex::new(Vec::new()),
            next_subscription: AtomicU64::new(1),
        }
    }

    /// Attach an icon, returning the modified item.
    pub fn with_icon(self, icon: IconImage) -> Self {
        self.state.write().icon = Some(icon);
        self
    }

    /// Append a child, returning the modified item.
    pub fn with_child(self, child: impl Into<MenuNode>) -> Self {
        self.state.write().children.push(child.into());
        self
    }

    /// Append a separator, returning the modified item.
    pub fn with_separator(self) -> Self {
        self.with_child(MenuNode::Separator)
    }

    /// Register a click handler, returning the modified item.
    pub fn with_action(self, action: impl Fn() + Send + Sync + 'static) -> Self {
        self.on_click(action);
        self
    }

    pub fn header(&self) -> String {
        self.state.read().header.clone()
    }

    pub fn icon(&self) -> Option<IconImage> {
        self.state.read().icon.clone()
    }

    pub fn has_icon(&self) -> bool {
        self.state.read().icon.is_some()
    }

    /// Snapshot of the current children.
    pub fn children(&self) -> Vec<MenuNode> {
        self.state.read().children.clone()
    }

    pub fn child_count(&self) -> usize {
        self.state.read().children.len()
    }

    /// Child at `index`, or `None` when out of range.
    pub fn child(&self, index: usize) -> Option<MenuNode> {
        self.state.read().children.get(index).cloned()
    }

    pub fn set_header(&self, header: impl Into<String>) {
        self.state.write().header = header.into();
        self.notify_changed();
    }

    pub fn set_icon(&self, icon: Option<IconImage>) {
        self.state.write().icon = icon;
        self.notify_changed();
    }

    pub fn add_child(&self, child: impl Into<MenuNode>) {
        self.state.write().children.push(child.into());
        self.notify_changed();
    }

    /// Insert a child at `index`, clamped to the current child count.
    pub fn insert_child(&self, index: usize, child: impl Into<MenuNode>) {
        {
            let mut state = self.state.write();
            let index = index.min(state.children.len());
            state.children.insert(index, child.into());
        }
        self.notify_changed();
    }

    /// Remove and return the child at `index`.
    pub fn remove_child(&self, index: usize) -> Option<MenuNode> {
        let removed = {
            let mut state = self.state.write();
            (index < state.children.len()).then(|| state.children.remove(index))
        };
        if removed.is_some() {
            self.notify_changed();
        }
        removed
    }

    pub fn clear_children(&self) {
        self.state.write().children.clear();
        self.notify_changed();
    }

    pub fn set_children(&self, children: Vec<MenuNode>) {
        self.state.write().children = children;
        self.notify_changed();
    }

    /// Register a handler invoked whenever the item is clicked.
    pub fn on_click(&self, handler: impl Fn() + Send + Sync + 'static) {
        self.click_handlers.lock().push(Arc::new(handler));
    }

    /// Register a "menu changed" listener.
    pub fn subscribe_changed(&self, listener: impl Fn() + Send + Sync + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription.fetch_add(1, Ordering::Relaxed));
        self.change_listeners.lock().push((id, Arc::new(listener)));
        id
    }

    /// Remove a listener registered with [`MenuItem::subscribe_changed`].
    ///
    /// Returns false if the id was unknown.
    pub fn unsubscribe_changed(&self, id: SubscriptionId) -> bool {
        let mut listeners = self.change_listeners.lock();
        let before = listeners.len();
        listeners.retain(|(sid, _)| *sid != id);
        listeners.len() != before
    }

    pub fn change_listener_count(&self) -> usize {
        self.change_listeners.lock().len()
    }

    /// Fire every change listener. Called after each mutation; no item lock is held.
    pub fn notify_changed(&self) {
        let listeners: Vec<Callback> = self
            .change_listeners
            .lock()
            .iter()
            .map(|(_, listener)| listener.clone())
            .collect();
        for listener in listeners {
            listener();
        }
    }
}

impl ClickBridge for MenuItem {
    fn raise_clicked(&self) {
        let handlers: Vec<Callback> = self.click_handlers.lock().clone();
        for handler in handlers {
            handler();
        }
    }
}

impl fmt::Debug for MenuItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.read();
        f.debug_struct("MenuItem")
            .field("header", &state.header)
            .field("has_icon", &state.icon.is_some())
            .field("children", &state.children)
            .finish()
    }
}
