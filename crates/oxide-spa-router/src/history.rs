//! Browser-facing collaborators: session history and the navigation
//! listener set.
//!
//! The router never touches a real browser. DOM glue implements
//! [`History`] over `window.history` and forwards clicks and `popstate`
//! events to [`Router::link_activated`](crate::Router::link_activated) and
//! [`Router::history_changed`](crate::Router::history_changed).

use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::Mutex;
use tracing::debug;

/// Session history the router pushes programmatic navigations onto.
pub trait History: Send + Sync {
    /// Pushes a new entry without dispatching anything.
    fn push_state(&self, path: &str);

    /// Returns the path of the current entry.
    fn location(&self) -> String;
}

#[derive(Debug)]
struct Entries {
    stack: Vec<String>,
    cursor: usize,
}

/// In-memory history with back/forward support.
#[derive(Debug)]
pub struct MemoryHistory {
    entries: Mutex<Entries>,
}

impl MemoryHistory {
    /// Creates a history whose only entry is `initial`.
    pub fn new(initial: impl Into<String>) -> Self {
        Self {
            entries: Mutex::new(Entries {
                stack: vec![initial.into()],
                cursor: 0,
            }),
        }
    }

    /// Moves one entry back. Returns `false` at the oldest entry.
    pub fn back(&self) -> bool {
        let mut entries = self.entries.lock();
        if entries.cursor == 0 {
            return false;
        }
        entries.cursor -= 1;
        true
    }

    /// Moves one entry forward. Returns `false` at the newest entry.
    pub fn forward(&self) -> bool {
        let mut entries = self.entries.lock();
        if entries.cursor + 1 >= entries.stack.len() {
            return false;
        }
        entries.cursor += 1;
        true
    }

    /// Snapshot of all entries, oldest first.
    pub fn entries(&self) -> Vec<String> {
        self.entries.lock().stack.clone()
    }
}

impl Default for MemoryHistory {
    fn default() -> Self {
        Self::new("/")
    }
}

impl History for MemoryHistory {
    fn push_state(&self, path: &str) {
        let mut entries = self.entries.lock();
        let keep = entries.cursor + 1;
        entries.stack.truncate(keep);
        entries.stack.push(path.to_string());
        entries.cursor = keep;
    }

    fn location(&self) -> String {
        let entries = self.entries.lock();
        entries.stack[entries.cursor].clone()
    }
}

/// Marker for the click/keyup/popstate listeners installed by the glue.
///
/// Each router gets its own set unless one is shared through
/// [`RouterBuilder::listeners`](crate::RouterBuilder::listeners). A shared
/// set is installed once, and tearing it down through any router stops
/// delivery to all of them.
#[derive(Debug, Default)]
pub struct NavigationListeners {
    installed: AtomicBool,
}

impl NavigationListeners {
    /// Creates an uninstalled listener set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Installs the set. Returns `false` if it was already installed.
    pub fn install(&self) -> bool {
        let fresh = !self.installed.swap(true, Ordering::AcqRel);
        if fresh {
            debug!("navigation listeners installed");
        }
        fresh
    }

    /// Removes the set. Returns `false` if it was not installed.
    pub fn teardown(&self) -> bool {
        let removed = self.installed.swap(false, Ordering::AcqRel);
        if removed {
            debug!("navigation listeners removed");
        }
        removed
    }

    /// Whether events are currently delivered.
    pub fn is_installed(&self) -> bool {
        self.installed.load(Ordering::Acquire)
    }
}
