//! Listener registry keyed by event type.
//!
//! Tracks which callbacks want which notification types and hands out the
//! ordered callback list for an inbound event.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use super::listener_id::{ListenerHandle, ListenerId};
use super::messages::NotificationEvent;

/// Callback invoked for each matching notification.
pub type Listener = Arc<dyn Fn(&NotificationEvent) + Send + Sync>;

/// Maps event types to their listeners, in registration order.
///
/// The same callback may be registered under several types; each
/// registration gets its own handle and is removed independently.
#[derive(Default)]
pub struct ListenerRegistry {
    by_type: HashMap<String, Vec<(ListenerId, Listener)>>,
}

impl fmt::Debug for ListenerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let counts: HashMap<&str, usize> = self
            .by_type
            .iter()
            .map(|(event_type, listeners)| (event_type.as_str(), listeners.len()))
            .collect();
        f.debug_struct("ListenerRegistry")
            .field("listeners", &counts)
            .finish()
    }
}

impl ListenerRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `listener` for `event_type` and returns its handle.
    pub fn register(&mut self, event_type: &str, listener: Listener) -> ListenerHandle {
        let id = ListenerId::new();
        self.by_type
            .entry(event_type.to_string())
            .or_default()
            .push((id, listener));
        ListenerHandle {
            event_type: event_type.to_string(),
            id,
        }
    }

    /// Removes the registration behind `handle`.
    ///
    /// Returns `false` if it was already removed.
    pub fn unregister(&mut self, handle: &ListenerHandle) -> bool {
        let Some(listeners) = self.by_type.get_mut(&handle.event_type) else {
            return false;
        };
        let before = listeners.len();
        listeners.retain(|(id, _)| *id != handle.id);
        let removed = listeners.len() != before;
        if listeners.is_empty() {
            self.by_type.remove(&handle.event_type);
        }
        removed
    }

    /// Returns the listeners for `event_type` in registration order.
    ///
    /// The list is a snapshot, so callbacks may register or unregister
    /// while it is being invoked.
    #[must_use]
    pub fn listeners_for(&self, event_type: &str) -> Vec<Listener> {
        self.by_type
            .get(event_type)
            .map(|listeners| listeners.iter().map(|(_, l)| Arc::clone(l)).collect())
            .unwrap_or_default()
    }

    /// Returns the number of listeners registered for `event_type`.
    #[must_use]
    pub fn count(&self, event_type: &str) -> usize {
        self.by_type.get(event_type).map_or(0, Vec::len)
    }

    /// Returns the number of registrations across all event types.
    #[must_use]
    pub fn total(&self) -> usize {
        self.by_type.values().map(Vec::len).sum()
    }

    /// Returns `true` if nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_type.is_empty()
    }
}
