//! Opaque listener handle.
//!
//! [`ListenerId`] is a newtype wrapper around [`uuid::Uuid`] (v4) so a
//! registration can be removed precisely without comparing callbacks.

use std::fmt;

/// Identifies one listener registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(uuid::Uuid);

impl ListenerId {
    /// Creates a new random `ListenerId`.
    #[must_use]
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4())
    }

    /// Returns the inner UUID.
    #[must_use]
    pub const fn as_uuid(&self) -> &uuid::Uuid {
        &self.0
    }
}

impl Default for ListenerId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ListenerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Handle returned by registration; pass it back to remove the listener.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ListenerHandle {
    /// Event type the listener was registered under.
    pub event_type: String,
    /// Unique id of the registration.
    pub id: ListenerId,
}
