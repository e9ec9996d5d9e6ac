use std::fmt;

/// Kind of change applied to a store
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreEventType {
    Added,
    Updated,
    Deleted,
    Cleared
}

impl fmt::Display for StoreEventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            StoreEventType::Added => "added",
            StoreEventType::Updated => "updated",
            StoreEventType::Deleted => "deleted",
            StoreEventType::Cleared => "cleared"
        };
        write!(f, "{}", name)
    }
}

/// A change notification, carrying the affected key except for `Cleared`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreEvent {
    pub event_type: StoreEventType,
    pub key:        Option<String>
}

impl StoreEvent {
    pub fn new(event_type: StoreEventType, key: Option<&str>) -> Self {
        Self { event_type, key: key.map(str::to_string) }
    }
}

/// Receives change notifications from a variable store or storage
///
/// Delivery is synchronous and completes before the mutating call returns.
pub trait StoreListener {
    fn store_changed(&self, event: &StoreEvent);
}
