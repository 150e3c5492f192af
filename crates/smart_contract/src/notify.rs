//! Per-transaction notification log.

use onyx_core::Address;
use onyx_vm::StackItem;

/// One event emitted by a contract during execution.
#[derive(Debug, Clone)]
pub struct NotifyEvent {
    /// The contract that emitted the event.
    pub contract: Address,
    /// The event payload, as left on the stack by the contract.
    pub states: StackItem,
}

/// Ordered buffer of events, flushed to the receipt only on a successful
/// halt. On failure the whole buffer is dropped with the driver.
#[derive(Debug, Default)]
pub struct NotificationBuffer {
    events: Vec<NotifyEvent>,
}

impl NotificationBuffer {
    /// Creates an empty buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of buffered events.
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Returns true when nothing has been emitted.
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Appends an event.
    pub fn push(&mut self, event: NotifyEvent) {
        self.events.push(event);
    }

    /// Consumes the buffer, yielding the events in emission order.
    pub fn into_events(self) -> Vec<NotifyEvent> {
        self.events
    }
}
