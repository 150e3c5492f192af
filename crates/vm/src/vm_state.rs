//! Execution state of the virtual machine.

/// The state of a [`crate::ExecutionEngine`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VMState {
    /// Execution has not finished.
    None,
    /// Execution finished normally; the result is available.
    Halt,
    /// Execution aborted; no result is available.
    Fault,
}

impl Default for VMState {
    fn default() -> Self {
        VMState::None
    }
}
