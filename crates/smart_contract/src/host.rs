//! The host environment mediating VM and ledger.

use crate::context_stack::ContextStack;
use crate::native::NativeRegistry;
use crate::notify::NotificationBuffer;
use onyx_core::{Address, CodeContainer, Header};
use onyx_persistence::CacheDb;
use onyx_vm::{VmError, VmResult};
use std::sync::Arc;

/// What caused this execution, as disclosed by `Runtime.GetTrigger`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum TriggerType {
    /// Running a verification script.
    Verification = 0x00,
    /// Running an application invocation.
    Application = 0x10,
}

/// Everything a service effect may touch: the transaction surface, the block
/// header supplying deterministic time and height, the state overlay, the
/// contract call stack and the notification buffer.
///
/// Owned exclusively by one driver for the duration of one invocation.
pub struct InteropHost {
    pub tx: Arc<dyn CodeContainer>,
    pub header: Header,
    pub cache: CacheDb,
    pub contexts: ContextStack,
    pub notifications: NotificationBuffer,
    pub natives: Arc<NativeRegistry>,
    pub trigger: TriggerType,
}

impl InteropHost {
    /// The address of the contract executing right now.
    pub fn current_address(&self) -> VmResult<Address> {
        self.contexts
            .current()
            .map(|context| context.contract_address)
            .ok_or_else(|| VmError::fault("no current contract context"))
    }

    /// The address of the contract that invoked the current one, if any.
    pub fn calling_address(&self) -> Option<Address> {
        self.contexts
            .calling()
            .map(|context| context.contract_address)
    }

    /// The address the transaction entered through.
    pub fn entry_address(&self) -> VmResult<Address> {
        self.contexts
            .entry()
            .map(|context| context.contract_address)
            .ok_or_else(|| VmError::fault("no entry contract context"))
    }

    /// Whether `address` authorized this execution: either it signed the
    /// transaction, or it is the address of the contract that made the
    /// current nested call. The current contract cannot witness itself.
    pub fn check_witness(&self, address: &Address) -> bool {
        if self.tx.signature_addresses().contains(address) {
            return true;
        }
        self.calling_address().as_ref() == Some(address)
    }
}
