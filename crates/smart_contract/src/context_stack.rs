//! Contract invocation bookkeeping.
//!
//! One context per contract on the call path. The entry context is never
//! popped: the identity of the transaction's entry point stays observable
//! through the whole execution, including shutdown sequences.

use bytes::Bytes;
use onyx_core::Address;
use onyx_vm::limits::MAX_CONTEXT_DEPTH;
use onyx_vm::{VmError, VmResult};

/// One entry of the contract call stack.
#[derive(Debug, Clone)]
pub struct ContractContext {
    /// Address of the executing contract.
    pub contract_address: Address,
    /// The contract's code.
    pub code: Bytes,
    /// Notification buffer length at the moment this context was entered.
    pub notifications_offset: usize,
}

impl ContractContext {
    /// Creates a context.
    pub fn new(contract_address: Address, code: Bytes, notifications_offset: usize) -> Self {
        Self {
            contract_address,
            code,
            notifications_offset,
        }
    }
}

/// The stack of contract contexts for one invocation.
#[derive(Debug, Default)]
pub struct ContextStack {
    contexts: Vec<ContractContext>,
}

impl ContextStack {
    /// Creates an empty stack.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the nesting depth.
    pub fn depth(&self) -> usize {
        self.contexts.len()
    }

    /// Pushes a context, enforcing the depth ceiling.
    pub fn push(&mut self, context: ContractContext) -> VmResult<()> {
        if self.contexts.len() >= MAX_CONTEXT_DEPTH {
            return Err(VmError::context_overflow(
                self.contexts.len() + 1,
                MAX_CONTEXT_DEPTH,
            ));
        }
        self.contexts.push(context);
        Ok(())
    }

    /// Pops the current context. A no-op below depth two: the entry context
    /// survives until the driver terminates.
    pub fn pop(&mut self) -> Option<ContractContext> {
        if self.contexts.len() < 2 {
            return None;
        }
        self.contexts.pop()
    }

    /// The context executing right now.
    pub fn current(&self) -> Option<&ContractContext> {
        self.contexts.last()
    }

    /// The context that invoked the current one.
    pub fn calling(&self) -> Option<&ContractContext> {
        if self.contexts.len() < 2 {
            return None;
        }
        self.contexts.get(self.contexts.len() - 2)
    }

    /// The context the transaction entered through.
    pub fn entry(&self) -> Option<&ContractContext> {
        self.contexts.first()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn context(tag: u8) -> ContractContext {
        ContractContext::new(
            Address::from_code(&[tag]),
            Bytes::from_static(&[0x66]),
            0,
        )
    }

    #[test]
    fn test_entry_calling_current() {
        let mut stack = ContextStack::new();
        stack.push(context(1)).unwrap();
        assert!(stack.calling().is_none());
        stack.push(context(2)).unwrap();
        stack.push(context(3)).unwrap();

        assert_eq!(
            stack.entry().unwrap().contract_address,
            Address::from_code(&[1])
        );
        assert_eq!(
            stack.calling().unwrap().contract_address,
            Address::from_code(&[2])
        );
        assert_eq!(
            stack.current().unwrap().contract_address,
            Address::from_code(&[3])
        );
    }

    #[test]
    fn test_entry_context_never_popped() {
        let mut stack = ContextStack::new();
        stack.push(context(1)).unwrap();
        assert!(stack.pop().is_none());
        assert_eq!(stack.depth(), 1);

        stack.push(context(2)).unwrap();
        assert!(stack.pop().is_some());
        assert!(stack.pop().is_none());
        assert_eq!(stack.depth(), 1);
        assert!(stack.entry().is_some());
    }

    #[test]
    fn test_depth_ceiling() {
        let mut stack = ContextStack::new();
        for _ in 0..MAX_CONTEXT_DEPTH {
            stack.push(context(0)).unwrap();
        }
        let error = stack.push(context(0)).unwrap_err();
        assert!(matches!(error, VmError::ContextOverflow { .. }));
    }
}
