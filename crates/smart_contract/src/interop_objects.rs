//! Host-side values exposed to scripts as opaque interop handles.

use crate::contract_state::ContractState;
use crate::storage::StorageContext;
use onyx_core::{Block, CodeContainer, Header, Transaction, TransactionAttribute, UInt256};
use onyx_vm::{InteropInterface, StackItem, VmError, VmResult};
use std::any::Any;
use std::fmt;
use std::rc::Rc;
use std::sync::Arc;

macro_rules! interop_object {
    ($name:ident, $payload:ty, $label:literal) => {
        /// Interop wrapper; see the module docs.
        #[derive(Debug, Clone)]
        pub struct $name(pub $payload);

        impl InteropInterface for $name {
            fn type_name(&self) -> &'static str {
                $label
            }

            fn as_any(&self) -> &dyn Any {
                self
            }
        }
    };
}

interop_object!(HeaderObject, Header, "Header");
interop_object!(BlockObject, Block, "Block");
interop_object!(TransactionObject, Transaction, "Transaction");
interop_object!(AttributeObject, TransactionAttribute, "Attribute");
interop_object!(ContractObject, ContractState, "Contract");
interop_object!(StorageContextObject, StorageContext, "StorageContext");

/// The executing transaction, held through its abstract surface.
#[derive(Clone)]
pub struct CodeContainerObject(pub Arc<dyn CodeContainer>);

impl fmt::Debug for CodeContainerObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CodeContainerObject({})", self.0.container_hash())
    }
}

impl InteropInterface for CodeContainerObject {
    fn type_name(&self) -> &'static str {
        "Transaction"
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Pops either a stored transaction or the executing code container and
/// returns its common surface: hash, type and attributes.
pub fn pop_transaction_surface(
    engine: &mut onyx_vm::ExecutionEngine,
) -> VmResult<(UInt256, u8, Vec<TransactionAttribute>)> {
    let handle = engine.pop()?.as_interop()?;
    if let Some(transaction) = handle.as_any().downcast_ref::<TransactionObject>() {
        let tx = &transaction.0;
        return Ok((tx.hash(), tx.tx_type as u8, tx.attributes.clone()));
    }
    if let Some(container) = handle.as_any().downcast_ref::<CodeContainerObject>() {
        let tx = &container.0;
        return Ok((
            tx.container_hash(),
            tx.container_type(),
            tx.attributes().to_vec(),
        ));
    }
    Err(VmError::fault(format!(
        "expected a Transaction, found {}",
        handle.type_name()
    )))
}

/// Downcasts an interop handle to the expected wrapper, faulting otherwise.
pub fn downcast<T: InteropInterface + Clone + 'static>(
    handle: &Rc<dyn InteropInterface>,
) -> VmResult<T> {
    handle
        .as_any()
        .downcast_ref::<T>()
        .cloned()
        .ok_or_else(|| {
            VmError::fault(format!(
                "unexpected interop object {}",
                handle.type_name()
            ))
        })
}

/// Pops an interop handle of the expected wrapper type.
pub fn pop_object<T: InteropInterface + Clone + 'static>(
    engine: &mut onyx_vm::ExecutionEngine,
) -> VmResult<T> {
    let handle = engine.pop()?.as_interop()?;
    downcast::<T>(&handle)
}

/// A header taken from either a header handle or a block handle.
pub fn pop_header(engine: &mut onyx_vm::ExecutionEngine) -> VmResult<Header> {
    let handle = engine.pop()?.as_interop()?;
    if let Some(header) = handle.as_any().downcast_ref::<HeaderObject>() {
        return Ok(header.0.clone());
    }
    if let Some(block) = handle.as_any().downcast_ref::<BlockObject>() {
        return Ok(block.0.header.clone());
    }
    Err(VmError::fault(format!(
        "expected a Header or Block, found {}",
        handle.type_name()
    )))
}

/// Wraps a storage context for the stack.
pub fn storage_context_item(context: StorageContext) -> StackItem {
    StackItem::from_interop(StorageContextObject(context))
}

#[cfg(test)]
mod tests {
    use super::*;
    use onyx_core::Address;

    #[test]
    fn test_downcast_type_mismatch_faults() {
        let item = storage_context_item(StorageContext::new(Address::zero()));
        let handle = item.as_interop().unwrap();
        assert!(downcast::<StorageContextObject>(&handle).is_ok());
        assert!(downcast::<ContractObject>(&handle).is_err());
    }

    #[test]
    fn test_reference_equality_of_handles() {
        let item = storage_context_item(StorageContext::new(Address::zero()));
        let alias = item.clone();
        let other = storage_context_item(StorageContext::new(Address::zero()));
        assert!(item.equals(&alias).unwrap());
        assert!(!item.equals(&other).unwrap());
    }
}
