//! The dispatch seam into the native (precompiled) contract registry.
//!
//! Native contracts themselves live elsewhere; this module owns only the
//! addressing scheme, the registry handed to each execution, and the
//! `Native.Invoke` service that bridges bytecode into them.

use crate::host::InteropHost;
use crate::service::{require_stack, Service};
use num_traits::Zero;
use onyx_core::{Address, ADDRESS_SIZE};
use onyx_vm::{ExecutionEngine, StackItem, VmError, VmResult};
use std::collections::HashMap;
use std::sync::Arc;

/// Gas price of a native dispatch.
const NATIVE_INVOKE_GAS: u64 = 1000;

/// A precompiled contract reachable through `Native.Invoke`.
pub trait NativeContract: Send + Sync {
    /// The well-known address this contract answers at.
    fn address(&self) -> Address;

    /// Handles one method invocation.
    fn invoke(&self, method: &str, args: StackItem, host: &mut InteropHost)
        -> VmResult<StackItem>;
}

/// Registry of native contracts, keyed by address. Built at startup and
/// shared read-only across executions.
#[derive(Default)]
pub struct NativeRegistry {
    contracts: HashMap<Address, Arc<dyn NativeContract>>,
}

impl NativeRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a native contract at its own address.
    pub fn register(&mut self, contract: Arc<dyn NativeContract>) {
        self.contracts.insert(contract.address(), contract);
    }

    /// Looks up the native contract at `address`.
    pub fn get(&self, address: &Address) -> Option<Arc<dyn NativeContract>> {
        self.contracts.get(address).cloned()
    }
}

/// The well-known address of native contract number `index`: the index as a
/// 20-byte little-endian value.
pub fn native_address(index: u8) -> Address {
    let mut bytes = [0u8; ADDRESS_SIZE];
    bytes[0] = index;
    Address::from(bytes)
}

/// The native identity contract's address.
pub fn id_contract_address() -> Address {
    native_address(3)
}

/// Builds the record key used by the identity contract for one identity:
/// the identity contract address, the identity length, and the identity.
pub fn encode_identity_key(id: &[u8]) -> VmResult<Vec<u8>> {
    if id.is_empty() || id.len() > 255 {
        return Err(VmError::fault(format!(
            "identity length {} outside 1..=255",
            id.len()
        )));
    }
    let address = id_contract_address();
    let mut key = Vec::with_capacity(ADDRESS_SIZE + 1 + id.len());
    key.extend_from_slice(address.as_bytes());
    key.push(id.len() as u8);
    key.extend_from_slice(id);
    Ok(key)
}

fn invoke(host: &mut InteropHost, engine: &mut ExecutionEngine) -> VmResult<()> {
    let version = engine.pop_int()?;
    if !version.is_zero() {
        return Err(VmError::fault(format!(
            "unsupported native call version {version}"
        )));
    }
    let address_bytes = engine.pop_bytes()?;
    let address =
        Address::from_bytes(&address_bytes).map_err(|e| VmError::fault(e.to_string()))?;
    let method_bytes = engine.pop_bytes()?;
    let method = String::from_utf8(method_bytes)
        .map_err(|_| VmError::fault("native method name is not valid UTF-8"))?;
    let args = engine.pop()?;

    let natives = host.natives.clone();
    let contract = natives
        .get(&address)
        .ok_or_else(|| VmError::contract_not_found(address.to_string()))?;
    let result = contract.invoke(&method, args, host)?;
    engine.push(result)
}

/// The cross-VM service row.
pub fn services() -> Vec<Service> {
    vec![Service {
        name: "Native.Invoke",
        validator: |engine| require_stack(engine, 4),
        effect: invoke,
        price: |_| NATIVE_INVOKE_GAS,
    }]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_native_addresses_distinct() {
        assert_ne!(native_address(1), native_address(2));
        assert_eq!(id_contract_address(), native_address(3));
    }

    #[test]
    fn test_identity_key_layout() {
        let key = encode_identity_key(b"did:onyx:abc").unwrap();
        assert_eq!(&key[..20], id_contract_address().as_bytes());
        assert_eq!(key[20] as usize, b"did:onyx:abc".len());
        assert_eq!(&key[21..], b"did:onyx:abc");
    }

    #[test]
    fn test_identity_key_bounds() {
        assert!(encode_identity_key(b"").is_err());
        assert!(encode_identity_key(&[0u8; 256]).is_err());
        assert!(encode_identity_key(&[0u8; 255]).is_ok());
    }
}
