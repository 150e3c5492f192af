//! Shared fixtures for the execution tests.

use onyx_core::{Address, Header, Transaction, UInt256};
use onyx_persistence::{CacheDb, MemoryStore, ReadStore, WriteStore};
use onyx_smart_contract::chain;
use onyx_smart_contract::driver::{execute, ExecMode, ExecutionOutcome};
use onyx_smart_contract::host::TriggerType;
use onyx_smart_contract::native::NativeRegistry;
use onyx_smart_contract::storage::{StorageItem, StorageKey};
use onyx_smart_contract::ContractState;
use onyx_vm::VmError;
use std::sync::Arc;

/// Default gas budget for tests that are not about gas.
pub const TEST_GAS: u64 = 100_000_000;

/// The header every test executes under.
pub fn test_header() -> Header {
    Header {
        version: 0,
        prev_hash: UInt256::zero(),
        tx_root: UInt256::zero(),
        timestamp: 1_600_000_000,
        height: 1000,
        consensus_data: 7,
        next_bookkeeper: Address::zero(),
    }
}

/// Runs `code` as an invocation transaction signed by `signers`.
pub fn run_with(
    store: Arc<MemoryStore>,
    code: &[u8],
    signers: Vec<Address>,
    natives: Arc<NativeRegistry>,
    mode: ExecMode,
    gas_limit: u64,
) -> Result<ExecutionOutcome, VmError> {
    let mut tx = Transaction::invoke(code.to_vec(), 1);
    tx.signers = signers;
    execute(
        Arc::new(tx),
        test_header(),
        store,
        natives,
        TriggerType::Application,
        mode,
        code,
        gas_limit,
    )
}

/// Runs `code` with the defaults: no signers, no natives, consensus mode.
pub fn run(store: Arc<MemoryStore>, code: &[u8]) -> Result<ExecutionOutcome, VmError> {
    run_with(
        store,
        code,
        Vec::new(),
        Arc::new(NativeRegistry::new()),
        ExecMode::Consensus,
        TEST_GAS,
    )
}

/// Deploys `code` as a contract record directly into the store.
pub fn deploy_contract(store: &Arc<MemoryStore>, code: &[u8]) -> Address {
    let contract = ContractState {
        code: code.to_vec(),
        needs_storage: true,
        name: "fixture".into(),
        version: "1.0".into(),
        author: "tests".into(),
        email: "tests@example.org".into(),
        description: "test fixture contract".into(),
    };
    let mut cache = CacheDb::new(store.clone() as Arc<dyn ReadStore>);
    chain::put_contract(&mut cache, &contract);
    store.write_batch(cache.into_batch()).unwrap();
    contract.address()
}

/// Seeds one storage entry for `contract` directly into the store.
pub fn seed_storage(store: &Arc<MemoryStore>, contract: &Address, key: &[u8], value: &[u8]) {
    store
        .write_batch(vec![onyx_persistence::BatchOp::Put {
            key: StorageKey::new(*contract, key.to_vec()).to_store_key(),
            value: StorageItem::new(value.to_vec()).to_bytes(),
        }])
        .unwrap();
}

/// Reads one storage entry for `contract` straight from the store.
pub fn read_storage(store: &Arc<MemoryStore>, contract: &Address, key: &[u8]) -> Option<Vec<u8>> {
    store
        .get(&StorageKey::new(*contract, key.to_vec()).to_store_key())
        .unwrap()
        .map(|record| StorageItem::from_bytes(&record).unwrap().value)
}
