//! End-to-end execution scenarios through the public entry API.

mod common;

use common::*;
use onyx_core::Address;
use onyx_persistence::MemoryStore;
use onyx_smart_contract::driver::ExecMode;
use onyx_smart_contract::host::InteropHost;
use onyx_smart_contract::native::{NativeContract, NativeRegistry};
use onyx_vm::{OpCode, ScriptBuilder, StackItem, VmError, VmResult};
use std::sync::Arc;

fn script(build: impl FnOnce(&mut ScriptBuilder)) -> Vec<u8> {
    let mut builder = ScriptBuilder::new();
    build(&mut builder);
    builder.into_bytes()
}

#[test]
fn test_pure_arithmetic_halts() {
    // PUSH2 PUSH3 ADD with plenty of gas.
    let store = Arc::new(MemoryStore::new());
    let code = script(|b| {
        b.emit_opcode(OpCode::PUSH2);
        b.emit_opcode(OpCode::PUSH3);
        b.emit_opcode(OpCode::ADD);
    });
    let outcome = run_with(
        store,
        &code,
        Vec::new(),
        Arc::new(NativeRegistry::new()),
        ExecMode::Consensus,
        10_000,
    )
    .unwrap();

    assert_eq!(outcome.result.unwrap().as_int().unwrap(), 5.into());
    assert!(outcome.notifications.is_empty());
    assert!(outcome.state_delta.is_clean());
    assert!(outcome.gas_consumed > 0 && outcome.gas_consumed <= 10_000);
}

#[test]
fn test_gas_exhaustion_aborts() {
    // A long DUP chain against a tiny gas budget.
    let store = Arc::new(MemoryStore::new());
    let mut builder = ScriptBuilder::new();
    builder.emit_opcode(OpCode::PUSH1);
    for _ in 0..1_000_000 {
        builder.emit_opcode(OpCode::DUP);
    }
    let error = run_with(
        store,
        &builder.into_bytes(),
        Vec::new(),
        Arc::new(NativeRegistry::new()),
        ExecMode::Consensus,
        100,
    )
    .unwrap_err();
    assert!(matches!(error, VmError::InsufficientGas { .. }));
}

#[test]
fn test_storage_put_visible_after_commit_only() {
    // The contract writes k=v; the write must be invisible until the caller
    // applies the returned overlay, and visible afterwards.
    let store = Arc::new(MemoryStore::new());
    let contract_code = script(|b| {
        b.emit_syscall("Storage.GetContext");
        b.emit_push(b"k");
        b.emit_push(b"v");
        b.emit_syscall("Storage.Put");
        b.emit_opcode(OpCode::RET);
    });
    let contract = deploy_contract(&store, &contract_code);
    let entry = script(|b| {
        b.emit_appcall(&contract);
    });

    let outcome = run(store.clone(), &entry).unwrap();
    assert!(read_storage(&store, &contract, b"k").is_none());

    use onyx_persistence::WriteStore;
    store.write_batch(outcome.state_delta.into_batch()).unwrap();
    assert_eq!(read_storage(&store, &contract, b"k"), Some(b"v".to_vec()));
}

#[test]
fn test_nested_call_notification_order() {
    // A notifies a1, calls B (which notifies b1), then notifies a2.
    let store = Arc::new(MemoryStore::new());
    let b_code = script(|b| {
        b.emit_push(b"b1");
        b.emit_syscall("Runtime.Notify");
        b.emit_opcode(OpCode::RET);
    });
    let b_address = deploy_contract(&store, &b_code);

    let a_code = script(|b| {
        b.emit_push(b"a1");
        b.emit_syscall("Runtime.Notify");
        b.emit_appcall(&b_address);
        b.emit_push(b"a2");
        b.emit_syscall("Runtime.Notify");
        b.emit_opcode(OpCode::RET);
    });
    let a_address = Address::from_code(&a_code);

    let outcome = run(store, &a_code).unwrap();
    let notifications = outcome.notifications;
    assert_eq!(notifications.len(), 3);
    assert_eq!(notifications[0].contract, a_address);
    assert_eq!(
        notifications[0].states.as_bytes().unwrap(),
        b"a1".to_vec()
    );
    assert_eq!(notifications[1].contract, b_address);
    assert_eq!(
        notifications[1].states.as_bytes().unwrap(),
        b"b1".to_vec()
    );
    assert_eq!(notifications[2].contract, a_address);
    assert_eq!(
        notifications[2].states.as_bytes().unwrap(),
        b"a2".to_vec()
    );
}

#[test]
fn test_failed_nested_call_rolls_back_everything() {
    // A writes its own k=v1, then calls B, which writes and faults. The
    // pre-transaction value must survive untouched.
    let store = Arc::new(MemoryStore::new());
    let b_code = script(|b| {
        b.emit_syscall("Storage.GetContext");
        b.emit_push(b"k");
        b.emit_push(b"v2");
        b.emit_syscall("Storage.Put");
        b.emit_opcode(OpCode::THROW);
    });
    let b_address = deploy_contract(&store, &b_code);

    let a_code = script(|b| {
        b.emit_syscall("Storage.GetContext");
        b.emit_push(b"k");
        b.emit_push(b"v1");
        b.emit_syscall("Storage.Put");
        b.emit_appcall(&b_address);
    });
    let a_address = Address::from_code(&a_code);
    seed_storage(&store, &a_address, b"k", b"v0");

    let error = run(store.clone(), &a_code).unwrap_err();
    assert!(matches!(error, VmError::Fault { .. }));
    assert_eq!(read_storage(&store, &a_address, b"k"), Some(b"v0".to_vec()));
    assert_eq!(read_storage(&store, &b_address, b"k"), None);
}

#[test]
fn test_witness_through_calling_context() {
    // B asserts that its caller's address carries a witness and that its
    // own does not. The caller's address reaches B through B's storage.
    let store = Arc::new(MemoryStore::new());
    let b_code = script(|b| {
        b.emit_syscall("Storage.GetContext");
        b.emit_push(b"caller");
        b.emit_syscall("Storage.Get");
        b.emit_syscall("Runtime.CheckWitness");
        b.emit_opcode(OpCode::THROWIFNOT);
        b.emit_syscall("Script.GetExecutingAddress");
        b.emit_syscall("Runtime.CheckWitness");
        b.emit_opcode(OpCode::NOT);
        b.emit_opcode(OpCode::THROWIFNOT);
        b.emit_push_int(1);
        b.emit_opcode(OpCode::RET);
    });
    let b_address = deploy_contract(&store, &b_code);

    let a_code = script(|b| {
        b.emit_appcall(&b_address);
    });
    let a_address = Address::from_code(&a_code);
    seed_storage(&store, &b_address, b"caller", a_address.as_bytes());

    let outcome = run(store, &a_code).unwrap();
    assert_eq!(outcome.result.unwrap().as_int().unwrap(), 1.into());
}

#[test]
fn test_witness_by_transaction_signer() {
    let store = Arc::new(MemoryStore::new());
    let signer = Address::from_code(b"the signer");
    let code = script(|b| {
        b.emit_push(signer.as_bytes());
        b.emit_syscall("Runtime.CheckWitness");
        b.emit_push(Address::from_code(b"someone else").as_bytes());
        b.emit_syscall("Runtime.CheckWitness");
        b.emit_opcode(OpCode::NOT);
        b.emit_opcode(OpCode::BOOLAND);
    });
    let outcome = run_with(
        store,
        &code,
        vec![signer],
        Arc::new(NativeRegistry::new()),
        ExecMode::Consensus,
        TEST_GAS,
    )
    .unwrap();
    assert!(outcome.result.unwrap().as_bool());
}

#[test]
fn test_foreign_storage_context_denied() {
    // The entry script hands its own writable context to B via the copied
    // evaluation stack; B must not be able to write through it.
    let store = Arc::new(MemoryStore::new());
    let b_code = script(|b| {
        b.emit_syscall("Storage.Put");
    });
    let b_address = deploy_contract(&store, &b_code);

    let a_code = script(|b| {
        b.emit_syscall("Storage.GetContext");
        b.emit_push(b"k");
        b.emit_push(b"v");
        b.emit_appcall(&b_address);
    });

    let error = run(store, &a_code).unwrap_err();
    assert!(matches!(error, VmError::PermissionDenied { .. }));
}

#[test]
fn test_readonly_context_rejects_put() {
    let store = Arc::new(MemoryStore::new());
    let code = script(|b| {
        b.emit_syscall("Storage.GetReadOnlyContext");
        b.emit_push(b"k");
        b.emit_push(b"v");
        b.emit_syscall("Storage.Put");
    });
    let error = run(store, &code).unwrap_err();
    assert!(matches!(error, VmError::PermissionDenied { .. }));
}

#[test]
fn test_downgraded_context_rejects_delete() {
    let store = Arc::new(MemoryStore::new());
    let code = script(|b| {
        b.emit_syscall("Storage.GetContext");
        b.emit_syscall("Storage.ContextAsReadOnly");
        b.emit_push(b"k");
        b.emit_syscall("Storage.Delete");
    });
    let error = run(store, &code).unwrap_err();
    assert!(matches!(error, VmError::PermissionDenied { .. }));
}

#[test]
fn test_unknown_service_aborts() {
    let store = Arc::new(MemoryStore::new());
    let code = script(|b| {
        b.emit_syscall("Runtime.DoesNotExist");
    });
    let error = run(store, &code).unwrap_err();
    assert!(matches!(error, VmError::UnsupportedService { .. }));
}

#[test]
fn test_appcall_unknown_contract_aborts() {
    let store = Arc::new(MemoryStore::new());
    let code = script(|b| {
        b.emit_appcall(&Address::from_code(b"nobody home"));
    });
    let error = run(store, &code).unwrap_err();
    assert!(matches!(error, VmError::ContractNotFound { .. }));
}

#[test]
fn test_dynamic_appcall_pops_target() {
    let store = Arc::new(MemoryStore::new());
    let callee = script(|b| {
        b.emit_push_int(9);
        b.emit_opcode(OpCode::RET);
    });
    let callee_address = deploy_contract(&store, &callee);
    let code = script(|b| {
        b.emit_push(callee_address.as_bytes());
        b.emit_appcall_dynamic();
    });
    let outcome = run(store, &code).unwrap();
    assert_eq!(outcome.result.unwrap().as_int().unwrap(), 9.into());
}

#[test]
fn test_tailcall_replaces_frame() {
    let store = Arc::new(MemoryStore::new());
    let callee = script(|b| {
        b.emit_push_int(7);
        b.emit_opcode(OpCode::RET);
    });
    let callee_address = deploy_contract(&store, &callee);
    let code = script(|b| {
        b.emit_tailcall(&callee_address);
    });
    let outcome = run(store, &code).unwrap();
    assert_eq!(outcome.result.unwrap().as_int().unwrap(), 7.into());
}

#[test]
fn test_appcall_result_returns_to_caller() {
    // The callee computes over the copied stack and its single result comes
    // back on the caller's stack.
    let store = Arc::new(MemoryStore::new());
    let adder = script(|b| {
        b.emit_opcode(OpCode::ADD);
        b.emit_opcode(OpCode::RET);
    });
    let adder_address = deploy_contract(&store, &adder);
    let code = script(|b| {
        b.emit_push_int(20);
        b.emit_push_int(22);
        b.emit_appcall(&adder_address);
    });
    let outcome = run(store, &code).unwrap();
    assert_eq!(outcome.result.unwrap().as_int().unwrap(), 42.into());
}

#[test]
fn test_step_limit_in_preview_mode() {
    // JMP 0 loops forever; preview mode must stop at the step ceiling.
    let store = Arc::new(MemoryStore::new());
    let code = script(|b| {
        b.emit_jump(OpCode::JMP, 0);
    });
    let error = run_with(
        store.clone(),
        &code,
        Vec::new(),
        Arc::new(NativeRegistry::new()),
        ExecMode::PreExec,
        20_000_000,
    )
    .unwrap_err();
    assert!(matches!(error, VmError::StepLimitExceeded { .. }));

    // Consensus mode has no step ceiling; the same loop runs out of gas.
    let error = run_with(
        store,
        &code,
        Vec::new(),
        Arc::new(NativeRegistry::new()),
        ExecMode::Consensus,
        1_000,
    )
    .unwrap_err();
    assert!(matches!(error, VmError::InsufficientGas { .. }));
}

#[test]
fn test_runtime_time_and_block_hash() {
    let store = Arc::new(MemoryStore::new());
    let code = script(|b| {
        b.emit_syscall("Runtime.GetTime");
    });
    let outcome = run(store.clone(), &code).unwrap();
    assert_eq!(
        outcome.result.unwrap().as_int().unwrap(),
        test_header().timestamp.into()
    );

    let code = script(|b| {
        b.emit_syscall("Runtime.GetCurrentBlockHash");
    });
    let outcome = run(store, &code).unwrap();
    assert_eq!(
        outcome.result.unwrap().as_bytes().unwrap(),
        test_header().hash().to_vec()
    );
}

#[test]
fn test_address_base58_round_trip_services() {
    let store = Arc::new(MemoryStore::new());
    let address = Address::from_code(b"whoever");
    let code = script(|b| {
        b.emit_push(address.as_bytes());
        b.emit_syscall("Runtime.AddressToBase58");
        b.emit_syscall("Runtime.Base58ToAddress");
    });
    let outcome = run(store, &code).unwrap();
    assert_eq!(
        outcome.result.unwrap().as_bytes().unwrap(),
        address.to_vec()
    );
}

#[test]
fn test_serialize_deserialize_services() {
    let store = Arc::new(MemoryStore::new());
    let code = script(|b| {
        b.emit_push(b"payload");
        b.emit_syscall("Runtime.Serialize");
        b.emit_syscall("Runtime.Deserialize");
    });
    let outcome = run(store, &code).unwrap();
    assert_eq!(
        outcome.result.unwrap().as_bytes().unwrap(),
        b"payload".to_vec()
    );
}

#[test]
fn test_trigger_disclosed() {
    let store = Arc::new(MemoryStore::new());
    let code = script(|b| {
        b.emit_syscall("Runtime.GetTrigger");
    });
    let outcome = run(store, &code).unwrap();
    assert_eq!(outcome.result.unwrap().as_int().unwrap(), 0x10.into());
}

struct AnswerContract;

impl NativeContract for AnswerContract {
    fn address(&self) -> Address {
        onyx_smart_contract::native::native_address(3)
    }

    fn invoke(
        &self,
        method: &str,
        _args: StackItem,
        _host: &mut InteropHost,
    ) -> VmResult<StackItem> {
        match method {
            "answer" => Ok(StackItem::from_int(42)),
            other => Err(VmError::fault(format!("unknown method {other}"))),
        }
    }
}

#[test]
fn test_native_invoke_dispatches_by_address() {
    let store = Arc::new(MemoryStore::new());
    let mut natives = NativeRegistry::new();
    natives.register(Arc::new(AnswerContract));

    let code = script(|b| {
        b.emit_push_int(0); // args placeholder
        b.emit_push(b"answer");
        b.emit_push(AnswerContract.address().as_bytes());
        b.emit_push_int(0); // call version
        b.emit_syscall("Native.Invoke");
    });
    let outcome = run_with(
        store.clone(),
        &code,
        Vec::new(),
        Arc::new(natives),
        ExecMode::Consensus,
        TEST_GAS,
    )
    .unwrap();
    assert_eq!(outcome.result.unwrap().as_int().unwrap(), 42.into());

    // Without a registered contract the same call aborts.
    let error = run(store, &code).unwrap_err();
    assert!(matches!(error, VmError::ContractNotFound { .. }));
}

#[test]
fn test_contract_create_then_call_in_same_transaction() {
    // Deploy a contract through Contract.Create and invoke it immediately;
    // the record is visible through the overlay before any commit.
    let store = Arc::new(MemoryStore::new());
    let deployed = script(|b| {
        b.emit_push_int(11);
        b.emit_opcode(OpCode::RET);
    });
    let deployed_address = Address::from_code(&deployed);

    let code = script(|b| {
        b.emit_push(b"d"); // description
        b.emit_push(b"e"); // email
        b.emit_push(b"a"); // author
        b.emit_push(b"1"); // version
        b.emit_push(b"n"); // name
        b.emit_push_bool(true); // needs storage
        b.emit_push(&deployed); // code
        b.emit_syscall("Contract.Create");
        b.emit_opcode(OpCode::DROP);
        b.emit_appcall(&deployed_address);
    });
    let outcome = run(store, &code).unwrap();
    assert_eq!(outcome.result.unwrap().as_int().unwrap(), 11.into());
}

#[test]
fn test_blockchain_lookups() {
    use onyx_core::{Block, Header, Transaction};
    use onyx_persistence::{CacheDb, ReadStore, WriteStore};
    use onyx_smart_contract::chain;

    let store = Arc::new(MemoryStore::new());
    let block = Block {
        header: Header {
            version: 2,
            prev_hash: onyx_core::UInt256::zero(),
            tx_root: onyx_core::UInt256::zero(),
            timestamp: 555,
            height: 42,
            consensus_data: 1,
            next_bookkeeper: Address::zero(),
        },
        transactions: vec![Transaction::invoke(vec![0x51], 3)],
    };
    let mut cache = CacheDb::new(store.clone() as Arc<dyn ReadStore>);
    chain::put_block(&mut cache, &block);
    store.write_batch(cache.into_batch()).unwrap();

    // Header lookup by height, then a field getter.
    let code = script(|b| {
        b.emit_push_int(42);
        b.emit_syscall("Blockchain.GetHeader");
        b.emit_syscall("Header.GetTimestamp");
    });
    let outcome = run(store.clone(), &code).unwrap();
    assert_eq!(outcome.result.unwrap().as_int().unwrap(), 555.into());

    // Transaction lookup by hash, then its recorded height.
    let tx_hash = block.transactions[0].hash();
    let code = script(|b| {
        b.emit_push(tx_hash.as_bytes());
        b.emit_syscall("Blockchain.GetTransactionHeight");
    });
    let outcome = run(store.clone(), &code).unwrap();
    assert_eq!(outcome.result.unwrap().as_int().unwrap(), 42.into());

    // Block lookup by hash, then its transaction count.
    let code = script(|b| {
        b.emit_push(block.hash().as_bytes());
        b.emit_syscall("Blockchain.GetBlock");
        b.emit_syscall("Block.GetTransactionCount");
    });
    let outcome = run(store, &code).unwrap();
    assert_eq!(outcome.result.unwrap().as_int().unwrap(), 1.into());
}

#[test]
fn test_entry_address_survives_nested_calls() {
    // B reports the entry address; it must be A's address even though B is
    // executing.
    let store = Arc::new(MemoryStore::new());
    let b_code = script(|b| {
        b.emit_syscall("Script.GetEntryAddress");
        b.emit_opcode(OpCode::RET);
    });
    let b_address = deploy_contract(&store, &b_code);
    let a_code = script(|b| {
        b.emit_appcall(&b_address);
    });
    let a_address = Address::from_code(&a_code);

    let outcome = run(store, &a_code).unwrap();
    assert_eq!(
        outcome.result.unwrap().as_bytes().unwrap(),
        a_address.to_vec()
    );
}

#[test]
fn test_gas_consumed_monotonic_and_bounded() {
    let store = Arc::new(MemoryStore::new());
    let code = script(|b| {
        b.emit_push_int(1);
        b.emit_push_int(2);
        b.emit_opcode(OpCode::ADD);
    });
    let outcome = run(store, &code).unwrap();
    assert!(outcome.gas_consumed > 0);
    assert!(outcome.gas_consumed <= TEST_GAS);
}
