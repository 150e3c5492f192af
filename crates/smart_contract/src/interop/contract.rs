//! Contract lifecycle services.

use crate::chain;
use crate::contract_state::ContractState;
use crate::host::InteropHost;
use crate::interop_objects::{pop_object, storage_context_item, ContractObject};
use crate::service::{flat_price, no_operands, require_stack, Service};
use crate::storage::StorageContext;
use log::debug;
use onyx_vm::{ExecutionEngine, StackItem, VmError, VmResult};

/// Gas price of deploying or migrating a contract.
const DEPLOY_GAS: u64 = 20_000_000;

/// Gas price of destroying a contract.
const DESTROY_GAS: u64 = 100;

fn deploy_price(_engine: &ExecutionEngine) -> u64 {
    DEPLOY_GAS
}

fn pop_metadata_string(engine: &mut ExecutionEngine) -> VmResult<String> {
    let bytes = engine.pop_bytes()?;
    String::from_utf8(bytes).map_err(|_| VmError::fault("metadata is not valid UTF-8"))
}

/// Pops the seven-field deploy payload, code first.
fn pop_contract_payload(engine: &mut ExecutionEngine) -> VmResult<ContractState> {
    let code = engine.pop_bytes()?;
    if code.is_empty() {
        return Err(VmError::fault("contract code must not be empty"));
    }
    let needs_storage = engine.pop_bool()?;
    let name = pop_metadata_string(engine)?;
    let version = pop_metadata_string(engine)?;
    let author = pop_metadata_string(engine)?;
    let email = pop_metadata_string(engine)?;
    let description = pop_metadata_string(engine)?;
    Ok(ContractState {
        code,
        needs_storage,
        name,
        version,
        author,
        email,
        description,
    })
}

fn create(host: &mut InteropHost, engine: &mut ExecutionEngine) -> VmResult<()> {
    let contract = pop_contract_payload(engine)?;
    let address = contract.address();
    let state = match chain::get_contract(&host.cache, &address)? {
        Some(existing) => existing,
        None => {
            chain::put_contract(&mut host.cache, &contract);
            debug!(target: "smart_contract", "deployed contract {address}");
            contract
        }
    };
    engine.push(StackItem::from_interop(ContractObject(state)))
}

fn migrate(host: &mut InteropHost, engine: &mut ExecutionEngine) -> VmResult<()> {
    let contract = pop_contract_payload(engine)?;
    let new_address = contract.address();
    let old_address = host.current_address()?;
    if chain::get_contract(&host.cache, &new_address)?.is_none() {
        chain::put_contract(&mut host.cache, &contract);
        if contract.needs_storage {
            chain::migrate_storage(&mut host.cache, &old_address, &new_address)?;
        }
    }
    chain::destroy_contract(&mut host.cache, &old_address)?;
    debug!(
        target: "smart_contract",
        "migrated contract {old_address} to {new_address}"
    );
    engine.push(StackItem::from_interop(ContractObject(contract)))
}

fn destroy(host: &mut InteropHost, _engine: &mut ExecutionEngine) -> VmResult<()> {
    let address = host.current_address()?;
    chain::destroy_contract(&mut host.cache, &address)?;
    debug!(target: "smart_contract", "destroyed contract {address}");
    Ok(())
}

fn get_storage_context(host: &mut InteropHost, engine: &mut ExecutionEngine) -> VmResult<()> {
    let contract = pop_object::<ContractObject>(engine)?.0;
    let address = contract.address();
    if address != host.current_address()? {
        return Err(VmError::permission_denied(
            "only the executing contract may take its storage context",
        ));
    }
    engine.push(storage_context_item(StorageContext::new(address)))
}

fn get_script(_host: &mut InteropHost, engine: &mut ExecutionEngine) -> VmResult<()> {
    let contract = pop_object::<ContractObject>(engine)?.0;
    engine.push(StackItem::from_bytes(contract.code))
}

/// The Contract service rows.
pub fn services() -> Vec<Service> {
    vec![
        Service {
            name: "Contract.Create",
            validator: |engine| require_stack(engine, 7),
            effect: create,
            price: deploy_price,
        },
        Service {
            name: "Contract.Migrate",
            validator: |engine| require_stack(engine, 7),
            effect: migrate,
            price: deploy_price,
        },
        Service {
            name: "Contract.Destroy",
            validator: no_operands,
            effect: destroy,
            price: |_| DESTROY_GAS,
        },
        Service {
            name: "Contract.GetStorageContext",
            validator: |engine| require_stack(engine, 1),
            effect: get_storage_context,
            price: flat_price,
        },
        Service {
            name: "Contract.GetScript",
            validator: |engine| require_stack(engine, 1),
            effect: get_script,
            price: flat_price,
        },
    ]
}
