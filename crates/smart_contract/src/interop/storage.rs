//! Contract storage services.

use crate::host::InteropHost;
use crate::interop_objects::{pop_object, storage_context_item, StorageContextObject};
use crate::service::{flat_price, no_operands, require_stack, Service};
use crate::storage::{StorageContext, StorageItem, StorageKey};
use onyx_vm::limits::MAX_STORAGE_KEY_SIZE;
use onyx_vm::{ExecutionEngine, StackItem, VmError, VmResult};

/// Gas price of a read or a delete.
const STORAGE_ACCESS_GAS: u64 = 100;

/// Gas price per started kibibyte of a write.
const STORAGE_PUT_UNIT_GAS: u64 = 1000;

fn access_price(_engine: &ExecutionEngine) -> u64 {
    STORAGE_ACCESS_GAS
}

/// The write price scales with key plus value size, per started KiB.
fn put_price(engine: &ExecutionEngine) -> u64 {
    let value_len = engine
        .peek(0)
        .ok()
        .and_then(|item| item.as_bytes().ok())
        .map(|bytes| bytes.len())
        .unwrap_or(0);
    let key_len = engine
        .peek(1)
        .ok()
        .and_then(|item| item.as_bytes().ok())
        .map(|bytes| bytes.len())
        .unwrap_or(0);
    let kib = (key_len + value_len).div_ceil(1024).max(1) as u64;
    kib * STORAGE_PUT_UNIT_GAS
}

/// Pops a context handle and checks it grants access to `host`'s current
/// contract, with write access when `writable`.
fn pop_checked_context(
    host: &InteropHost,
    engine: &mut ExecutionEngine,
    writable: bool,
) -> VmResult<StorageContext> {
    let context = pop_object::<StorageContextObject>(engine)?.0;
    if writable && context.read_only {
        return Err(VmError::permission_denied(
            "storage context is read-only",
        ));
    }
    let current = host.current_address()?;
    if context.contract != current {
        return Err(VmError::permission_denied(format!(
            "storage context of {} used by {}",
            context.contract, current
        )));
    }
    Ok(context)
}

fn get_context(host: &mut InteropHost, engine: &mut ExecutionEngine) -> VmResult<()> {
    let current = host.current_address()?;
    engine.push(storage_context_item(StorageContext::new(current)))
}

fn get_read_only_context(host: &mut InteropHost, engine: &mut ExecutionEngine) -> VmResult<()> {
    let current = host.current_address()?;
    engine.push(storage_context_item(StorageContext::read_only(current)))
}

fn context_as_read_only(_host: &mut InteropHost, engine: &mut ExecutionEngine) -> VmResult<()> {
    let context = pop_object::<StorageContextObject>(engine)?.0;
    engine.push(storage_context_item(context.as_read_only()))
}

fn get(host: &mut InteropHost, engine: &mut ExecutionEngine) -> VmResult<()> {
    let key = engine.pop_bytes()?;
    let context = pop_object::<StorageContextObject>(engine)?.0;
    let store_key = StorageKey::new(context.contract, key).to_store_key();
    let value = match host
        .cache
        .get(&store_key)
        .map_err(crate::chain::store_error)?
    {
        Some(record) => StorageItem::from_bytes(&record)?.value,
        None => Vec::new(),
    };
    engine.push(StackItem::from_bytes(value))
}

fn put(host: &mut InteropHost, engine: &mut ExecutionEngine) -> VmResult<()> {
    let value = engine.pop_bytes()?;
    let key = engine.pop_bytes()?;
    if key.len() > MAX_STORAGE_KEY_SIZE {
        return Err(VmError::fault(format!(
            "storage key of {} bytes exceeds maximum {MAX_STORAGE_KEY_SIZE}",
            key.len()
        )));
    }
    let context = pop_checked_context(host, engine, true)?;
    let store_key = StorageKey::new(context.contract, key).to_store_key();
    host.cache.put(store_key, StorageItem::new(value).to_bytes());
    Ok(())
}

fn delete(host: &mut InteropHost, engine: &mut ExecutionEngine) -> VmResult<()> {
    let key = engine.pop_bytes()?;
    let context = pop_checked_context(host, engine, true)?;
    let store_key = StorageKey::new(context.contract, key).to_store_key();
    host.cache.delete(store_key);
    Ok(())
}

/// The Storage service rows.
pub fn services() -> Vec<Service> {
    vec![
        Service {
            name: "Storage.GetContext",
            validator: no_operands,
            effect: get_context,
            price: flat_price,
        },
        Service {
            name: "Storage.GetReadOnlyContext",
            validator: no_operands,
            effect: get_read_only_context,
            price: flat_price,
        },
        Service {
            name: "Storage.ContextAsReadOnly",
            validator: |engine| require_stack(engine, 1),
            effect: context_as_read_only,
            price: flat_price,
        },
        Service {
            name: "Storage.Get",
            validator: |engine| require_stack(engine, 2),
            effect: get,
            price: access_price,
        },
        Service {
            name: "Storage.Put",
            validator: |engine| require_stack(engine, 3),
            effect: put,
            price: put_price,
        },
        Service {
            name: "Storage.Delete",
            validator: |engine| require_stack(engine, 2),
            effect: delete,
            price: access_price,
        },
    ]
}
