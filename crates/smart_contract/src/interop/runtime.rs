//! Runtime and script-introspection services.

use crate::host::InteropHost;
use crate::interop_objects::CodeContainerObject;
use crate::notify::NotifyEvent;
use crate::serializer;
use crate::service::{flat_price, no_operands, require_stack, Service};
use log::info;
use onyx_core::Address;
use onyx_vm::limits::MAX_BYTEARRAY_SIZE;
use onyx_vm::{ExecutionEngine, StackItem, VmError, VmResult};

/// Gas price of a witness check.
const CHECK_WITNESS_GAS: u64 = 200;

fn one_operand(engine: &ExecutionEngine) -> VmResult<()> {
    require_stack(engine, 1)
}

fn pop_address(engine: &mut ExecutionEngine) -> VmResult<Address> {
    let bytes = engine.pop_bytes()?;
    Address::from_bytes(&bytes).map_err(|e| VmError::fault(e.to_string()))
}

fn get_time(host: &mut InteropHost, engine: &mut ExecutionEngine) -> VmResult<()> {
    engine.push(StackItem::from_int(host.header.timestamp))
}

fn check_witness(host: &mut InteropHost, engine: &mut ExecutionEngine) -> VmResult<()> {
    let address = pop_address(engine)?;
    engine.push(StackItem::from_bool(host.check_witness(&address)))
}

fn notify(host: &mut InteropHost, engine: &mut ExecutionEngine) -> VmResult<()> {
    let states = engine.pop()?;
    let contract = host.current_address()?;
    host.notifications.push(NotifyEvent { contract, states });
    Ok(())
}

fn log(host: &mut InteropHost, engine: &mut ExecutionEngine) -> VmResult<()> {
    let message = engine.pop_bytes()?;
    let contract = host.current_address()?;
    info!(
        target: "smart_contract",
        "[{}] {}",
        contract,
        String::from_utf8_lossy(&message)
    );
    Ok(())
}

fn get_trigger(host: &mut InteropHost, engine: &mut ExecutionEngine) -> VmResult<()> {
    engine.push(StackItem::from_int(host.trigger as u8))
}

fn serialize(_host: &mut InteropHost, engine: &mut ExecutionEngine) -> VmResult<()> {
    let item = engine.pop()?;
    let bytes = serializer::serialize(&item)?;
    engine.push(StackItem::from_bytes(bytes))
}

fn deserialize(_host: &mut InteropHost, engine: &mut ExecutionEngine) -> VmResult<()> {
    let bytes = engine.pop_bytes()?;
    if bytes.len() > MAX_BYTEARRAY_SIZE {
        return Err(VmError::serialization("input exceeds the byte-array limit"));
    }
    let item = serializer::deserialize(&bytes)?;
    engine.push(item)
}

fn base58_to_address(_host: &mut InteropHost, engine: &mut ExecutionEngine) -> VmResult<()> {
    let text = engine.pop_bytes()?;
    let text = String::from_utf8(text)
        .map_err(|_| VmError::fault("base58 input is not valid UTF-8"))?;
    let address = Address::from_base58(&text).map_err(|e| VmError::fault(e.to_string()))?;
    engine.push(StackItem::from_bytes(address.to_vec()))
}

fn address_to_base58(_host: &mut InteropHost, engine: &mut ExecutionEngine) -> VmResult<()> {
    let address = pop_address(engine)?;
    engine.push(StackItem::from_bytes(address.to_base58().into_bytes()))
}

fn get_current_block_hash(host: &mut InteropHost, engine: &mut ExecutionEngine) -> VmResult<()> {
    engine.push(StackItem::from_bytes(host.header.hash().to_vec()))
}

fn get_code_container(host: &mut InteropHost, engine: &mut ExecutionEngine) -> VmResult<()> {
    engine.push(StackItem::from_interop(CodeContainerObject(
        host.tx.clone(),
    )))
}

fn get_executing_address(host: &mut InteropHost, engine: &mut ExecutionEngine) -> VmResult<()> {
    let address = host.current_address()?;
    engine.push(StackItem::from_bytes(address.to_vec()))
}

fn get_calling_address(host: &mut InteropHost, engine: &mut ExecutionEngine) -> VmResult<()> {
    let bytes = host
        .calling_address()
        .map(|address| address.to_vec())
        .unwrap_or_default();
    engine.push(StackItem::from_bytes(bytes))
}

fn get_entry_address(host: &mut InteropHost, engine: &mut ExecutionEngine) -> VmResult<()> {
    let address = host.entry_address()?;
    engine.push(StackItem::from_bytes(address.to_vec()))
}

/// The Runtime and Script service rows.
pub fn services() -> Vec<Service> {
    vec![
        Service {
            name: "Runtime.GetTime",
            validator: no_operands,
            effect: get_time,
            price: flat_price,
        },
        Service {
            name: "Runtime.CheckWitness",
            validator: one_operand,
            effect: check_witness,
            price: |_| CHECK_WITNESS_GAS,
        },
        Service {
            name: "Runtime.Notify",
            validator: one_operand,
            effect: notify,
            price: flat_price,
        },
        Service {
            name: "Runtime.Log",
            validator: one_operand,
            effect: log,
            price: flat_price,
        },
        Service {
            name: "Runtime.GetTrigger",
            validator: no_operands,
            effect: get_trigger,
            price: flat_price,
        },
        Service {
            name: "Runtime.Serialize",
            validator: one_operand,
            effect: serialize,
            price: flat_price,
        },
        Service {
            name: "Runtime.Deserialize",
            validator: one_operand,
            effect: deserialize,
            price: flat_price,
        },
        Service {
            name: "Runtime.Base58ToAddress",
            validator: one_operand,
            effect: base58_to_address,
            price: flat_price,
        },
        Service {
            name: "Runtime.AddressToBase58",
            validator: one_operand,
            effect: address_to_base58,
            price: flat_price,
        },
        Service {
            name: "Runtime.GetCurrentBlockHash",
            validator: no_operands,
            effect: get_current_block_hash,
            price: flat_price,
        },
        Service {
            name: "Script.GetCodeContainer",
            validator: no_operands,
            effect: get_code_container,
            price: flat_price,
        },
        Service {
            name: "Script.GetExecutingAddress",
            validator: no_operands,
            effect: get_executing_address,
            price: flat_price,
        },
        Service {
            name: "Script.GetCallingAddress",
            validator: no_operands,
            effect: get_calling_address,
            price: flat_price,
        },
        Service {
            name: "Script.GetEntryAddress",
            validator: no_operands,
            effect: get_entry_address,
            price: flat_price,
        },
    ]
}
