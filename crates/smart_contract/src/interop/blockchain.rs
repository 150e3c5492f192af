//! Ledger lookup services.

use crate::chain;
use crate::host::InteropHost;
use crate::interop_objects::{BlockObject, ContractObject, HeaderObject, TransactionObject};
use crate::service::{no_operands, require_stack, Service};
use num_traits::ToPrimitive;
use onyx_core::{Address, UInt256, UINT256_SIZE};
use onyx_vm::{bytes_to_int, ExecutionEngine, StackItem, VmError, VmResult};

/// Gas price of every ledger lookup.
const LOOKUP_GAS: u64 = 100;

fn lookup_price(_engine: &ExecutionEngine) -> u64 {
    LOOKUP_GAS
}

fn one_operand(engine: &ExecutionEngine) -> VmResult<()> {
    require_stack(engine, 1)
}

/// Resolves a popped operand into a block hash: 32 bytes are a hash,
/// anything else is interpreted as a height.
fn pop_block_hash(host: &InteropHost, engine: &mut ExecutionEngine) -> VmResult<UInt256> {
    let operand = engine.pop_bytes()?;
    if operand.len() == UINT256_SIZE {
        return Ok(UInt256::from_bytes(&operand)?);
    }
    let height = bytes_to_int(&operand)
        .to_u32()
        .ok_or_else(|| VmError::fault("invalid block height"))?;
    chain::get_block_hash(&host.cache, height)?
        .ok_or_else(|| VmError::fault(format!("no block at height {height}")))
}

fn pop_hash(engine: &mut ExecutionEngine) -> VmResult<UInt256> {
    let bytes = engine.pop_bytes()?;
    UInt256::from_bytes(&bytes).map_err(|e| VmError::fault(e.to_string()))
}

fn get_height(host: &mut InteropHost, engine: &mut ExecutionEngine) -> VmResult<()> {
    engine.push(StackItem::from_int(host.header.height))
}

fn get_header(host: &mut InteropHost, engine: &mut ExecutionEngine) -> VmResult<()> {
    let hash = pop_block_hash(host, engine)?;
    let header = chain::get_header(&host.cache, &hash)?
        .ok_or_else(|| VmError::fault(format!("header {hash} not found")))?;
    engine.push(StackItem::from_interop(HeaderObject(header)))
}

fn get_block(host: &mut InteropHost, engine: &mut ExecutionEngine) -> VmResult<()> {
    let hash = pop_block_hash(host, engine)?;
    let block = chain::get_block(&host.cache, &hash)?
        .ok_or_else(|| VmError::fault(format!("block {hash} not found")))?;
    engine.push(StackItem::from_interop(BlockObject(block)))
}

fn get_transaction(host: &mut InteropHost, engine: &mut ExecutionEngine) -> VmResult<()> {
    let hash = pop_hash(engine)?;
    let (transaction, _) = chain::get_transaction(&host.cache, &hash)?
        .ok_or_else(|| VmError::fault(format!("transaction {hash} not found")))?;
    engine.push(StackItem::from_interop(TransactionObject(transaction)))
}

fn get_transaction_height(host: &mut InteropHost, engine: &mut ExecutionEngine) -> VmResult<()> {
    let hash = pop_hash(engine)?;
    let (_, height) = chain::get_transaction(&host.cache, &hash)?
        .ok_or_else(|| VmError::fault(format!("transaction {hash} not found")))?;
    engine.push(StackItem::from_int(height))
}

fn get_contract(host: &mut InteropHost, engine: &mut ExecutionEngine) -> VmResult<()> {
    let bytes = engine.pop_bytes()?;
    let address = Address::from_bytes(&bytes).map_err(|e| VmError::fault(e.to_string()))?;
    let contract = chain::get_contract(&host.cache, &address)?
        .ok_or_else(|| VmError::contract_not_found(address.to_string()))?;
    engine.push(StackItem::from_interop(ContractObject(contract)))
}

/// The Blockchain service rows.
pub fn services() -> Vec<Service> {
    vec![
        Service {
            name: "Blockchain.GetHeight",
            validator: no_operands,
            effect: get_height,
            price: lookup_price,
        },
        Service {
            name: "Blockchain.GetHeader",
            validator: one_operand,
            effect: get_header,
            price: lookup_price,
        },
        Service {
            name: "Blockchain.GetBlock",
            validator: one_operand,
            effect: get_block,
            price: lookup_price,
        },
        Service {
            name: "Blockchain.GetTransaction",
            validator: one_operand,
            effect: get_transaction,
            price: lookup_price,
        },
        Service {
            name: "Blockchain.GetTransactionHeight",
            validator: one_operand,
            effect: get_transaction_height,
            price: lookup_price,
        },
        Service {
            name: "Blockchain.GetContract",
            validator: one_operand,
            effect: get_contract,
            price: lookup_price,
        },
    ]
}
