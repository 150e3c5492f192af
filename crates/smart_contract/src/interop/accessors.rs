//! Pure field getters over interop handles.
//!
//! Each pops one handle (plus an index for `Block.GetTransaction`) and
//! pushes a field; none of them reads or writes state.

use crate::host::InteropHost;
use crate::interop_objects::{
    pop_header, pop_object, pop_transaction_surface, AttributeObject, BlockObject,
    TransactionObject,
};
use crate::service::{flat_price, require_stack, Service};
use onyx_vm::{ExecutionEngine, StackItem, VmError, VmResult};

fn one_operand(engine: &ExecutionEngine) -> VmResult<()> {
    require_stack(engine, 1)
}

fn two_operands(engine: &ExecutionEngine) -> VmResult<()> {
    require_stack(engine, 2)
}

fn header_get_hash(_host: &mut InteropHost, engine: &mut ExecutionEngine) -> VmResult<()> {
    let header = pop_header(engine)?;
    engine.push(StackItem::from_bytes(header.hash().to_vec()))
}

fn header_get_version(_host: &mut InteropHost, engine: &mut ExecutionEngine) -> VmResult<()> {
    let header = pop_header(engine)?;
    engine.push(StackItem::from_int(header.version))
}

fn header_get_prev_hash(_host: &mut InteropHost, engine: &mut ExecutionEngine) -> VmResult<()> {
    let header = pop_header(engine)?;
    engine.push(StackItem::from_bytes(header.prev_hash.to_vec()))
}

fn header_get_merkle_root(_host: &mut InteropHost, engine: &mut ExecutionEngine) -> VmResult<()> {
    let header = pop_header(engine)?;
    engine.push(StackItem::from_bytes(header.tx_root.to_vec()))
}

fn header_get_index(_host: &mut InteropHost, engine: &mut ExecutionEngine) -> VmResult<()> {
    let header = pop_header(engine)?;
    engine.push(StackItem::from_int(header.height))
}

fn header_get_timestamp(_host: &mut InteropHost, engine: &mut ExecutionEngine) -> VmResult<()> {
    let header = pop_header(engine)?;
    engine.push(StackItem::from_int(header.timestamp))
}

fn header_get_consensus_data(
    _host: &mut InteropHost,
    engine: &mut ExecutionEngine,
) -> VmResult<()> {
    let header = pop_header(engine)?;
    engine.push(StackItem::from_int(header.consensus_data))
}

fn header_get_next_consensus(
    _host: &mut InteropHost,
    engine: &mut ExecutionEngine,
) -> VmResult<()> {
    let header = pop_header(engine)?;
    engine.push(StackItem::from_bytes(header.next_bookkeeper.to_vec()))
}

fn block_get_transaction_count(
    _host: &mut InteropHost,
    engine: &mut ExecutionEngine,
) -> VmResult<()> {
    let block = pop_object::<BlockObject>(engine)?;
    engine.push(StackItem::from_int(block.0.transactions.len() as i64))
}

fn block_get_transactions(_host: &mut InteropHost, engine: &mut ExecutionEngine) -> VmResult<()> {
    let block = pop_object::<BlockObject>(engine)?;
    let items = block
        .0
        .transactions
        .iter()
        .map(|transaction| StackItem::from_interop(TransactionObject(transaction.clone())))
        .collect();
    engine.push(StackItem::from_array(items))
}

fn block_get_transaction(_host: &mut InteropHost, engine: &mut ExecutionEngine) -> VmResult<()> {
    let index = engine.pop_index()?;
    let block = pop_object::<BlockObject>(engine)?;
    let transaction = block
        .0
        .transactions
        .get(index)
        .ok_or_else(|| VmError::fault(format!("transaction index {index} out of range")))?
        .clone();
    engine.push(StackItem::from_interop(TransactionObject(transaction)))
}

fn transaction_get_hash(_host: &mut InteropHost, engine: &mut ExecutionEngine) -> VmResult<()> {
    let (hash, _, _) = pop_transaction_surface(engine)?;
    engine.push(StackItem::from_bytes(hash.to_vec()))
}

fn transaction_get_type(_host: &mut InteropHost, engine: &mut ExecutionEngine) -> VmResult<()> {
    let (_, tx_type, _) = pop_transaction_surface(engine)?;
    engine.push(StackItem::from_int(tx_type))
}

fn transaction_get_attributes(
    _host: &mut InteropHost,
    engine: &mut ExecutionEngine,
) -> VmResult<()> {
    let (_, _, attributes) = pop_transaction_surface(engine)?;
    let items = attributes
        .into_iter()
        .map(|attribute| StackItem::from_interop(AttributeObject(attribute)))
        .collect();
    engine.push(StackItem::from_array(items))
}

fn attribute_get_usage(_host: &mut InteropHost, engine: &mut ExecutionEngine) -> VmResult<()> {
    let attribute = pop_object::<AttributeObject>(engine)?;
    engine.push(StackItem::from_int(attribute.0.usage))
}

fn attribute_get_data(_host: &mut InteropHost, engine: &mut ExecutionEngine) -> VmResult<()> {
    let attribute = pop_object::<AttributeObject>(engine)?;
    engine.push(StackItem::from_bytes(attribute.0.data))
}

/// The accessor service rows.
pub fn services() -> Vec<Service> {
    let one = |name: &'static str, effect: crate::service::ServiceEffect| Service {
        name,
        validator: one_operand,
        effect,
        price: flat_price,
    };
    vec![
        one("Header.GetHash", header_get_hash),
        one("Header.GetVersion", header_get_version),
        one("Header.GetPrevHash", header_get_prev_hash),
        one("Header.GetMerkleRoot", header_get_merkle_root),
        one("Header.GetIndex", header_get_index),
        one("Header.GetTimestamp", header_get_timestamp),
        one("Header.GetConsensusData", header_get_consensus_data),
        one("Header.GetNextConsensus", header_get_next_consensus),
        one("Block.GetTransactionCount", block_get_transaction_count),
        one("Block.GetTransactions", block_get_transactions),
        Service {
            name: "Block.GetTransaction",
            validator: two_operands,
            effect: block_get_transaction,
            price: flat_price,
        },
        one("Transaction.GetHash", transaction_get_hash),
        one("Transaction.GetType", transaction_get_type),
        one("Transaction.GetAttributes", transaction_get_attributes),
        one("Attribute.GetUsage", attribute_get_usage),
        one("Attribute.GetData", attribute_get_data),
    ]
}
