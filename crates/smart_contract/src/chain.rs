//! Typed access to ledger records through the state overlay.
//!
//! Reads go through the overlay so that records written earlier in the same
//! transaction (a contract deployed and then called, for instance) are
//! visible immediately.

use crate::contract_state::ContractState;
use crate::storage::StorageKey;
use onyx_core::{BinaryReader, BinaryWriter, Block, Header, Transaction, UInt256};
use onyx_persistence::{CacheDb, DataEntryPrefix};
use onyx_vm::{VmError, VmResult};

pub(crate) fn store_error(error: onyx_persistence::StoreError) -> VmError {
    VmError::fault(format!("store failure: {error}"))
}

/// Looks up a contract record.
pub fn get_contract(cache: &CacheDb, address: &onyx_core::Address) -> VmResult<Option<ContractState>> {
    let key = DataEntryPrefix::StContract.key(address.as_bytes());
    match cache.get(&key).map_err(store_error)? {
        Some(bytes) => {
            let mut reader = BinaryReader::new(&bytes);
            Ok(Some(ContractState::decode(&mut reader)?))
        }
        None => Ok(None),
    }
}

/// Writes a contract record.
pub fn put_contract(cache: &mut CacheDb, contract: &ContractState) {
    let key = DataEntryPrefix::StContract.key(contract.address().as_bytes());
    cache.put(key, contract.to_bytes());
}

/// Deletes a contract record and every storage entry it owns.
pub fn destroy_contract(cache: &mut CacheDb, address: &onyx_core::Address) -> VmResult<()> {
    let key = DataEntryPrefix::StContract.key(address.as_bytes());
    cache.delete(key);
    let prefix = StorageKey::contract_prefix(address);
    for (storage_key, _) in cache.find_prefix(&prefix).map_err(store_error)? {
        cache.delete(storage_key);
    }
    Ok(())
}

/// Copies every storage entry from one contract address to another.
pub fn migrate_storage(
    cache: &mut CacheDb,
    from: &onyx_core::Address,
    to: &onyx_core::Address,
) -> VmResult<()> {
    let prefix = StorageKey::contract_prefix(from);
    for (storage_key, value) in cache.find_prefix(&prefix).map_err(store_error)? {
        let user_key = storage_key[prefix.len()..].to_vec();
        cache.put(StorageKey::new(*to, user_key).to_store_key(), value);
    }
    Ok(())
}

/// Writes a header record plus the height index entry.
pub fn put_header(cache: &mut CacheDb, header: &Header) {
    let hash = header.hash();
    cache.put(
        DataEntryPrefix::DataHeader.key(hash.as_bytes()),
        header.to_bytes(),
    );
    cache.put(
        DataEntryPrefix::IxBlockHash.key(&header.height.to_le_bytes()),
        hash.to_vec(),
    );
}

/// Writes a block record, its header record, and its transactions.
pub fn put_block(cache: &mut CacheDb, block: &Block) {
    put_header(cache, &block.header);
    cache.put(
        DataEntryPrefix::DataBlock.key(block.hash().as_bytes()),
        block.to_bytes(),
    );
    for transaction in &block.transactions {
        put_transaction(cache, transaction, block.header.height);
    }
}

/// Writes a transaction record with the height it was included at.
pub fn put_transaction(cache: &mut CacheDb, transaction: &Transaction, height: u32) {
    let mut writer = BinaryWriter::new();
    writer.write_u32(height);
    transaction.encode(&mut writer);
    cache.put(
        DataEntryPrefix::DataTransaction.key(transaction.hash().as_bytes()),
        writer.into_bytes(),
    );
}

/// Resolves a block hash from a height.
pub fn get_block_hash(cache: &CacheDb, height: u32) -> VmResult<Option<UInt256>> {
    let key = DataEntryPrefix::IxBlockHash.key(&height.to_le_bytes());
    match cache.get(&key).map_err(store_error)? {
        Some(bytes) => Ok(Some(UInt256::from_bytes(&bytes)?)),
        None => Ok(None),
    }
}

/// Looks up a header by block hash.
pub fn get_header(cache: &CacheDb, hash: &UInt256) -> VmResult<Option<Header>> {
    let key = DataEntryPrefix::DataHeader.key(hash.as_bytes());
    match cache.get(&key).map_err(store_error)? {
        Some(bytes) => {
            let mut reader = BinaryReader::new(&bytes);
            Ok(Some(Header::decode(&mut reader)?))
        }
        None => Ok(None),
    }
}

/// Looks up a block by block hash.
pub fn get_block(cache: &CacheDb, hash: &UInt256) -> VmResult<Option<Block>> {
    let key = DataEntryPrefix::DataBlock.key(hash.as_bytes());
    match cache.get(&key).map_err(store_error)? {
        Some(bytes) => {
            let mut reader = BinaryReader::new(&bytes);
            Ok(Some(Block::decode(&mut reader)?))
        }
        None => Ok(None),
    }
}

/// Looks up a transaction and the height it was included at.
pub fn get_transaction(cache: &CacheDb, hash: &UInt256) -> VmResult<Option<(Transaction, u32)>> {
    let key = DataEntryPrefix::DataTransaction.key(hash.as_bytes());
    match cache.get(&key).map_err(store_error)? {
        Some(bytes) => {
            let mut reader = BinaryReader::new(&bytes);
            let height = reader.read_u32()?;
            let transaction = Transaction::decode(&mut reader)?;
            Ok(Some((transaction, height)))
        }
        None => Ok(None),
    }
}
