//! Core primitives shared by the Onyx smart-contract execution core.
//!
//! This crate holds the consensus-visible building blocks that every other
//! crate depends on: fixed-width hashes and addresses, the canonical
//! little-endian reader/writer, and the transaction and block records the
//! execution core receives from its collaborators.

pub mod address;
pub mod block;
pub mod constants;
pub mod crypto;
pub mod error;
pub mod io;
pub mod transaction;
pub mod uint256;

pub use address::{Address, ADDRESS_SIZE};
pub use block::{Block, Header};
pub use error::{CoreError, CoreResult};
pub use io::{BinaryReader, BinaryWriter};
pub use transaction::{CodeContainer, Transaction, TransactionAttribute, TransactionType};
pub use uint256::{UInt256, UINT256_SIZE};
