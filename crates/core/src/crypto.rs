//! Hash helpers used by addresses, block identities and the hash opcodes.

use ripemd::Ripemd160;
use sha2::{Digest, Sha256};

/// Computes SHA-256 of the input.
pub fn sha256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hasher.finalize().into()
}

/// Computes double SHA-256, the block and transaction hash function.
pub fn hash256(data: &[u8]) -> [u8; 32] {
    sha256(&sha256(data))
}

/// Computes RIPEMD-160 over SHA-256, the script-to-address hash function.
pub fn hash160(data: &[u8]) -> [u8; 20] {
    let inner = sha256(data);
    let mut hasher = Ripemd160::new();
    hasher.update(inner);
    hasher.finalize().into()
}

/// First four bytes of double SHA-256, used by Base58Check.
pub fn checksum(data: &[u8]) -> [u8; 4] {
    let digest = hash256(data);
    [digest[0], digest[1], digest[2], digest[3]]
}
