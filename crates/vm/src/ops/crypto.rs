//! Hash and signature opcode handlers.
//!
//! Signatures are ECDSA over P-256 with SHA-256, public keys in SEC1 form
//! (compressed or uncompressed), signatures as raw `r || s`.

use crate::error::{VmError, VmResult};
use crate::execution_engine::ExecutionEngine;
use crate::instruction::Instruction;
use crate::stack_item::StackItem;
use p256::ecdsa::signature::Verifier;
use p256::ecdsa::{Signature, VerifyingKey};
use sha1::Digest;

/// SHA1: single SHA-1 digest.
pub fn sha1(engine: &mut ExecutionEngine, _i: &Instruction) -> VmResult<()> {
    let data = engine.pop_bytes()?;
    let mut hasher = sha1::Sha1::new();
    hasher.update(&data);
    engine.push(StackItem::from_bytes(hasher.finalize().to_vec()))
}

/// SHA256: single SHA-256 digest.
pub fn sha256(engine: &mut ExecutionEngine, _i: &Instruction) -> VmResult<()> {
    let data = engine.pop_bytes()?;
    engine.push(StackItem::from_bytes(
        onyx_core::crypto::sha256(&data).to_vec(),
    ))
}

/// HASH160: RIPEMD-160 over SHA-256.
pub fn hash160(engine: &mut ExecutionEngine, _i: &Instruction) -> VmResult<()> {
    let data = engine.pop_bytes()?;
    engine.push(StackItem::from_bytes(
        onyx_core::crypto::hash160(&data).to_vec(),
    ))
}

/// HASH256: double SHA-256.
pub fn hash256(engine: &mut ExecutionEngine, _i: &Instruction) -> VmResult<()> {
    let data = engine.pop_bytes()?;
    engine.push(StackItem::from_bytes(
        onyx_core::crypto::hash256(&data).to_vec(),
    ))
}

/// VERIFY: explicit-message signature check. Pops public key, signature and
/// message; pushes the verdict. A malformed public key faults, a bad
/// signature merely pushes false.
pub fn verify(engine: &mut ExecutionEngine, _i: &Instruction) -> VmResult<()> {
    let pubkey = engine.pop_bytes()?;
    let signature = engine.pop_bytes()?;
    let message = engine.pop_bytes()?;
    let verdict = verify_with_pubkey(&message, &signature, &pubkey)?;
    engine.push(StackItem::from_bool(verdict))
}

/// Verifies a signature, faulting on a malformed public key.
pub fn verify_with_pubkey(message: &[u8], signature: &[u8], pubkey: &[u8]) -> VmResult<bool> {
    let key = VerifyingKey::from_sec1_bytes(pubkey)
        .map_err(|_| VmError::fault("malformed public key"))?;
    let signature = match Signature::from_slice(signature) {
        Ok(parsed) => parsed,
        Err(_) => return Ok(false),
    };
    Ok(key.verify(message, &signature).is_ok())
}

/// Verifies a signature, treating every malformed input as a mismatch.
/// Used by the container-bound signature opcodes.
pub fn check_signature(message: &[u8], signature: &[u8], pubkey: &[u8]) -> bool {
    let Ok(key) = VerifyingKey::from_sec1_bytes(pubkey) else {
        return false;
    };
    let Ok(signature) = Signature::from_slice(signature) else {
        return false;
    };
    key.verify(message, &signature).is_ok()
}
