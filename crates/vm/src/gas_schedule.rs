//! Deterministic gas costs for opcodes, and the per-invocation meter.
//!
//! The numbers here are consensus constants: every conforming node must
//! charge exactly these amounts. Service (SYSCALL) prices live with the
//! service table in the contract layer.

use crate::error::{VmError, VmResult};
use crate::op_code::OpCode;

/// Flat cost of every push-class opcode.
pub const PUSH_GAS: u64 = 1;

/// Default cost of a plain opcode.
pub const OPCODE_GAS: u64 = 1;

/// Cost of entering another contract.
pub const APPCALL_GAS: u64 = 10;

/// Cost of a hash opcode.
pub const HASH_GAS: u64 = 10;

/// Cost of a single signature check.
pub const CHECKSIG_GAS: u64 = 100;

/// Cost of a multi-signature check.
pub const CHECKMULTISIG_GAS: u64 = 200;

/// Returns the gas cost of one opcode.
///
/// Push-class opcodes are priced separately by the driver with [`PUSH_GAS`];
/// this function still answers for them so the table is total.
pub fn opcode_price(opcode: OpCode) -> u64 {
    if opcode.is_push() {
        return PUSH_GAS;
    }
    match opcode {
        OpCode::APPCALL | OpCode::TAILCALL => APPCALL_GAS,
        OpCode::SHA1 | OpCode::SHA256 | OpCode::HASH160 | OpCode::HASH256 => HASH_GAS,
        OpCode::CHECKSIG | OpCode::VERIFY => CHECKSIG_GAS,
        OpCode::CHECKMULTISIG => CHECKMULTISIG_GAS,
        _ => OPCODE_GAS,
    }
}

/// Tracks gas across one invocation. Consumption only ever grows; a charge
/// that cannot be covered is rejected without being applied.
#[derive(Debug, Clone)]
pub struct GasMeter {
    limit: u64,
    remaining: u64,
}

impl GasMeter {
    /// Creates a meter holding `limit` gas.
    pub fn new(limit: u64) -> Self {
        Self {
            limit,
            remaining: limit,
        }
    }

    /// Returns the initial limit.
    pub fn limit(&self) -> u64 {
        self.limit
    }

    /// Returns the gas not yet consumed.
    pub fn remaining(&self) -> u64 {
        self.remaining
    }

    /// Returns the gas consumed so far.
    pub fn consumed(&self) -> u64 {
        self.limit - self.remaining
    }

    /// Charges `amount` gas.
    pub fn charge(&mut self, amount: u64) -> VmResult<()> {
        if amount > self.remaining {
            return Err(VmError::insufficient_gas(amount, self.remaining));
        }
        self.remaining -= amount;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prices() {
        assert_eq!(opcode_price(OpCode::PUSH1), PUSH_GAS);
        assert_eq!(opcode_price(OpCode::ADD), OPCODE_GAS);
        assert_eq!(opcode_price(OpCode::SHA256), HASH_GAS);
        assert_eq!(opcode_price(OpCode::APPCALL), APPCALL_GAS);
        assert_eq!(opcode_price(OpCode::CHECKMULTISIG), CHECKMULTISIG_GAS);
    }

    #[test]
    fn test_meter_monotonic() {
        let mut meter = GasMeter::new(10);
        meter.charge(4).unwrap();
        assert_eq!(meter.consumed(), 4);
        assert_eq!(meter.remaining(), 6);

        let error = meter.charge(7).unwrap_err();
        assert!(matches!(error, VmError::InsufficientGas { .. }));
        // A rejected charge is not applied.
        assert_eq!(meter.consumed(), 4);
        meter.charge(6).unwrap();
        assert_eq!(meter.consumed(), 10);
    }
}
