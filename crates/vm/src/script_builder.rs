//! Programmatic script construction.
//!
//! Used by tests and by the deployment tooling upstream; emits the most
//! compact push form for every literal.

use crate::op_code::OpCode;
use crate::stack_item::int_to_bytes;
use num_bigint::BigInt;
use onyx_core::Address;

/// Builds a bytecode script incrementally.
#[derive(Default)]
pub struct ScriptBuilder {
    script: Vec<u8>,
}

impl ScriptBuilder {
    /// Creates an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the current script length.
    pub fn len(&self) -> usize {
        self.script.len()
    }

    /// Returns true if nothing has been emitted.
    pub fn is_empty(&self) -> bool {
        self.script.is_empty()
    }

    /// Emits a raw byte.
    pub fn emit(&mut self, byte: u8) -> &mut Self {
        self.script.push(byte);
        self
    }

    /// Emits an opcode.
    pub fn emit_opcode(&mut self, opcode: OpCode) -> &mut Self {
        self.script.push(opcode as u8);
        self
    }

    /// Emits raw bytes without any length prefix.
    pub fn emit_bytes(&mut self, bytes: &[u8]) -> &mut Self {
        self.script.extend_from_slice(bytes);
        self
    }

    /// Emits the most compact push of a byte literal.
    pub fn emit_push(&mut self, data: &[u8]) -> &mut Self {
        let length = data.len();
        if length == 0 {
            return self.emit_opcode(OpCode::PUSH0);
        }
        if length <= 75 {
            self.emit(length as u8);
        } else if length <= 0xFF {
            self.emit_opcode(OpCode::PUSHDATA1);
            self.emit(length as u8);
        } else if length <= 0xFFFF {
            self.emit_opcode(OpCode::PUSHDATA2);
            self.emit_bytes(&(length as u16).to_le_bytes());
        } else {
            self.emit_opcode(OpCode::PUSHDATA4);
            self.emit_bytes(&(length as u32).to_le_bytes());
        }
        self.emit_bytes(data)
    }

    /// Emits the most compact push of an integer.
    pub fn emit_push_int<T: Into<BigInt>>(&mut self, value: T) -> &mut Self {
        let value: BigInt = value.into();
        if value == BigInt::from(-1) {
            return self.emit_opcode(OpCode::PUSHM1);
        }
        if value == BigInt::from(0) {
            return self.emit_opcode(OpCode::PUSH0);
        }
        if value >= BigInt::from(1) && value <= BigInt::from(16) {
            let offset: u8 = (&value).try_into().unwrap_or(1);
            self.emit(0x50 + offset);
            return self;
        }
        let bytes = int_to_bytes(&value);
        self.emit_push(&bytes)
    }

    /// Emits a boolean push.
    pub fn emit_push_bool(&mut self, value: bool) -> &mut Self {
        if value {
            self.emit_opcode(OpCode::PUSH1)
        } else {
            self.emit_opcode(OpCode::PUSH0)
        }
    }

    /// Emits a jump-family opcode with its relative offset.
    pub fn emit_jump(&mut self, opcode: OpCode, offset: i16) -> &mut Self {
        self.emit_opcode(opcode);
        self.emit_bytes(&offset.to_le_bytes())
    }

    /// Emits a SYSCALL of the named service.
    pub fn emit_syscall(&mut self, name: &str) -> &mut Self {
        self.emit_opcode(OpCode::SYSCALL);
        self.emit(name.len() as u8);
        self.emit_bytes(name.as_bytes())
    }

    /// Emits a static APPCALL of the given contract address.
    pub fn emit_appcall(&mut self, target: &Address) -> &mut Self {
        self.emit_opcode(OpCode::APPCALL);
        self.emit_bytes(target.as_bytes())
    }

    /// Emits a dynamic APPCALL: the target address is taken from the stack.
    pub fn emit_appcall_dynamic(&mut self) -> &mut Self {
        self.emit_opcode(OpCode::APPCALL);
        self.emit_bytes(&[0u8; 20])
    }

    /// Emits a TAILCALL of the given contract address.
    pub fn emit_tailcall(&mut self, target: &Address) -> &mut Self {
        self.emit_opcode(OpCode::TAILCALL);
        self.emit_bytes(target.as_bytes())
    }

    /// Consumes the builder and returns the script.
    pub fn into_bytes(self) -> Vec<u8> {
        self.script
    }

    /// Borrows the script built so far.
    pub fn as_bytes(&self) -> &[u8] {
        &self.script
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compact_int_pushes() {
        let mut builder = ScriptBuilder::new();
        builder.emit_push_int(-1);
        builder.emit_push_int(0);
        builder.emit_push_int(16);
        builder.emit_push_int(17);
        let script = builder.into_bytes();
        assert_eq!(script[0], OpCode::PUSHM1 as u8);
        assert_eq!(script[1], OpCode::PUSH0 as u8);
        assert_eq!(script[2], OpCode::PUSH16 as u8);
        // 17 falls back to a one-byte literal push.
        assert_eq!(script[3], 0x01);
        assert_eq!(script[4], 17);
    }

    #[test]
    fn test_pushdata_ladder() {
        let mut builder = ScriptBuilder::new();
        builder.emit_push(&[0xAA; 76]);
        let script = builder.into_bytes();
        assert_eq!(script[0], OpCode::PUSHDATA1 as u8);
        assert_eq!(script[1], 76);
        assert_eq!(script.len(), 2 + 76);

        let mut builder = ScriptBuilder::new();
        builder.emit_push(&[0xAA; 300]);
        let script = builder.into_bytes();
        assert_eq!(script[0], OpCode::PUSHDATA2 as u8);
        assert_eq!(u16::from_le_bytes([script[1], script[2]]), 300);
    }

    #[test]
    fn test_syscall_encoding() {
        let mut builder = ScriptBuilder::new();
        builder.emit_syscall("Runtime.Notify");
        let script = builder.into_bytes();
        assert_eq!(script[0], OpCode::SYSCALL as u8);
        assert_eq!(script[1] as usize, "Runtime.Notify".len());
        assert_eq!(&script[2..], b"Runtime.Notify");
    }

    #[test]
    fn test_appcall_operand() {
        let target = Address::from_code(b"callee");
        let mut builder = ScriptBuilder::new();
        builder.emit_appcall(&target);
        let script = builder.into_bytes();
        assert_eq!(script[0], OpCode::APPCALL as u8);
        assert_eq!(&script[1..], target.as_bytes());
    }
}
