//! Opcode definitions for the ScriptVM.
//!
//! The byte values and their semantics are consensus-visible; changing any of
//! them is a protocol change.

use num_enum::TryFromPrimitive;

/// How the operand of an instruction is encoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperandSize {
    /// No operand follows the opcode.
    None,
    /// A fixed number of operand bytes follows the opcode.
    Fixed(usize),
    /// A one-byte length prefix followed by that many bytes.
    PrefixedU8,
    /// A two-byte little-endian length prefix followed by that many bytes.
    PrefixedU16,
    /// A four-byte little-endian length prefix followed by that many bytes.
    PrefixedU32,
}

/// An instruction opcode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, TryFromPrimitive)]
#[repr(u8)]
pub enum OpCode {
    // Constants
    /// Pushes an empty byte string (numeric zero).
    PUSH0 = 0x00,
    // PUSHBYTES1..=75: the opcode byte doubles as the literal length.
    PUSHBYTES1 = 0x01,
    PUSHBYTES2 = 0x02,
    PUSHBYTES3 = 0x03,
    PUSHBYTES4 = 0x04,
    PUSHBYTES5 = 0x05,
    PUSHBYTES6 = 0x06,
    PUSHBYTES7 = 0x07,
    PUSHBYTES8 = 0x08,
    PUSHBYTES9 = 0x09,
    PUSHBYTES10 = 0x0A,
    PUSHBYTES11 = 0x0B,
    PUSHBYTES12 = 0x0C,
    PUSHBYTES13 = 0x0D,
    PUSHBYTES14 = 0x0E,
    PUSHBYTES15 = 0x0F,
    PUSHBYTES16 = 0x10,
    PUSHBYTES17 = 0x11,
    PUSHBYTES18 = 0x12,
    PUSHBYTES19 = 0x13,
    PUSHBYTES20 = 0x14,
    PUSHBYTES21 = 0x15,
    PUSHBYTES22 = 0x16,
    PUSHBYTES23 = 0x17,
    PUSHBYTES24 = 0x18,
    PUSHBYTES25 = 0x19,
    PUSHBYTES26 = 0x1A,
    PUSHBYTES27 = 0x1B,
    PUSHBYTES28 = 0x1C,
    PUSHBYTES29 = 0x1D,
    PUSHBYTES30 = 0x1E,
    PUSHBYTES31 = 0x1F,
    PUSHBYTES32 = 0x20,
    PUSHBYTES33 = 0x21,
    PUSHBYTES34 = 0x22,
    PUSHBYTES35 = 0x23,
    PUSHBYTES36 = 0x24,
    PUSHBYTES37 = 0x25,
    PUSHBYTES38 = 0x26,
    PUSHBYTES39 = 0x27,
    PUSHBYTES40 = 0x28,
    PUSHBYTES41 = 0x29,
    PUSHBYTES42 = 0x2A,
    PUSHBYTES43 = 0x2B,
    PUSHBYTES44 = 0x2C,
    PUSHBYTES45 = 0x2D,
    PUSHBYTES46 = 0x2E,
    PUSHBYTES47 = 0x2F,
    PUSHBYTES48 = 0x30,
    PUSHBYTES49 = 0x31,
    PUSHBYTES50 = 0x32,
    PUSHBYTES51 = 0x33,
    PUSHBYTES52 = 0x34,
    PUSHBYTES53 = 0x35,
    PUSHBYTES54 = 0x36,
    PUSHBYTES55 = 0x37,
    PUSHBYTES56 = 0x38,
    PUSHBYTES57 = 0x39,
    PUSHBYTES58 = 0x3A,
    PUSHBYTES59 = 0x3B,
    PUSHBYTES60 = 0x3C,
    PUSHBYTES61 = 0x3D,
    PUSHBYTES62 = 0x3E,
    PUSHBYTES63 = 0x3F,
    PUSHBYTES64 = 0x40,
    PUSHBYTES65 = 0x41,
    PUSHBYTES66 = 0x42,
    PUSHBYTES67 = 0x43,
    PUSHBYTES68 = 0x44,
    PUSHBYTES69 = 0x45,
    PUSHBYTES70 = 0x46,
    PUSHBYTES71 = 0x47,
    PUSHBYTES72 = 0x48,
    PUSHBYTES73 = 0x49,
    PUSHBYTES74 = 0x4A,
    PUSHBYTES75 = 0x4B,
    /// The next byte is the length of the data.
    PUSHDATA1 = 0x4C,
    /// The next two bytes are the length of the data.
    PUSHDATA2 = 0x4D,
    /// The next four bytes are the length of the data.
    PUSHDATA4 = 0x4E,
    /// Pushes the integer -1.
    PUSHM1 = 0x4F,
    PUSH1 = 0x51,
    PUSH2 = 0x52,
    PUSH3 = 0x53,
    PUSH4 = 0x54,
    PUSH5 = 0x55,
    PUSH6 = 0x56,
    PUSH7 = 0x57,
    PUSH8 = 0x58,
    PUSH9 = 0x59,
    PUSH10 = 0x5A,
    PUSH11 = 0x5B,
    PUSH12 = 0x5C,
    PUSH13 = 0x5D,
    PUSH14 = 0x5E,
    PUSH15 = 0x5F,
    PUSH16 = 0x60,

    // Flow control
    NOP = 0x61,
    JMP = 0x62,
    JMPIF = 0x63,
    JMPIFNOT = 0x64,
    CALL = 0x65,
    RET = 0x66,
    /// Invokes another contract; 20-byte address operand (zero = dynamic).
    APPCALL = 0x67,
    /// Invokes a named host service.
    SYSCALL = 0x68,
    /// Invokes another contract, replacing the current frame.
    TAILCALL = 0x69,

    // Stack
    DUPFROMALTSTACK = 0x6A,
    TOALTSTACK = 0x6B,
    FROMALTSTACK = 0x6C,
    XDROP = 0x6D,
    XSWAP = 0x72,
    XTUCK = 0x73,
    DEPTH = 0x74,
    DROP = 0x75,
    DUP = 0x76,
    NIP = 0x77,
    OVER = 0x78,
    PICK = 0x79,
    ROLL = 0x7A,
    ROT = 0x7B,
    SWAP = 0x7C,
    TUCK = 0x7D,

    // Splice
    CAT = 0x7E,
    SUBSTR = 0x7F,
    LEFT = 0x80,
    RIGHT = 0x81,
    SIZE = 0x82,

    // Bitwise logic
    INVERT = 0x83,
    AND = 0x84,
    OR = 0x85,
    XOR = 0x86,
    EQUAL = 0x87,

    // Arithmetic
    INC = 0x8B,
    DEC = 0x8C,
    SIGN = 0x8D,
    NEGATE = 0x8F,
    ABS = 0x90,
    NOT = 0x91,
    NZ = 0x92,
    ADD = 0x93,
    SUB = 0x94,
    MUL = 0x95,
    DIV = 0x96,
    MOD = 0x97,
    SHL = 0x98,
    SHR = 0x99,
    BOOLAND = 0x9A,
    BOOLOR = 0x9B,
    NUMEQUAL = 0x9C,
    NUMNOTEQUAL = 0x9E,
    LT = 0x9F,
    GT = 0xA0,
    LTE = 0xA1,
    GTE = 0xA2,
    MIN = 0xA3,
    MAX = 0xA4,
    WITHIN = 0xA5,

    // Crypto
    SHA1 = 0xA7,
    SHA256 = 0xA8,
    HASH160 = 0xA9,
    HASH256 = 0xAA,
    CHECKSIG = 0xAC,
    /// Explicit-message signature check; pushes a boolean.
    VERIFY = 0xAD,
    CHECKMULTISIG = 0xAE,

    // Collections
    ARRAYSIZE = 0xC0,
    PACK = 0xC1,
    UNPACK = 0xC2,
    PICKITEM = 0xC3,
    SETITEM = 0xC4,
    NEWARRAY = 0xC5,
    NEWSTRUCT = 0xC6,
    NEWMAP = 0xC7,
    APPEND = 0xC8,
    REVERSE = 0xC9,
    REMOVE = 0xCA,
    HASKEY = 0xCB,
    KEYS = 0xCC,
    VALUES = 0xCD,

    // Exceptions
    THROW = 0xF0,
    THROWIFNOT = 0xF1,
}

impl OpCode {
    /// Returns true for the push class: every opcode that only places a
    /// literal on the evaluation stack.
    pub fn is_push(&self) -> bool {
        (*self as u8) <= OpCode::PUSH16 as u8
    }

    /// Describes the operand encoding of this opcode.
    pub fn operand_size(&self) -> OperandSize {
        let byte = *self as u8;
        match self {
            OpCode::PUSHDATA1 | OpCode::SYSCALL => OperandSize::PrefixedU8,
            OpCode::PUSHDATA2 => OperandSize::PrefixedU16,
            OpCode::PUSHDATA4 => OperandSize::PrefixedU32,
            OpCode::JMP | OpCode::JMPIF | OpCode::JMPIFNOT | OpCode::CALL => {
                OperandSize::Fixed(2)
            }
            OpCode::APPCALL | OpCode::TAILCALL => OperandSize::Fixed(20),
            _ if byte >= OpCode::PUSHBYTES1 as u8 && byte <= OpCode::PUSHBYTES75 as u8 => {
                OperandSize::Fixed(byte as usize)
            }
            _ => OperandSize::None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip_from_byte() {
        assert_eq!(OpCode::try_from(0x00).unwrap(), OpCode::PUSH0);
        assert_eq!(OpCode::try_from(0x93).unwrap(), OpCode::ADD);
        assert_eq!(OpCode::try_from(0x67).unwrap(), OpCode::APPCALL);
        assert_eq!(OpCode::try_from(0xF1).unwrap(), OpCode::THROWIFNOT);
        assert!(OpCode::try_from(0xFE).is_err());
    }

    #[test]
    fn test_push_classification() {
        assert!(OpCode::PUSH0.is_push());
        assert!(OpCode::PUSHBYTES75.is_push());
        assert!(OpCode::PUSHDATA4.is_push());
        assert!(OpCode::PUSH16.is_push());
        assert!(!OpCode::NOP.is_push());
        assert!(!OpCode::ADD.is_push());
    }

    #[test]
    fn test_operand_sizes() {
        assert_eq!(OpCode::PUSHBYTES20.operand_size(), OperandSize::Fixed(20));
        assert_eq!(OpCode::PUSHDATA1.operand_size(), OperandSize::PrefixedU8);
        assert_eq!(OpCode::JMP.operand_size(), OperandSize::Fixed(2));
        assert_eq!(OpCode::APPCALL.operand_size(), OperandSize::Fixed(20));
        assert_eq!(OpCode::SYSCALL.operand_size(), OperandSize::PrefixedU8);
        assert_eq!(OpCode::ADD.operand_size(), OperandSize::None);
    }
}
