//! Jump table and opcode handlers, grouped by instruction category.

pub mod bitwise;
pub mod compound;
pub mod control;
pub mod crypto;
pub mod numeric;
pub mod push;
pub mod splice;
pub mod stack;

use crate::error::{VmError, VmResult};
use crate::execution_engine::ExecutionEngine;
use crate::instruction::Instruction;
use crate::op_code::OpCode;
use once_cell::sync::Lazy;

/// A handler for one opcode.
pub type OpHandler = fn(&mut ExecutionEngine, &Instruction) -> VmResult<()>;

/// Dispatch table indexed by opcode byte.
pub struct JumpTable {
    handlers: [Option<OpHandler>; 256],
}

impl JumpTable {
    fn new() -> Self {
        let mut table = Self {
            handlers: [None; 256],
        };
        table.register_handlers();
        table
    }

    fn set(&mut self, opcode: OpCode, handler: OpHandler) {
        self.handlers[opcode as usize] = Some(handler);
    }

    /// Gets the handler for an opcode.
    pub fn get(&self, opcode: OpCode) -> Option<OpHandler> {
        self.handlers[opcode as usize]
    }

    fn register_handlers(&mut self) {
        // The whole push class shares one handler.
        for byte in 0x00..=0x60u8 {
            if let Ok(opcode) = OpCode::try_from(byte) {
                self.set(opcode, push::push);
            }
        }

        // Flow control
        self.set(OpCode::NOP, control::nop);
        self.set(OpCode::JMP, control::jmp);
        self.set(OpCode::JMPIF, control::jmpif);
        self.set(OpCode::JMPIFNOT, control::jmpifnot);
        self.set(OpCode::CALL, control::call);
        self.set(OpCode::RET, control::ret);
        self.set(OpCode::THROW, control::throw);
        self.set(OpCode::THROWIFNOT, control::throwifnot);
        self.set(OpCode::APPCALL, control::requires_host);
        self.set(OpCode::TAILCALL, control::requires_host);
        self.set(OpCode::SYSCALL, control::requires_host);

        // Stack manipulation
        self.set(OpCode::DUPFROMALTSTACK, stack::dupfromaltstack);
        self.set(OpCode::TOALTSTACK, stack::toaltstack);
        self.set(OpCode::FROMALTSTACK, stack::fromaltstack);
        self.set(OpCode::XDROP, stack::xdrop);
        self.set(OpCode::XSWAP, stack::xswap);
        self.set(OpCode::XTUCK, stack::xtuck);
        self.set(OpCode::DEPTH, stack::depth);
        self.set(OpCode::DROP, stack::drop);
        self.set(OpCode::DUP, stack::dup);
        self.set(OpCode::NIP, stack::nip);
        self.set(OpCode::OVER, stack::over);
        self.set(OpCode::PICK, stack::pick);
        self.set(OpCode::ROLL, stack::roll);
        self.set(OpCode::ROT, stack::rot);
        self.set(OpCode::SWAP, stack::swap);
        self.set(OpCode::TUCK, stack::tuck);

        // Splice
        self.set(OpCode::CAT, splice::cat);
        self.set(OpCode::SUBSTR, splice::substr);
        self.set(OpCode::LEFT, splice::left);
        self.set(OpCode::RIGHT, splice::right);
        self.set(OpCode::SIZE, splice::size);

        // Bitwise logic
        self.set(OpCode::INVERT, bitwise::invert);
        self.set(OpCode::AND, bitwise::and);
        self.set(OpCode::OR, bitwise::or);
        self.set(OpCode::XOR, bitwise::xor);
        self.set(OpCode::EQUAL, bitwise::equal);

        // Arithmetic
        self.set(OpCode::INC, numeric::inc);
        self.set(OpCode::DEC, numeric::dec);
        self.set(OpCode::SIGN, numeric::sign);
        self.set(OpCode::NEGATE, numeric::negate);
        self.set(OpCode::ABS, numeric::abs);
        self.set(OpCode::NOT, numeric::not);
        self.set(OpCode::NZ, numeric::nz);
        self.set(OpCode::ADD, numeric::add);
        self.set(OpCode::SUB, numeric::sub);
        self.set(OpCode::MUL, numeric::mul);
        self.set(OpCode::DIV, numeric::div);
        self.set(OpCode::MOD, numeric::modulo);
        self.set(OpCode::SHL, numeric::shl);
        self.set(OpCode::SHR, numeric::shr);
        self.set(OpCode::BOOLAND, numeric::booland);
        self.set(OpCode::BOOLOR, numeric::boolor);
        self.set(OpCode::NUMEQUAL, numeric::numequal);
        self.set(OpCode::NUMNOTEQUAL, numeric::numnotequal);
        self.set(OpCode::LT, numeric::lt);
        self.set(OpCode::GT, numeric::gt);
        self.set(OpCode::LTE, numeric::lte);
        self.set(OpCode::GTE, numeric::gte);
        self.set(OpCode::MIN, numeric::min);
        self.set(OpCode::MAX, numeric::max);
        self.set(OpCode::WITHIN, numeric::within);

        // Crypto
        self.set(OpCode::SHA1, crypto::sha1);
        self.set(OpCode::SHA256, crypto::sha256);
        self.set(OpCode::HASH160, crypto::hash160);
        self.set(OpCode::HASH256, crypto::hash256);
        self.set(OpCode::VERIFY, crypto::verify);
        self.set(OpCode::CHECKSIG, control::requires_host);
        self.set(OpCode::CHECKMULTISIG, control::requires_host);

        // Collections
        self.set(OpCode::ARRAYSIZE, compound::arraysize);
        self.set(OpCode::PACK, compound::pack);
        self.set(OpCode::UNPACK, compound::unpack);
        self.set(OpCode::PICKITEM, compound::pickitem);
        self.set(OpCode::SETITEM, compound::setitem);
        self.set(OpCode::NEWARRAY, compound::newarray);
        self.set(OpCode::NEWSTRUCT, compound::newstruct);
        self.set(OpCode::NEWMAP, compound::newmap);
        self.set(OpCode::APPEND, compound::append);
        self.set(OpCode::REVERSE, compound::reverse);
        self.set(OpCode::REMOVE, compound::remove);
        self.set(OpCode::HASKEY, compound::haskey);
        self.set(OpCode::KEYS, compound::keys);
        self.set(OpCode::VALUES, compound::values);
    }
}

static JUMP_TABLE: Lazy<JumpTable> = Lazy::new(JumpTable::new);

/// Executes one instruction against the engine.
pub(crate) fn execute(engine: &mut ExecutionEngine, instruction: &Instruction) -> VmResult<()> {
    match JUMP_TABLE.get(instruction.opcode) {
        Some(handler) => handler(engine, instruction),
        None => Err(VmError::fault(format!(
            "unhandled opcode {:?}",
            instruction.opcode
        ))),
    }
}
