//! Push-class opcode handler: literals onto the evaluation stack.

use crate::error::VmResult;
use crate::execution_engine::ExecutionEngine;
use crate::instruction::Instruction;
use crate::op_code::OpCode;
use crate::stack_item::StackItem;

/// Handles the whole push class: `PUSH0`, `PUSHBYTES1..=75`, `PUSHDATA*`,
/// `PUSHM1` and `PUSH1..=16`.
pub fn push(engine: &mut ExecutionEngine, instruction: &Instruction) -> VmResult<()> {
    let item = match instruction.opcode {
        OpCode::PUSH0 => StackItem::from_bytes(Vec::new()),
        OpCode::PUSHM1 => StackItem::from_int(-1),
        opcode if (opcode as u8) >= OpCode::PUSH1 as u8 => {
            StackItem::from_int((opcode as u8 - 0x50) as i64)
        }
        _ => StackItem::from_bytes(instruction.operand.clone()),
    };
    engine.push(item)
}
