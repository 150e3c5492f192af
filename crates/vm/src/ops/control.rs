//! Flow-control opcode handlers.

use crate::error::{VmError, VmResult};
use crate::execution_engine::ExecutionEngine;
use crate::instruction::Instruction;
use crate::op_code::OpCode;

fn jump_target(instruction: &Instruction) -> VmResult<usize> {
    let offset = instruction.jump_offset()? as i64;
    let target = instruction.pointer as i64 + offset;
    usize::try_from(target)
        .map_err(|_| VmError::fault(format!("jump target {target} is negative")))
}

/// NOP: does nothing.
pub fn nop(_engine: &mut ExecutionEngine, _instruction: &Instruction) -> VmResult<()> {
    Ok(())
}

/// JMP: unconditional jump, offset relative to the opcode position.
pub fn jmp(engine: &mut ExecutionEngine, instruction: &Instruction) -> VmResult<()> {
    let target = jump_target(instruction)?;
    engine.current_frame_mut()?.set_ip(target)
}

/// JMPIF: jump when the popped condition is true.
pub fn jmpif(engine: &mut ExecutionEngine, instruction: &Instruction) -> VmResult<()> {
    let condition = engine.pop_bool()?;
    if condition {
        let target = jump_target(instruction)?;
        engine.current_frame_mut()?.set_ip(target)?;
    }
    Ok(())
}

/// JMPIFNOT: jump when the popped condition is false.
pub fn jmpifnot(engine: &mut ExecutionEngine, instruction: &Instruction) -> VmResult<()> {
    let condition = engine.pop_bool()?;
    if !condition {
        let target = jump_target(instruction)?;
        engine.current_frame_mut()?.set_ip(target)?;
    }
    Ok(())
}

/// CALL: push an intra-contract frame at the jump target.
pub fn call(engine: &mut ExecutionEngine, instruction: &Instruction) -> VmResult<()> {
    let target = jump_target(instruction)?;
    engine.push_call_frame(target)
}

/// RET: unload the current frame.
pub fn ret(engine: &mut ExecutionEngine, _instruction: &Instruction) -> VmResult<()> {
    engine.unload_frame()
}

/// THROW: abort unconditionally.
pub fn throw(_engine: &mut ExecutionEngine, _instruction: &Instruction) -> VmResult<()> {
    Err(VmError::fault("THROW"))
}

/// THROWIFNOT: abort when the popped condition is false.
pub fn throwifnot(engine: &mut ExecutionEngine, _instruction: &Instruction) -> VmResult<()> {
    if engine.pop_bool()? {
        Ok(())
    } else {
        Err(VmError::fault("THROWIFNOT"))
    }
}

/// Placeholder for opcodes that cannot run without the host environment.
/// The contract layer's driver intercepts these before dispatch.
pub fn requires_host(_engine: &mut ExecutionEngine, instruction: &Instruction) -> VmResult<()> {
    Err(VmError::fault(format!(
        "{:?} requires the host environment",
        instruction.opcode
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::script_builder::ScriptBuilder;
    use bytes::Bytes;

    #[test]
    fn test_jmp_skips_code() {
        // JMP +4 skips the PUSH1, leaving PUSH2 as the result.
        let mut builder = ScriptBuilder::new();
        builder.emit_jump(OpCode::JMP, 4);
        builder.emit_opcode(OpCode::PUSH1);
        builder.emit_opcode(OpCode::PUSH2);
        let mut engine = ExecutionEngine::new();
        engine.load_entry(Bytes::from(builder.into_bytes()));
        engine.execute().unwrap();
        assert_eq!(engine.take_result().unwrap().as_int().unwrap(), 2.into());
    }

    #[test]
    fn test_jmpif_takes_branch() {
        // PUSH1; JMPIF +4; PUSH1; PUSH16
        let mut builder = ScriptBuilder::new();
        builder.emit_opcode(OpCode::PUSH1);
        builder.emit_jump(OpCode::JMPIF, 4);
        builder.emit_opcode(OpCode::PUSH1);
        builder.emit_opcode(OpCode::PUSH16);
        let mut engine = ExecutionEngine::new();
        engine.load_entry(Bytes::from(builder.into_bytes()));
        engine.execute().unwrap();
        assert_eq!(engine.take_result().unwrap().as_int().unwrap(), 16.into());
    }

    #[test]
    fn test_call_and_ret() {
        // CALL +5; RET jumps into a subroutine that doubles the PUSH3 pushed
        // before it returns.
        let mut builder = ScriptBuilder::new();
        builder.emit_opcode(OpCode::PUSH3); // 0
        builder.emit_jump(OpCode::CALL, 4); // 1..=3, target 5
        builder.emit_opcode(OpCode::RET); // 4
        builder.emit_opcode(OpCode::DUP); // 5
        builder.emit_opcode(OpCode::ADD); // 6
        builder.emit_opcode(OpCode::RET); // 7
        let mut engine = ExecutionEngine::new();
        engine.load_entry(Bytes::from(builder.into_bytes()));
        engine.execute().unwrap();
        assert_eq!(engine.take_result().unwrap().as_int().unwrap(), 6.into());
    }

    #[test]
    fn test_throwifnot() {
        let mut engine = ExecutionEngine::new();
        engine.load_entry(Bytes::from_static(&[0x00, 0xF1])); // PUSH0; THROWIFNOT
        assert!(engine.execute().is_err());
    }
}
