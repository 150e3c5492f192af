//! Stack-manipulation opcode handlers.

use crate::error::{VmError, VmResult};
use crate::execution_engine::ExecutionEngine;
use crate::instruction::Instruction;
use crate::stack_item::StackItem;

/// DUPFROMALTSTACK: copy the top of the alt stack onto the evaluation stack.
pub fn dupfromaltstack(engine: &mut ExecutionEngine, _i: &Instruction) -> VmResult<()> {
    let item = engine.current_frame()?.alt_stack.peek(0)?.clone();
    engine.push(item)
}

/// TOALTSTACK: move the top item to the alt stack.
pub fn toaltstack(engine: &mut ExecutionEngine, _i: &Instruction) -> VmResult<()> {
    let item = engine.pop()?;
    engine.current_frame_mut()?.alt_stack.push(item);
    Ok(())
}

/// FROMALTSTACK: move the top of the alt stack back.
pub fn fromaltstack(engine: &mut ExecutionEngine, _i: &Instruction) -> VmResult<()> {
    let item = engine.current_frame_mut()?.alt_stack.pop()?;
    engine.push(item)
}

/// XDROP: pop n, then remove the item at depth n.
pub fn xdrop(engine: &mut ExecutionEngine, _i: &Instruction) -> VmResult<()> {
    let depth = engine.pop_index()?;
    engine
        .current_frame_mut()?
        .evaluation_stack
        .remove(depth)
        .map(|_| ())
}

/// XSWAP: pop n, then swap the top with the item at depth n.
pub fn xswap(engine: &mut ExecutionEngine, _i: &Instruction) -> VmResult<()> {
    let depth = engine.pop_index()?;
    if depth == 0 {
        return Ok(());
    }
    engine.current_frame_mut()?.evaluation_stack.swap(0, depth)
}

/// XTUCK: pop n, then insert a copy of the top at depth n.
pub fn xtuck(engine: &mut ExecutionEngine, _i: &Instruction) -> VmResult<()> {
    let depth = engine.pop_index()?;
    if depth == 0 {
        return Err(VmError::fault("XTUCK depth must be positive"));
    }
    let item = engine.peek(0)?.clone();
    engine
        .current_frame_mut()?
        .evaluation_stack
        .insert(depth, item)
}

/// DEPTH: push the evaluation stack item count.
pub fn depth(engine: &mut ExecutionEngine, _i: &Instruction) -> VmResult<()> {
    let count = engine.current_frame()?.evaluation_stack.len();
    engine.push(StackItem::from_int(count as i64))
}

/// DROP: discard the top item.
pub fn drop(engine: &mut ExecutionEngine, _i: &Instruction) -> VmResult<()> {
    engine.pop().map(|_| ())
}

/// DUP: duplicate the top item.
pub fn dup(engine: &mut ExecutionEngine, _i: &Instruction) -> VmResult<()> {
    let item = engine.peek(0)?.clone();
    engine.push(item)
}

/// NIP: remove the second item.
pub fn nip(engine: &mut ExecutionEngine, _i: &Instruction) -> VmResult<()> {
    engine
        .current_frame_mut()?
        .evaluation_stack
        .remove(1)
        .map(|_| ())
}

/// OVER: copy the second item to the top.
pub fn over(engine: &mut ExecutionEngine, _i: &Instruction) -> VmResult<()> {
    let item = engine.peek(1)?.clone();
    engine.push(item)
}

/// PICK: pop n, then copy the item at depth n to the top.
pub fn pick(engine: &mut ExecutionEngine, _i: &Instruction) -> VmResult<()> {
    let depth = engine.pop_index()?;
    let item = engine.peek(depth)?.clone();
    engine.push(item)
}

/// ROLL: pop n, then move the item at depth n to the top.
pub fn roll(engine: &mut ExecutionEngine, _i: &Instruction) -> VmResult<()> {
    let depth = engine.pop_index()?;
    if depth == 0 {
        return Ok(());
    }
    let item = engine.current_frame_mut()?.evaluation_stack.remove(depth)?;
    engine.push(item)
}

/// ROT: move the third item to the top.
pub fn rot(engine: &mut ExecutionEngine, _i: &Instruction) -> VmResult<()> {
    let item = engine.current_frame_mut()?.evaluation_stack.remove(2)?;
    engine.push(item)
}

/// SWAP: exchange the top two items.
pub fn swap(engine: &mut ExecutionEngine, _i: &Instruction) -> VmResult<()> {
    engine.current_frame_mut()?.evaluation_stack.swap(0, 1)
}

/// TUCK: insert a copy of the top below the second item.
pub fn tuck(engine: &mut ExecutionEngine, _i: &Instruction) -> VmResult<()> {
    let item = engine.peek(0)?.clone();
    engine
        .current_frame_mut()?
        .evaluation_stack
        .insert(2, item)
}

#[cfg(test)]
mod tests {
    use crate::execution_engine::ExecutionEngine;
    use crate::op_code::OpCode;
    use crate::script_builder::ScriptBuilder;
    use bytes::Bytes;

    fn run_script(build: impl FnOnce(&mut ScriptBuilder)) -> ExecutionEngine {
        let mut builder = ScriptBuilder::new();
        build(&mut builder);
        let mut engine = ExecutionEngine::new();
        engine.load_entry(Bytes::from(builder.into_bytes()));
        engine.execute().unwrap();
        engine
    }

    #[test]
    fn test_dup_and_depth() {
        let mut engine = run_script(|b| {
            b.emit_opcode(OpCode::PUSH5);
            b.emit_opcode(OpCode::DUP);
            b.emit_opcode(OpCode::DEPTH);
        });
        assert_eq!(engine.take_result().unwrap().as_int().unwrap(), 2.into());
    }

    #[test]
    fn test_swap_over_nip() {
        // 1 2 SWAP -> 2 1; OVER -> 2 1 2; NIP -> 2 2; ADD -> 4
        let mut engine = run_script(|b| {
            b.emit_opcode(OpCode::PUSH1);
            b.emit_opcode(OpCode::PUSH2);
            b.emit_opcode(OpCode::SWAP);
            b.emit_opcode(OpCode::OVER);
            b.emit_opcode(OpCode::NIP);
            b.emit_opcode(OpCode::ADD);
        });
        assert_eq!(engine.take_result().unwrap().as_int().unwrap(), 4.into());
    }

    #[test]
    fn test_roll_moves_item() {
        // 1 2 3 PUSH2 ROLL -> 2 3 1
        let mut engine = run_script(|b| {
            b.emit_opcode(OpCode::PUSH1);
            b.emit_opcode(OpCode::PUSH2);
            b.emit_opcode(OpCode::PUSH3);
            b.emit_opcode(OpCode::PUSH2);
            b.emit_opcode(OpCode::ROLL);
        });
        assert_eq!(engine.take_result().unwrap().as_int().unwrap(), 1.into());
    }

    #[test]
    fn test_alt_stack_round_trip() {
        let mut engine = run_script(|b| {
            b.emit_opcode(OpCode::PUSH7);
            b.emit_opcode(OpCode::TOALTSTACK);
            b.emit_opcode(OpCode::PUSH1);
            b.emit_opcode(OpCode::FROMALTSTACK);
            b.emit_opcode(OpCode::ADD);
        });
        assert_eq!(engine.take_result().unwrap().as_int().unwrap(), 8.into());
    }
}
