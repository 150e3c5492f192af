//! Bitwise logic and equality opcode handlers.

use crate::error::VmResult;
use crate::execution_engine::ExecutionEngine;
use crate::instruction::Instruction;
use crate::stack_item::{check_int_size, StackItem};
use num_bigint::BigInt;

/// INVERT: bitwise complement over the infinite two's complement form.
pub fn invert(engine: &mut ExecutionEngine, _i: &Instruction) -> VmResult<()> {
    let value = engine.pop_int()?;
    let result: BigInt = -value - 1;
    check_int_size(&result)?;
    engine.push(StackItem::from_int(result))
}

/// AND: bitwise conjunction.
pub fn and(engine: &mut ExecutionEngine, _i: &Instruction) -> VmResult<()> {
    let right = engine.pop_int()?;
    let left = engine.pop_int()?;
    engine.push(StackItem::from_int(left & right))
}

/// OR: bitwise disjunction.
pub fn or(engine: &mut ExecutionEngine, _i: &Instruction) -> VmResult<()> {
    let right = engine.pop_int()?;
    let left = engine.pop_int()?;
    engine.push(StackItem::from_int(left | right))
}

/// XOR: bitwise exclusive disjunction.
pub fn xor(engine: &mut ExecutionEngine, _i: &Instruction) -> VmResult<()> {
    let right = engine.pop_int()?;
    let left = engine.pop_int()?;
    engine.push(StackItem::from_int(left ^ right))
}

/// EQUAL: the tagged-union equality rules; see [`StackItem::equals`].
pub fn equal(engine: &mut ExecutionEngine, _i: &Instruction) -> VmResult<()> {
    let right = engine.pop()?;
    let left = engine.pop()?;
    let result = left.equals(&right)?;
    engine.push(StackItem::from_bool(result))
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
    fn test_and_or_xor() {
        let mut engine = run_script(|b| {
            b.emit_push_int(0b1100);
            b.emit_push_int(0b1010);
            b.emit_opcode(OpCode::AND);
        });
        assert_eq!(
            engine.take_result().unwrap().as_int().unwrap(),
            0b1000.into()
        );

        let mut engine = run_script(|b| {
            b.emit_push_int(0b1100);
            b.emit_push_int(0b1010);
            b.emit_opcode(OpCode::XOR);
        });
        assert_eq!(
            engine.take_result().unwrap().as_int().unwrap(),
            0b0110.into()
        );
    }

    #[test]
    fn test_invert() {
        let mut engine = run_script(|b| {
            b.emit_push_int(0);
            b.emit_opcode(OpCode::INVERT);
        });
        assert_eq!(engine.take_result().unwrap().as_int().unwrap(), (-1).into());
    }

    #[test]
    fn test_equal_across_primitive_forms() {
        let mut engine = run_script(|b| {
            b.emit_push_int(1);
            b.emit_push_bool(true);
            b.emit_opcode(OpCode::EQUAL);
        });
        assert!(engine.take_result().unwrap().as_bool());
    }
}
