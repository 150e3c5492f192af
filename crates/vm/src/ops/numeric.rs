//! Arithmetic and comparison opcode handlers.
//!
//! Every arithmetic result is re-checked against the canonical integer width
//! before it lands on the stack.

use crate::error::{VmError, VmResult};
use crate::execution_engine::ExecutionEngine;
use crate::instruction::Instruction;
use crate::limits::MAX_SHIFT_BITS;
use crate::stack_item::{check_int_size, StackItem};
use num_bigint::BigInt;
use num_traits::{Signed, ToPrimitive, Zero};

fn push_checked(engine: &mut ExecutionEngine, value: BigInt) -> VmResult<()> {
    check_int_size(&value)?;
    engine.push(StackItem::from_int(value))
}

/// INC: add one.
pub fn inc(engine: &mut ExecutionEngine, _i: &Instruction) -> VmResult<()> {
    let value = engine.pop_int()?;
    push_checked(engine, value + 1)
}

/// DEC: subtract one.
pub fn dec(engine: &mut ExecutionEngine, _i: &Instruction) -> VmResult<()> {
    let value = engine.pop_int()?;
    push_checked(engine, value - 1)
}

/// SIGN: push -1, 0 or 1.
pub fn sign(engine: &mut ExecutionEngine, _i: &Instruction) -> VmResult<()> {
    let value = engine.pop_int()?;
    let sign = if value.is_zero() {
        0
    } else if value.is_negative() {
        -1
    } else {
        1
    };
    engine.push(StackItem::from_int(sign))
}

/// NEGATE: arithmetic negation.
pub fn negate(engine: &mut ExecutionEngine, _i: &Instruction) -> VmResult<()> {
    let value = engine.pop_int()?;
    push_checked(engine, -value)
}

/// ABS: absolute value.
pub fn abs(engine: &mut ExecutionEngine, _i: &Instruction) -> VmResult<()> {
    let value = engine.pop_int()?;
    push_checked(engine, value.abs())
}

/// NOT: boolean negation.
pub fn not(engine: &mut ExecutionEngine, _i: &Instruction) -> VmResult<()> {
    let value = engine.pop_bool()?;
    engine.push(StackItem::from_bool(!value))
}

/// NZ: true when the value is not zero.
pub fn nz(engine: &mut ExecutionEngine, _i: &Instruction) -> VmResult<()> {
    let value = engine.pop_int()?;
    engine.push(StackItem::from_bool(!value.is_zero()))
}

/// ADD.
pub fn add(engine: &mut ExecutionEngine, _i: &Instruction) -> VmResult<()> {
    let right = engine.pop_int()?;
    let left = engine.pop_int()?;
    push_checked(engine, left + right)
}

/// SUB.
pub fn sub(engine: &mut ExecutionEngine, _i: &Instruction) -> VmResult<()> {
    let right = engine.pop_int()?;
    let left = engine.pop_int()?;
    push_checked(engine, left - right)
}

/// MUL.
pub fn mul(engine: &mut ExecutionEngine, _i: &Instruction) -> VmResult<()> {
    let right = engine.pop_int()?;
    let left = engine.pop_int()?;
    push_checked(engine, left * right)
}

/// DIV: truncating division; division by zero faults.
pub fn div(engine: &mut ExecutionEngine, _i: &Instruction) -> VmResult<()> {
    let right = engine.pop_int()?;
    let left = engine.pop_int()?;
    if right.is_zero() {
        return Err(VmError::fault("division by zero"));
    }
    push_checked(engine, left / right)
}

/// MOD: remainder with the sign of the dividend; division by zero faults.
pub fn modulo(engine: &mut ExecutionEngine, _i: &Instruction) -> VmResult<()> {
    let right = engine.pop_int()?;
    let left = engine.pop_int()?;
    if right.is_zero() {
        return Err(VmError::fault("division by zero"));
    }
    push_checked(engine, left % right)
}

fn pop_shift(engine: &mut ExecutionEngine) -> VmResult<u32> {
    let amount = engine.pop_int()?;
    amount
        .to_u32()
        .filter(|&bits| bits <= MAX_SHIFT_BITS)
        .ok_or_else(|| VmError::fault(format!("invalid shift amount {amount}")))
}

/// SHL: left shift; the shift amount is bounded.
pub fn shl(engine: &mut ExecutionEngine, _i: &Instruction) -> VmResult<()> {
    let bits = pop_shift(engine)?;
    let value = engine.pop_int()?;
    push_checked(engine, value << bits)
}

/// SHR: arithmetic right shift; the shift amount is bounded.
pub fn shr(engine: &mut ExecutionEngine, _i: &Instruction) -> VmResult<()> {
    let bits = pop_shift(engine)?;
    let value = engine.pop_int()?;
    push_checked(engine, value >> bits)
}

/// BOOLAND.
pub fn booland(engine: &mut ExecutionEngine, _i: &Instruction) -> VmResult<()> {
    let right = engine.pop_bool()?;
    let left = engine.pop_bool()?;
    engine.push(StackItem::from_bool(left && right))
}

/// BOOLOR.
pub fn boolor(engine: &mut ExecutionEngine, _i: &Instruction) -> VmResult<()> {
    let right = engine.pop_bool()?;
    let left = engine.pop_bool()?;
    engine.push(StackItem::from_bool(left || right))
}

/// NUMEQUAL: numeric equality.
pub fn numequal(engine: &mut ExecutionEngine, _i: &Instruction) -> VmResult<()> {
    let right = engine.pop_int()?;
    let left = engine.pop_int()?;
    engine.push(StackItem::from_bool(left == right))
}

/// NUMNOTEQUAL: numeric inequality.
pub fn numnotequal(engine: &mut ExecutionEngine, _i: &Instruction) -> VmResult<()> {
    let right = engine.pop_int()?;
    let left = engine.pop_int()?;
    engine.push(StackItem::from_bool(left != right))
}

/// LT.
pub fn lt(engine: &mut ExecutionEngine, _i: &Instruction) -> VmResult<()> {
    let right = engine.pop_int()?;
    let left = engine.pop_int()?;
    engine.push(StackItem::from_bool(left < right))
}

/// GT.
pub fn gt(engine: &mut ExecutionEngine, _i: &Instruction) -> VmResult<()> {
    let right = engine.pop_int()?;
    let left = engine.pop_int()?;
    engine.push(StackItem::from_bool(left > right))
}

/// LTE.
pub fn lte(engine: &mut ExecutionEngine, _i: &Instruction) -> VmResult<()> {
    let right = engine.pop_int()?;
    let left = engine.pop_int()?;
    engine.push(StackItem::from_bool(left <= right))
}

/// GTE.
pub fn gte(engine: &mut ExecutionEngine, _i: &Instruction) -> VmResult<()> {
    let right = engine.pop_int()?;
    let left = engine.pop_int()?;
    engine.push(StackItem::from_bool(left >= right))
}

/// MIN.
pub fn min(engine: &mut ExecutionEngine, _i: &Instruction) -> VmResult<()> {
    let right = engine.pop_int()?;
    let left = engine.pop_int()?;
    engine.push(StackItem::from_int(left.min(right)))
}

/// MAX.
pub fn max(engine: &mut ExecutionEngine, _i: &Instruction) -> VmResult<()> {
    let right = engine.pop_int()?;
    let left = engine.pop_int()?;
    engine.push(StackItem::from_int(left.max(right)))
}

/// WITHIN: `lower <= x < upper`.
pub fn within(engine: &mut ExecutionEngine, _i: &Instruction) -> VmResult<()> {
    let upper = engine.pop_int()?;
    let lower = engine.pop_int()?;
    let value = engine.pop_int()?;
    engine.push(StackItem::from_bool(lower <= value && value < upper))
}
