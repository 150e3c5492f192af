//! Splice opcode handlers over byte strings.

use crate::error::{VmError, VmResult};
use crate::execution_engine::ExecutionEngine;
use crate::instruction::Instruction;
use crate::limits::MAX_BYTEARRAY_SIZE;
use crate::stack_item::StackItem;

/// CAT: concatenate two byte strings.
pub fn cat(engine: &mut ExecutionEngine, _i: &Instruction) -> VmResult<()> {
    let tail = engine.pop_bytes()?;
    let mut head = engine.pop_bytes()?;
    if head.len() + tail.len() > MAX_BYTEARRAY_SIZE {
        return Err(VmError::fault(format!(
            "CAT result exceeds {MAX_BYTEARRAY_SIZE} bytes"
        )));
    }
    head.extend_from_slice(&tail);
    engine.push(StackItem::from_bytes(head))
}

/// SUBSTR: extract `length` bytes starting at `start`.
pub fn substr(engine: &mut ExecutionEngine, _i: &Instruction) -> VmResult<()> {
    let length = engine.pop_index()?;
    let start = engine.pop_index()?;
    let data = engine.pop_bytes()?;
    let end = start
        .checked_add(length)
        .ok_or_else(|| VmError::fault("SUBSTR range overflow"))?;
    if end > data.len() {
        return Err(VmError::fault(format!(
            "SUBSTR range {start}..{end} outside {} bytes",
            data.len()
        )));
    }
    engine.push(StackItem::from_bytes(data[start..end].to_vec()))
}

/// LEFT: keep the first `count` bytes.
pub fn left(engine: &mut ExecutionEngine, _i: &Instruction) -> VmResult<()> {
    let count = engine.pop_index()?;
    let data = engine.pop_bytes()?;
    if count > data.len() {
        return Err(VmError::fault(format!(
            "LEFT count {count} outside {} bytes",
            data.len()
        )));
    }
    engine.push(StackItem::from_bytes(data[..count].to_vec()))
}

/// RIGHT: keep the last `count` bytes.
pub fn right(engine: &mut ExecutionEngine, _i: &Instruction) -> VmResult<()> {
    let count = engine.pop_index()?;
    let data = engine.pop_bytes()?;
    if count > data.len() {
        return Err(VmError::fault(format!(
            "RIGHT count {count} outside {} bytes",
            data.len()
        )));
    }
    engine.push(StackItem::from_bytes(data[data.len() - count..].to_vec()))
}

/// SIZE: element count for containers, byte length for primitives.
pub fn size(engine: &mut ExecutionEngine, _i: &Instruction) -> VmResult<()> {
    let item = engine.pop()?;
    let size = item.size()?;
    engine.push(StackItem::from_int(size as i64))
}
