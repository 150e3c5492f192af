//! Collection opcode handlers for arrays, structs and maps.
//!
//! Arrays and maps are shared allocations: these handlers mutate in place
//! and the change is visible through every handle. A struct stored into a
//! container is deep-cloned first (value semantics).

use crate::error::{VmError, VmResult};
use crate::execution_engine::ExecutionEngine;
use crate::instruction::Instruction;
use crate::limits::MAX_ARRAY_SIZE;
use crate::stack_item::StackItem;

fn check_element_count(count: usize) -> VmResult<()> {
    if count > MAX_ARRAY_SIZE {
        return Err(VmError::fault(format!(
            "container size {count} exceeds maximum {MAX_ARRAY_SIZE}"
        )));
    }
    Ok(())
}

/// ARRAYSIZE: element count for containers, byte length for primitives.
pub fn arraysize(engine: &mut ExecutionEngine, _i: &Instruction) -> VmResult<()> {
    let item = engine.pop()?;
    let size = item.size()?;
    engine.push(StackItem::from_int(size as i64))
}

/// PACK: pop a count, then that many items, into a new array.
pub fn pack(engine: &mut ExecutionEngine, _i: &Instruction) -> VmResult<()> {
    let count = engine.pop_index()?;
    check_element_count(count)?;
    let mut items = Vec::with_capacity(count);
    for _ in 0..count {
        items.push(engine.pop()?);
    }
    engine.push(StackItem::from_array(items))
}

/// UNPACK: spread an array onto the stack, element zero on top of the
/// elements, followed by the element count.
pub fn unpack(engine: &mut ExecutionEngine, _i: &Instruction) -> VmResult<()> {
    let array = engine.pop()?.as_array()?;
    let items = array.borrow().clone();
    for item in items.iter().rev() {
        engine.push(item.clone())?;
    }
    engine.push(StackItem::from_int(items.len() as i64))
}

/// PICKITEM: index into an array or struct, or look up a map key.
pub fn pickitem(engine: &mut ExecutionEngine, _i: &Instruction) -> VmResult<()> {
    let key = engine.pop()?;
    let collection = engine.pop()?;
    let element = match &collection {
        StackItem::Map(entries) => entries
            .borrow()
            .get(&key)?
            .ok_or_else(|| VmError::fault("map key not found"))?,
        StackItem::Array(_) | StackItem::Struct(_) => {
            let items = collection.as_array()?;
            let index: usize = key
                .as_int()?
                .try_into()
                .map_err(|_| VmError::fault("invalid array index"))?;
            let items = items.borrow();
            items
                .get(index)
                .cloned()
                .ok_or_else(|| VmError::fault(format!("array index {index} out of range")))?
        }
        other => {
            return Err(VmError::fault(format!(
                "PICKITEM needs a container, found {}",
                other.type_name()
            )))
        }
    };
    engine.push(element)
}

/// SETITEM: store a value under an array index or map key, in place.
pub fn setitem(engine: &mut ExecutionEngine, _i: &Instruction) -> VmResult<()> {
    let value = engine.pop()?;
    let value = match value {
        StackItem::Struct(_) => value.deep_clone()?,
        other => other,
    };
    let key = engine.pop()?;
    let collection = engine.pop()?;
    match &collection {
        StackItem::Map(entries) => {
            let mut entries = entries.borrow_mut();
            if !entries.contains(&key)? {
                check_element_count(entries.len() + 1)?;
            }
            entries.insert(key, value)?;
        }
        StackItem::Array(_) | StackItem::Struct(_) => {
            let items = collection.as_array()?;
            let index: usize = key
                .as_int()?
                .try_into()
                .map_err(|_| VmError::fault("invalid array index"))?;
            let mut items = items.borrow_mut();
            let slot = items
                .get_mut(index)
                .ok_or_else(|| VmError::fault(format!("array index {index} out of range")))?;
            *slot = value;
        }
        other => {
            return Err(VmError::fault(format!(
                "SETITEM needs a container, found {}",
                other.type_name()
            )))
        }
    }
    Ok(())
}

/// NEWARRAY: array of n false values.
pub fn newarray(engine: &mut ExecutionEngine, _i: &Instruction) -> VmResult<()> {
    let count = engine.pop_index()?;
    check_element_count(count)?;
    engine.push(StackItem::from_array(vec![
        StackItem::from_bool(false);
        count
    ]))
}

/// NEWSTRUCT: struct of n false values.
pub fn newstruct(engine: &mut ExecutionEngine, _i: &Instruction) -> VmResult<()> {
    let count = engine.pop_index()?;
    check_element_count(count)?;
    engine.push(StackItem::from_struct(vec![
        StackItem::from_bool(false);
        count
    ]))
}

/// NEWMAP: empty map.
pub fn newmap(engine: &mut ExecutionEngine, _i: &Instruction) -> VmResult<()> {
    engine.push(StackItem::new_map())
}

/// APPEND: push a value onto the end of an array or struct, in place.
pub fn append(engine: &mut ExecutionEngine, _i: &Instruction) -> VmResult<()> {
    let value = engine.pop()?;
    let value = match value {
        StackItem::Struct(_) => value.deep_clone()?,
        other => other,
    };
    let array = engine.pop()?.as_array()?;
    let mut items = array.borrow_mut();
    check_element_count(items.len() + 1)?;
    items.push(value);
    Ok(())
}

/// REVERSE: reverse an array in place.
pub fn reverse(engine: &mut ExecutionEngine, _i: &Instruction) -> VmResult<()> {
    let array = engine.pop()?.as_array()?;
    array.borrow_mut().reverse();
    Ok(())
}

/// REMOVE: delete an array index or a map key, in place.
pub fn remove(engine: &mut ExecutionEngine, _i: &Instruction) -> VmResult<()> {
    let key = engine.pop()?;
    let collection = engine.pop()?;
    match &collection {
        StackItem::Map(entries) => {
            entries.borrow_mut().remove(&key)?;
            Ok(())
        }
        StackItem::Array(_) | StackItem::Struct(_) => {
            let items = collection.as_array()?;
            let index: usize = key
                .as_int()?
                .try_into()
                .map_err(|_| VmError::fault("invalid array index"))?;
            let mut items = items.borrow_mut();
            if index >= items.len() {
                return Err(VmError::fault(format!(
                    "array index {index} out of range"
                )));
            }
            items.remove(index);
            Ok(())
        }
        other => Err(VmError::fault(format!(
            "REMOVE needs a container, found {}",
            other.type_name()
        ))),
    }
}

/// HASKEY: whether an array index is in range or a map key is present.
pub fn haskey(engine: &mut ExecutionEngine, _i: &Instruction) -> VmResult<()> {
    let key = engine.pop()?;
    let collection = engine.pop()?;
    let present = match &collection {
        StackItem::Map(entries) => entries.borrow().contains(&key)?,
        StackItem::Array(_) | StackItem::Struct(_) => {
            let items = collection.as_array()?;
            let index: usize = key
                .as_int()?
                .try_into()
                .map_err(|_| VmError::fault("invalid array index"))?;
            let len = items.borrow().len();
            index < len
        }
        other => {
            return Err(VmError::fault(format!(
                "HASKEY needs a container, found {}",
                other.type_name()
            )))
        }
    };
    engine.push(StackItem::from_bool(present))
}

/// KEYS: the map's keys as a new array, in insertion order.
pub fn keys(engine: &mut ExecutionEngine, _i: &Instruction) -> VmResult<()> {
    let map = engine.pop()?.as_map()?;
    let keys = map.borrow().keys();
    engine.push(StackItem::from_array(keys))
}

/// VALUES: the values of a map or the elements of an array, as a new array.
pub fn values(engine: &mut ExecutionEngine, _i: &Instruction) -> VmResult<()> {
    let collection = engine.pop()?;
    let values = match &collection {
        StackItem::Map(entries) => entries.borrow().values(),
        StackItem::Array(_) | StackItem::Struct(_) => collection.as_array()?.borrow().clone(),
        other => {
            return Err(VmError::fault(format!(
                "VALUES needs a container, found {}",
                other.type_name()
            )))
        }
    };
    engine.push(StackItem::from_array(values))
}
