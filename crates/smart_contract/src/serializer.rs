//! Canonical stack item serialization, the wire form behind
//! `Runtime.Serialize` and `Runtime.Deserialize`.
//!
//! Layout: one tag byte, then a type-specific body. Interop handles cannot
//! be serialized and cycles are rejected; both surface as serialization
//! errors rather than faults so callers can tell them apart from bytecode
//! problems.

use onyx_core::{BinaryReader, BinaryWriter};
use onyx_vm::limits::{MAX_ARRAY_SIZE, MAX_BYTEARRAY_SIZE};
use onyx_vm::{bytes_to_int, int_to_bytes, StackItem, VmError, VmResult};
use std::rc::Rc;

const TAG_BYTE_STRING: u8 = 0x00;
const TAG_BOOLEAN: u8 = 0x01;
const TAG_INTEGER: u8 = 0x02;
const TAG_ARRAY: u8 = 0x80;
const TAG_STRUCT: u8 = 0x81;
const TAG_MAP: u8 = 0x82;

/// Maximum nesting depth accepted by the deserializer.
const MAX_NESTING_DEPTH: usize = 64;

/// Serializes a stack item into its canonical tagged byte form.
pub fn serialize(item: &StackItem) -> VmResult<Vec<u8>> {
    let mut writer = BinaryWriter::new();
    let mut visited: Vec<*const ()> = Vec::new();
    write_item(item, &mut writer, &mut visited)?;
    let bytes = writer.into_bytes();
    if bytes.len() > MAX_BYTEARRAY_SIZE {
        return Err(VmError::serialization(format!(
            "serialized form exceeds {MAX_BYTEARRAY_SIZE} bytes"
        )));
    }
    Ok(bytes)
}

fn write_item(
    item: &StackItem,
    writer: &mut BinaryWriter,
    visited: &mut Vec<*const ()>,
) -> VmResult<()> {
    match item {
        StackItem::ByteString(bytes) => {
            writer.write_u8(TAG_BYTE_STRING);
            writer.write_var_bytes(bytes);
        }
        StackItem::Boolean(value) => {
            writer.write_u8(TAG_BOOLEAN);
            writer.write_u8(*value as u8);
        }
        StackItem::Integer(value) => {
            writer.write_u8(TAG_INTEGER);
            writer.write_var_bytes(&int_to_bytes(value));
        }
        StackItem::Array(items) | StackItem::Struct(items) => {
            let pointer = Rc::as_ptr(items) as *const ();
            if visited.contains(&pointer) {
                return Err(VmError::serialization("cyclic item"));
            }
            visited.push(pointer);
            writer.write_u8(if matches!(item, StackItem::Array(_)) {
                TAG_ARRAY
            } else {
                TAG_STRUCT
            });
            let items = items.borrow();
            writer.write_var_uint(items.len() as u64);
            for element in items.iter() {
                write_item(element, writer, visited)?;
            }
            visited.pop();
        }
        StackItem::Map(entries) => {
            let pointer = Rc::as_ptr(entries) as *const ();
            if visited.contains(&pointer) {
                return Err(VmError::serialization("cyclic item"));
            }
            visited.push(pointer);
            writer.write_u8(TAG_MAP);
            let entries = entries.borrow();
            writer.write_var_uint(entries.len() as u64);
            for (key, value) in entries.iter() {
                write_item(key, writer, visited)?;
                write_item(value, writer, visited)?;
            }
            visited.pop();
        }
        StackItem::Interop(_) => {
            return Err(VmError::serialization("interop objects cannot be serialized"));
        }
    }
    Ok(())
}

/// Deserializes the canonical tagged byte form back into a stack item.
pub fn deserialize(bytes: &[u8]) -> VmResult<StackItem> {
    let mut reader = BinaryReader::new(bytes);
    let item = read_item(&mut reader, 0)?;
    if !reader.is_exhausted() {
        return Err(VmError::serialization("trailing bytes after item"));
    }
    Ok(item)
}

fn read_item(reader: &mut BinaryReader, depth: usize) -> VmResult<StackItem> {
    if depth > MAX_NESTING_DEPTH {
        return Err(VmError::serialization("nesting too deep"));
    }
    let tag = reader
        .read_u8()
        .map_err(|e| VmError::serialization(e.to_string()))?;
    match tag {
        TAG_BYTE_STRING => {
            let bytes = reader
                .read_var_bytes(MAX_BYTEARRAY_SIZE)
                .map_err(|e| VmError::serialization(e.to_string()))?;
            Ok(StackItem::from_bytes(bytes))
        }
        TAG_BOOLEAN => {
            let value = reader
                .read_u8()
                .map_err(|e| VmError::serialization(e.to_string()))?;
            Ok(StackItem::from_bool(value != 0))
        }
        TAG_INTEGER => {
            let bytes = reader
                .read_var_bytes(onyx_vm::limits::MAX_INTEGER_SIZE)
                .map_err(|e| VmError::serialization(e.to_string()))?;
            Ok(StackItem::from_int(bytes_to_int(&bytes)))
        }
        TAG_ARRAY | TAG_STRUCT => {
            let count = reader
                .read_var_uint(MAX_ARRAY_SIZE as u64)
                .map_err(|e| VmError::serialization(e.to_string()))? as usize;
            let mut items = Vec::with_capacity(count);
            for _ in 0..count {
                items.push(read_item(reader, depth + 1)?);
            }
            Ok(if tag == TAG_ARRAY {
                StackItem::from_array(items)
            } else {
                StackItem::from_struct(items)
            })
        }
        TAG_MAP => {
            let count = reader
                .read_var_uint(MAX_ARRAY_SIZE as u64)
                .map_err(|e| VmError::serialization(e.to_string()))? as usize;
            let map = StackItem::new_map();
            {
                let entries = map.as_map()?;
                let mut entries = entries.borrow_mut();
                for _ in 0..count {
                    let key = read_item(reader, depth + 1)?;
                    let value = read_item(reader, depth + 1)?;
                    entries
                        .insert(key, value)
                        .map_err(|e| VmError::serialization(e.to_string()))?;
                }
            }
            Ok(map)
        }
        other => Err(VmError::serialization(format!(
            "unknown tag {other:#04x}"
        ))),
    }
}
