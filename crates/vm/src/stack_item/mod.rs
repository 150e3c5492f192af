//! Stack item implementation for the ScriptVM.
//!
//! The tagged value union every opcode operates on. The container variants
//! (`Array`, `Struct`, `Map`) are shared allocations: cloning a stack item
//! clones the handle, not the payload, so mutation through one handle is
//! visible through every other. That sharing is consensus-visible (reference
//! equality, in-place `SETITEM`) and is exactly why containers can form
//! cycles, which every traversal here detects and rejects.

mod map;

pub use map::VmMap;

use crate::error::{VmError, VmResult};
use crate::limits::MAX_INTEGER_SIZE;
use num_bigint::BigInt;
use num_traits::Zero;
use std::any::Any;
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

/// A host-side value wrapped into the VM as an opaque handle.
pub trait InteropInterface: fmt::Debug {
    /// Short name of the wrapped type, for diagnostics.
    fn type_name(&self) -> &'static str;

    /// Allows downcasting to the concrete wrapper.
    fn as_any(&self) -> &dyn Any;
}

/// A value on the evaluation stack.
#[derive(Clone, Debug)]
pub enum StackItem {
    /// A boolean value.
    Boolean(bool),
    /// An arbitrary-precision signed integer.
    Integer(BigInt),
    /// An immutable byte string.
    ByteString(Vec<u8>),
    /// An ordered, mutable, heterogeneous sequence.
    Array(Rc<RefCell<Vec<StackItem>>>),
    /// Same shape as Array, but compared structurally.
    Struct(Rc<RefCell<Vec<StackItem>>>),
    /// An insertion-ordered map with primitive keys.
    Map(Rc<RefCell<VmMap>>),
    /// An opaque handle to a host-side value.
    Interop(Rc<dyn InteropInterface>),
}

impl StackItem {
    /// Creates a boolean item.
    pub fn from_bool(value: bool) -> Self {
        StackItem::Boolean(value)
    }

    /// Creates an integer item.
    pub fn from_int<T: Into<BigInt>>(value: T) -> Self {
        StackItem::Integer(value.into())
    }

    /// Creates a byte string item.
    pub fn from_bytes<T: Into<Vec<u8>>>(value: T) -> Self {
        StackItem::ByteString(value.into())
    }

    /// Creates an array item over the given elements.
    pub fn from_array(items: Vec<StackItem>) -> Self {
        StackItem::Array(Rc::new(RefCell::new(items)))
    }

    /// Creates a struct item over the given elements.
    pub fn from_struct(items: Vec<StackItem>) -> Self {
        StackItem::Struct(Rc::new(RefCell::new(items)))
    }

    /// Creates an empty map item.
    pub fn new_map() -> Self {
        StackItem::Map(Rc::new(RefCell::new(VmMap::new())))
    }

    /// Wraps a host-side value.
    pub fn from_interop<T: InteropInterface + 'static>(value: T) -> Self {
        StackItem::Interop(Rc::new(value))
    }

    /// Short name of the variant, for diagnostics.
    pub fn type_name(&self) -> &'static str {
        match self {
            StackItem::Boolean(_) => "Boolean",
            StackItem::Integer(_) => "Integer",
            StackItem::ByteString(_) => "ByteString",
            StackItem::Array(_) => "Array",
            StackItem::Struct(_) => "Struct",
            StackItem::Map(_) => "Map",
            StackItem::Interop(_) => "Interop",
        }
    }

    /// Returns true for the interconvertible primitive variants.
    pub fn is_primitive(&self) -> bool {
        matches!(
            self,
            StackItem::Boolean(_) | StackItem::Integer(_) | StackItem::ByteString(_)
        )
    }

    /// Converts to a boolean. Containers and interop handles are truthy;
    /// byte strings are true when any byte is non-zero.
    pub fn as_bool(&self) -> bool {
        match self {
            StackItem::Boolean(value) => *value,
            StackItem::Integer(value) => !value.is_zero(),
            StackItem::ByteString(bytes) => bytes.iter().any(|&byte| byte != 0),
            StackItem::Array(_) | StackItem::Struct(_) | StackItem::Map(_) => true,
            StackItem::Interop(_) => true,
        }
    }

    /// Converts to an integer by the canonical rules.
    pub fn as_int(&self) -> VmResult<BigInt> {
        match self {
            StackItem::Boolean(value) => Ok(BigInt::from(*value as u8)),
            StackItem::Integer(value) => Ok(value.clone()),
            StackItem::ByteString(bytes) => Ok(bytes_to_int(bytes)),
            other => Err(VmError::fault(format!(
                "cannot convert {} to Integer",
                other.type_name()
            ))),
        }
    }

    /// Converts to canonical bytes.
    pub fn as_bytes(&self) -> VmResult<Vec<u8>> {
        match self {
            StackItem::Boolean(true) => Ok(vec![0x01]),
            StackItem::Boolean(false) => Ok(vec![]),
            StackItem::Integer(value) => Ok(int_to_bytes(value)),
            StackItem::ByteString(bytes) => Ok(bytes.clone()),
            other => Err(VmError::fault(format!(
                "cannot convert {} to ByteString",
                other.type_name()
            ))),
        }
    }

    /// Borrows the shared element vector of an array or struct.
    pub fn as_array(&self) -> VmResult<Rc<RefCell<Vec<StackItem>>>> {
        match self {
            StackItem::Array(items) | StackItem::Struct(items) => Ok(Rc::clone(items)),
            other => Err(VmError::fault(format!(
                "cannot convert {} to Array",
                other.type_name()
            ))),
        }
    }

    /// Borrows the shared map payload.
    pub fn as_map(&self) -> VmResult<Rc<RefCell<VmMap>>> {
        match self {
            StackItem::Map(entries) => Ok(Rc::clone(entries)),
            other => Err(VmError::fault(format!(
                "cannot convert {} to Map",
                other.type_name()
            ))),
        }
    }

    /// Borrows the interop handle.
    pub fn as_interop(&self) -> VmResult<Rc<dyn InteropInterface>> {
        match self {
            StackItem::Interop(handle) => Ok(Rc::clone(handle)),
            other => Err(VmError::fault(format!(
                "expected an interop handle, found {}",
                other.type_name()
            ))),
        }
    }

    /// Element count for containers, canonical byte length for primitives.
    pub fn size(&self) -> VmResult<usize> {
        match self {
            StackItem::Array(items) | StackItem::Struct(items) => Ok(items.borrow().len()),
            StackItem::Map(entries) => Ok(entries.borrow().len()),
            primitive if primitive.is_primitive() => Ok(primitive.as_bytes()?.len()),
            other => Err(VmError::fault(format!(
                "cannot take the size of {}",
                other.type_name()
            ))),
        }
    }

    /// Equality as the `EQUAL` opcode sees it: structs compare deeply,
    /// arrays, maps and interop handles by allocation identity, primitives by
    /// canonical byte form. A cyclic struct comparison faults.
    pub fn equals(&self, other: &StackItem) -> VmResult<bool> {
        let mut visited = Vec::new();
        equals_inner(self, other, &mut visited)
    }

    /// Deep copy with struct value semantics: nested structs are cloned,
    /// arrays and maps keep their handles. A struct cycle faults.
    pub fn deep_clone(&self) -> VmResult<StackItem> {
        let mut visited = Vec::new();
        deep_clone_inner(self, &mut visited)
    }
}

/// Encodes an integer in canonical form: minimal-length little-endian two's
/// complement, with zero encoded as the empty string. A positive value whose
/// top bit would read as a sign carries one extra `0x00` byte.
pub fn int_to_bytes(value: &BigInt) -> Vec<u8> {
    if value.is_zero() {
        return Vec::new();
    }
    value.to_signed_bytes_le()
}

/// Decodes a canonical little-endian two's complement integer.
pub fn bytes_to_int(bytes: &[u8]) -> BigInt {
    if bytes.is_empty() {
        return BigInt::zero();
    }
    BigInt::from_signed_bytes_le(bytes)
}

/// Rejects integers whose canonical encoding exceeds the consensus width.
pub fn check_int_size(value: &BigInt) -> VmResult<()> {
    let encoded_len = int_to_bytes(value).len();
    if encoded_len > MAX_INTEGER_SIZE {
        return Err(VmError::integer_overflow(MAX_INTEGER_SIZE));
    }
    Ok(())
}

fn equals_inner(
    left: &StackItem,
    right: &StackItem,
    visited: &mut Vec<(*const (), *const ())>,
) -> VmResult<bool> {
    match (left, right) {
        (StackItem::Struct(a), StackItem::Struct(b)) => {
            if Rc::ptr_eq(a, b) {
                return Ok(true);
            }
            let pair = (Rc::as_ptr(a) as *const (), Rc::as_ptr(b) as *const ());
            if visited.contains(&pair) {
                return Err(VmError::fault("cyclic struct in equality comparison"));
            }
            visited.push(pair);
            let a_items = a.borrow();
            let b_items = b.borrow();
            if a_items.len() != b_items.len() {
                visited.pop();
                return Ok(false);
            }
            for (x, y) in a_items.iter().zip(b_items.iter()) {
                if !equals_inner(x, y, visited)? {
                    visited.pop();
                    return Ok(false);
                }
            }
            visited.pop();
            Ok(true)
        }
        (StackItem::Array(a), StackItem::Array(b)) => Ok(Rc::ptr_eq(a, b)),
        (StackItem::Map(a), StackItem::Map(b)) => Ok(Rc::ptr_eq(a, b)),
        (StackItem::Interop(a), StackItem::Interop(b)) => Ok(Rc::ptr_eq(a, b)),
        (a, b) if a.is_primitive() && b.is_primitive() => Ok(a.as_bytes()? == b.as_bytes()?),
        _ => Ok(false),
    }
}

fn deep_clone_inner(item: &StackItem, visited: &mut Vec<*const ()>) -> VmResult<StackItem> {
    match item {
        StackItem::Struct(items) => {
            let ptr = Rc::as_ptr(items) as *const ();
            if visited.contains(&ptr) {
                return Err(VmError::fault("cyclic struct in copy"));
            }
            visited.push(ptr);
            let mut cloned = Vec::with_capacity(items.borrow().len());
            for element in items.borrow().iter() {
                cloned.push(deep_clone_inner(element, visited)?);
            }
            visited.pop();
            Ok(StackItem::from_struct(cloned))
        }
        other => Ok(other.clone()),
    }
}
