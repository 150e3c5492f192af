//! Per-execution resource ceilings. All of these are consensus constants.

/// Maximum combined evaluation plus alt stack items across every frame.
pub const MAX_STACK_SIZE: usize = 2048;

/// Maximum nested call depth, for both VM frames and contract contexts.
pub const MAX_CONTEXT_DEPTH: usize = 1024;

/// Maximum opcode steps in preview mode.
pub const MAX_STEP_COUNT: u32 = 8_000_000;

/// Maximum encoded byte length of an integer result.
pub const MAX_INTEGER_SIZE: usize = 32;

/// Maximum byte-array operand and serialization output size.
pub const MAX_BYTEARRAY_SIZE: usize = 1024 * 1024;

/// Maximum element count of an array, struct or map.
pub const MAX_ARRAY_SIZE: usize = 1024;

/// Maximum storage key length in bytes.
pub const MAX_STORAGE_KEY_SIZE: usize = 1024;

/// Maximum bit count for SHL/SHR shift amounts.
pub const MAX_SHIFT_BITS: u32 = 256;
