//! The ScriptVM: a deterministic, gas-metered, stack-based virtual machine.
//!
//! This crate owns everything consensus-critical that does not touch world
//! state: the stack item model, the opcode interpreter, the gas schedule and
//! the per-execution limits. The contract layer supplies the host services
//! and the metered outer loop.

pub mod error;
pub mod evaluation_stack;
pub mod execution_context;
pub mod execution_engine;
pub mod gas_schedule;
pub mod instruction;
pub mod limits;
pub mod op_code;
pub mod ops;
pub mod script_builder;
pub mod stack_item;
pub mod vm_state;

pub use error::{VmError, VmResult};
pub use evaluation_stack::EvaluationStack;
pub use execution_context::{ExecutionContext, FrameKind};
pub use execution_engine::ExecutionEngine;
pub use gas_schedule::{opcode_price, GasMeter, PUSH_GAS};
pub use instruction::Instruction;
pub use op_code::{OpCode, OperandSize};
pub use script_builder::ScriptBuilder;
pub use stack_item::{
    bytes_to_int, check_int_size, int_to_bytes, InteropInterface, StackItem, VmMap,
};
pub use vm_state::VMState;
