//! Execution engine for the ScriptVM.
//!
//! The engine owns the frame stack and executes one opcode at a time through
//! the jump table. Metering (gas, step counts) and anything that needs the
//! outside world (SYSCALL, APPCALL, container-bound signature checks) belong
//! to the driver in the contract layer; scripts that stay inside pure opcode
//! territory can run to completion with [`ExecutionEngine::execute`].

use crate::error::{VmError, VmResult};
use crate::execution_context::{ExecutionContext, FrameKind};
use crate::instruction::Instruction;
use crate::limits::{MAX_CONTEXT_DEPTH, MAX_STACK_SIZE};
use crate::op_code::OpCode;
use crate::ops;
use crate::stack_item::StackItem;
use crate::vm_state::VMState;
use bytes::Bytes;
use num_bigint::BigInt;
use num_traits::ToPrimitive;

/// The virtual machine: a stack of frames and a state flag.
#[derive(Default)]
pub struct ExecutionEngine {
    state: VMState,
    frames: Vec<ExecutionContext>,
    result: Option<StackItem>,
    last_exit: Option<FrameKind>,
}

impl ExecutionEngine {
    /// Creates an engine with no frames loaded.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the current state.
    pub fn state(&self) -> VMState {
        self.state
    }

    /// Marks the engine faulted.
    pub fn set_fault(&mut self) {
        self.state = VMState::Fault;
    }

    /// Returns the number of live frames.
    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    /// Loads the outermost frame. Must be called exactly once per engine.
    pub fn load_entry(&mut self, code: Bytes) {
        self.frames.push(ExecutionContext::new(code, FrameKind::Entry));
    }

    /// Borrows the frame currently executing.
    pub fn current_frame(&self) -> VmResult<&ExecutionContext> {
        self.frames
            .last()
            .ok_or_else(|| VmError::fault("no active frame"))
    }

    /// Mutably borrows the frame currently executing.
    pub fn current_frame_mut(&mut self) -> VmResult<&mut ExecutionContext> {
        self.frames
            .last_mut()
            .ok_or_else(|| VmError::fault("no active frame"))
    }

    /// Pushes an item onto the current evaluation stack.
    pub fn push(&mut self, item: StackItem) -> VmResult<()> {
        self.current_frame_mut()?.evaluation_stack.push(item);
        Ok(())
    }

    /// Pops the top item of the current evaluation stack.
    pub fn pop(&mut self) -> VmResult<StackItem> {
        self.current_frame_mut()?.evaluation_stack.pop()
    }

    /// Pops and converts to an integer.
    pub fn pop_int(&mut self) -> VmResult<BigInt> {
        self.pop()?.as_int()
    }

    /// Pops and converts to a boolean.
    pub fn pop_bool(&mut self) -> VmResult<bool> {
        Ok(self.pop()?.as_bool())
    }

    /// Pops and converts to canonical bytes.
    pub fn pop_bytes(&mut self) -> VmResult<Vec<u8>> {
        self.pop()?.as_bytes()
    }

    /// Pops a non-negative integer small enough to index with.
    pub fn pop_index(&mut self) -> VmResult<usize> {
        let value = self.pop_int()?;
        value
            .to_usize()
            .ok_or_else(|| VmError::fault(format!("{value} is not a valid index or count")))
    }

    /// Borrows the item at `depth` from the top of the current stack.
    pub fn peek(&self, depth: usize) -> VmResult<&StackItem> {
        self.current_frame()?.evaluation_stack.peek(depth)
    }

    /// Total items across every frame's evaluation and alt stacks.
    pub fn total_stack_size(&self) -> usize {
        self.frames.iter().map(|frame| frame.stack_size()).sum()
    }

    /// Predicted stack growth of an opcode, used by the pre-execution size
    /// check. `UNPACK` is charged by the element count of the array it is
    /// about to spread; other growing opcodes count one.
    pub fn stack_increase(&self, opcode: OpCode) -> usize {
        if opcode.is_push() {
            return 1;
        }
        match opcode {
            OpCode::UNPACK => self
                .current_frame()
                .ok()
                .and_then(|frame| frame.evaluation_stack.peek(0).ok())
                .and_then(|top| top.size().ok())
                .unwrap_or(1),
            OpCode::DUP
            | OpCode::OVER
            | OpCode::PICK
            | OpCode::TUCK
            | OpCode::XTUCK
            | OpCode::DEPTH
            | OpCode::DUPFROMALTSTACK
            | OpCode::NEWARRAY
            | OpCode::NEWSTRUCT
            | OpCode::NEWMAP => 1,
            _ => 0,
        }
    }

    /// Enforces the stack bound an instruction must not break.
    pub fn check_stack_size(&self, opcode: OpCode) -> VmResult<()> {
        let predicted = self.total_stack_size() + self.stack_increase(opcode);
        if predicted > MAX_STACK_SIZE {
            return Err(VmError::stack_overflow(predicted, MAX_STACK_SIZE));
        }
        Ok(())
    }

    /// Pushes an intra-contract CALL frame. The caller's stacks move into
    /// the new frame and come back when it returns.
    pub(crate) fn push_call_frame(&mut self, target: usize) -> VmResult<()> {
        if self.frames.len() >= MAX_CONTEXT_DEPTH {
            return Err(VmError::context_overflow(
                self.frames.len() + 1,
                MAX_CONTEXT_DEPTH,
            ));
        }
        let caller = self.current_frame_mut()?;
        let mut frame = ExecutionContext::new(caller.code_handle(), FrameKind::Call);
        frame.evaluation_stack = std::mem::take(&mut caller.evaluation_stack);
        frame.alt_stack = std::mem::take(&mut caller.alt_stack);
        frame.set_ip(target)?;
        self.frames.push(frame);
        Ok(())
    }

    /// Pushes (or, for a tail call, replaces with) a nested-contract frame.
    /// The child starts from a copy of the caller's evaluation stack.
    pub fn load_app_frame(&mut self, code: Bytes, tail: bool) -> VmResult<()> {
        let (stack_copy, caller_kind) = {
            let caller = self.current_frame()?;
            (caller.evaluation_stack.clone(), caller.kind())
        };
        let kind = if tail { caller_kind } else { FrameKind::AppCall };
        let mut frame = ExecutionContext::new(code, kind);
        frame.evaluation_stack = stack_copy;
        if tail {
            self.frames.pop();
        } else if self.frames.len() >= MAX_CONTEXT_DEPTH {
            return Err(VmError::context_overflow(
                self.frames.len() + 1,
                MAX_CONTEXT_DEPTH,
            ));
        }
        self.frames.push(frame);
        Ok(())
    }

    /// Pops the current frame and applies its return semantics.
    pub fn unload_frame(&mut self) -> VmResult<()> {
        let mut frame = self
            .frames
            .pop()
            .ok_or_else(|| VmError::fault("no frame to unload"))?;
        self.last_exit = Some(frame.kind());
        match frame.kind() {
            FrameKind::Entry => {
                self.result = frame.evaluation_stack.pop().ok();
                self.state = VMState::Halt;
            }
            FrameKind::Call => {
                let caller = self
                    .frames
                    .last_mut()
                    .ok_or_else(|| VmError::fault("call frame without a caller"))?;
                caller.evaluation_stack = frame.evaluation_stack;
                caller.alt_stack = frame.alt_stack;
            }
            FrameKind::AppCall => {
                let returned = frame.evaluation_stack.pop().ok();
                let caller = self
                    .frames
                    .last_mut()
                    .ok_or_else(|| VmError::fault("nested frame without a caller"))?;
                if let Some(item) = returned {
                    caller.evaluation_stack.push(item);
                }
            }
        }
        Ok(())
    }

    /// Takes the kind of the frame that exited during the last step, if any.
    pub fn take_frame_exit(&mut self) -> Option<FrameKind> {
        self.last_exit.take()
    }

    /// Executes a single already-fetched instruction.
    pub fn execute_instruction(&mut self, instruction: &Instruction) -> VmResult<()> {
        ops::execute(self, instruction)
    }

    /// Runs a pure script to completion, without gas or host services.
    ///
    /// Applies the stack-size rule before every instruction. Any opcode that
    /// needs the host environment faults; the contract layer's driver is the
    /// loop that can serve those.
    pub fn execute(&mut self) -> VmResult<()> {
        let outcome = self.run_loop();
        if outcome.is_err() {
            self.state = VMState::Fault;
        }
        outcome
    }

    fn run_loop(&mut self) -> VmResult<()> {
        loop {
            match self.state {
                VMState::Halt => return Ok(()),
                VMState::Fault => return Err(VmError::fault("engine is faulted")),
                VMState::None => {}
            }
            if self.frames.is_empty() {
                self.state = VMState::Halt;
                return Ok(());
            }
            if self.current_frame()?.ip_past_end() {
                self.unload_frame()?;
                continue;
            }
            let instruction = self.current_frame_mut()?.fetch()?;
            self.check_stack_size(instruction.opcode)?;
            self.execute_instruction(&instruction)?;
            self.last_exit.take();
        }
    }

    /// The value left for the caller after a halt, if any.
    pub fn result(&self) -> Option<&StackItem> {
        self.result.as_ref()
    }

    /// Takes ownership of the halt result.
    pub fn take_result(&mut self) -> Option<StackItem> {
        self.result.take()
    }
}
