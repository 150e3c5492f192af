//! Execution context (frame) for the ScriptVM.

use crate::error::{VmError, VmResult};
use crate::evaluation_stack::EvaluationStack;
use crate::instruction::Instruction;
use bytes::Bytes;

/// How a frame was entered, which decides what happens when it returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameKind {
    /// The outermost frame of the invocation.
    Entry,
    /// An intra-contract CALL; stacks travel with the frame and return to
    /// the caller.
    Call,
    /// A nested contract invocation; at most one result is handed back.
    AppCall,
}

/// One frame of the bytecode call stack: a code buffer, an instruction
/// pointer, and the operand stacks.
pub struct ExecutionContext {
    code: Bytes,
    /// Instruction pointer; advances past every consumed operand byte.
    pub ip: usize,
    pub evaluation_stack: EvaluationStack,
    pub alt_stack: EvaluationStack,
    kind: FrameKind,
}

impl ExecutionContext {
    /// Creates a frame at the start of `code`.
    pub fn new(code: Bytes, kind: FrameKind) -> Self {
        Self {
            code,
            ip: 0,
            evaluation_stack: EvaluationStack::new(),
            alt_stack: EvaluationStack::new(),
            kind,
        }
    }

    /// Borrows the code buffer.
    pub fn code(&self) -> &[u8] {
        &self.code
    }

    /// Returns a cheap handle to the code buffer.
    pub fn code_handle(&self) -> Bytes {
        self.code.clone()
    }

    /// Returns how this frame was entered.
    pub fn kind(&self) -> FrameKind {
        self.kind
    }

    /// True once the instruction pointer has advanced past the last byte;
    /// the frame is then returning.
    pub fn ip_past_end(&self) -> bool {
        self.ip >= self.code.len()
    }

    /// Decodes the instruction at the current pointer and advances past it.
    pub fn fetch(&mut self) -> VmResult<Instruction> {
        let instruction = Instruction::parse(&self.code, self.ip)?;
        self.ip = instruction.pointer + instruction.size();
        Ok(instruction)
    }

    /// Moves the instruction pointer to an absolute position. A target equal
    /// to the code length is allowed and makes the frame return.
    pub fn set_ip(&mut self, target: usize) -> VmResult<()> {
        if target > self.code.len() {
            return Err(VmError::fault(format!(
                "jump target {target} outside code of length {}",
                self.code.len()
            )));
        }
        self.ip = target;
        Ok(())
    }

    /// Total items held by this frame's two stacks.
    pub fn stack_size(&self) -> usize {
        self.evaluation_stack.len() + self.alt_stack.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::op_code::OpCode;

    #[test]
    fn test_fetch_advances_past_operand() {
        let code = Bytes::from_static(&[0x02, 0xAA, 0xBB, 0x93]);
        let mut frame = ExecutionContext::new(code, FrameKind::Entry);
        let first = frame.fetch().unwrap();
        assert_eq!(first.opcode, OpCode::PUSHBYTES2);
        assert_eq!(frame.ip, 3);
        let second = frame.fetch().unwrap();
        assert_eq!(second.opcode, OpCode::ADD);
        assert!(frame.ip_past_end());
    }

    #[test]
    fn test_set_ip_bounds() {
        let code = Bytes::from_static(&[0x61, 0x61]);
        let mut frame = ExecutionContext::new(code, FrameKind::Entry);
        assert!(frame.set_ip(2).is_ok());
        assert!(frame.ip_past_end());
        assert!(frame.set_ip(3).is_err());
    }
}
