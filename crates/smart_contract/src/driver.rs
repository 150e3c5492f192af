//! The execution driver: the metered outer loop of one invocation.
//!
//! The driver owns the VM, the contract call stack, the state overlay and
//! the notification buffer for the duration of one transaction. Per step it
//! enforces the step ceiling, the stack bound and the gas meter, then
//! dispatches on opcode class: SYSCALL through the service registry,
//! APPCALL/TAILCALL through contract resolution, the container-bound
//! signature checks against the transaction hash, everything else straight
//! into the interpreter. On failure the overlay and the buffer are dropped
//! whole; gas already charged stays charged.

use crate::chain;
use crate::context_stack::{ContextStack, ContractContext};
use crate::host::{InteropHost, TriggerType};
use crate::native::NativeRegistry;
use crate::notify::{NotificationBuffer, NotifyEvent};
use crate::service::ServiceRegistry;
use bytes::Bytes;
use log::debug;
use onyx_core::{Address, CodeContainer, Header};
use onyx_persistence::{CacheDb, ReadStore};
use onyx_vm::limits::MAX_STEP_COUNT;
use onyx_vm::ops::crypto::check_signature;
use onyx_vm::{
    opcode_price, ExecutionEngine, FrameKind, GasMeter, Instruction, OpCode, StackItem, VMState,
    VmError, VmResult, PUSH_GAS,
};
use std::sync::Arc;

/// The two execution modes fixed at invocation creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecMode {
    /// Consensus execution: gas is the only ceiling.
    Consensus,
    /// Preview execution (pre-execution, RPC): additionally step-limited.
    PreExec,
}

/// Everything a successful execution leaves behind.
#[derive(Debug)]
pub struct ExecutionOutcome {
    /// Top of the evaluation stack at halt, if any.
    pub result: Option<StackItem>,
    /// Gas consumed, including work done before any failure.
    pub gas_consumed: u64,
    /// Emitted notifications, in emission order.
    pub notifications: Vec<NotifyEvent>,
    /// The uncommitted state overlay; the caller applies or drops it.
    pub state_delta: CacheDb,
}

/// Drives one invocation to halt or failure.
pub struct ExecutionDriver {
    engine: ExecutionEngine,
    host: InteropHost,
    gas: GasMeter,
    mode: ExecMode,
    steps: u32,
}

impl ExecutionDriver {
    /// Creates a driver over a fresh overlay forked from `store`.
    pub fn new(
        tx: Arc<dyn CodeContainer>,
        header: Header,
        store: Arc<dyn ReadStore>,
        natives: Arc<NativeRegistry>,
        trigger: TriggerType,
        mode: ExecMode,
        gas_limit: u64,
    ) -> Self {
        Self {
            engine: ExecutionEngine::new(),
            host: InteropHost {
                tx,
                header,
                cache: CacheDb::new(store),
                contexts: ContextStack::new(),
                notifications: NotificationBuffer::new(),
                natives,
                trigger,
            },
            gas: GasMeter::new(gas_limit),
            mode,
            steps: 0,
        }
    }

    /// Runs `code` to completion.
    pub fn run(mut self, code: &[u8]) -> Result<ExecutionOutcome, VmError> {
        let code = Bytes::copy_from_slice(code);
        self.engine.load_entry(code.clone());
        self.host
            .contexts
            .push(ContractContext::new(Address::from_code(&code), code, 0))?;

        match self.step_loop() {
            Ok(()) => Ok(ExecutionOutcome {
                result: self.engine.take_result(),
                gas_consumed: self.gas.consumed(),
                notifications: self.host.notifications.into_events(),
                state_delta: self.host.cache,
            }),
            Err(error) => {
                self.engine.set_fault();
                debug!(
                    target: "smart_contract",
                    "execution failed after {} gas: {error}",
                    self.gas.consumed()
                );
                Err(error)
            }
        }
    }

    fn step_loop(&mut self) -> VmResult<()> {
        loop {
            match self.engine.state() {
                VMState::Halt => return Ok(()),
                VMState::Fault => return Err(VmError::fault("engine is faulted")),
                VMState::None => {}
            }
            if self.engine.frame_count() == 0 {
                return Ok(());
            }
            if self.engine.current_frame()?.ip_past_end() {
                self.engine.unload_frame()?;
                self.handle_frame_exit();
                continue;
            }

            if self.mode == ExecMode::PreExec {
                self.steps += 1;
                if self.steps > MAX_STEP_COUNT {
                    return Err(VmError::StepLimitExceeded {
                        limit: MAX_STEP_COUNT,
                    });
                }
            }

            let instruction = self.engine.current_frame_mut()?.fetch()?;
            self.engine.check_stack_size(instruction.opcode)?;

            let cost = if instruction.opcode.is_push() {
                PUSH_GAS
            } else {
                opcode_price(instruction.opcode)
            };
            self.gas.charge(cost)?;

            match instruction.opcode {
                OpCode::SYSCALL => self.dispatch_syscall(&instruction)?,
                OpCode::APPCALL => self.dispatch_appcall(&instruction, false)?,
                OpCode::TAILCALL => self.dispatch_appcall(&instruction, true)?,
                OpCode::CHECKSIG => self.checksig()?,
                OpCode::CHECKMULTISIG => self.checkmultisig()?,
                _ => self.engine.execute_instruction(&instruction)?,
            }
            self.handle_frame_exit();
        }
    }

    /// Keeps the contract call stack in step with VM frame exits.
    fn handle_frame_exit(&mut self) {
        if let Some(kind) = self.engine.take_frame_exit() {
            if kind == FrameKind::AppCall {
                if let Some(context) = self.host.contexts.pop() {
                    debug!(
                        target: "smart_contract",
                        "contract {} returned after emitting {} notifications",
                        context.contract_address,
                        self.host.notifications.len() - context.notifications_offset
                    );
                }
            }
        }
    }

    fn dispatch_syscall(&mut self, instruction: &Instruction) -> VmResult<()> {
        let name = std::str::from_utf8(&instruction.operand)
            .map_err(|_| VmError::fault("service name is not valid UTF-8"))?
            .to_owned();
        ServiceRegistry::global().dispatch(&name, &mut self.host, &mut self.engine, &mut self.gas)
    }

    fn dispatch_appcall(&mut self, instruction: &Instruction, tail: bool) -> VmResult<()> {
        // A zero operand means the target address comes from the stack.
        let target = if instruction.operand.iter().all(|&byte| byte == 0) {
            let bytes = self.engine.pop_bytes()?;
            Address::from_bytes(&bytes).map_err(|e| VmError::fault(e.to_string()))?
        } else {
            Address::from_bytes(&instruction.operand)
                .map_err(|e| VmError::fault(e.to_string()))?
        };

        let contract = chain::get_contract(&self.host.cache, &target)?
            .ok_or_else(|| VmError::contract_not_found(target.to_string()))?;
        let code = Bytes::from(contract.code);

        self.engine.load_app_frame(code.clone(), tail)?;
        if tail {
            self.host.contexts.pop();
        }
        self.host.contexts.push(ContractContext::new(
            target,
            code,
            self.host.notifications.len(),
        ))?;
        Ok(())
    }

    /// CHECKSIG: verify one signature over the transaction hash.
    fn checksig(&mut self) -> VmResult<()> {
        let pubkey = self.engine.pop_bytes()?;
        let signature = self.engine.pop_bytes()?;
        let message = self.host.tx.container_hash().to_vec();
        let verdict = check_signature(&message, &signature, &pubkey);
        self.engine.push(StackItem::from_bool(verdict))
    }

    /// CHECKMULTISIG: verify m-of-n signatures over the transaction hash,
    /// with signatures required in public key order.
    fn checkmultisig(&mut self) -> VmResult<()> {
        let pubkeys = self.pop_byte_vectors()?;
        let signatures = self.pop_byte_vectors()?;
        if signatures.is_empty() || signatures.len() > pubkeys.len() {
            return Err(VmError::fault(format!(
                "invalid multisig shape: {} signatures over {} keys",
                signatures.len(),
                pubkeys.len()
            )));
        }
        let message = self.host.tx.container_hash().to_vec();
        let mut key_index = 0;
        let mut matched = 0;
        for signature in &signatures {
            while key_index < pubkeys.len() {
                let verdict = check_signature(&message, signature, &pubkeys[key_index]);
                key_index += 1;
                if verdict {
                    matched += 1;
                    break;
                }
            }
        }
        self.engine
            .push(StackItem::from_bool(matched == signatures.len()))
    }

    /// Pops either an array of byte strings or a count followed by that many
    /// byte strings.
    fn pop_byte_vectors(&mut self) -> VmResult<Vec<Vec<u8>>> {
        let top = self.engine.pop()?;
        match &top {
            StackItem::Array(_) | StackItem::Struct(_) => top
                .as_array()?
                .borrow()
                .iter()
                .map(|item| item.as_bytes())
                .collect(),
            _ => {
                let count: usize = top
                    .as_int()?
                    .try_into()
                    .map_err(|_| VmError::fault("invalid multisig count"))?;
                if count == 0 || count > 1024 {
                    return Err(VmError::fault(format!("multisig count {count} out of range")));
                }
                let mut items = Vec::with_capacity(count);
                for _ in 0..count {
                    items.push(self.engine.pop_bytes()?);
                }
                Ok(items)
            }
        }
    }
}

/// Executes `code` against a snapshot of world state.
///
/// On halt the caller receives the result, the gas bill, the ordered
/// notifications and the uncommitted state overlay. On failure nothing of
/// the execution is observable.
#[allow(clippy::too_many_arguments)]
pub fn execute(
    tx: Arc<dyn CodeContainer>,
    header: Header,
    store: Arc<dyn ReadStore>,
    natives: Arc<NativeRegistry>,
    trigger: TriggerType,
    mode: ExecMode,
    code: &[u8],
    gas_limit: u64,
) -> Result<ExecutionOutcome, VmError> {
    ExecutionDriver::new(tx, header, store, natives, trigger, mode, gas_limit).run(code)
}
