//! Contract host environment and execution driver.
//!
//! The layer between the ScriptVM and the ledger: the named service table
//! behind SYSCALL, the contract call stack, the notification buffer, the
//! canonical stack item serializer, the native-contract dispatch seam and
//! the metered driver loop with its commit-or-discard semantics.

pub mod chain;
pub mod context_stack;
pub mod contract_state;
pub mod driver;
pub mod host;
pub mod interop;
pub mod interop_objects;
pub mod native;
pub mod notify;
pub mod serializer;
pub mod service;
pub mod storage;

pub use context_stack::{ContextStack, ContractContext};
pub use contract_state::ContractState;
pub use driver::{execute, ExecMode, ExecutionDriver, ExecutionOutcome};
pub use host::{InteropHost, TriggerType};
pub use native::{encode_identity_key, id_contract_address, NativeContract, NativeRegistry};
pub use notify::{NotificationBuffer, NotifyEvent};
pub use service::{Service, ServiceRegistry};
pub use storage::{StorageContext, StorageItem, StorageKey};
