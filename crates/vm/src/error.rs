//! Error taxonomy for the execution core.
//!
//! Every abort reason that can surface from an execution is one of these
//! variants; nothing inside the VM recovers from them. A bad signature is
//! deliberately not an error: the signature opcodes push `false` instead.

use onyx_core::CoreError;
use thiserror::Error;

/// Failure kinds that abort an execution.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VmError {
    /// A gas charge exceeded the remaining balance
    #[error("insufficient gas: charge {charge} exceeds remaining {remaining}")]
    InsufficientGas { charge: u64, remaining: u64 },

    /// The preview-mode step ceiling was reached
    #[error("step limit exceeded: {limit} steps")]
    StepLimitExceeded { limit: u32 },

    /// The combined stack size passed the hard cap
    #[error("stack overflow: {size} items exceeds limit {limit}")]
    StackOverflow { size: usize, limit: usize },

    /// Nested call depth passed the hard cap
    #[error("context overflow: depth {depth} exceeds limit {limit}")]
    ContextOverflow { depth: usize, limit: usize },

    /// An arithmetic result would not fit the canonical integer width
    #[error("integer overflow: encoded result exceeds {limit} bytes")]
    IntegerOverflow { limit: usize },

    /// Malformed bytecode, type errors, division by zero, bad indexes
    #[error("fault: {reason}")]
    Fault { reason: String },

    /// A SYSCALL named a service that is not registered
    #[error("unsupported service: {name}")]
    UnsupportedService { name: String },

    /// A state operation was attempted without the required capability
    #[error("permission denied: {reason}")]
    PermissionDenied { reason: String },

    /// An APPCALL or lookup targeted an address with no contract
    #[error("contract not found: {address}")]
    ContractNotFound { address: String },

    /// A cyclic or unsupported item reached the canonical serializer
    #[error("serialization error: {reason}")]
    SerializationError { reason: String },
}

impl VmError {
    /// Creates a new fault.
    pub fn fault<S: Into<String>>(reason: S) -> Self {
        Self::Fault {
            reason: reason.into(),
        }
    }

    /// Creates a new insufficient gas error.
    pub fn insufficient_gas(charge: u64, remaining: u64) -> Self {
        Self::InsufficientGas { charge, remaining }
    }

    /// Creates a new stack overflow error against the given limit.
    pub fn stack_overflow(size: usize, limit: usize) -> Self {
        Self::StackOverflow { size, limit }
    }

    /// Creates a new context overflow error against the given limit.
    pub fn context_overflow(depth: usize, limit: usize) -> Self {
        Self::ContextOverflow { depth, limit }
    }

    /// Creates a new integer overflow error.
    pub fn integer_overflow(limit: usize) -> Self {
        Self::IntegerOverflow { limit }
    }

    /// Creates a new unsupported service error.
    pub fn unsupported_service<S: Into<String>>(name: S) -> Self {
        Self::UnsupportedService { name: name.into() }
    }

    /// Creates a new permission denied error.
    pub fn permission_denied<S: Into<String>>(reason: S) -> Self {
        Self::PermissionDenied {
            reason: reason.into(),
        }
    }

    /// Creates a new contract not found error.
    pub fn contract_not_found<S: Into<String>>(address: S) -> Self {
        Self::ContractNotFound {
            address: address.into(),
        }
    }

    /// Creates a new serialization error.
    pub fn serialization<S: Into<String>>(reason: S) -> Self {
        Self::SerializationError {
            reason: reason.into(),
        }
    }

    /// Returns true for the resource-ceiling variants.
    pub fn is_resource_limit(&self) -> bool {
        matches!(
            self,
            VmError::InsufficientGas { .. }
                | VmError::StepLimitExceeded { .. }
                | VmError::StackOverflow { .. }
                | VmError::ContextOverflow { .. }
        )
    }
}

/// Result type for VM operations.
pub type VmResult<T> = std::result::Result<T, VmError>;

impl From<CoreError> for VmError {
    fn from(error: CoreError) -> Self {
        VmError::fault(error.to_string())
    }
}
