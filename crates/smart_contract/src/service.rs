//! The named service table behind SYSCALL.
//!
//! The registry is built once at process start from a static table and never
//! mutated afterwards, so it can be shared read-only across parallel
//! executions. Dispatch order is fixed: resolve, validate, price, charge,
//! effect. The validator never mutates anything; gas is charged before the
//! effect runs, and a failed charge means the effect never runs.

use crate::host::InteropHost;
use crate::interop;
use crate::native;
use once_cell::sync::Lazy;
use onyx_vm::{ExecutionEngine, GasMeter, VmError, VmResult};
use std::collections::HashMap;

/// Checks operand shapes on the stack without mutating anything.
pub type ServiceValidator = fn(&ExecutionEngine) -> VmResult<()>;

/// Applies the service against the host and the engine.
pub type ServiceEffect = fn(&mut InteropHost, &mut ExecutionEngine) -> VmResult<()>;

/// Computes the gas price from the (already validated) stack shape.
pub type ServicePrice = fn(&ExecutionEngine) -> u64;

/// One named host service.
pub struct Service {
    pub name: &'static str,
    pub validator: ServiceValidator,
    pub effect: ServiceEffect,
    pub price: ServicePrice,
}

/// The process-lifetime service table.
pub struct ServiceRegistry {
    services: HashMap<&'static str, Service>,
}

static REGISTRY: Lazy<ServiceRegistry> = Lazy::new(ServiceRegistry::build);

impl ServiceRegistry {
    /// The shared registry instance.
    pub fn global() -> &'static ServiceRegistry {
        &REGISTRY
    }

    fn build() -> Self {
        let mut services = HashMap::new();
        for service in interop::runtime::services()
            .into_iter()
            .chain(interop::blockchain::services())
            .chain(interop::accessors::services())
            .chain(interop::contract::services())
            .chain(interop::storage::services())
            .chain(native::services())
        {
            services.insert(service.name, service);
        }
        Self { services }
    }

    /// Looks up a service by name.
    pub fn get(&self, name: &str) -> Option<&Service> {
        self.services.get(name)
    }

    /// Returns every registered name, for diagnostics.
    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.services.keys().copied()
    }

    /// Runs a SYSCALL end to end.
    pub fn dispatch(
        &self,
        name: &str,
        host: &mut InteropHost,
        engine: &mut ExecutionEngine,
        gas: &mut GasMeter,
    ) -> VmResult<()> {
        let service = self
            .get(name)
            .ok_or_else(|| VmError::unsupported_service(name))?;
        (service.validator)(engine)?;
        let price = (service.price)(engine);
        gas.charge(price)?;
        (service.effect)(host, engine)
    }
}

/// A validator for services that take no stack operands.
pub fn no_operands(_engine: &ExecutionEngine) -> VmResult<()> {
    Ok(())
}

/// A validator requiring at least `count` items on the evaluation stack.
pub fn require_stack(engine: &ExecutionEngine, count: usize) -> VmResult<()> {
    let available = engine.current_frame()?.evaluation_stack.len();
    if available < count {
        return Err(VmError::fault(format!(
            "service needs {count} stack items, {available} available"
        )));
    }
    Ok(())
}

/// The flat one-gas price shared by the cheap services.
pub fn flat_price(_engine: &ExecutionEngine) -> u64 {
    1
}
