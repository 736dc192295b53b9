//! Component ABI (spec §6): a Step exposes `execute`, a Guard exposes
//! `evaluate`. Both are constructible with a no-argument factory.

use crate::context::Context;
use crate::injector::{InjectedValues, InjectionSchema};
use crate::step_result::StepResult;
use async_trait::async_trait;

#[async_trait]
pub trait Step: Send + Sync {
    async fn execute(&self, ctx: &Context) -> StepResult;
}

#[async_trait]
pub trait Guard: Send + Sync {
    async fn evaluate(&self, ctx: &Context) -> bool;
}

/// No-argument construction plus injected-value binding, the Rust
/// substitute for reflective field writes (Design Notes §9; see
/// `injector` for the schema that populates `InjectedValues`).
pub trait StepFactory: Send + Sync {
    fn create(&self, injected: &InjectedValues) -> Box<dyn Step>;

    /// Declarative field bindings for this component type (spec §4.3);
    /// empty by default for components with nothing to inject.
    fn injection_schema(&self) -> InjectionSchema {
        Vec::new()
    }
}

pub trait GuardFactory: Send + Sync {
    fn create(&self, injected: &InjectedValues) -> Box<dyn Guard>;

    fn injection_schema(&self) -> InjectionSchema {
        Vec::new()
    }
}

impl<F> StepFactory for F
where
    F: Fn(&InjectedValues) -> Box<dyn Step> + Send + Sync,
{
    fn create(&self, injected: &InjectedValues) -> Box<dyn Step> {
        self(injected)
    }
}

impl<F> GuardFactory for F
where
    F: Fn(&InjectedValues) -> Box<dyn Guard> + Send + Sync,
{
    fn create(&self, injected: &InjectedValues) -> Box<dyn Guard> {
        self(injected)
    }
}
