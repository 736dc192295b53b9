//! End-to-end scenarios from spec §8 (S1-S7): linear success, guarded
//! routing, retry with backoff, step-level guard skip, STOP on guard
//! failure, static cycle detection, and edge-ordering validation.

use async_trait::async_trait;
use flowguard::component::{Guard, Step};
use flowguard::context::{Context, Value};
use flowguard::injector::InjectedValues;
use flowguard::step_result::StepResult;
use flowguard::{Config, Engine, Registry};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

struct AddX;
#[async_trait]
impl Step for AddX {
    async fn execute(&self, _ctx: &Context) -> StepResult {
        StepResult::success().with_delta("x", Value::Int(1))
    }
}

struct AddYFromX;
#[async_trait]
impl Step for AddYFromX {
    async fn execute(&self, ctx: &Context) -> StepResult {
        let x = ctx.get_int_or("x", 0);
        StepResult::success().with_delta("y", Value::Int(x + 1))
    }
}

#[tokio::test]
async fn s1_linear_success_accumulates_context() {
    let yaml = r#"
steps:
  a:
    type: AddX
  b:
    type: AddYFromX
workflows:
  w:
    root: a
    edges:
      - from: a
        to: b
      - from: b
        to: SUCCESS
"#;
    let config = Config::from_str(yaml).unwrap();
    let mut registry = Registry::new();
    registry.register_step(
        flowguard::registry::Registration::new("AddX"),
        |_: &InjectedValues| Box::new(AddX) as Box<dyn Step>,
    );
    registry.register_step(
        flowguard::registry::Registration::new("AddYFromX"),
        |_: &InjectedValues| Box::new(AddYFromX) as Box<dyn Step>,
    );

    let engine = Engine::builder(config, registry).build().unwrap();
    let mut ctx = Context::new();
    let result = engine.run_to_completion("w", &mut ctx).await;

    assert!(result.is_success());
    assert_eq!(ctx.get_int("x"), Some(1));
    assert_eq!(ctx.get_int("y"), Some(2));
}

struct NoopStep;
#[async_trait]
impl Step for NoopStep {
    async fn execute(&self, _ctx: &Context) -> StepResult {
        StepResult::success()
    }
}

struct AlwaysFalseGuard;
#[async_trait]
impl Guard for AlwaysFalseGuard {
    async fn evaluate(&self, _ctx: &Context) -> bool {
        false
    }
}

#[tokio::test]
async fn s2_guard_routes_to_alternative_on_skip() {
    let yaml = r#"
steps:
  p:
    type: Noop
  premium:
    type: Noop
  standard:
    type: Noop
workflows:
  w:
    root: p
    edges:
      - from: p
        to: premium
        guard: VIP
        onFailure: { strategy: SKIP }
      - from: p
        to: standard
      - from: premium
        to: SUCCESS
      - from: standard
        to: SUCCESS
"#;
    let config = Config::from_str(yaml).unwrap();
    let mut registry = Registry::new();
    registry.register_step(
        flowguard::registry::Registration::new("Noop"),
        |_: &InjectedValues| Box::new(NoopStep) as Box<dyn Step>,
    );
    registry.register_guard(
        flowguard::registry::Registration::new("VIP"),
        |_: &InjectedValues| Box::new(AlwaysFalseGuard) as Box<dyn Guard>,
    );

    let engine = Engine::builder(config, registry).build().unwrap();
    let mut ctx = Context::new();
    let result = engine.run_to_completion("w", &mut ctx).await;

    assert!(result.is_success());
}

struct FlakyStep {
    attempts: Arc<AtomicU32>,
}
#[async_trait]
impl Step for FlakyStep {
    async fn execute(&self, _ctx: &Context) -> StepResult {
        let n = self.attempts.fetch_add(1, Ordering::SeqCst) + 1;
        if n < 3 {
            StepResult::failure(format!("attempt {n} failed"))
        } else {
            StepResult::success()
        }
    }
}

#[tokio::test]
async fn s3_retry_with_exponential_backoff_succeeds_on_third_attempt() {
    let yaml = r#"
steps:
  q:
    type: Flaky
    retry: { maxAttempts: 3, delay: 10, backoff: EXPONENTIAL, multiplier: 2.0 }
workflows:
  w:
    root: q
    edges:
      - from: q
        to: SUCCESS
"#;
    let config = Config::from_str(yaml).unwrap();
    let attempts = Arc::new(AtomicU32::new(0));
    let attempts_for_factory = Arc::clone(&attempts);
    let mut registry = Registry::new();
    registry.register_step(
        flowguard::registry::Registration::new("Flaky"),
        move |_: &InjectedValues| {
            Box::new(FlakyStep {
                attempts: Arc::clone(&attempts_for_factory),
            }) as Box<dyn Step>
        },
    );

    let engine = Engine::builder(config, registry).build().unwrap();
    let mut ctx = Context::new();
    let started = std::time::Instant::now();
    let result = engine.run_to_completion("w", &mut ctx).await;
    let elapsed = started.elapsed();

    assert!(result.is_success());
    assert_eq!(attempts.load(Ordering::SeqCst), 3);
    // two sleeps of ~10ms and ~20ms between three attempts.
    assert!(elapsed.as_millis() >= 25, "elapsed={elapsed:?}");
}

struct PanicIfRunStep;
#[async_trait]
impl Step for PanicIfRunStep {
    async fn execute(&self, _ctx: &Context) -> StepResult {
        panic!("step-level guard should have skipped this step");
    }
}

#[tokio::test]
async fn s4_step_level_guard_failure_skips_not_fails() {
    let yaml = r#"
steps:
  v:
    type: PanicIfRun
    guards: [G]
  after:
    type: Noop
workflows:
  w:
    root: v
    edges:
      - from: v
        to: after
      - from: after
        to: SUCCESS
"#;
    let config = Config::from_str(yaml).unwrap();
    let mut registry = Registry::new();
    registry.register_step(
        flowguard::registry::Registration::new("PanicIfRun"),
        |_: &InjectedValues| Box::new(PanicIfRunStep) as Box<dyn Step>,
    );
    registry.register_step(
        flowguard::registry::Registration::new("Noop"),
        |_: &InjectedValues| Box::new(NoopStep) as Box<dyn Step>,
    );
    registry.register_guard(
        flowguard::registry::Registration::new("G"),
        |_: &InjectedValues| Box::new(AlwaysFalseGuard) as Box<dyn Guard>,
    );

    let engine = Engine::builder(config, registry).build().unwrap();
    let mut ctx = Context::new();
    let result = engine.run_to_completion("w", &mut ctx).await;

    assert!(result.is_success());
}

#[tokio::test]
async fn s5_stop_on_guard_failure_produces_failure_with_edge_context() {
    let yaml = r#"
steps:
  p:
    type: Noop
  c:
    type: Noop
workflows:
  w:
    root: p
    edges:
      - from: p
        to: c
        guard: G
        onFailure: { strategy: STOP }
"#;
    let config = Config::from_str(yaml).unwrap();
    let mut registry = Registry::new();
    registry.register_step(
        flowguard::registry::Registration::new("Noop"),
        |_: &InjectedValues| Box::new(NoopStep) as Box<dyn Step>,
    );
    registry.register_guard(
        flowguard::registry::Registration::new("G"),
        |_: &InjectedValues| Box::new(AlwaysFalseGuard) as Box<dyn Guard>,
    );

    let engine = Engine::builder(config, registry).build().unwrap();
    let mut ctx = Context::new();
    let result = engine.run_to_completion("w", &mut ctx).await;

    assert!(result.is_failure());
    assert!(result
        .message
        .as_deref()
        .unwrap()
        .contains("Edge guard failed with STOP for edge: p -> c"));
}

#[test]
fn s6_cycle_detection_reports_canonical_rotation() {
    let yaml = r#"
steps:
  a:
    type: Noop
  b:
    type: Noop
  c:
    type: Noop
workflows:
  w:
    root: a
    edges:
      - from: a
        to: b
      - from: b
        to: c
      - from: c
        to: a
"#;
    let config = Config::from_str(yaml).unwrap();
    let result = flowguard::validator::ValidatorRegistry::with_builtins().validate(&config);

    assert!(!result.is_valid());
    let cycle_errors: Vec<_> = result
        .errors
        .iter()
        .filter(|e| e.error_type == flowguard::validator::ErrorType::CycleDetected)
        .collect();
    assert_eq!(cycle_errors.len(), 1);

    let path = cycle_errors[0]
        .details
        .get("cyclePath")
        .expect("cyclePath detail present");
    let path_vec: Vec<&str> = path.split(" -> ").collect();
    assert_eq!(path_vec.first(), path_vec.last());
    assert_eq!(path_vec.len(), 4);
}

#[test]
fn s7_unguarded_edge_not_last_is_flagged() {
    let yaml = r#"
steps:
  process:
    type: Noop
  notify:
    type: Noop
  audit:
    type: Noop
workflows:
  w:
    root: process
    edges:
      - from: process
        to: notify
      - from: process
        to: audit
        guard: G
"#;
    let config = Config::from_str(yaml).unwrap();
    let result = flowguard::validator::ValidatorRegistry::with_builtins().validate(&config);

    assert!(!result.is_valid());
    assert!(result.errors.iter().any(|e| e.error_type
        == flowguard::validator::ErrorType::UnguardedEdgeNotLast
        && e.workflow_name.as_deref() == Some("w")));
}
