//! Workflow interpreter (spec §4.4): the `Run` main loop, step execution
//! with retry, edge selection, and guard evaluation.

pub mod analyzer;

pub use analyzer::AnalysisReport;

use crate::config::{Config, Edge, OnFailure, GUARD_CATEGORY, STEP_CATEGORY};
use crate::context::Context;
use crate::error::EngineError;
use crate::injector;
use crate::registry::Registry;
use crate::step_result::StepResult;
use crate::validator::{Validator, ValidatorRegistry};
use std::time::Duration;
use tokio::sync::watch;

// Guard evaluation runs the component's own `evaluate(ctx)` directly: a
// panicking guard unwinds the current task like any other Rust panic,
// matching the crate's general policy of not catching panics outside
// of the synchronous validator chain (see `validator::ValidatorRegistry`).

/// Outcome of `selectNextEdge` (spec §4.4).
enum Selection {
    Next(String),
    Fail(String),
    None,
}

pub struct EngineBuilder {
    config: Config,
    registry: Registry,
    validators: ValidatorRegistry,
    fail_fast_on_construction: bool,
}

impl EngineBuilder {
    /// Append an extra validator to the built-in set (spec §4.5 is
    /// pluggable; `ValidatorRegistry::with_builtins` supplies the cycle
    /// detector and edge-ordering rules by default).
    pub fn register_validator(mut self, validator: Box<dyn Validator>) -> Self {
        self.validators.register(validator);
        self
    }

    /// Whether a construction-time validation failure aborts `build`
    /// (Design Notes §9, Open Question 1). Default `true`.
    pub fn fail_fast_on_construction(mut self, enabled: bool) -> Self {
        self.fail_fast_on_construction = enabled;
        self
    }

    pub fn build(self) -> Result<Engine, EngineError> {
        let validation = self.validators.validate(&self.config);
        if self.fail_fast_on_construction && !validation.is_valid() {
            let summary = validation
                .errors
                .iter()
                .map(|e| e.message.clone())
                .collect::<Vec<_>>()
                .join("; ");
            return Err(EngineError::Construction(summary));
        }
        Ok(Engine {
            config: self.config,
            registry: self.registry,
            validators: self.validators,
        })
    }
}

pub struct Engine {
    config: Config,
    registry: Registry,
    validators: ValidatorRegistry,
}

impl Engine {
    pub fn builder(config: Config, registry: Registry) -> EngineBuilder {
        EngineBuilder {
            config,
            registry,
            validators: ValidatorRegistry::with_builtins(),
            fail_fast_on_construction: true,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Run without an externally observable cancellation signal. The
    /// sender lives for the duration of the call, so the receiver's
    /// `changed()` never resolves spuriously from the channel closing.
    pub async fn run_to_completion(
        &self,
        workflow_name: &str,
        context: &mut Context,
    ) -> StepResult {
        let (_tx, rx) = watch::channel(false);
        self.run(workflow_name, context, rx).await
    }

    /// `Run(workflowName, context) -> StepResult` (spec §4.4).
    pub async fn run(
        &self,
        workflow_name: &str,
        context: &mut Context,
        cancel: watch::Receiver<bool>,
    ) -> StepResult {
        let workflow = match self.config.workflow(workflow_name) {
            Some(w) => w,
            None => return StepResult::failure(format!("Workflow not found: {workflow_name}")),
        };

        let mut current = workflow.root.clone();
        let mut visited = std::collections::HashSet::new();

        while current != crate::config::SUCCESS && current != crate::config::FAILURE {
            if visited.contains(&current) {
                return StepResult::failure(format!("Circular dependency detected at: {current}"));
            }
            visited.insert(current.clone());

            tracing::debug!(run_id = %context.run_id(), step = %current, "engine: executing step");
            let result = self.execute_step(&current, context, &cancel).await;
            if result.is_failure() {
                return result;
            }
            context.put_all(result.context_delta.clone());

            match self
                .select_next_edge(workflow, &current, context, &cancel)
                .await
            {
                Selection::Next(step) => current = step,
                Selection::Fail(message) => return StepResult::failure(message),
                Selection::None => {
                    return StepResult::failure(format!(
                        "No eligible transition from step: {current}"
                    ))
                }
            }
        }

        StepResult::success()
    }

    /// `executeStep` contract (spec §4.4).
    async fn execute_step(
        &self,
        step_name: &str,
        context: &Context,
        cancel: &watch::Receiver<bool>,
    ) -> StepResult {
        let step_def = match self.config.step(step_name) {
            Some(def) => def,
            None => return StepResult::failure(format!("Step not found: {step_name}")),
        };

        for guard_name in &step_def.guards {
            if !self.evaluate_guard(guard_name, context).await {
                return StepResult::success_with_message("Step skipped due to guard condition");
            }
        }

        let factory = match self.registry.find_step(&step_def.component_type) {
            Some(f) => f,
            None => {
                return StepResult::failure(format!(
                    "Step implementation not found: {}",
                    step_def.component_type
                ))
            }
        };

        let effective_config =
            self.config
                .defaults
                .effective_config(STEP_CATEGORY, step_name, &step_def.config);

        let injected = match injector::inject(
            &factory.injection_schema(),
            context,
            &effective_config,
            &self.config.settings,
        ) {
            Ok(values) => values,
            Err(err) => return StepResult::failure(err.to_string()),
        };

        let instance = factory.create(&injected);
        self.execute_with_optional_retry(
            instance.as_ref(),
            step_def.retry.as_ref(),
            context,
            cancel,
        )
        .await
    }

    /// `executeWithOptionalRetry` (spec §4.4).
    async fn execute_with_optional_retry(
        &self,
        instance: &dyn crate::component::Step,
        retry: Option<&crate::config::RetryConfig>,
        context: &Context,
        cancel: &watch::Receiver<bool>,
    ) -> StepResult {
        let attempts = retry.map(|r| r.effective_attempts()).unwrap_or(1).max(1);
        let mut last_failure: Option<StepResult> = None;

        for attempt_index in 1..=attempts {
            let result = instance.execute(context).await;
            if result.is_success() {
                return result;
            }

            let is_last = attempt_index == attempts;
            last_failure = Some(result);
            if is_last {
                break;
            }

            if let Some(retry) = retry {
                if let Some(guard_name) = &retry.guard {
                    if !self.evaluate_guard(guard_name, context).await {
                        break;
                    }
                }
                let delay = retry.compute_delay_ms(attempt_index);
                if let Err(EngineError::Interrupted) = interruptible_sleep(delay, cancel).await {
                    return StepResult::failure("Step execution failed: interrupted");
                }
            }
        }

        last_failure.unwrap_or_else(|| StepResult::failure("Step failed after retries"))
    }

    /// `selectNextEdge` (spec §4.4).
    async fn select_next_edge(
        &self,
        workflow: &crate::config::Workflow,
        current: &str,
        context: &Context,
        cancel: &watch::Receiver<bool>,
    ) -> Selection {
        for edge in workflow.outgoing(current) {
            let Some(guard_name) = &edge.guard else {
                return Selection::Next(edge.to.clone());
            };

            if self.evaluate_guard(guard_name, context).await {
                return Selection::Next(edge.to.clone());
            }

            match edge.on_failure_or_default() {
                OnFailure::Stop => {
                    return Selection::Fail(format!(
                        "Edge guard failed with STOP for edge: {} -> {}",
                        edge.from, edge.to
                    ))
                }
                OnFailure::Skip => continue,
                OnFailure::Continue => return Selection::Next(edge.to.clone()),
                OnFailure::Alternative { alternative_target } => match alternative_target {
                    Some(target) => return Selection::Next(target.clone()),
                    None => {
                        return Selection::Fail(format!(
                            "Edge guard failed with ALTERNATIVE but no alternativeTarget configured for edge: {} -> {}",
                            edge.from, edge.to
                        ))
                    }
                },
                OnFailure::Retry { attempts, delay } => {
                    if self
                        .retry_guard_until_success(edge, guard_name, attempts, delay, context, cancel)
                        .await
                    {
                        return Selection::Next(edge.to.clone());
                    }
                    return Selection::Fail(format!(
                        "Edge guard failed after retry for edge: {} -> {}",
                        edge.from, edge.to
                    ));
                }
            }
        }
        Selection::None
    }

    async fn retry_guard_until_success(
        &self,
        edge: &Edge,
        guard_name: &str,
        attempts: u32,
        delay: u64,
        context: &Context,
        cancel: &watch::Receiver<bool>,
    ) -> bool {
        let _ = edge;
        for attempt in 0..attempts.max(1) {
            if attempt > 0 && interruptible_sleep(delay, cancel).await.is_err() {
                return false;
            }
            if self.evaluate_guard(guard_name, context).await {
                return true;
            }
        }
        false
    }

    /// Guard evaluation (spec §4.4): `guardName` resolves via the step
    /// table (a step entry whose `type` is the guard's registered name)
    /// or falls back to a direct registry lookup. Any failure to resolve
    /// or construct is trapped and yields `false` (spec §7).
    async fn evaluate_guard(&self, guard_name: &str, context: &Context) -> bool {
        let (factory, effective_config) = if let Some(def) = self.config.step(guard_name) {
            let factory = match self.registry.find_guard(&def.component_type) {
                Some(f) => f,
                None => {
                    tracing::warn!(guard = %guard_name, "guard component not found");
                    return false;
                }
            };
            let effective =
                self.config
                    .defaults
                    .effective_config(GUARD_CATEGORY, guard_name, &def.config);
            (factory, effective)
        } else {
            let factory = match self.registry.find_guard(guard_name) {
                Some(f) => f,
                None => {
                    tracing::warn!(guard = %guard_name, "guard component not found");
                    return false;
                }
            };
            let effective = self.config.defaults.effective_config(
                GUARD_CATEGORY,
                guard_name,
                &crate::config::ConfigMap::default(),
            );
            (factory, effective)
        };

        let injected = match injector::inject(
            &factory.injection_schema(),
            context,
            &effective_config,
            &self.config.settings,
        ) {
            Ok(values) => values,
            Err(err) => {
                tracing::warn!(guard = %guard_name, error = %err, "guard injection failed");
                return false;
            }
        };

        let instance = factory.create(&injected);
        instance.evaluate(context).await
    }

    /// Pre-run validation result, exposed for callers that want to inspect
    /// it without constructing via `EngineBuilder::fail_fast_on_construction(false)`.
    pub fn validate(&self) -> crate::validator::ValidationResult {
        self.validators.validate(&self.config)
    }

    /// `analyzeWorkflow` (spec §6): a deterministic textual report.
    pub fn analyze_workflow(&self, workflow_name: &str) -> Result<AnalysisReport, EngineError> {
        let workflow = self
            .config
            .workflow(workflow_name)
            .ok_or_else(|| EngineError::WorkflowNotFound(workflow_name.to_string()))?;
        Ok(analyzer::build_report(
            workflow_name,
            workflow,
            &self.config,
        ))
    }
}

/// Sleep interruptibly against a cancellation watch channel (spec §5).
async fn interruptible_sleep(ms: u64, cancel: &watch::Receiver<bool>) -> Result<(), EngineError> {
    if *cancel.borrow() {
        return Err(EngineError::Interrupted);
    }
    let mut cancel = cancel.clone();
    tokio::select! {
        _ = tokio::time::sleep(Duration::from_millis(ms)) => Ok(()),
        _ = cancel.changed() => Err(EngineError::Interrupted),
    }
}
