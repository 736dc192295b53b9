//! Pluggable, prioritized static validation (spec §4.5).

pub mod cycle;
pub mod edge_order;

use crate::config::Config;
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorType {
    CycleDetected,
    MultipleUnguardedEdges,
    UnguardedEdgeNotLast,
    UndefinedStep,
    UndefinedGuard,
    MissingRoot,
    DeadEnd,
    UnreachableStep,
    InvalidEdgeConfiguration,
    MalformedWorkflow,
    ConfigurationSyntaxError,
    Generic,
}

#[derive(Debug, Clone)]
pub struct ValidationError {
    pub error_type: ErrorType,
    pub workflow_name: Option<String>,
    pub message: String,
    pub details: HashMap<String, String>,
    pub location: Option<String>,
    pub cause: Option<String>,
}

impl ValidationError {
    pub fn new(error_type: ErrorType, message: impl Into<String>) -> Self {
        ValidationError {
            error_type,
            workflow_name: None,
            message: message.into(),
            details: HashMap::new(),
            location: None,
            cause: None,
        }
    }

    pub fn with_workflow(mut self, name: impl Into<String>) -> Self {
        self.workflow_name = Some(name.into());
        self
    }

    pub fn with_detail(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.details.insert(key.into(), value.into());
        self
    }
}

#[derive(Debug, Clone, Default)]
pub struct ValidationResult {
    pub errors: Vec<ValidationError>,
    pub warnings: Vec<ValidationError>,
    pub metadata: HashMap<String, String>,
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    fn merge(&mut self, other: ValidationResult) {
        self.errors.extend(other.errors);
        self.warnings.extend(other.warnings);
        self.metadata.extend(other.metadata);
    }
}

/// A single pluggable check over a [`Config`] (spec §4.5).
pub trait Validator: Send + Sync {
    fn name(&self) -> &str;
    fn priority(&self) -> u32 {
        100
    }
    fn fail_fast(&self) -> bool {
        false
    }
    fn description(&self) -> &str {
        ""
    }
    fn validate(&self, config: &Config) -> ValidationResult;
}

/// A registry of validators run in ascending-priority order, merging
/// results and honoring each validator's `failFast` flag.
#[derive(Default)]
pub struct ValidatorRegistry {
    validators: Vec<Box<dyn Validator>>,
}

impl ValidatorRegistry {
    pub fn new() -> Self {
        ValidatorRegistry::default()
    }

    /// The built-in validator set: cycle detection (priority 10, fail
    /// fast) then edge-ordering rules (priority 20, fail fast).
    pub fn with_builtins() -> Self {
        let mut registry = ValidatorRegistry::new();
        registry.register(Box::new(cycle::CycleValidator));
        registry.register(Box::new(edge_order::EdgeOrderValidator));
        registry
    }

    pub fn register(&mut self, validator: Box<dyn Validator>) {
        self.validators.push(validator);
        self.validators.sort_by_key(|v| v.priority());
    }

    pub fn validate(&self, config: &Config) -> ValidationResult {
        let mut merged = ValidationResult::default();
        for validator in &self.validators {
            let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
                validator.validate(config)
            }));
            match result {
                Ok(result) => {
                    let had_error = !result.errors.is_empty();
                    merged.merge(result);
                    if validator.fail_fast() && had_error {
                        break;
                    }
                }
                Err(panic) => {
                    let message = panic
                        .downcast_ref::<&str>()
                        .map(|s| s.to_string())
                        .or_else(|| panic.downcast_ref::<String>().cloned())
                        .unwrap_or_else(|| "validator panicked".to_string());
                    merged.errors.push(
                        ValidationError::new(ErrorType::Generic, message)
                            .with_detail("validator", validator.name()),
                    );
                    if validator.fail_fast() {
                        break;
                    }
                }
            }
        }
        merged
    }
}
