//! Immutable outcome of one step execution (spec §3).

use crate::context::Value;
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepStatus {
    Success,
    Failure,
    Pending,
}

#[derive(Debug, Clone)]
pub struct StepResult {
    pub status: StepStatus,
    pub message: Option<String>,
    pub context_delta: HashMap<String, Value>,
}

impl StepResult {
    pub fn success() -> Self {
        StepResult {
            status: StepStatus::Success,
            message: None,
            context_delta: HashMap::new(),
        }
    }

    pub fn success_with_message(message: impl Into<String>) -> Self {
        StepResult {
            status: StepStatus::Success,
            message: Some(message.into()),
            context_delta: HashMap::new(),
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        StepResult {
            status: StepStatus::Failure,
            message: Some(message.into()),
            context_delta: HashMap::new(),
        }
    }

    pub fn pending() -> Self {
        StepResult {
            status: StepStatus::Pending,
            message: None,
            context_delta: HashMap::new(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == StepStatus::Success
    }

    pub fn is_failure(&self) -> bool {
        self.status == StepStatus::Failure
    }

    /// Returns a derived result with an additional delta entry.
    pub fn with_delta(mut self, key: impl Into<String>, value: Value) -> Self {
        self.context_delta.insert(key.into(), value);
        self
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn with_delta_accumulates_entries() {
        let result = StepResult::success()
            .with_delta("x", Value::Int(1))
            .with_delta("y", Value::Int(2));

        assert!(result.is_success());
        assert_eq!(result.context_delta.len(), 2);
    }

    #[test]
    fn failure_carries_message() {
        let result = StepResult::failure("boom");
        assert!(result.is_failure());
        assert_eq!(result.message.as_deref(), Some("boom"));
    }
}
