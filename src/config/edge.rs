//! Edge and `onFailure` strategy configuration (spec §3).

use serde::{Deserialize, Serialize};

pub const SUCCESS: &str = "SUCCESS";
pub const FAILURE: &str = "FAILURE";

/// `OnFailure.strategy`, modeled as a tagged enum with payload per
/// Design Notes §9 rather than five parallel optional fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(tag = "strategy")]
pub enum OnFailure {
    #[serde(rename = "STOP")]
    #[default]
    Stop,
    #[serde(rename = "SKIP")]
    Skip,
    #[serde(rename = "CONTINUE")]
    Continue,
    #[serde(rename = "ALTERNATIVE")]
    Alternative {
        #[serde(rename = "alternativeTarget", skip_serializing_if = "Option::is_none")]
        alternative_target: Option<String>,
    },
    #[serde(rename = "RETRY")]
    Retry {
        #[serde(default = "default_retry_attempts")]
        attempts: u32,
        #[serde(default = "default_retry_delay_ms")]
        delay: u64,
    },
}

fn default_retry_attempts() -> u32 {
    3
}

fn default_retry_delay_ms() -> u64 {
    1000
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Edge {
    pub from: String,
    pub to: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guard: Option<String>,
    /// Informational only; never evaluated (spec §3, §9 Open Question 2).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<String>,
    #[serde(default = "default_kind")]
    pub kind: String,
    #[serde(default, rename = "onFailure", skip_serializing_if = "Option::is_none")]
    pub on_failure: Option<OnFailure>,
}

fn default_kind() -> String {
    "normal".to_string()
}

impl Edge {
    pub fn is_guarded(&self) -> bool {
        self.guard.is_some()
    }

    pub fn on_failure_or_default(&self) -> OnFailure {
        self.on_failure.clone().unwrap_or_default()
    }

    pub fn is_terminal_target(&self) -> bool {
        self.to == SUCCESS || self.to == FAILURE
    }
}
