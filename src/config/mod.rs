//! Typed configuration model: workflows, edges, steps, retries, layered
//! defaults and global settings (spec §3), plus YAML (de)serialization.

pub mod defaults;
pub mod edge;
pub mod retry;
pub mod settings;
pub mod step;
pub mod workflow;
pub mod yaml;

pub use defaults::{Defaults, GUARD_CATEGORY, STEP_CATEGORY};
pub use edge::{Edge, OnFailure, FAILURE, SUCCESS};
pub use retry::{Backoff, RetryConfig};
pub use settings::GlobalSettings;
pub use step::{ConfigMap, StepDefinition};
pub use workflow::Workflow;
pub use yaml::{to_canonical_string, Config};
