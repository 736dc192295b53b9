//! The top-level [`Config`] tree and its YAML (de)serialization, including
//! the deterministic re-emission contract of spec §6.

use super::defaults::Defaults;
use super::settings::GlobalSettings;
use super::step::StepDefinition;
use super::workflow::Workflow;
use crate::context::Value;
use crate::error::ConfigError;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default, skip_serializing_if = "GlobalSettings::is_empty")]
    pub settings: GlobalSettings,
    #[serde(default, skip_serializing_if = "Defaults::is_empty")]
    pub defaults: Defaults,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub steps: IndexMap<String, StepDefinition>,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub workflows: IndexMap<String, Workflow>,
}

impl Config {
    pub fn from_str(yaml: &str) -> Result<Config, ConfigError> {
        let config: Config = serde_yaml::from_str(yaml)?;
        for (name, workflow) in &config.workflows {
            if workflow.root.trim().is_empty() {
                return Err(ConfigError::MissingRoot(name.clone()));
            }
        }
        Ok(config)
    }

    pub fn workflow(&self, name: &str) -> Option<&Workflow> {
        self.workflows.get(name)
    }

    pub fn step(&self, name: &str) -> Option<&StepDefinition> {
        self.steps.get(name)
    }
}

/// Convert an internal [`Value`] to `serde_json::Value`, the intermediate
/// shape used when re-serializing dynamically-typed config/settings data
/// (shared by [`super::step::ConfigMap`], [`GlobalSettings`] and
/// [`Defaults`]'s `Serialize` impls).
pub fn value_to_json(value: &Value) -> Result<serde_json::Value, String> {
    Ok(match value {
        Value::Null => serde_json::Value::Null,
        Value::Bool(b) => serde_json::Value::Bool(*b),
        Value::Int(i) => serde_json::Value::Number((*i).into()),
        Value::Float(f) => serde_json::Number::from_f64(*f)
            .map(serde_json::Value::Number)
            .unwrap_or(serde_json::Value::Null),
        Value::Str(s) => serde_json::Value::String(s.clone()),
        Value::List(items) => {
            let mut out = Vec::with_capacity(items.len());
            for item in items {
                out.push(value_to_json(item)?);
            }
            serde_json::Value::Array(out)
        }
        Value::Map(map) => {
            let mut out = serde_json::Map::with_capacity(map.len());
            for (k, v) in map {
                out.insert(k.clone(), value_to_json(v)?);
            }
            serde_json::Value::Object(out)
        }
    })
}

/// Re-emit a [`Config`] to YAML deterministically (spec §6): top-level
/// keys ordered `{settings, defaults, steps, workflows}`; step and
/// workflow names sorted lexicographically; missing optional fields
/// omitted; block style, 2-space indent, LF line endings.
pub fn to_canonical_string(config: &Config) -> Result<String, ConfigError> {
    let mut ordered_steps = IndexMap::new();
    let mut step_names: Vec<&String> = config.steps.keys().collect();
    step_names.sort();
    for name in step_names {
        ordered_steps.insert(name.clone(), config.steps[name].clone());
    }

    let mut ordered_workflows = IndexMap::new();
    let mut workflow_names: Vec<&String> = config.workflows.keys().collect();
    workflow_names.sort();
    for name in workflow_names {
        ordered_workflows.insert(name.clone(), config.workflows[name].clone());
    }

    let ordered = Config {
        settings: config.settings.clone(),
        defaults: config.defaults.clone(),
        steps: ordered_steps,
        workflows: ordered_workflows,
    };

    let yaml = serde_yaml::to_string(&ordered)?;
    // serde_yaml never emits CRLF, but normalize defensively so the
    // contract holds regardless of the serializer's internals.
    Ok(yaml.replace("\r\n", "\n"))
}
