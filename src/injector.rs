//! Per-invocation binding of context values, merged config, and global
//! settings into a freshly constructed component (spec §4.3).
//!
//! Rust has no reflective field writes, so per Design Notes §9 this is
//! modeled as a small declarative schema (`InjectionSchema`, a
//! `Vec<FieldSpec>`) registered alongside each component type. Running the
//! schema through the four phases of spec §4.3, in order, produces a bag
//! of resolved values (`InjectedValues`) that a component's constructor
//! reads instead of being reflectively populated.

use crate::config::settings::GlobalSettings;
use crate::config::step::ConfigMap;
use crate::context::{coerce, Context, Value};
use crate::error::InjectionError;
use std::collections::HashMap;

/// Where a field's value comes from, per spec §4.3's four phases.
#[derive(Debug, Clone)]
pub enum FieldSource {
    /// Phase 1 ("inject" tag): context, falling back to config.
    ContextThenConfig(String),
    /// Phase 2 (unannotated context fill): context only, no coercion.
    ContextOnly(String),
    /// Phase 3 (unannotated config fill): merged config only.
    ConfigOnly(String),
    /// Phase 4 ("configValue" tag): merged config, falling back to a
    /// dotted global-settings path.
    ConfigThenGlobalPath {
        config_key: String,
        global_path: String,
    },
}

#[derive(Debug, Clone)]
pub struct FieldSpec {
    pub field_name: String,
    pub source: FieldSource,
    pub required: bool,
    pub default: Option<Value>,
    /// The declaring type's name, used in the structured error for a
    /// missing required field.
    pub declaring_type: String,
}

impl FieldSpec {
    pub fn new(
        field_name: impl Into<String>,
        source: FieldSource,
        declaring_type: impl Into<String>,
    ) -> Self {
        FieldSpec {
            field_name: field_name.into(),
            source,
            required: false,
            default: None,
            declaring_type: declaring_type.into(),
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn with_default(mut self, value: Value) -> Self {
        self.default = Some(value);
        self
    }
}

pub type InjectionSchema = Vec<FieldSpec>;

/// The resolved value bag a component constructor reads from.
#[derive(Debug, Clone, Default)]
pub struct InjectedValues(pub HashMap<String, Value>);

impl InjectedValues {
    pub fn get(&self, field_name: &str) -> Option<&Value> {
        self.0.get(field_name)
    }

    pub fn get_string(&self, field_name: &str) -> Option<String> {
        self.0.get(field_name).and_then(coerce::to_string)
    }

    pub fn get_bool(&self, field_name: &str) -> Option<bool> {
        self.0.get(field_name).and_then(coerce::to_bool)
    }

    pub fn get_i64(&self, field_name: &str) -> Option<i64> {
        self.0.get(field_name).and_then(coerce::to_i64)
    }
}

/// Bind `schema` against `context`/`merged_config`/`global_settings` in
/// the four-phase order spec §4.3 prescribes. A required-missing field is
/// fatal (aborts the step); any other per-field error is logged and
/// injection continues with the next field.
pub fn inject(
    schema: &InjectionSchema,
    context: &Context,
    merged_config: &ConfigMap,
    global_settings: &GlobalSettings,
) -> Result<InjectedValues, InjectionError> {
    let mut bag = HashMap::new();

    for spec in schema {
        let resolved = match &spec.source {
            FieldSource::ContextThenConfig(key) => context
                .get(key)
                .cloned()
                .or_else(|| merged_config.get(key).cloned()),
            FieldSource::ContextOnly(key) => context.get(key).cloned(),
            FieldSource::ConfigOnly(key) => merged_config.get(key).cloned(),
            FieldSource::ConfigThenGlobalPath {
                config_key,
                global_path,
            } => merged_config
                .get(config_key)
                .cloned()
                .or_else(|| global_settings.get_path(global_path).cloned()),
        };

        match resolved {
            Some(value) => {
                bag.insert(spec.field_name.clone(), value);
            }
            None => {
                if spec.required {
                    return Err(InjectionError::RequiredMissing {
                        key: source_key(&spec.source),
                        field: spec.field_name.clone(),
                        declaring_type: spec.declaring_type.clone(),
                    });
                }
                if let Some(default) = &spec.default {
                    bag.insert(spec.field_name.clone(), default.clone());
                } else {
                    tracing::debug!(
                        field = %spec.field_name,
                        declaring_type = %spec.declaring_type,
                        "injector: optional field left unset"
                    );
                }
            }
        }
    }

    Ok(InjectedValues(bag))
}

fn source_key(source: &FieldSource) -> String {
    match source {
        FieldSource::ContextThenConfig(k) => k.clone(),
        FieldSource::ContextOnly(k) => k.clone(),
        FieldSource::ConfigOnly(k) => k.clone(),
        FieldSource::ConfigThenGlobalPath { config_key, .. } => config_key.clone(),
    }
}
