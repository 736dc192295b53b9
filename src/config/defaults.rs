//! Layered defaults: `category-or-name -> { key -> value }` (spec §3).

use super::step::ConfigMap;
use crate::context::Value;
use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

pub const STEP_CATEGORY: &str = "step";
pub const GUARD_CATEGORY: &str = "guard";

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Defaults(pub IndexMap<String, IndexMap<String, Value>>);

impl<'de> Deserialize<'de> for Defaults {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw: IndexMap<String, IndexMap<String, serde_yaml::Value>> =
            IndexMap::deserialize(deserializer)?;
        let mut out = IndexMap::with_capacity(raw.len());
        for (category_or_name, entries) in raw {
            let mut converted = IndexMap::with_capacity(entries.len());
            for (k, v) in entries {
                converted.insert(k, Value::from(v));
            }
            out.insert(category_or_name, converted);
        }
        Ok(Defaults(out))
    }
}

impl Serialize for Defaults {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeMap;
        let mut outer = serializer.serialize_map(Some(self.0.len()))?;
        for (name, entries) in &self.0 {
            let mut inner = IndexMap::with_capacity(entries.len());
            for (k, v) in entries {
                inner.insert(
                    k.clone(),
                    crate::config::yaml::value_to_json(v).map_err(serde::ser::Error::custom)?,
                );
            }
            outer.serialize_entry(name, &inner)?;
        }
        outer.end()
    }
}

impl Defaults {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    fn category(&self, name: &str) -> Option<&IndexMap<String, Value>> {
        self.0.get(name)
    }

    /// Effective config for a named step/guard: `category-defaults ∪
    /// name-defaults ∪ declared-config`, later entries overriding earlier
    /// ones (spec §3, "Layered defaults").
    pub fn effective_config(&self, category: &str, name: &str, declared: &ConfigMap) -> ConfigMap {
        let mut merged = IndexMap::new();
        if let Some(category_defaults) = self.category(category) {
            merged.extend(category_defaults.clone());
        }
        if let Some(name_defaults) = self.category(name) {
            merged.extend(name_defaults.clone());
        }
        for (k, v) in declared.iter() {
            merged.insert(k.clone(), v.clone());
        }
        ConfigMap(merged)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_map(pairs: &[(&str, Value)]) -> ConfigMap {
        let mut m = IndexMap::new();
        for (k, v) in pairs {
            m.insert(k.to_string(), v.clone());
        }
        ConfigMap(m)
    }

    #[test]
    fn layering_order_is_category_then_name_then_declared() {
        let yaml = "step:\n  retries: 1\n  timeout: 10\nmyStep:\n  retries: 2\n";
        let defaults: Defaults = serde_yaml::from_str(yaml).unwrap();
        let declared = config_map(&[("retries", Value::Int(3))]);

        let effective = defaults.effective_config(STEP_CATEGORY, "myStep", &declared);

        assert_eq!(effective.get("retries"), Some(&Value::Int(3)));
        assert_eq!(effective.get("timeout"), Some(&Value::Int(10)));
    }

    #[test]
    fn name_defaults_override_category_defaults() {
        let yaml = "step:\n  retries: 1\nmyStep:\n  retries: 2\n";
        let defaults: Defaults = serde_yaml::from_str(yaml).unwrap();
        let declared = config_map(&[]);

        let effective = defaults.effective_config(STEP_CATEGORY, "myStep", &declared);
        assert_eq!(effective.get("retries"), Some(&Value::Int(2)));
    }
}
