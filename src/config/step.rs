//! Step definition (spec §3): `{ type, config, guards, retry }`.

use super::retry::RetryConfig;
use crate::context::Value;
use indexmap::IndexMap;
use serde::de::Error as DeError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// `IndexMap<String, Value>` with a `serde` bridge through
/// `serde_yaml::Value`, since our [`Value`] doesn't derive `Deserialize`
/// directly (it needs the coercion-friendly shape, not serde's own).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigMap(pub IndexMap<String, Value>);

impl ConfigMap {
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> indexmap::map::Iter<'_, String, Value> {
        self.0.iter()
    }
}

impl<'de> Deserialize<'de> for ConfigMap {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw: IndexMap<String, serde_yaml::Value> = IndexMap::deserialize(deserializer)?;
        let mut out = IndexMap::with_capacity(raw.len());
        for (k, v) in raw {
            out.insert(k, Value::from(v));
        }
        Ok(ConfigMap(out))
    }
}

impl Serialize for ConfigMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeMap;
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (k, v) in &self.0 {
            let json = crate::config::yaml::value_to_json(v).map_err(serde::ser::Error::custom)?;
            map.serialize_entry(k, &json)?;
        }
        map.end()
    }
}

// Keep a visible use so `DeError` stays a documented import if future
// variants need custom error construction.
#[allow(unused_imports)]
use DeError as _;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StepDefinition {
    #[serde(rename = "type")]
    pub component_type: String,
    #[serde(default, skip_serializing_if = "ConfigMap::is_empty")]
    pub config: ConfigMap,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub guards: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retry: Option<RetryConfig>,
}
