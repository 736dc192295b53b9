//! Global settings: an arbitrary nested mapping addressable by dotted path.

use crate::context::Value;
use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct GlobalSettings(pub IndexMap<String, Value>);

impl GlobalSettings {
    /// Resolve a dotted path like `a.b.c` against the nested mapping.
    pub fn get_path(&self, path: &str) -> Option<&Value> {
        let mut segments = path.split('.');
        let first = segments.next()?;
        let mut current = self.0.get(first)?;
        for segment in segments {
            match current {
                Value::Map(m) => {
                    current = m.get(segment)?;
                }
                _ => return None,
            }
        }
        Some(current)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<'de> Deserialize<'de> for GlobalSettings {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw: IndexMap<String, serde_yaml::Value> = IndexMap::deserialize(deserializer)?;
        let mut out = IndexMap::with_capacity(raw.len());
        for (k, v) in raw {
            out.insert(k, Value::from(v));
        }
        Ok(GlobalSettings(out))
    }
}

impl Serialize for GlobalSettings {
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
