//! Mutable keyed state threaded through a workflow run.
//!
//! Typed getters never throw: on an absent key or a coercion failure they
//! return `None` (the "null-marker" of spec §4.1) or a caller-supplied
//! default. Coercion itself lives in [`coerce`], shared with the injector
//! per Design Notes §9.

use indexmap::IndexMap;
use std::collections::HashMap;
use uuid::Uuid;

/// Dynamically-typed value stored in a [`Context`] or parsed from config.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    List(Vec<Value>),
    Map(IndexMap<String, Value>),
}

impl Value {
    pub fn is_empty_value(&self) -> bool {
        match self {
            Value::Null => true,
            Value::Str(s) => s.is_empty(),
            Value::List(l) => l.is_empty(),
            Value::Map(m) => m.is_empty(),
            _ => false,
        }
    }
}

impl From<serde_json::Value> for Value {
    fn from(v: serde_json::Value) -> Self {
        match v {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Value::Int(i)
                } else {
                    Value::Float(n.as_f64().unwrap_or(0.0))
                }
            }
            serde_json::Value::String(s) => Value::Str(s),
            serde_json::Value::Array(a) => Value::List(a.into_iter().map(Value::from).collect()),
            serde_json::Value::Object(o) => {
                Value::Map(o.into_iter().map(|(k, v)| (k, Value::from(v))).collect())
            }
        }
    }
}

impl From<serde_yaml::Value> for Value {
    fn from(v: serde_yaml::Value) -> Self {
        // Round-trip through serde_json::Value, which has an identical
        // shape and already has a `From` impl above -- avoids duplicating
        // the conversion logic for every scalar/collection variant.
        let json: serde_json::Value = serde_json::to_value(v).unwrap_or(serde_json::Value::Null);
        Value::from(json)
    }
}

/// String-to-primitive coercion, shared by [`Context`]'s typed getters and
/// the injector (Design Notes §9).
pub mod coerce {
    use super::Value;

    pub fn to_bool(v: &Value) -> Option<bool> {
        match v {
            Value::Bool(b) => Some(*b),
            Value::Int(i) => Some(*i != 0),
            Value::Float(f) => Some(*f != 0.0),
            Value::Str(s) => Some(matches!(s.to_lowercase().as_str(), "true" | "1" | "yes")),
            _ => None,
        }
    }

    pub fn to_i64(v: &Value) -> Option<i64> {
        match v {
            Value::Int(i) => Some(*i),
            Value::Float(f) => Some(*f as i64),
            Value::Bool(b) => Some(if *b { 1 } else { 0 }),
            Value::Str(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    pub fn to_f64(v: &Value) -> Option<f64> {
        match v {
            Value::Float(f) => Some(*f),
            Value::Int(i) => Some(*i as f64),
            Value::Str(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    pub fn to_string(v: &Value) -> Option<String> {
        match v {
            Value::Str(s) => Some(s.clone()),
            Value::Int(i) => Some(i.to_string()),
            Value::Float(f) => Some(f.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            Value::Null => None,
            _ => None,
        }
    }

    pub fn to_list(v: &Value) -> Option<Vec<Value>> {
        match v {
            Value::List(l) => Some(l.clone()),
            _ => None,
        }
    }

    pub fn to_map(v: &Value) -> Option<super::IndexMap<String, Value>> {
        match v {
            Value::Map(m) => Some(m.clone()),
            _ => None,
        }
    }
}

/// Keyed run state. One instance per workflow run (spec §3).
#[derive(Debug, Clone)]
pub struct Context {
    values: HashMap<String, Value>,
    metadata: HashMap<String, Value>,
    run_id: Uuid,
}

impl Default for Context {
    fn default() -> Self {
        Self::new()
    }
}

impl Context {
    pub fn new() -> Self {
        Context {
            values: HashMap::new(),
            metadata: HashMap::new(),
            run_id: Uuid::new_v4(),
        }
    }

    /// Correlation id for tracing spans covering this run.
    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    pub fn set(&mut self, key: impl Into<String>, value: Value) {
        self.values.insert(key.into(), value);
    }

    pub fn get_string(&self, key: &str) -> Option<String> {
        self.values.get(key).and_then(coerce::to_string)
    }

    pub fn get_string_or(&self, key: &str, default: &str) -> String {
        self.get_string(key).unwrap_or_else(|| default.to_string())
    }

    pub fn get_int(&self, key: &str) -> Option<i64> {
        self.values.get(key).and_then(coerce::to_i64)
    }

    pub fn get_int_or(&self, key: &str, default: i64) -> i64 {
        self.get_int(key).unwrap_or(default)
    }

    pub fn get_float(&self, key: &str) -> Option<f64> {
        self.values.get(key).and_then(coerce::to_f64)
    }

    pub fn get_float_or(&self, key: &str, default: f64) -> f64 {
        self.get_float(key).unwrap_or(default)
    }

    pub fn get_bool(&self, key: &str) -> Option<bool> {
        self.values.get(key).and_then(coerce::to_bool)
    }

    pub fn get_bool_or(&self, key: &str, default: bool) -> bool {
        self.get_bool(key).unwrap_or(default)
    }

    pub fn get_list(&self, key: &str) -> Option<Vec<Value>> {
        self.values.get(key).and_then(coerce::to_list)
    }

    pub fn get_map(&self, key: &str) -> Option<IndexMap<String, Value>> {
        self.values.get(key).and_then(coerce::to_map)
    }

    /// True iff `key` exists and its value isn't `Value::Null`.
    pub fn has_value(&self, key: &str) -> bool {
        matches!(self.values.get(key), Some(v) if !matches!(v, Value::Null))
    }

    /// True iff the key is absent, null, or an empty string/collection/map.
    pub fn is_empty(&self, key: &str) -> bool {
        self.values.get(key).is_none_or(Value::is_empty_value)
    }

    pub fn metadata(&self) -> &HashMap<String, Value> {
        &self.metadata
    }

    pub fn set_metadata(&mut self, key: impl Into<String>, value: Value) {
        self.metadata.insert(key.into(), value);
    }

    /// Shallow independent duplicate: mutating the copy never affects the
    /// original's mappings (element values may still be aliased).
    pub fn copy(&self) -> Context {
        Context {
            values: self.values.clone(),
            metadata: self.metadata.clone(),
            run_id: self.run_id,
        }
    }

    /// Merge a delta into this context, overwriting on key collision.
    pub fn put_all(&mut self, delta: HashMap<String, Value>) {
        self.values.extend(delta);
    }

    pub fn as_map(&self) -> &HashMap<String, Value> {
        &self.values
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn typed_getters_never_panic_on_absent_or_mistyped() {
        let mut ctx = Context::new();
        ctx.set("name", Value::Str("alice".into()));
        ctx.set("count", Value::Str("not-a-number".into()));

        assert_eq!(ctx.get_string("name").as_deref(), Some("alice"));
        assert_eq!(ctx.get_int("count"), None);
        assert_eq!(ctx.get_int_or("count", -1), -1);
        assert_eq!(ctx.get_int("missing"), None);
    }

    #[test]
    fn bool_coercion_accepts_true_1_yes_case_insensitive() {
        let mut ctx = Context::new();
        for (raw, expected) in [
            ("true", true),
            ("YES", true),
            ("1", true),
            ("0", false),
            ("nope", false),
        ] {
            ctx.set("flag", Value::Str(raw.into()));
            assert_eq!(ctx.get_bool("flag"), Some(expected), "input={raw}");
        }
    }

    #[test]
    fn has_value_and_is_empty_semantics() {
        let mut ctx = Context::new();
        ctx.set("present", Value::Int(0));
        ctx.set("nullish", Value::Null);
        ctx.set("blank", Value::Str(String::new()));
        ctx.set("list", Value::List(vec![]));

        assert!(ctx.has_value("present"));
        assert!(!ctx.has_value("nullish"));
        assert!(!ctx.has_value("missing"));

        assert!(!ctx.is_empty("present"));
        assert!(ctx.is_empty("nullish"));
        assert!(ctx.is_empty("blank"));
        assert!(ctx.is_empty("list"));
        assert!(ctx.is_empty("missing"));
    }

    #[test]
    fn copy_is_independent() {
        let mut original = Context::new();
        original.set("x", Value::Int(1));

        let mut copied = original.copy();
        copied.set("x", Value::Int(2));
        copied.set("y", Value::Int(3));

        assert_eq!(original.get_int("x"), Some(1));
        assert_eq!(copied.get_int("x"), Some(2));
        assert_eq!(original.get_int("y"), None);
    }

    #[test]
    fn put_all_overwrites_on_collision() {
        let mut ctx = Context::new();
        ctx.set("x", Value::Int(1));

        let mut delta = HashMap::new();
        delta.insert("x".to_string(), Value::Int(99));
        delta.insert("y".to_string(), Value::Int(2));
        ctx.put_all(delta);

        assert_eq!(ctx.get_int("x"), Some(99));
        assert_eq!(ctx.get_int("y"), Some(2));
    }
}
