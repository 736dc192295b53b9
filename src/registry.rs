//! Name → factory tables for Steps and Guards (spec §4.2), populated by
//! explicit registration (Rust has no classpath to scan) under every
//! alias spec §4.2 enumerates: simple name, lower-camel simple name,
//! fully-qualified name, and an optional declared alias (plus its
//! lower-camel variant).

use crate::component::{GuardFactory, StepFactory};
use std::collections::HashMap;
use std::sync::Arc;

fn lower_camel(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

/// Toggle the case of just the first character, yielding the "other"
/// camel variant of `name` regardless of which case it started in --
/// the fallback spec §4.2 describes for an input that misses the
/// exact-key lookup.
fn swap_first_char_case(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_uppercase() => {
            first.to_lowercase().collect::<String>() + chars.as_str()
        }
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

/// Registration metadata for a single component, used to derive the
/// alias set spec §4.2 requires.
pub struct Registration<'a> {
    pub simple_name: &'a str,
    pub qualified_name: Option<&'a str>,
    pub alias: Option<&'a str>,
}

impl<'a> Registration<'a> {
    pub fn new(simple_name: &'a str) -> Self {
        Registration {
            simple_name,
            qualified_name: None,
            alias: None,
        }
    }

    pub fn with_qualified_name(mut self, qualified_name: &'a str) -> Self {
        self.qualified_name = Some(qualified_name);
        self
    }

    pub fn with_alias(mut self, alias: &'a str) -> Self {
        self.alias = Some(alias);
        self
    }

    fn keys(&self) -> Vec<String> {
        let mut keys = vec![self.simple_name.to_string(), lower_camel(self.simple_name)];
        if let Some(qualified) = self.qualified_name {
            keys.push(qualified.to_string());
        }
        if let Some(alias) = self.alias {
            keys.push(alias.to_string());
            keys.push(lower_camel(alias));
        }
        keys
    }
}

#[derive(Default)]
pub struct Registry {
    steps: HashMap<String, Arc<dyn StepFactory>>,
    guards: HashMap<String, Arc<dyn GuardFactory>>,
}

impl Registry {
    pub fn new() -> Self {
        Registry::default()
    }

    /// Register a Step factory under every alias in `registration`. Later
    /// registrations win on key collision (Design Notes §9, Open
    /// Question 5 -- undocumented by spec.md, so the precedence is
    /// recorded here rather than left ambiguous).
    pub fn register_step(
        &mut self,
        registration: Registration<'_>,
        factory: impl StepFactory + 'static,
    ) {
        let factory: Arc<dyn StepFactory> = Arc::new(factory);
        for key in registration.keys() {
            self.steps.insert(key, Arc::clone(&factory));
        }
    }

    pub fn register_guard(
        &mut self,
        registration: Registration<'_>,
        factory: impl GuardFactory + 'static,
    ) {
        let factory: Arc<dyn GuardFactory> = Arc::new(factory);
        for key in registration.keys() {
            self.guards.insert(key, Arc::clone(&factory));
        }
    }

    /// Exact match first; on miss, retry with the upper-camel variant of
    /// the input (spec §4.2 "Lookup").
    pub fn find_step(&self, type_name: &str) -> Option<Arc<dyn StepFactory>> {
        self.steps
            .get(type_name)
            .or_else(|| self.steps.get(&swap_first_char_case(type_name)))
            .cloned()
    }

    pub fn find_guard(&self, type_name: &str) -> Option<Arc<dyn GuardFactory>> {
        self.guards
            .get(type_name)
            .or_else(|| self.guards.get(&swap_first_char_case(type_name)))
            .cloned()
    }
}
